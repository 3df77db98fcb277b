//! Request/response entry point: form inputs in, displayable outcome out

use crate::irr::{compute_irr, FailureReason, SolverConfig};
use crate::report::{IrrReport, FAILURE_MESSAGE};
use crate::schedule::{CashFlowSchedule, IrrInputs};
use log::{info, warn};
use serde::Serialize;

/// What the front end shows after "calculate"
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CalculationOutcome {
    /// Converged rate with its schedule
    Success(IrrReport),
    /// Solver did not converge; no schedule is shown
    Failure { message: String, reason: FailureReason },
    /// Inputs outside the form's allowed ranges
    InvalidInput { message: String },
}

impl CalculationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CalculationOutcome::Success(_))
    }

    pub fn report(&self) -> Option<&IrrReport> {
        match self {
            CalculationOutcome::Success(report) => Some(report),
            _ => None,
        }
    }
}

/// Stateless calculator holding only solver settings
#[derive(Debug, Clone, Copy, Default)]
pub struct IrrCalculator {
    config: SolverConfig,
}

impl IrrCalculator {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Build the schedule, solve it and format the result
    pub fn calculate(&self, inputs: &IrrInputs) -> CalculationOutcome {
        let schedule = match CashFlowSchedule::from_inputs(inputs) {
            Ok(s) => s,
            Err(e) => {
                warn!("Rejected inputs {:?}: {}", inputs, e);
                return CalculationOutcome::InvalidInput { message: e.to_string() };
            }
        };

        match compute_irr(&schedule, &self.config) {
            Ok(solution) => {
                info!(
                    "IRR {:.6} for {} periods ({:?}, {} iterations)",
                    solution.rate,
                    schedule.len(),
                    solution.method,
                    solution.iterations
                );
                CalculationOutcome::Success(IrrReport::new(&schedule, &solution))
            }
            Err(failure) => {
                warn!("{}", failure);
                CalculationOutcome::Failure {
                    message: FAILURE_MESSAGE.to_string(),
                    reason: failure.reason,
                }
            }
        }
    }
}
