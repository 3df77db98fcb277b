//! Convergence failure reported by the IRR solver

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Why no rate was returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Nothing to solve
    EmptySchedule,
    /// A cash flow was NaN or infinite
    NonFiniteCashFlow,
    /// All flows share a sign (or are all zero), so no real rate exists
    NoSignChange,
    /// Newton failed and the fallback interval does not bracket a root
    NoBracket,
    /// Iteration budget exhausted before reaching the tolerance
    IterationLimit,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureReason::EmptySchedule => "cash flow schedule is empty",
            FailureReason::NonFiniteCashFlow => "cash flow schedule contains a non-finite amount",
            FailureReason::NoSignChange => "cash flows never change sign",
            FailureReason::NoBracket => "no root found in the search interval",
            FailureReason::IterationLimit => "iteration limit reached",
        };
        f.write_str(text)
    }
}

/// The single solver error: no rate met the tolerance
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("IRR did not converge after {iterations} iterations: {reason}")]
pub struct ConvergenceFailure {
    pub reason: FailureReason,
    pub iterations: u32,
}

impl ConvergenceFailure {
    pub fn new(reason: FailureReason, iterations: u32) -> Self {
        Self { reason, iterations }
    }

    pub(crate) fn immediate(reason: FailureReason) -> Self {
        Self::new(reason, 0)
    }
}
