//! IRR Calculator - internal rate of return for level deposit schedules
//!
//! This library provides:
//! - Cash flow schedules built from annual deposits, a zero-flow gap and a final payout
//! - An IRR solver (Newton-Raphson with bisection fallback) with explicit failure reporting
//! - Report formatting for the rate and the year-by-year cash flow table

pub mod schedule;
pub mod irr;
pub mod report;
pub mod calculator;

// Re-export commonly used types
pub use schedule::{CashFlowSchedule, IrrInputs, InputError};
pub use irr::{compute_irr, ConvergenceFailure, FailureReason, IrrResult, IrrSolution, SolverConfig};
pub use report::IrrReport;
pub use calculator::{CalculationOutcome, IrrCalculator};
