//! IRR solver for a cash flow schedule

mod error;
mod solver;

pub use error::{ConvergenceFailure, FailureReason};
pub use solver::{compute_irr, INITIAL_BRACKET, MIN_GROWTH, RATE_CEILING};

use serde::Serialize;
use std::env;

/// Default starting rate for Newton-Raphson (5%)
pub const DEFAULT_INITIAL_GUESS: f64 = 0.05;

/// Default tolerance on the rate step / bracket half-width
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default iteration budget for each solver phase
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Outcome of a solve: a converged rate or an explicit failure
pub type IrrResult = Result<IrrSolution, ConvergenceFailure>;

/// Solver settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Starting rate for Newton-Raphson
    pub initial_guess: f64,
    /// Convergence tolerance on the rate
    pub tolerance: f64,
    /// Iterations allowed for Newton, and again for the bisection fallback
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            initial_guess: DEFAULT_INITIAL_GUESS,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Read IRR_INITIAL_GUESS, IRR_TOLERANCE and IRR_MAX_ITERATIONS, falling back to the defaults
    pub fn from_env() -> Self {
        Self {
            initial_guess: env::var("IRR_INITIAL_GUESS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_INITIAL_GUESS),
            tolerance: env::var("IRR_TOLERANCE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TOLERANCE),
            max_iterations: env::var("IRR_MAX_ITERATIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_ITERATIONS),
        }
    }

    #[must_use]
    pub fn with_initial_guess(mut self, initial_guess: f64) -> Self {
        self.initial_guess = initial_guess;
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Which phase produced the rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveMethod {
    Newton,
    Bisection,
}

/// A converged rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IrrSolution {
    /// Annual rate as a decimal (0.05 for 5%)
    pub rate: f64,
    /// Total iterations across both phases
    pub iterations: u32,
    /// NPV at `rate`
    pub npv_residual: f64,
    pub method: SolveMethod,
}

impl IrrSolution {
    pub fn rate_pct(&self) -> f64 {
        self.rate * 100.0
    }
}
