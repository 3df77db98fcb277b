//! Internal Rate of Return (IRR) root finding
//!
//! Newton-Raphson on the analytic NPV derivative, with a bisection fallback
//! when Newton stalls, diverges or runs out of iterations. The fallback
//! widens its bracket geometrically toward r = -1 and upward until the NPV
//! changes sign, so any root in (-1, RATE_CEILING] can be found.

use super::error::{ConvergenceFailure, FailureReason};
use super::{IrrResult, IrrSolution, SolveMethod, SolverConfig};
use crate::schedule::CashFlowSchedule;
use log::{debug, warn};

/// Bracket the fallback starts from
pub const INITIAL_BRACKET: (f64, f64) = (-0.99, 10.0);
/// Highest rate the solver will consider
pub const RATE_CEILING: f64 = 1e12;
/// Smallest growth factor 1 + r the solver will consider
pub const MIN_GROWTH: f64 = 1e-12;

/// Amounts smaller than this count as zero when looking for a sign change
const SIGN_THRESHOLD: f64 = 1e-10;
/// Newton is abandoned below this derivative magnitude
const MIN_DERIVATIVE: f64 = 1e-20;
/// Accepted |NPV| at a Newton root, relative to the gross cash flow
const RESIDUAL_SCALE: f64 = 1e-6;
/// Consecutive growing residuals before Newton gives up
const MAX_DIVERGENCE: u32 = 3;
/// Bracket widening factor per step
const EXPANSION: f64 = 10.0;
/// Widening steps needed to reach both RATE_CEILING and MIN_GROWTH
const MAX_EXPANSIONS: u32 = 12;

/// Find the rate at which the schedule's NPV is zero
///
/// # Returns
/// * `Ok(IrrSolution)` - annual rate as a decimal (0.05 for 5%) plus solve statistics
/// * `Err(ConvergenceFailure)` - no rate met the tolerance; no rate is reported
pub fn compute_irr(schedule: &CashFlowSchedule, config: &SolverConfig) -> IrrResult {
    let cashflows = schedule.amounts();

    if cashflows.is_empty() {
        warn!("IRR requested for an empty schedule");
        return Err(ConvergenceFailure::immediate(FailureReason::EmptySchedule));
    }

    if cashflows.iter().any(|cf| !cf.is_finite()) {
        warn!("IRR requested for a schedule with non-finite amounts");
        return Err(ConvergenceFailure::immediate(FailureReason::NonFiniteCashFlow));
    }

    // At least one sign change is required for an IRR to exist
    let has_positive = cashflows.iter().any(|&cf| cf > SIGN_THRESHOLD);
    let has_negative = cashflows.iter().any(|&cf| cf < -SIGN_THRESHOLD);
    if !has_positive || !has_negative {
        warn!("No sign change in {} cash flows, IRR does not exist", cashflows.len());
        return Err(ConvergenceFailure::immediate(FailureReason::NoSignChange));
    }

    let residual_limit = RESIDUAL_SCALE * schedule.gross_magnitude();

    match newton(schedule, config, residual_limit) {
        Ok(solution) => Ok(solution),
        Err(spent) => {
            warn!("Newton-Raphson gave up after {} iterations, falling back to bisection", spent);
            bisection(schedule, config, spent)
        }
    }
}

/// Newton-Raphson from the configured initial guess.
/// On failure returns the number of iterations spent.
fn newton(schedule: &CashFlowSchedule, config: &SolverConfig, residual_limit: f64) -> Result<IrrSolution, u32> {
    if config.initial_guess.is_nan() || config.initial_guess <= -1.0 {
        debug!("Newton: initial guess {} outside (-1, inf)", config.initial_guess);
        return Err(0);
    }

    let mut rate = config.initial_guess.min(RATE_CEILING);
    let mut prev_residual = f64::MAX;
    let mut divergence_count = 0;

    for iteration in 0..config.max_iterations {
        let (npv, dnpv) = schedule.npv_and_derivative(rate);

        if !npv.is_finite() || !dnpv.is_finite() {
            debug!("Newton: non-finite NPV at rate {}", rate);
            return Err(iteration);
        }

        let residual = npv.abs();
        if residual > prev_residual * 2.0 {
            divergence_count += 1;
            if divergence_count >= MAX_DIVERGENCE {
                debug!("Newton: diverging at rate {} (|NPV| = {:.3e})", rate, residual);
                return Err(iteration);
            }
        } else {
            divergence_count = 0;
        }
        prev_residual = residual;

        if dnpv.abs() < MIN_DERIVATIVE {
            debug!("Newton: derivative vanished at rate {}", rate);
            return Err(iteration);
        }

        let mut new_rate = rate - npv / dnpv;
        if new_rate <= -1.0 {
            // Stay inside the domain: go halfway from the current rate to -1
            new_rate = 0.5 * (rate - 1.0);
        }
        let new_rate = new_rate.min(RATE_CEILING);
        let step = new_rate - rate;
        rate = new_rate;

        if step.abs() < config.tolerance * rate.abs().max(1.0) {
            let npv_residual = schedule.npv(rate);
            if npv_residual.abs() <= residual_limit {
                debug!("Newton: converged to {} in {} iterations", rate, iteration + 1);
                return Ok(IrrSolution {
                    rate,
                    iterations: iteration + 1,
                    npv_residual,
                    method: SolveMethod::Newton,
                });
            }
            // Pinned against the ceiling with the NPV still far from zero
            debug!("Newton: stalled at rate {} with NPV {:.3e}", rate, npv_residual);
            return Err(iteration + 1);
        }
    }

    Err(config.max_iterations)
}

/// Rate interval whose ends have NPVs of opposite sign (or a zero end)
#[derive(Debug, Clone, Copy)]
struct Bracket {
    low: f64,
    high: f64,
    f_low: f64,
    f_high: f64,
}

impl Bracket {
    fn straddles_root(&self) -> bool {
        self.f_low == 0.0 || self.f_high == 0.0 || (self.f_low < 0.0) != (self.f_high < 0.0)
    }
}

/// Widen the initial bracket until the NPV changes sign across it.
/// Signs come from `scaled_npv`, which stays finite for long schedules.
fn find_bracket(schedule: &CashFlowSchedule) -> Option<Bracket> {
    let (low, high) = INITIAL_BRACKET;
    let mut bracket = Bracket {
        low,
        high,
        f_low: schedule.scaled_npv(low),
        f_high: schedule.scaled_npv(high),
    };

    for _ in 0..MAX_EXPANSIONS {
        if bracket.straddles_root() {
            return Some(bracket);
        }

        bracket.low = -1.0 + ((1.0 + bracket.low) / EXPANSION).max(MIN_GROWTH);
        bracket.high = (bracket.high * EXPANSION).min(RATE_CEILING);
        bracket.f_low = schedule.scaled_npv(bracket.low);
        bracket.f_high = schedule.scaled_npv(bracket.high);
        debug!("Bisection: widened bracket to [{}, {}]", bracket.low, bracket.high);
    }

    if bracket.straddles_root() {
        Some(bracket)
    } else {
        None
    }
}

/// Bisection over a widened bracket. Splits at the geometric mean of
/// 1 + r while the bracket spans more than a factor of two, then at the
/// arithmetic midpoint.
fn bisection(schedule: &CashFlowSchedule, config: &SolverConfig, spent: u32) -> IrrResult {
    let bracket = match find_bracket(schedule) {
        Some(b) => b,
        None => {
            warn!(
                "Bisection: no sign change between 1 + r = {:e} and r = {:e}",
                MIN_GROWTH, RATE_CEILING
            );
            return Err(ConvergenceFailure::new(FailureReason::NoBracket, spent));
        }
    };

    for (rate, f) in [(bracket.low, bracket.f_low), (bracket.high, bracket.f_high)] {
        if f == 0.0 {
            return Ok(IrrSolution {
                rate,
                iterations: spent,
                npv_residual: 0.0,
                method: SolveMethod::Bisection,
            });
        }
    }

    let Bracket { mut low, mut high, mut f_low, .. } = bracket;

    for iteration in 0..config.max_iterations {
        let mid = if 1.0 + high > 2.0 * (1.0 + low) {
            ((1.0 + low) * (1.0 + high)).sqrt() - 1.0
        } else {
            0.5 * (low + high)
        };
        let f_mid = schedule.scaled_npv(mid);

        let converged = f_mid == 0.0
            || 0.5 * (high - low) < config.tolerance * mid.abs().max(1.0)
            || mid <= low
            || mid >= high;

        if converged {
            debug!("Bisection: converged to {} in {} iterations", mid, iteration + 1);
            return Ok(IrrSolution {
                rate: mid,
                iterations: spent + iteration + 1,
                npv_residual: schedule.npv(mid),
                method: SolveMethod::Bisection,
            });
        }

        if (f_low < 0.0) != (f_mid < 0.0) {
            high = mid;
        } else {
            low = mid;
            f_low = f_mid;
        }
    }

    warn!("Bisection: iteration limit of {} reached", config.max_iterations);
    Err(ConvergenceFailure::new(
        FailureReason::IterationLimit,
        spent + config.max_iterations,
    ))
}
