//! Cash flow schedule built from the calculator inputs

use super::inputs::{InputError, IrrInputs};
use serde::Serialize;

/// Ordered annual cash flows, index 0 = year 1
///
/// Layout for a schedule built from inputs:
/// `deposit_years` deposits, then `total_years - deposit_years` zeros,
/// then one dedicated payout year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashFlowSchedule {
    amounts: Vec<f64>,
    deposit_years: u32,
    gap_years: u32,
}

impl CashFlowSchedule {
    /// Build the deposit / gap / payout schedule
    pub fn from_inputs(inputs: &IrrInputs) -> Result<Self, InputError> {
        inputs.validate()?;

        let deposit_years = inputs.deposit_years;
        let gap_years = inputs.gap_years();

        let mut amounts = Vec::with_capacity(inputs.total_years as usize + 1);
        amounts.extend(std::iter::repeat(inputs.annual_deposit).take(deposit_years as usize));
        amounts.extend(std::iter::repeat(0.0).take(gap_years as usize));
        amounts.push(inputs.final_amount);

        Ok(Self {
            amounts,
            deposit_years,
            gap_years,
        })
    }

    /// Wrap an arbitrary list of annual amounts
    pub fn from_amounts(amounts: Vec<f64>) -> Self {
        Self {
            amounts,
            deposit_years: 0,
            gap_years: 0,
        }
    }

    pub fn amounts(&self) -> &[f64] {
        &self.amounts
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    pub fn deposit_years(&self) -> u32 {
        self.deposit_years
    }

    pub fn gap_years(&self) -> u32 {
        self.gap_years
    }

    /// Amount in the last period (the payout for input-built schedules)
    pub fn final_amount(&self) -> Option<f64> {
        self.amounts.last().copied()
    }

    /// (year, amount) pairs, years numbered from 1
    pub fn periods(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.amounts
            .iter()
            .enumerate()
            .map(|(i, &cf)| (i as u32 + 1, cf))
    }

    /// Net present value with end-of-year discounting:
    /// sum of cf[i] / (1 + r)^(i + 1)
    pub fn npv(&self, rate: f64) -> f64 {
        self.amounts
            .iter()
            .enumerate()
            .map(|(i, &cf)| cf / (1.0 + rate).powi(i as i32 + 1))
            .sum()
    }

    /// NPV and its derivative with respect to rate
    pub fn npv_and_derivative(&self, rate: f64) -> (f64, f64) {
        let mut npv = 0.0;
        let mut dnpv = 0.0;

        for (i, &cf) in self.amounts.iter().enumerate() {
            let t = i as i32 + 1;
            npv += cf / (1.0 + rate).powi(t);
            dnpv -= (t as f64) * cf / (1.0 + rate).powi(t + 1);
        }

        (npv, dnpv)
    }

    /// NPV multiplied by a positive factor: same sign as `npv`, but finite
    /// for every rate above -1 however long the schedule.
    ///
    /// For r >= 0 this is the NPV itself with the discount built up by
    /// repeated multiplication, so it underflows instead of overflowing.
    /// For r < 0 it is NPV * (1 + r)^n = sum of cf[i] * (1 + r)^(n - 1 - i).
    pub fn scaled_npv(&self, rate: f64) -> f64 {
        let mut total = 0.0;

        if rate >= 0.0 {
            let v = 1.0 / (1.0 + rate);
            let mut factor = v;
            for &cf in &self.amounts {
                total += cf * factor;
                factor *= v;
            }
        } else {
            let growth = 1.0 + rate;
            let mut factor = 1.0;
            for &cf in self.amounts.iter().rev() {
                total += cf * factor;
                factor *= growth;
            }
        }

        total
    }

    /// Sum of absolute amounts, used to scale residual checks
    pub fn gross_magnitude(&self) -> f64 {
        self.amounts.iter().map(|cf| cf.abs()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_simple_schedule() {
        let schedule = CashFlowSchedule::from_inputs(&IrrInputs::new(-1000.0, 1, 1100.0, 1)).unwrap();
        assert_eq!(schedule.amounts(), &[-1000.0, 1100.0]);
    }

    #[test]
    fn test_schedule_layout() {
        let inputs = IrrInputs::new(-250.0, 3, 2000.0, 7);
        let schedule = CashFlowSchedule::from_inputs(&inputs).unwrap();

        assert_eq!(schedule.len(), 8);
        assert!(schedule.amounts()[..3].iter().all(|&cf| cf == -250.0));
        assert!(schedule.amounts()[3..7].iter().all(|&cf| cf == 0.0));
        assert_eq!(schedule.final_amount(), Some(2000.0));
        assert_eq!(schedule.deposit_years(), 3);
        assert_eq!(schedule.gap_years(), 4);
    }

    #[test]
    fn test_length_invariant_across_inputs() {
        for total in 1..=40u32 {
            for deposits in 1..=total {
                let inputs = IrrInputs::new(-100.0, deposits, 5000.0, total);
                let schedule = CashFlowSchedule::from_inputs(&inputs).unwrap();
                assert_eq!(schedule.len(), total as usize + 1);
                assert_eq!(schedule.amounts()[deposits as usize - 1], -100.0);
                assert_eq!(schedule.final_amount(), Some(5000.0));
            }
        }
    }

    #[test]
    fn test_payout_keeps_its_own_period_without_gap() {
        // No zero years: the payout still follows the last deposit
        let schedule = CashFlowSchedule::from_inputs(&IrrInputs::new(-500.0, 4, 3000.0, 4)).unwrap();
        assert_eq!(schedule.amounts(), &[-500.0, -500.0, -500.0, -500.0, 3000.0]);
        assert_eq!(schedule.gap_years(), 0);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let result = CashFlowSchedule::from_inputs(&IrrInputs::new(-500.0, 5, 3000.0, 4));
        assert!(result.is_err());
    }

    #[test]
    fn test_periods_start_at_year_one() {
        let schedule = CashFlowSchedule::from_amounts(vec![-10.0, 0.0, 12.0]);
        let periods: Vec<_> = schedule.periods().collect();
        assert_eq!(periods, vec![(1, -10.0), (2, 0.0), (3, 12.0)]);
    }

    #[test]
    fn test_npv_at_ten_percent() {
        let schedule = CashFlowSchedule::from_amounts(vec![-1000.0, 1100.0]);
        assert_relative_eq!(schedule.npv(0.10), 0.0, epsilon = 1e-9);
        assert_relative_eq!(schedule.npv(0.0), 100.0, epsilon = 1e-12);
    }

    #[test]
    fn test_scaled_npv_keeps_sign_and_stays_finite() {
        let schedule = CashFlowSchedule::from_amounts(vec![-1000.0, 1100.0]);
        for rate in [-0.5, 0.0, 0.05, 0.2, 3.0] {
            let npv = schedule.npv(rate);
            let scaled = schedule.scaled_npv(rate);
            assert_eq!(npv.signum(), scaled.signum(), "rate {}", rate);
        }
        assert_relative_eq!(schedule.scaled_npv(0.05), schedule.npv(0.05), max_relative = 1e-12);

        // 400 years near r = -1 overflows the plain NPV
        let mut long = vec![-100.0; 20];
        long.extend(vec![0.0; 380]);
        long.push(100_000.0);
        let schedule = CashFlowSchedule::from_amounts(long);
        assert!(!schedule.npv(-0.99).is_finite());
        assert!(schedule.scaled_npv(-0.99).is_finite());
        assert!(schedule.scaled_npv(-0.99) > 0.0);
        assert!(schedule.scaled_npv(1e12).is_finite());
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let schedule = CashFlowSchedule::from_inputs(&IrrInputs::default()).unwrap();
        let rate = 0.04;
        let h = 1e-6;
        let (npv, dnpv) = schedule.npv_and_derivative(rate);
        let numeric = (schedule.npv(rate + h) - schedule.npv(rate - h)) / (2.0 * h);

        assert_relative_eq!(npv, schedule.npv(rate), epsilon = 1e-9);
        assert_relative_eq!(dnpv, numeric, max_relative = 1e-5);
    }
}
