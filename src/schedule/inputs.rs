//! Calculator inputs matching the deposit/payout form

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Default annual deposit (negative = money paid in)
pub const DEFAULT_ANNUAL_DEPOSIT: f64 = -4062.50;
/// Default number of deposit years
pub const DEFAULT_DEPOSIT_YEARS: u32 = 20;
/// Default final payout
pub const DEFAULT_FINAL_AMOUNT: f64 = 495_913.00;
/// Default investment period in years
pub const DEFAULT_TOTAL_YEARS: u32 = 46;

fn default_annual_deposit() -> f64 {
    DEFAULT_ANNUAL_DEPOSIT
}

fn default_deposit_years() -> u32 {
    DEFAULT_DEPOSIT_YEARS
}

fn default_final_amount() -> f64 {
    DEFAULT_FINAL_AMOUNT
}

fn default_total_years() -> u32 {
    DEFAULT_TOTAL_YEARS
}

/// Rejected calculator inputs
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{field} must be at least 1")]
    ZeroYears { field: &'static str },

    #[error("years of deposits ({deposit_years}) cannot exceed the total investment period ({total_years})")]
    DepositsExceedTotal { deposit_years: u32, total_years: u32 },

    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
}

/// The four values entered on the calculator form
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrInputs {
    /// Amount deposited each year for the first `deposit_years` years
    #[serde(default = "default_annual_deposit")]
    pub annual_deposit: f64,

    /// Number of years with a deposit
    #[serde(default = "default_deposit_years")]
    pub deposit_years: u32,

    /// Single payout received after the investment period
    #[serde(default = "default_final_amount")]
    pub final_amount: f64,

    /// Total investment period in years (deposits plus the zero-flow gap)
    #[serde(default = "default_total_years")]
    pub total_years: u32,
}

impl Default for IrrInputs {
    fn default() -> Self {
        Self {
            annual_deposit: DEFAULT_ANNUAL_DEPOSIT,
            deposit_years: DEFAULT_DEPOSIT_YEARS,
            final_amount: DEFAULT_FINAL_AMOUNT,
            total_years: DEFAULT_TOTAL_YEARS,
        }
    }
}

impl IrrInputs {
    pub fn new(annual_deposit: f64, deposit_years: u32, final_amount: f64, total_years: u32) -> Self {
        Self {
            annual_deposit,
            deposit_years,
            final_amount,
            total_years,
        }
    }

    /// Read inputs from the environment, falling back to the defaults
    ///
    /// Variables: ANNUAL_DEPOSIT, DEPOSIT_YEARS, FINAL_AMOUNT, TOTAL_YEARS.
    /// Values that fail to parse are ignored.
    pub fn from_env() -> Self {
        Self {
            annual_deposit: env::var("ANNUAL_DEPOSIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_ANNUAL_DEPOSIT),
            deposit_years: env::var("DEPOSIT_YEARS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_DEPOSIT_YEARS),
            final_amount: env::var("FINAL_AMOUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_FINAL_AMOUNT),
            total_years: env::var("TOTAL_YEARS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TOTAL_YEARS),
        }
    }

    /// Years with neither a deposit nor the payout
    pub fn gap_years(&self) -> u32 {
        self.total_years.saturating_sub(self.deposit_years)
    }

    /// Check the constraints the form widgets would otherwise enforce
    pub fn validate(&self) -> Result<(), InputError> {
        if !self.annual_deposit.is_finite() {
            return Err(InputError::NonFinite { field: "annual_deposit" });
        }
        if !self.final_amount.is_finite() {
            return Err(InputError::NonFinite { field: "final_amount" });
        }
        if self.deposit_years == 0 {
            return Err(InputError::ZeroYears { field: "deposit_years" });
        }
        if self.total_years == 0 {
            return Err(InputError::ZeroYears { field: "total_years" });
        }
        if self.deposit_years > self.total_years {
            return Err(InputError::DepositsExceedTotal {
                deposit_years: self.deposit_years,
                total_years: self.total_years,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_form() {
        let inputs = IrrInputs::default();
        assert_eq!(inputs.annual_deposit, -4062.50);
        assert_eq!(inputs.deposit_years, 20);
        assert_eq!(inputs.final_amount, 495913.00);
        assert_eq!(inputs.total_years, 46);
        assert_eq!(inputs.gap_years(), 26);
        assert!(inputs.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_years() {
        let zero = IrrInputs::new(-100.0, 0, 500.0, 5);
        assert_eq!(zero.validate(), Err(InputError::ZeroYears { field: "deposit_years" }));

        let inverted = IrrInputs::new(-100.0, 6, 500.0, 5);
        assert_eq!(
            inverted.validate(),
            Err(InputError::DepositsExceedTotal { deposit_years: 6, total_years: 5 })
        );
    }

    #[test]
    fn test_long_periods_accepted() {
        // Only the lower bounds apply to the year counts
        assert!(IrrInputs::new(-100.0, 20, 100_000.0, 150).validate().is_ok());
        assert!(IrrInputs::new(-100.0, 20, 100_000.0, 1000).validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_non_finite_amounts() {
        let inputs = IrrInputs::new(f64::NAN, 1, 500.0, 5);
        assert_eq!(inputs.validate(), Err(InputError::NonFinite { field: "annual_deposit" }));
    }

    #[test]
    fn test_missing_json_fields_take_defaults() {
        let inputs: IrrInputs = serde_json::from_str(r#"{"deposit_years": 10}"#).unwrap();
        assert_eq!(inputs.deposit_years, 10);
        assert_eq!(inputs.annual_deposit, DEFAULT_ANNUAL_DEPOSIT);
        assert_eq!(inputs.total_years, DEFAULT_TOTAL_YEARS);
    }
}
