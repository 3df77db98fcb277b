//! Calculator inputs and the cash flow schedule they produce

mod inputs;
mod cashflows;

pub use inputs::{
    IrrInputs, InputError, DEFAULT_ANNUAL_DEPOSIT, DEFAULT_DEPOSIT_YEARS, DEFAULT_FINAL_AMOUNT,
    DEFAULT_TOTAL_YEARS,
};
pub use cashflows::CashFlowSchedule;
