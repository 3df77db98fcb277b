//! User-facing rendering of a solved schedule
//!
//! Produces the headline rate, the timeline summary and the year-by-year
//! cash flow table shown after a calculation.

use crate::irr::{IrrSolution, SolveMethod};
use crate::schedule::CashFlowSchedule;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Message shown when the solver reports a convergence failure
pub const FAILURE_MESSAGE: &str = "Failed to converge. Try adjusting the inputs.";

/// One row of the cash flow timeline table
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct CashFlowRow {
    #[tabled(rename = "Year")]
    pub year: u32,
    #[tabled(rename = "Cash Flow")]
    pub cash_flow: String,
}

/// Everything displayed for a successful calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrrReport {
    /// Rate as a decimal
    pub rate: f64,
    /// Rate to four decimals, e.g. "0.0497"
    pub rate_display: String,
    /// Rate as a percentage, e.g. "4.97%"
    pub rate_pct: String,
    /// "IRR = 0.0497 or 4.97%"
    pub headline: String,
    pub timeline: Vec<String>,
    pub cash_flows: Vec<CashFlowRow>,
    pub iterations: u32,
    pub method: SolveMethod,
}

impl IrrReport {
    pub fn new(schedule: &CashFlowSchedule, solution: &IrrSolution) -> Self {
        let rate_display = format!("{:.4}", solution.rate);
        let rate_pct = format!("{:.2}%", solution.rate_pct());
        let headline = format!("IRR = {} or {}", rate_display, rate_pct);

        Self {
            rate: solution.rate,
            rate_display,
            rate_pct,
            headline,
            timeline: timeline(schedule),
            cash_flows: cash_flow_rows(schedule),
            iterations: solution.iterations,
            method: solution.method,
        }
    }

    /// Render the cash flow table for a terminal
    pub fn render_table(&self) -> String {
        Table::new(&self.cash_flows).with(Style::modern()).to_string()
    }
}

/// Three-line description of the deposit, gap and payout phases
pub fn timeline(schedule: &CashFlowSchedule) -> Vec<String> {
    let deposit = schedule.amounts().first().copied().unwrap_or(0.0);
    let payout = schedule.final_amount().unwrap_or(0.0);

    vec![
        format!(
            "First {} years: Annual deposit of {}",
            schedule.deposit_years(),
            format_currency(deposit)
        ),
        format!("Next {} years: No deposits", schedule.gap_years()),
        format!("Final year: Payout of {}", format_currency(payout)),
    ]
}

/// (year, formatted amount) rows for every period
pub fn cash_flow_rows(schedule: &CashFlowSchedule) -> Vec<CashFlowRow> {
    schedule
        .periods()
        .map(|(year, amount)| CashFlowRow {
            year,
            cash_flow: format_currency(amount),
        })
        .collect()
}

/// Dollar amount with thousands separators and two decimals.
/// The sign follows the dollar sign: `-4062.5` renders as `$-4,062.50`.
pub fn format_currency(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // No "-0.00"
    let sign = if amount < 0.0 && formatted != "0.00" { "-" } else { "" };

    format!("${}{}.{}", sign, grouped, frac_part)
}
