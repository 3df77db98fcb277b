//! IRR Calculator CLI
//!
//! Computes the internal rate of return for a run of annual deposits followed
//! by a single payout. Every input can come from a flag, an environment
//! variable (ANNUAL_DEPOSIT, DEPOSIT_YEARS, FINAL_AMOUNT, TOTAL_YEARS,
//! IRR_INITIAL_GUESS, IRR_TOLERANCE, IRR_MAX_ITERATIONS) or the default,
//! in that order of precedence.
//!
//! ```bash
//! irr_calculator --annual-deposit -1000 --deposit-years 1 --final-amount 1100 --total-years 1
//! irr_calculator --json
//! irr_calculator --csv cash_flows.csv
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use irr_calculator::{CalculationOutcome, IrrCalculator, IrrInputs, IrrReport, SolverConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "irr_calculator", version, about = "Internal rate of return for annual deposits and a final payout")]
struct Cli {
    /// Amount deposited each year (negative = paid in)
    #[arg(long, allow_hyphen_values = true)]
    annual_deposit: Option<f64>,

    /// Number of years with a deposit
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    deposit_years: Option<u32>,

    /// Payout received after the investment period
    #[arg(long, allow_hyphen_values = true)]
    final_amount: Option<f64>,

    /// Total investment period in years
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    total_years: Option<u32>,

    /// Starting rate for the solver
    #[arg(long, allow_hyphen_values = true)]
    initial_guess: Option<f64>,

    /// Convergence tolerance on the rate
    #[arg(long)]
    tolerance: Option<f64>,

    /// Iteration budget per solver phase
    #[arg(long)]
    max_iterations: Option<u32>,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,

    /// Write the cash flow table to a CSV file
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,
}

impl Cli {
    fn inputs(&self) -> IrrInputs {
        let env = IrrInputs::from_env();
        IrrInputs {
            annual_deposit: self.annual_deposit.unwrap_or(env.annual_deposit),
            deposit_years: self.deposit_years.unwrap_or(env.deposit_years),
            final_amount: self.final_amount.unwrap_or(env.final_amount),
            total_years: self.total_years.unwrap_or(env.total_years),
        }
    }

    fn solver_config(&self) -> SolverConfig {
        let env = SolverConfig::from_env();
        SolverConfig {
            initial_guess: self.initial_guess.unwrap_or(env.initial_guess),
            tolerance: self.tolerance.unwrap_or(env.tolerance),
            max_iterations: self.max_iterations.unwrap_or(env.max_iterations),
        }
    }
}

fn main() -> Result<ExitCode> {
    env_logger::init();

    let cli = Cli::parse();
    let inputs = cli.inputs();
    let calculator = IrrCalculator::new(cli.solver_config());

    let outcome = calculator.calculate(&inputs);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&inputs, &outcome);
    }

    if let (Some(path), Some(report)) = (cli.csv.as_deref(), outcome.report()) {
        write_csv(path, report)?;
        if !cli.json {
            println!("\nCash flow table written to: {}", path.display());
        }
    }

    if outcome.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn print_outcome(inputs: &IrrInputs, outcome: &CalculationOutcome) {
    println!("Internal Rate of Return (IRR) Calculator");
    println!("========================================\n");
    println!("  Annual Deposit:       {:.2}", inputs.annual_deposit);
    println!("  Years of Deposits:    {}", inputs.deposit_years);
    println!("  Final Amount:         {:.2}", inputs.final_amount);
    println!("  Total Period (Years): {}", inputs.total_years);
    println!();

    match outcome {
        CalculationOutcome::Success(report) => {
            println!("========================================");
            println!("  {}", report.headline);
            println!("========================================");

            println!("\nCash Flow Timeline");
            for line in &report.timeline {
                println!("  {}", line);
            }
            println!();
            println!("{}", report.render_table());
        }
        CalculationOutcome::Failure { message, reason } => {
            eprintln!("{} ({})", message, reason);
        }
        CalculationOutcome::InvalidInput { message } => {
            eprintln!("Invalid input: {}", message);
        }
    }
}

fn write_csv(path: &Path, report: &IrrReport) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Unable to create CSV file {}", path.display()))?;

    for row in &report.cash_flows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
