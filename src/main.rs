//! Topup command-line entry point
//!
//! Loads a catalog fixture and either optimises a single budget (`--budget`) or
//! sweeps a range of budgets, printing the results as tables.

use std::{
    io::{self, Write},
    process::ExitCode,
    time::Instant,
};

use humanize_duration::{Truncate, prelude::DurationExt};
use thiserror::Error;
use tracing::{debug, error, info};

use topup::{
    config::Config,
    fixtures::{FixtureError, Fixtures},
    observability::init_subscriber,
    report::{self, ReportError},
    solvers::{
        Optimizer, SolverError,
        ilp::{ILPOptimizer, TracingObserver},
    },
    sweep::{BudgetRange, Sweep, SweepError, sweep},
};

/// Errors that end a run
#[derive(Debug, Error)]
enum RunError {
    /// Catalog could not be loaded
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    /// Single-budget optimisation failed
    #[error(transparent)]
    Solver(#[from] SolverError),

    /// Sweep failed or was misconfigured
    #[error(transparent)]
    Sweep(#[from] SweepError),

    /// Report could not be written
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Writing to stdout failed
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Topup entry point
fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(error) => {
            let code = u8::try_from(error.exit_code()).unwrap_or(2);

            if error.print().is_err() {
                return ExitCode::FAILURE;
            }

            return ExitCode::from(code);
        }
    };

    if let Err(error) = init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for setup errors"
        )]
        {
            eprintln!("Logging error: {error}");
        }

        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "topup failed");

            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), RunError> {
    let named = Fixtures::with_base_path(&config.fixtures).load_catalog(&config.catalog)?;

    info!(
        catalog = %named.name,
        price_points = named.catalog.len(),
        "catalog loaded"
    );

    let optimizer = config
        .time_limit()
        .map_or_else(ILPOptimizer::new, ILPOptimizer::with_time_limit);

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    writeln!(
        handle,
        "{} ({})",
        named.name,
        named.currency.as_deref().unwrap_or("no currency")
    )?;

    let start = Instant::now();

    if let Some(budget) = config.budget {
        for &mode in config.mode.modes() {
            let result = if config.trace_model {
                let mut observer = TracingObserver::default();
                let result =
                    optimizer.optimize_with_observer(budget, mode, &named.catalog, &mut observer)?;

                debug!(
                    variables = observer.variables(),
                    constraints = observer.constraints(),
                    "model traced"
                );

                result
            } else {
                optimizer.optimize_mode(budget, mode, &named.catalog)?
            };

            writeln!(handle, "\nBudget {budget}")?;

            report::allocation_table(&mut handle, &result, &named.catalog)?;
        }
    } else {
        let range = BudgetRange::new(config.start, config.end, config.step)?;

        let sweeps = config
            .mode
            .modes()
            .iter()
            .map(|&mode| {
                sweep(
                    &optimizer,
                    &named.catalog,
                    range,
                    mode,
                    config.on_failure.into(),
                )
            })
            .collect::<Result<Vec<Sweep>, SweepError>>()?;

        let sweep_refs: Vec<&Sweep> = sweeps.iter().collect();

        report::sweep_table(&mut handle, &sweep_refs)?;
    }

    let elapsed = start.elapsed();

    writeln!(
        handle,
        "\n {} ({}s)",
        elapsed.human(Truncate::Nano),
        elapsed.as_secs_f32()
    )?;

    Ok(())
}
