use std::process::ExitCode;

use fragsort_bench::output::TerminalSink;
use fragsort_bench::preflight::run_preflight;
use fragsort_bench::{run_with_clock, AnyClock, Config};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    // Logs go to stderr; the table owns stdout.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::default().from_env();
    if let Err(err) = config.validate() {
        error!("{}", err);
        return ExitCode::FAILURE;
    }

    let clock = AnyClock::from_spec(config.clock);
    info!(clock = clock.name(), trials = config.trials, "timing with");
    run_preflight(&clock, config.min_trial_duration).log();

    let mut sink = TerminalSink::stdout();
    let result = run_with_clock(&config, clock, &mut sink);
    if let Err(err) = sink.finish() {
        error!("writing report: {}", err);
        return ExitCode::FAILURE;
    }
    match result {
        Ok(rows) => {
            info!(rows = rows.len(), "sweep finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
