//! chcon - change the security context of files
//!
//! Thin front end: parses flags, resolves the traversal policy, and hands
//! the named files to the traversal engine.

mod cli;
mod error;
mod events;
mod logging;

use crate::cli::Cli;
use crate::error::CliError;
use crate::events::EventForwarder;
use crate::logging::init_tracing;
use clap::Parser;
use selutils_config::Config;
use selutils_events::{EventEmitter, GeneralEvent};
use selutils_platform::Platform;
use selutils_traverse::{EngineOptions, ResultAggregator, TraversalEngine};
use selutils_types::TraversalPolicy;
use std::path::Path;
use std::process;
use tracing::{debug, error};

fn main() {
    let program = program_name();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version print to stdout and succeed.
            let code = i32::from(err.use_stderr());
            let _ = err.print();
            process::exit(code);
        }
    };

    match run(&program, &cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("{e}");
            eprintln!("{}", e.render(&program));
            process::exit(1);
        }
    }
}

/// Basename of `argv[0]`, used as the diagnostic prefix.
fn program_name() -> String {
    std::env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "chcon".to_string())
}

/// Main application logic. Returns the process exit status.
fn run(program: &str, cli: &Cli) -> Result<i32, CliError> {
    // 1. File config (or defaults), 2. environment, 3. CLI flags
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    config.merge_env()?;
    apply_cli_config(&mut config, cli);

    init_tracing(config.general.log_format, cli.debug);
    debug!("Starting chcon v{}", env!("CARGO_PKG_VERSION"));

    // Everything below up to the engine run is checked before touching files.
    let policy = TraversalPolicy::resolve(cli.traversal_flags(config.traversal.preserve_root))?;
    let request = cli.label_request()?;

    let (event_sender, event_receiver) = selutils_events::channel();
    let forwarder = EventForwarder::spawn(event_receiver);
    event_sender.emit(selutils_events::AppEvent::General(
        GeneralEvent::ConfigurationLoaded {
            source: cli.config.as_ref().map(|path| path.display().to_string()),
        },
    ));

    let platform = Platform::host(request.source, &config.label.xattr_name)?;
    let options = EngineOptions {
        max_symlink_chain: config.traversal.max_symlink_chain,
        sort_entries: config.traversal.sort_entries,
    };

    let mut aggregator = ResultAggregator::new(program, std::io::stdout(), std::io::stderr())
        .verbose(config.general.verbose);

    {
        let engine = TraversalEngine::from_platform(&platform)
            .with_options(options)
            .with_event_sender(event_sender);
        engine.run_with(&request.files, &policy, |outcome| aggregator.record(&outcome));
    }

    let forwarded = forwarder.finish();
    debug!(forwarded, "event channel drained");

    Ok(aggregator.exit_code())
}

/// Apply CLI flags on top of file and environment configuration
fn apply_cli_config(config: &mut Config, cli: &Cli) {
    if cli.verbose {
        config.general.verbose = true;
    }
    if let Some(format) = cli.log_format {
        config.general.log_format = format;
    }
}
