// # tetra - DNS Record Manager
//
// Expands the YAML description of each domain into the records it should
// hold, diffs them against the live zone and, after confirmation, applies the
// difference through the domain's backend.
//
// This binary is a THIN integration layer:
// 1. Parsing the command line
// 2. Initializing logging and the runtime
// 3. Registering backends
// 4. Handing the loaded configuration to `tetra_core::run_domains`
//
// ## Usage
//
// ```bash
// tetra -c tetra.yaml                   # all domains, in file order
// tetra -c tetra.yaml -d example.com -D # one domain, dry run
// tetra -f                              # refresh every owned record
// ```
//
// ## Environment
//
// - `TETRA_LOG_LEVEL`: overrides the log level (trace, debug, info, warn, error)

use anyhow::Result;
use clap::Parser;
use std::io::{BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tetra_core::{BackendRegistry, Confirmation, RunContext, SyncOutcome, TetraConfig};
use tetra_resolver::SystemResolver;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Clean run (including a declined confirmation)
/// - 1: Configuration error, nothing was sent to a provider
/// - 2: Runtime error (provider, network or resolution failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TetraExitCode {
    Clean = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<TetraExitCode> for ExitCode {
    fn from(code: TetraExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl TetraExitCode {
    fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<tetra_core::Error>() {
            Some(e) if e.is_config() => TetraExitCode::ConfigError,
            _ => TetraExitCode::RuntimeError,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "tetra")]
#[command(about = "Template-driven DNS record manager", long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "tetra.yaml")]
    config: String,

    /// Domain to process (repeatable; all domains when omitted)
    #[arg(short, long = "domain")]
    domains: Vec<String>,

    /// Show the changes without applying them
    #[arg(short = 'D', long)]
    dry_run: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Rewrite every owned record even when unchanged
    #[arg(short, long)]
    force: bool,
}

impl Args {
    fn log_level(&self, env_override: Option<&str>) -> Level {
        match env_override.map(str::to_lowercase).as_deref() {
            Some("trace") => Level::TRACE,
            Some("debug") => Level::DEBUG,
            Some("info") => Level::INFO,
            Some("warn") => Level::WARN,
            Some("error") => Level::ERROR,
            _ if self.verbose => Level::DEBUG,
            _ => Level::INFO,
        }
    }
}

/// Confirmation prompt on the controlling terminal
struct StdinConfirmation;

/// Only `y` (either case) confirms
fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

impl Confirmation for StdinConfirmation {
    fn confirm(&self, prompt: &str) -> tetra_core::Result<bool> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{} ", prompt)?;
        stdout.flush()?;

        let mut answer = String::new();
        std::io::stdin().lock().read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = args.log_level(std::env::var("TETRA_LOG_LEVEL").ok().as_deref());
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return TetraExitCode::RuntimeError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return TetraExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run(&args).await {
            Ok(()) => TetraExitCode::Clean,
            Err(e) => {
                error!("{:#}", e);
                TetraExitCode::for_error(&e)
            }
        }
    });

    code.into()
}

/// Build the backend registry for the compiled-in backends
fn build_registry() -> BackendRegistry {
    let registry = BackendRegistry::new();

    #[cfg(feature = "cloudflare")]
    tetra_backend_cloudflare::register(&registry);

    #[cfg(feature = "dnspod")]
    tetra_backend_dnspod::register(&registry);

    registry
}

async fn run(args: &Args) -> Result<()> {
    let config = TetraConfig::load(&args.config).await?;
    let registry = build_registry();
    info!("Available backends: {}", registry.list_backends().join(", "));

    let ctx = RunContext::new(args.dry_run, args.force);
    let outcomes = tetra_core::run_domains(
        &config,
        &args.domains,
        &registry,
        Arc::new(SystemResolver::new()),
        Arc::new(StdinConfirmation),
        &ctx,
    )
    .await?;

    for (domain, outcome) in &outcomes {
        match outcome {
            SyncOutcome::NoChanges => info!("{}: up to date", domain),
            SyncOutcome::DryRun(changes) => info!("{}: {} pending change(s)", domain, changes.len()),
            SyncOutcome::Declined(_) => info!("{}: skipped", domain),
            SyncOutcome::Applied(changes) => info!("{}: applied {} change(s)", domain, changes.len()),
        }
    }

    Ok(())
}
