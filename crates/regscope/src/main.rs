use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use regscope_core::config::parse_timeout_ms;
use regscope_core::prelude::*;
use regscope_protocol::RegisterValueFormat;
use regscope_ui::property::VALUE_PLACEHOLDER;
use regscope_utils::{info, init_logging_for_tui, init_logging_with_level, LogFormat, LogLevel, LoggingGuard};

/// Inspect the registers of a program under GDB/MI, grouped by architecture.
#[derive(Parser, Debug)]
#[command(name = "regscope")]
#[command(version)]
#[command(about = "Inspect the registers of a program under GDB/MI, grouped by architecture", long_about = None)]
struct Cli
{
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    session: SessionArgs,
}

#[derive(Args, Debug)]
struct SessionArgs
{
    /// Debugger executable speaking MI (overrides REGSCOPE_DEBUGGER)
    #[arg(long, global = true)]
    debugger: Option<PathBuf>,
    /// How long to wait for each backend reply, in milliseconds (overrides REGSCOPE_TIMEOUT_MS)
    #[arg(long, global = true, value_parser = parse_timeout_ms)]
    timeout_ms: Option<Duration>,
    /// Format of register values
    #[arg(long, global = true, value_enum, default_value_t = ValueFormat::Hex)]
    format: ValueFormat,
    /// Log level (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// List register groups and their sizes
    Groups
    {
        /// Arguments passed to the debugger, e.g. `-- -p 1234`
        #[arg(last = true, allow_hyphen_values = true)]
        debugger_args: Vec<String>,
    },
    /// Print the registers of one thread, grouped
    Snapshot
    {
        /// Thread to read registers from
        #[arg(short, long, default_value_t = ThreadId(1))]
        thread: ThreadId,
        /// Arguments passed to the debugger, e.g. `-- ./prog core.1234`
        #[arg(last = true, allow_hyphen_values = true)]
        debugger_args: Vec<String>,
    },
    /// Browse registers in an interactive terminal view
    View
    {
        /// Threads to cycle through (comma separated)
        #[arg(short, long, value_delimiter = ',', default_value = "1")]
        threads: Vec<ThreadId>,
        /// Arguments passed to the debugger, e.g. `-- -p 1234`
        #[arg(last = true, allow_hyphen_values = true)]
        debugger_args: Vec<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ValueFormat
{
    Hex,
    Octal,
    Binary,
    Decimal,
    Raw,
    Natural,
}

impl From<ValueFormat> for RegisterValueFormat
{
    fn from(format: ValueFormat) -> Self
    {
        match format {
            ValueFormat::Hex => Self::Hex,
            ValueFormat::Octal => Self::Octal,
            ValueFormat::Binary => Self::Binary,
            ValueFormat::Decimal => Self::Decimal,
            ValueFormat::Raw => Self::Raw,
            ValueFormat::Natural => Self::Natural,
        }
    }
}

impl Commands
{
    fn debugger_args(&self) -> &[String]
    {
        match self {
            Commands::Groups { debugger_args }
            | Commands::Snapshot { debugger_args, .. }
            | Commands::View { debugger_args, .. } => debugger_args,
        }
    }
}

fn main()
{
    let cli = Cli::parse();

    // The terminal view owns the screen, so its logs go to a file
    let _guard = match init_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli) {
        eprintln!("Error: {}", e.describe());
        process::exit(1);
    }
}

fn init_logging(cli: &Cli) -> Result<LoggingGuard, regscope_utils::LoggingError>
{
    if matches!(cli.command, Commands::View { .. }) {
        let (path, guard) = init_logging_for_tui(cli.session.log_level)?;
        info!(path = %path.display(), "logging to file");
        Ok(guard)
    } else {
        let level = cli.session.log_level.unwrap_or(LogLevel::Warn);
        init_logging_with_level(level, LogFormat::Pretty)
    }
}

/// Apply command-line overrides on top of `base`.
fn session_config(cli: &Cli, base: SessionConfig) -> SessionConfig
{
    let mut config = base.with_debugger_args(cli.command.debugger_args().to_vec());
    config.value_format = cli.session.format.into();
    if let Some(debugger) = &cli.session.debugger {
        config.debugger = debugger.clone();
    }
    if let Some(timeout) = cli.session.timeout_ms {
        config = config.with_timeout(timeout);
    }
    config
}

fn connect(config: &SessionConfig) -> RegscopeResult<RegisterCollection>
{
    info!(debugger = %config.debugger.display(), "connecting to backend");
    let backend = MiBackend::spawn(config)?;
    let channel = OperationChannel::spawn(backend, config.backend_timeout)?;
    Ok(RegisterCollection::new(Arc::new(channel)))
}

fn run_command(cli: Cli) -> RegscopeResult<()>
{
    let config = session_config(&cli, SessionConfig::from_env()?);
    let registers = connect(&config)?;

    match cli.command {
        Commands::Groups { .. } => {
            let schema = registers.schema()?;
            println!("Catalog: {}", schema.catalog());
            for group in registers.list_groups()? {
                println!("  {:<24} {:>4}", group.name, group.count);
            }
            Ok(())
        }
        Commands::Snapshot { thread, .. } => {
            let snapshot = registers.snapshot(thread)?;
            print!("{}", format_snapshot(&snapshot));
            Ok(())
        }
        Commands::View { threads, .. } => {
            let registers = Arc::new(registers);
            let rt = tokio::runtime::Runtime::new()?;
            let result = rt.block_on(regscope_ui::run_tui(Arc::clone(&registers), threads));
            // The channel's own runtime must not be dropped from async code
            drop(rt);
            drop(registers);
            result.map_err(RegscopeError::from)
        }
    }
}

fn format_snapshot(snapshot: &Snapshot) -> String
{
    let mut out = format!("Thread {}\n", snapshot.thread());
    for group in snapshot.groups() {
        out.push_str(&format!("\n{} ({} registers)\n", group.name(), group.registers().len()));
        for register in group.registers() {
            out.push_str(&format!(
                "  {:<16} {}\n",
                register.name(),
                register.content_or(VALUE_PLACEHOLDER)
            ));
        }
    }
    out
}
