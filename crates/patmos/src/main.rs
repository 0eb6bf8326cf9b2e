//! patmos: print PATMOS AVHRR calibration coefficients
//!
//! `patmos dump` prints every satellite of the 2013 view; `patmos show`
//! prints Metop-A (`m02`) from the 2017 view. Output goes to stdout in the
//! namelist layout; diagnostics go to stderr.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};

use patmos_core::config::{Config, LogFormat};
use patmos_core::logging::{LogConfig, init_logging};
use patmos_core::render::{self, write_json, write_lines};
use patmos_core::{CoeffStore, View, coeffs};

const CONFIG_VAR: &str = "PATMOS_CONFIG";
const LOG_LEVEL_VAR: &str = "PATMOS_LOG";

#[derive(Parser, Debug)]
#[command(name = "patmos")]
#[command(about = "Print PATMOS AVHRR calibration coefficients from avhrr.sqlite")]
#[command(version)]
struct Cli {
    /// Directory containing avhrr.sqlite [default: $DB_DIR, then $VTT_DATA]
    #[arg(long, global = true)]
    db_dir: Option<PathBuf>,

    /// Optional TOML config file [env: PATMOS_CONFIG]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error) [env: PATMOS_LOG]
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format on stderr
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Also append logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Print remediation hints after an error
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the coefficient block of every satellite in a view
    Dump {
        /// View (table) to read; defaults to the configured view
        #[arg(long)]
        view: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print coefficients of one satellite
    Show(ShowArgs),

    /// List satellite identifiers of a view
    Ids {
        #[arg(long, default_value = View::PATMOS_2013)]
        view: String,
    },

    /// List the column titles of a view
    Columns {
        #[arg(long, default_value = View::PATMOS_2013)]
        view: String,
    },
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Satellite identifier (id_patmos)
    #[arg(default_value = "m02")]
    id: String,

    #[arg(long, default_value = View::PATMOS_2017)]
    view: String,

    /// Only the six gain lines, as the sample-access listing prints them
    #[arg(long, conflicts_with = "format")]
    gains_only: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Fixed namelist layout
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err, verbose);
            ExitCode::FAILURE
        }
    }
}

/// One diagnostic line; remediation only when asked for.
fn report(err: &anyhow::Error, verbose: bool) {
    let core = err.downcast_ref::<patmos_core::Error>();
    match core {
        Some(core) => eprintln!("Error: {core}"),
        None => eprintln!("Error: {err:#}"),
    }
    if verbose {
        if let Some(remediation) = core.and_then(patmos_core::Error::remediation) {
            eprint!("{}", remediation.render_plain());
        }
    }
}

/// Environment value, with an empty string treated as unset.
fn env_value(var: &str) -> Option<OsString> {
    std::env::var_os(var).filter(|value| !value.is_empty())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone().or_else(|| env_value(CONFIG_VAR).map(PathBuf::from));
    let config = match &config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::default(),
    };

    let log_config = LogConfig {
        level: cli
            .log_level
            .clone()
            .or_else(|| env_value(LOG_LEVEL_VAR).and_then(|v| v.into_string().ok()))
            .unwrap_or_else(|| config.general.log_level.clone()),
        format: cli.log_format.unwrap_or(config.general.log_format),
        file: cli.log_file.clone().or_else(|| config.general.log_file.clone()),
    };
    init_logging(&log_config).context("initializing logging")?;

    // DB_DIR and VTT_DATA are read by the config layer, after the flag.
    let store = CoeffStore::open_configured(&config, cli.db_dir.as_deref())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = execute(&cli.command, &config, &store, &mut out);
    let closed = store.close();
    first_failure(result, closed)
}

/// A failing command is reported ahead of a failing close.
fn first_failure(
    result: anyhow::Result<()>,
    closed: patmos_core::Result<()>,
) -> anyhow::Result<()> {
    result?;
    closed?;
    Ok(())
}

fn execute<W: Write>(
    command: &Command,
    config: &Config,
    store: &CoeffStore,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::Dump { view, format } => {
            let view = view.as_deref().map_or_else(|| config.default_view(), View::from);
            let count = match format {
                OutputFormat::Text => render::dump_view(store, &view, out)?,
                OutputFormat::Json => render::dump_view_json(store, &view, out)?,
            };
            tracing::info!(view = %view, count, "dumped view");
        }
        Command::Show(args) => {
            let view = View::from(args.view.as_str());
            if args.gains_only {
                let lines = render::render_gain_lines(store, &view, &args.id)?;
                write_lines(out, &lines)?;
            } else {
                match args.format {
                    OutputFormat::Text => {
                        write_lines(out, &render::render(store, &view, &args.id)?)?;
                    }
                    OutputFormat::Json => {
                        let record = coeffs::read_coefficients(store, &view, &args.id)?;
                        write_json(out, &record)?;
                    }
                }
            }
        }
        Command::Ids { view } => {
            let ids = coeffs::list_satellite_ids(store, &View::from(view.as_str()))?;
            write_lines(out, &ids)?;
        }
        Command::Columns { view } => {
            let columns = coeffs::list_columns(store, &View::from(view.as_str()))?;
            write_lines(out, &columns)?;
        }
    }
    out.flush()?;
    Ok(())
}
