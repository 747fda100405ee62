//! CLI binary entrypoint.

mod commands;
mod error;
mod format;
mod tracing_setup;

use clap::{Parser, Subcommand};
use commands::{
    run_config_export, run_config_get, run_config_import, run_config_reset, run_config_reset_all,
    run_config_set, run_config_show, run_feature, run_migrate, run_state_list, run_state_show,
};
use error::{CliError, ExitCode};
use format::{OutputArgs, OutputMode};
use hwt_facade::{AppContext, RuntimeEnv, SharedStorage, open_storage};
use std::io::{self, Write};
use std::path::PathBuf;

const FALLBACK_STORAGE_FILE: &str = "hwt-storage.json";

#[derive(Debug, Parser)]
#[command(
    name = "hwt",
    version,
    about = "Inspect and edit HackerWeb Tools preferences and state",
    long_about = None
)]
struct Cli {
    /// Storage file (defaults to `HWT_STORAGE_PATH`, then the platform config dir).
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Preference commands.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Print whether a feature is effectively enabled.
    Feature {
        /// Feature name, e.g. `keyboardNav`.
        feature: String,
        /// Resolve for one site (`hn` or `hackerweb`).
        #[arg(long)]
        site: Option<String>,
    },
    /// State cell commands.
    State {
        #[command(subcommand)]
        command: StateCommands,
    },
    /// Run init migrations.
    Migrate,
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Print the resolved config.
    Show,
    /// Print one value.
    Get { section: String, key: String },
    /// Assign one value given as JSON (`true`, `10`, `"900px"`, `{...}`).
    Set {
        section: String,
        key: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Restore one value to its default.
    Reset { section: String, key: String },
    /// Restore every value to its default.
    ResetAll,
    /// Print the sparse overrides.
    Export,
    /// Replace the overrides with a JSON document (`-` reads stdin).
    Import { source: PathBuf },
}

#[derive(Debug, Subcommand)]
enum StateCommands {
    /// Print one cell's persisted value.
    Show { key: String },
    /// List every cell and its payload size.
    List,
}

pub(crate) struct CliOutput {
    stdout: String,
    exit_code: ExitCode,
}

impl CliOutput {
    pub(crate) const fn ok(stdout: String) -> Self {
        Self {
            stdout,
            exit_code: ExitCode::Ok,
        }
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let mode = OutputMode::from_args(&cli.output);

    let env = match RuntimeEnv::from_std_env() {
        Ok(env) => env,
        Err(error) => {
            tracing_setup::init_subscriber(None);
            return exit_with_error(&CliError::from(error));
        },
    };
    tracing_setup::init_subscriber(env.log_filter.as_deref());

    let storage = resolve_storage(&cli, env);
    match run(cli.command, storage, mode) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(output.stdout.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn resolve_storage(cli: &Cli, mut env: RuntimeEnv) -> SharedStorage {
    if let Some(path) = &cli.storage {
        env.storage_path = Some(path.clone());
    }
    open_storage(&env, &default_storage_path())
}

fn default_storage_path() -> PathBuf {
    dirs::config_dir().map_or_else(
        || PathBuf::from(FALLBACK_STORAGE_FILE),
        |dir| dir.join("hwt").join("storage.json"),
    )
}

fn run(command: Commands, storage: SharedStorage, mode: OutputMode) -> Result<CliOutput, CliError> {
    match command {
        Commands::Migrate => run_migrate(storage, mode),
        Commands::Config { command } => run_config(command, &mut AppContext::new(storage), mode),
        Commands::Feature { feature, site } => {
            run_feature(&mut AppContext::new(storage), mode, &feature, site.as_deref())
        },
        Commands::State { command } => {
            let context = AppContext::new(storage);
            match command {
                StateCommands::Show { key } => run_state_show(&context, mode, &key),
                StateCommands::List => run_state_list(&context, mode),
            }
        },
    }
}

fn run_config(
    command: ConfigCommands,
    context: &mut AppContext,
    mode: OutputMode,
) -> Result<CliOutput, CliError> {
    match command {
        ConfigCommands::Show => run_config_show(context),
        ConfigCommands::Get { section, key } => run_config_get(context, mode, &section, &key),
        ConfigCommands::Set {
            section,
            key,
            value,
        } => run_config_set(context, mode, &section, &key, &value),
        ConfigCommands::Reset { section, key } => run_config_reset(context, mode, &section, &key),
        ConfigCommands::ResetAll => run_config_reset_all(context, mode),
        ConfigCommands::Export => Ok(run_config_export(context)),
        ConfigCommands::Import { source } => run_config_import(context, mode, &source),
    }
}
