//! Command dispatch

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::{ApprovalService, HierarchyService};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::Request;
use crate::infrastructure::{InfraError, ServiceContainer};

/// Number of orcs spawned by `all`.
const DEFAULT_WAVE: usize = 3;

/// Load settings when the command needs them, then run it.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let command = cli
        .command
        .as_ref()
        .ok_or_else(|| CliError::Usage("no command given, see --help".into()))?;

    let settings = if needs_settings(command) {
        Settings::load(cli.config.as_deref())?
    } else {
        Settings::default()
    };
    let container = ServiceContainer::new(settings);
    run(command, cli, &container)
}

fn needs_settings(command: &Commands) -> bool {
    !matches!(
        command,
        Commands::Completion { .. }
            | Commands::Config {
                command: ConfigCommands::Path
            }
    )
}

/// Run `command` against the services in `container`.
pub fn run(command: &Commands, cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    match command {
        Commands::Composite { removals, tree } => composite(container, removals, *tree),
        Commands::Chain {
            amount,
            description,
        } => chain(container, *amount, description.as_deref()),
        Commands::Prototype { wave } => prototype(container, usize::from(*wave)),
        Commands::All => all(container),
        Commands::Config { command } => match command {
            ConfigCommands::Show => config_show(container),
            ConfigCommands::Path => config_path(cli),
        },
        Commands::Completion { shell } => completion(*shell),
    }
}

#[instrument(skip(container))]
fn composite(container: &ServiceContainer, removals: &[String], tree: bool) -> CliResult<()> {
    let mut root = HierarchyService::sample_tree();
    let report = container.hierarchy_service().run(&mut root, removals, tree);
    debug!(before = report.before, after = report.after, "composite done");
    Ok(())
}

#[instrument(skip(container))]
fn chain(
    container: &ServiceContainer,
    amount: Option<f64>,
    description: Option<&str>,
) -> CliResult<()> {
    let service = container.approval_service()?;
    service.announce();
    match (amount, description) {
        (Some(amount), Some(description)) => {
            if !amount.is_finite() || amount < 0.0 {
                return Err(CliError::InvalidArgs(format!(
                    "amount must be a finite, non-negative number (got {})",
                    amount
                )));
            }
            service.submit(&Request::new(amount, description));
        }
        _ => {
            service.submit_all(&ApprovalService::sample_requests());
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn prototype(container: &ServiceContainer, wave: usize) -> CliResult<()> {
    let service = container.spawner_service();
    service.register_defaults();
    service.run_wave(wave)?;
    Ok(())
}

fn all(container: &ServiceContainer) -> CliResult<()> {
    composite(container, &["banner.jpg".to_string()], false)?;
    container.console.blank();
    chain(container, None, None)?;
    container.console.blank();
    prototype(container, DEFAULT_WAVE)
}

fn config_show(container: &ServiceContainer) -> CliResult<()> {
    let rendered = container.settings.to_toml().map_err(InfraError::from)?;
    io::stdout()
        .lock()
        .write_all(rendered.as_bytes())
        .map_err(|e| InfraError::io("write settings to stdout", e))?;
    Ok(())
}

fn config_path(cli: &Cli) -> CliResult<()> {
    output::header("Config files (lowest to highest precedence)");
    match global_config_path() {
        Some(path) => output::action("global", &mark_exists(&path)),
        None => output::action("global", "<no config directory on this platform>"),
    }
    let local = match &cli.config {
        Some(path) => path.clone(),
        None => std::env::current_dir()
            .map(|cwd| local_config_path(&cwd))
            .map_err(|e| InfraError::io("resolve working directory", e))?,
    };
    output::action("local", &mark_exists(&local));
    output::detail("environment: PATTERNKIT_<SECTION>__<KEY>, e.g. PATTERNKIT_CHAIN__CURRENCY");
    Ok(())
}

fn mark_exists(path: &std::path::Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (missing)", path.display())
    }
}

fn completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
