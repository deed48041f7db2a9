//! Command dispatch for the topotree binary

use std::io::{self, Read};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::script::StepOutcome;
use crate::application::{CommandLog, EventOutcome, ScriptRunner, TopologyEditor};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{expand_path, global_config_dir, global_config_path, Settings};
use crate::domain::{TopologyBuilder, TopologySnapshot};
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Replay {
            script,
            preload,
            json,
            quiet,
            strict,
        }) => {
            let settings = Settings::load(cli.config.as_deref())?;
            _replay(&settings, script, preload.as_deref(), *json, *quiet, *strict)
        }
        Some(Commands::Check { snapshot }) => _check(snapshot),
        Some(Commands::Config { command }) => _config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

fn read_input(path: &Path, action: &str) -> CliResult<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::io("read stdin", e))?;
        return Ok(content);
    }
    let path = expand_path(path);
    std::fs::read_to_string(&path)
        .map_err(|e| CliError::io(format!("{action} {}", path.display()), e))
}

fn load_snapshot(path: &Path) -> CliResult<TopologySnapshot> {
    let content = read_input(path, "read snapshot")?;
    Ok(TopologySnapshot::from_json(&content)?)
}

#[instrument(skip(settings))]
fn _replay(
    settings: &Settings,
    script: &Path,
    preload: Option<&Path>,
    json: bool,
    quiet: bool,
    strict: bool,
) -> CliResult<()> {
    let runner = ScriptRunner::parse(&read_input(script, "read script")?)?;
    debug!("replaying {} event(s)", runner.len());

    let mut editor = match preload {
        Some(path) => {
            TopologyEditor::from_snapshot(&load_snapshot(path)?, CommandLog::new(), settings)?
        }
        None => TopologyEditor::new(CommandLog::new(), settings),
    };
    let initial = editor.bridge_mut().drain();
    if !quiet {
        output::header("start");
        output::render_commands(&initial);
        output::header("events");
    }

    let mut rejected = 0;
    for (line, event) in runner.events() {
        let outcome = event.apply(&mut editor);
        let issued = editor.bridge_mut().drain();
        if matches!(outcome, StepOutcome::Event(EventOutcome::Rejected(_))) {
            rejected += 1;
        }
        output::step(*line, event, &outcome);
        if !quiet {
            output::render_commands(&issued);
        }
    }

    if json {
        output::info(&editor.snapshot().to_json()?);
    } else {
        output::info(&editor.tree().to_tree_string());
    }

    if strict && rejected > 0 {
        return Err(CliError::Rejected { count: rejected });
    }
    Ok(())
}

#[instrument]
fn _check(snapshot: &Path) -> CliResult<()> {
    let tree = TopologyBuilder::new().build(&load_snapshot(snapshot)?)?;
    output::info(&tree.to_tree_string());
    output::success(&format!(
        "{} node(s), depth {}, {} leaf node(s)",
        tree.len(),
        tree.depth(),
        tree.leaf_nodes().len()
    ));
    Ok(())
}

fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Init { force } => {
            let (Some(dir), Some(path)) = (global_config_dir(), global_config_path()) else {
                return Err(CliError::Usage(
                    "cannot determine config directory".to_string(),
                ));
            };
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "config already exists: {} (use --force to overwrite)",
                    path.display()
                )));
            }
            std::fs::create_dir_all(&dir)
                .map_err(|e| CliError::io(format!("create {}", dir.display()), e))?;
            std::fs::write(&path, Settings::template())
                .map_err(|e| CliError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("created {}", path.display()));
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::labeled("global", &path.display()),
                None => output::labeled("global", "unavailable"),
            }
            if let Some(local) = &cli.config {
                output::labeled("local", &expand_path(local).display());
            }
        }
    }
    Ok(())
}
