//! `namebook` - CLI for the namebook record store
//!
//! This binary drives a [`PersonForm`] against the configured `SQLite`
//! database: `add` submits the form, `list` renders every saved person.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use namebook::cli::{Cli, Command, ConfigCommand, ListCommand, OutputFormat, StatusCommand};
use namebook::{init_logging, Config, PersonForm, RecordStore, SqliteStore};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    // Config subcommands must run even when the configured file is broken
    match cli.command {
        Command::Add(add) => {
            let config = load_config(cli.config)?;
            let mut store = open_store(&config);
            let mut form = PersonForm::with_names(add.first_name, add.last_name);
            let person = form.submit(&mut store).map_err(namebook::Error::from)?;
            if !cli.quiet {
                println!("Saved {person}");
            }
            Ok(())
        }
        Command::List(list) => handle_list(&load_config(cli.config)?, &list),
        Command::Status(status) => handle_status(&load_config(cli.config)?, &status),
        Command::Config(config_cmd) => handle_config(cli.config, config_cmd),
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    Config::load_from(path).context("loading configuration")
}

fn open_store(config: &Config) -> SqliteStore {
    SqliteStore::new(config.database_path(), config.store_options())
}

fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let mut store = open_store(config);
    let mut form = PersonForm::new();
    let text = form
        .list(&mut store)
        .map_err(namebook::Error::from)?
        .to_string();

    match cmd.format {
        OutputFormat::Plain => print!("{text}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(form.people())?),
    }
    Ok(())
}

fn handle_status(config: &Config, cmd: &StatusCommand) -> anyhow::Result<()> {
    let mut store = open_store(config);
    let people = store
        .fetch_all()
        .with_context(|| format!("reading {}", store.path().display()))?;

    if cmd.json {
        let status = serde_json::json!({
            "database_path": store.path(),
            "records": people.len(),
            "synchronous": config.storage.synchronous.to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("namebook status");
        println!("---------------");
        println!("Database:      {}", store.path().display());
        println!("Records:       {}", people.len());
        println!("Synchronous:   {}", config.storage.synchronous);
    }
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = load_config(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Synchronous:        {}", config.storage.synchronous);
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path.clone()))
                .with_context(|| format!("validating {}", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
