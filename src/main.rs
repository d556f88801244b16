//! selt CLI - file tracking and graph export for SELT models.

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{info, warn};
use seltmodel::export::{ExportFormat, ExportRequest};
use seltmodel::tracker::{self, Tracker};
use seltmodel::{Config, Event, Handler, Outcome, Store, StoreImportExt};
use std::fs;
use std::path::{Path, PathBuf};

mod cli;

use cli::{Cli, Command, EdgeCommand, NodeCommand};

fn setup_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("selt")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("selt.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn get_store_dir(cli: &Cli) -> PathBuf {
    let dir = cli
        .dir
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    absolute(&dir)
}

fn notify(message: &str) {
    eprintln!("{} {}", "!".yellow().bold(), message);
}

fn print_outcome(outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Reconciled {
            checked,
            changed,
            missing,
            skipped,
            failed,
        } => {
            println!("{} Checked {} file(s)", "✓".green(), checked);
            for id in &changed {
                println!("  {} {}", "modified".yellow(), id.cyan());
            }
            for id in &missing {
                println!("  {} {}", "missing".red(), id.cyan());
            }
            for id in &skipped {
                println!("  {} {} (no path)", "skipped".dimmed(), id.cyan());
            }
            for id in &failed {
                println!("  {} {}", "failed".red().bold(), id.cyan());
            }
        }
        Outcome::Acknowledged { file } => {
            println!(
                "{} Acknowledged: {} {} ({})",
                "✓".green(),
                file.id.cyan(),
                file.path,
                tracker::format_timestamp(file.last_modified)
            );
        }
        Outcome::Exported { path, bytes } => {
            println!("{} Exported {} bytes to {}", "✓".green(), bytes, path.display());
        }
        Outcome::Error { message } => eyre::bail!(message),
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let store_dir = get_store_dir(&cli);

    match cli.command {
        Command::Init => {
            Store::init(&store_dir).context("Failed to initialize model store")?;
            if !Config::path(&store_dir).exists() {
                Config::default().save(&store_dir)?;
            }
            println!("{} Initialized model store in {}", "✓".green(), store_dir.display());
        }

        Command::Attach { file } => {
            let mut store = Store::open(&store_dir).context("Failed to open store")?;
            let selected = absolute(&file);
            let reference = Tracker::new(&store_dir, &notify)
                .attach(&mut store, &selected)
                .context("Failed to attach file")?;

            println!("{} Attached: {} {}", "✓".green(), reference.id.cyan(), reference.path);
        }

        Command::Files { modified } => {
            let store = Store::open(&store_dir).context("Failed to open store")?;
            let files = store.files(modified).context("Failed to list files")?;

            if files.is_empty() {
                println!("{}", "No files found".dimmed());
            } else {
                for file in files {
                    let state = if file.modified {
                        "modified".yellow()
                    } else {
                        "ok".green()
                    };
                    println!("{} {} {}", state, file.id.cyan(), file.path);
                }
            }
        }

        Command::Show { id } => {
            let store = Store::open(&store_dir).context("Failed to open store")?;
            let file = store.get_file(&id).context("Failed to get file")?;

            match file {
                Some(file) => {
                    let details = tracker::describe(&file, &store_dir);
                    println!("{}: {}", "ID".bold(), file.id.cyan());
                    println!("{}: {}", "Name".bold(), file.name);
                    println!("{}: {}", "Path".bold(), details.path);
                    println!("{}: {}", "Last Modified".bold(), details.last_modified);
                    println!("{}: {}", "Current Modified".bold(), details.current_modified);
                    if details.modified {
                        println!("{}: {}", "Status".bold(), "modified".yellow());
                    }
                }
                None => {
                    eprintln!("{} File reference not found: {}", "✗".red(), id);
                    std::process::exit(1);
                }
            }
        }

        Command::Detach { id } => {
            let mut store = Store::open(&store_dir).context("Failed to open store")?;
            store.detach(&id).context("Failed to detach file")?;
            println!("{} Detached: {}", "✓".green(), id.cyan());
        }

        Command::Reconcile { model } => {
            let store = Store::open(&store_dir).context("Failed to open store")?;
            let config = Config::load(&store_dir)?;
            let mut handler = Handler::new(store, config, &notify);

            let filename = model.as_deref().map(absolute);
            print_outcome(handler.handle(Event::ModelSaved { filename }))?;
        }

        Command::Ack { id } => {
            let store = Store::open(&store_dir).context("Failed to open store")?;
            let config = Config::load(&store_dir)?;
            let mut handler = Handler::new(store, config, &notify);

            print_outcome(handler.handle(Event::AcknowledgeRequested { id }))?;
        }

        Command::Node { command } => {
            let mut store = Store::open(&store_dir).context("Failed to open store")?;
            match command {
                NodeCommand::Add {
                    name,
                    category,
                    description,
                    parent,
                } => {
                    let node = store
                        .add_node(&name, &category, description.as_deref())
                        .context("Failed to add node")?;
                    if let Some(parent) = &parent {
                        store.add_child(parent, &node.name).context("Failed to nest node")?;
                    }
                    println!("{} Added: {} [{}]", "✓".green(), node.name.cyan(), node.category);
                }
                NodeCommand::Rm { name } => {
                    store.remove_node(&name).context("Failed to remove node")?;
                    println!("{} Removed: {}", "✓".green(), name.cyan());
                }
            }
        }

        Command::Nodes => {
            let store = Store::open(&store_dir).context("Failed to open store")?;
            let nodes = store.nodes().context("Failed to list nodes")?;

            if nodes.is_empty() {
                println!("{}", "No nodes found".dimmed());
            } else {
                for node in nodes {
                    let children = if node.children.is_empty() {
                        String::new()
                    } else {
                        format!(" > {}", node.children.join(", "))
                    };
                    println!(
                        "{} [{}]{}{}",
                        node.name.cyan(),
                        node.category,
                        children.dimmed(),
                        node.description
                            .map(|d| format!("\n    {}", d.dimmed()))
                            .unwrap_or_default()
                    );
                }
            }
        }

        Command::Edge { command } => {
            let mut store = Store::open(&store_dir).context("Failed to open store")?;
            match command {
                EdgeCommand::Add { source, target, label } => {
                    store
                        .add_edge(&source, &target, label.as_deref())
                        .context("Failed to add edge")?;
                    println!("{} {} -> {}", "✓".green(), source.cyan(), target.cyan());
                }
                EdgeCommand::Rm { source, target } => {
                    let removed = store.remove_edge(&source, &target)?;
                    println!("{} Removed {} edge(s)", "✓".green(), removed);
                }
            }
        }

        Command::Import { file } => {
            let mut store = Store::open(&store_dir).context("Failed to open store")?;
            let result = store.import_file(&file).context("Failed to import model")?;

            println!(
                "{} Imported {} node(s), {} edge(s)",
                "✓".green(),
                result.nodes.len(),
                result.edges
            );
            for (i, e) in &result.node_errors {
                println!("  {} node #{}: {}", "✗".red(), i, e);
            }
            for (link, e) in &result.child_errors {
                println!("  {} nesting {}: {}", "✗".red(), link, e);
            }
            for (i, e) in &result.edge_errors {
                println!("  {} edge #{}: {}", "✗".red(), i, e);
            }
        }

        Command::Export {
            format,
            output,
            source_category,
            target_category,
            max_hops,
        } => {
            let store = Store::open(&store_dir).context("Failed to open store")?;
            let mut config = Config::load(&store_dir)?;
            if let Some(hops) = max_hops {
                config = config.max_hops(hops);
            }

            let by_category = source_category.is_some() || target_category.is_some();
            let format = format.unwrap_or(if by_category {
                config.table_format
            } else {
                ExportFormat::Json
            });
            if by_category && format.table_style().is_none() {
                warn!("Categories ignored for {} export", format);
                eprintln!(
                    "{} {} export ignores --source-category/--target-category",
                    "!".yellow().bold(),
                    format
                );
            }
            let path = output.unwrap_or_else(|| format.default_path());
            let request = ExportRequest {
                format,
                path,
                source_category,
                target_category,
            };

            let mut handler = Handler::new(store, config, &notify);
            print_outcome(handler.handle(Event::ExportRequested { request }))?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    info!("Command: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
