use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use tracing::info;

use passport::cli::{Cli, Command};
use passport::config::Config;
use passport::{Catalog, EntityView, ProgressState, ProgressStore};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level).map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre!("Failed to install subscriber: {}", e))?;
    Ok(())
}

fn state_label(state: ProgressState) -> ColoredString {
    match state {
        ProgressState::NotStarted => state.to_string().dimmed(),
        ProgressState::InProgress => state.to_string().yellow(),
        ProgressState::Completed => state.to_string().green(),
    }
}

fn print_summary(view: &EntityView) {
    println!(
        "{} {} [{}] {}/{}",
        view.id.cyan(),
        view.title,
        state_label(view.state),
        view.progress,
        view.total_steps
    );
}

fn print_view(view: &EntityView) {
    print_summary(view);
    for step in &view.steps {
        let mark = if step.locked {
            "[locked]".red()
        } else if step.completed {
            "[x]".green()
        } else {
            "[ ]".normal()
        };
        println!("  {} {}  {}", mark, step.id, step.title.dimmed());
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;

    info!("passport starting");

    let catalog = config.load_catalog()?;
    let mut store = ProgressStore::with_options(config.open_repository()?, config.store_options());

    match cli.command {
        Command::Catalog { kind } => {
            for entity in catalog.entities() {
                if kind.is_some_and(|k| k != entity.kind) {
                    continue;
                }
                print_summary(&store.view(entity)?);
            }
        }
        Command::Show { entity_id } => {
            let entity = catalog.require(&entity_id)?;
            print_view(&store.view(entity)?);
        }
        Command::Toggle { entity_id, step_id } => {
            let entity = catalog.require(&entity_id)?;
            let outcome = store.toggle(entity, &step_id)?;
            let mark = if outcome.step_completed { "done".green() } else { "undone".yellow() };
            println!(
                "{} {} {} ({}/{})",
                "✓".green(),
                step_id,
                mark,
                outcome.progress,
                entity.total_steps
            );
            if outcome.now_completed {
                println!("{} {} completed!", "★".yellow(), entity.title);
            }
        }
        Command::Complete { entity_id } => {
            let entity = catalog.require(&entity_id)?;
            let snapshot = store.complete(entity)?;
            println!(
                "{} Completed: {} ({}/{})",
                "✓".green(),
                entity_id.cyan(),
                snapshot.progress,
                snapshot.total_steps
            );
        }
        Command::Reset { entity_id } => {
            let entity = catalog.require(&entity_id)?;
            let snapshot = store.reset(entity)?;
            println!(
                "{} Reset: {} ({}/{})",
                "✓".green(),
                entity_id.cyan(),
                snapshot.progress,
                snapshot.total_steps
            );
        }
        Command::Tracked => {
            let tracked = store.list_tracked()?;
            if tracked.is_empty() {
                println!("No progress recorded");
            } else {
                for id in tracked {
                    println!("{}", id);
                }
            }
        }
        Command::Migrate { city, quest } => {
            let reports: Vec<_> = match (city, quest) {
                (Some(city), Some(quest)) => store.migrate_legacy_quest_tasks(&city, &quest)?.into_iter().collect(),
                _ => store.migrate_all_legacy_quests()?,
            };
            if reports.is_empty() {
                println!("No legacy quest data found");
            }
            for report in reports {
                println!(
                    "{} Migrated {}: {} of {} tasks",
                    "✓".green(),
                    report.entity_id.cyan(),
                    report.migrated,
                    report.found
                );
            }
        }
        Command::Export => {
            let export = store.export()?;
            println!("{}", serde_json::to_string_pretty(&export)?);
        }
    }

    Ok(())
}
