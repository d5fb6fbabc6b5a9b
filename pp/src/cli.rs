//! CLI argument parsing for passport

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::model::EntityKind;

#[derive(Parser, Debug)]
#[command(name = "pp")]
#[command(author, version, about = "Challenge and quest progress for the digital passport", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List catalog entities with their progress
    Catalog {
        /// Only list this kind (challenge or quest)
        #[arg(short, long)]
        kind: Option<EntityKind>,
    },

    /// Show an entity and its steps
    Show {
        /// Entity ID (quests are {city}-{quest})
        #[arg(required = true)]
        entity_id: String,
    },

    /// Toggle a step or quest task
    Toggle {
        /// Entity ID
        #[arg(required = true)]
        entity_id: String,

        /// Step ID to toggle
        #[arg(required = true)]
        step_id: String,
    },

    /// Mark an entity complete
    Complete {
        /// Entity ID
        #[arg(required = true)]
        entity_id: String,
    },

    /// Reset an entity's progress
    Reset {
        /// Entity ID
        #[arg(required = true)]
        entity_id: String,
    },

    /// List entities with persisted progress
    Tracked,

    /// Migrate legacy quest task arrays into the step map
    Migrate {
        /// City ID (requires --quest); migrates every quest when omitted
        #[arg(long, requires = "quest")]
        city: Option<String>,

        /// Quest ID (requires --city)
        #[arg(long, requires = "city")]
        quest: Option<String>,
    },

    /// Print all persisted progress as JSON
    Export,
}
