mod commands;
mod config;
mod gemini;
mod remote;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    cmd_ask, cmd_catalog, cmd_eat, cmd_goal_set, cmd_goal_show, cmd_goals_add, cmd_goals_list,
    cmd_goals_remove, cmd_goals_toggle, cmd_history, cmd_log, cmd_reset, cmd_sync, cmd_today,
    open_coordinator, open_store,
};
use crate::config::Config;
use sprout_core::goals::GoalTracker;

#[derive(Parser)]
#[command(
    name = "sprout",
    version,
    about = "A local-first daily growth tracker: meals, calorie goal, and personal goals"
)]
struct Cli {
    /// Base URL of the remote calorie service (overrides SPROUT_REMOTE_URL)
    #[arg(long, global = true)]
    remote_url: Option<String>,
    /// User identifier for the remote service (overrides SPROUT_USER_ID)
    #[arg(long, global = true)]
    user: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a custom meal
    Log {
        /// Meal name
        name: String,
        /// Calories (kcal)
        calories: f64,
        /// Meal: breakfast, lunch, dinner, snack
        #[arg(short, long, default_value = "snack")]
        meal: String,
        /// Protein (g)
        #[arg(long)]
        protein: Option<f64>,
        /// Carbs (g)
        #[arg(long)]
        carbs: Option<f64>,
        /// Fat (g)
        #[arg(long)]
        fat: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log a catalog item by ID (e.g. "breakfast-2")
    Eat {
        /// Catalog item ID
        id: String,
        /// Log under a different meal than the item's own
        #[arg(short, long)]
        meal: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show today's meals and progress toward the daily goal
    Today {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear every meal logged today
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or set the daily calorie goal
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },
    /// Show calorie totals for the last N days
    History {
        /// Number of days to show
        #[arg(short, long, default_value = "7")]
        days: u32,
        /// Export the raw entries as CSV
        #[arg(long, conflicts_with = "json")]
        csv: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Browse the food catalog for a meal
    Catalog {
        /// Meal: breakfast, lunch, dinner, snack
        category: String,
        /// Filter by name
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Push meals saved offline and pull today's state from the remote service
    Sync {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage personal growth goals
    Goals {
        #[command(subcommand)]
        command: GrowthCommands,
    },
    /// Ask the growth assistant a question
    Ask {
        /// Your question
        question: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the remote calorie service
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
        /// Keep all state in memory (lost on exit)
        #[arg(long)]
        in_memory: bool,
    },
}

#[derive(Subcommand)]
enum GoalCommands {
    /// Set the daily calorie goal
    Set {
        /// Daily goal in kcal
        calories: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the daily calorie goal
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum GrowthCommands {
    /// Add a goal
    Add {
        /// What you want to do
        text: String,
        /// Category: health, productivity, learning, mindfulness, social
        #[arg(short, long, default_value = "health")]
        category: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a goal done, or reopen it
    Toggle {
        /// Goal ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a goal
    Remove {
        /// Goal ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List goals with completion progress
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env("SPROUT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(if matches!(cli.command, Commands::Serve { .. }) {
        "info"
    } else {
        "warn"
    });

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.remote_url, cli.user)?;

    match cli.command {
        Commands::Log {
            name,
            calories,
            meal,
            protein,
            carbs,
            fat,
            json,
        } => {
            let sync = open_coordinator(&config)?;
            cmd_log(&sync, &name, calories, &meal, protein, carbs, fat, json).await
        }
        Commands::Eat { id, meal, json } => {
            let sync = open_coordinator(&config)?;
            cmd_eat(&sync, &id, meal.as_deref(), json).await
        }
        Commands::Today { json } => cmd_today(&open_coordinator(&config)?, json).await,
        Commands::Reset { yes, json } => cmd_reset(&open_coordinator(&config)?, yes, json).await,
        Commands::Goal { command } => {
            let sync = open_coordinator(&config)?;
            match command {
                GoalCommands::Set { calories, json } => cmd_goal_set(&sync, calories, json).await,
                GoalCommands::Show { json } => cmd_goal_show(&sync, json),
            }
        }
        Commands::History { days, csv, json } => {
            cmd_history(&open_coordinator(&config)?, days, csv, json)
        }
        Commands::Catalog {
            category,
            search,
            json,
        } => cmd_catalog(&category, search.as_deref(), json),
        Commands::Sync { json } => cmd_sync(&open_coordinator(&config)?, json).await,
        Commands::Goals { command } => {
            let goals = GoalTracker::new(open_store(&config)?);
            match command {
                GrowthCommands::Add {
                    text,
                    category,
                    json,
                } => cmd_goals_add(&goals, &text, &category, json),
                GrowthCommands::Toggle { id, json } => cmd_goals_toggle(&goals, &id, json),
                GrowthCommands::Remove { id, json } => cmd_goals_remove(&goals, &id, json),
                GrowthCommands::List { json } => cmd_goals_list(&goals, json),
            }
        }
        Commands::Ask { question, json } => cmd_ask(&config, &question, json).await,
        Commands::Serve {
            port,
            bind,
            in_memory,
        } => {
            let backing = if in_memory {
                server::Backing::Memory
            } else {
                server::Backing::File(config.server_db_path.clone())
            };
            server::start_server(backing, port, &bind).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_log_with_macros() {
        let cli = Cli::try_parse_from([
            "sprout", "log", "Paneer wrap", "420", "--meal", "lunch", "--protein", "22",
        ])
        .unwrap();
        match cli.command {
            Commands::Log {
                name,
                calories,
                meal,
                protein,
                carbs,
                ..
            } => {
                assert_eq!(name, "Paneer wrap");
                assert!((calories - 420.0).abs() < f64::EPSILON);
                assert_eq!(meal, "lunch");
                assert_eq!(protein, Some(22.0));
                assert_eq!(carbs, None);
            }
            _ => panic!("expected log"),
        }
    }

    #[test]
    fn test_global_user_flag() {
        let cli = Cli::try_parse_from(["sprout", "today", "--user", "u-42"]).unwrap();
        assert_eq!(cli.user.as_deref(), Some("u-42"));
    }

    #[test]
    fn test_history_csv_conflicts_with_json() {
        assert!(Cli::try_parse_from(["sprout", "history", "--csv", "--json"]).is_err());
    }
}
