use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;

pub mod commands;

use commands::{init_database, print_settings, seed_database};

#[derive(Parser)]
#[command(name = "fintrack")]
#[command(about = "Personal finance tracker storage tools")]
#[command(version)]
pub struct Cli {
    /// Database URL, overriding DATABASE_URL
    ///
    /// Examples:
    ///   SQLite file: sqlite://fintrack.db?mode=rwc
    ///   In memory:   sqlite::memory:
    #[arg(short, long, global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply all pending database migrations
    InitDb,
    /// Apply migrations, then insert the default categories
    Seed,
    /// Print the stored settings as JSON
    Settings,
}

impl Cli {
    pub async fn run(self, config: &AppConfig) -> Result<()> {
        match self.command {
            Commands::InitDb => init_database(&config.database_url).await?,
            Commands::Seed => seed_database(&config.database_url).await?,
            Commands::Settings => print_settings(&config.database_url).await?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_url_flag_is_global() {
        let cli = Cli::try_parse_from(["fintrack", "seed", "--database-url", "sqlite::memory:"])
            .unwrap();

        assert!(matches!(cli.command, Commands::Seed));
        assert_eq!(cli.database_url.as_deref(), Some("sqlite::memory:"));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["fintrack"]).is_err());
        assert!(matches!(
            Cli::try_parse_from(["fintrack", "init-db"]).unwrap().command,
            Commands::InitDb
        ));
    }
}
