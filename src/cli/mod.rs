pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::Theme;

#[derive(Parser)]
#[command(name = "swipedia")]
#[command(about = "Swipe through random Wikipedia articles", long_about = None)]
pub struct Cli {
    /// Database file (default: the data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the swipe feed (default)
    Feed,
    /// Print random article summaries
    Random {
        /// How many articles to fetch
        #[arg(short, long, default_value_t = 5)]
        count: usize,
    },
    /// Print a full article as plain text
    Show {
        /// Article title, page URL or /article/ route
        title: String,
    },
    /// Save an article for offline reading
    Save {
        title: String,
    },
    /// Remove a saved article
    Unsave {
        /// Page id of the saved article
        id: String,
    },
    /// List saved articles
    Saved {
        /// Only show titles or extracts containing this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show or change preferences
    Prefs {
        #[arg(long)]
        theme: Option<Theme>,

        #[arg(long)]
        haptics: Option<bool>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_defaults_to_feed() {
        let cli = Cli::try_parse_from(["swipedia"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.db.is_none());
    }

    #[test]
    fn test_random_count() {
        let cli = Cli::try_parse_from(["swipedia", "--db", "/tmp/x.db", "random", "-c", "3"])
            .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        assert!(matches!(cli.command, Some(Commands::Random { count: 3 })));
    }

    #[test]
    fn test_prefs_parses_theme() {
        let cli = Cli::try_parse_from(["swipedia", "prefs", "--theme", "dark", "--haptics", "false"])
            .unwrap();
        match cli.command {
            Some(Commands::Prefs { theme, haptics }) => {
                assert_eq!(theme, Some(Theme::Dark));
                assert_eq!(haptics, Some(false));
            }
            _ => panic!("expected prefs"),
        }
    }

    #[test]
    fn test_unknown_theme_rejected() {
        assert!(Cli::try_parse_from(["swipedia", "prefs", "--theme", "neon"]).is_err());
    }
}
