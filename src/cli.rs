//! Command-line interface for taskflow

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use taskflow::config::DATA_DIR_ENV;
use taskflow::core::query::Tab;
use taskflow::core::settings::View;

/// taskflow - tasks, categories and an assistant that can see them
#[derive(Parser, Debug)]
#[command(name = "taskflow")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the JSON data files
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    /// Log at debug level to the journal
    #[arg(long, global = true)]
    pub debug: bool,

    /// Defaults to `list`
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List tasks
    List {
        /// Title/description text, or `category:NAME`
        #[arg(long, allow_hyphen_values = true)]
        search: Option<String>,

        /// all, today, important, overdue, completed, or a category id
        #[arg(long)]
        filter: Option<String>,

        #[arg(long, value_enum)]
        tab: Option<TabArg>,

        /// Only tasks due on this day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Add a task
    Add {
        title: String,

        #[arg(long, allow_hyphen_values = true)]
        description: Option<String>,

        /// Category id
        #[arg(long)]
        category: Option<String>,

        /// Due day (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,

        #[arg(long)]
        important: bool,
    },

    /// Toggle a task's completed flag
    Done {
        /// Task id or unique prefix
        id: String,
    },

    /// Toggle a task's important flag
    Star { id: String },

    /// Delete a task
    Rm { id: String },

    /// List categories with their task counts
    Categories,

    /// Add a category; the color defaults to the next preset
    CategoryAdd { name: String, color: Option<String> },

    /// Delete a category and clear it from its tasks
    CategoryRm { id: String },

    /// Show search suggestions
    Suggest { text: String },

    /// Show statistics
    Stats,

    /// Remember the active view
    View {
        #[arg(value_enum)]
        view: ViewArg,
    },

    /// Change a chat setting
    Set {
        #[arg(value_enum)]
        key: SettingKey,
        value: String,
    },

    /// Ask the assistant about your tasks
    Chat {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        message: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TabArg {
    All,
    Pending,
    Completed,
}

impl From<TabArg> for Tab {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::All => Tab::All,
            TabArg::Pending => Tab::Pending,
            TabArg::Completed => Tab::Completed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ViewArg {
    Tasks,
    Calendar,
    Stats,
}

impl From<ViewArg> for View {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Tasks => View::Tasks,
            ViewArg::Calendar => View::Calendar,
            ViewArg::Stats => View::Stats,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SettingKey {
    ApiKey,
    BaseUrl,
    Model,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Command {
        let cli = Cli::try_parse_from(std::iter::once("taskflow").chain(args.iter().copied()))
            .unwrap();
        cli.command.unwrap()
    }

    #[test]
    fn boolean_flag_does_not_swallow_title() {
        assert_eq!(
            parse(&["add", "--important", "Buy milk"]),
            Command::Add {
                title: "Buy milk".into(),
                description: None,
                category: None,
                due: None,
                important: true,
            }
        );
    }

    #[test]
    fn flag_values_may_start_with_dashes() {
        match parse(&["list", "--search", "--verbose"]) {
            Command::List { search, .. } => assert_eq!(search.as_deref(), Some("--verbose")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn list_flags_are_typed() {
        assert_eq!(
            parse(&["list", "--tab", "pending", "--date", "2026-03-10", "--filter", "1"]),
            Command::List {
                search: None,
                filter: Some("1".into()),
                tab: Some(TabArg::Pending),
                date: NaiveDate::from_ymd_opt(2026, 3, 10),
            }
        );
        assert!(Cli::try_parse_from(["taskflow", "list", "--tab", "later"]).is_err());
        assert!(Cli::try_parse_from(["taskflow", "list", "--date", "10/03/2026"]).is_err());
    }

    #[test]
    fn subcommand_names_are_kebab_case() {
        assert_eq!(
            parse(&["category-add", "Garden"]),
            Command::CategoryAdd {
                name: "Garden".into(),
                color: None,
            }
        );
        assert_eq!(
            parse(&["set", "base-url", "http://localhost:11434/v1"]),
            Command::Set {
                key: SettingKey::BaseUrl,
                value: "http://localhost:11434/v1".into(),
            }
        );
    }

    #[test]
    fn chat_collects_the_whole_message() {
        assert_eq!(
            parse(&["chat", "what", "is", "--overdue?"]),
            Command::Chat {
                message: vec!["what".into(), "is".into(), "--overdue?".into()],
            }
        );
        assert!(Cli::try_parse_from(["taskflow", "chat"]).is_err());
    }

    #[test]
    fn command_is_optional() {
        let cli = Cli::try_parse_from(["taskflow", "--debug"]).unwrap();
        assert!(cli.debug);
        assert!(cli.command.is_none());
    }
}
