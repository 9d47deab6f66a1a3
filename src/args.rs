use crate::config::{DataDir, MailConfig};
use crate::mailbox::GMAIL_API_BASE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(name = "mail-triage")]
#[clap(version, about)]
pub struct Args {
    /// Directory holding the vocabulary, labels, feature cache and statistics.
    #[clap(short, long, default_value = "data")]
    pub data_dir: PathBuf,
    /// The store layout inside data_dir.
    #[clap(skip)]
    pub layout: DataDir,
    /// Suppress any progress output if set.
    #[clap(short, long)]
    pub quiet: bool,
    /// Bearer access token for the mailbox API.
    #[clap(long, env = "MAIL_TRIAGE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    /// Root URL of the mailbox REST API.
    #[clap(long, env = "MAIL_TRIAGE_API", default_value = GMAIL_API_BASE)]
    pub api_base: String,
    /// Mailbox user whose messages are read.
    #[clap(long, default_value = "me")]
    pub user: String,
    /// Number of messages requested per page.
    #[clap(long, default_value_t = 25)]
    pub page_size: u32,
    /// Stop collecting after this many pages.
    #[clap(long)]
    pub max_pages: Option<usize>,
    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Label unseen messages interactively (the default).
    Collect,
    /// Create the vocabulary if needed and update the feature cache.
    Build,
    /// Update the feature cache against the current vocabulary.
    Update {
        /// Recompute every cached feature vector.
        #[clap(long)]
        refresh: bool,
    },
    /// Add the stems of all labeled messages to the vocabulary.
    ExtendVocabulary,
    /// Predict whether one message is spam.
    Classify {
        /// Mailbox id of the message.
        id: String,
    },
    /// List the labels defined in the mailbox.
    Labels,
    /// Summarize the stored labels, features and prediction score.
    Stats,
}

impl Args {
    pub fn parse_args() -> Self {
        let mut result: Self = Self::parse();
        result.layout = DataDir::new(&result.data_dir);
        result
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Collect)
    }

    pub fn mail_config(&self) -> MailConfig {
        MailConfig {
            api_base: self.api_base.clone(),
            user: self.user.clone(),
            token: self.token.clone(),
            page_size: self.page_size,
            max_pages: self.max_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(&["mail-triage"]).unwrap();
        assert_eq!(args.command(), Command::Collect);
        assert_eq!(args.page_size, 25);
        assert_eq!(args.max_pages, None);
        assert_eq!(args.user, "me");
    }

    #[test]
    fn test_subcommands() {
        let args =
            Args::try_parse_from(&["mail-triage", "-d", "/tmp/x", "update", "--refresh"]).unwrap();
        assert_eq!(args.data_dir, PathBuf::from("/tmp/x"));
        assert_eq!(args.command(), Command::Update { refresh: true });

        let args = Args::try_parse_from(&["mail-triage", "classify", "17a"]).unwrap();
        assert_eq!(args.command(), Command::Classify { id: "17a".to_string() });

        let args = Args::try_parse_from(&["mail-triage", "extend-vocabulary"]).unwrap();
        assert_eq!(args.command(), Command::ExtendVocabulary);
    }
}
