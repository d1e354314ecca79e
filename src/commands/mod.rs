mod account;
mod history;
mod repos;
mod sync;
mod watch;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

use crate::{error::SyncError, models::Platform, AppState};

/// Syncs accepted LeetCode and Codeforces solutions to a GitHub repository.
#[derive(Parser, Debug)]
#[command(name = "codesync", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Verify a GitHub token and store it
    Login {
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: String,

        /// `owner/name`, or a repository name under your account
        #[arg(long)]
        repo: Option<String>,
    },

    /// Forget the stored token and the publish history
    Logout,

    /// Check that the stored token still works
    TestCredentials,

    /// List your repositories, most recently updated first
    Repos,

    /// Create a repository for your solutions
    CreateRepo {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        private: bool,
    },

    /// Show recently published solutions
    History {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },

    /// Remove every publish history record
    ClearHistory,

    /// Show login state and publish counts
    Status,

    /// Publish a submission described by a JSON file
    Sync { file: PathBuf },

    /// Watch a judge page for an accepted verdict
    Watch {
        #[arg(long)]
        site: Platform,

        #[arg(long)]
        url: Url,

        /// Keep watching across navigations instead of stopping after one page
        #[arg(long)]
        follow: bool,
    },
}

pub type CommandResult = Result<String, CommandError>;

#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("{message}")]
    User { message: String },
    #[error("{message}")]
    Internal { message: String },
}

fn user_err(message: impl Into<String>) -> CommandError {
    CommandError::User {
        message: message.into(),
    }
}

fn internal_err(message: impl Into<String>) -> CommandError {
    CommandError::Internal {
        message: message.into(),
    }
}

impl From<SyncError> for CommandError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Storage(err) => internal_err(format!("Storage error: {err}")),
            err => user_err(err.to_string()),
        }
    }
}

pub async fn run(state: &AppState, command: Command) -> CommandResult {
    match command {
        Command::Login { token, repo } => account::login(state, &token, repo.as_deref()).await,
        Command::Logout => account::logout(state).await,
        Command::TestCredentials => account::test_credentials(state).await,
        Command::Repos => repos::list(state).await,
        Command::CreateRepo { name, private } => repos::create(state, name, private).await,
        Command::History { limit } => history::list(state, limit).await,
        Command::ClearHistory => history::clear(state).await,
        Command::Status => history::status(state).await,
        Command::Sync { file } => sync::sync_file(state, &file).await,
        Command::Watch { site, url, follow } => watch::watch(state, site, url, follow).await,
    }
}
