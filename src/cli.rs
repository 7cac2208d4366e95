use clap::{Parser, Subcommand};

/// PlateFinder — restaurant discovery API
#[derive(Parser)]
#[command(name = "platefinder", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Port to bind
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a user from the command line
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// List registered users
    List,
}
