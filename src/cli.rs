use clap::{Parser, Subcommand};

/// Gestor — tenant-aware edge service
#[derive(Parser)]
#[command(name = "gestor-edge", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the edge server
    Serve {
        /// Port to bind
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Inspect tenants
    Tenant {
        #[command(subcommand)]
        command: TenantCommands,
    },

    /// Outbound mail utilities
    Mail {
        #[command(subcommand)]
        command: MailCommands,
    },
}

#[derive(Subcommand)]
pub enum TenantCommands {
    /// List registered tenants
    List,
}

#[derive(Subcommand)]
pub enum MailCommands {
    /// Send a test message through the configured provider
    Test {
        /// Recipient address
        #[arg(long)]
        to: String,
        /// Recipient display name
        #[arg(long, default_value = "")]
        name: String,
    },
}
