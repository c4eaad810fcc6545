use std::process::ExitCode;

use anyhow::Result;
use attendify_core::{GENERIC_ERROR_MESSAGE, OAuthProvider, routes};
use attendify_service::ServiceError;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod context;
mod render;

use commands::list::{ListArgs, ResourceKind};

#[derive(Parser)]
#[command(name = "attendify")]
#[command(about = "Manage attendify activities, groups and users from the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Sign out and forget stored tokens
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Renew the stored token pair
    Refresh,
    /// Print the browser URL that starts a provider login
    OauthUrl { provider: OAuthProvider },
    /// Finish a provider login from the callback query string
    Callback { query: String },
    /// Show the navigation entries available to the signed-in user
    Menu,
    /// List one page of a collection
    List {
        resource: ResourceKind,
        #[command(flatten)]
        args: ListArgs,
    },
    /// Create, edit and delete groups, and manage their members
    Group {
        #[command(subcommand)]
        command: commands::groups::GroupCommand,
    },
    /// Show events in a date range
    Calendar {
        /// Month to show, as YYYY-MM; defaults to the next thirty days
        #[arg(short, long)]
        month: Option<String>,
    },
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login { email, password } => commands::auth::run_login(&email, password).await,
        Commands::Logout => commands::auth::run_logout().await,
        Commands::Whoami => commands::auth::run_whoami().await,
        Commands::Refresh => commands::auth::run_refresh().await,
        Commands::OauthUrl { provider } => commands::auth::run_oauth_url(provider),
        Commands::Callback { query } => commands::auth::run_callback(&query).await,
        Commands::Menu => commands::auth::run_menu().await,
        Commands::List { resource, args } => commands::list::run_list(resource, &args).await,
        Commands::Group { command } => commands::groups::run_group(command).await,
        Commands::Calendar { month } => commands::calendar::run_calendar(month.as_deref()).await,
    }
}

/// Last line of defence: not-found errors get their own view, everything
/// else the generic message and a way back home.
fn report_failure(err: &anyhow::Error) {
    if let Some(ServiceError::NotFound { what, id }) = err.downcast_ref::<ServiceError>() {
        render::print_not_found(what, id);
        return;
    }
    tracing::error!(error = ?err, "Command failed");
    eprintln!("{GENERIC_ERROR_MESSAGE}");
    eprintln!("Error: {err:#}");
    eprintln!("Start again from {}", routes::HOME);
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&err);
            ExitCode::FAILURE
        },
    }
}
