//! Townboard command line client.
//!
//! # Usage
//!
//! ```bash
//! # Sign in and persist the session
//! townboard login -e owner@example.com -p <password>
//!
//! # Print the Google authorize URL instead
//! townboard login --google
//!
//! # Who is signed in, if anyone
//! townboard whoami
//!
//! # Browse the directory
//! townboard categories
//! townboard listings --category "Restaurants & Cafes" --search bakery
//!
//! # Submit a premium business listing
//! townboard submit-business --name "Corner Bakery" --category "Restaurants & Cafes" \
//!     --image front.jpg --image counter.jpg
//!
//! # Submit a job application
//! townboard submit-application --full-name "A Person" ... --signature sig.jpg
//! ```
//!
//! Configuration comes from the environment (see `TOWNBOARD_*` variables);
//! a `.env` file in the working directory is honored.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;
mod session_file;

#[derive(Parser)]
#[command(name = "townboard")]
#[command(author, version, about = "Townboard business directory client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email + password, or print the OAuth authorize URL
    Login {
        /// Account email address
        #[arg(short, long, required_unless_present = "google")]
        email: Option<String>,

        /// Account password
        #[arg(short, long, required_unless_present = "google")]
        password: Option<String>,

        /// Start a Google OAuth sign-in instead of a password login
        #[arg(long, conflicts_with_all = ["email", "password"])]
        google: bool,
    },
    /// Sign out and forget the persisted session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// List directory businesses
    Listings {
        /// Only this category (exact, case-insensitive)
        #[arg(short, long)]
        category: Option<String>,

        /// Text to match against name, category, and description
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Print the standard listing categories
    Categories,
    /// Submit a business listing (premium accounts only)
    SubmitBusiness(commands::submit::BusinessArgs),
    /// Submit a job application
    SubmitApplication(commands::submit::ApplicationArgs),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Login {
            email,
            password,
            google,
        } => {
            if google {
                commands::auth::login_google().await?;
            } else {
                // clap guarantees both when --google is absent.
                let email = email.ok_or("email is required")?;
                let password = password.ok_or("password is required")?;
                commands::auth::login(&email, &password).await?;
            }
        }
        Commands::Logout => commands::auth::logout().await?,
        Commands::Whoami => commands::auth::whoami().await?,
        Commands::Listings { category, search } => {
            commands::directory::listings(category, search).await?;
        }
        Commands::Categories => commands::directory::categories(),
        Commands::SubmitBusiness(args) => commands::submit::business(args).await?,
        Commands::SubmitApplication(args) => commands::submit::application(args).await?,
    }
    Ok(())
}
