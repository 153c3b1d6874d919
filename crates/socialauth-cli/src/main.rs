use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

use socialauth_cli::{SuperuserInput, create_superuser};
use socialauth_db::{
    PgAccountRepository, PgRefreshTokenStore, RefreshTokenStore, init_db_pool,
};

#[derive(Parser)]
#[command(name = "socialauth-cli")]
#[command(about = "SocialAuth CLI - Administrative tools for SocialAuth", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an active, verified staff account
    CreateSuperuser {
        /// Display name
        #[arg(short = 'n', long)]
        full_name: Option<String>,

        /// Handle
        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Phone number (optional)
        #[arg(long)]
        phone: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Delete blacklisted refresh tokens that have expired anyway
    FlushExpiredTokens,
}

fn prompt(value: Option<String>, label: &str) -> anyhow::Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Input::new()
            .with_prompt(label)
            .interact_text()
            .with_context(|| format!("Failed to read {}", label.to_lowercase())),
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("\n❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = init_db_pool(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::CreateSuperuser {
            full_name,
            username,
            email,
            phone,
            password,
        } => {
            let full_name = prompt(full_name, "Full name")?;
            let username = prompt(username, "Username")?;
            let email = prompt(email, "Email address")?;
            let password = match password {
                Some(password) => password,
                None => Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Confirm password", "Passwords don't match")
                    .interact()
                    .context("Failed to read password")?,
            };

            let repo = PgAccountRepository::new(pool);
            let account = create_superuser(
                &repo,
                SuperuserInput {
                    full_name,
                    username,
                    email,
                    phone,
                    password,
                },
            )
            .await
            .map_err(|e| e.error.context("Error creating superuser"))?;

            println!("\n✅ Superuser created successfully!");
            println!("   Email: {}", account.email);
            println!("   Username: {}", account.username);
        }
        Commands::FlushExpiredTokens => {
            let removed = PgRefreshTokenStore::new(pool)
                .purge_expired()
                .await
                .map_err(|e| e.error.context("Error flushing tokens"))?;
            println!("✅ Removed {} expired refresh token(s)", removed);
        }
    }

    Ok(())
}
