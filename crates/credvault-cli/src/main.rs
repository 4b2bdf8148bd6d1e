//! Credvault CLI
//!
//! Keeps platform logins and passwords for the signed-in user and shows
//! recent activity.

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use credvault_core::{
    default_data_dir, delete_snapshot, domain, load_config, load_snapshot, save_config,
    save_snapshot, strength, vault_exists, ActivityEvent, SystemClock, User, VaultContext,
};

#[derive(Parser)]
#[command(name = "credvault")]
#[command(version)]
#[command(about = "Credvault - personal credential manager")]
#[command(after_help = "EXAMPLES:
  credvault sign-in --first-name Anna --last-name Nowak --login anna@mail.com
  credvault add Facebook anna@mail.com      Save a password (prompts securely)
  credvault update Facebook anna@mail.com   Change it (creates it if missing)
  credvault list                            Recently saved passwords
  credvault activity                        Recent activity")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in as a user (their vault becomes active)
    SignIn {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// Account login, usually an email
        #[arg(long)]
        login: String,
    },

    /// Sign out
    SignOut {
        /// Also delete the stored vault and its backup
        #[arg(long)]
        forget: bool,
    },

    /// Show the signed-in user
    Whoami,

    /// Save a new password
    Add {
        /// Platform name or URL
        platform: String,
        /// Login used on the platform
        login: String,
        /// Password (prompted without echo if omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Change a saved password, creating it if there is none
    Update {
        platform: String,
        login: String,
        #[arg(long)]
        password: Option<String>,
    },

    /// Remove a saved password
    Remove {
        id: Uuid,
    },

    /// Print a saved password
    Show {
        id: Uuid,
    },

    /// Record a sign-in to a platform
    Login {
        platform: String,
        login: String,
    },

    /// List recently saved passwords (never shows values)
    List {
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show recent activity
    Activity {
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Saved passwords grouped by domain
    Domains {
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Rate a password without saving it
    Strength {
        password: String,
    },

    /// Print the display domain of a URL
    Domain {
        url: String,
    },
}

/// Initialize logging
fn init_logging() {
    // stdout carries command output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .compact(),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        None => {
            println!("Credvault - personal credential manager");
            println!();
            println!("Run 'credvault --help' for usage information.");
            println!("Run 'credvault sign-in' to get started.");
        }
        Some(cmd) => {
            if let Err(e) = handle_command(cmd).await {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

async fn handle_command(cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = default_data_dir();

    match cmd {
        Commands::SignIn {
            first_name,
            last_name,
            login,
        } => handle_sign_in(&data_dir, first_name, last_name, login).await?,
        Commands::SignOut { forget } => handle_sign_out(&data_dir, forget).await?,
        Commands::Whoami => handle_whoami(&data_dir).await?,
        Commands::Add {
            platform,
            login,
            password,
        } => {
            let mut ctx = open_session(&data_dir).await?;
            let password = password_or_prompt(password, &platform)?;
            let record = ctx.add_password(&platform, &login, &password)?;
            persist(&data_dir, &ctx).await?;
            println!("Saved password for {} ({})", record.platform, record.login);
            print_strength(&password);
            println!("Id: {}", record.id);
        }
        Commands::Update {
            platform,
            login,
            password,
        } => {
            let mut ctx = open_session(&data_dir).await?;
            let password = password_or_prompt(password, &platform)?;
            let record = ctx.update_password(&password, &platform, &login)?;
            persist(&data_dir, &ctx).await?;
            println!("Updated password for {} ({})", record.platform, record.login);
            print_strength(&password);
        }
        Commands::Remove { id } => {
            let mut ctx = open_session(&data_dir).await?;
            let record = ctx.remove_password(&id)?;
            persist(&data_dir, &ctx).await?;
            println!("Removed {} ({})", record.platform, record.login);
        }
        Commands::Show { id } => {
            let mut ctx = open_session(&data_dir).await?;
            let password = ctx.reveal_password(&id)?;
            persist(&data_dir, &ctx).await?;
            println!("{}", password);
        }
        Commands::Login { platform, login } => {
            let mut ctx = open_session(&data_dir).await?;
            let event = ctx.record_login(&platform, &login)?;
            persist(&data_dir, &ctx).await?;
            println!("{}", format_event(&event));
        }
        Commands::List { limit } => handle_list(&data_dir, limit).await?,
        Commands::Activity { limit } => handle_activity(&data_dir, limit).await?,
        Commands::Domains { limit } => handle_domains(&data_dir, limit).await?,
        Commands::Strength { password } => print_strength(&password),
        Commands::Domain { url } => println!("{}", domain::normalize(&url)),
    }

    Ok(())
}

// === Session ===

/// Build the session for the configured user, or a guest session
async fn open_session(data_dir: &Path) -> Result<VaultContext, Box<dyn std::error::Error>> {
    let config = load_config(data_dir).await?;
    let clock = Arc::new(SystemClock);

    match config.user.clone() {
        Some(user) => {
            let snapshot = load_snapshot(data_dir, &user.id).await?;
            Ok(VaultContext::restore(user, snapshot, config, clock)?)
        }
        None => Ok(VaultContext::guest(config, clock)),
    }
}

async fn persist(data_dir: &Path, ctx: &VaultContext) -> Result<(), Box<dyn std::error::Error>> {
    if let (Some(user), Some(snapshot)) = (ctx.current_user(), ctx.snapshot()) {
        save_snapshot(data_dir, &user.id, &snapshot).await?;
    }
    Ok(())
}

// === Command Handlers ===

async fn handle_sign_in(
    data_dir: &Path,
    first_name: String,
    last_name: String,
    login: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(data_dir).await?;

    // same login always opens the same vault
    let user = User {
        id: Uuid::new_v5(&Uuid::NAMESPACE_OID, login.to_lowercase().as_bytes()),
        first_name,
        last_name,
        login,
    };

    println!("Signed in as {} <{}>", user.display_name(), user.login);
    if !vault_exists(data_dir, &user.id).await {
        println!("No saved passwords yet, starting a new vault.");
    }
    config.user = Some(user);
    save_config(data_dir, &config).await?;

    Ok(())
}

async fn handle_sign_out(data_dir: &Path, forget: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(data_dir).await?;

    match config.user.take() {
        Some(user) => {
            save_config(data_dir, &config).await?;
            if forget {
                delete_snapshot(data_dir, &user.id).await?;
                println!("Signed out {} and deleted their vault", user.login);
            } else {
                println!("Signed out {}", user.login);
            }
        }
        None => println!("Not signed in."),
    }

    Ok(())
}

async fn handle_whoami(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = open_session(data_dir).await?;

    match ctx.current_user() {
        Some(user) => {
            println!("{} <{}>", user.display_name(), user.login);
            println!("Saved passwords: {}", ctx.password_count());
        }
        None => println!("Guest (not signed in)"),
    }

    Ok(())
}

async fn handle_list(data_dir: &Path, limit: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = open_session(data_dir).await?;
    let limit = limit.unwrap_or(ctx.config().recent_limit);
    let records = ctx.recent_passwords(limit);

    if records.is_empty() {
        println!("No passwords saved.");
        println!();
        println!("Add your first one with: credvault add <platform> <login>");
        return Ok(());
    }

    println!("Recently saved:");
    println!();

    for record in &records {
        let label = strength::StrengthLabel::for_value(record.strength);
        let updated = record.timestamp.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M");
        println!(
            "  {} {} ({}) [{}, {}] {}",
            record.id,
            record.domain(),
            record.login,
            label,
            label.color(),
            updated
        );
    }

    println!();
    println!("Showing {} of {} password(s)", records.len(), ctx.password_count());

    Ok(())
}

async fn handle_activity(data_dir: &Path, limit: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = open_session(data_dir).await?;
    let limit = limit.unwrap_or(ctx.config().recent_limit);
    let events = ctx.recent_activity(limit);

    if events.is_empty() {
        println!("No activity yet.");
        return Ok(());
    }

    for event in &events {
        println!("{}", format_event(event));
    }

    Ok(())
}

async fn handle_domains(data_dir: &Path, limit: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = open_session(data_dir).await?;
    let limit = limit.unwrap_or(ctx.config().recent_limit);
    let groups = ctx.recent_domains(limit);

    if groups.is_empty() {
        println!("No passwords saved.");
        return Ok(());
    }

    for group in &groups {
        println!("  {} ({})", group.domain, group.count);
    }

    Ok(())
}

// === Helpers ===

fn format_event(event: &ActivityEvent) -> String {
    format!(
        "[{} {}] {} {} ({})",
        event.date,
        event.time,
        event.kind.as_str(),
        domain::normalize(&event.name),
        event.email
    )
}

fn print_strength(password: &str) {
    println!("{}", strength_line(password));
}

fn strength_line(password: &str) -> String {
    let score = strength::score(password);
    format!("Strength: {}/100 ({}, {})", score.value, score.label, score.color())
}

fn password_or_prompt(given: Option<String>, platform: &str) -> Result<String, Box<dyn std::error::Error>> {
    match given {
        Some(password) => Ok(password),
        None => prompt_password(&format!("Password for '{}': ", platform)),
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let password = rpassword::read_password()?;
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use credvault_core::{ActivityKind, VaultSnapshot};
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_update() {
        let cli = Cli::parse_from([
            "credvault",
            "update",
            "Facebook",
            "anna@mail.com",
            "--password",
            "StrongPass123!",
        ]);
        match cli.command {
            Some(Commands::Update {
                platform,
                login,
                password,
            }) => {
                assert_eq!(platform, "Facebook");
                assert_eq!(login, "anna@mail.com");
                assert_eq!(password.as_deref(), Some("StrongPass123!"));
            }
            _ => panic!("Wrong command"),
        }
    }

    #[test]
    fn test_format_event_normalizes_once() {
        let event = ActivityEvent {
            time: "09:30".to_string(),
            date: "Today".to_string(),
            name: "https://www.int.pl/#/login-clear".to_string(),
            email: "anna@int.pl".to_string(),
            color: ActivityKind::Login.color().to_string(),
            kind: ActivityKind::Login,
            occurred_at: chrono::Utc::now(),
        };

        assert_eq!(format_event(&event), "[Today 09:30] login int.pl (anna@int.pl)");
    }

    #[test]
    fn test_password_given_skips_prompt() {
        let password = password_or_prompt(Some("pw".to_string()), "x").unwrap();
        assert_eq!(password, "pw");
    }

    #[test]
    fn test_strength_line_includes_color() {
        assert_eq!(strength_line("abc"), "Strength: 21/100 (Weak, red)");
        assert_eq!(strength_line("StrongPass123!"), "Strength: 92/100 (Strong, green)");
    }

    #[test]
    fn test_parse_sign_out_forget() {
        let cli = Cli::parse_from(["credvault", "sign-out", "--forget"]);
        assert!(matches!(cli.command, Some(Commands::SignOut { forget: true })));

        let cli = Cli::parse_from(["credvault", "sign-out"]);
        assert!(matches!(cli.command, Some(Commands::SignOut { forget: false })));
    }

    #[tokio::test]
    async fn test_sign_out_keeps_or_forgets_vault() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path();

        handle_sign_in(data_dir, "Anna".into(), "Nowak".into(), "anna@mail.com".into())
            .await
            .unwrap();
        let user = load_config(data_dir).await.unwrap().user.unwrap();
        save_snapshot(data_dir, &user.id, &VaultSnapshot::empty()).await.unwrap();

        handle_sign_out(data_dir, false).await.unwrap();
        assert!(load_config(data_dir).await.unwrap().user.is_none());
        assert!(vault_exists(data_dir, &user.id).await);

        handle_sign_in(data_dir, "Anna".into(), "Nowak".into(), "anna@mail.com".into())
            .await
            .unwrap();
        handle_sign_out(data_dir, true).await.unwrap();
        assert!(!vault_exists(data_dir, &user.id).await);
    }
}
