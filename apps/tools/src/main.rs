use admin_api::{command_bus, BanUser, CreateUser, UnbanUser};
use admin_crud::{Command, CommandBus, CommandDispatcher, DeleteTokenManager, DEFAULT_CSRF_SECRET};
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use shared::domain::UserId;
use storage::Storage;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/backoffice.db")]
    database_url: String,
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    CreateUser {
        username: String,
        email: String,
    },
    ListUsers,
    Ban {
        user_id: i64,
    },
    Unban {
        user_id: i64,
    },
    /// Prints the token a delete form must carry for `user_id`.
    ///
    /// Without `--secret`, reads `APP__CSRF_SECRET`, then `CSRF_SECRET`,
    /// like the server does.
    DeleteToken {
        user_id: i64,
        #[arg(long)]
        secret: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.action {
        Action::CreateUser { username, email } => {
            let (storage, bus) = open(&cli.database_url).await?;
            run(
                &bus,
                CreateUser {
                    username: username.clone(),
                    email,
                },
            )
            .await?;
            if let Some(user) = storage.find_user_by_username(&username).await? {
                println!("created user_id={}", user.id);
            }
        }
        Action::ListUsers => {
            let (storage, _) = open(&cli.database_url).await?;
            for user in storage.list_users().await? {
                let status = if user.is_banned { "banned" } else { "active" };
                println!("{}\t{}\t{}\t{status}", user.id, user.username, user.email);
            }
        }
        Action::Ban { user_id } => {
            let (_, bus) = open(&cli.database_url).await?;
            run(&bus, BanUser { id: UserId(user_id) }).await?;
            println!("banned user_id={user_id}");
        }
        Action::Unban { user_id } => {
            let (_, bus) = open(&cli.database_url).await?;
            run(&bus, UnbanUser { id: UserId(user_id) }).await?;
            println!("unbanned user_id={user_id}");
        }
        Action::DeleteToken { user_id, secret } => {
            let secret = csrf_secret(secret, |key| std::env::var(key).ok());
            let token = DeleteTokenManager::new(secret).delete_token(&user_id.to_string());
            println!("{token}");
        }
    }

    Ok(())
}

async fn open(database_url: &str) -> Result<(Storage, CommandBus)> {
    let storage = Storage::new(database_url).await?;
    let bus = command_bus(storage.clone());
    Ok((storage, bus))
}

async fn run(bus: &dyn CommandDispatcher, command: impl Command) -> Result<()> {
    if let Err(error) = bus.dispatch(Box::new(command)).await {
        bail!("{error}");
    }
    Ok(())
}

fn csrf_secret(flag: Option<String>, env: impl Fn(&str) -> Option<String>) -> String {
    flag.or_else(|| env("APP__CSRF_SECRET"))
        .or_else(|| env("CSRF_SECRET"))
        .unwrap_or_else(|| DEFAULT_CSRF_SECRET.to_string())
}
