use clap::{Args, Subcommand};
use eyre::eyre;

use project_board_api::{accounts::Accounts, create_store};
use project_board_db::{object_id, Role};

#[derive(Debug, Args)]
pub struct AdminArgs {
    #[clap(subcommand)]
    commands: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an object ID
    ///
    /// This is useful for generating initial data or for testing.
    MakeId(MakeId),
    /// Hash a password
    HashPassword(HashPassword),
    /// Create a user directly in the database, such as the first manager.
    CreateUser(CreateUser),
}

#[derive(Debug, Args)]
pub struct MakeId {
    #[clap(subcommand)]
    command: IdType,
}

#[derive(Debug, Subcommand)]
enum IdType {
    User,
    Project,
    ProjectFile,
}

#[derive(Debug, Args)]
pub struct HashPassword {
    /// The password to hash
    password: String,
}

#[derive(Debug, Args)]
pub struct CreateUser {
    #[clap(long, env)]
    database_url: String,
    #[clap(long)]
    email: String,
    #[clap(long)]
    password: String,
    /// `client`, `designer`, or `manager`
    #[clap(long)]
    role: Role,
}

pub async fn admin_commands(cmd: AdminArgs) -> Result<(), eyre::Report> {
    match cmd.commands {
        Commands::MakeId(MakeId { command }) => make_id(command),
        Commands::HashPassword(HashPassword { password }) => hash_password(password)?,
        Commands::CreateUser(args) => create_user(args).await?,
    }

    Ok(())
}

fn make_id(id: IdType) {
    let id = match id {
        IdType::User => object_id::UserId::new().to_string(),
        IdType::Project => object_id::ProjectId::new().to_string(),
        IdType::ProjectFile => object_id::ProjectFileId::new().to_string(),
    };

    println!("{id}");
}

fn hash_password(password: String) -> Result<(), eyre::Report> {
    let hash = project_board_auth::new_hash(password.as_str())?;
    println!("{hash}");
    Ok(())
}

async fn create_user(args: CreateUser) -> Result<(), eyre::Report> {
    let store = create_store(Some(&args.database_url)).await?;
    let accounts = Accounts::new(store, chrono::Duration::days(1));
    let user = accounts
        .sign_up(&args.email, &args.password, args.role)
        .await
        .map_err(|e| eyre!("{e}"))?;

    println!("{}", user.user_id);
    Ok(())
}
