use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use todo_client::config::ConfigError;
use todo_client::net::types::{HistoryDay, UserSettings};
use todo_client::{
    ApiError, ClientConfig, FileStorage, HttpApi, Navigation, Route, SessionStore, Storage, Task, TaskPatch, TodoApi,
    TodoStore, check_navigation,
};
use tracing_subscriber::EnvFilter;


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("http client setup failed: {0}")]
    Api(#[from] ApiError),
    #[error("{0} failed; rerun with RUST_LOG=debug for details")]
    OperationFailed(&'static str),
    #[error("no todo with id {0}")]
    UnknownTodo(i64),
    #[error("nothing to change; pass at least one field")]
    EmptyEdit,
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "todo", about = "Personal to-do list client")]
struct Cli {
    /// API root including `/api` (overrides `TODO_API_BASE_URL`).
    #[arg(long)]
    base_url: Option<String>,

    /// Session file (overrides `TODO_STORAGE_PATH`).
    #[arg(long)]
    storage: Option<PathBuf>,

    /// Print raw JSON instead of text.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login(CredentialArgs),
    Logout,
    Register(CredentialArgs),
    Whoami,
    PublicAccess {
        #[command(subcommand)]
        command: PublicAccessCommand,
    },
    List,
    Add {
        title: String,
        #[arg(long)]
        emoji: String,
        #[arg(long)]
        description: Option<String>,
    },
    Toggle {
        id: i64,
    },
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        emoji: Option<String>,
        #[arg(long)]
        completed: Option<bool>,
    },
    Delete {
        id: i64,
    },
    History,
}

#[derive(Args, Debug)]
struct CredentialArgs {
    username: String,

    #[arg(long, env = "TODO_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand, Debug)]
enum PublicAccessCommand {
    Show,
    On,
    Off,
}

struct CliContext {
    api: Arc<dyn TodoApi>,
    storage: Arc<dyn Storage>,
    session: SessionStore,
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url)?;
    }
    if let Some(path) = &cli.storage {
        config.storage_path.clone_from(path);
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;
    tracing::debug!(base_url = %config.base_url, storage = %config.storage_path.display(), "starting");

    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.storage_path));
    let api: Arc<dyn TodoApi> = Arc::new(HttpApi::new(&config)?);
    let session = SessionStore::new(api.clone(), storage.clone());
    let ctx = CliContext { api, storage, session, json: cli.json };

    match cli.command {
        Command::Login(args) => run_login(&ctx, args).await,
        Command::Logout => {
            ctx.session.logout();
            println!("logged out");
            Ok(())
        }
        Command::Register(args) => {
            if !ctx.session.register(&args.username, &args.password).await {
                return Err(CliError::OperationFailed("register"));
            }
            println!("registered {}; run `todo login {}` to sign in", args.username, args.username);
            Ok(())
        }
        Command::Whoami => run_whoami(&ctx),
        Command::PublicAccess { command } => run_public_access(&ctx, command).await,
        Command::List => run_list(&ctx).await,
        Command::Add { title, emoji, description } => run_add(&ctx, &title, &emoji, description.as_deref()).await,
        Command::Toggle { id } => run_toggle(&ctx, id).await,
        Command::Edit { id, title, description, emoji, completed } => {
            run_edit(&ctx, id, TaskPatch { title, description, emoji, completed }).await
        }
        Command::Delete { id } => run_delete(&ctx, id).await,
        Command::History => run_history(&ctx).await,
    }
}

// =============================================================================
// SESSION COMMANDS
// =============================================================================

async fn run_login(ctx: &CliContext, args: CredentialArgs) -> Result<(), CliError> {
    if let Navigation::Redirect(to) = check_navigation(Route::Login.path(), ctx.storage.as_ref()) {
        let username = ctx.session.user().map(|u| u.username).unwrap_or_default();
        tracing::debug!(redirect = to, "login route guarded");
        println!("already logged in as {username}; run `todo logout` first");
        return Ok(());
    }
    if !ctx.session.login(&args.username, &args.password).await {
        return Err(CliError::OperationFailed("login"));
    }
    println!("logged in as {}", args.username);
    Ok(())
}

fn run_whoami(ctx: &CliContext) -> Result<(), CliError> {
    ctx.session.init_auth();
    match ctx.session.user() {
        Some(user) if ctx.json => print_json(&user),
        Some(user) => {
            let sharing = if user.public_access.unwrap_or(false) { "public" } else { "private" };
            println!("{} (id {}, {sharing})", user.username, user.id);
            Ok(())
        }
        None => {
            println!("not logged in");
            Ok(())
        }
    }
}

async fn run_public_access(ctx: &CliContext, command: PublicAccessCommand) -> Result<(), CliError> {
    let public_access = match command {
        PublicAccessCommand::Show => {
            ctx.session.fetch_public_access().await;
            None
        }
        PublicAccessCommand::On => Some(true),
        PublicAccessCommand::Off => Some(false),
    };
    if let Some(public_access) = public_access {
        if !ctx.session.update_user_settings(UserSettings { public_access }).await {
            return Err(CliError::OperationFailed("update settings"));
        }
    }

    let snapshot = ctx
        .session
        .public_access()
        .ok_or(CliError::OperationFailed("fetch public access"))?;
    if ctx.json {
        return print_json(&snapshot);
    }
    let state = if snapshot.public_access { "on" } else { "off" };
    println!("public access for {}: {state}", snapshot.username);
    Ok(())
}

// =============================================================================
// TODO COMMANDS
// =============================================================================

async fn loaded_store(ctx: &CliContext) -> TodoStore {
    let mut store = TodoStore::new(ctx.api.clone(), ctx.session.clone());
    store.fetch_todos().await;
    store
}

async fn run_list(ctx: &CliContext) -> Result<(), CliError> {
    let store = loaded_store(ctx).await;
    if ctx.json {
        return print_json(store.todos());
    }
    for task in store.todos() {
        println!("{}", render_task(task));
    }
    let stats = store.stats();
    println!("{}/{} done", stats.completed, stats.total);
    Ok(())
}

async fn run_add(ctx: &CliContext, title: &str, emoji: &str, description: Option<&str>) -> Result<(), CliError> {
    let mut store = TodoStore::new(ctx.api.clone(), ctx.session.clone());
    if !store.add_todo(title, emoji, description).await {
        return Err(CliError::OperationFailed("add"));
    }
    let Some(task) = store.todos().last() else {
        return Err(CliError::OperationFailed("add"));
    };
    print_task(ctx, task)
}

async fn run_toggle(ctx: &CliContext, id: i64) -> Result<(), CliError> {
    let mut store = loaded_store(ctx).await;
    let before = store.get(id).ok_or(CliError::UnknownTodo(id))?.completed;
    store.toggle_todo(id).await;
    match store.get(id) {
        Some(task) if task.completed != before => print_task(ctx, task),
        _ => Err(CliError::OperationFailed("toggle")),
    }
}

async fn run_edit(ctx: &CliContext, id: i64, patch: TaskPatch) -> Result<(), CliError> {
    if patch.is_empty() {
        return Err(CliError::EmptyEdit);
    }
    let mut store = loaded_store(ctx).await;
    if store.get(id).is_none() {
        return Err(CliError::UnknownTodo(id));
    }
    if !store.edit_todo(id, &patch).await {
        return Err(CliError::OperationFailed("edit"));
    }
    let task = store.get(id).ok_or(CliError::UnknownTodo(id))?;
    print_task(ctx, task)
}

async fn run_delete(ctx: &CliContext, id: i64) -> Result<(), CliError> {
    let mut store = loaded_store(ctx).await;
    if store.get(id).is_none() {
        return Err(CliError::UnknownTodo(id));
    }
    store.delete_todo(id).await;
    if store.get(id).is_some() {
        return Err(CliError::OperationFailed("delete"));
    }
    println!("deleted {id}");
    Ok(())
}

async fn run_history(ctx: &CliContext) -> Result<(), CliError> {
    let store = TodoStore::new(ctx.api.clone(), ctx.session.clone());
    let days = store.history().await;
    if ctx.json {
        return print_json(&days);
    }
    if days.is_empty() {
        println!("no history");
    }
    for day in &days {
        println!("{}", render_day_header(day));
        for task in &day.tasks {
            println!("  {}", render_task(task));
        }
    }
    Ok(())
}

// =============================================================================
// OUTPUT
// =============================================================================

fn render_task(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    match task.description.as_deref().filter(|d| !d.is_empty()) {
        Some(description) => format!("[{mark}] {:>4} {} {} ({description})", task.id, task.emoji, task.title),
        None => format!("[{mark}] {:>4} {} {}", task.id, task.emoji, task.title),
    }
}

fn render_day_header(day: &HistoryDay) -> String {
    format!("{}  {}/{} done", day.date, day.completed_count, day.count)
}

fn print_task(ctx: &CliContext, task: &Task) -> Result<(), CliError> {
    if ctx.json {
        return print_json(task);
    }
    println!("{}", render_task(task));
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
