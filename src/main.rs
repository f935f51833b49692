//! hebdo - a weekly task board with local and remote persistence.
//!
//! The binary wires the pieces together: configuration, authentication
//! status, backend selection, and the persistence coordinator. With no
//! arguments it prints the current work week; `export` writes the board
//! to stdout and `import <file>` replaces it from a previous export.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use hebdo_config::Config;
use hebdo_protocol::{BoardState, Week, is_today};
use hebdo_storage::{LocalStore, RemoteStore, TaskBackend};
use hebdo_sync::{AuthStatus, Coordinator, resolve_token};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::load()?;
    let data_file = config.data_file()?;
    let local = Arc::new(LocalStore::new(&data_file));

    let token = resolve_token(config.api.as_ref().and_then(|api| api.token.as_deref()));
    let (remote, auth): (Option<Arc<dyn TaskBackend>>, AuthStatus) = match (&config.api, token) {
        (Some(api), Some(token)) => {
            let user = api.user.clone().unwrap_or_else(|| "api".to_string());
            (
                Some(Arc::new(RemoteStore::new(&api.base_url, Some(token)))),
                AuthStatus::Authenticated { user },
            )
        }
        _ => (None, AuthStatus::Guest),
    };

    let mut coordinator = Coordinator::new(local, remote)
        .with_autosave(data_file, Duration::from_millis(config.autosave_ms));
    coordinator.set_auth_status(auth).await;

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None => print_board(coordinator.state()),
        Some("export") => println!("{}", coordinator.export_data()?),
        Some("import") => {
            let path = args.next().context("usage: hebdo import <file>")?;
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {path}"))?;
            coordinator.import_data(&text).await?;
            coordinator.flush();
            println!("imported {} tasks", coordinator.state().tasks.len());
        }
        Some(other) => anyhow::bail!("unknown command: {other} (expected export or import)"),
    }

    Ok(())
}

fn print_board(state: &BoardState) {
    if let Some(error) = &state.error {
        eprintln!("warning: {error}");
    }
    for date in state.column_dates() {
        let marker = if is_today(date) { "  <- today" } else { "" };
        println!("{}{marker}", date.format("%A %Y-%m-%d"));
        for task in state.column_tasks(&Week::column_key(date)) {
            let done = if task.completed { "x" } else { " " };
            println!("  [{done}] {}", task.title);
        }
    }
}
