mod api;
mod catalog;
mod config;
mod logging;
mod session;
mod ui;

use anyhow::{Context, Result};
use api::HttpStore;
use catalog::{format_price, Catalog, Category, Product, RefreshSignal};
use clap::Parser;
use config::Overrides;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use logging::{init_logging, LogTarget};
use ratatui::{backend::CrosstermBackend, Terminal};
use session::Session;
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use ui::{run_app, App, Backend};

#[derive(Parser, Debug)]
#[command(name = "catalog-admin")]
#[command(about = "TUI admin client for a product catalog", long_about = None)]
struct Args {
    /// Catalog server base URL
    #[arg(short, long, env = "CATALOG_SERVER")]
    server: Option<String>,

    /// Session token; skips the login screen
    #[arg(long, env = "CATALOG_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Config file (default: <config dir>/catalog-admin/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log file used while the TUI is running
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Check connection and list categories without starting TUI
    #[arg(long)]
    check: bool,

    /// Run against a seeded in-process store instead of a server
    #[arg(long, conflicts_with = "check")]
    demo: bool,
}

fn cleanup_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
}

/// Token for check mode, resolved the same way the TUI resolves it.
fn check_token(explicit: Option<String>, token_file: Option<PathBuf>) -> Option<String> {
    Session::restore(explicit, token_file)
        .current_token()
        .map(str::to_string)
}

/// Connectivity check: one category listing, printed to stdout.
async fn check(server: &str, token: Option<String>) -> Result<()> {
    println!("Connecting to {}...", server);
    let catalog = Catalog::new(Arc::new(HttpStore::new(server, token)?), RefreshSignal::new());

    let categories = match timeout(Duration::from_secs(5), catalog.list::<Category>(None)).await {
        Ok(Ok(categories)) => categories,
        Ok(Err(e)) => {
            eprintln!("❌ Request failed: {}", e);
            std::process::exit(1);
        }
        Err(_) => {
            eprintln!("❌ Request timed out after 5 seconds");
            std::process::exit(1);
        }
    };

    println!("✅ Server is healthy!");
    println!("Found {} categories:", categories.len());
    for c in &categories {
        println!("  - {} ({}, {})", c.name, c.id, c.status.as_str());
    }

    if let Ok(Ok(products)) =
        timeout(Duration::from_secs(5), catalog.list::<Product>(None)).await
    {
        println!("Found {} products:", products.len());
        for p in &products {
            let price = p.price.map(format_price).unwrap_or_else(|| "-".to_string());
            println!("  - {} ({}) {}", p.name, p.id, price);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let settings = config::load(
        args.config.as_deref(),
        Overrides {
            server: args.server.clone(),
            log_file: args.log_file.clone(),
        },
    )?;

    // Check mode - test connection and exit
    if args.check {
        init_logging(LogTarget::Stderr)?;
        let token = check_token(args.token.clone(), settings.token_file.clone());
        return check(&settings.server, token).await;
    }

    let log_target = match &settings.log_file {
        Some(path) => LogTarget::File(path.clone()),
        None => LogTarget::Off,
    };
    init_logging(log_target)?;

    let backend = if args.demo {
        tracing::info!("starting in demo mode");
        Backend::demo()
    } else {
        tracing::info!(server = %settings.server, "starting");
        Backend::http(&settings.server)?
    };
    // Demo sessions never touch the token file.
    let token_file = if args.demo {
        None
    } else {
        settings.token_file.clone()
    };
    let session = Session::restore(args.token.clone(), token_file);
    let app = App::new(settings, session, backend).context("Failed to start application")?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        cleanup_terminal();
        original_hook(panic_info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    cleanup_terminal();
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "application error");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_mode_uses_the_remembered_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "remembered\n").unwrap();

        assert_eq!(
            check_token(None, Some(path.clone())),
            Some("remembered".to_string())
        );
        assert_eq!(
            check_token(Some("from-flag".into()), Some(path)),
            Some("from-flag".to_string())
        );
        assert_eq!(check_token(None, None), None);
    }
}
