//! Studio TUI Entry Point
//!
//! Launches the terminal UI for podcast-studio.
//!
//! Usage:
//!   studio-tui [OPTIONS]
//!
//! Options:
//!   -c, --config <FILE>   Configuration file
//!   -u, --base-url <URL>  Generation service base URL
//!       --color <COLOR>   Initial waveform color (preset name or #RRGGBB)
//!
//! Logging goes to the file named by `STUDIO_LOG_FILE`; without it only
//! warnings are emitted, to stderr.

use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use studio_core::config::{self, ConfigOverrides};
use studio_core::StudioConfig;
use studio_tui::App;

/// Studio TUI - generate podcasts from your terminal
#[derive(Parser, Debug)]
#[command(name = "studio-tui")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "STUDIO_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Generation service base URL
    #[arg(short = 'u', long, value_name = "URL")]
    base_url: Option<String>,

    /// Initial waveform color: a preset name or #RRGGBB
    #[arg(long, value_name = "COLOR")]
    color: Option<String>,
}

/// Log to `STUDIO_LOG_FILE` if set; stdout belongs to the terminal UI
fn init_logging() -> anyhow::Result<()> {
    if let Some(path) = std::env::var_os("STUDIO_LOG_FILE") {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.to_string_lossy()))?;

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("studio_tui=info,studio_core=info")
            }))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(io::stderr),
            )
            .with(EnvFilter::new("warn"))
            .init();
    }
    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<StudioConfig> {
    let path = args.config.clone().or_else(config::default_config_path);
    let mut studio_config =
        config::load_config_from_path(path).context("Failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(ref url) = args.base_url {
        overrides = overrides.with_base_url(url);
    }
    if let Some(ref color) = args.color {
        overrides = overrides.with_color(color);
    }
    overrides.apply(&mut studio_config);
    studio_config
        .validate()
        .context("Invalid configuration")?;
    Ok(studio_config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging()?;
    let studio_config = load_config(&args)?;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: studio-tui requires a terminal (TTY)");
        eprintln!();
        eprintln!("Use the `studio` command for non-interactive use.");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let result = run_app(&mut terminal, &studio_config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    studio_config: &StudioConfig,
) -> anyhow::Result<()> {
    let mut app = App::new(studio_config)?;
    app.run(terminal).await
}
