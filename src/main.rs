//! WORDRUSH - build words from a growing pool of letters before the clock runs out
//!
//! Longer words score more and buy more time.

mod app;
mod config;
mod game;
mod timer;
mod tui;

use anyhow::{Context, Result};
use app::{AppCoordinator, Session};
use clap::Parser;
use config::{Config, ConfigStore, FileConfigStore};
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use directories::ProjectDirs;
use game::dictionary::DictionaryKind;
use game::validation::Validator;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use timer::SystemClock;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tui::Tui;

#[derive(Debug, Parser)]
#[command(name = "wordrush", version, about = "Build words against the clock")]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Accept any word instead of asking the online dictionary
    #[arg(long)]
    offline: bool,

    /// Save the effective settings to the config file and exit
    #[arg(long)]
    write_config: bool,

    /// Base URL of the dictionary service
    #[arg(long)]
    dictionary_url: Option<String>,

    /// Seed for letter generation
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs here instead of the default data directory
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let store = match &args.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let mut cfg = store.load().context("loading config")?;
    apply_overrides(&mut cfg, &args);

    if args.write_config {
        store.save(&cfg).context("writing config")?;
        println!("Wrote {}", store.path().display());
        return Ok(());
    }

    init_logging(args.log_file.clone().or_else(default_log_path));
    info!(
        "Starting wordrush v{} (config {})",
        env!("CARGO_PKG_VERSION"),
        store.path().display()
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("starting async runtime")?;

    let dictionary = cfg
        .dictionary
        .build(
            &cfg.dictionary_url,
            Duration::from_millis(cfg.lookup_timeout_ms),
        )
        .context("building dictionary client")?;
    info!(dictionary = dictionary.name(), "dictionary ready");

    let validator = Validator::new(dictionary, cfg.rules.min_word_length);
    let scoring = cfg.scoring.policy();
    let session = match args.seed {
        Some(seed) => Session::with_seed(cfg.rules.clone(), scoring, seed),
        None => Session::new(cfg.rules.clone(), scoring),
    };
    let mut app = AppCoordinator::new(session, validator, runtime.handle().clone(), SystemClock);

    let mut terminal = Tui::new().context("opening terminal")?;
    terminal.enter().context("entering raw mode")?;

    let result = run(&mut terminal, &mut app);

    terminal.exit().context("restoring terminal")?;
    runtime.shutdown_timeout(Duration::from_millis(500));
    info!("Exiting wordrush");
    result
}

/// Main event loop
fn run(terminal: &mut Tui, app: &mut AppCoordinator<SystemClock>) -> Result<()> {
    loop {
        terminal.draw(|frame| tui::render(frame, &app.session))?;

        if event::poll(app.poll_timeout())? {
            match event::read()? {
                // Only handle key press events (not release)
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Esc => app.quit(),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        app.quit()
                    }
                    KeyCode::Enter => app.on_enter(),
                    KeyCode::Backspace => app.on_backspace(),
                    KeyCode::Tab | KeyCode::Delete => app.on_clear(),
                    KeyCode::Char(c) if c.is_ascii_alphabetic() => {
                        app.on_char(c.to_ascii_uppercase())
                    }
                    _ => {}
                },
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                    let area = terminal.area()?;
                    if let Some(index) =
                        tui::pool_slot_at(area, &app.session, mouse.column, mouse.row)
                    {
                        app.on_slot(index);
                    }
                }
                _ => {}
            }
        }

        app.poll();

        if app.should_quit {
            return Ok(());
        }
    }
}

fn apply_overrides(cfg: &mut Config, args: &Args) {
    if args.offline {
        cfg.dictionary = DictionaryKind::Offline;
    }
    if let Some(url) = &args.dictionary_url {
        cfg.dictionary_url = url.clone();
    }
}

fn default_log_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "wordrush").map(|pd| pd.data_local_dir().join("wordrush.log"))
}

/// Log to a file; the terminal belongs to the game.
fn init_logging(path: Option<PathBuf>) {
    let Some(path) = path else {
        return;
    };
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config_file() {
        let args = Args::parse_from([
            "wordrush",
            "--offline",
            "--dictionary-url",
            "http://localhost:9000/entries",
        ]);
        let mut cfg = Config::default();
        apply_overrides(&mut cfg, &args);
        assert_eq!(cfg.dictionary, DictionaryKind::Offline);
        assert_eq!(cfg.dictionary_url, "http://localhost:9000/entries");
    }

    #[test]
    fn test_config_file_kept_without_flags() {
        let args = Args::parse_from(["wordrush", "--seed", "9"]);
        let mut cfg = Config {
            dictionary: DictionaryKind::Common,
            ..Config::default()
        };
        apply_overrides(&mut cfg, &args);
        assert_eq!(cfg.dictionary, DictionaryKind::Common);
        assert!(!args.write_config);
        assert_eq!(args.seed, Some(9));
        assert_eq!(cfg.dictionary_url, game::dictionary::DEFAULT_DICTIONARY_URL);
    }

    #[test]
    fn test_write_config_saves_effective_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let args = Args::parse_from([
            "wordrush",
            "--write-config",
            "--offline",
            "--config",
            path.to_str().unwrap(),
        ]);
        assert!(args.write_config);

        let store = FileConfigStore::with_path(&path);
        let mut cfg = store.load().unwrap();
        apply_overrides(&mut cfg, &args);
        store.save(&cfg).unwrap();

        assert_eq!(store.load().unwrap().dictionary, DictionaryKind::Offline);
    }
}
