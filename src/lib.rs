pub mod config;
pub mod controller;
pub mod history;
pub mod logging;
pub mod model;
pub mod pagination;
pub mod search;
pub mod storage;
pub mod ui;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use once_cell::sync::Lazy;

use config::AppConfig;
use controller::Controller;
use history::HistoryManager;
use search::WikiClient;
use storage::prefs::{FileStore, PreferenceStore};
use ui::components::theme::{ThemePreference, system_prefers_dark};

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "wikisearch",
    version,
    long_version = LONG_VERSION.as_str(),
    about = "Search Wikipedia from the terminal"
)]
pub struct Cli {
    /// Directory holding saved preferences and history (defaults to platform data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Debug-level logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one search and print a page of results
    Search {
        /// Search term (multiple words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        term: Vec<String>,

        /// Page to show (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or edit search history
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,

        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or change the color theme
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
    /// Interactive search shell
    Shell {
        /// Search run on startup
        #[arg(long, default_value = "India")]
        initial: String,

        /// Start without an initial search
        #[arg(long)]
        no_initial: bool,
    },
    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate man page to stdout
    Man,
}

#[derive(Subcommand, Debug, Clone)]
pub enum HistoryAction {
    /// List entries, newest first
    List,
    /// Remove one entry (exact match)
    Remove {
        #[arg(required = true, num_args = 1..)]
        term: Vec<String>,
    },
    /// Remove all entries
    Clear,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ThemeAction {
    /// Print the active theme
    Show,
    /// Switch between dark and light
    Toggle,
    /// Use the dark theme
    Dark,
    /// Use the light theme
    Light,
}

static LONG_VERSION: Lazy<String> = Lazy::new(|| match option_env!("VERGEN_BUILD_DATE") {
    Some(date) => format!("{} (built {date})", env!("CARGO_PKG_VERSION")),
    None => env!("CARGO_PKG_VERSION").to_string(),
});

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init_subscriber(
        logging::Verbosity::from_flags(cli.verbose, cli.quiet),
        cli.no_color,
    );
    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    let config = AppConfig::from_env().with_data_dir(cli.data_dir);

    match cli.command {
        Commands::Search { term, page, json } => {
            run_search(&config, &term.join(" "), page, json).await
        }
        Commands::History { action, json } => {
            run_history(&config, action.unwrap_or(HistoryAction::List), json)
        }
        Commands::Theme { action } => run_theme(&config, action.unwrap_or(ThemeAction::Show)),
        Commands::Shell {
            initial,
            no_initial,
        } => {
            let mut ctl = open_controller(&config)?;
            let initial = (!no_initial).then_some(initial.as_str());
            ui::shell::run_shell(&mut ctl, initial).await
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "wikisearch", &mut std::io::stdout());
            Ok(())
        }
        Commands::Man => {
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            let mut out = std::io::stdout();
            man.render(&mut out)?;
            Ok(())
        }
    }
}

fn open_store(config: &AppConfig) -> Arc<dyn PreferenceStore> {
    let store = FileStore::in_dir(&config.data_dir);
    tracing::debug!(path = %store.path().display(), "opened preference store");
    Arc::new(store)
}

fn open_controller(config: &AppConfig) -> Result<Controller<WikiClient>> {
    let client = WikiClient::new(config).context("building http client")?;
    Ok(Controller::new(
        client,
        open_store(config),
        config,
        system_prefers_dark(),
    ))
}

async fn run_search(config: &AppConfig, term: &str, page: usize, json: bool) -> Result<()> {
    let mut ctl = open_controller(config)?;
    if !ctl.run_query(term).await {
        anyhow::bail!("search term is empty");
    }
    ctl.set_page(page);

    let mut out = std::io::stdout();
    if json {
        let snap = ctl.snapshot();
        serde_json::to_writer_pretty(&mut out, &snap).context("writing JSON output")?;
        writeln!(out)?;
    } else {
        ui::render::render_results(&mut out, &ctl.snapshot(), &ctl.theme().palette())?;
    }
    Ok(())
}

fn run_history(config: &AppConfig, action: HistoryAction, json: bool) -> Result<()> {
    let store = open_store(config);
    let palette = ThemePreference::load(Arc::clone(&store), system_prefers_dark()).palette();
    let mut history = HistoryManager::load(store);
    let mut out = std::io::stdout();

    match action {
        HistoryAction::List => {
            if json {
                serde_json::to_writer_pretty(&mut out, history.entries())
                    .context("writing JSON output")?;
                writeln!(out)?;
            } else {
                ui::render::render_history(&mut out, history.entries(), &palette)?;
            }
        }
        HistoryAction::Remove { term } => {
            let term = term.join(" ");
            if history.remove(&term) {
                writeln!(out, "{}", palette.ok(&format!("Removed \"{term}\" from history.")))?;
            } else {
                writeln!(out, "{}", palette.hint(&format!("\"{term}\" is not in history.")))?;
            }
        }
        HistoryAction::Clear => {
            history.clear();
            writeln!(out, "{}", palette.ok("History cleared."))?;
        }
    }
    Ok(())
}

fn run_theme(config: &AppConfig, action: ThemeAction) -> Result<()> {
    let mut theme = ThemePreference::load(open_store(config), system_prefers_dark());
    match action {
        ThemeAction::Show => {}
        ThemeAction::Toggle => {
            theme.toggle();
        }
        ThemeAction::Dark => theme.set_dark(true),
        ThemeAction::Light => theme.set_dark(false),
    }
    let palette = theme.palette();
    let source = if theme.is_explicit() { "saved" } else { "system default" };
    println!(
        "{} {}",
        palette.title(theme.mode().name()),
        palette.hint(&format!("({source})"))
    );
    Ok(())
}

pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("org", "wikisearch", "wikisearch").map_or_else(
        || PathBuf::from(".wikisearch"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}
