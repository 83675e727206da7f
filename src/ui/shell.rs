//! Line-oriented interactive shell over the controller.
//!
//! Plain text searches; words starting with `:` are commands (see
//! [`super::shortcuts`]). Suggestions are fetched in the background after a
//! low-yield search and printed when they arrive, without blocking input.

use std::io::{self, Write};

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::{JoinError, JoinHandle};
use tracing::debug;

use crate::controller::{Controller, SearchTicket};
use crate::search::SearchBackend;
use crate::ui::render;
use crate::ui::shortcuts as keys;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Search(String),
    NextPage,
    PrevPage,
    GotoPage(usize),
    AcceptSuggestion,
    /// Open result by its displayed number.
    Open(usize),
    ShowHistory,
    /// Re-run history entry by its displayed number.
    RunHistory(usize),
    DeleteHistory(String),
    ClearHistory,
    CloseHistory,
    ToggleTheme,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

pub fn parse_command(line: &str) -> ShellCommand {
    let line = line.trim();
    if line.is_empty() {
        return ShellCommand::Empty;
    }
    if !line.starts_with(':') {
        return ShellCommand::Search(line.to_string());
    }

    let (word, arg) = match line.split_once(char::is_whitespace) {
        Some((w, rest)) => (w, rest.trim()),
        None => (line, ""),
    };
    let number = |what: &str| match arg.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(ShellCommand::Invalid(format!("{word} expects a {what} number"))),
    };

    let parsed = match word {
        keys::QUIT | ":quit" => Ok(ShellCommand::Quit),
        keys::HELP => Ok(ShellCommand::Help),
        keys::NEXT_PAGE => Ok(ShellCommand::NextPage),
        keys::PREV_PAGE => Ok(ShellCommand::PrevPage),
        keys::GOTO_PAGE => number("page").map(ShellCommand::GotoPage),
        keys::ACCEPT_SUGGESTION => Ok(ShellCommand::AcceptSuggestion),
        keys::OPEN => number("result").map(ShellCommand::Open),
        keys::HISTORY => Ok(ShellCommand::ShowHistory),
        keys::HISTORY_RUN => number("history").map(ShellCommand::RunHistory),
        keys::HISTORY_DELETE if !arg.is_empty() => {
            Ok(ShellCommand::DeleteHistory(arg.to_string()))
        }
        keys::HISTORY_DELETE => Err(ShellCommand::Invalid(format!(
            "{word} expects a search term"
        ))),
        keys::HISTORY_CLEAR => Ok(ShellCommand::ClearHistory),
        keys::HISTORY_CLOSE => Ok(ShellCommand::CloseHistory),
        keys::THEME => Ok(ShellCommand::ToggleTheme),
        other => Err(ShellCommand::Invalid(format!("unknown command {other}"))),
    };
    parsed.unwrap_or_else(|invalid| invalid)
}

pub fn help_lines() -> Vec<String> {
    vec![
        "type text to search Wikipedia".to_string(),
        format!("{} / {}  next / previous page", keys::NEXT_PAGE, keys::PREV_PAGE),
        format!("{} N     jump to page N", keys::GOTO_PAGE),
        format!("{}         search the suggested spelling", keys::ACCEPT_SUGGESTION),
        format!("{} N     open result N in the browser", keys::OPEN),
        format!(
            "{} / {}  show / hide search history",
            keys::HISTORY,
            keys::HISTORY_CLOSE
        ),
        format!("{} N        re-run history entry N", keys::HISTORY_RUN),
        format!("{} TERM   delete a history entry", keys::HISTORY_DELETE),
        format!("{}     clear all history", keys::HISTORY_CLEAR),
        format!("{}     toggle dark/light theme", keys::THEME),
        format!("{}         quit", keys::QUIT),
    ]
}

type PendingSuggestion = JoinHandle<(SearchTicket, Option<String>)>;

enum Event {
    Line(Option<String>),
    Suggestion(Result<(SearchTicket, Option<String>), JoinError>),
}

/// Run the shell until `:q` or end of input. `initial` is searched first.
pub async fn run_shell<B: SearchBackend>(
    ctl: &mut Controller<B>,
    initial: Option<&str>,
) -> Result<()> {
    let mut out = io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Option<PendingSuggestion> = None;

    match initial {
        Some(term) => pending = search(ctl, term, &mut out).await?,
        None => recent(ctl, &mut out)?,
    }

    loop {
        prompt(&mut out)?;
        let event = match pending.as_mut() {
            Some(handle) => tokio::select! {
                joined = handle => Event::Suggestion(joined),
                line = lines.next_line() => Event::Line(line?),
            },
            None => Event::Line(lines.next_line().await?),
        };

        let line = match event {
            Event::Suggestion(joined) => {
                pending = None;
                match joined {
                    Ok((ticket, suggestion)) => {
                        if ctl.apply_suggestion(&ticket, suggestion) {
                            writeln!(out)?;
                            render::render_suggestion(
                                &mut out,
                                ctl.state().suggestion.as_deref(),
                                &ctl.theme().palette(),
                            )?;
                        }
                    }
                    Err(e) => debug!("suggestion task ended early: {e}"),
                }
                continue;
            }
            Event::Line(None) => break,
            Event::Line(Some(line)) => line,
        };

        let palette = ctl.theme().palette();
        match parse_command(&line) {
            ShellCommand::Empty => {}
            ShellCommand::Quit => break,
            ShellCommand::Help => {
                for l in help_lines() {
                    writeln!(out, "  {}", palette.hint(&l))?;
                }
            }
            ShellCommand::Search(term) => {
                cancel(&mut pending);
                pending = search(ctl, &term, &mut out).await?;
            }
            ShellCommand::AcceptSuggestion => match ctl.state().suggestion.clone() {
                Some(term) => {
                    cancel(&mut pending);
                    pending = search(ctl, &term, &mut out).await?;
                }
                None => writeln!(out, "{}", palette.hint("No suggestion to accept."))?,
            },
            ShellCommand::NextPage => {
                if ctl.next_page() {
                    render::render_results(&mut out, &ctl.snapshot(), &palette)?;
                } else {
                    writeln!(out, "{}", palette.hint("Already on the last page."))?;
                }
            }
            ShellCommand::PrevPage => {
                if ctl.prev_page() {
                    render::render_results(&mut out, &ctl.snapshot(), &palette)?;
                } else {
                    writeln!(out, "{}", palette.hint("Already on the first page."))?;
                }
            }
            ShellCommand::GotoPage(page) => {
                ctl.set_page(page);
                render::render_results(&mut out, &ctl.snapshot(), &palette)?;
            }
            ShellCommand::Open(n) => match ctl.state().results.get(n - 1) {
                Some(hit) => {
                    let url = hit.article_url(ctl.article_base());
                    writeln!(out, "{}", palette.link(&url))?;
                    if let Err(e) = open_in_browser(&url) {
                        writeln!(out, "{}", palette.warn(&format!("could not open browser: {e}")))?;
                    }
                }
                None => writeln!(out, "{}", palette.hint(&format!("No result {n}.")))?,
            },
            ShellCommand::ShowHistory => {
                ctl.open_history();
                render::render_history(&mut out, ctl.history().entries(), &palette)?;
            }
            ShellCommand::CloseHistory => ctl.close_history(),
            ShellCommand::RunHistory(n) => match ctl.history().get(n - 1) {
                Some(entry) => {
                    let term = entry.term.clone();
                    cancel(&mut pending);
                    pending = search(ctl, &term, &mut out).await?;
                }
                None => writeln!(out, "{}", palette.hint(&format!("No history entry {n}.")))?,
            },
            ShellCommand::DeleteHistory(term) => {
                if ctl.remove_history(&term) {
                    writeln!(out, "{}", palette.ok(&format!("Removed \"{term}\" from history.")))?;
                    recent(ctl, &mut out)?;
                } else {
                    writeln!(out, "{}", palette.hint(&format!("\"{term}\" is not in history.")))?;
                }
            }
            ShellCommand::ClearHistory => {
                ctl.clear_history();
                writeln!(out, "{}", palette.ok("History cleared."))?;
                recent(ctl, &mut out)?;
            }
            ShellCommand::ToggleTheme => {
                let dark = ctl.toggle_theme();
                let palette = ctl.theme().palette();
                let name = if dark { "dark" } else { "light" };
                writeln!(out, "{}", palette.ok(&format!("Theme: {name}")))?;
            }
            ShellCommand::Invalid(msg) => {
                writeln!(out, "{} (try {})", palette.warn(&msg), keys::HELP)?;
            }
        }
    }

    cancel(&mut pending);
    Ok(())
}

async fn search<B: SearchBackend, W: Write>(
    ctl: &mut Controller<B>,
    term: &str,
    out: &mut W,
) -> Result<Option<PendingSuggestion>> {
    if term.trim().is_empty() {
        return Ok(None);
    }
    let ticket = ctl.submit(term).await;
    render::render_results(out, &ctl.snapshot(), &ctl.theme().palette())?;
    recent(ctl, out)?;
    Ok(ticket.map(|t| ctl.spawn_suggestion(t)))
}

fn recent<B: SearchBackend, W: Write>(ctl: &Controller<B>, out: &mut W) -> io::Result<()> {
    render::render_recent(out, ctl.history().entries(), &ctl.theme().palette())
}

fn cancel(pending: &mut Option<PendingSuggestion>) {
    if let Some(handle) = pending.take() {
        handle.abort();
    }
}

fn prompt<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "wiki> ")?;
    out.flush()
}

/// Open a URL in the system's default browser.
pub fn open_in_browser(url: &str) -> io::Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", url])
            .spawn()?;
    }
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }
    Ok(())
}
