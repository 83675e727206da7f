//! Plain-terminal rendering of controller state.

use std::io::{self, Write};

use chrono::{DateTime, Local};

use crate::controller::{SearchPhase, StateSnapshot};
use crate::model::types::HistoryEntry;
use crate::pagination::PageItem;
use crate::ui::components::theme::ThemePalette;
use crate::ui::shortcuts as keys;

/// History entries shown inline under the results.
pub const RECENT_LIMIT: usize = 3;

/// Local wall-clock rendering of a unix-millis timestamp.
pub fn format_ts(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}

/// Page selector line, current page in brackets.
pub fn page_list_line(items: &[PageItem], current: usize) -> String {
    items
        .iter()
        .map(|item| match item {
            PageItem::Page(p) if *p == current => format!("[{p}]"),
            PageItem::Page(p) => p.to_string(),
            PageItem::Ellipsis => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_results<W: Write>(
    out: &mut W,
    snap: &StateSnapshot,
    palette: &ThemePalette,
) -> io::Result<()> {
    if snap.phase == SearchPhase::Searching {
        writeln!(out, "{}", palette.hint(&format!("Searching for \"{}\"…", snap.query)))?;
        return Ok(());
    }

    // Failed and empty searches look the same on purpose.
    if snap.total_results == 0 {
        writeln!(
            out,
            "{}",
            palette.hint(&format!("No results found for \"{}\".", snap.query))
        )?;
        return render_suggestion(out, snap.suggestion.as_deref(), palette);
    }

    writeln!(
        out,
        "{} {}",
        palette.title(&format!("Results for \"{}\"", snap.query)),
        palette.hint(&format!(
            "({} results · page {}/{})",
            snap.total_results, snap.page.current_page, snap.page.total_pages
        ))
    )?;
    writeln!(out)?;

    let offset = (snap.page.current_page - 1) * snap.page_size;
    for (i, hit) in snap.results.iter().enumerate() {
        writeln!(out, "{:>3}. {}", offset + i + 1, palette.title(&hit.title))?;
        if !hit.snippet.is_empty() {
            writeln!(out, "     {}", palette.body(&hit.snippet))?;
        }
        writeln!(out, "     {}", palette.link(&hit.url))?;
    }

    if snap.page.total_pages > 1 {
        writeln!(out)?;
        writeln!(
            out,
            "{} {}",
            palette.hint("Pages:"),
            page_list_line(&snap.pages, snap.page.current_page)
        )?;
    }
    render_suggestion(out, snap.suggestion.as_deref(), palette)
}

pub fn render_suggestion<W: Write>(
    out: &mut W,
    suggestion: Option<&str>,
    palette: &ThemePalette,
) -> io::Result<()> {
    if let Some(s) = suggestion {
        writeln!(out, "{} {}?", palette.hint("Did you mean"), palette.suggestion(s))?;
    }
    Ok(())
}

/// One-line strip of the newest searches, numbered for `:h N`. Points at the
/// full list when there is more history than fits.
pub fn render_recent<W: Write>(
    out: &mut W,
    entries: &[HistoryEntry],
    palette: &ThemePalette,
) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "{}", palette.hint("No history yet."));
    }
    let strip = entries
        .iter()
        .take(RECENT_LIMIT)
        .enumerate()
        .map(|(i, entry)| format!("{}. {}", i + 1, palette.body(&entry.term)))
        .collect::<Vec<_>>()
        .join("   ");
    write!(out, "{} {strip}", palette.hint("Recent:"))?;
    if entries.len() > RECENT_LIMIT {
        write!(
            out,
            "   {}",
            palette.hint(&format!("({} to view all {})", keys::HISTORY, entries.len()))
        )?;
    }
    writeln!(out)
}

pub fn render_history<W: Write>(
    out: &mut W,
    entries: &[HistoryEntry],
    palette: &ThemePalette,
) -> io::Result<()> {
    if entries.is_empty() {
        writeln!(out, "{}", palette.hint("No search history yet."))?;
        return Ok(());
    }
    writeln!(out, "{}", palette.title("Search history"))?;
    for (i, entry) in entries.iter().enumerate() {
        writeln!(
            out,
            "{:>3}. {}  {}",
            i + 1,
            palette.body(&entry.term),
            palette.hint(&format_ts(entry.timestamp))
        )?;
    }
    Ok(())
}
