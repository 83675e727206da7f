//! Shell command words, kept in one place so help text and parsing agree.

pub const HELP: &str = ":help";
pub const QUIT: &str = ":q";
pub const NEXT_PAGE: &str = ":n";
pub const PREV_PAGE: &str = ":p";
pub const GOTO_PAGE: &str = ":page";
pub const ACCEPT_SUGGESTION: &str = ":s";
pub const OPEN: &str = ":open";

// History
pub const HISTORY: &str = ":history";
pub const HISTORY_RUN: &str = ":h";
pub const HISTORY_DELETE: &str = ":del";
pub const HISTORY_CLEAR: &str = ":clear";
pub const HISTORY_CLOSE: &str = ":close";

pub const THEME: &str = ":theme";
