//! Per-engine session state — the card pointer, `it`/`result`, the
//! message log and the command history.
//!
//! Everything here is created empty when the engine starts and mutated by
//! the engine only; presentation code reads it back after each command.

use std::collections::VecDeque;
use std::fmt;

use crate::nav::RecentCards;

/// Maximum number of entries kept in the message log.
pub const MAX_LOG: usize = 40;

/// The two pseudo-variables every command may update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    pub it: String,
    pub result: String,
}

impl Variables {
    pub fn clear(&mut self) {
        self.it.clear();
        self.result.clear();
    }
}

/// Lifecycle events recorded in the message log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    OpenCard,
    CloseCard,
    SetField,
    OpenField,
    CloseField,
    Find,
    ScriptEdited,
    UserLevelChanged,
    SetProperty,
    Command,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenCard => "openCard",
            Self::CloseCard => "closeCard",
            Self::SetField => "setField",
            Self::OpenField => "openField",
            Self::CloseField => "closeField",
            Self::Find => "find",
            Self::ScriptEdited => "scriptEdited",
            Self::UserLevelChanged => "userLevelChanged",
            Self::SetProperty => "setProperty",
            Self::Command => "command",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub name: EventKind,
    pub detail: String,
}

/// Bounded audit trail; the oldest entry is evicted first.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: VecDeque<LogEntry>,
}

impl MessageLog {
    pub fn push(&mut self, name: EventKind, detail: impl Into<String>) {
        if self.entries.len() == MAX_LOG {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            name,
            detail: detail.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// The newest `n` entries, oldest first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }
}

/// Raw input lines, oldest first. Append-only; line editors keep their
/// own recall cursor over it.
#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
    entries: Vec<String>,
}

impl CommandHistory {
    pub fn push(&mut self, line: &str) {
        self.entries.push(line.to_string());
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// 1-based, as numbered by a history listing.
    pub fn get(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|idx| self.entries.get(idx))
            .map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub current_card_index: usize,
    /// Best-effort pointer; may name a field that no longer exists.
    pub current_field_name: Option<String>,
    pub recent_cards: RecentCards,
    pub message_log: MessageLog,
    pub history: CommandHistory,
    pub variables: Variables,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, name: EventKind, detail: impl Into<String>) {
        self.message_log.push(name, detail);
    }
}
