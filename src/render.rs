//! Plain-text views over the engine's observable state.
//!
//! These only read; a presentation layer calls them after `execute` to
//! redraw whatever changed.

use std::fmt::Write;

use crate::engine::Engine;
use crate::session::LogEntry;

/// Entries shown in the event stream.
pub const EVENT_STREAM_LEN: usize = 6;
/// Entries shown in the message watcher.
pub const WATCHER_LEN: usize = 12;

/// The current card: header, fields, buttons.
pub fn card_view(engine: &Engine) -> String {
    let stack = engine.stack();
    let card = engine.current_card();
    let background = stack
        .background(card.background_id)
        .map_or("?", |b| b.name.as_str());
    let focused = engine.current_field().map(|f| f.id);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "── {} ── card {} of {}: \"{}\" (bg \"{}\")",
        stack.name,
        engine.current_card_index() + 1,
        stack.card_count(),
        card.name,
        background
    );
    for field in &card.fields {
        let marker = if Some(field.id) == focused { '>' } else { ' ' };
        let lock = if field.lock_text { " [locked]" } else { "" };
        let _ = writeln!(out, "{marker} {}{lock}: {}", field.name, field.text);
    }
    if !card.buttons.is_empty() {
        let names: Vec<String> = card.buttons.iter().map(|b| format!("[{}]", b.name)).collect();
        let _ = writeln!(out, "  {}", names.join(" "));
    }
    out
}

fn format_entry(out: &mut String, entry: &LogEntry) {
    let _ = writeln!(out, "{:<17} {}", entry.name.as_str(), entry.detail);
}

/// The newest few log entries.
pub fn event_stream(engine: &Engine) -> String {
    let mut out = String::new();
    for entry in engine.message_log().tail(EVENT_STREAM_LEN) {
        format_entry(&mut out, entry);
    }
    out
}

/// A longer log tail plus the two variables.
pub fn watcher(engine: &Engine) -> String {
    let mut out = String::new();
    for entry in engine.message_log().tail(WATCHER_LEN) {
        format_entry(&mut out, entry);
    }
    let vars = engine.variables();
    let _ = writeln!(out, "it     = \"{}\"", vars.it);
    let _ = writeln!(out, "result = \"{}\"", vars.result);
    out
}

/// Recent cards, most recent first, by name where the card still exists.
pub fn recent_view(engine: &Engine) -> String {
    let stack = engine.stack();
    let names: Vec<String> = engine
        .recent_cards()
        .iter()
        .map(|id| match stack.card_index_by_id(id) {
            Some(idx) => format!("\"{}\"", stack.cards[idx].name),
            None => format!("#{id}"),
        })
        .collect();
    if names.is_empty() {
        "(no recent cards)".to_string()
    } else {
        names.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_view_marks_focused_field() {
        let engine = Engine::default();
        let view = card_view(&engine);
        assert!(view.starts_with("── Home Stack ── card 1 of 3: \"Home\""));
        assert!(view.contains("> Title: Welcome"));
        assert!(view.contains("  Body: Type commands"));
        assert!(view.contains("[Next]"));
    }

    #[test]
    fn event_stream_shows_tail_only() {
        let mut engine = Engine::default();
        for _ in 0..4 {
            engine.execute("go next");
        }
        let stream = event_stream(&engine);
        assert_eq!(stream.lines().count(), EVENT_STREAM_LEN);
        assert!(stream.lines().last().unwrap().starts_with("openCard"));
    }

    #[test]
    fn watcher_includes_variables() {
        let mut engine = Engine::default();
        engine.execute("hello");
        let view = watcher(&engine);
        assert!(view.contains("command"));
        assert!(view.contains("result = \"hello\""));
        assert!(view.contains("it     = \"\""));
    }

    #[test]
    fn recent_view_names_cards() {
        let mut engine = Engine::default();
        assert_eq!(recent_view(&engine), "(no recent cards)");
        engine.execute("go next");
        engine.execute("go next");
        assert_eq!(recent_view(&engine), "\"Notes\", \"Home\"");
    }
}
