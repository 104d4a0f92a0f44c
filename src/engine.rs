//! The message-box interpreter.
//!
//! `Engine` owns the stack and the session. Every state change goes through
//! one of its methods: `execute` for typed lines, and a few direct entry
//! points for the presentation layer (field editing, script editing,
//! property changes). Nothing here renders; callers re-read the observable
//! state after each call.
//!
//! Failures never escape as errors. A command that is understood but can't
//! be carried out reports through `result` and the response text.

use tracing::{debug, info, warn};

use crate::ast::{Command, NavRequest};
use crate::error::{CommandError, CommandResult};
use crate::eval::Evaluator;
use crate::nav::{resolve_target, RecentCards};
use crate::parser::parse_command;
use crate::session::{CommandHistory, EventKind, MessageLog, Session, Variables};
use crate::snapshot::Snapshot;
use crate::stack::{Card, Field, Stack, StackProperty};
use crate::store::KeyValueStore;

pub struct Engine {
    stack: Stack,
    session: Session,
    store: Option<Box<dyn KeyValueStore>>,
    revision: u64,
}

impl Engine {
    /// Start on the first card. `stack` must satisfy `Stack::validate`.
    pub fn new(stack: Stack) -> Self {
        let mut session = Session::new();
        session.current_field_name = stack
            .cards
            .first()
            .and_then(|c| c.fields.first())
            .map(|f| f.name.clone());
        Self {
            stack,
            session,
            store: None,
            revision: 0,
        }
    }

    /// Restore any saved state from `store` and keep saving to it after
    /// every command.
    pub fn with_store(stack: Stack, store: Box<dyn KeyValueStore>) -> Self {
        let mut engine = Self::new(stack);
        if let Some(snapshot) = Snapshot::load(store.as_ref()) {
            debug!("restoring saved state");
            snapshot.apply(&mut engine.stack, &mut engine.session);
        }
        engine.store = Some(store);
        engine
    }

    // ── observable state ────────────────────────────────────────────

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_card_index(&self) -> usize {
        self.session.current_card_index
    }

    pub fn current_card(&self) -> &Card {
        &self.stack.cards[self.session.current_card_index]
    }

    /// The field of interest, falling back to the card's first field when
    /// the pointer is unset or names a field this card doesn't have.
    pub fn current_field(&self) -> Option<&Field> {
        let card = self.current_card();
        self.session
            .current_field_name
            .as_deref()
            .and_then(|name| card.field(name))
            .or_else(|| card.fields.first())
    }

    pub fn recent_cards(&self) -> &RecentCards {
        &self.session.recent_cards
    }

    pub fn message_log(&self) -> &MessageLog {
        &self.session.message_log
    }

    pub fn variables(&self) -> &Variables {
        &self.session.variables
    }

    pub fn history(&self) -> &CommandHistory {
        &self.session.history
    }

    /// Bumped on every observable change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ── message box ─────────────────────────────────────────────────

    /// Run one line of input and return the response text.
    pub fn execute(&mut self, line: &str) -> String {
        self.log(EventKind::Command, line);
        let command = parse_command(line);
        debug!(?command, "classified message box line");
        if !matches!(command, Command::Empty) {
            self.session.history.push(line);
        }

        let response = match command {
            // Blank input is logged only; no history, no save.
            Command::Empty => return String::new(),
            Command::Beep => {
                self.session.variables.clear();
                "🔔 (beep)".to_string()
            }
            Command::Go(request) => match self.navigate(&request) {
                Ok(_) => format!("→ went to {}", request.describe()),
                Err(e) => self.fail(e),
            },
            Command::UnknownGo(line) => format!("Unknown navigation: {line}"),
            Command::Put { expr, field } => self.exec_put(&expr, &field),
            Command::Get { field } => self.exec_get(&field),
            Command::Answer { expr } => {
                let value = self.evaluate(&expr);
                self.set_variables("OK", "");
                format!("answer \"{value}\" (simulated)")
            }
            Command::Find { expr } => self.exec_find(&expr),
            Command::Send(line) => {
                self.set_variables("", &line);
                format!("sent line: {line}")
            }
        };

        self.save();
        response
    }

    /// Resolve an expression against the current card and variables.
    pub fn evaluate(&self, expr: &str) -> String {
        Evaluator::new(&self.stack, &self.session).evaluate(expr)
    }

    fn exec_put(&mut self, expr: &str, field: &str) -> String {
        let value = self.evaluate(expr);
        let index = self.session.current_card_index;
        match self.write_field(index, field, &value) {
            Ok(()) => {
                self.set_variables(&value, "");
                value
            }
            Err(e) => self.fail(e),
        }
    }

    fn exec_get(&mut self, field: &str) -> String {
        let text = self
            .current_card()
            .field(field)
            .map(|f| f.text.clone())
            .unwrap_or_default();
        self.set_variables(&text, "");
        text
    }

    /// First card in stack order with a field containing the query wins.
    /// An empty query is a substring of every field, so it lands on the
    /// first card that has one.
    fn exec_find(&mut self, expr: &str) -> String {
        let query = self.evaluate(expr);
        let needle = query.to_lowercase();
        let hit = self
            .stack
            .cards
            .iter()
            .enumerate()
            .find_map(|(idx, card)| card.search(&needle).map(|f| (idx, f.name.clone())));

        let Some((index, field_name)) = hit else {
            self.log(EventKind::Find, format!("\"{query}\" not found"));
            return self.fail(CommandError::SearchFailed(query));
        };

        self.log(EventKind::Find, format!("\"{query}\" in field \"{field_name}\""));
        self.apply_navigation(index);
        self.session.current_field_name = Some(field_name);
        self.set_variables(&query, "");
        format!("Found \"{query}\" on card {}", index + 1)
    }

    /// Report a failed command: store it in `result`, return the message.
    fn fail(&mut self, error: CommandError) -> String {
        debug!(%error, "command failed");
        self.session.variables.result = error.result_text();
        self.touch();
        error.to_string()
    }

    fn set_variables(&mut self, it: &str, result: &str) {
        self.session.variables.it = it.to_string();
        self.session.variables.result = result.to_string();
        self.touch();
    }

    // ── navigation ──────────────────────────────────────────────────

    /// Resolve and apply a navigation request. Returns the new index.
    pub fn navigate(&mut self, request: &NavRequest) -> CommandResult<usize> {
        let target = resolve_target(
            request,
            &self.stack,
            self.session.current_card_index,
            &mut self.session.recent_cards,
        );
        // `go recent` may have consumed an entry even on failure.
        self.touch();
        let target = target?;
        self.apply_navigation(target);
        Ok(target)
    }

    /// Move to `target`. Returns `false` (and changes nothing) when it is
    /// already the current card or out of range.
    pub fn apply_navigation(&mut self, target: usize) -> bool {
        let current = self.session.current_card_index;
        if target == current || target >= self.stack.card_count() {
            return false;
        }

        let old = &self.stack.cards[current];
        let (old_id, old_name) = (old.id, old.name.clone());
        self.session.recent_cards.push(old_id);
        self.log(EventKind::CloseCard, format!("card \"{old_name}\""));

        self.session.current_card_index = target;
        let new = &self.stack.cards[target];
        let new_name = new.name.clone();
        self.session.current_field_name = new.fields.first().map(|f| f.name.clone());
        self.log(EventKind::OpenCard, format!("card \"{new_name}\""));
        self.session.variables.clear();

        info!(from = %old_name, to = %new_name, "moved to card {}", target + 1);
        true
    }

    // ── direct edits ────────────────────────────────────────────────

    fn write_field(&mut self, card_index: usize, field: &str, text: &str) -> CommandResult<()> {
        if self.stack.cant_modify {
            return Err(CommandError::StackLocked);
        }
        if !self.stack.set_field_text(card_index, field, text) {
            return Err(CommandError::NoSuchField(field.to_string()));
        }
        info!(field, "field text set");
        self.log(EventKind::SetField, format!("field \"{field}\""));
        Ok(())
    }

    /// Make a field on the current card the field of interest.
    pub fn open_field(&mut self, name: &str) -> bool {
        let Some(field) = self.current_card().field(name) else {
            return false;
        };
        let name = field.name.clone();
        self.log(EventKind::OpenField, format!("field \"{name}\""));
        self.session.current_field_name = Some(name);
        true
    }

    pub fn close_field(&mut self) -> bool {
        let Some(name) = self.current_field().map(|f| f.name.clone()) else {
            return false;
        };
        self.log(EventKind::CloseField, format!("field \"{name}\""));
        true
    }

    /// Typing straight into a field on the current card.
    pub fn edit_field(&mut self, name: &str, text: &str) -> bool {
        let index = self.session.current_card_index;
        match self.write_field(index, name, text) {
            Ok(()) => {
                self.save();
                true
            }
            Err(e) => {
                debug!(%e, "direct edit refused");
                false
            }
        }
    }

    pub fn set_button_script(&mut self, button_id: u32, script: &str) -> bool {
        if self.stack.set_button_script(button_id, script).is_none() {
            return false;
        }
        self.log(EventKind::ScriptEdited, format!("button id {button_id}"));
        true
    }

    /// Accepts 1 through 5; anything else is ignored.
    pub fn set_user_level(&mut self, level: u8) -> bool {
        let property = StackProperty::UserLevel(level);
        if !property.is_valid() {
            warn!(level, "ignoring out-of-range userLevel");
            return false;
        }
        self.stack.set_stack_property(property);
        self.log(EventKind::UserLevelChanged, level.to_string());
        self.save();
        true
    }

    /// Range-checked stack property write.
    pub fn set_stack_property(&mut self, property: StackProperty) -> bool {
        if let StackProperty::UserLevel(level) = property {
            return self.set_user_level(level);
        }
        if !property.is_valid() {
            warn!(property = property.name(), "ignoring out-of-range property");
            return false;
        }
        let name = property.name();
        self.stack.set_stack_property(property);
        self.log(EventKind::SetProperty, name);
        self.save();
        true
    }

    pub fn rename_card(&mut self, name: &str) -> bool {
        let index = self.session.current_card_index;
        if !self.stack.set_card_name(index, name) {
            return false;
        }
        self.log(EventKind::SetProperty, format!("name of card {}", index + 1));
        self.save();
        true
    }

    // ── bookkeeping ─────────────────────────────────────────────────

    fn log(&mut self, name: EventKind, detail: impl Into<String>) {
        self.session.log(name, detail);
        self.touch();
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Write a snapshot to the attached store, if any.
    pub fn save(&mut self) {
        if let Some(store) = self.store.as_mut() {
            Snapshot::capture(&self.stack, &self.session).save(store.as_mut());
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Stack::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(engine: &Engine) -> Vec<&'static str> {
        engine
            .message_log()
            .iter()
            .map(|e| e.name.as_str())
            .collect()
    }

    #[test]
    fn starts_on_first_card_and_field() {
        let engine = Engine::default();
        assert_eq!(engine.current_card_index(), 0);
        assert_eq!(
            engine.session().current_field_name.as_deref(),
            Some("Title")
        );
        assert!(engine.message_log().is_empty());
    }

    #[test]
    fn blank_line_only_logs() {
        let mut engine = Engine::default();
        engine.session.variables.it = "kept".into();
        assert_eq!(engine.execute("   "), "");
        assert_eq!(engine.variables().it, "kept");
        assert_eq!(events(&engine), ["command"]);
        assert!(engine.history().entries().is_empty());
    }

    #[test]
    fn move_logs_close_then_open() {
        let mut engine = Engine::default();
        engine.execute("go last");
        assert_eq!(events(&engine), ["command", "closeCard", "openCard"]);
        assert_eq!(
            engine.message_log().last().map(|e| e.detail.as_str()),
            Some("card \"Index\"")
        );
    }

    #[test]
    fn moving_to_current_card_is_a_no_op() {
        let mut engine = Engine::default();
        engine.session.variables.it = "x".into();
        assert_eq!(engine.execute("go first"), "→ went to first card");
        assert_eq!(engine.variables().it, "x");
        assert!(engine.recent_cards().is_empty());
        assert_eq!(events(&engine), ["command"]);
    }

    #[test]
    fn move_resets_field_pointer() {
        let mut engine = Engine::default();
        assert!(engine.open_field("body"));
        assert_eq!(engine.session().current_field_name.as_deref(), Some("Body"));
        engine.execute("go next");
        assert_eq!(
            engine.session().current_field_name.as_deref(),
            Some("Title")
        );
    }

    #[test]
    fn stale_field_pointer_falls_back() {
        let mut engine = Engine::default();
        engine.session.current_field_name = Some("Gone".into());
        assert_eq!(engine.current_field().map(|f| f.id), Some(201));
    }

    #[test]
    fn unknown_navigation_leaves_result() {
        let mut engine = Engine::default();
        engine.session.variables.result = "before".into();
        assert_eq!(
            engine.execute("go  sideways"),
            "Unknown navigation: go  sideways"
        );
        assert_eq!(engine.variables().result, "before");
    }

    #[test]
    fn locked_stack_refuses_put_and_edit() {
        let mut engine = Engine::default();
        assert!(engine.set_stack_property(StackProperty::CantModify(true)));
        assert_eq!(
            engine.execute(r#"put "x" into field "Body""#),
            "Can't modify this stack"
        );
        assert_eq!(engine.variables().result, "Can't modify this stack");
        assert!(!engine.edit_field("Body", "y"));
        assert_eq!(
            engine.current_card().field("Body").map(|f| f.text.as_str()),
            Some("Type commands into the message box.")
        );
    }

    #[test]
    fn direct_edits_log_events() {
        let mut engine = Engine::default();
        assert!(engine.open_field("Body"));
        assert!(engine.edit_field("Body", "typed"));
        assert!(engine.close_field());
        assert!(engine.set_button_script(301, "on mouseUp\n  beep\nend mouseUp"));
        assert!(engine.set_user_level(2));
        assert!(!engine.set_user_level(6));
        assert!(!engine.set_stack_property(StackProperty::ScriptTextSize(0)));
        assert!(engine.set_stack_property(StackProperty::ScriptTextFont("Courier".into())));
        assert!(engine.rename_card("Start"));
        assert_eq!(
            events(&engine),
            [
                "openField",
                "setField",
                "closeField",
                "scriptEdited",
                "userLevelChanged",
                "setProperty",
                "setProperty",
            ]
        );
        assert_eq!(engine.stack().user_level, 2);
        assert_eq!(engine.stack().script_text_size, 9);
        assert_eq!(engine.current_card().name, "Start");
    }

    #[test]
    fn set_stack_property_routes_user_level() {
        let mut engine = Engine::default();
        assert!(engine.set_stack_property(StackProperty::UserLevel(1)));
        assert_eq!(events(&engine), ["userLevelChanged"]);
    }

    #[test]
    fn revision_advances_on_change() {
        let mut engine = Engine::default();
        let before = engine.revision();
        engine.execute("go next");
        assert!(engine.revision() > before);
        let before = engine.revision();
        let _ = engine.current_card();
        assert_eq!(engine.revision(), before);
    }

    #[test]
    fn find_moves_and_points_at_field() {
        let mut engine = Engine::default();
        assert_eq!(engine.execute(r#"find "NOTES, index""#), "Found \"NOTES, index\" on card 3");
        assert_eq!(engine.current_card_index(), 2);
        assert_eq!(engine.session().current_field_name.as_deref(), Some("Body"));
        assert_eq!(engine.variables().it, "NOTES, index");
        assert_eq!(engine.variables().result, "");
        assert_eq!(engine.recent_cards().iter().collect::<Vec<_>>(), [101]);
    }

    #[test]
    fn empty_find_lands_on_first_card_with_a_field() {
        let mut engine = Engine::default();
        engine.execute("go last");
        assert_eq!(engine.execute(r#"find """#), "Found \"\" on card 1");
        assert_eq!(engine.current_card_index(), 0);
        assert_eq!(engine.session().current_field_name.as_deref(), Some("Title"));
        assert_eq!(engine.variables().it, "");
        assert_eq!(engine.variables().result, "");

        assert_eq!(engine.execute(r#"find """#), "Found \"\" on card 1");
        assert_eq!(engine.current_card_index(), 0);
    }

    #[test]
    fn blank_line_skips_history_and_save() {
        let mut engine = Engine::default();
        assert_eq!(engine.execute("   "), "");
        assert!(engine.history().entries().is_empty());
        assert_eq!(events(&engine), ["command"]);
    }

    #[test]
    fn unterminated_quote_still_answers() {
        let mut engine = Engine::default();
        assert_eq!(engine.execute(r#"answer "oops"#), r#"answer ""oops" (simulated)"#);
        assert_eq!(engine.variables().it, "OK");
        assert_eq!(
            engine.execute(r#"get field "Body"#),
            r#"sent line: get field "Body"#
        );
    }
}
