//! Saved session state — what survives a restart.
//!
//! A snapshot carries only the mutable parts: stack properties, the card
//! pointer, card names and field text. Restoring merges by id into a
//! freshly built stack; ids the stack doesn't know are skipped, and
//! out-of-range values are dropped one by one instead of rejecting the
//! whole snapshot.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::session::Session;
use crate::stack::{Stack, StackProperty};
use crate::store::KeyValueStore;

/// Store key the snapshot lives under.
pub const SNAPSHOT_KEY: &str = "cardstack.snapshot";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub user_level: u8,
    pub script_text_font: String,
    pub script_text_size: u32,
    pub current_card_index: usize,
    pub current_field_name: Option<String>,
    pub cards: Vec<CardSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSnapshot {
    pub id: u32,
    pub name: String,
    pub fields: Vec<FieldSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub id: u32,
    pub text: String,
}

impl Snapshot {
    pub fn capture(stack: &Stack, session: &Session) -> Self {
        Self {
            user_level: stack.user_level,
            script_text_font: stack.script_text_font.clone(),
            script_text_size: stack.script_text_size,
            current_card_index: session.current_card_index,
            current_field_name: session.current_field_name.clone(),
            cards: stack
                .cards
                .iter()
                .map(|card| CardSnapshot {
                    id: card.id,
                    name: card.name.clone(),
                    fields: card
                        .fields
                        .iter()
                        .map(|f| FieldSnapshot {
                            id: f.id,
                            text: f.text.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Merge into `stack` and `session`.
    pub fn apply(self, stack: &mut Stack, session: &mut Session) {
        for property in [
            StackProperty::UserLevel(self.user_level),
            StackProperty::ScriptTextFont(self.script_text_font),
            StackProperty::ScriptTextSize(self.script_text_size),
        ] {
            if property.is_valid() {
                stack.set_stack_property(property);
            } else {
                debug!(property = property.name(), "ignoring out-of-range snapshot value");
            }
        }

        for saved in self.cards {
            let Some(card) = stack.cards.iter_mut().find(|c| c.id == saved.id) else {
                continue;
            };
            card.name = saved.name;
            for saved_field in saved.fields {
                if let Some(field) = card.fields.iter_mut().find(|f| f.id == saved_field.id) {
                    field.text = saved_field.text;
                }
            }
        }

        if self.current_card_index < stack.card_count() {
            session.current_card_index = self.current_card_index;
            session.current_field_name = self.current_field_name;
        }
    }

    /// Read the saved snapshot. Missing, unreadable or corrupt data all
    /// come back as `None`.
    pub fn load(store: &dyn KeyValueStore) -> Option<Self> {
        let text = match store.get(SNAPSHOT_KEY) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                warn!("cannot read saved state: {e}");
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("discarding corrupt saved state: {e}");
                None
            }
        }
    }

    /// Best-effort write; failures are logged and dropped.
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        let result = serde_json::to_string(self)
            .map_err(Into::into)
            .and_then(|text| store.set(SNAPSHOT_KEY, &text));
        if let Err(e) = result {
            warn!("cannot save state: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn capture_then_apply_restores_edits() {
        let mut stack = Stack::builtin();
        let mut session = Session::new();
        stack.set_field_text(1, "Body", "remember the milk");
        stack.set_card_name(2, "Contents");
        stack.user_level = 2;
        session.current_card_index = 1;
        session.current_field_name = Some("Body".into());
        let snapshot = Snapshot::capture(&stack, &session);

        let mut fresh = Stack::builtin();
        let mut fresh_session = Session::new();
        snapshot.apply(&mut fresh, &mut fresh_session);
        assert_eq!(fresh, stack);
        assert_eq!(fresh_session.current_card_index, 1);
        assert_eq!(fresh_session.current_field_name.as_deref(), Some("Body"));
    }

    #[test]
    fn unknown_ids_and_bad_values_are_skipped() {
        let snapshot = Snapshot {
            user_level: 9,
            script_text_font: "Courier".into(),
            script_text_size: 0,
            current_card_index: 7,
            current_field_name: Some("Title".into()),
            cards: vec![
                CardSnapshot {
                    id: 555,
                    name: "Ghost".into(),
                    fields: vec![],
                },
                CardSnapshot {
                    id: 101,
                    name: "Start".into(),
                    fields: vec![
                        FieldSnapshot {
                            id: 202,
                            text: "restored".into(),
                        },
                        FieldSnapshot {
                            id: 204,
                            text: "wrong card".into(),
                        },
                    ],
                },
            ],
        };
        let mut stack = Stack::builtin();
        let mut session = Session::new();
        snapshot.apply(&mut stack, &mut session);

        assert_eq!(stack.user_level, 5);
        assert_eq!(stack.script_text_size, 9);
        assert_eq!(stack.script_text_font, "Courier");
        assert_eq!(stack.cards[0].name, "Start");
        assert_eq!(stack.cards[0].fields[1].text, "restored");
        assert_eq!(stack.cards[1].fields[1].text, "Write your notes here.");
        assert_eq!(session.current_card_index, 0);
        assert!(session.current_field_name.is_none());
    }

    #[test]
    fn load_tolerates_missing_and_corrupt_data() {
        let mut store = MemoryStore::new();
        assert!(Snapshot::load(&store).is_none());
        store.set(SNAPSHOT_KEY, "{not json").unwrap();
        assert!(Snapshot::load(&store).is_none());
    }

    #[test]
    fn save_then_load() {
        let mut store = MemoryStore::new();
        let snapshot = Snapshot::capture(&Stack::builtin(), &Session::new());
        snapshot.save(&mut store);
        let text = store.get(SNAPSHOT_KEY).unwrap().unwrap();
        assert!(text.contains("\"currentCardIndex\":0"));
        assert_eq!(Snapshot::load(&store), Some(snapshot));
    }
}
