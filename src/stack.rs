//! The stack model — backgrounds, cards, fields and buttons.
//!
//! This is a plain data container. Setters do no range checking; the
//! engine validates `userLevel` and `scriptTextSize` before calling in.
//! Field and card name lookups are case-insensitive and return the first
//! match in order, so duplicate names shadow later entries.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stack {
    pub name: String,
    #[serde(default)]
    pub cant_modify: bool,
    pub user_level: u8,
    pub script_text_font: String,
    pub script_text_size: u32,
    #[serde(default)]
    pub report_templates: Vec<String>,
    pub backgrounds: Vec<Background>,
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: u32,
    pub name: String,
    pub background_id: u32,
    #[serde(default)]
    pub rect: Rect,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub buttons: Vec<Button>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_text_font")]
    pub text_font: String,
    #[serde(default = "default_text_size")]
    pub text_size: u32,
    #[serde(default)]
    pub lock_text: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub id: u32,
    pub name: String,
    /// Opaque to the interpreter; only the script editor touches it.
    #[serde(default)]
    pub script: String,
}

/// Case-insensitive name comparison, Unicode-aware so "État" matches "état".
pub fn names_match(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

fn default_text_font() -> String {
    "Geneva".to_string()
}

fn default_text_size() -> u32 {
    12
}

/// A stack-level property write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackProperty {
    Name(String),
    CantModify(bool),
    UserLevel(u8),
    ScriptTextFont(String),
    ScriptTextSize(u32),
}

impl StackProperty {
    /// Property name as it appears in the message log.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::CantModify(_) => "cantModify",
            Self::UserLevel(_) => "userLevel",
            Self::ScriptTextFont(_) => "scriptTextFont",
            Self::ScriptTextSize(_) => "scriptTextSize",
        }
    }

    /// Range check applied by callers before the write reaches the model.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::UserLevel(level) => (1..=5).contains(level),
            Self::ScriptTextSize(size) => *size > 0,
            _ => true,
        }
    }
}

impl Field {
    pub fn new(id: u32, name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            text: text.into(),
            text_font: default_text_font(),
            text_size: default_text_size(),
            lock_text: false,
        }
    }
}

impl Button {
    pub fn new(id: u32, name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            script: script.into(),
        }
    }
}

impl Card {
    /// First field whose name matches case-insensitively.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| names_match(&f.name, name))
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields
            .iter_mut()
            .find(|f| names_match(&f.name, name))
    }

    pub fn button(&self, name: &str) -> Option<&Button> {
        self.buttons
            .iter()
            .find(|b| names_match(&b.name, name))
    }

    pub fn button_by_id_mut(&mut self, id: u32) -> Option<&mut Button> {
        self.buttons.iter_mut().find(|b| b.id == id)
    }

    /// First field whose text contains `needle_lower`, which must already
    /// be lowercased.
    pub fn search(&self, needle_lower: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.text.to_lowercase().contains(needle_lower))
    }
}

impl Stack {
    /// The stack a fresh engine starts from.
    pub fn builtin() -> Self {
        let bg = 1;
        let mouse_up = |target: &str| format!("on mouseUp\n  go {target}\nend mouseUp");
        Self {
            name: "Home Stack".to_string(),
            cant_modify: false,
            user_level: 5,
            script_text_font: "Monaco".to_string(),
            script_text_size: 9,
            report_templates: vec!["Card Names".to_string(), "Field Dump".to_string()],
            backgrounds: vec![Background {
                id: bg,
                name: "Main Background".to_string(),
                rect: Rect::new(0, 0, 512, 342),
            }],
            cards: vec![
                Card {
                    id: 101,
                    name: "Home".to_string(),
                    background_id: bg,
                    rect: Rect::new(0, 0, 512, 342),
                    fields: vec![
                        Field::new(201, "Title", "Welcome"),
                        Field::new(202, "Body", "Type commands into the message box."),
                    ],
                    buttons: vec![Button::new(301, "Next", mouse_up("next"))],
                },
                Card {
                    id: 102,
                    name: "Notes".to_string(),
                    background_id: bg,
                    rect: Rect::new(0, 0, 512, 342),
                    fields: vec![
                        Field::new(203, "Title", "Notes"),
                        Field::new(204, "Body", "Write your notes here."),
                    ],
                    buttons: vec![
                        Button::new(302, "Previous", mouse_up("previous")),
                        Button::new(303, "Next", mouse_up("next")),
                    ],
                },
                Card {
                    id: 103,
                    name: "Index".to_string(),
                    background_id: bg,
                    rect: Rect::new(0, 0, 512, 342),
                    fields: vec![
                        Field::new(205, "Title", "Index"),
                        Field::new(206, "Body", "Home, Notes, Index"),
                    ],
                    buttons: vec![Button::new(304, "Home", mouse_up("first"))],
                },
            ],
        }
    }

    /// Parse and validate a JSON stack definition.
    pub fn from_json(source: &str) -> Result<Self, DefinitionError> {
        let stack: Self = serde_json::from_str(source)?;
        stack.validate()?;
        Ok(stack)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check the id and reference invariants the engine relies on.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.cards.is_empty() {
            return Err(DefinitionError::NoCards);
        }
        let backgrounds: HashSet<u32> = self.backgrounds.iter().map(|b| b.id).collect();
        let mut card_ids = HashSet::new();
        let mut field_ids = HashSet::new();
        for card in &self.cards {
            if !card_ids.insert(card.id) {
                return Err(DefinitionError::DuplicateCardId(card.id));
            }
            if !backgrounds.contains(&card.background_id) {
                return Err(DefinitionError::MissingBackground {
                    card: card.id,
                    background: card.background_id,
                });
            }
            for field in &card.fields {
                if !field_ids.insert(field.id) {
                    return Err(DefinitionError::DuplicateFieldId(field.id));
                }
            }
        }
        Ok(())
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    pub fn card_index_by_id(&self, id: u32) -> Option<usize> {
        self.cards.iter().position(|c| c.id == id)
    }

    /// First card whose name matches case-insensitively.
    pub fn card_index_by_name(&self, name: &str) -> Option<usize> {
        self.cards
            .iter()
            .position(|c| names_match(&c.name, name))
    }

    pub fn background(&self, id: u32) -> Option<&Background> {
        self.backgrounds.iter().find(|b| b.id == id)
    }

    /// Returns `false` if the card index or field name does not resolve.
    pub fn set_field_text(&mut self, card_index: usize, field_name: &str, text: &str) -> bool {
        let Some(card) = self.cards.get_mut(card_index) else {
            return false;
        };
        match card.field_mut(field_name) {
            Some(field) => {
                field.text = text.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_card_name(&mut self, card_index: usize, name: &str) -> bool {
        match self.cards.get_mut(card_index) {
            Some(card) => {
                card.name = name.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_stack_property(&mut self, property: StackProperty) {
        match property {
            StackProperty::Name(name) => self.name = name,
            StackProperty::CantModify(flag) => self.cant_modify = flag,
            StackProperty::UserLevel(level) => self.user_level = level,
            StackProperty::ScriptTextFont(font) => self.script_text_font = font,
            StackProperty::ScriptTextSize(size) => self.script_text_size = size,
        }
    }

    /// Replace a button's script wherever the button lives. Returns the
    /// owning card's index.
    pub fn set_button_script(&mut self, button_id: u32, script: &str) -> Option<usize> {
        self.cards.iter_mut().enumerate().find_map(|(idx, card)| {
            card.button_by_id_mut(button_id).map(|button| {
                button.script = script.to_string();
                idx
            })
        })
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::builtin()
    }
}
