//! Parsed message-box intents.
//!
//! A line becomes exactly one `Command`. Right-hand sides stay as raw text
//! until execution time, when the evaluator turns them into an `Expr` and
//! resolves it against the current card.

/// One classified input line, in interpreter priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank input.
    Empty,

    /// `beep`
    Beep,

    /// `go ...` with a recognized target.
    Go(NavRequest),

    /// `go ...` whose target we don't understand. Holds the whole line.
    UnknownGo(String),

    /// `put <expr> into [card] field "<name>"`
    Put { expr: String, field: String },

    /// `get [card] field "<name>"`
    Get { field: String },

    /// `answer <expr>`
    Answer { expr: String },

    /// `find <expr>`
    Find { expr: String },

    /// Anything else; holds the trimmed line.
    Send(String),
}

/// Where a `go` command wants to move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavRequest {
    /// 1-based card number.
    ByNumber(u64),
    ByName(String),
    Next,
    Previous,
    First,
    Last,
    Recent,
}

impl NavRequest {
    /// How a successful move is described in the response.
    pub fn describe(&self) -> String {
        match self {
            Self::ByNumber(n) => format!("card {n}"),
            Self::ByName(name) => format!("card \"{name}\""),
            Self::Next => "next card".to_string(),
            Self::Previous => "previous card".to_string(),
            Self::First => "first card".to_string(),
            Self::Last => "last card".to_string(),
            Self::Recent => "recent card".to_string(),
        }
    }
}

/// A resolvable right-hand side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `"..."`
    Literal(String),
    /// `[card] field "<name>"` on the current card.
    FieldRef(String),
    /// `the name of this card`
    CardName,
    /// `the number of cards`
    CardCount,
    /// `the number of this card`
    CardNumber,
    /// `the name of this stack`
    StackName,
    /// `the userLevel`
    UserLevel,
    /// `the result`
    TheResult,
    /// `it`
    It,
    /// Unrecognized; evaluates to itself.
    Text(String),
}
