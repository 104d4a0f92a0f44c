//! Message-box parser — one line of tokens to a `Command`.
//!
//! Shapes are tried in a fixed order and the first one that matches the
//! whole line wins; anything unmatched becomes `Command::Send`. Keywords
//! match case-insensitively, quoted contents are taken as written. Only
//! the shape of the line matters, so a field called "go" never looks like
//! navigation.

use crate::ast::{Command, Expr, NavRequest};
use crate::lexer::{tokenize, Token, TokenKind};

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
}

impl<'a> Parser<'a> {
    /// `source` should already be trimmed; spans index into it.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: tokenize(source),
        }
    }

    pub fn parse_command(&self) -> Command {
        if self.at(0).is_eof() {
            return Command::Empty;
        }
        if self.at(0).is_word("beep") && self.at(1).is_eof() {
            return Command::Beep;
        }
        if self.at(0).is_word("go") && self.has_argument() {
            return match self.parse_go() {
                Some(request) => Command::Go(request),
                None => Command::UnknownGo(self.source.to_string()),
            };
        }
        if let Some(cmd) = self.parse_put() {
            return cmd;
        }
        if self.at(0).is_word("get") && self.has_argument() {
            if let Some(field) = self.field_ref_at(1) {
                return Command::Get { field };
            }
        }
        if self.at(0).is_word("answer") && self.has_argument() {
            return Command::Answer {
                expr: self.rest_from(1).to_string(),
            };
        }
        if self.at(0).is_word("find") && self.has_argument() {
            return Command::Find {
                expr: self.rest_from(1).to_string(),
            };
        }
        Command::Send(self.source.to_string())
    }

    /// Classify an expression for the evaluator.
    pub fn parse_expr(&self) -> Expr {
        // Everything between the first and last quote, inner quotes included.
        let src = self.source;
        if src.len() >= 2 && src.starts_with('"') && src.ends_with('"') {
            return Expr::Literal(src[1..src.len() - 1].to_string());
        }
        if let Some(name) = self.field_ref_at(0) {
            return Expr::FieldRef(name);
        }
        let keyword_forms: [(&[&str], Expr); 7] = [
            (&["the", "name", "of", "this", "card"], Expr::CardName),
            (&["the", "number", "of", "cards"], Expr::CardCount),
            (&["the", "number", "of", "this", "card"], Expr::CardNumber),
            (&["the", "name", "of", "this", "stack"], Expr::StackName),
            (&["the", "userlevel"], Expr::UserLevel),
            (&["the", "result"], Expr::TheResult),
            (&["it"], Expr::It),
        ];
        for (words, expr) in keyword_forms {
            if self.words_are(words) {
                return expr;
            }
        }
        Expr::Text(self.source.to_string())
    }

    // ── helpers ──────────────────────────────────────────────────────

    /// Token at `idx`, or the trailing `Eof` when past the end.
    fn at(&self, idx: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[idx.min(last)]
    }

    /// The keyword is followed by blanks and something else.
    fn has_argument(&self) -> bool {
        let next = self.at(1);
        !next.is_eof() && next.space_before
    }

    /// Raw source from token `idx` to the end of the line.
    fn rest_from(&self, idx: usize) -> &'a str {
        let start = self.at(idx).span.start;
        self.source[start..].trim_end()
    }

    /// The line from `idx` on is exactly `[card] field "<name>"`.
    fn field_ref_at(&self, idx: usize) -> Option<String> {
        let idx = if self.at(idx).is_word("card") {
            idx + 1
        } else {
            idx
        };
        if !self.at(idx).is_word("field") {
            return None;
        }
        match (&self.at(idx + 1).kind, self.at(idx + 2).is_eof()) {
            (TokenKind::StringLit(name), true) => Some(name.clone()),
            _ => None,
        }
    }

    /// The whole line is exactly these keywords.
    fn words_are(&self, words: &[&str]) -> bool {
        self.tokens.len() == words.len() + 1
            && words
                .iter()
                .enumerate()
                .all(|(idx, w)| self.at(idx).is_word(w))
    }

    // ── command shapes ──────────────────────────────────────────────

    fn parse_go(&self) -> Option<NavRequest> {
        let target = self.at(1);
        if target.is_word("card") {
            if !self.at(3).is_eof() {
                return None;
            }
            return match &self.at(2).kind {
                // Digits too long for u64 still name a card that can't exist.
                TokenKind::Number(n) => Some(NavRequest::ByNumber(n.parse().unwrap_or(u64::MAX))),
                TokenKind::StringLit(name) => Some(NavRequest::ByName(name.clone())),
                _ => None,
            };
        }
        if !self.at(2).is_eof() {
            return None;
        }
        if target.is_word("next") {
            Some(NavRequest::Next)
        } else if target.is_word("previous") || target.is_word("prev") {
            Some(NavRequest::Previous)
        } else if target.is_word("first") {
            Some(NavRequest::First)
        } else if target.is_word("last") {
            Some(NavRequest::Last)
        } else if target.is_word("recent") {
            Some(NavRequest::Recent)
        } else {
            None
        }
    }

    /// `put <expr> into [card] field "<name>"`. The split happens at the
    /// last `into` whose tail is a field reference, so the expression may
    /// itself contain the word.
    fn parse_put(&self) -> Option<Command> {
        if !(self.at(0).is_word("put") && self.has_argument()) {
            return None;
        }
        (2..self.tokens.len()).rev().find_map(|idx| {
            let into = self.at(idx);
            if !(into.is_word("into") && into.space_before) {
                return None;
            }
            let field = self.field_ref_at(idx + 1)?;
            let start = self.at(1).span.start;
            let end = self.at(idx - 1).span.end;
            Some(Command::Put {
                expr: self.source[start..end].to_string(),
                field,
            })
        })
    }
}

/// Classify one raw input line.
pub fn parse_command(line: &str) -> Command {
    Parser::new(line.trim()).parse_command()
}

/// Classify one raw expression.
pub fn parse_expr(text: &str) -> Expr {
    Parser::new(text.trim()).parse_expr()
}
