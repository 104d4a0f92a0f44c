//! Message-box lexer — splits one input line into tokens.
//!
//! There are no reserved words: `go`, `put`, `field` are plain words and
//! the parser decides what they mean from their position. Quoted strings
//! keep their contents verbatim (no escapes). Every token records its byte
//! span so the parser can hand raw source text to the expression evaluator.
//!
//! Lexing never fails. An unterminated quote becomes an `Unterminated`
//! token which no command shape accepts, so the line falls through to the
//! default handler.

/// Byte range into the source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A run of non-blank, non-quote characters.
    Word(String),
    /// A word made only of ASCII digits.
    Number(String),
    /// `"..."` with the quotes removed.
    StringLit(String),
    /// A `"` with no closing quote; holds the remainder of the line.
    Unterminated(String),
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Whether blanks appeared before this token.
    pub space_before: bool,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, space_before: bool) -> Self {
        Self {
            kind,
            span,
            space_before,
        }
    }

    /// Case-insensitive keyword check; only words can be keywords.
    pub fn is_word(&self, keyword: &str) -> bool {
        matches!(&self.kind, TokenKind::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    /// Tokenize the whole line. The last token is always `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let pos_before = self.pos;
            self.skip_whitespace();
            let had_space = self.pos > pos_before;

            let start = self.pos;
            let Some(ch) = self.peek() else {
                tokens.push(Token::new(
                    TokenKind::Eof,
                    Span { start, end: start },
                    had_space,
                ));
                break;
            };

            let kind = if ch == '"' {
                self.lex_string()
            } else {
                self.lex_word()
            };
            tokens.push(Token::new(
                kind,
                Span {
                    start,
                    end: self.pos,
                },
                had_space,
            ));
        }

        tokens
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn lex_string(&mut self) -> TokenKind {
        self.advance(); // opening quote
        let body_start = self.pos;
        while let Some(ch) = self.advance() {
            if ch == '"' {
                let body = &self.source[body_start..self.pos - 1];
                return TokenKind::StringLit(body.to_string());
            }
        }
        TokenKind::Unterminated(self.source[body_start..].to_string())
    }

    fn lex_word(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || ch == '"' {
                break;
            }
            self.advance();
        }
        let text = &self.source[start..self.pos];
        if text.bytes().all(|b| b.is_ascii_digit()) {
            TokenKind::Number(text.to_string())
        } else {
            TokenKind::Word(text.to_string())
        }
    }
}

/// Shorthand for `Lexer::new(source).tokenize()`.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}
