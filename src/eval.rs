//! Expression evaluator — resolves a right-hand side to a string.
//!
//! The grammar is deliberately flat: a quoted literal, a field reference
//! on the current card, a handful of `the ...` keywords, or `it`. Anything
//! else evaluates to its own trimmed text.

use crate::ast::Expr;
use crate::parser::parse_expr;
use crate::session::Session;
use crate::stack::Stack;

pub struct Evaluator<'a> {
    stack: &'a Stack,
    session: &'a Session,
}

impl<'a> Evaluator<'a> {
    pub fn new(stack: &'a Stack, session: &'a Session) -> Self {
        Self { stack, session }
    }

    pub fn evaluate(&self, text: &str) -> String {
        self.eval_expr(&parse_expr(text))
    }

    pub fn eval_expr(&self, expr: &Expr) -> String {
        let index = self.session.current_card_index;
        let card = self.stack.cards.get(index);
        match expr {
            Expr::Literal(s) | Expr::Text(s) => s.clone(),
            Expr::FieldRef(name) => card
                .and_then(|c| c.field(name))
                .map(|f| f.text.clone())
                .unwrap_or_default(),
            Expr::CardName => card.map(|c| c.name.clone()).unwrap_or_default(),
            Expr::CardCount => self.stack.card_count().to_string(),
            Expr::CardNumber => (index + 1).to_string(),
            Expr::StackName => self.stack.name.clone(),
            Expr::UserLevel => self.stack.user_level.to_string(),
            Expr::TheResult => self.session.variables.result.clone(),
            Expr::It => self.session.variables.it.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_with(session: &Session, text: &str) -> String {
        let stack = Stack::builtin();
        Evaluator::new(&stack, session).evaluate(text)
    }

    fn eval(text: &str) -> String {
        eval_with(&Session::new(), text)
    }

    #[test]
    fn literal_is_verbatim() {
        assert_eq!(eval(r#""Hello, World""#), "Hello, World");
        assert_eq!(eval(r#""""#), "");
        assert_eq!(eval(r#"  "\t"  "#), "\\t");
    }

    #[test]
    fn field_reference_reads_current_card() {
        assert_eq!(eval(r#"field "title""#), "Welcome");
        assert_eq!(eval(r#"card field "Missing""#), "");

        let mut session = Session::new();
        session.current_card_index = 1;
        assert_eq!(eval_with(&session, r#"field "Title""#), "Notes");
    }

    #[test]
    fn keywords() {
        let mut session = Session::new();
        session.current_card_index = 2;
        assert_eq!(eval_with(&session, "the name of this card"), "Index");
        assert_eq!(eval_with(&session, "the number of this card"), "3");
        assert_eq!(eval("the number of cards"), "3");
        assert_eq!(eval("the name of this stack"), "Home Stack");
        assert_eq!(eval("the userlevel"), "5");
    }

    #[test]
    fn it_and_result() {
        let mut session = Session::new();
        session.variables.it = "thing".into();
        session.variables.result = "outcome".into();
        assert_eq!(eval_with(&session, "It"), "thing");
        assert_eq!(eval_with(&session, "the result"), "outcome");
    }

    #[test]
    fn unresolved_text_is_itself() {
        assert_eq!(eval("  hello   there "), "hello   there");
        assert_eq!(eval(r#"field Body"#), "field Body");
    }
}
