#![allow(clippy::return_self_not_must_use)]

pub mod ast;
pub mod engine;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod nav;
pub mod parser;
pub mod render;
pub mod session;
pub mod snapshot;
pub mod stack;
pub mod store;

pub use engine::Engine;
