//! Rule expression language
//!
//! Rule expressions combine matcher clauses with `&&`, `||`, `!` and
//! parentheses, e.g. ``Host(`app.local`) && !PathPrefix(`/admin`)``.
//! Arguments are backtick raw strings or double-quoted strings with escapes.

mod ast;
mod lexer;
mod parser;

pub use ast::{Matcher, Operator, Rule};
pub use parser::parse;
