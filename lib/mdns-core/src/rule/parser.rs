//! Recursive-descent parser producing a [`Rule`] tree
//!
//! `&&` binds tighter than `||`, both associate to the left, and `!` applies to
//! the immediately following clause or parenthesised group.

use super::ast::{Matcher, Operator, Rule};
use super::lexer::{tokenize, Token, TokenKind};
use crate::{CoreError, Result};

/// Parentheses and negations deeper than this are rejected
const MAX_DEPTH: usize = 64;

/// Upper bound on matcher clauses in one expression.
///
/// Operator chains are parsed iteratively but still yield a tree one level
/// deep per operator, so this also bounds the depth of the resulting [`Rule`].
const MAX_CLAUSES: usize = 256;

/// Parse a rule expression into its tree
pub fn parse(expression: &str) -> Result<Rule> {
    let tokens = tokenize(expression).map_err(|e| CoreError::Parse {
        expression: expression.to_string(),
        offset: e.offset,
        reason: e.reason,
    })?;

    let mut parser = Parser {
        expression,
        tokens: &tokens,
        pos: 0,
        depth: 0,
        clauses: 0,
    };

    if tokens.is_empty() {
        return Err(parser.error_at(0, "empty rule expression"));
    }

    let rule = parser.parse_or()?;
    if let Some(token) = parser.peek() {
        return Err(parser.error_at(token.offset, "unexpected trailing input"));
    }

    Ok(rule)
}

struct Parser<'a> {
    expression: &'a str,
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    clauses: usize,
}

impl<'a> Parser<'a> {
    fn parse_or(&mut self) -> Result<Rule> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::Or) {
            let right = self.parse_and()?;
            left = Rule::composite(Operator::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Rule> {
        let mut left = self.parse_unary()?;
        while self.eat(&TokenKind::And) {
            let right = self.parse_unary()?;
            left = Rule::composite(Operator::And, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Rule> {
        if self.eat(&TokenKind::Not) {
            self.descend()?;
            let rule = self.parse_unary()?.negate();
            self.depth -= 1;
            return Ok(rule);
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Rule> {
        let token = self.next().ok_or_else(|| self.error_at_end("unexpected end of expression"))?;

        match &token.kind {
            TokenKind::LParen => {
                self.descend()?;
                let rule = self.parse_or()?;
                self.expect(&TokenKind::RParen, "expected \")\"")?;
                self.depth -= 1;
                Ok(rule)
            }
            TokenKind::Ident(name) => {
                self.clauses += 1;
                if self.clauses > MAX_CLAUSES {
                    return Err(self.error_at(token.offset, "too many clauses in expression"));
                }
                let matcher = Matcher::from_name(name)
                    .ok_or_else(|| self.error_at(token.offset, format!("unknown matcher {name:?}")))?;
                self.expect(&TokenKind::LParen, "expected \"(\" after matcher name")?;
                let args = self.parse_args()?;
                Ok(Rule::clause(matcher, args))
            }
            _ => Err(self.error_at(token.offset, "expected matcher or \"(\"")),
        }
    }

    /// Arguments after the opening parenthesis, consuming the closing one
    fn parse_args(&mut self) -> Result<Vec<String>> {
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }

        loop {
            let token = self.next().ok_or_else(|| self.error_at_end("unexpected end of expression"))?;
            match &token.kind {
                TokenKind::Str(value) => args.push(value.clone()),
                _ => return Err(self.error_at(token.offset, "expected string argument")),
            }

            let token = self.next().ok_or_else(|| self.error_at_end("expected \",\" or \")\""))?;
            match token.kind {
                TokenKind::Comma => continue,
                TokenKind::RParen => return Ok(args),
                _ => return Err(self.error_at(token.offset, "expected \",\" or \")\"")),
            }
        }
    }

    fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            let offset = self.tokens.get(self.pos.saturating_sub(1)).map_or(0, |t| t.offset);
            return Err(self.error_at(offset, "expression nested too deeply"));
        }
        Ok(())
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        match self.peek() {
            Some(token) if &token.kind == kind => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn expect(&mut self, kind: &TokenKind, reason: &str) -> Result<()> {
        if self.eat(kind) {
            return Ok(());
        }
        match self.peek() {
            Some(token) => Err(self.error_at(token.offset, reason)),
            None => Err(self.error_at_end(reason)),
        }
    }

    fn error_at(&self, offset: usize, reason: impl Into<String>) -> CoreError {
        CoreError::Parse {
            expression: self.expression.to_string(),
            offset,
            reason: reason.into(),
        }
    }

    fn error_at_end(&self, reason: impl Into<String>) -> CoreError {
        self.error_at(self.expression.len(), reason)
    }
}
