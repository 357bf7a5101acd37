//! Tokenizer for rule expressions

use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident(String),
    Str(String),
    LParen,
    RParen,
    Comma,
    And,
    Or,
    Not,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token start in the expression
    pub offset: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct LexError {
    pub offset: usize,
    pub reason: String,
}

impl LexError {
    fn new(offset: usize, reason: impl Into<String>) -> Self {
        Self {
            offset,
            reason: reason.into(),
        }
    }
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        let kind = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '(' => single(&mut chars, TokenKind::LParen),
            ')' => single(&mut chars, TokenKind::RParen),
            ',' => single(&mut chars, TokenKind::Comma),
            '!' => single(&mut chars, TokenKind::Not),
            '&' => doubled(&mut chars, '&', TokenKind::And)?,
            '|' => doubled(&mut chars, '|', TokenKind::Or)?,
            '`' => raw_string(&mut chars)?,
            '"' => quoted_string(&mut chars)?,
            c if c.is_ascii_alphabetic() || c == '_' => ident(&mut chars),
            other => return Err(LexError::new(offset, format!("unexpected character {other:?}"))),
        };
        tokens.push(Token { kind, offset });
    }

    Ok(tokens)
}

fn single(chars: &mut Peekable<CharIndices<'_>>, kind: TokenKind) -> TokenKind {
    chars.next();
    kind
}

fn doubled(
    chars: &mut Peekable<CharIndices<'_>>,
    expected: char,
    kind: TokenKind,
) -> Result<TokenKind, LexError> {
    let (offset, _) = chars.next().ok_or_else(|| LexError::new(0, "unexpected end of expression"))?;
    match chars.next() {
        Some((_, c)) if c == expected => Ok(kind),
        _ => Err(LexError::new(offset, format!("expected \"{expected}{expected}\""))),
    }
}

fn ident(chars: &mut Peekable<CharIndices<'_>>) -> TokenKind {
    let mut name = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if !(c.is_ascii_alphanumeric() || c == '_') {
            break;
        }
        name.push(c);
        chars.next();
    }
    TokenKind::Ident(name)
}

fn raw_string(chars: &mut Peekable<CharIndices<'_>>) -> Result<TokenKind, LexError> {
    let (start, _) = chars.next().ok_or_else(|| LexError::new(0, "unexpected end of expression"))?;
    let mut value = String::new();
    for (_, c) in chars.by_ref() {
        if c == '`' {
            return Ok(TokenKind::Str(value));
        }
        value.push(c);
    }
    Err(LexError::new(start, "unterminated string"))
}

fn quoted_string(chars: &mut Peekable<CharIndices<'_>>) -> Result<TokenKind, LexError> {
    let (start, _) = chars.next().ok_or_else(|| LexError::new(0, "unexpected end of expression"))?;
    let mut value = String::new();
    while let Some((offset, c)) = chars.next() {
        match c {
            '"' => return Ok(TokenKind::Str(value)),
            '\\' => {
                let escaped = match chars.next() {
                    Some((_, '\\')) => '\\',
                    Some((_, '"')) => '"',
                    Some((_, '\'')) => '\'',
                    Some((_, 'n')) => '\n',
                    Some((_, 'r')) => '\r',
                    Some((_, 't')) => '\t',
                    Some((_, other)) => {
                        return Err(LexError::new(offset, format!("unknown escape sequence \\{other}")))
                    }
                    None => break,
                };
                value.push(escaped);
            }
            '\n' => return Err(LexError::new(offset, "newline in string")),
            c => value.push(c),
        }
    }
    Err(LexError::new(start, "unterminated string"))
}
