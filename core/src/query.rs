//! Boolean query parsing: lexing, shape validation and infix to postfix.
//!
//! `AND` binds tighter than `OR`; both are left-associative and parentheses
//! group. Keywords are recognised only as whole words, so `ORANGE` or
//! `BRAND` stay terms.

use crate::error::{Error, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    pub fn precedence(self) -> u8 {
        match self {
            Operator::And => 2,
            Operator::Or => 1,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Lexer output. Parentheses only exist until the postfix conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Term(String),
    Operator(Operator),
    LeftParen,
    RightParen,
}

/// A parsed query in postfix order, ready for evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    postfix: Vec<Token>,
}

impl Query {
    /// Wrap an already-postfix token stream. Nothing is validated.
    pub fn from_postfix(postfix: Vec<Token>) -> Self {
        Self { postfix }
    }

    pub fn postfix(&self) -> &[Token] {
        &self.postfix
    }

    /// Terms in the order they appear, operators excluded.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.postfix.iter().filter_map(|t| match t {
            Token::Term(s) => Some(s.as_str()),
            _ => None,
        })
    }
}

/// Lex, validate and convert `input` into postfix order.
pub fn parse(input: &str) -> Result<Query> {
    let tokens = lex(input);
    validate(&tokens)?;
    let postfix = to_postfix(tokens);
    tracing::debug!(query = input, ?postfix, "parsed query");
    Ok(Query { postfix })
}

pub fn lex(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut term = String::new();
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        if c.is_whitespace() || c == '(' || c == ')' {
            flush(&mut term, &mut tokens);
            match c {
                '(' => tokens.push(Token::LeftParen),
                ')' => tokens.push(Token::RightParen),
                _ => {}
            }
            rest = &rest[c.len_utf8()..];
            continue;
        }
        if term.is_empty() {
            if let Some(op) = keyword_at(rest) {
                tokens.push(Token::Operator(op));
                rest = &rest[op.keyword().len()..];
                continue;
            }
        }
        term.push(c);
        rest = &rest[c.len_utf8()..];
    }
    flush(&mut term, &mut tokens);
    tokens
}

fn flush(term: &mut String, tokens: &mut Vec<Token>) {
    if !term.is_empty() {
        tokens.push(Token::Term(std::mem::take(term)));
    }
}

/// Keyword at the start of `s`, if followed by a word boundary.
fn keyword_at(s: &str) -> Option<Operator> {
    [Operator::And, Operator::Or].into_iter().find(|op| {
        s.strip_prefix(op.keyword()).is_some_and(|after| {
            after
                .chars()
                .next()
                .map_or(true, |c| c.is_whitespace() || c == '(' || c == ')')
        })
    })
}

/// Require `operand (op operand)*` with balanced parentheses, where an
/// operand is a term or a parenthesised group.
pub fn validate(tokens: &[Token]) -> Result<()> {
    if tokens.is_empty() {
        return Err(Error::invalid_query("empty query"));
    }
    let mut expect_operand = true;
    let mut depth = 0usize;
    for (pos, token) in tokens.iter().enumerate() {
        match token {
            Token::Term(t) if !expect_operand => {
                return Err(Error::invalid_query(format!("expected AND/OR before '{t}' (token {pos})")));
            }
            Token::Term(_) => expect_operand = false,
            Token::LeftParen if !expect_operand => {
                return Err(Error::invalid_query(format!("expected AND/OR before '(' (token {pos})")));
            }
            Token::LeftParen => depth += 1,
            Token::RightParen if expect_operand => {
                return Err(Error::invalid_query(format!("expected a term before ')' (token {pos})")));
            }
            Token::RightParen => {
                if depth == 0 {
                    return Err(Error::invalid_query(format!("unmatched ')' (token {pos})")));
                }
                depth -= 1;
            }
            Token::Operator(op) if expect_operand => {
                return Err(Error::invalid_query(format!("expected a term, found {op} (token {pos})")));
            }
            Token::Operator(_) => expect_operand = true,
        }
    }
    if expect_operand {
        return Err(Error::invalid_query("query ends with an operator"));
    }
    if depth != 0 {
        return Err(Error::invalid_query("unclosed '('"));
    }
    Ok(())
}

/// Shunting-yard conversion. Unbalanced parentheses are dropped, not reported;
/// run [`validate`] first.
pub fn to_postfix(tokens: Vec<Token>) -> Vec<Token> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();

    for token in tokens {
        match token {
            Token::Term(_) => output.push(token),
            Token::LeftParen => stack.push(token),
            Token::RightParen => {
                while let Some(top) = stack.pop() {
                    if top == Token::LeftParen {
                        break;
                    }
                    output.push(top);
                }
            }
            Token::Operator(op) => {
                while let Some(Token::Operator(top)) = stack.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    output.extend(stack.pop());
                }
                stack.push(token);
            }
        }
    }
    while let Some(top) = stack.pop() {
        if top != Token::LeftParen {
            output.push(top);
        }
    }
    output
}
