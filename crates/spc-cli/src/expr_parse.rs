//! A minimal parser for the `cost-expression` strings an ingested design
//! record may carry (§6): sums and products of numeric constants and bare
//! identifiers, with parentheses for grouping. This lives in the CLI, not
//! `spc-core`, because parsing a *string* into the algebra is an ingestion
//! concern (§1) — the core only ever consumes already-built [`Expression`]
//! values.

use rust_decimal::Decimal;
use spc_core::Expression;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Decimal),
    Ident(String),
    Plus,
    Star,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = Decimal::from_str(&text)
                    .map_err(|e| format!("bad numeric constant '{text}': {e}"))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    /// expr := term ('+' term)*
    fn expr(&mut self) -> Result<Expression, String> {
        let mut lhs = self.term()?;
        while matches!(self.peek(), Some(Token::Plus)) {
            self.bump();
            let rhs = self.term()?;
            lhs = lhs.add(rhs);
        }
        Ok(lhs)
    }

    /// term := factor ('*' factor)*
    fn term(&mut self) -> Result<Expression, String> {
        let mut lhs = self.factor()?;
        while matches!(self.peek(), Some(Token::Star)) {
            self.bump();
            let rhs = self.factor()?;
            lhs = lhs.mul(rhs);
        }
        Ok(lhs)
    }

    /// factor := NUMBER | IDENT | '(' expr ')'
    fn factor(&mut self) -> Result<Expression, String> {
        match self.bump() {
            Some(Token::Number(n)) => Ok(Expression::konst(n)),
            Some(Token::Ident(name)) => Ok(Expression::var(name)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.bump() {
                    Some(Token::RParen) => Ok(inner),
                    other => Err(format!("expected ')', found {other:?}")),
                }
            }
            other => Err(format!("expected a number, identifier, or '(', found {other:?}")),
        }
    }
}

/// Parses a `+`/`*` expression over numeric constants and bare identifiers.
/// The identifier `intrinsic` is left as a literal variable — callers
/// substitute it for the design's own intrinsic-cost symbol afterwards,
/// since the parser has no notion of which design it is parsing for.
pub fn parse(input: &str) -> Result<Expression, String> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(format!("unexpected trailing input at token {}", parser.pos));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn parses_the_s5_chair_expression() {
        let expr = parse("intrinsic + 4 * leg + seat + back").unwrap();
        let mut bindings = HashMap::new();
        bindings.insert("intrinsic".to_string(), Decimal::from(3));
        bindings.insert("leg".to_string(), Decimal::from(1));
        bindings.insert("seat".to_string(), Decimal::from(2));
        bindings.insert("back".to_string(), Decimal::from(3));
        assert_eq!(expr.eval(&bindings).unwrap(), Decimal::from(12));
    }

    #[test]
    fn parses_parenthesized_grouping() {
        let expr = parse("(leg + seat) * 2").unwrap();
        let mut bindings = HashMap::new();
        bindings.insert("leg".to_string(), Decimal::from(1));
        bindings.insert("seat".to_string(), Decimal::from(2));
        assert_eq!(expr.eval(&bindings).unwrap(), Decimal::from(6));
    }

    #[test]
    fn rejects_unexpected_characters() {
        assert!(parse("leg & seat").is_err());
    }

    #[test]
    fn rejects_unbalanced_parens() {
        assert!(parse("(leg + seat").is_err());
    }
}
