use super::{
    error::{Position, SyntaxError, SyntaxErrorKind},
    lexer::{Lexer, Spanned, Token},
    Body, Item, Number, Value,
};
use std::{iter::Peekable, vec};

/// The maximum number of nested blocks, objects and lists.
pub(crate) const MAX_NESTING_DEPTH: usize = 64;

pub(crate) struct Parser {
    tokens: Peekable<vec::IntoIter<Spanned>>,
    end: Position,
    depth: usize,
}

impl Parser {
    pub(crate) fn new(input: &str) -> Result<Self, SyntaxError> {
        let (tokens, end) = Lexer::new(input).tokenize()?;
        Ok(Self { tokens: tokens.into_iter().peekable(), end, depth: 0 })
    }

    pub(crate) fn parse_document(mut self) -> Result<Body, SyntaxError> {
        self.parse_body(false)
    }

    // Parses items until the end of input or, when nested, until the closing brace.
    fn parse_body(&mut self, nested: bool) -> Result<Body, SyntaxError> {
        let mut items = Vec::new();
        loop {
            match self.tokens.peek() {
                None if nested => return Err(self.unexpected_end("'}'")),
                None => break,
                Some(Spanned { token: Token::RightBrace, .. }) if nested => {
                    self.tokens.next();
                    break;
                }
                Some(_) => items.push(self.parse_item()?),
            }
            // Items can optionally be separated by commas.
            if let Some(Spanned { token: Token::Comma, .. }) = self.tokens.peek() {
                self.tokens.next();
            }
        }
        Ok(Body::new(items))
    }

    fn parse_item(&mut self) -> Result<Item, SyntaxError> {
        let mut keys = Vec::new();
        let mut start = None;
        loop {
            let expected = if keys.is_empty() { "a key" } else { "a key, '=' or '{'" };
            let Some(Spanned { token, position }) = self.tokens.next() else {
                return Err(self.unexpected_end(expected));
            };
            let item_start = *start.get_or_insert(position);
            match token {
                Token::Identifier(key) | Token::String(key) => keys.push(key),
                Token::Equals | Token::Colon if !keys.is_empty() => {
                    if keys.len() > 1 {
                        return Err(SyntaxError::new(position, SyntaxErrorKind::MultipleAssignmentKeys));
                    }
                    let value = self.parse_value()?;
                    return Ok(Item::new(keys, value, item_start));
                }
                Token::LeftBrace if !keys.is_empty() => {
                    let body = self.nested(position, |parser| parser.parse_body(true))?;
                    return Ok(Item::new(keys, Value::Object(body), item_start));
                }
                token => return Err(Self::unexpected(token, position, expected)),
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value, SyntaxError> {
        let Some(Spanned { token, position }) = self.tokens.next() else {
            return Err(self.unexpected_end("a value"));
        };
        let value = match token {
            Token::String(value) => Value::String(value),
            Token::Integer(value) => Value::Number(Number::Integer(value)),
            Token::Float(value) => Value::Number(Number::Float(value)),
            Token::Bool(value) => Value::Bool(value),
            Token::LeftBrace => Value::Object(self.nested(position, |parser| parser.parse_body(true))?),
            Token::LeftBracket => self.nested(position, Self::parse_list)?,
            token => return Err(Self::unexpected(token, position, "a value")),
        };
        Ok(value)
    }

    fn parse_list(&mut self) -> Result<Value, SyntaxError> {
        let mut values = Vec::new();
        loop {
            match self.tokens.peek() {
                None => return Err(self.unexpected_end("']'")),
                Some(Spanned { token: Token::RightBracket, .. }) => {
                    self.tokens.next();
                    return Ok(Value::List(values));
                }
                Some(_) => values.push(self.parse_value()?),
            }
            match self.tokens.next() {
                Some(Spanned { token: Token::Comma, .. }) => continue,
                Some(Spanned { token: Token::RightBracket, .. }) => return Ok(Value::List(values)),
                Some(Spanned { token, position }) => return Err(Self::unexpected(token, position, "',' or ']'")),
                None => return Err(self.unexpected_end("']'")),
            }
        }
    }

    // Runs a parse step one nesting level deeper, bailing out if that's too deep.
    fn nested<T, F>(&mut self, position: Position, parse: F) -> Result<T, SyntaxError>
    where
        F: FnOnce(&mut Self) -> Result<T, SyntaxError>,
    {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(SyntaxError::new(position, SyntaxErrorKind::NestingTooDeep));
        }
        self.depth += 1;
        let output = parse(self);
        self.depth -= 1;
        output
    }

    fn unexpected(token: Token, position: Position, expected: &'static str) -> SyntaxError {
        SyntaxError::new(position, SyntaxErrorKind::UnexpectedToken { found: token.to_string(), expected })
    }

    fn unexpected_end(&self, expected: &'static str) -> SyntaxError {
        SyntaxError::new(self.end, SyntaxErrorKind::UnexpectedEnd { expected })
    }
}
