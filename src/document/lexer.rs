use super::error::{Position, SyntaxError, SyntaxErrorKind};
use std::{fmt, iter::Peekable, str::Chars};

/// A lexical token.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    Identifier(String),
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Equals,
    Colon,
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name) => write!(f, "identifier '{name}'"),
            Self::String(value) => write!(f, "string {value:?}"),
            Self::Integer(value) => write!(f, "number {value}"),
            Self::Float(value) => write!(f, "number {value}"),
            Self::Bool(value) => write!(f, "boolean {value}"),
            Self::LeftBrace => write!(f, "'{{'"),
            Self::RightBrace => write!(f, "'}}'"),
            Self::LeftBracket => write!(f, "'['"),
            Self::RightBracket => write!(f, "']'"),
            Self::Equals => write!(f, "'='"),
            Self::Colon => write!(f, "':'"),
            Self::Comma => write!(f, "','"),
        }
    }
}

/// A token along with the position where it starts.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Spanned {
    pub(crate) token: Token,
    pub(crate) position: Position,
}

pub(crate) struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    position: Position,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { chars: input.chars().peekable(), position: Position::default() }
    }

    /// Tokenize the entire input, returning the tokens and the position where the input ends.
    pub(crate) fn tokenize(mut self) -> Result<(Vec<Spanned>, Position), SyntaxError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok((tokens, self.position))
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.position.line += 1;
            self.position.column = 1;
        } else {
            self.position.column += 1;
        }
        Some(c)
    }

    fn next_token(&mut self) -> Result<Option<Spanned>, SyntaxError> {
        self.skip_trivia()?;
        let position = self.position;
        let Some(c) = self.chars.peek().copied() else {
            return Ok(None);
        };
        let token = match c {
            '{' => self.single(Token::LeftBrace),
            '}' => self.single(Token::RightBrace),
            '[' => self.single(Token::LeftBracket),
            ']' => self.single(Token::RightBracket),
            '=' => self.single(Token::Equals),
            ':' => self.single(Token::Colon),
            ',' => self.single(Token::Comma),
            '"' => self.string(position)?,
            '-' | '0'..='9' => self.number(position)?,
            c if is_identifier_start(c) => self.identifier(),
            c => return Err(SyntaxError::new(position, SyntaxErrorKind::UnexpectedCharacter(c))),
        };
        Ok(Some(Spanned { token, position }))
    }

    fn single(&mut self, token: Token) -> Token {
        self.bump();
        token
    }

    // Whitespace, newlines and the three comment styles.
    fn skip_trivia(&mut self) -> Result<(), SyntaxError> {
        while let Some(c) = self.chars.peek().copied() {
            match c {
                c if c.is_whitespace() => {
                    self.bump();
                }
                '#' => self.skip_line(),
                '/' => {
                    let start = self.position;
                    self.bump();
                    match self.chars.peek() {
                        Some('/') => self.skip_line(),
                        Some('*') => {
                            self.bump();
                            self.skip_block_comment(start)?;
                        }
                        _ => return Err(SyntaxError::new(start, SyntaxErrorKind::UnexpectedCharacter('/'))),
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self, start: Position) -> Result<(), SyntaxError> {
        let mut previous = None;
        while let Some(c) = self.bump() {
            if previous == Some('*') && c == '/' {
                return Ok(());
            }
            previous = Some(c);
        }
        Err(SyntaxError::new(start, SyntaxErrorKind::UnterminatedComment))
    }

    fn string(&mut self, start: Position) -> Result<Token, SyntaxError> {
        // Opening quote
        self.bump();
        let mut output = String::new();
        loop {
            let escape_position = self.position;
            match self.bump() {
                None | Some('\n') => return Err(SyntaxError::new(start, SyntaxErrorKind::UnterminatedString)),
                Some('"') => return Ok(Token::String(output)),
                Some('\\') => {
                    let escaped = match self.bump() {
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('/') => '/',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some('u') => self.unicode_escape(escape_position)?,
                        Some(c) => return Err(SyntaxError::new(escape_position, SyntaxErrorKind::InvalidEscape(c))),
                        None => return Err(SyntaxError::new(start, SyntaxErrorKind::UnterminatedString)),
                    };
                    output.push(escaped);
                }
                Some(c) => output.push(c),
            }
        }
    }

    fn unicode_escape(&mut self, position: Position) -> Result<char, SyntaxError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| SyntaxError::new(position, SyntaxErrorKind::InvalidUnicodeEscape))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| SyntaxError::new(position, SyntaxErrorKind::InvalidUnicodeEscape))
    }

    fn number(&mut self, start: Position) -> Result<Token, SyntaxError> {
        let mut text = String::new();
        while let Some(c) = self.chars.peek().copied() {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '.') {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if let Ok(value) = text.parse::<i64>() {
            return Ok(Token::Integer(value));
        }
        // Only accept plain decimal floats, not things like "inf" or "NaN".
        let is_decimal = text.chars().all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'));
        match text.parse::<f64>() {
            Ok(value) if is_decimal && value.is_finite() => Ok(Token::Float(value)),
            _ => Err(SyntaxError::new(start, SyntaxErrorKind::InvalidNumber(text))),
        }
    }

    fn identifier(&mut self) -> Token {
        let mut text = String::new();
        while let Some(c) = self.chars.peek().copied() {
            if is_identifier_continue(c) {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        match text.as_str() {
            "true" => Token::Bool(true),
            "false" => Token::Bool(false),
            _ => Token::Identifier(text),
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}
