//! Lexer for Vanara
//!
//! Converts source code into an on-demand stream of tokens.

use crate::token::{lookup_ident, Token, TokenKind};

/// The lexer state
///
/// Operates on bytes; the language is ASCII-only. A single byte of
/// lookahead (`peek_char`) is enough for every token.
pub struct Lexer<'a> {
    input: &'a [u8],
    /// Index of the byte in `ch`
    position: usize,
    /// Index of the next byte to read
    read_position: usize,
    /// Current byte, 0 at end of input
    ch: u8,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer from source code
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Self {
            input: input.as_bytes(),
            position: 0,
            read_position: 0,
            ch: 0,
        };
        lexer.read_char();
        lexer
    }

    /// Get the next token; yields `Eof` forever once the input is exhausted
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let token = match self.ch {
            b'=' => {
                if self.peek_char() == b'=' {
                    self.read_char();
                    Token::new(TokenKind::Eq, "==")
                } else {
                    Token::new(TokenKind::Assign, "=")
                }
            }
            b'!' => {
                if self.peek_char() == b'=' {
                    self.read_char();
                    Token::new(TokenKind::NotEq, "!=")
                } else {
                    Token::new(TokenKind::Bang, "!")
                }
            }
            b'+' => Token::new(TokenKind::Plus, "+"),
            b'-' => Token::new(TokenKind::Minus, "-"),
            b'*' => Token::new(TokenKind::Asterisk, "*"),
            b'/' => Token::new(TokenKind::Slash, "/"),
            b'<' => Token::new(TokenKind::Lt, "<"),
            b'>' => Token::new(TokenKind::Gt, ">"),
            b',' => Token::new(TokenKind::Comma, ","),
            b';' => Token::new(TokenKind::Semicolon, ";"),
            b':' => Token::new(TokenKind::Colon, ":"),
            b'.' => Token::new(TokenKind::Dot, "."),
            b'(' => Token::new(TokenKind::LParen, "("),
            b')' => Token::new(TokenKind::RParen, ")"),
            b'{' => Token::new(TokenKind::LBrace, "{"),
            b'}' => Token::new(TokenKind::RBrace, "}"),
            b'[' => Token::new(TokenKind::LBracket, "["),
            b']' => Token::new(TokenKind::RBracket, "]"),
            b'#' => Token::new(TokenKind::Comment, self.read_comment()),
            b'"' => Token::new(TokenKind::String, self.read_string()),
            0 => Token::new(TokenKind::Eof, ""),
            _ => {
                if is_letter(self.ch) {
                    let literal = self.read_identifier();
                    return Token::new(lookup_ident(&literal), literal);
                }

                if self.ch.is_ascii_digit() {
                    return Token::new(TokenKind::Int, self.read_number());
                }

                Token::new(TokenKind::Illegal, (self.ch as char).to_string())
            }
        };

        self.read_char();

        token
    }

    /// Advance to the next byte
    fn read_char(&mut self) {
        self.ch = if self.read_position >= self.input.len() {
            0
        } else {
            self.input[self.read_position]
        };

        self.position = self.read_position;
        self.read_position += 1;
    }

    /// Look at the next byte without advancing
    fn peek_char(&self) -> u8 {
        if self.read_position >= self.input.len() {
            0
        } else {
            self.input[self.read_position]
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.ch, b' ' | b'\t' | b'\r' | b'\n') {
            self.read_char();
        }
    }

    /// Read an identifier or keyword lexeme; digits are not identifier bytes
    fn read_identifier(&mut self) -> String {
        let start = self.position;

        while is_letter(self.ch) {
            self.read_char();
        }

        String::from_utf8_lossy(&self.input[start..self.position]).into_owned()
    }

    fn read_number(&mut self) -> String {
        let start = self.position;

        while self.ch.is_ascii_digit() {
            self.read_char();
        }

        String::from_utf8_lossy(&self.input[start..self.position]).into_owned()
    }

    /// Read a string literal body, decoding escapes.
    ///
    /// Recognized escapes are `\" \n \r \t \\`; for anything else the
    /// backslash is dropped and the escaped byte kept as-is. Leaves the
    /// cursor on the closing quote (or at end of input if unterminated).
    fn read_string(&mut self) -> String {
        let mut value = String::new();

        loop {
            self.read_char();

            match self.ch {
                b'"' | 0 => break,
                b'\\' => {
                    self.read_char();

                    match self.ch {
                        b'n' => value.push('\n'),
                        b'r' => value.push('\r'),
                        b't' => value.push('\t'),
                        b'\\' => value.push('\\'),
                        b'"' => value.push('"'),
                        0 => break,
                        other => value.push(other as char),
                    }
                }
                other => value.push(other as char),
            }
        }

        value
    }

    /// Read a `#` comment body up to (not including) the end of the line
    fn read_comment(&mut self) -> String {
        let start = self.position + 1;

        while self.peek_char() != b'\n' && self.peek_char() != 0 {
            self.read_char();
        }

        let body = String::from_utf8_lossy(&self.input[start..self.read_position]).into_owned();

        // leave the cursor on the last comment byte; the caller consumes it
        body
    }
}

fn is_letter(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}
