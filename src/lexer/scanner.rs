//! Hand-written lexer/scanner for HLSL
//!
//! Converts source code into a stream of tokens, tracking one-based
//! row/column positions (columns counted in characters, so diagnostic
//! markers align even under multibyte source lines).

use super::token::{Keyword, Token, TokenKind};
use crate::errors::{CompileError, CompileResult, SourceArea, SourcePosition};

/// The lexer/scanner for HLSL source code
pub struct Lexer<'src> {
    /// The source code being lexed
    source: &'src str,
    /// Current byte position in the source
    pos: usize,
    /// Current row (one-based)
    row: u32,
    /// Current column (one-based, in characters)
    column: u32,
    /// Position of the current token's first character
    start: SourcePosition,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            row: 1,
            column: 1,
            start: SourcePosition::new(1, 1),
        }
    }

    /// Tokenize the whole source, ending with an `Eof` token
    pub fn tokenize(mut self) -> CompileResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                return Ok(tokens);
            }
        }
    }

    fn position(&self) -> SourcePosition {
        SourcePosition::new(self.row, self.column)
    }

    /// Peek at the current character without consuming it
    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    /// Peek at the next character (one ahead of current)
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advance to the next character and return it
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.row += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Check if we've reached the end of the source
    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// The area from the token start to the current position
    fn current_area(&self) -> SourceArea {
        SourceArea::new(self.start, self.position())
    }

    /// Create a token with the current area
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.current_area())
    }

    fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::lexer(message, self.current_area())
    }

    /// Consume the character if it matches the expected one
    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace(&mut self) -> CompileResult<()> {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r' | '\n') => {
                    self.advance();
                }
                Some('/') if self.peek_next() == Some('/') => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                Some('/') if self.peek_next() == Some('*') => {
                    self.start = self.position();
                    self.advance();
                    self.advance();
                    let mut depth = 1;
                    while depth > 0 {
                        if self.is_at_end() {
                            return Err(self.error("unterminated block comment"));
                        }
                        if self.peek() == Some('/') && self.peek_next() == Some('*') {
                            self.advance();
                            self.advance();
                            depth += 1;
                        } else if self.peek() == Some('*') && self.peek_next() == Some('/') {
                            self.advance();
                            self.advance();
                            depth -= 1;
                        } else {
                            self.advance();
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Scan a number literal (decimal or hex integer, or float)
    fn scan_number(&mut self) -> CompileResult<Token> {
        let start_byte = self.pos;

        if self.peek() == Some('0') && matches!(self.peek_next(), Some('x' | 'X')) {
            self.advance();
            self.advance();
            let digits_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.advance();
            }
            let digits = &self.source[digits_start..self.pos];
            let value = i64::from_str_radix(digits, 16)
                .map_err(|_| self.error(format!("invalid hex literal '0x{}'", digits)))?;
            return Ok(self.make_token(TokenKind::Integer(value)));
        }

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        let mut is_float = false;
        if self.peek() == Some('.') {
            is_float = true;
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = &self.source[start_byte..self.pos];

        // type suffixes: f/h make the literal a float, u/l are consumed
        match self.peek() {
            Some('f' | 'F' | 'h' | 'H') => {
                is_float = true;
                self.advance();
            }
            Some('u' | 'U' | 'l' | 'L') => {
                self.advance();
            }
            _ => {}
        }

        if is_float {
            let value: f64 = text
                .parse()
                .map_err(|_| self.error(format!("invalid float literal '{}'", text)))?;
            Ok(self.make_token(TokenKind::Float(value)))
        } else {
            let value: i64 = text
                .parse()
                .map_err(|_| self.error(format!("invalid integer literal '{}'", text)))?;
            Ok(self.make_token(TokenKind::Integer(value)))
        }
    }

    /// Scan an identifier or keyword
    fn scan_ident(&mut self) -> Token {
        let start_byte = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }
        let text = &self.source[start_byte..self.pos];
        match Keyword::from_str(text) {
            Some(kw) => self.make_token(TokenKind::Keyword(kw)),
            None => self.make_token(TokenKind::Ident(text.to_string())),
        }
    }

    /// Scan a string literal
    fn scan_string(&mut self) -> CompileResult<Token> {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.advance() {
                None | Some('\n') => return Err(self.error("unterminated string literal")),
                Some('"') => break,
                Some('\\') => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('\\') => value.push('\\'),
                    Some('"') => value.push('"'),
                    Some('0') => value.push('\0'),
                    other => {
                        return Err(self.error(format!(
                            "invalid escape sequence '\\{}'",
                            other.map(String::from).unwrap_or_default()
                        )))
                    }
                },
                Some(c) => value.push(c),
            }
        }
        Ok(self.make_token(TokenKind::String(value)))
    }

    /// Scan the next token
    fn next_token(&mut self) -> CompileResult<Token> {
        self.skip_whitespace()?;
        self.start = self.position();

        let Some(c) = self.peek() else {
            return Ok(self.make_token(TokenKind::Eof));
        };

        if c.is_ascii_digit() {
            return self.scan_number();
        }
        if c == '.' && self.peek_next().is_some_and(|n| n.is_ascii_digit()) {
            return self.scan_number();
        }
        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(self.scan_ident());
        }
        if c == '"' {
            return self.scan_string();
        }

        self.advance();
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '?' => TokenKind::Question,
            '~' => TokenKind::Tilde,

            '+' => {
                if self.match_char('+') {
                    TokenKind::PlusPlus
                } else if self.match_char('=') {
                    TokenKind::PlusEq
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.match_char('-') {
                    TokenKind::MinusMinus
                } else if self.match_char('=') {
                    TokenKind::MinusEq
                } else {
                    TokenKind::Minus
                }
            }
            '*' => {
                if self.match_char('=') {
                    TokenKind::StarEq
                } else {
                    TokenKind::Star
                }
            }
            '/' => {
                if self.match_char('=') {
                    TokenKind::SlashEq
                } else {
                    TokenKind::Slash
                }
            }
            '%' => {
                if self.match_char('=') {
                    TokenKind::PercentEq
                } else {
                    TokenKind::Percent
                }
            }
            '&' => {
                if self.match_char('&') {
                    TokenKind::AmpAmp
                } else if self.match_char('=') {
                    TokenKind::AmpEq
                } else {
                    TokenKind::Amp
                }
            }
            '|' => {
                if self.match_char('|') {
                    TokenKind::PipePipe
                } else if self.match_char('=') {
                    TokenKind::PipeEq
                } else {
                    TokenKind::Pipe
                }
            }
            '^' => {
                if self.match_char('=') {
                    TokenKind::CaretEq
                } else {
                    TokenKind::Caret
                }
            }
            '!' => {
                if self.match_char('=') {
                    TokenKind::BangEq
                } else {
                    TokenKind::Bang
                }
            }
            '=' => {
                if self.match_char('=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Eq
                }
            }
            '<' => {
                if self.match_char('<') {
                    if self.match_char('=') {
                        TokenKind::LtLtEq
                    } else {
                        TokenKind::LtLt
                    }
                } else if self.match_char('=') {
                    TokenKind::LtEq
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.match_char('>') {
                    if self.match_char('=') {
                        TokenKind::GtGtEq
                    } else {
                        TokenKind::GtGt
                    }
                } else if self.match_char('=') {
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }

            other => return Err(self.error(format!("unexpected character '{}'", other))),
        };

        Ok(self.make_token(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .expect("lexing should succeed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        let tokens = lex("( ) { } [ ] ; : , . ?");
        assert_eq!(
            tokens,
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::Semicolon,
                TokenKind::Colon,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Question,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        let tokens = lex("+ - * / % & | ^ ~ !");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::Amp,
                TokenKind::Pipe,
                TokenKind::Caret,
                TokenKind::Tilde,
                TokenKind::Bang,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_compound_operators() {
        let tokens = lex("== != <= >= << >> <<= >>= && || += ++ --");
        assert_eq!(
            tokens,
            vec![
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::LtLt,
                TokenKind::GtGt,
                TokenKind::LtLtEq,
                TokenKind::GtGtEq,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::PlusEq,
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = lex("42 0x1F 1.5 2.0f .5 1e3 3u");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Integer(42),
                TokenKind::Integer(0x1F),
                TokenKind::Float(1.5),
                TokenKind::Float(2.0),
                TokenKind::Float(0.5),
                TokenKind::Float(1e3),
                TokenKind::Integer(3),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords() {
        let tokens = lex("struct typedef cbuffer if else for while return discard");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Keyword(Keyword::Struct),
                TokenKind::Keyword(Keyword::Typedef),
                TokenKind::Keyword(Keyword::CBuffer),
                TokenKind::Keyword(Keyword::If),
                TokenKind::Keyword(Keyword::Else),
                TokenKind::Keyword(Keyword::For),
                TokenKind::Keyword(Keyword::While),
                TokenKind::Keyword(Keyword::Return),
                TokenKind::Keyword(Keyword::Discard),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers_and_type_names() {
        // type names like float4 stay identifiers; the parser resolves them
        let tokens = lex("float4 _weight Texture2D lightDir0");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Ident("float4".to_string()),
                TokenKind::Ident("_weight".to_string()),
                TokenKind::Keyword(Keyword::Texture2D),
                TokenKind::Ident("lightDir0".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments() {
        let tokens = lex("a // line comment\nb /* block /* nested */ */ c");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Ident("a".to_string()),
                TokenKind::Ident("b".to_string()),
                TokenKind::Ident("c".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strings() {
        let tokens = lex(r#""hello" "tab\there""#);
        assert_eq!(
            tokens,
            vec![
                TokenKind::String("hello".to_string()),
                TokenKind::String("tab\there".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = Lexer::new("a\n  bb").tokenize().unwrap();
        assert_eq!(tokens[0].area.begin, SourcePosition::new(1, 1));
        assert_eq!(tokens[0].area.end, SourcePosition::new(1, 2));
        assert_eq!(tokens[1].area.begin, SourcePosition::new(2, 3));
        assert_eq!(tokens[1].area.end, SourcePosition::new(2, 5));
    }

    #[test]
    fn test_multibyte_columns() {
        // the multibyte char counts as one column
        let tokens = Lexer::new("\"é\" x").tokenize().unwrap();
        assert_eq!(tokens[1].area.begin, SourcePosition::new(1, 5));
    }

    #[test]
    fn test_lexer_errors() {
        assert!(Lexer::new("\"unterminated").tokenize().is_err());
        assert!(Lexer::new("/* open").tokenize().is_err());
        assert!(Lexer::new("a @ b").tokenize().is_err());
    }

    #[test]
    fn test_sample_shader_code() {
        let tokens = lex(r#"
            float4 main(float2 uv : TEXCOORD0) : SV_Target {
                float3 color = tex2D(samp, uv).rgb;
                return float4(color, 1.0);
            }
            "#);
        assert!(tokens.len() > 30);
        assert!(matches!(tokens.last(), Some(TokenKind::Eof)));
    }
}
