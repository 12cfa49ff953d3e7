//! Query lexer (tokenizer).
//!
//! Converts a query string into a stream of tokens for the parser. Splitting
//! happens on whitespace outside quotes; the reserved characters
//! `( ) ! ~ : = < >` terminate a word and become operator tokens of their
//! own (`>=`, `<=` and `!=` lex as single two-character operators).
//! Backslash escapes the following character, both inside and outside
//! quotes, so reserved characters can appear in values.

use std::{iter::Peekable, str::Chars};

use crate::error::LexError;

/// The lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A bare word (search term, field code or value).
    Word,
    /// A quoted phrase (quotes stripped, content preserved verbatim).
    Phrase,
    /// A reserved operator: `( ) ! ~ : = != < <= > >=`.
    Operator,
    /// One of the keywords `and`, `or`, `not` (folded to lowercase).
    Keyword,
}

/// A token in the query language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Lexical class.
    pub kind: TokenKind,
    /// Token text. Keywords are lowercased; phrases have quotes stripped.
    pub text: String,
    /// Byte offset of the token's first character in the input.
    pub offset: usize,
}

impl Token {
    /// Creates a token.
    fn new(kind: TokenKind, text: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            offset,
        }
    }

    /// True if this token is the given operator.
    pub fn is_operator(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == symbol
    }

    /// True if this token is the given keyword.
    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == word
    }

    /// True if this token carries free text (a word or a quoted phrase).
    pub fn is_string(&self) -> bool {
        matches!(self.kind, TokenKind::Word | TokenKind::Phrase)
    }
}

/// Characters that terminate a bare word and lex as operators.
const RESERVED: [char; 8] = ['!', '<', '>', '=', '~', '(', ')', ':'];

/// Tokenizes a query string.
struct Lexer<'a> {
    /// The original input string.
    input: &'a str,
    /// Character iterator with one-character lookahead.
    chars: Peekable<Chars<'a>>,
    /// Current byte position in input.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    /// Creates an error at a specific position.
    fn error_at(&self, message: impl Into<String>, position: usize) -> LexError {
        LexError::new(message, position, self.input)
    }

    /// Tokenizes the entire input, returning all tokens or an error.
    fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Returns the next token, or None at end of input.
    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace();

        let Some(&ch) = self.chars.peek() else {
            return Ok(None);
        };

        let start = self.position;

        // Two-character operators need not be whitespace separated.
        if let Some(op) = self.peek_two_char_operator() {
            self.advance();
            self.advance();
            return Ok(Some(Token::new(TokenKind::Operator, op, start)));
        }

        if ch == '"' {
            return self.read_phrase().map(Some);
        }

        if RESERVED.contains(&ch) {
            self.advance();
            return Ok(Some(Token::new(TokenKind::Operator, ch, start)));
        }

        self.read_word().map(Some)
    }

    /// Checks whether the input continues with `>=`, `<=` or `!=`.
    fn peek_two_char_operator(&self) -> Option<&'static str> {
        let rest = &self.input[self.position..];
        ["!=", ">=", "<="].into_iter().find(|op| rest.starts_with(op))
    }

    /// Reads a quoted phrase, handling backslash escapes.
    fn read_phrase(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        self.advance(); // consume opening quote

        let mut content = String::new();

        loop {
            match self.chars.peek() {
                Some(&'"') => {
                    self.advance(); // consume closing quote
                    return Ok(Token::new(TokenKind::Phrase, content, start));
                }
                Some(&'\\') => {
                    self.advance();
                    match self.chars.peek() {
                        Some(&escaped) => {
                            content.push(escaped);
                            self.advance();
                        }
                        None => {
                            return Err(self.error_at("escape at end of input", start));
                        }
                    }
                }
                Some(&ch) => {
                    content.push(ch);
                    self.advance();
                }
                None => {
                    return Err(self.error_at("unterminated quote", start));
                }
            }
        }
    }

    /// Reads a bare word or keyword, handling backslash escapes.
    fn read_word(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let mut word = String::new();

        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() || RESERVED.contains(&ch) {
                break;
            }
            if ch == '"' {
                return Err(self.error_at("quote must start a new phrase", self.position));
            }
            if ch == '\\' {
                self.advance();
                match self.chars.peek() {
                    Some(&escaped) => {
                        word.push(escaped);
                        self.advance();
                    }
                    None => {
                        return Err(self.error_at("escape at end of input", start));
                    }
                }
                continue;
            }
            word.push(ch);
            self.advance();
        }

        // Unquoted and/or/not are keywords, case-insensitively.
        if word.eq_ignore_ascii_case("and")
            || word.eq_ignore_ascii_case("or")
            || word.eq_ignore_ascii_case("not")
        {
            return Ok(Token::new(TokenKind::Keyword, word.to_lowercase(), start));
        }

        Ok(Token::new(TokenKind::Word, word, start))
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Advances to the next character.
    fn advance(&mut self) {
        if let Some(ch) = self.chars.next() {
            self.position += ch.len_utf8();
        }
    }
}

/// Tokenizes a query string.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, offset: usize) -> Token {
        Token::new(TokenKind::Word, text, offset)
    }

    fn op(text: &str, offset: usize) -> Token {
        Token::new(TokenKind::Operator, text, offset)
    }

    fn kw(text: &str, offset: usize) -> Token {
        Token::new(TokenKind::Keyword, text, offset)
    }

    #[test]
    fn empty_input() {
        assert_eq!(tokenize("").unwrap(), vec![]);
        assert_eq!(tokenize("   ").unwrap(), vec![]);
    }

    #[test]
    fn single_word() {
        assert_eq!(tokenize("tove").unwrap(), vec![word("tove", 0)]);
    }

    #[test]
    fn multiple_words() {
        assert_eq!(
            tokenize("tove jansson").unwrap(),
            vec![word("tove", 0), word("jansson", 5)]
        );
    }

    #[test]
    fn quoted_phrase() {
        assert_eq!(
            tokenize("\"winter book\"").unwrap(),
            vec![Token::new(TokenKind::Phrase, "winter book", 0)]
        );
    }

    #[test]
    fn phrase_preserves_reserved_chars() {
        assert_eq!(
            tokenize("\"a:b (c)\"").unwrap(),
            vec![Token::new(TokenKind::Phrase, "a:b (c)", 0)]
        );
    }

    #[test]
    fn unterminated_quote_error() {
        let err = tokenize("\"winter book").unwrap_err();
        assert_eq!(err.position, 0);
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn keywords_fold_case() {
        assert_eq!(
            tokenize("a AND b Or c not d").unwrap(),
            vec![
                word("a", 0),
                kw("and", 2),
                word("b", 6),
                kw("or", 8),
                word("c", 11),
                kw("not", 13),
                word("d", 17),
            ]
        );
    }

    #[test]
    fn quoted_keyword_is_a_phrase() {
        assert_eq!(
            tokenize("\"and\"").unwrap(),
            vec![Token::new(TokenKind::Phrase, "and", 0)]
        );
    }

    #[test]
    fn code_condition() {
        assert_eq!(
            tokenize("title:winter").unwrap(),
            vec![word("title", 0), op(":", 5), word("winter", 6)]
        );
    }

    #[test]
    fn comparison_operators_without_whitespace() {
        assert_eq!(
            tokenize("year>=1950").unwrap(),
            vec![word("year", 0), op(">=", 4), word("1950", 6)]
        );
        assert_eq!(
            tokenize("year<=1999").unwrap(),
            vec![word("year", 0), op("<=", 4), word("1999", 6)]
        );
        assert_eq!(
            tokenize("year!=1999").unwrap(),
            vec![word("year", 0), op("!=", 4), word("1999", 6)]
        );
        assert_eq!(
            tokenize("year<1999").unwrap(),
            vec![word("year", 0), op("<", 4), word("1999", 5)]
        );
    }

    #[test]
    fn parens_and_negation() {
        assert_eq!(
            tokenize("!(a b)").unwrap(),
            vec![op("!", 0), op("(", 1), word("a", 2), word("b", 4), op(")", 5)]
        );
    }

    #[test]
    fn escaped_reserved_char_stays_in_word() {
        assert_eq!(tokenize("a\\:b").unwrap(), vec![word("a:b", 0)]);
    }

    #[test]
    fn escape_in_phrase() {
        assert_eq!(
            tokenize("\"say \\\"hi\\\"\"").unwrap(),
            vec![Token::new(TokenKind::Phrase, "say \"hi\"", 0)]
        );
    }

    #[test]
    fn escape_at_end_of_input_error() {
        let err = tokenize("abc\\").unwrap_err();
        assert!(err.message.contains("escape"));
    }

    #[test]
    fn quote_inside_word_error() {
        let err = tokenize("abc\"def\"").unwrap_err();
        assert_eq!(err.position, 3);
    }

    #[test]
    fn offsets_follow_multibyte_input() {
        let tokens = tokenize("hä st:x").unwrap();
        assert_eq!(tokens[0], word("hä", 0));
        assert_eq!(tokens[1], word("st", 4));
        assert_eq!(tokens[2], op(":", 6));
        assert_eq!(tokens[3], word("x", 7));
    }

    #[test]
    fn complex_query() {
        assert_eq!(
            tokenize("author:Bergman and (genre:poetry or genre:prose)").unwrap(),
            vec![
                word("author", 0),
                op(":", 6),
                word("Bergman", 7),
                kw("and", 15),
                op("(", 19),
                word("genre", 20),
                op(":", 25),
                word("poetry", 26),
                kw("or", 33),
                word("genre", 36),
                op(":", 41),
                word("prose", 42),
                op(")", 47),
            ]
        );
    }
}
