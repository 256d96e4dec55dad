use winnow::combinator::{alt, cut_err, opt};
use winnow::error::ErrMode;
use winnow::prelude::*;
use winnow::token::{any, one_of, take_till, take_while};

use crate::scanner::token::{Token, TokenKind, keyword_kind};

/// Lazy tokenizer over a source buffer. The compiler pulls one token at a
/// time; once the input is exhausted every further call returns `Eof`.
#[derive(Debug)]
pub struct Scanner<'src> {
    rest: &'src str,
    line: usize,
}

struct RawToken<'src> {
    kind: TokenKind,
    lexeme: &'src str,
    newlines: usize,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            rest: source,
            line: 1,
        }
    }

    /// Scan and return the next token. Scan failures are reported in-band as
    /// `TokenKind::Error` tokens carrying the diagnostic message.
    pub fn next_token(&mut self) -> Token<'src> {
        if let Ok(newlines) = trivia(&mut self.rest) {
            self.line += newlines;
        }
        if self.rest.is_empty() {
            return Token::new(TokenKind::Eof, "", self.line);
        }
        let before = self.rest;
        match scan_token(&mut self.rest) {
            Ok(raw) => {
                self.line += raw.newlines;
                Token::new(raw.kind, raw.lexeme, self.line)
            }
            Err(ErrMode::Cut(_)) => {
                // Only the string scanner cuts: the closing quote never came,
                // so the rest of the input (newlines included) is spent.
                self.line += before.matches('\n').count();
                self.rest = "";
                Token::error("Unterminated string.", self.line)
            }
            Err(_) => {
                let _: ModalResult<char> = any.parse_next(&mut self.rest);
                Token::error("Unexpected character.", self.line)
            }
        }
    }
}

/// Skip whitespace and `//` line comments, returning the newline count.
fn trivia(input: &mut &str) -> ModalResult<usize> {
    let mut newlines = 0;
    loop {
        let ws: &str = take_while(0.., |c: char| {
            c == ' ' || c == '\t' || c == '\r' || c == '\n'
        })
        .parse_next(input)?;
        newlines += ws.matches('\n').count();
        if input.starts_with("//") {
            take_till(0.., '\n').void().parse_next(input)?;
        } else if ws.is_empty() {
            break;
        }
    }
    Ok(newlines)
}

fn scan_token<'src>(input: &mut &'src str) -> ModalResult<RawToken<'src>> {
    alt((
        string_literal,
        number_literal,
        identifier_or_keyword,
        two_char_token,
        single_char_token,
    ))
    .parse_next(input)
}

fn string_literal<'src>(input: &mut &'src str) -> ModalResult<RawToken<'src>> {
    '"'.parse_next(input)?;
    let body: &str = take_till(0.., '"').parse_next(input)?;
    cut_err('"').void().parse_next(input)?;
    Ok(RawToken {
        kind: TokenKind::String,
        lexeme: body,
        newlines: body.matches('\n').count(),
    })
}

fn number_literal<'src>(input: &mut &'src str) -> ModalResult<RawToken<'src>> {
    let lexeme = (
        take_while(1.., '0'..='9'),
        opt(('.', take_while(1.., '0'..='9'))),
    )
        .take()
        .parse_next(input)?;
    Ok(RawToken {
        kind: TokenKind::Number,
        lexeme,
        newlines: 0,
    })
}

fn identifier_or_keyword<'src>(input: &mut &'src str) -> ModalResult<RawToken<'src>> {
    let lexeme = (
        one_of(('a'..='z', 'A'..='Z', '_')),
        take_while(0.., ('a'..='z', 'A'..='Z', '0'..='9', '_')),
    )
        .take()
        .parse_next(input)?;
    Ok(RawToken {
        kind: keyword_kind(lexeme).unwrap_or(TokenKind::Identifier),
        lexeme,
        newlines: 0,
    })
}

fn two_char_token<'src>(input: &mut &'src str) -> ModalResult<RawToken<'src>> {
    let (kind, lexeme) = alt((
        "!=".value((TokenKind::BangEqual, "!=")),
        "==".value((TokenKind::EqualEqual, "==")),
        ">=".value((TokenKind::GreaterEqual, ">=")),
        "<=".value((TokenKind::LessEqual, "<=")),
    ))
    .parse_next(input)?;
    Ok(RawToken {
        kind,
        lexeme,
        newlines: 0,
    })
}

fn single_char_token<'src>(input: &mut &'src str) -> ModalResult<RawToken<'src>> {
    let lexeme = one_of(|c: char| "(){},.;-+/*!=<>".contains(c))
        .take()
        .parse_next(input)?;
    let kind = match lexeme {
        "(" => TokenKind::LeftParen,
        ")" => TokenKind::RightParen,
        "{" => TokenKind::LeftBrace,
        "}" => TokenKind::RightBrace,
        "," => TokenKind::Comma,
        "." => TokenKind::Dot,
        ";" => TokenKind::Semicolon,
        "-" => TokenKind::Minus,
        "+" => TokenKind::Plus,
        "/" => TokenKind::Slash,
        "*" => TokenKind::Star,
        "!" => TokenKind::Bang,
        "=" => TokenKind::Equal,
        "<" => TokenKind::Less,
        ">" => TokenKind::Greater,
        _ => unreachable!("one_of guarantees an operator character"),
    };
    Ok(RawToken {
        kind,
        lexeme,
        newlines: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(source: &str) -> Vec<Token<'_>> {
        let mut scanner = Scanner::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = scanner.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    fn kinds(tokens: &[Token<'_>]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn single_char_tokens() {
        let tokens = scan_all("(){},.-+;/*");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Minus,
                TokenKind::Plus,
                TokenKind::Semicolon,
                TokenKind::Slash,
                TokenKind::Star,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_char_tokens() {
        let tokens = scan_all("!= == >= <=");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::BangEqual,
                TokenKind::EqualEqual,
                TokenKind::GreaterEqual,
                TokenKind::LessEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn single_then_equal() {
        let tokens = scan_all("! = < >");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Bang,
                TokenKind::Equal,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_lexeme_excludes_quotes() {
        let tokens = scan_all("\"hello world\"");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, "hello world");
    }

    #[test]
    fn string_counts_embedded_newlines() {
        let tokens = scan_all("\"one\ntwo\" 3");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[1].kind, TokenKind::Number);
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn unterminated_string_is_error_token() {
        let tokens = scan_all("\"no end");
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[0].lexeme, "Unterminated string.");
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn number_integer_and_decimal() {
        let tokens = scan_all("42 3.14");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].lexeme, "42");
        assert_eq!(tokens[1].kind, TokenKind::Number);
        assert_eq!(tokens[1].lexeme, "3.14");
    }

    #[test]
    fn number_no_trailing_dot() {
        let tokens = scan_all("42.foo");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].lexeme, "42");
        assert_eq!(tokens[1].kind, TokenKind::Dot);
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
    }

    #[test]
    fn all_keywords() {
        let source =
            "and class else false fun for if nil or print return super this true var while";
        let tokens = scan_all(source);
        let expected = vec![
            TokenKind::And,
            TokenKind::Class,
            TokenKind::Else,
            TokenKind::False,
            TokenKind::Fun,
            TokenKind::For,
            TokenKind::If,
            TokenKind::Nil,
            TokenKind::Or,
            TokenKind::Print,
            TokenKind::Return,
            TokenKind::Super,
            TokenKind::This,
            TokenKind::True,
            TokenKind::Var,
            TokenKind::While,
            TokenKind::Eof,
        ];
        assert_eq!(kinds(&tokens), expected);
    }

    #[test]
    fn near_keywords_are_identifiers() {
        let tokens = scan_all("fals truely _nil nilly");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_ignored() {
        let tokens = scan_all("1 // this is a comment\n2");
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Number, TokenKind::Number, TokenKind::Eof]
        );
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn newlines_advance_line_counter() {
        let tokens = scan_all("1\n2\n\n3");
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[2].line, 4);
        assert_eq!(tokens[3].line, 4); // Eof
    }

    #[test]
    fn unexpected_character_error() {
        let tokens = scan_all("1 ~ 2");
        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(tokens[1].lexeme, "Unexpected character.");
        // The offending byte is consumed; scanning continues.
        assert_eq!(tokens[2].kind, TokenKind::Number);
    }

    #[test]
    fn eof_repeats() {
        let mut scanner = Scanner::new("");
        assert_eq!(scanner.next_token().kind, TokenKind::Eof);
        assert_eq!(scanner.next_token().kind, TokenKind::Eof);
    }
}
