//! Human-readable Michelson notation for literals and code, converted to and
//! from [`Micheline`].

use std::{iter::Peekable, str::CharIndices};

use crate::{error::MichelineError, micheline::Micheline};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    LBrace,
    RBrace,
    Semi,
    Int(String),
    Str(String),
    Bytes(Vec<u8>),
    Ident(String),
    Annot(String),
}

impl Token {
    fn starts_argument(&self) -> bool {
        matches!(
            self,
            Token::LParen
                | Token::LBrace
                | Token::Int(_)
                | Token::Str(_)
                | Token::Bytes(_)
                | Token::Ident(_)
        )
    }
}

struct Lexer<'a> {
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<(usize, Token)>, MichelineError> {
        let mut tokens = vec![];

        while let Some(&(offset, c)) = self.chars.peek() {
            let token = match c {
                c if c.is_whitespace() => {
                    self.chars.next();
                    continue;
                }
                '#' => {
                    // line comment
                    while let Some((_, c)) = self.chars.next() {
                        if c == '\n' {
                            break;
                        }
                    }
                    continue;
                }
                '(' => self.single(Token::LParen),
                ')' => self.single(Token::RParen),
                '{' => self.single(Token::LBrace),
                '}' => self.single(Token::RBrace),
                ';' => self.single(Token::Semi),
                '"' => self.string(offset)?,
                '0' if self.is_bytes_prefix() => self.bytes()?,
                '-' | '0'..='9' => self.int(offset)?,
                '%' | '@' | ':' => Token::Annot(self.take_while(is_annot_char)),
                c if c.is_ascii_alphabetic() || c == '_' => {
                    Token::Ident(self.take_while(|c| c.is_ascii_alphanumeric() || c == '_'))
                }
                character => {
                    return Err(MichelineError::UnexpectedCharacter { character, offset })
                }
            };
            tokens.push((offset, token));
        }

        Ok(tokens)
    }

    fn single(&mut self, token: Token) -> Token {
        self.chars.next();
        token
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        // the first character was already matched by the caller
        if let Some((_, c)) = self.chars.next() {
            out.push(c);
        }
        while let Some(&(_, c)) = self.chars.peek() {
            if !accept(c) {
                break;
            }
            out.push(c);
            self.chars.next();
        }
        out
    }

    fn is_bytes_prefix(&self) -> bool {
        let mut lookahead = self.chars.clone();
        lookahead.next();
        matches!(lookahead.peek(), Some((_, 'x')))
    }

    fn bytes(&mut self) -> Result<Token, MichelineError> {
        // skip "0x"
        self.chars.next();
        self.chars.next();
        let mut digits = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if !c.is_ascii_hexdigit() {
                break;
            }
            digits.push(c);
            self.chars.next();
        }
        Ok(Token::Bytes(hex::decode(digits)?))
    }

    fn int(&mut self, offset: usize) -> Result<Token, MichelineError> {
        let literal = self.take_while(|c| c.is_ascii_digit());
        if literal == "-" {
            return Err(MichelineError::UnexpectedCharacter {
                character: '-',
                offset,
            });
        }
        Ok(Token::Int(literal))
    }

    fn string(&mut self, start: usize) -> Result<Token, MichelineError> {
        self.chars.next();
        let mut out = String::new();

        loop {
            let Some((offset, c)) = self.chars.next() else {
                return Err(MichelineError::UnterminatedString(start));
            };
            match c {
                '"' => return Ok(Token::Str(out)),
                '\\' => {
                    let (_, escaped) = self
                        .chars
                        .next()
                        .ok_or(MichelineError::UnterminatedString(start))?;
                    out.push(match escaped {
                        '"' => '"',
                        '\\' => '\\',
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        'b' => '\u{8}',
                        character => {
                            return Err(MichelineError::InvalidEscape { character, offset })
                        }
                    });
                }
                '\n' => return Err(MichelineError::UnterminatedString(start)),
                c => out.push(c),
            }
        }
    }
}

fn is_annot_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '%' | '@')
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    position: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|(_, token)| token)
    }

    fn next(&mut self) -> Result<(usize, Token), MichelineError> {
        let token = self
            .tokens
            .get(self.position)
            .cloned()
            .ok_or(MichelineError::UnexpectedEnd)?;
        self.position += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: Token) -> Result<(), MichelineError> {
        let (offset, token) = self.next()?;
        if token != expected {
            return Err(MichelineError::UnexpectedToken {
                offset,
                found: format!("{token:?}"),
            });
        }
        Ok(())
    }

    fn annotations(&mut self) -> Vec<String> {
        let mut annots = vec![];
        while let Some(Token::Annot(annot)) = self.peek() {
            annots.push(annot.clone());
            self.position += 1;
        }
        annots
    }

    /// an expression in a position where a primitive may take arguments
    /// without parentheses: top level, sequence items, parenthesized groups.
    fn expression(&mut self) -> Result<Micheline, MichelineError> {
        if let Some(Token::Ident(prim)) = self.peek().cloned() {
            self.position += 1;
            let annots = self.annotations();

            let mut args = vec![];
            while self.peek().is_some_and(Token::starts_argument) {
                args.push(self.argument()?);
            }

            return Ok(Micheline::Prim {
                prim,
                args,
                annots,
            });
        }

        self.argument()
    }

    fn argument(&mut self) -> Result<Micheline, MichelineError> {
        let (offset, token) = self.next()?;

        match token {
            Token::Int(int) => Ok(Micheline::Int { int }),
            Token::Str(string) => Ok(Micheline::String { string }),
            Token::Bytes(bytes) => Ok(Micheline::bytes(bytes)),
            Token::Ident(prim) => {
                let annots = self.annotations();
                Ok(Micheline::Prim {
                    prim,
                    args: vec![],
                    annots,
                })
            }
            Token::LParen => {
                let inner = self.expression()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::LBrace => self.sequence(),
            token => Err(MichelineError::UnexpectedToken {
                offset,
                found: format!("{token:?}"),
            }),
        }
    }

    fn sequence(&mut self) -> Result<Micheline, MichelineError> {
        let mut items = vec![];

        loop {
            match self.peek() {
                Some(Token::RBrace) => {
                    self.position += 1;
                    return Ok(Micheline::Seq(items));
                }
                Some(Token::Semi) => {
                    self.position += 1;
                }
                Some(_) => {
                    items.push(self.expression()?);
                    match self.peek() {
                        Some(Token::Semi) | Some(Token::RBrace) => {}
                        Some(_) => {
                            let (offset, token) = self.next()?;
                            return Err(MichelineError::UnexpectedToken {
                                offset,
                                found: format!("{token:?}"),
                            });
                        }
                        None => return Err(MichelineError::UnexpectedEnd),
                    }
                }
                None => return Err(MichelineError::UnexpectedEnd),
            }
        }
    }
}

/// Parses a single Michelson expression, e.g. `"tz1.."`, `Pair 1 (Left Unit)`
/// or `{ DROP ; UNIT }`.
pub fn parse_michelson(input: &str) -> Result<Micheline, MichelineError> {
    let tokens = Lexer::new(input).tokenize()?;
    let mut parser = Parser {
        tokens,
        position: 0,
    };

    let expression = parser.expression()?;

    if let Some((offset, token)) = parser.tokens.get(parser.position) {
        return Err(MichelineError::UnexpectedToken {
            offset: *offset,
            found: format!("{token:?}"),
        });
    }

    Ok(expression)
}

impl Micheline {
    /// Renders the value in Michelson notation.
    pub fn to_michelson(&self) -> String {
        let mut out = String::new();
        self.write_michelson(&mut out, false);
        out
    }

    fn write_michelson(&self, out: &mut String, nested: bool) {
        match self {
            Micheline::Int { int } => out.push_str(int),
            Micheline::String { string } => write_quoted(out, string),
            Micheline::Bytes { bytes } => {
                out.push_str("0x");
                out.push_str(bytes);
            }
            Micheline::Seq(items) => {
                if items.is_empty() {
                    out.push_str("{}");
                    return;
                }
                out.push_str("{ ");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" ; ");
                    }
                    item.write_michelson(out, false);
                }
                out.push_str(" }");
            }
            Micheline::Prim { prim, args, annots } => {
                let wrap = nested && !(args.is_empty() && annots.is_empty());
                if wrap {
                    out.push('(');
                }
                out.push_str(prim);
                for annot in annots {
                    out.push(' ');
                    out.push_str(annot);
                }
                for arg in args {
                    out.push(' ');
                    arg.write_michelson(out, true);
                }
                if wrap {
                    out.push(')');
                }
            }
        }
    }
}

fn write_quoted(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_literal() {
        let value = parse_michelson("\"tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb\"").unwrap();
        assert_eq!(
            value,
            Micheline::string("tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb")
        );
    }

    #[test]
    fn test_parse_nested_prims() {
        let value = parse_michelson("Pair (Pair \"tz1ABC\" (Pair 0 {})) (Pair (Pair Unit {}) (Pair False {}))").unwrap();

        let expected = Micheline::pair(
            Micheline::pair(
                Micheline::string("tz1ABC"),
                Micheline::pair(Micheline::int(0), Micheline::empty_seq()),
            ),
            Micheline::pair(
                Micheline::pair(Micheline::unit(), Micheline::empty_seq()),
                Micheline::pair(Micheline::bool(false), Micheline::empty_seq()),
            ),
        );
        assert_eq!(value, expected);
    }

    #[test]
    fn test_parse_sequence_and_annotations() {
        let value = parse_michelson("{ parameter (unit %default) ; storage nat ; code { CDR ; NIL operation ; PAIR } ; }").unwrap();
        let items = value.as_seq().unwrap();
        assert_eq!(items.len(), 3);

        match &items[0] {
            Micheline::Prim { prim, args, .. } => {
                assert_eq!(prim, "parameter");
                assert_eq!(
                    args[0],
                    Micheline::Prim {
                        prim: "unit".to_string(),
                        args: vec![],
                        annots: vec!["%default".to_string()],
                    }
                );
            }
            other => panic!("unexpected term {other:?}"),
        }

        let (_, code) = items[2].as_prim().unwrap();
        assert_eq!(code[0].as_seq().unwrap().len(), 3);
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(parse_michelson("-42").unwrap(), Micheline::int(-42));
        assert_eq!(
            parse_michelson("0xCAFE").unwrap(),
            Micheline::Bytes {
                bytes: "cafe".to_string()
            }
        );
        assert_eq!(
            parse_michelson(r#""a\"b\\c\n""#).unwrap(),
            Micheline::string("a\"b\\c\n")
        );
        assert_eq!(
            parse_michelson("# comment\n Unit").unwrap(),
            Micheline::unit()
        );
    }

    #[test]
    fn test_parse_bytes_literals() {
        assert_eq!(parse_michelson("0x").unwrap(), Micheline::bytes(b""));
        assert_eq!(
            parse_michelson("Pair 0x00ff Unit").unwrap(),
            Micheline::pair(Micheline::bytes([0x00u8, 0xff]), Micheline::unit())
        );

        assert!(matches!(
            parse_michelson("0xabc"),
            Err(MichelineError::InvalidBytes(_))
        ));
        assert!(matches!(
            parse_michelson("{ 0x1 }"),
            Err(MichelineError::InvalidBytes(_))
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_michelson("\"open"),
            Err(MichelineError::UnterminatedString(0))
        ));
        assert!(matches!(
            parse_michelson("Pair 1 (2"),
            Err(MichelineError::UnexpectedEnd)
        ));
        assert!(matches!(
            parse_michelson("1 2"),
            Err(MichelineError::UnexpectedToken { offset: 2, .. })
        ));
        assert!(matches!(
            parse_michelson("Unit $"),
            Err(MichelineError::UnexpectedCharacter { character: '$', .. })
        ));
    }

    #[test]
    fn test_render_michelson() {
        let value = Micheline::left(Micheline::right(Micheline::pair(
            Micheline::string("tz1ABC"),
            Micheline::int(1),
        )));
        assert_eq!(value.to_michelson(), "Left (Right (Pair \"tz1ABC\" 1))");

        let seq = Micheline::seq(vec![Micheline::unit(), Micheline::bool(true)]);
        assert_eq!(seq.to_michelson(), "{ Unit ; True }");

        assert_eq!(Micheline::string("x\"y").to_michelson(), r#""x\"y""#);
    }

    #[test]
    fn test_render_then_parse_keeps_value() {
        let value = Micheline::pair(
            Micheline::pair(
                Micheline::string("tz1ABC"),
                Micheline::pair(Micheline::int(1), Micheline::int(8)),
            ),
            Micheline::pair(
                Micheline::string("Token 0"),
                Micheline::pair(Micheline::string("TK0"), Micheline::int(0)),
            ),
        );
        assert_eq!(parse_michelson(&value.to_michelson()).unwrap(), value);
    }
}
