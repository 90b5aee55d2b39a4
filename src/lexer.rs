// ABOUTME: Tokenizer turning source text into a stream of classified lexemes

use nom::{
    bytes::complete::{escaped, take_while, take_while1},
    character::complete::{anychar, char, none_of, one_of},
    combinator::{opt, recognize},
    IResult, Parser,
};

use crate::token::{self, Token, TokenKind};

/// A cursor over the remaining source text. Each call to [`next_token`]
/// skips leading whitespace, classifies the next lexeme, and advances.
///
/// Comments are not part of the language and are not recognized.
///
/// [`next_token`]: Lexer::next_token
pub struct Lexer<'a> {
    rest: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { rest: input }
    }

    /// Returns the next token, or an EOF token at the end of input.
    ///
    /// Malformed lexemes (unknown characters, bad operator runs, bad
    /// numeric suffixes, malformed quoted literals) come back as
    /// `TokenKind::Illegal` carrying the offending text; the lexer never
    /// fails outright.
    pub fn next_token(&mut self) -> Token {
        self.rest = skip_whitespace(self.rest);

        let Some(first) = self.rest.chars().next() else {
            return Token::eof();
        };

        let parsed = if token::punctuator_kind(first).is_some() {
            punctuator(self.rest)
        } else if token::is_operator_symbol(first) {
            operator(self.rest)
        } else if first.is_ascii_digit() {
            number(self.rest)
        } else if first == '\'' {
            char_literal(self.rest)
        } else if first == '"' {
            string_literal(self.rest)
        } else if first.is_ascii_alphabetic() || first == '_' {
            identifier(self.rest)
        } else {
            let len = first.len_utf8();
            let tok = Token::illegal(&self.rest[..len]);
            self.rest = &self.rest[len..];
            return tok;
        };

        match parsed {
            Ok((rest, tok)) => {
                self.rest = rest;
                tok
            }
            Err(_) => {
                // Only the quoted-literal parsers can fail here, and only
                // when the closing quote is missing: the remainder of the
                // input is one bad lexeme.
                let tok = Token::illegal(self.rest);
                self.rest = "";
                tok
            }
        }
    }
}

fn skip_whitespace(input: &str) -> &str {
    let skipped: IResult<&str, &str> =
        take_while(|c: char| matches!(c, ' ' | '\t' | '\r' | '\n'))(input);
    match skipped {
        Ok((rest, _)) => rest,
        Err(_) => input,
    }
}

fn punctuator(input: &str) -> IResult<&str, Token> {
    let (rest, ch) = one_of("()[]{},;.#~")(input)?;
    let tok = match token::punctuator_kind(ch) {
        Some(kind) => Token::new(kind, ch.to_string()),
        None => Token::illegal(ch.to_string()),
    };
    Ok((rest, tok))
}

/// Greedily consumes a run of operator symbols and looks the whole run up
/// in the operator table. `<<=` lexes as one token; `=!` lexes as one
/// illegal token rather than `=` followed by `!`.
fn operator(input: &str) -> IResult<&str, Token> {
    let (rest, run) = take_while1(token::is_operator_symbol)(input)?;
    let tok = match token::operator_kind(run) {
        Some(kind) => Token::new(kind, run),
        None => Token::illegal(run),
    };
    Ok((rest, tok))
}

/// Numeric literals: a greedy run of digits and dots, then a greedy run of
/// suffix letters from {f, u, l} in either case (at most three).
///
/// No dot and no `f` suffix makes an integer; a dot or an `f` suffix makes
/// a float. `f` is valid only on floats and `u` only on integers; more
/// than one dot is never valid. Any other shape is a single illegal token
/// covering the whole run.
fn number(input: &str) -> IResult<&str, Token> {
    let (rest, body) = take_while1(|c: char| c.is_ascii_digit() || c == '.')(input)?;
    let (rest, suffix) =
        take_while(|c: char| matches!(c, 'f' | 'F' | 'u' | 'U' | 'l' | 'L'))(rest)?;

    let lexeme = &input[..body.len() + suffix.len()];
    let dots = body.matches('.').count();
    let f_count = suffix.matches(['f', 'F']).count();
    let u_count = suffix.matches(['u', 'U']).count();
    let l_count = suffix.matches(['l', 'L']).count();

    let kind = if dots > 1 || suffix.len() > 3 {
        TokenKind::Illegal
    } else if dots == 1 || f_count > 0 {
        if f_count <= 1 && u_count == 0 && l_count <= 1 {
            TokenKind::FloatLiteral
        } else {
            TokenKind::Illegal
        }
    } else if u_count <= 1 && l_count <= 2 {
        TokenKind::IntLiteral
    } else {
        TokenKind::Illegal
    };

    Ok((rest, Token::new(kind, lexeme)))
}

/// A single-quoted literal. The lexeme keeps its quotes; the interior must
/// be one character or a two-character backslash escape.
fn char_literal(input: &str) -> IResult<&str, Token> {
    // `escaped` rejects an empty interior, so `opt` lets `''` through to
    // the validity check below instead of failing as unterminated.
    let (rest, lexeme) = recognize((
        char('\''),
        opt(escaped(none_of("'\\"), '\\', anychar)),
        char('\''),
    ))
    .parse(input)?;

    let interior = &lexeme[1..lexeme.len() - 1];
    let count = interior.chars().count();
    let tok = if count == 1 || (count == 2 && interior.starts_with('\\')) {
        Token::new(TokenKind::CharLiteral, lexeme)
    } else {
        Token::illegal(lexeme)
    };
    Ok((rest, tok))
}

/// A double-quoted literal with backslash escapes. The lexeme keeps its
/// quotes; escape processing happens in the parser.
fn string_literal(input: &str) -> IResult<&str, Token> {
    let (rest, lexeme) = recognize((
        char('"'),
        opt(escaped(none_of("\"\\"), '\\', anychar)),
        char('"'),
    ))
    .parse(input)?;
    Ok((rest, Token::new(TokenKind::StringLiteral, lexeme)))
}

fn identifier(input: &str) -> IResult<&str, Token> {
    let (rest, word) = take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)?;
    let kind = token::keyword_kind(word).unwrap_or(TokenKind::Ident);
    Ok((rest, Token::new(kind, word)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token();
            let done = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        tokens
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex_all(input).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_punctuator_tokens() {
        let input = "( ) [ ] { } , ; # . ~";
        let expected = vec![
            (TokenKind::LParen, "("),
            (TokenKind::RParen, ")"),
            (TokenKind::LBracket, "["),
            (TokenKind::RBracket, "]"),
            (TokenKind::LBrace, "{"),
            (TokenKind::RBrace, "}"),
            (TokenKind::Comma, ","),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Hash, "#"),
            (TokenKind::Dot, "."),
            (TokenKind::Tilde, "~"),
            (TokenKind::Eof, ""),
        ];
        for (tok, (kind, lexeme)) in lex_all(input).iter().zip(expected) {
            assert_eq!(tok.kind, kind, "kind mismatch for {:?}", tok.lexeme);
            assert_eq!(tok.lexeme, lexeme);
        }
    }

    #[test]
    fn test_operator_tokens() {
        let input = "-> ++ -- + - * = ! / % << >> < <= > >= == != & ^ | && || ? : += -= *= /= %= &= ^= |= <<= >>=";
        let expected = vec![
            TokenKind::Arrow,
            TokenKind::Increment,
            TokenKind::Decrement,
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Asterisk,
            TokenKind::Assign,
            TokenKind::Not,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Shl,
            TokenKind::Shr,
            TokenKind::Lt,
            TokenKind::Le,
            TokenKind::Gt,
            TokenKind::Ge,
            TokenKind::Eq,
            TokenKind::NotEq,
            TokenKind::Amp,
            TokenKind::Caret,
            TokenKind::Pipe,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Question,
            TokenKind::Colon,
            TokenKind::PlusAssign,
            TokenKind::MinusAssign,
            TokenKind::StarAssign,
            TokenKind::SlashAssign,
            TokenKind::PercentAssign,
            TokenKind::AmpAssign,
            TokenKind::CaretAssign,
            TokenKind::PipeAssign,
            TokenKind::ShlAssign,
            TokenKind::ShrAssign,
            TokenKind::Eof,
        ];
        assert_eq!(kinds(input), expected);
    }

    #[test]
    fn test_keyword_tokens() {
        let input = "auto break case char const continue default do double else enum extern \
                     float for goto if inline int long register restrict return short signed \
                     sizeof static struct switch typedef union unsigned void volatile while \
                     bool string true false";
        let expected = vec![
            TokenKind::Auto,
            TokenKind::Break,
            TokenKind::Case,
            TokenKind::Char,
            TokenKind::Const,
            TokenKind::Continue,
            TokenKind::Default,
            TokenKind::Do,
            TokenKind::Double,
            TokenKind::Else,
            TokenKind::Enum,
            TokenKind::Extern,
            TokenKind::Float,
            TokenKind::For,
            TokenKind::Goto,
            TokenKind::If,
            TokenKind::Inline,
            TokenKind::Int,
            TokenKind::Long,
            TokenKind::Register,
            TokenKind::Restrict,
            TokenKind::Return,
            TokenKind::Short,
            TokenKind::Signed,
            TokenKind::Sizeof,
            TokenKind::Static,
            TokenKind::Struct,
            TokenKind::Switch,
            TokenKind::Typedef,
            TokenKind::Union,
            TokenKind::Unsigned,
            TokenKind::Void,
            TokenKind::Volatile,
            TokenKind::While,
            TokenKind::Bool,
            TokenKind::String,
            TokenKind::True,
            TokenKind::False,
            TokenKind::Eof,
        ];
        assert_eq!(kinds(input), expected);
    }

    #[test]
    fn test_identifier_tokens() {
        let input = "variable_name myFunction _underscore identifier123 main argc argv";
        for tok in lex_all(input) {
            if tok.kind == TokenKind::Eof {
                break;
            }
            assert_eq!(tok.kind, TokenKind::Ident, "lexeme {:?}", tok.lexeme);
        }
        let toks = lex_all(input);
        assert_eq!(toks[0].lexeme, "variable_name");
        assert_eq!(toks[2].lexeme, "_underscore");
        assert_eq!(toks[3].lexeme, "identifier123");
    }

    #[test]
    fn test_numeric_literals() {
        let cases = vec![
            ("42", TokenKind::IntLiteral),
            ("123", TokenKind::IntLiteral),
            ("10u", TokenKind::IntLiteral),
            ("10l", TokenKind::IntLiteral),
            ("10ul", TokenKind::IntLiteral),
            ("10ll", TokenKind::IntLiteral),
            ("3.14", TokenKind::FloatLiteral),
            ("2.5f", TokenKind::FloatLiteral),
            ("2.5F", TokenKind::FloatLiteral),
            ("2.5l", TokenKind::FloatLiteral),
            ("42.", TokenKind::FloatLiteral),
            ("2f", TokenKind::FloatLiteral),
        ];
        for (input, expected) in cases {
            let toks = lex_all(input);
            assert_eq!(toks[0].kind, expected, "input {:?}", input);
            assert_eq!(toks[0].lexeme, input);
            assert_eq!(toks[1].kind, TokenKind::Eof, "input {:?}", input);
        }
    }

    #[test]
    fn test_illegal_numeric_shapes() {
        let cases = vec!["1.2.3", "2.5u", "10uu", "2ff", "1.5ful", "10ulll"];
        for input in cases {
            let toks = lex_all(input);
            assert_eq!(toks[0].kind, TokenKind::Illegal, "input {:?}", input);
        }
    }

    #[test]
    fn test_char_literals() {
        let cases = vec!["'a'", "'Z'", "'0'", "'\\n'", "'\\''", "'\\\\'"];
        for input in cases {
            let toks = lex_all(input);
            assert_eq!(toks[0].kind, TokenKind::CharLiteral, "input {:?}", input);
            assert_eq!(toks[0].lexeme, input);
        }
    }

    #[test]
    fn test_bad_char_literals() {
        // Empty interior and more than one character are illegal.
        assert_eq!(kinds("''")[0], TokenKind::Illegal);
        assert_eq!(kinds("'ab'")[0], TokenKind::Illegal);
        // Unterminated literal swallows the rest of the input.
        let toks = lex_all("'a + b");
        assert_eq!(toks[0].kind, TokenKind::Illegal);
        assert_eq!(toks[1].kind, TokenKind::Eof);
    }

    #[test]
    fn test_string_literals() {
        let cases = vec![
            ("\"hello\"", "\"hello\""),
            ("\"hello world\"", "\"hello world\""),
            ("\"\"", "\"\""),
            ("\"line\\n\"", "\"line\\n\""),
            ("\"say \\\"hi\\\"\"", "\"say \\\"hi\\\"\""),
        ];
        for (input, lexeme) in cases {
            let toks = lex_all(input);
            assert_eq!(toks[0].kind, TokenKind::StringLiteral, "input {:?}", input);
            assert_eq!(toks[0].lexeme, lexeme);
        }
    }

    #[test]
    fn test_unterminated_string() {
        let toks = lex_all("\"no closing quote");
        assert_eq!(toks[0].kind, TokenKind::Illegal);
        assert_eq!(toks[1].kind, TokenKind::Eof);
    }

    #[test]
    fn test_illegal_operator_runs() {
        assert_eq!(kinds("=!")[0], TokenKind::Illegal);
        assert_eq!(kinds("+++")[0], TokenKind::Illegal);
        assert_eq!(kinds("<>")[0], TokenKind::Illegal);
    }

    #[test]
    fn test_unknown_character() {
        let toks = lex_all("@");
        assert_eq!(toks[0].kind, TokenKind::Illegal);
        assert_eq!(toks[0].lexeme, "@");
    }

    #[test]
    fn test_small_program() {
        let input = "int add(int a, int b){ return a + b; }";
        let expected = vec![
            TokenKind::Int,
            TokenKind::Ident,
            TokenKind::LParen,
            TokenKind::Int,
            TokenKind::Ident,
            TokenKind::Comma,
            TokenKind::Int,
            TokenKind::Ident,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::Return,
            TokenKind::Ident,
            TokenKind::Plus,
            TokenKind::Ident,
            TokenKind::Semicolon,
            TokenKind::RBrace,
            TokenKind::Eof,
        ];
        assert_eq!(kinds(input), expected);
    }

    #[test]
    fn test_tokenization_round_trip() {
        // Joining the lexemes of a well-formed program with single spaces
        // must re-tokenize to the same kind sequence.
        let programs = vec![
            "int x = 10; int y = 20; x + y;",
            "int fact(int n){ if(n <= 1){ return 1; } return n * fact(n - 1); }",
            "for(int i = 0; i < 3; i = i + 1){ printf(\"%d\", i); }",
            "char c = 'x'; string s = \"hi\"; float f = 2.5f; bool b = true;",
        ];
        for program in programs {
            let original: Vec<Token> = lex_all(program);
            let rejoined: String = original
                .iter()
                .map(|t| t.lexeme.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let rekinds: Vec<TokenKind> = kinds(&rejoined);
            let orig_kinds: Vec<TokenKind> = original.into_iter().map(|t| t.kind).collect();
            assert_eq!(rekinds, orig_kinds, "program {:?}", program);
        }
    }
}
