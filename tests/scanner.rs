use treelox::scanner::Scanner;
use treelox::token::{Token, TokenType};

fn scan(source: &str) -> (Vec<Token>, Vec<treelox::error::LoxError>) {
    Scanner::new(source.as_bytes()).tokenize()
}

fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
    let (tokens, errors) = scan(source);

    assert!(errors.is_empty(), "unexpected lex errors: {:?}", errors);
    assert_eq!(tokens.len(), expected.len(), "token count for {:?}", source);

    for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
        assert_eq!(actual.token_type, *expected_type);
        assert_eq!(actual.lexeme, *expected_lexeme);
    }
}

#[test]
fn symbols() {
    assert_token_sequence(
        "({*.,+*})",
        &[
            (TokenType::LEFT_PAREN, "("),
            (TokenType::LEFT_BRACE, "{"),
            (TokenType::STAR, "*"),
            (TokenType::DOT, "."),
            (TokenType::COMMA, ","),
            (TokenType::PLUS, "+"),
            (TokenType::STAR, "*"),
            (TokenType::RIGHT_BRACE, "}"),
            (TokenType::RIGHT_PAREN, ")"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn operators_longest_match() {
    assert_token_sequence(
        "! != = == < <= > >= / ;",
        &[
            (TokenType::BANG, "!"),
            (TokenType::BANG_EQUAL, "!="),
            (TokenType::EQUAL, "="),
            (TokenType::EQUAL_EQUAL, "=="),
            (TokenType::LESS, "<"),
            (TokenType::LESS_EQUAL, "<="),
            (TokenType::GREATER, ">"),
            (TokenType::GREATER_EQUAL, ">="),
            (TokenType::SLASH, "/"),
            (TokenType::SEMICOLON, ";"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn keywords() {
    assert_token_sequence(
        "and class else false for fun if nil or print return super this true var while",
        &[
            (TokenType::AND, "and"),
            (TokenType::CLASS, "class"),
            (TokenType::ELSE, "else"),
            (TokenType::FALSE, "false"),
            (TokenType::FOR, "for"),
            (TokenType::FUN, "fun"),
            (TokenType::IF, "if"),
            (TokenType::NIL, "nil"),
            (TokenType::OR, "or"),
            (TokenType::PRINT, "print"),
            (TokenType::RETURN, "return"),
            (TokenType::SUPER, "super"),
            (TokenType::THIS, "this"),
            (TokenType::TRUE, "true"),
            (TokenType::VAR, "var"),
            (TokenType::WHILE, "while"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn identifiers() {
    assert_token_sequence(
        "andy formless fo _ _123 _abc ab123 \
         abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890_",
        &[
            (TokenType::IDENTIFIER, "andy"),
            (TokenType::IDENTIFIER, "formless"),
            (TokenType::IDENTIFIER, "fo"),
            (TokenType::IDENTIFIER, "_"),
            (TokenType::IDENTIFIER, "_123"),
            (TokenType::IDENTIFIER, "_abc"),
            (TokenType::IDENTIFIER, "ab123"),
            (
                TokenType::IDENTIFIER,
                "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890_",
            ),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn number_literals() {
    let (tokens, errors) = scan("123 3.14 0");

    assert!(errors.is_empty());

    match tokens[0].token_type {
        TokenType::NUMBER(n) => assert_eq!(n, 123.0),
        ref other => panic!("expected NUMBER, got {:?}", other),
    }

    match tokens[1].token_type {
        TokenType::NUMBER(n) => assert_eq!(n, 3.14),
        ref other => panic!("expected NUMBER, got {:?}", other),
    }

    match tokens[2].token_type {
        TokenType::NUMBER(n) => assert_eq!(n, 0.0),
        ref other => panic!("expected NUMBER, got {:?}", other),
    }
}

#[test]
fn number_followed_by_dot_is_not_a_fraction() {
    // "1." scans as the number 1 followed by a DOT token: the fractional
    // part requires a digit after the dot.
    assert_token_sequence(
        "1.",
        &[
            (TokenType::NUMBER(0.0), "1"),
            (TokenType::DOT, "."),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn string_literals_keep_quotes_in_lexeme_only() {
    let (tokens, errors) = scan("\"abc\"");

    assert!(errors.is_empty());
    assert_eq!(tokens[0].lexeme, "\"abc\"");

    match &tokens[0].token_type {
        TokenType::STRING(s) => assert_eq!(s, "abc"),
        other => panic!("expected STRING, got {:?}", other),
    }
}

#[test]
fn multi_line_string_advances_line_counter() {
    let (tokens, errors) = scan("\"a\nb\"\nx");

    assert!(errors.is_empty());

    // The string closes on line 2; `x` sits on line 3.
    assert_eq!(tokens[1].lexeme, "x");
    assert_eq!(tokens[1].line, 3);
}

#[test]
fn unterminated_string_is_an_error_and_scanning_finishes() {
    let (tokens, errors) = scan("\"abc");

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message(), "Unterminated string.");

    // Still exactly one EOF token.
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].token_type, TokenType::EOF);
}

#[test]
fn comments_and_whitespace_produce_no_tokens() {
    assert_token_sequence(
        "// a comment\n123 // trailing\n",
        &[(TokenType::NUMBER(0.0), "123"), (TokenType::EOF, "")],
    );
}

#[test]
fn unexpected_characters_are_collected_without_aborting() {
    let (tokens, errors) = scan(",.$(#");

    // Valid tokens survive on both sides of the bad bytes.
    assert_token_types(
        &tokens,
        &[
            TokenType::COMMA,
            TokenType::DOT,
            TokenType::LEFT_PAREN,
            TokenType::EOF,
        ],
    );

    assert_eq!(errors.len(), 2);

    for error in &errors {
        assert!(
            error.message().contains("Unexpected character"),
            "unexpected message: {}",
            error
        );
    }

    fn assert_token_types(tokens: &[Token], expected: &[TokenType]) {
        assert_eq!(tokens.len(), expected.len());

        for (actual, expected) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected);
        }
    }
}

#[test]
fn empty_source_yields_exactly_one_eof() {
    let (tokens, errors) = scan("");

    assert!(errors.is_empty());
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].token_type, TokenType::EOF);
}

#[test]
fn byte_spans_cover_the_lexeme() {
    let (tokens, errors) = scan("var x = 12;");

    assert!(errors.is_empty());

    assert_eq!((tokens[0].start, tokens[0].end), (0, 3)); // var
    assert_eq!((tokens[1].start, tokens[1].end), (4, 5)); // x
    assert_eq!((tokens[3].start, tokens[3].end), (8, 10)); // 12
}
