#[cfg(test)]
mod scanner_tests {
    use lox_interpreter as lox;

    use lox::error::LoxError;
    use lox::scanner::*;
    use lox::token::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
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
    fn test_two_char_operators_and_comments() {
        assert_token_sequence(
            "!= == <= >= // ignored to end of line\n/ !",
            &[
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::SLASH, "/"),
                (TokenType::BANG, "!"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_token_sequence(
            "class fun orchid _under this",
            &[
                (TokenType::CLASS, "class"),
                (TokenType::FUN, "fun"),
                (TokenType::IDENTIFIER, "orchid"),
                (TokenType::IDENTIFIER, "_under"),
                (TokenType::THIS, "this"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_display_format() {
        let (tokens, errors) = Scanner::new("var x = 3;\n\"hi\" 2.5").scan_tokens();
        assert!(errors.is_empty());

        let rendered: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "VAR var null",
                "IDENTIFIER x null",
                "EQUAL = null",
                "NUMBER 3 3.0",
                "SEMICOLON ; null",
                "STRING \"hi\" hi",
                "NUMBER 2.5 2.5",
                "EOF  null",
            ]
        );
    }

    #[rstest]
    #[case("0", 0.0)]
    #[case("42", 42.0)]
    #[case("0.1", 0.1)]
    #[case("3.14159", 3.14159)]
    #[case("123456.789", 123456.789)]
    #[case("1000000000000000", 1e15)]
    #[case("9007199254740991", 9_007_199_254_740_991.0)]
    fn test_number_literal_keeps_its_value(#[case] source: &str, #[case] expected: f64) {
        let (tokens, errors) = Scanner::new(source).scan_tokens();
        assert!(errors.is_empty());

        assert_eq!(tokens[0].literal(), Some(lox::ast::LiteralValue::Number(expected)));
        assert_eq!(tokens[0].lexeme, source);
    }

    #[test]
    fn test_number_does_not_swallow_trailing_dot() {
        assert_token_sequence(
            "123.",
            &[
                (TokenType::NUMBER(123.0), "123"),
                (TokenType::DOT, "."),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_multiline_string_advances_line() {
        let (tokens, errors) = Scanner::new("\"a\nb\"\nx").scan_tokens();
        assert!(errors.is_empty());

        assert_eq!(tokens[0].literal(), Some(lox::ast::LiteralValue::Str("a\nb".into())));
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, errors) = Scanner::new("print \"oops").scan_tokens();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "[line 1] Error: Unterminated string.");
        assert_eq!(tokens.last().map(|t| t.token_type.clone()), Some(TokenType::EOF));
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let scanner = Scanner::new(source);

        // Collect all results (both tokens and errors)
        let results: Vec<_> = scanner.collect();

        // 0: COMMA ','
        // 1: DOT '.'
        // 2: Error for '$'
        // 3: LEFT_PAREN '('
        // 4: Error for '#'
        // 5: EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let error_count = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(error_count, 2, "Expected 2 error messages");

        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert_eq!(err.to_string(), "[line 1] Error: Unexpected character.");
        }

        fn assert_token_matches(
            result: &Result<Token, LoxError>,
            expected_type: TokenType,
            expected_lexeme: &str,
        ) {
            match result {
                Ok(token) => {
                    assert_eq!(
                        token.token_type, expected_type,
                        "Expected token type {:?}, got {:?}",
                        expected_type, token.token_type
                    );
                    assert_eq!(
                        token.lexeme, expected_lexeme,
                        "Expected lexeme '{}', got '{}'",
                        expected_lexeme, token.lexeme
                    );
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }

    #[test]
    fn test_non_ascii_character_is_one_error() {
        let (tokens, errors) = Scanner::new("é1").scan_tokens();

        assert_eq!(errors.len(), 1);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].lexeme, "1");
    }
}
