#[cfg(test)]
mod scanner_tests {
    use pretty_assertions::assert_eq;

    use rlox::scanner::*;
    use rlox::token::*;
    use rlox::LoxError;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    fn rendered(source: &str) -> Vec<String> {
        let (tokens, errors) = scan(source);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);

        tokens.iter().map(ToString::to_string).collect()
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
    fn test_scanner_02_two_char_operators() {
        assert_token_sequence(
            "! != = == < <= > >= /",
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
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_identifiers() {
        assert_token_sequence(
            "var language = nil; classy class _under",
            &[
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "language"),
                (TokenType::EQUAL, "="),
                (TokenType::NIL, "nil"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::IDENTIFIER, "classy"),
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "_under"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_display_format() {
        assert_eq!(
            rendered("var x = 42; \"hi\" 3.14"),
            vec![
                "VAR var null",
                "IDENTIFIER x null",
                "EQUAL = null",
                "NUMBER 42 42.0",
                "SEMICOLON ; null",
                "STRING \"hi\" hi",
                "NUMBER 3.14 3.14",
                "EOF  null",
            ]
        );

        // Integral literals beyond the i64 range keep their ".0".
        assert_eq!(
            rendered("1000000000000000000000000")[0],
            "NUMBER 1000000000000000000000000 1000000000000000000000000.0"
        );
    }

    #[test]
    fn test_scanner_05_comments_and_lines() {
        let (tokens, errors) = scan("// nothing here\nprint 1; // trailing\n\nprint 2;");

        assert!(errors.is_empty());
        assert_eq!(tokens.len(), 7);
        assert_eq!(tokens[0].token_type, TokenType::PRINT);
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[3].line, 4);
        assert_eq!(tokens[6].token_type, TokenType::EOF);
        assert_eq!(tokens[6].line, 4);
    }

    #[test]
    fn test_scanner_06_number_edges() {
        // A trailing dot is not part of the number, a leading one never is.
        assert_token_sequence(
            "123. .5",
            &[
                (TokenType::NUMBER(0.0), "123"),
                (TokenType::DOT, "."),
                (TokenType::DOT, "."),
                (TokenType::NUMBER(0.0), "5"),
                (TokenType::EOF, ""),
            ],
        );

        let (tokens, _) = scan("12.50");
        assert_eq!(tokens[0].literal(), Some(Literal::Number(12.5)));
    }

    #[test]
    fn test_scanner_07_multiline_string() {
        let (tokens, errors) = scan("\"one\ntwo\" x");

        assert!(errors.is_empty());
        assert_eq!(tokens[0].literal(), Some(Literal::Str("one\ntwo")));
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_scanner_08_unterminated_string() {
        let (tokens, errors) = scan("print \"oops");

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].token_type, TokenType::EOF);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "[line 1] Error: Unterminated string.");
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let results: Vec<Result<Token, LoxError>> = Scanner::new(source).collect();

        // COMMA, DOT, error for '$', LEFT_PAREN, error for '#', EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(ToString::to_string)
            .collect();

        assert_eq!(
            errors,
            vec![
                "[line 1] Error: Unexpected character.",
                "[line 1] Error: Unexpected character.",
            ]
        );

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
    fn test_scanner_09_exactly_one_eof() {
        let mut scanner = Scanner::new("");

        assert!(matches!(scanner.next(), Some(Ok(t)) if t.token_type == TokenType::EOF));
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }
}
