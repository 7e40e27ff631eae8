#[cfg(test)]
mod parser_tests {
    use pretty_assertions::assert_eq;

    use rlox::ast::{Expr, ExprId, Stmt};
    use rlox::ast_printer::AstPrinter;
    use rlox::scanner::scan;
    use rlox::Parser;

    fn print_expression(source: &str) -> String {
        let (tokens, errors) = scan(source);
        assert!(errors.is_empty());

        let expr = Parser::new(&tokens)
            .parse_expression()
            .unwrap_or_else(|e| panic!("parse failed: {:?}", e));

        AstPrinter::print(&expr)
    }

    fn print_program(source: &str) -> String {
        let (tokens, _) = scan(source);

        let statements = Parser::new(&tokens)
            .parse()
            .unwrap_or_else(|e| panic!("parse failed: {:?}", e));

        AstPrinter::print_program(&statements)
    }

    fn parse_errors(source: &str) -> Vec<String> {
        let (tokens, _) = scan(source);

        match Parser::new(&tokens).parse() {
            Ok(_) => panic!("expected a syntax error in {:?}", source),
            Err(errors) => errors.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_parser_01_precedence() {
        assert_eq!(print_expression("1 + 2 * 3"), "(+ 1.0 (* 2.0 3.0))");
        assert_eq!(print_expression("(1 + 2) * 3"), "(* (group (+ 1.0 2.0)) 3.0)");
        assert_eq!(print_expression("-1 - -2"), "(- (- 1.0) (- 2.0))");
        assert_eq!(print_expression("1 < 2 == !false"), "(== (< 1.0 2.0) (! false))");
    }

    #[test]
    fn test_parser_02_left_associative() {
        assert_eq!(print_expression("1 - 2 - 3"), "(- (- 1.0 2.0) 3.0)");
        assert_eq!(print_expression("8 / 4 / 2"), "(/ (/ 8.0 4.0) 2.0)");
    }

    #[test]
    fn test_parser_03_literals() {
        assert_eq!(print_expression("\"hello\""), "hello");
        assert_eq!(print_expression("2.5"), "2.5");
        assert_eq!(print_expression("nil"), "nil");
        assert_eq!(
            print_expression("1000000000000000000000000"),
            "1000000000000000000000000.0"
        );
        assert_eq!(print_expression("true and false or nil"), "(or (and true false) nil)");
    }

    #[test]
    fn test_parser_04_assignment_is_right_associative() {
        assert_eq!(print_expression("a = b = 3"), "(= a (= b 3.0))");
        assert_eq!(print_expression("obj.field = 1"), "(= (. obj field) 1.0)");
    }

    #[test]
    fn test_parser_05_calls_and_properties() {
        assert_eq!(print_expression("f(1, 2)(3)"), "(call (call f 1.0 2.0) 3.0)");
        assert_eq!(print_expression("a.b.c()"), "(call (. (. a b) c))");
    }

    #[test]
    fn test_parser_06_statements() {
        assert_eq!(
            print_program("var x = 1; { print x; }"),
            "(var x 1.0)\n(block\n  (print x)\n)\n"
        );

        assert_eq!(
            print_program("fun add(a, b) { return a + b; }"),
            "(fun add (a b)\n  (return (+ a b))\n)\n"
        );

        assert_eq!(
            print_program("class B < A { init() { super.init(); } }"),
            "(class B < A\n  (method init ()\n    (; (call (super init)))\n  )\n)\n"
        );
    }

    #[test]
    fn test_parser_06b_single_statement() {
        let (tokens, _) = scan("if (a) print 1; else { var b; }");
        let statements = Parser::new(&tokens).parse().unwrap();

        assert_eq!(
            AstPrinter::print_stmt(&statements[0]),
            "(if a\n  (print 1.0)\nelse\n  (block\n    (var b)\n  )\n)"
        );
    }

    #[test]
    fn test_parser_07_for_desugars_to_while() {
        let (tokens, _) = scan("for (var i = 0; i < 3; i = i + 1) print i;");
        let statements = Parser::new(&tokens).parse().unwrap();

        assert_eq!(statements.len(), 1);

        let Stmt::Block(outer) = &statements[0] else {
            panic!("expected a block, got {:?}", statements[0]);
        };

        assert!(matches!(outer[0], Stmt::Var { .. }));

        let Stmt::While { body, .. } = &outer[1] else {
            panic!("expected a while loop, got {:?}", outer[1]);
        };

        let Stmt::Block(inner) = body.as_ref() else {
            panic!("expected the body block, got {:?}", body);
        };

        assert!(matches!(inner[0], Stmt::Print(_)));
        assert!(matches!(inner[1], Stmt::Expression(Expr::Assign { .. })));
    }

    #[test]
    fn test_parser_08_bare_for_loops_forever() {
        assert_eq!(print_program("for (;;) print 1;"), "(while true\n  (print 1.0)\n)\n");
    }

    #[test]
    fn test_parser_09_error_messages() {
        assert_eq!(
            parse_errors("print 1 +;"),
            vec!["[line 1] Error at ';': Expect expression."]
        );

        assert_eq!(
            parse_errors("var x = 1"),
            vec!["[line 1] Error at end: Expect ';' after variable declaration."]
        );

        assert_eq!(
            parse_errors("(1 + 2"),
            vec!["[line 1] Error at end: Expect ')' after expression."]
        );
    }

    #[test]
    fn test_parser_10_invalid_assignment_target() {
        assert_eq!(
            parse_errors("1 + 2 = 3;"),
            vec!["[line 1] Error at '=': Invalid assignment target."]
        );
    }

    #[test]
    fn test_parser_11_synchronizes_to_next_statement() {
        // One error per broken statement; the valid ones in between are kept.
        let errors = parse_errors("var = 1;\nprint 2;\nprint ;\nvar ok = 3;");

        assert_eq!(
            errors,
            vec![
                "[line 1] Error at '=': Expect variable name.",
                "[line 3] Error at ';': Expect expression.",
            ]
        );
    }

    #[test]
    fn test_parser_12_error_in_block_reports_once() {
        let errors = parse_errors("fun f() {\n  var a = ;\n  print a;\n}");

        assert_eq!(errors, vec!["[line 2] Error at ';': Expect expression."]);
    }

    #[test]
    fn test_parser_13_resumed_ids_do_not_collide() {
        let (first, _) = scan("a; b;");
        let mut parser = Parser::new(&first);
        parser.parse().unwrap();
        let next = parser.next_expr_id();

        assert_eq!(next, ExprId(2));

        let (second, _) = scan("c;");
        let statements = Parser::resume(&second, next).parse().unwrap();

        assert!(matches!(
            statements[0],
            Stmt::Expression(Expr::Variable { id: ExprId(2), .. })
        ));
    }

    #[test]
    fn test_parser_14_parsing_is_deterministic() {
        let (tokens, _) = scan("var a = 1; fun f(x) { return x * a; } print f(2);");

        let first = Parser::new(&tokens).parse().unwrap();
        let second = Parser::new(&tokens).parse().unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_parser_15_argument_limit_is_not_fatal() {
        let args: Vec<&str> = vec!["0"; 256];
        let source = format!("f({});\nprint 1;", args.join(", "));

        assert_eq!(
            parse_errors(&source),
            vec!["[line 1] Error at '0': Can't have more than 255 arguments."]
        );
    }

    #[test]
    fn test_parser_16_parameter_limit_is_not_fatal() {
        let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
        let source = format!("fun g({}) {{ return p0; }}\nprint 1;", params.join(", "));

        assert_eq!(
            parse_errors(&source),
            vec!["[line 1] Error at 'p255': Can't have more than 255 parameters."]
        );
    }

    #[test]
    fn test_parser_17_token_slice_without_eof() {
        assert_eq!(rlox::parse(&[]).unwrap(), vec![]);

        let (tokens, _) = scan("print 1; print 2");
        let without_eof = &tokens[..tokens.len() - 1];

        assert_eq!(rlox::parse(&tokens[..3]).unwrap().len(), 1);

        let errors = rlox::parse(without_eof).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "Expect ';' after value.");
    }
}
