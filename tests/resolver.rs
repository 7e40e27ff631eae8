mod common;

#[cfg(test)]
mod resolver_tests {
    use pretty_assertions::assert_eq;

    use rlox::ast::{Expr, ExprId, Stmt};
    use rlox::{resolve, scan, Locals, Parser};

    use crate::common::run_err;

    fn resolve_source(source: &str) -> Result<Locals, Vec<String>> {
        let (tokens, _) = scan(source);
        let statements = Parser::new(&tokens).parse().unwrap();

        resolve(&statements).map_err(|errors| errors.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn test_resolver_01_globals_are_not_recorded() {
        let locals = resolve_source("var a = 1; print a; a = 2;").unwrap();

        assert!(locals.is_empty());
    }

    #[test]
    fn test_resolver_02_local_distances() {
        let (tokens, _) = scan("{ var a = 1; { print a; } }");
        let statements = Parser::new(&tokens).parse().unwrap();
        let locals = resolve(&statements).unwrap();

        let Stmt::Block(outer) = &statements[0] else {
            panic!("expected a block");
        };
        let Stmt::Block(inner) = &outer[1] else {
            panic!("expected a nested block");
        };
        let Stmt::Print(Expr::Variable { id, .. }) = &inner[0] else {
            panic!("expected print of a variable");
        };

        assert_eq!(locals.get(id), Some(&1));
    }

    #[test]
    fn test_resolver_03_closure_captures_parameter() {
        let locals = resolve_source("fun outer(x) { fun inner() { return x; } }").unwrap();

        // `x` inside `inner` is one function scope out.
        assert_eq!(locals.values().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_resolver_04_this_and_super_depths() {
        let locals = resolve_source(
            "class A { m() {} }\nclass B < A { m() { super.m(); return this; } }",
        )
        .unwrap();

        // super: body scope → this scope → super scope; this: one less.
        let mut depths: Vec<(ExprId, usize)> = locals.into_iter().collect();
        depths.sort();
        let depths: Vec<usize> = depths.into_iter().map(|(_, d)| d).collect();

        assert_eq!(depths, vec![2, 1]);
    }

    #[test]
    fn test_resolver_05_read_in_own_initializer() {
        assert_eq!(
            resolve_source("{ var a = a; }").unwrap_err(),
            vec!["[line 1] Error at 'a': Can't read local variable in its own initializer."]
        );

        // Globals may refer to themselves; the lookup simply fails at runtime.
        assert!(resolve_source("var a = a;").is_ok());
    }

    #[test]
    fn test_resolver_06_redeclaration() {
        assert_eq!(
            resolve_source("fun f() { var a = 1; var a = 2; }").unwrap_err(),
            vec!["[line 1] Error at 'a': Already a variable with this name in this scope."]
        );

        assert!(resolve_source("var a = 1; var a = 2;").is_ok());
    }

    #[test]
    fn test_resolver_07_misplaced_return() {
        assert_eq!(
            resolve_source("return 1;").unwrap_err(),
            vec!["[line 1] Error at 'return': Can't return from top-level code."]
        );

        assert_eq!(
            resolve_source("class A { init() { return 1; } }").unwrap_err(),
            vec!["[line 1] Error at 'return': Can't return a value from an initializer."]
        );

        // A bare return inside init is allowed.
        assert!(resolve_source("class A { init() { return; } }").is_ok());
    }

    #[test]
    fn test_resolver_08_misplaced_this_and_super() {
        assert_eq!(
            resolve_source("print this;").unwrap_err(),
            vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
        );

        assert_eq!(
            resolve_source("fun f() { super.m(); }").unwrap_err(),
            vec!["[line 1] Error at 'super': Can't use 'super' outside of a class."]
        );

        assert_eq!(
            resolve_source("class A { m() { super.m(); } }").unwrap_err(),
            vec!["[line 1] Error at 'super': Can't use 'super' in a class with no superclass."]
        );
    }

    #[test]
    fn test_resolver_09_self_inheritance() {
        assert_eq!(
            resolve_source("class A < A {}").unwrap_err(),
            vec!["[line 1] Error at 'A': A class can't inherit from itself."]
        );
    }

    #[test]
    fn test_resolver_10_errors_accumulate() {
        let errors = resolve_source("return;\nprint this;").unwrap_err();

        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_resolver_11_static_errors_stop_execution() {
        assert_eq!(
            run_err("print \"before\";\nreturn;"),
            vec!["[line 2] Error at 'return': Can't return from top-level code."]
        );
    }
}
