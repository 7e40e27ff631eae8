use crate::ast::{Expr, FunctionDecl, LiteralValue, Stmt};

/// Renders syntax trees in a parenthesised prefix form, e.g.
/// `(+ 1.0 (* 2.0 3.0))`.  Debugging aid only; nothing downstream parses it.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr<'_>) -> String {
        match expr {
            Expr::Literal(lit) => match lit {
                LiteralValue::True => "true".into(),

                LiteralValue::False => "false".into(),

                LiteralValue::Nil => "nil".into(),

                LiteralValue::Str(s) => s.clone(),

                LiteralValue::Number(n) => {
                    if n.fract() == 0.0 {
                        // 3 → 3.0
                        format!("{}.0", n)
                    } else {
                        n.to_string()
                    }
                }
            },

            Expr::Grouping(inner) => parenthesize("group", &[inner.as_ref()]),

            Expr::Unary { operator, right } => parenthesize(operator.lexeme, &[right.as_ref()]),

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => parenthesize(operator.lexeme, &[left.as_ref(), right.as_ref()]),

            Expr::Variable { name, .. } => name.lexeme.into(),

            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, Self::print(value))
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut s = format!("(call {}", Self::print(callee));
                for arg in arguments {
                    s.push(' ');
                    s.push_str(&Self::print(arg));
                }
                s.push(')');
                s
            }

            Expr::Get { object, name } => format!("(. {} {})", Self::print(object), name.lexeme),

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "(= (. {} {}) {})",
                Self::print(object),
                name.lexeme,
                Self::print(value)
            ),

            Expr::This { .. } => "this".into(),

            Expr::Super { method, .. } => format!("(super {})", method.lexeme),
        }
    }

    /// Statements, one per line, nested blocks indented by two spaces.
    pub fn print_program(statements: &[Stmt<'_>]) -> String {
        let mut out = String::new();
        for stmt in statements {
            Self::print_stmt_into(stmt, 0, &mut out);
        }
        out
    }

    pub fn print_stmt(stmt: &Stmt<'_>) -> String {
        let mut out = String::new();
        Self::print_stmt_into(stmt, 0, &mut out);
        out.trim_end().to_string()
    }

    fn print_stmt_into(stmt: &Stmt<'_>, depth: usize, out: &mut String) {
        let pad = "  ".repeat(depth);

        match stmt {
            Stmt::Expression(expr) => out.push_str(&format!("{}(; {})\n", pad, Self::print(expr))),

            Stmt::Print(expr) => out.push_str(&format!("{}(print {})\n", pad, Self::print(expr))),

            Stmt::Var { name, initializer } => match initializer {
                Some(init) => out.push_str(&format!(
                    "{}(var {} {})\n",
                    pad,
                    name.lexeme,
                    Self::print(init)
                )),
                None => out.push_str(&format!("{}(var {})\n", pad, name.lexeme)),
            },

            Stmt::Block(statements) => {
                out.push_str(&format!("{}(block\n", pad));
                for s in statements {
                    Self::print_stmt_into(s, depth + 1, out);
                }
                out.push_str(&format!("{})\n", pad));
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                out.push_str(&format!("{}(if {}\n", pad, Self::print(condition)));
                Self::print_stmt_into(then_branch, depth + 1, out);
                if let Some(else_branch) = else_branch {
                    out.push_str(&format!("{}else\n", pad));
                    Self::print_stmt_into(else_branch, depth + 1, out);
                }
                out.push_str(&format!("{})\n", pad));
            }

            Stmt::While { condition, body } => {
                out.push_str(&format!("{}(while {}\n", pad, Self::print(condition)));
                Self::print_stmt_into(body, depth + 1, out);
                out.push_str(&format!("{})\n", pad));
            }

            Stmt::Function(function) => Self::print_function(function, "fun", depth, out),

            Stmt::Return { value, .. } => match value {
                Some(value) => out.push_str(&format!("{}(return {})\n", pad, Self::print(value))),
                None => out.push_str(&format!("{}(return)\n", pad)),
            },

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                match superclass {
                    Some(superclass) => out.push_str(&format!(
                        "{}(class {} < {}\n",
                        pad,
                        name.lexeme,
                        Self::print(superclass)
                    )),
                    None => out.push_str(&format!("{}(class {}\n", pad, name.lexeme)),
                }
                for method in methods {
                    Self::print_function(method, "method", depth + 1, out);
                }
                out.push_str(&format!("{})\n", pad));
            }
        }
    }

    fn print_function(function: &FunctionDecl<'_>, kind: &str, depth: usize, out: &mut String) {
        let pad = "  ".repeat(depth);
        let params: Vec<&str> = function.params.iter().map(|p| p.lexeme).collect();

        out.push_str(&format!(
            "{}({} {} ({})\n",
            pad,
            kind,
            function.name.lexeme,
            params.join(" ")
        ));
        for s in &function.body {
            Self::print_stmt_into(s, depth + 1, out);
        }
        out.push_str(&format!("{})\n", pad));
    }
}

fn parenthesize(name: &str, exprs: &[&Expr<'_>]) -> String {
    let mut s = format!("({}", name);
    for expr in exprs {
        s.push(' ');
        s.push_str(&AstPrinter::print(expr));
    }
    s.push(')');
    s
}
