//! Tree‑walking evaluator.
//!
//! The interpreter executes statements against a chain of [`Environment`]s.
//! Variable references that the resolver bound to a local scope are read
//! exactly `distance` links outward; everything else is a late‑bound global.
//! `print` output goes to the sink `W` supplied at construction.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use chrono::Utc;
use log::{debug, info};
use thiserror::Error;

use crate::ast::{Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::environment::{EnvRef, Environment};
use crate::error::LoxError;
use crate::object::{LoxClass, LoxFunction, LoxInstance};
use crate::resolver::Locals;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Ways evaluation can stop early.  `ReturnSignal` is not a failure: it
/// unwinds a `return` through nested blocks and loops up to the call that
/// is waiting for the value.
#[derive(Error, Debug)]
pub enum InterpretError<'a> {
    #[error(transparent)]
    Runtime(#[from] LoxError),

    #[error("Return signal with value: {0}")]
    ReturnSignal(Value<'a>),
}

/// Convenient alias for interpreter results.
pub type IResult<'a, T> = Result<T, InterpretError<'a>>;

pub struct Interpreter<'a, W: Write = io::Stdout> {
    globals: EnvRef<'a>,
    environment: EnvRef<'a>,
    locals: HashMap<ExprId, usize>,
    out: W,
}

impl<'a> Interpreter<'a, io::Stdout> {
    /// Interpreter printing to standard output.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl<'a> Default for Interpreter<'a, io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, W: Write> Interpreter<'a, W> {
    /// Creates an interpreter writing `print` output to `out` and defines the
    /// native functions (`clock`).
    pub fn with_output(out: W) -> Self {
        info!("Initializing Interpreter");

        let globals: EnvRef<'a> = Environment::new().into_ref();

        debug!("Defining native function 'clock'");

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction {
                name: "clock",
                arity: 0,
                func: |_args: &[Value<'a>]| {
                    Ok(Value::Number(Utc::now().timestamp_millis() as f64 / 1000.0))
                },
            },
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            out,
        }
    }

    /// The `print` sink.
    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Merge scope distances computed by the resolver.
    pub fn extend_locals(&mut self, locals: Locals) {
        debug!("Recording {} resolved reference(s)", locals.len());

        self.locals.extend(locals);
    }

    /// Runs a program.  A runtime error aborts the top‑level statement it
    /// occurred in; the remaining statements still run.  All runtime errors
    /// are returned in order.
    pub fn interpret(&mut self, statements: &'a [Stmt<'a>]) -> Result<(), Vec<LoxError>> {
        info!("Interpreting {} statement(s)", statements.len());

        let mut errors: Vec<LoxError> = Vec::new();

        for stmt in statements {
            match self.execute(stmt) {
                Ok(()) => {}

                Err(InterpretError::Runtime(e)) => {
                    debug!("Runtime error: {}", e);
                    errors.push(e);
                }

                // The resolver rejects top-level `return`.
                Err(InterpretError::ReturnSignal(_)) => {}
            }
        }

        if errors.is_empty() {
            info!("Interpretation completed successfully");
            Ok(())
        } else {
            info!("Interpretation finished with {} error(s)", errors.len());
            Err(errors)
        }
    }

    // ───────────────────────────── statements ─────────────────────────────

    fn execute(&mut self, stmt: &'a Stmt<'a>) -> IResult<'a, ()> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }

            Stmt::Print(expr) => {
                let value: Value<'a> = self.evaluate(expr)?;
                writeln!(self.out, "{}", value).map_err(LoxError::from)?;
                debug!("Printed value: {}", value);
            }

            Stmt::Var { name, initializer } => {
                let value: Value<'a> = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);

                self.environment.borrow_mut().define(name.lexeme, value);
            }

            Stmt::Block(statements) => {
                let scope: EnvRef<'a> =
                    Environment::with_enclosing(Rc::clone(&self.environment)).into_ref();

                self.execute_block(statements, scope)?;
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)?;
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);

                let function =
                    LoxFunction::new(declaration, Rc::clone(&self.environment), false);

                self.environment
                    .borrow_mut()
                    .define(declaration.name.lexeme, Value::Function(Rc::new(function)));
            }

            Stmt::Return { value, .. } => {
                let value: Value<'a> = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Returning value: {}", value);

                return Err(InterpretError::ReturnSignal(value));
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.define_class(name, superclass.as_ref(), methods)?,
        }

        Ok(())
    }

    /// Run `statements` inside `scope`, restoring the previous environment
    /// afterwards whether they finish, fail or return.
    fn execute_block(&mut self, statements: &'a [Stmt<'a>], scope: EnvRef<'a>) -> IResult<'a, ()> {
        let previous: EnvRef<'a> = std::mem::replace(&mut self.environment, scope);

        let result = statements.iter().try_for_each(|stmt| self.execute(stmt));

        self.environment = previous;

        result
    }

    fn define_class(
        &mut self,
        name: &'a Token<'a>,
        superclass: Option<&'a Expr<'a>>,
        methods: &'a [FunctionDecl<'a>],
    ) -> IResult<'a, ()> {
        debug!("Defining class '{}'", name.lexeme);

        // Bound first so methods can refer to the class by name.  A failed
        // superclass lookup leaves the name bound to nil.
        self.environment.borrow_mut().define(name.lexeme, Value::Nil);

        let superclass: Option<Rc<LoxClass<'a>>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),
                _ => {
                    let token: &'a Token<'a> = match expr {
                        Expr::Variable { name: super_name, .. } => *super_name,
                        _ => name,
                    };

                    return Err(LoxError::runtime(token, "Superclass must be a class.").into());
                }
            },
            None => None,
        };

        // Methods of a subclass close over an extra scope holding `super`.
        let method_scope: EnvRef<'a> = match &superclass {
            Some(superclass) => {
                let mut scope = Environment::with_enclosing(Rc::clone(&self.environment));
                scope.define("super", Value::Class(Rc::clone(superclass)));
                scope.into_ref()
            }
            None => Rc::clone(&self.environment),
        };

        let table: HashMap<&'a str, Rc<LoxFunction<'a>>> = methods
            .iter()
            .map(|method| {
                let is_initializer: bool = method.name.lexeme == "init";
                let function = LoxFunction::new(method, Rc::clone(&method_scope), is_initializer);

                (method.name.lexeme, Rc::new(function))
            })
            .collect();

        let class = LoxClass::new(name.lexeme, superclass, table);

        self.environment
            .borrow_mut()
            .assign(name, Value::Class(Rc::new(class)))?;

        Ok(())
    }

    // ───────────────────────────── expressions ────────────────────────────

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &'a Expr<'a>) -> IResult<'a, Value<'a>> {
        let value: Value<'a> = match expr {
            Expr::Literal(literal) => match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            },

            Expr::Grouping(inner) => self.evaluate(inner)?,

            Expr::Unary { operator, right } => {
                let right: Value<'a> = self.evaluate(right)?;
                self.evaluate_unary(operator, right)?
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left: Value<'a> = self.evaluate(left)?;
                let right: Value<'a> = self.evaluate(right)?;
                self.evaluate_binary(operator, left, right)?
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left: Value<'a> = self.evaluate(left)?;

                let short_circuit: bool = if operator.token_type == TokenType::OR {
                    left.is_truthy()
                } else {
                    !left.is_truthy()
                };

                if short_circuit {
                    left
                } else {
                    self.evaluate(right)?
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name)?,

            Expr::Assign { id, name, value } => {
                let value: Value<'a> = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        Environment::assign_at(&self.environment, distance, name, value.clone())?
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                value
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee: Value<'a> = self.evaluate(callee)?;

                let mut args: Vec<Value<'a>> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.evaluate(argument)?);
                }

                self.call_value(callee, paren, args)?
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => LoxInstance::get(&instance, name)?,
                _ => return Err(LoxError::runtime(name, "Only instances have properties.").into()),
            },

            Expr::Set {
                object,
                name,
                value,
            } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    let value: Value<'a> = self.evaluate(value)?;
                    instance.borrow_mut().set(name, value.clone());
                    value
                }
                _ => return Err(LoxError::runtime(name, "Only instances have fields.").into()),
            },

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword)?,

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method)?,
        };

        Ok(value)
    }

    fn evaluate_unary(&self, operator: &Token<'a>, right: Value<'a>) -> IResult<'a, Value<'a>> {
        match (&operator.token_type, right) {
            (TokenType::BANG, right) => Ok(Value::Bool(!right.is_truthy())),
            (TokenType::MINUS, Value::Number(n)) => Ok(Value::Number(-n)),
            _ => Err(LoxError::runtime(operator, "Operand must be a number.").into()),
        }
    }

    fn evaluate_binary(
        &self,
        operator: &Token<'a>,
        left: Value<'a>,
        right: Value<'a>,
    ) -> IResult<'a, Value<'a>> {
        debug!(
            "Binary {} on {} and {}",
            operator.lexeme,
            left.type_name(),
            right.type_name()
        );

        let value: Value<'a> = match (&operator.token_type, left, right) {
            (TokenType::EQUAL_EQUAL, l, r) => Value::Bool(l == r),
            (TokenType::BANG_EQUAL, l, r) => Value::Bool(l != r),

            (TokenType::PLUS, Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            (TokenType::PLUS, Value::String(a), Value::String(b)) => Value::String(a + &b),
            (TokenType::PLUS, _, _) => {
                return Err(LoxError::runtime(
                    operator,
                    "Operands must be two numbers or two strings.",
                )
                .into())
            }

            (TokenType::MINUS, Value::Number(a), Value::Number(b)) => Value::Number(a - b),
            (TokenType::STAR, Value::Number(a), Value::Number(b)) => Value::Number(a * b),
            (TokenType::SLASH, Value::Number(a), Value::Number(b)) => Value::Number(a / b),
            (TokenType::GREATER, Value::Number(a), Value::Number(b)) => Value::Bool(a > b),
            (TokenType::GREATER_EQUAL, Value::Number(a), Value::Number(b)) => Value::Bool(a >= b),
            (TokenType::LESS, Value::Number(a), Value::Number(b)) => Value::Bool(a < b),
            (TokenType::LESS_EQUAL, Value::Number(a), Value::Number(b)) => Value::Bool(a <= b),

            _ => return Err(LoxError::runtime(operator, "Operands must be numbers.").into()),
        };

        Ok(value)
    }

    fn look_up_variable(&self, id: ExprId, name: &Token<'a>) -> IResult<'a, Value<'a>> {
        let value: Value<'a> = match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name)?,
            None => self.globals.borrow().get(name)?,
        };

        debug!("Variable '{}' evaluated to: {}", name.lexeme, value);

        Ok(value)
    }

    /// `super.method`: find `method` starting at the superclass captured when
    /// the enclosing class was declared, and bind it to the current `this`,
    /// which lives one scope inside the `super` scope.
    fn evaluate_super(
        &self,
        id: ExprId,
        keyword: &Token<'a>,
        method: &Token<'a>,
    ) -> IResult<'a, Value<'a>> {
        let unresolved = || LoxError::runtime(keyword, "Can't use 'super' here.");

        let distance: usize = *self.locals.get(&id).ok_or_else(unresolved)?;

        let superclass: Rc<LoxClass<'a>> =
            match Environment::get_name_at(&self.environment, distance, "super") {
                Some(Value::Class(class)) => class,
                _ => return Err(unresolved().into()),
            };

        let object: Value<'a> = distance
            .checked_sub(1)
            .and_then(|d| Environment::get_name_at(&self.environment, d, "this"))
            .ok_or_else(unresolved)?;

        match superclass.find_method(method.lexeme) {
            Some(found) => Ok(Value::Function(Rc::new(found.bind(object)))),
            None => Err(LoxError::runtime(
                method,
                format!("Undefined property '{}'.", method.lexeme),
            )
            .into()),
        }
    }

    // ───────────────────────────── calls ──────────────────────────────────

    /// Invokes a native function, user function or class.
    fn call_value(
        &mut self,
        callee: Value<'a>,
        paren: &Token<'a>,
        args: Vec<Value<'a>>,
    ) -> IResult<'a, Value<'a>> {
        match callee {
            Value::NativeFunction { name, arity, func } => {
                check_arity(paren, arity, args.len())?;
                debug!("Calling native function '{}'", name);

                func(&args).map_err(|message| LoxError::runtime(paren, message).into())
            }

            Value::Function(function) => {
                check_arity(paren, function.arity(), args.len())?;

                self.call_function(&function, args)
            }

            Value::Class(class) => {
                check_arity(paren, class.arity(), args.len())?;
                debug!("Instantiating class '{}'", class.name);

                let instance = Rc::new(RefCell::new(LoxInstance::new(Rc::clone(&class))));

                // The initializer runs for its side effects; the call always
                // yields the new instance.
                if let Some(initializer) = class.find_method("init") {
                    let bound = initializer.bind(Value::Instance(Rc::clone(&instance)));
                    self.call_function(&bound, args)?;
                }

                Ok(Value::Instance(instance))
            }

            _ => Err(LoxError::runtime(paren, "Can only call functions and classes.").into()),
        }
    }

    fn call_function(
        &mut self,
        function: &LoxFunction<'a>,
        args: Vec<Value<'a>>,
    ) -> IResult<'a, Value<'a>> {
        debug!("Calling user-defined function '{}'", function.name());

        let mut scope = Environment::with_enclosing(Rc::clone(&function.closure));
        for (param, arg) in function.declaration.params.iter().zip(args) {
            scope.define(param.lexeme, arg);
        }

        let declaration: &'a FunctionDecl<'a> = function.declaration;

        let returned: Value<'a> = match self.execute_block(&declaration.body, scope.into_ref()) {
            Ok(()) => Value::Nil,
            Err(InterpretError::ReturnSignal(value)) => value,
            Err(e) => return Err(e),
        };

        if function.is_initializer {
            return Ok(Environment::get_name_at(&function.closure, 0, "this").unwrap_or(Value::Nil));
        }

        info!("Function '{}' returned: {}", function.name(), returned);

        Ok(returned)
    }
}

fn check_arity<'a>(paren: &Token<'a>, expected: usize, got: usize) -> IResult<'a, ()> {
    if expected == got {
        Ok(())
    } else {
        Err(LoxError::runtime(
            paren,
            format!("Expected {} arguments but got {}.", expected, got),
        )
        .into())
    }
}
