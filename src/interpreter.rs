//! Tree-walking evaluator.
//!
//! Statements and expressions are evaluated directly against the AST, in
//! post-order and strict left-to-right operand order, with a chain of
//! [`Environment`]s providing lexical scope. Unlike the parser, which
//! collects every error it can find, evaluation is fail-fast: the first
//! runtime error aborts all remaining statements and propagates to the
//! caller.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, info};
use thiserror::Error;

use crate::environment::Environment;
use crate::expr::Expr;
use crate::stmt::Stmt;
use crate::token::{Token, TokenType};
use crate::value::{Class, Function, Instance, Value};

#[derive(Error, Debug)]
pub enum InterpretError {
    #[error("Runtime error: {0}")]
    RuntimeError(String),

    /// Unwinding signal for `return`: carries the returned value up to the
    /// nearest enclosing call, which absorbs it. Escapes `interpret` only
    /// for a stray top-level `return`, where it becomes a runtime error.
    #[error("Return signal with value: {0}")]
    ReturnSignal(Value),
}

/// Convenient alias for interpreter results.
pub type IResult<T> = Result<T, InterpretError>;

pub struct Interpreter {
    environment: Rc<RefCell<Environment>>,

    /// Everything `print` has written, one entry per statement, in order.
    /// The same text goes to stdout; tests read it from here.
    pub output: Vec<String>,
}

impl Interpreter {
    pub fn new() -> Self {
        info!("Initializing Interpreter");

        Self {
            environment: Rc::new(RefCell::new(Environment::new())),
            output: Vec::new(),
        }
    }

    /// Interprets a list of statements (a "program"). Stops at the first
    /// runtime error.
    pub fn interpret(&mut self, statements: &[Stmt]) -> IResult<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            if let Err(e) = self.execute(stmt) {
                return Err(match e {
                    InterpretError::ReturnSignal(_) => InterpretError::RuntimeError(
                        "Cannot return from top-level code".to_string(),
                    ),
                    other => other,
                });
            }
        }

        info!("Interpretation completed successfully");

        Ok(())
    }

    /// Executes a single statement and returns its value: expression
    /// statements and blocks yield the value they evaluate to, most other
    /// statements yield `Nil`.
    pub fn execute(&mut self, stmt: &Stmt) -> IResult<Value> {
        match stmt {
            Stmt::Expression(expr) => self.evaluate(expr),

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                let text = value.to_string();

                println!("{}", text);

                self.output.push(text);

                Ok(Value::Nil)
            }

            Stmt::Var(name, initializer) => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(Value::Nil)
            }

            Stmt::Block(statements) => {
                let previous = self.environment.clone();

                self.environment = Rc::new(RefCell::new(Environment::with_enclosing(
                    previous.clone(),
                )));

                let result = self.execute_all(statements);

                self.environment = previous;

                result
            }

            Stmt::If(condition, then_branch, else_branch) => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(Value::Nil)
                }
            }

            Stmt::While(condition, body) => {
                while is_truthy(&self.evaluate(condition)?) {
                    self.execute(body)?;
                }

                Ok(Value::Nil)
            }

            Stmt::For(initializer, condition, post, body) => {
                // The loop's own scope wraps the init clause; the body
                // block creates its per-iteration children underneath it.
                let previous = self.environment.clone();

                self.environment = Rc::new(RefCell::new(Environment::with_enclosing(
                    previous.clone(),
                )));

                let result = self.run_for(initializer, condition, post, body);

                self.environment = previous;

                result
            }

            Stmt::Function(name, params, body) => {
                debug!("Defining function '{}'", name.lexeme);

                // Capture the environment active at the definition point.
                let function = Value::Function(Rc::new(Function {
                    name: name.lexeme.clone(),
                    params: params.clone(),
                    body: body.clone(),
                    closure: self.environment.clone(),
                    is_initializer: false,
                }));

                self.environment.borrow_mut().define(&name.lexeme, function);

                Ok(Value::Nil)
            }

            Stmt::Return(_keyword, expr) => {
                let value = match expr {
                    Some(e) => self.evaluate(e)?,
                    None => Value::Nil,
                };

                Err(InterpretError::ReturnSignal(value))
            }

            Stmt::Class(name, superclass_name, methods) => {
                self.execute_class_decl(name, superclass_name.as_ref(), methods)
            }
        }
    }

    /// Run statements in the current environment, yielding the last
    /// statement's value. The environment is NOT restored here on error:
    /// callers that pushed a scope restore it themselves.
    fn execute_all(&mut self, statements: &[Stmt]) -> IResult<Value> {
        let mut last = Value::Nil;

        for stmt in statements {
            last = self.execute(stmt)?;
        }

        Ok(last)
    }

    fn run_for(
        &mut self,
        initializer: &Stmt,
        condition: &Expr,
        post: &Expr,
        body: &Stmt,
    ) -> IResult<Value> {
        self.execute(initializer)?;

        while is_truthy(&self.evaluate(condition)?) {
            self.execute(body)?;
            self.evaluate(post)?;
        }

        Ok(Value::Nil)
    }

    fn execute_class_decl(
        &mut self,
        name: &Token,
        superclass_name: Option<&Token>,
        methods: &[Stmt],
    ) -> IResult<Value> {
        let superclass: Option<Rc<Class>> = match superclass_name {
            Some(token) => {
                let value = self
                    .environment
                    .borrow()
                    .get(&token.lexeme)
                    .map_err(InterpretError::RuntimeError)?;

                match value {
                    Value::Class(class) => Some(class),

                    _ => {
                        return Err(InterpretError::RuntimeError(
                            "Superclass must be a class".to_string(),
                        ));
                    }
                }
            }

            None => None,
        };

        // Methods of a subclass close over a scope carrying `super`, so
        // super.m / super(...) resolve against the *declared* superclass
        // regardless of the runtime instance's own class.
        let method_env = match &superclass {
            Some(superclass) => {
                let env = Rc::new(RefCell::new(Environment::with_enclosing(
                    self.environment.clone(),
                )));

                env.borrow_mut()
                    .define("super", Value::Class(superclass.clone()));

                env
            }

            None => self.environment.clone(),
        };

        let mut method_map: HashMap<String, Rc<Function>> = HashMap::new();

        for method in methods {
            let Stmt::Function(method_name, params, body) = method else {
                return Err(InterpretError::RuntimeError(format!(
                    "Invalid method in class '{}'",
                    name.lexeme
                )));
            };

            method_map.insert(
                method_name.lexeme.clone(),
                Rc::new(Function {
                    name: method_name.lexeme.clone(),
                    params: params.clone(),
                    body: body.clone(),
                    closure: method_env.clone(),
                    is_initializer: method_name.lexeme == "init",
                }),
            );
        }

        debug!(
            "Defining class '{}' with {} methods",
            name.lexeme,
            method_map.len()
        );

        let class = Value::Class(Rc::new(Class {
            name: name.lexeme.clone(),
            superclass,
            methods: method_map,
        }));

        self.environment.borrow_mut().define(&name.lexeme, class);

        Ok(Value::Nil)
    }

    /// Evaluates an expression and returns a Value. Operands are evaluated
    /// before their operator is applied, left before right.
    pub fn evaluate(&mut self, expr: &Expr) -> IResult<Value> {
        match expr {
            Expr::Literal(token) => evaluate_literal(token),

            Expr::Unary(op, right) => self.evaluate_unary(op, right),

            Expr::Binary(left, op, right) => self.evaluate_binary(left, op, right),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Variable(token) => self
                .environment
                .borrow()
                .get(&token.lexeme)
                .map_err(InterpretError::RuntimeError),

            Expr::Call(callee, _paren, arguments) => {
                let callee_val = self.evaluate(callee)?;
                let arg_values = self.evaluate_arguments(arguments)?;

                self.invoke_callable(&callee_val, &arg_values)
            }

            Expr::Get(object, name) => self.evaluate_get(object, name),

            Expr::Set(object, name, value) => self.evaluate_set(object, name, value),

            Expr::This(_token) => self.lookup_this(),

            Expr::SuperGet(_keyword, member) => {
                let superclass = self.lookup_super()?;
                let this = self.lookup_this()?;

                match superclass.find_method(&member.lexeme) {
                    Some(method) => Ok(Value::Function(method.bind(this))),

                    None => Err(InterpretError::RuntimeError(format!(
                        "Undefined property '{}'",
                        member.lexeme
                    ))),
                }
            }

            Expr::SuperCall(_keyword, arguments) => {
                let superclass = self.lookup_super()?;
                let this = self.lookup_this()?;
                let arg_values = self.evaluate_arguments(arguments)?;

                match superclass.find_method("init") {
                    Some(init) => self.call_function(&init.bind(this), &arg_values),

                    // A superclass without an initializer accepts only a
                    // zero-argument super() and constructs nothing new.
                    None if arg_values.is_empty() => Ok(Value::Nil),

                    None => Err(InterpretError::RuntimeError(format!(
                        "Expected 0 arguments but got {}",
                        arg_values.len()
                    ))),
                }
            }
        }
    }

    fn evaluate_arguments(&mut self, arguments: &[Expr]) -> IResult<Vec<Value>> {
        let mut values = Vec::with_capacity(arguments.len());

        for argument in arguments {
            values.push(self.evaluate(argument)?);
        }

        Ok(values)
    }

    /// Evaluates a unary expression.
    fn evaluate_unary(&mut self, op: &Token, expr: &Expr) -> IResult<Value> {
        let right = self.evaluate(expr)?;

        match op.token_type {
            TokenType::MINUS => match right {
                Value::Number(n) => Ok(Value::Number(-n)),

                _ => Err(InterpretError::RuntimeError(format!(
                    "Unsupported operator '-' on {}",
                    right.type_name()
                ))),
            },

            TokenType::BANG => Ok(Value::Bool(!is_truthy(&right))),

            _ => Err(InterpretError::RuntimeError(format!(
                "Invalid unary operator on line {}",
                op.line
            ))),
        }
    }

    /// Evaluates a binary expression. Assignment and the short-circuiting
    /// logical operators are dispatched first, before the left operand is
    /// evaluated eagerly.
    fn evaluate_binary(&mut self, left: &Expr, op: &Token, right: &Expr) -> IResult<Value> {
        if op.token_type == TokenType::EQUAL {
            // Right-hand side first, then rebind the nearest declaration.
            let value = self.evaluate(right)?;

            return match left {
                Expr::Variable(name) => {
                    self.environment
                        .borrow_mut()
                        .assign(&name.lexeme, value.clone())
                        .map_err(InterpretError::RuntimeError)?;

                    Ok(value)
                }

                // The parser rewrites Get targets to Set and rejects the
                // rest, so this arm is only reachable through a
                // hand-built AST.
                _ => Err(InterpretError::RuntimeError(
                    "Invalid assignment target".to_string(),
                )),
            };
        }

        if op.token_type == TokenType::OR {
            let left_val = self.evaluate(left)?;

            if is_truthy(&left_val) {
                return Ok(left_val);
            }

            return self.evaluate(right);
        }

        if op.token_type == TokenType::AND {
            let left_val = self.evaluate(left)?;

            if !is_truthy(&left_val) {
                return Ok(left_val);
            }

            return self.evaluate(right);
        }

        let left_val = self.evaluate(left)?;
        let right_val = self.evaluate(right)?;

        match op.token_type {
            TokenType::PLUS => match (&left_val, &right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                _ => Err(unsupported(op, &left_val, &right_val)),
            },

            TokenType::MINUS => match (&left_val, &right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
                _ => Err(unsupported(op, &left_val, &right_val)),
            },

            TokenType::STAR => match (&left_val, &right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
                _ => Err(unsupported(op, &left_val, &right_val)),
            },

            // Division follows IEEE-754: x / 0 is an infinity, not an error.
            TokenType::SLASH => match (&left_val, &right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
                _ => Err(unsupported(op, &left_val, &right_val)),
            },

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left_val == right_val)),

            TokenType::BANG_EQUAL => Ok(Value::Bool(left_val != right_val)),

            TokenType::LESS => match (&left_val, &right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a < b)),
                _ => Err(unsupported(op, &left_val, &right_val)),
            },

            TokenType::LESS_EQUAL => match (&left_val, &right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a <= b)),
                _ => Err(unsupported(op, &left_val, &right_val)),
            },

            TokenType::GREATER => match (&left_val, &right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a > b)),
                _ => Err(unsupported(op, &left_val, &right_val)),
            },

            TokenType::GREATER_EQUAL => match (&left_val, &right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a >= b)),
                _ => Err(unsupported(op, &left_val, &right_val)),
            },

            _ => Err(InterpretError::RuntimeError(format!(
                "Invalid binary operator on line {}",
                op.line
            ))),
        }
    }

    fn evaluate_get(&mut self, object: &Expr, name: &Token) -> IResult<Value> {
        let object = self.evaluate(object)?;

        match object {
            Value::Instance(instance) => {
                // Fields shadow methods.
                if let Some(value) = instance.borrow().fields.get(&name.lexeme).cloned() {
                    return Ok(value);
                }

                let method = instance.borrow().class.find_method(&name.lexeme);

                match method {
                    Some(method) => {
                        Ok(Value::Function(method.bind(Value::Instance(instance.clone()))))
                    }

                    None => Err(InterpretError::RuntimeError(format!(
                        "Undefined property '{}'",
                        name.lexeme
                    ))),
                }
            }

            _ => Err(InterpretError::RuntimeError(
                "Only instances have properties".to_string(),
            )),
        }
    }

    fn evaluate_set(&mut self, object: &Expr, name: &Token, value: &Expr) -> IResult<Value> {
        let object = self.evaluate(object)?;

        let Value::Instance(instance) = object else {
            return Err(InterpretError::RuntimeError(
                "Only instances have fields".to_string(),
            ));
        };

        let value = self.evaluate(value)?;

        instance
            .borrow_mut()
            .fields
            .insert(name.lexeme.clone(), value.clone());

        Ok(value)
    }

    /// Invokes a callable value: a function/method or a class constructor.
    fn invoke_callable(&mut self, callee: &Value, arguments: &[Value]) -> IResult<Value> {
        match callee {
            Value::Function(function) => self.call_function(function, arguments),

            Value::Class(class) => self.construct(class, arguments),

            _ => Err(InterpretError::RuntimeError(
                "Can only call functions and classes".to_string(),
            )),
        }
    }

    /// Calls a function value: binds parameters positionally in a fresh
    /// scope under the captured closure, runs the body, and absorbs the
    /// return signal. An initializer always yields its bound `this`.
    fn call_function(&mut self, function: &Rc<Function>, arguments: &[Value]) -> IResult<Value> {
        if arguments.len() != function.arity() {
            return Err(InterpretError::RuntimeError(format!(
                "Expected {} arguments but got {}",
                function.arity(),
                arguments.len()
            )));
        }

        debug!("Calling function '{}'", function.name);

        let previous = self.environment.clone();

        self.environment = Rc::new(RefCell::new(Environment::with_enclosing(
            function.closure.clone(),
        )));

        for (param, value) in function.params.iter().zip(arguments.iter()) {
            self.environment
                .borrow_mut()
                .define(&param.lexeme, value.clone());
        }

        let mut result = Ok(Value::Nil);

        for stmt in &function.body {
            result = self.execute(stmt);

            if result.is_err() {
                break;
            }
        }

        self.environment = previous;

        match result {
            Ok(_) => {
                if function.is_initializer {
                    initializer_this(function)
                } else {
                    Ok(Value::Nil)
                }
            }

            Err(InterpretError::ReturnSignal(value)) => {
                if function.is_initializer {
                    initializer_this(function)
                } else {
                    Ok(value)
                }
            }

            Err(e) => Err(e),
        }
    }

    /// Calls a class value: constructs an instance with empty fields and
    /// runs its bound `init` if the class (or an ancestor) defines one.
    /// The initializer's return value is discarded.
    fn construct(&mut self, class: &Rc<Class>, arguments: &[Value]) -> IResult<Value> {
        if arguments.len() != class.arity() {
            return Err(InterpretError::RuntimeError(format!(
                "Expected {} arguments but got {}",
                class.arity(),
                arguments.len()
            )));
        }

        debug!("Constructing instance of '{}'", class.name);

        let instance = Value::Instance(Rc::new(RefCell::new(Instance::new(class.clone()))));

        if let Some(init) = class.find_method("init") {
            self.call_function(&init.bind(instance.clone()), arguments)?;
        }

        Ok(instance)
    }

    fn lookup_this(&self) -> IResult<Value> {
        self.environment.borrow().get("this").map_err(|_| {
            InterpretError::RuntimeError("Cannot use 'this' outside of a class".to_string())
        })
    }

    fn lookup_super(&self) -> IResult<Rc<Class>> {
        match self.environment.borrow().get("super") {
            Ok(Value::Class(class)) => Ok(class),

            _ => Err(InterpretError::RuntimeError(
                "Cannot use 'super' outside of a subclass".to_string(),
            )),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluates a literal token.
fn evaluate_literal(token: &Token) -> IResult<Value> {
    match &token.token_type {
        TokenType::NUMBER(n) => Ok(Value::Number(*n)),
        TokenType::STRING(s) => Ok(Value::String(s.clone())),
        TokenType::TRUE => Ok(Value::Bool(true)),
        TokenType::FALSE => Ok(Value::Bool(false)),
        TokenType::NIL => Ok(Value::Nil),
        _ => Err(InterpretError::RuntimeError(format!(
            "Invalid literal on line {}",
            token.line
        ))),
    }
}

/// An initializer evaluates to its bound `this`, regardless of `return`.
fn initializer_this(function: &Function) -> IResult<Value> {
    function
        .closure
        .borrow()
        .get("this")
        .map_err(InterpretError::RuntimeError)
}

fn unsupported(op: &Token, left: &Value, right: &Value) -> InterpretError {
    InterpretError::RuntimeError(format!(
        "Unsupported operator '{}' on {} and {}",
        op.lexeme,
        left.type_name(),
        right.type_name()
    ))
}

/// `nil` and `false` are falsy; every other value is truthy.
fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Nil | Value::Bool(false))
}
