use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::environment::Environment;
use crate::stmt::Stmt;
use crate::token::Token;

/// A runtime value. Every value carries exactly one tag; equality and
/// truthiness are defined per tag by the interpreter.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Bool(bool),
    Nil,

    /// A user-defined function or bound method.
    Function(Rc<Function>),

    /// A class object (itself callable: calling it constructs an instance).
    Class(Rc<Class>),

    /// An instance of a class. Shared and internally mutable: the same
    /// instance may be reachable through several variables, and `Set`
    /// expressions mutate its field map in place.
    Instance(Rc<RefCell<Instance>>),
}

/// A function value: parameter list, body, and the environment captured at
/// the definition point (the closure).
pub struct Function {
    pub name: String,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
    pub closure: Rc<RefCell<Environment>>,
    pub is_initializer: bool,
}

impl Function {
    /// Number of parameters the function expects.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Produce a copy of this method with `this` bound to `instance` in a
    /// fresh scope wrapped around the original closure.
    pub fn bind(&self, instance: Value) -> Rc<Function> {
        let env = Rc::new(RefCell::new(Environment::with_enclosing(
            self.closure.clone(),
        )));

        env.borrow_mut().define("this", instance);

        Rc::new(Function {
            name: self.name.clone(),
            params: self.params.clone(),
            body: self.body.clone(),
            closure: env,
            is_initializer: self.is_initializer,
        })
    }
}

// Closure environments and instance fields can reach back to the values
// that own them, so Debug stays shallow: names only, never the graph.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("arity", &self.params.len())
            .field("is_initializer", &self.is_initializer)
            .finish_non_exhaustive()
    }
}

/// A class value: method table plus an optional superclass used as a
/// lookup fallback.
#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub superclass: Option<Rc<Class>>,
    pub methods: HashMap<String, Rc<Function>>,
}

impl Class {
    /// Look a method up on this class, falling back through the
    /// superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        if let Some(method) = self.methods.get(name) {
            return Some(method.clone());
        }

        self.superclass
            .as_ref()
            .and_then(|superclass| superclass.find_method(name))
    }

    /// A class's call arity is its initializer's, or zero without one.
    pub fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |init| init.arity())
    }
}

/// An instance: a reference to its class and its own field map. Fields
/// start empty and are written only through `Set` expressions.
pub struct Instance {
    pub class: Rc<Class>,
    pub fields: HashMap<String, Value>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Instance {
            class,
            fields: HashMap::new(),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name)
            .field("fields", &self.fields.len())
            .finish_non_exhaustive()
    }
}

impl Value {
    /// The tag name used in runtime diagnostics. All callables and
    /// instances report as `object`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Nil => "nil",
            Value::Function(_) | Value::Class(_) | Value::Instance(_) => "object",
        }
    }
}

impl PartialEq for Value {
    /// Values of different tags are never equal. Primitives compare by
    /// value; functions, classes and instances by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,

            (Value::String(a), Value::String(b)) => a == b,

            (Value::Bool(a), Value::Bool(b)) => a == b,

            (Value::Nil, Value::Nil) => true,

            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),

            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),

            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),

            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// Canonical text form, as written by `print`: numbers as f64
    /// (`3.0`, `26.0`, `3.02`), strings raw, booleans `true`/`false`,
    /// `nil`, and `<fn f>` / `<class C>` / `<instance C>` for objects.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                // 3 → "3.0" (integer part via a tiny stack buffer)
                if n.fract() == 0.0 && n.is_finite() {
                    let mut buf: itoa::Buffer = itoa::Buffer::new();

                    write!(f, "{}.0", buf.format(*n as i64))
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::String(s) => write!(f, "{}", s),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Nil => write!(f, "nil"),

            Value::Function(func) => write!(f, "<fn {}>", func.name),

            Value::Class(class) => write!(f, "<class {}>", class.name),

            Value::Instance(instance) => {
                write!(f, "<instance {}>", instance.borrow().class.name)
            }
        }
    }
}
