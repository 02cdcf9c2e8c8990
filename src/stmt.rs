use serde::Serialize;

use crate::expr::Expr;
use crate::token::Token;

/// Statement nodes produced by the parser. A program is a `Vec<Stmt>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    Expression(Expr),

    Print(Expr),

    /// `var name [= initializer];` where a missing initializer binds `nil`.
    Var(Token, Option<Expr>),

    Block(Vec<Stmt>),

    If(Expr, Box<Stmt>, Option<Box<Stmt>>),

    While(Expr, Box<Stmt>),

    /// C‑style `for`. All four clauses are present in the tree: the parser
    /// synthesizes a `true` literal for an omitted condition and `nil`
    /// literals for an omitted initializer or post expression.
    For(
        Box<Stmt>, // initializer (var or expr stmt)
        Expr,      // condition
        Expr,      // post expression
        Box<Stmt>, // body
    ),

    /// Function declaration: name, parameters, body.
    Function(Token, Vec<Token>, Vec<Stmt>),

    /// `return [value];` keeping the `return` keyword token for diagnostics.
    Return(Token, Option<Expr>),

    /// Class declaration: name, optional superclass name, methods
    /// (each a `Stmt::Function`).
    Class(Token, Option<Token>, Vec<Stmt>),
}
