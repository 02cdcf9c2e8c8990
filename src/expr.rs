use serde::Serialize;

use crate::token::Token;

/// Expression nodes produced by the parser.
///
/// Assignment and the short‑circuiting `and`/`or` are represented as
/// `Binary` nodes carrying the `=`/`and`/`or` operator token; the
/// interpreter dispatches on the operator. Property assignment is rewritten
/// to `Set` at parse time, so a `Binary` with `=` always has a `Variable`
/// on its left.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    /// Infix operator expression: `left op right`.
    Binary(Box<Expr>, Token, Box<Expr>),

    /// Prefix operator expression: `!x`, `-x`.
    Unary(Token, Box<Expr>),

    /// A literal constant token: number, string, `true`, `false`, `nil`.
    Literal(Token),

    /// Parenthesized sub‑expression.
    Grouping(Box<Expr>),

    /// Variable access.
    Variable(Token),

    /// Call expression: callee, closing `)` token (for diagnostics),
    /// arguments in source order.
    Call(Box<Expr>, Token, Vec<Expr>),

    /// Property read: `object.property`.
    Get(Box<Expr>, Token),

    /// Property write: `object.property = value`.
    Set(Box<Expr>, Token, Box<Expr>),

    /// `super(args)`: superclass initializer call. Carries the `super`
    /// keyword token.
    SuperCall(Token, Vec<Expr>),

    /// `super.member`: keyword token and member name.
    SuperGet(Token, Token),

    /// The `this` keyword inside a method.
    This(Token),
}

impl Expr {
    /// Source line the expression starts on, for runtime diagnostics.
    pub fn line(&self) -> usize {
        match self {
            Expr::Binary(left, _, _) => left.line(),

            Expr::Unary(token, _) => token.line,

            Expr::Literal(token) => token.line,

            Expr::Grouping(expr) => expr.line(),

            Expr::Variable(token) => token.line,

            Expr::Call(callee, _, _) => callee.line(),

            Expr::Get(object, _) => object.line(),

            Expr::Set(object, _, _) => object.line(),

            Expr::SuperCall(keyword, _) => keyword.line,

            Expr::SuperGet(keyword, _) => keyword.line,

            Expr::This(token) => token.line,
        }
    }
}
