//! Debug rendering of an AST as canonical parenthesized text.
//!
//! Used by tests and the `parse` subcommand only; evaluation never touches
//! this module. One statement per line, operators prefix:
//! `1 - 2 * 4 == 3 / 5;` renders as `(== (- 1 (* 2 4)) (/ 3 5))`.

use crate::expr::Expr;
use crate::stmt::Stmt;

pub struct AstPrinter;

impl AstPrinter {
    /// Render a whole program, one statement per line.
    pub fn print(statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(Self::print_stmt)
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn print_stmt(stmt: &Stmt) -> String {
        match stmt {
            // A bare expression statement renders as the expression itself.
            Stmt::Expression(expr) => Self::print_expr(expr),

            Stmt::Print(expr) => format!("(print {})", Self::print_expr(expr)),

            Stmt::Var(name, initializer) => match initializer {
                Some(init) => format!("(define {} {})", name.lexeme, Self::print_expr(init)),

                None => format!("(define {})", name.lexeme),
            },

            Stmt::Block(statements) => {
                let mut s = String::from("(block");

                for stmt in statements {
                    s.push(' ');
                    s.push_str(&Self::print_stmt(stmt));
                }

                s.push(')');
                s
            }

            Stmt::If(condition, then_branch, else_branch) => match else_branch {
                Some(else_stmt) => format!(
                    "(if {} then {} else {})",
                    Self::print_expr(condition),
                    Self::print_stmt(then_branch),
                    Self::print_stmt(else_stmt)
                ),

                None => format!(
                    "(if {} then {})",
                    Self::print_expr(condition),
                    Self::print_stmt(then_branch)
                ),
            },

            Stmt::While(condition, body) => format!(
                "(while {} do {})",
                Self::print_expr(condition),
                Self::print_stmt(body)
            ),

            Stmt::For(initializer, condition, post, body) => format!(
                "(for {} {} {} do {})",
                Self::print_stmt(initializer),
                Self::print_expr(condition),
                Self::print_expr(post),
                Self::print_stmt(body)
            ),

            Stmt::Function(name, params, body) => {
                let mut s = format!("(fun {} (", name.lexeme);

                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        s.push(' ');
                    }

                    s.push_str(&param.lexeme);
                }

                s.push(')');

                for stmt in body {
                    s.push(' ');
                    s.push_str(&Self::print_stmt(stmt));
                }

                s.push(')');
                s
            }

            Stmt::Return(_keyword, value) => match value {
                Some(expr) => format!("(return {})", Self::print_expr(expr)),

                None => "(return)".to_string(),
            },

            Stmt::Class(name, superclass, methods) => {
                let mut s = format!("(class {}", name.lexeme);

                if let Some(superclass) = superclass {
                    s.push_str(&format!(" (< {})", superclass.lexeme));
                }

                for method in methods {
                    s.push(' ');
                    s.push_str(&Self::print_stmt(method));
                }

                s.push(')');
                s
            }
        }
    }

    pub fn print_expr(expr: &Expr) -> String {
        match expr {
            // Literals render as their exact lexemes: numbers unchanged,
            // strings with their quotes.
            Expr::Literal(token) => token.lexeme.clone(),

            Expr::Variable(token) => token.lexeme.clone(),

            Expr::Grouping(inner) => format!("(group {})", Self::print_expr(inner)),

            Expr::Unary(operator, right) => {
                format!("({} {})", operator.lexeme, Self::print_expr(right))
            }

            Expr::Binary(left, operator, right) => format!(
                "({} {} {})",
                operator.lexeme,
                Self::print_expr(left),
                Self::print_expr(right)
            ),

            Expr::Call(callee, _paren, arguments) => {
                let mut s = format!("(call {}", Self::print_expr(callee));

                for argument in arguments {
                    s.push(' ');
                    s.push_str(&Self::print_expr(argument));
                }

                s.push(')');
                s
            }

            Expr::Get(object, name) => {
                format!("(get {} {})", Self::print_expr(object), name.lexeme)
            }

            Expr::Set(object, name, value) => format!(
                "(set {} {} {})",
                Self::print_expr(object),
                name.lexeme,
                Self::print_expr(value)
            ),

            Expr::SuperCall(_keyword, arguments) => {
                let mut s = String::from("(super-call");

                for argument in arguments {
                    s.push(' ');
                    s.push_str(&Self::print_expr(argument));
                }

                s.push(')');
                s
            }

            Expr::SuperGet(_keyword, member) => format!("(super {})", member.lexeme),

            Expr::This(_token) => "this".to_string(),
        }
    }
}
