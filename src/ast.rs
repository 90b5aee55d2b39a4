// ABOUTME: Typed AST produced by the parser and walked by the evaluator

use std::fmt;

use crate::token::TokenKind;
use crate::value::Type;

/// Root node: the ordered top-level statements of a source text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// A `{ ... }` statement sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

/// A function parameter: declared type plus name.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: Type,
    pub name: String,
}

/// The left-hand side of an assignment: a plain name or one array slot.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    Name(String),
    Index(String, Box<Expr>),
}

impl AssignTarget {
    /// The target re-read as an expression. Used when the parser rewrites
    /// `lhs op= rhs` into `lhs = lhs op rhs`.
    pub fn to_expr(&self) -> Expr {
        match self {
            AssignTarget::Name(name) => Expr::Ident(name.clone()),
            AssignTarget::Index(name, index) => Expr::Index {
                name: name.clone(),
                index: index.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Integer(i64),
    Float(f64),
    Char(u8),
    Str(String),
    Bool(bool),
    Ident(String),
    Prefix {
        op: TokenKind,
        expr: Box<Expr>,
    },
    Infix {
        op: TokenKind,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// A function literal; the declared type of the enclosing declaration
    /// is its return type.
    Function {
        ret: Type,
        params: Vec<Param>,
        body: Block,
    },
    /// A braced initializer list, valid only in array declarations.
    ArrayLiteral(Vec<Expr>),
    Index {
        name: String,
        index: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(Expr),
    Declaration {
        ty: Type,
        name: String,
        init: Option<Expr>,
    },
    ArrayDeclaration {
        ty: Type,
        name: String,
        len: Option<usize>,
        init: Option<Vec<Expr>>,
    },
    Assignment {
        target: AssignTarget,
        value: Expr,
    },
    Block(Block),
    If {
        cond: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },
    While {
        cond: Expr,
        body: Block,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Expr,
        step: Box<Stmt>,
        body: Block,
    },
    Return(Option<Expr>),
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stmt) in self.statements.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ ")?;
        for stmt in &self.statements {
            write!(f, "{} ", stmt)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.name)
    }
}

impl fmt::Display for AssignTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignTarget::Name(name) => write!(f, "{}", name),
            AssignTarget::Index(name, index) => write!(f, "{}[{}]", name, index),
        }
    }
}

fn join<T: fmt::Display>(items: &[T], sep: &str) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Integer(n) => write!(f, "{}", n),
            Expr::Float(x) => write!(f, "{}", x),
            Expr::Char(c) => write!(f, "'{}'", *c as char),
            Expr::Str(s) => write!(f, "\"{}\"", s),
            Expr::Bool(b) => write!(f, "{}", b),
            Expr::Ident(name) => write!(f, "{}", name),
            Expr::Prefix { op, expr } => write!(f, "({}{})", op.symbol(), expr),
            Expr::Infix { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::Call { callee, args } => write!(f, "{}({})", callee, join(args, ", ")),
            Expr::Function { ret, params, body } => {
                write!(f, "{} fn({}) {}", ret, join(params, ", "), body)
            }
            Expr::ArrayLiteral(items) => write!(f, "{{{}}}", join(items, ", ")),
            Expr::Index { name, index } => write!(f, "{}[{}]", name, index),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Expression(expr) => write!(f, "{};", expr),
            Stmt::Declaration { ty, name, init } => match init {
                Some(Expr::Function { ret, params, body }) => {
                    write!(f, "{} {}({}) {}", ret, name, join(params, ", "), body)
                }
                Some(expr) => write!(f, "{} {} = {};", ty, name, expr),
                None => write!(f, "{} {};", ty, name),
            },
            Stmt::ArrayDeclaration {
                ty,
                name,
                len,
                init,
            } => {
                write!(f, "{} {}[", ty, name)?;
                if let Some(len) = len {
                    write!(f, "{}", len)?;
                }
                write!(f, "]")?;
                if let Some(items) = init {
                    write!(f, " = {{{}}}", join(items, ", "))?;
                }
                write!(f, ";")
            }
            Stmt::Assignment { target, value } => write!(f, "{} = {};", target, value),
            Stmt::Block(block) => write!(f, "{}", block),
            Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                write!(f, "if({}) {}", cond, then_block)?;
                if let Some(else_block) = else_block {
                    write!(f, " else {}", else_block)?;
                }
                Ok(())
            }
            Stmt::While { cond, body } => write!(f, "while({}) {}", cond, body),
            Stmt::For {
                init,
                cond,
                step,
                body,
            } => {
                write!(f, "for(")?;
                if let Some(init) = init {
                    write!(f, "{}", init)?;
                } else {
                    write!(f, ";")?;
                }
                // The step is an assignment statement; drop its terminator
                // to match the source form.
                let step = step.to_string();
                write!(
                    f,
                    " {}; {}) {}",
                    cond,
                    step.trim_end_matches(';'),
                    body
                )
            }
            Stmt::Return(None) => write!(f, "return;"),
            Stmt::Return(Some(expr)) => write!(f, "return {};", expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infix_display_is_parenthesized() {
        let expr = Expr::Infix {
            op: TokenKind::Plus,
            left: Box::new(Expr::Integer(2)),
            right: Box::new(Expr::Infix {
                op: TokenKind::Asterisk,
                left: Box::new(Expr::Integer(3)),
                right: Box::new(Expr::Integer(4)),
            }),
        };
        assert_eq!(expr.to_string(), "(2 + (3 * 4))");
    }

    #[test]
    fn test_prefix_display() {
        let expr = Expr::Prefix {
            op: TokenKind::Not,
            expr: Box::new(Expr::Bool(true)),
        };
        assert_eq!(expr.to_string(), "(!true)");
    }

    #[test]
    fn test_call_display() {
        let expr = Expr::Call {
            callee: Box::new(Expr::Ident("add".into())),
            args: vec![Expr::Integer(1), Expr::Integer(2)],
        };
        assert_eq!(expr.to_string(), "add(1, 2)");
    }

    #[test]
    fn test_declaration_display() {
        let stmt = Stmt::Declaration {
            ty: Type::Int,
            name: "x".into(),
            init: Some(Expr::Integer(10)),
        };
        assert_eq!(stmt.to_string(), "int x = 10;");

        let bare = Stmt::Declaration {
            ty: Type::String,
            name: "s".into(),
            init: None,
        };
        assert_eq!(bare.to_string(), "string s;");
    }

    #[test]
    fn test_assign_target_to_expr() {
        let target = AssignTarget::Index("arr".into(), Box::new(Expr::Integer(0)));
        assert_eq!(
            target.to_expr(),
            Expr::Index {
                name: "arr".into(),
                index: Box::new(Expr::Integer(0)),
            }
        );
    }
}
