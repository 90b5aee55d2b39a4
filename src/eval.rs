// ABOUTME: Tree-walking evaluator: statement/expression dispatch, operator
// semantics, call semantics, and control-flow propagation

use crate::ast::{AssignTarget, Block, Expr, Program, Stmt};
use crate::builtins::{self, Console};
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::token::TokenKind;
use crate::value::{Flow, Type, Value};

/// The evaluator walks the AST against an [`Environment`]. It owns no
/// state of its own beyond the console the built-ins write to, so one
/// evaluator can serve many programs (the REPL reuses one per session).
///
/// Statements produce a [`Flow`]; expressions produce a [`Value`]; every
/// contract violation short-circuits outward as a [`RuntimeError`].
pub struct Evaluator<'io> {
    console: &'io mut dyn Console,
}

impl<'io> Evaluator<'io> {
    pub fn new(console: &'io mut dyn Console) -> Self {
        Evaluator { console }
    }

    /// Evaluates top-level statements in order against a single
    /// environment. The first runtime error stops evaluation; otherwise
    /// the last statement's outcome is the program's outcome.
    pub fn eval_program(
        &mut self,
        program: &Program,
        env: &mut Environment,
    ) -> Result<Flow, RuntimeError> {
        let mut result = Flow::Value(Value::Null);
        for stmt in &program.statements {
            result = self.eval_stmt(stmt, env)?;
        }
        Ok(result)
    }

    pub fn eval_stmt(&mut self, stmt: &Stmt, env: &mut Environment) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Expression(expr) => Ok(Flow::Value(self.eval_expr(expr, env)?)),
            Stmt::Declaration { ty, name, init } => self.eval_declaration(*ty, name, init, env),
            Stmt::ArrayDeclaration {
                ty,
                name,
                len,
                init,
            } => self.eval_array_declaration(*ty, name, *len, init, env),
            Stmt::Assignment { target, value } => self.eval_assignment(target, value, env),
            Stmt::Block(block) => self.eval_block(block, env),
            Stmt::If {
                cond,
                then_block,
                else_block,
            } => self.eval_if(cond, then_block, else_block.as_ref(), env),
            Stmt::While { cond, body } => self.eval_while(cond, body, env),
            Stmt::For {
                init,
                cond,
                step,
                body,
            } => self.eval_for(init.as_deref(), cond, step, body, env),
            Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }
        }
    }

    /// Runs a block's statements in order, collecting each ordinary result
    /// into a flat results list. A `Return` stops the block and propagates
    /// unchanged; nested results (from inner ifs and loops) flatten into
    /// this block's list.
    fn eval_block(&mut self, block: &Block, env: &mut Environment) -> Result<Flow, RuntimeError> {
        let mut results = Vec::new();
        for stmt in &block.statements {
            match self.eval_stmt(stmt, env)? {
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Results(values) => results.extend(values),
                Flow::Value(value) => results.push(value),
            }
        }
        Ok(Flow::Results(results))
    }

    fn eval_declaration(
        &mut self,
        ty: Type,
        name: &str,
        init: &Option<Expr>,
        env: &mut Environment,
    ) -> Result<Flow, RuntimeError> {
        if env.contains(name) {
            return Err(RuntimeError::Redeclaration(name.to_string()));
        }
        let value = match init {
            None => ty.default_value(),
            Some(Expr::Function { ret, params, body }) => Value::Function {
                ret: *ret,
                params: params.clone(),
                body: body.clone(),
            },
            Some(expr) => {
                let value = self.eval_expr(expr, env)?;
                if !value.matches_type(ty) {
                    return Err(RuntimeError::type_error(format!(
                        "cannot assign {} value to {} variable '{}'",
                        value.type_name(),
                        ty,
                        name
                    )));
                }
                value
            }
        };
        env.set(name, value);
        Ok(Flow::Value(Value::Null))
    }

    fn eval_array_declaration(
        &mut self,
        ty: Type,
        name: &str,
        len: Option<usize>,
        init: &Option<Vec<Expr>>,
        env: &mut Environment,
    ) -> Result<Flow, RuntimeError> {
        if env.contains(name) {
            return Err(RuntimeError::Redeclaration(name.to_string()));
        }
        let items = match init {
            Some(exprs) => {
                let mut items = Vec::with_capacity(exprs.len());
                for expr in exprs {
                    let value = self.eval_expr(expr, env)?;
                    if !value.matches_type(ty) {
                        return Err(RuntimeError::type_error(format!(
                            "cannot store {} value in {} array '{}'",
                            value.type_name(),
                            ty,
                            name
                        )));
                    }
                    items.push(value);
                }
                items
            }
            None => vec![ty.default_value(); len.unwrap_or(0)],
        };
        env.set(name, Value::Array { elem: ty, items });
        Ok(Flow::Value(Value::Null))
    }

    fn eval_assignment(
        &mut self,
        target: &AssignTarget,
        value: &Expr,
        env: &mut Environment,
    ) -> Result<Flow, RuntimeError> {
        let new_value = self.eval_expr(value, env)?;
        match target {
            AssignTarget::Name(name) => {
                let Some(bound) = env.get(name) else {
                    return Err(RuntimeError::NotDeclared(name.clone()));
                };
                if !bound.same_kind(&new_value) {
                    return Err(RuntimeError::type_error(format!(
                        "cannot assign {} value to {} variable '{}'",
                        new_value.type_name(),
                        bound.type_name(),
                        name
                    )));
                }
                env.set(name, new_value);
            }
            AssignTarget::Index(name, index) => {
                let index = self.eval_index_value(index, env)?;
                let Some(bound) = env.get(name) else {
                    return Err(RuntimeError::NotDeclared(name.clone()));
                };
                let Value::Array { elem, items } = bound else {
                    return Err(RuntimeError::type_error(format!(
                        "'{}' is not an array",
                        name
                    )));
                };
                if !new_value.matches_type(*elem) {
                    return Err(RuntimeError::type_error(format!(
                        "cannot store {} value in {} array '{}'",
                        new_value.type_name(),
                        elem,
                        name
                    )));
                }
                let slot = check_bounds(name, index, items.len())?;
                let mut items = items.clone();
                let elem = *elem;
                items[slot] = new_value;
                env.set(name, Value::Array { elem, items });
            }
        }
        Ok(Flow::Value(Value::Null))
    }

    fn eval_if(
        &mut self,
        cond: &Expr,
        then_block: &Block,
        else_block: Option<&Block>,
        env: &mut Environment,
    ) -> Result<Flow, RuntimeError> {
        let condition = self.eval_expr(cond, env)?;
        if condition.is_truthy() {
            self.eval_block(then_block, env)
        } else if let Some(else_block) = else_block {
            self.eval_block(else_block, env)
        } else {
            Ok(Flow::Value(Value::Null))
        }
    }

    /// Each iteration runs against a snapshot of the environment; updates
    /// to names the environment already held are reconciled back at the
    /// iteration boundary, and iteration results accumulate flat.
    fn eval_while(
        &mut self,
        cond: &Expr,
        body: &Block,
        env: &mut Environment,
    ) -> Result<Flow, RuntimeError> {
        let mut results = Vec::new();
        loop {
            if !self.eval_expr(cond, env)?.is_truthy() {
                break;
            }
            let mut iter_env = env.clone();
            match self.eval_block(body, &mut iter_env)? {
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Results(values) => {
                    env.reconcile(&iter_env);
                    results.extend(values);
                }
                Flow::Value(value) => {
                    env.reconcile(&iter_env);
                    results.push(value);
                }
            }
        }
        Ok(Flow::Results(results))
    }

    /// The init statement runs against a snapshot so the loop variable
    /// stays local to the loop; the snapshot reconciles into the parent
    /// when the loop finishes.
    fn eval_for(
        &mut self,
        init: Option<&Stmt>,
        cond: &Expr,
        step: &Stmt,
        body: &Block,
        env: &mut Environment,
    ) -> Result<Flow, RuntimeError> {
        let mut snapshot = env.clone();
        if let Some(init) = init {
            self.eval_stmt(init, &mut snapshot)?;
        }
        let mut results = Vec::new();
        loop {
            if !self.eval_expr(cond, &mut snapshot)?.is_truthy() {
                break;
            }
            let mut iter_env = snapshot.clone();
            match self.eval_block(body, &mut iter_env)? {
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Results(values) => {
                    snapshot.reconcile(&iter_env);
                    results.extend(values);
                }
                Flow::Value(value) => {
                    snapshot.reconcile(&iter_env);
                    results.push(value);
                }
            }
            self.eval_stmt(step, &mut snapshot)?;
        }
        env.reconcile(&snapshot);
        Ok(Flow::Results(results))
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    pub fn eval_expr(&mut self, expr: &Expr, env: &mut Environment) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Integer(n) => Ok(Value::Int(*n)),
            Expr::Float(x) => Ok(Value::Float(*x)),
            Expr::Char(c) => Ok(Value::Char(*c)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Ident(name) => match env.get(name) {
                Some(value) => Ok(value.clone()),
                None => Err(RuntimeError::NotDeclared(name.clone())),
            },
            Expr::Prefix { op, expr } => self.eval_prefix(*op, expr, env),
            Expr::Infix { op, left, right } => self.eval_infix(*op, left, right, env),
            Expr::Call { callee, args } => self.eval_call(callee, args, env),
            Expr::Function { ret, params, body } => Ok(Value::Function {
                ret: *ret,
                params: params.clone(),
                body: body.clone(),
            }),
            Expr::ArrayLiteral(_) => Err(RuntimeError::operator_error(
                "array literal is only valid in an array declaration",
            )),
            Expr::Index { name, index } => {
                let index = self.eval_index_value(index, env)?;
                let Some(bound) = env.get(name) else {
                    return Err(RuntimeError::NotDeclared(name.clone()));
                };
                let Value::Array { items, .. } = bound else {
                    return Err(RuntimeError::type_error(format!(
                        "'{}' is not an array",
                        name
                    )));
                };
                let slot = check_bounds(name, index, items.len())?;
                Ok(items[slot].clone())
            }
        }
    }

    fn eval_index_value(
        &mut self,
        index: &Expr,
        env: &mut Environment,
    ) -> Result<i64, RuntimeError> {
        match self.eval_expr(index, env)? {
            Value::Int(n) => Ok(n),
            other => Err(RuntimeError::type_error(format!(
                "array index must be an int, got {}",
                other.type_name()
            ))),
        }
    }

    fn eval_prefix(
        &mut self,
        op: TokenKind,
        expr: &Expr,
        env: &mut Environment,
    ) -> Result<Value, RuntimeError> {
        let value = self.eval_expr(expr, env)?;
        match op {
            TokenKind::Minus => eval_prefix_minus(value),
            TokenKind::Plus => eval_prefix_plus(value),
            TokenKind::Not => eval_prefix_not(value),
            other => Err(RuntimeError::operator_error(format!(
                "'{}' is not a valid prefix operator",
                other.symbol()
            ))),
        }
    }

    /// Both operands are always evaluated before the operator is applied;
    /// `&&` and `||` do not short-circuit. The right operand evaluates
    /// first.
    fn eval_infix(
        &mut self,
        op: TokenKind,
        left: &Expr,
        right: &Expr,
        env: &mut Environment,
    ) -> Result<Value, RuntimeError> {
        let rhs = self.eval_expr(right, env)?;
        let lhs = self.eval_expr(left, env)?;
        match op {
            TokenKind::Plus => eval_infix_plus(lhs, rhs),
            TokenKind::Minus => eval_infix_minus(lhs, rhs),
            TokenKind::Asterisk => eval_infix_mult(lhs, rhs),
            TokenKind::Slash => eval_infix_div(lhs, rhs),
            TokenKind::Percent => eval_infix_mod(lhs, rhs),
            TokenKind::Lt | TokenKind::Le | TokenKind::Gt | TokenKind::Ge => {
                eval_infix_compare(op, lhs, rhs)
            }
            TokenKind::Eq | TokenKind::NotEq => eval_infix_equality(op, lhs, rhs),
            TokenKind::And => Ok(Value::Bool(lhs.is_truthy() && rhs.is_truthy())),
            TokenKind::Or => Ok(Value::Bool(lhs.is_truthy() || rhs.is_truthy())),
            other => Err(RuntimeError::operator_error(format!(
                "unsupported infix operator '{}'",
                other.symbol()
            ))),
        }
    }

    /// Calls resolve through the builtin table first, then through the
    /// environment. A user call frame carries only the caller's function
    /// bindings; arguments evaluate in the caller's environment and bind
    /// under the parameter names after a kind check.
    fn eval_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        env: &mut Environment,
    ) -> Result<Value, RuntimeError> {
        let Expr::Ident(name) = callee else {
            return Err(RuntimeError::type_error(format!(
                "expression '{}' is not callable",
                callee
            )));
        };

        if let Some(builtin) = builtins::lookup(name) {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(self.eval_expr(arg, env)?);
            }
            return builtin(&values, self.console);
        }

        let Some(bound) = env.get(name) else {
            return Err(RuntimeError::FunctionNotFound(name.clone()));
        };
        let Value::Function { ret, params, body } = bound.clone() else {
            return Err(RuntimeError::type_error(format!(
                "'{}' is not a function",
                name
            )));
        };

        if params.len() != args.len() {
            return Err(RuntimeError::runtime_error(format!(
                "function '{}' expects {} arguments, got {}",
                name,
                params.len(),
                args.len()
            )));
        }

        let mut call_env = env.extend_for_call();
        for (param, arg) in params.iter().zip(args) {
            let value = self.eval_expr(arg, env)?;
            if !value.matches_type(param.ty) {
                return Err(RuntimeError::type_error(format!(
                    "parameter '{}' of '{}' expects {}, got {}",
                    param.name,
                    name,
                    param.ty,
                    value.type_name()
                )));
            }
            call_env.set(param.name.clone(), value);
        }

        match self.eval_block(&body, &mut call_env)? {
            Flow::Return(value) => {
                if ret == Type::Void {
                    if value == Value::Null {
                        Ok(Value::Null)
                    } else {
                        Err(RuntimeError::type_error(format!(
                            "unexpected return value from void function '{}'",
                            name
                        )))
                    }
                } else if value.matches_type(ret) {
                    Ok(value)
                } else {
                    Err(RuntimeError::type_error(format!(
                        "function '{}' must return {}, got {}",
                        name,
                        ret,
                        value.type_name()
                    )))
                }
            }
            Flow::Results(_) | Flow::Value(_) => {
                if ret == Type::Void {
                    Ok(Value::Null)
                } else {
                    Err(RuntimeError::type_error(format!(
                        "non-void function '{}' did not return a value",
                        name
                    )))
                }
            }
        }
    }
}

fn check_bounds(name: &str, index: i64, len: usize) -> Result<usize, RuntimeError> {
    if index < 0 || index as usize >= len {
        return Err(RuntimeError::runtime_error(format!(
            "array index out of range: '{}' has length {}, index was {}",
            name, len, index
        )));
    }
    Ok(index as usize)
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Int(n) => Some(*n as f64),
        Value::Float(x) => Some(*x),
        _ => None,
    }
}

fn eval_prefix_minus(value: Value) -> Result<Value, RuntimeError> {
    match value {
        Value::Int(n) => Ok(Value::Int(n.wrapping_neg())),
        Value::Float(x) => Ok(Value::Float(-x)),
        other => Err(RuntimeError::type_error(format!(
            "invalid operand type for unary minus, expected number but got {}",
            other.type_name()
        ))),
    }
}

fn eval_prefix_plus(value: Value) -> Result<Value, RuntimeError> {
    match value {
        Value::Int(_) | Value::Float(_) => Ok(value),
        other => Err(RuntimeError::type_error(format!(
            "invalid operand type for unary plus, expected number but got {}",
            other.type_name()
        ))),
    }
}

fn eval_prefix_not(value: Value) -> Result<Value, RuntimeError> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(!b)),
        Value::Null => Ok(Value::Bool(false)),
        Value::Int(n) => Ok(Value::Bool(n == 0)),
        Value::Float(x) => Ok(Value::Bool(x == 0.0)),
        other => Err(RuntimeError::type_error(format!(
            "invalid operand type for logical NOT, expected bool or number but got {}",
            other.type_name()
        ))),
    }
}

fn eval_infix_plus(lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(b))),
        (a, b) => match (numeric(&a), numeric(&b)) {
            (Some(x), Some(y)) => Ok(Value::Float(x + y)),
            _ => Err(RuntimeError::type_error(format!(
                "invalid operand types for addition, expected number + number or \
                 string + string but got {} + {}",
                a.type_name(),
                b.type_name()
            ))),
        },
    }
}

fn eval_infix_minus(lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_sub(b))),
        (a, b) => match (numeric(&a), numeric(&b)) {
            (Some(x), Some(y)) => Ok(Value::Float(x - y)),
            _ => Err(RuntimeError::type_error(format!(
                "invalid operand types for subtraction, expected number - number but got {} - {}",
                a.type_name(),
                b.type_name()
            ))),
        },
    }
}

fn eval_infix_mult(lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_mul(b))),
        (a, b) => match (numeric(&a), numeric(&b)) {
            (Some(x), Some(y)) => Ok(Value::Float(x * y)),
            _ => Err(RuntimeError::type_error(format!(
                "invalid operand types for product, expected number * number but got {} * {}",
                a.type_name(),
                b.type_name()
            ))),
        },
    }
}

fn eval_infix_div(lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => {
            if b == 0 {
                Err(RuntimeError::divide_by_zero())
            } else {
                Ok(Value::Int(a.wrapping_div(b)))
            }
        }
        (a, b) => match (numeric(&a), numeric(&b)) {
            (Some(x), Some(y)) => {
                if y == 0.0 {
                    Err(RuntimeError::divide_by_zero())
                } else {
                    Ok(Value::Float(x / y))
                }
            }
            _ => Err(RuntimeError::type_error(format!(
                "invalid operand types for division, expected number / number but got {} / {}",
                a.type_name(),
                b.type_name()
            ))),
        },
    }
}

fn eval_infix_mod(lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => {
            if b == 0 {
                Err(RuntimeError::divide_by_zero())
            } else {
                Ok(Value::Int(a.wrapping_rem(b)))
            }
        }
        (a, b) => Err(RuntimeError::type_error(format!(
            "invalid operand types for modulo, expected int % int but got {} % {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

fn eval_infix_compare(op: TokenKind, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    let outcome = match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => Some(compare(op, a, b)),
        _ => match (numeric(&lhs), numeric(&rhs)) {
            (Some(x), Some(y)) => Some(compare(op, &x, &y)),
            _ => None,
        },
    };
    match outcome {
        Some(result) => Ok(Value::Bool(result)),
        None => Err(RuntimeError::type_error(format!(
            "invalid operand types for comparison, expected numbers but got {} {} {}",
            lhs.type_name(),
            op.symbol(),
            rhs.type_name()
        ))),
    }
}

fn compare<T: PartialOrd>(op: TokenKind, a: &T, b: &T) -> bool {
    match op {
        TokenKind::Lt => a < b,
        TokenKind::Le => a <= b,
        TokenKind::Gt => a > b,
        TokenKind::Ge => a >= b,
        _ => false,
    }
}

/// `==`/`!=` compare within kind for strings, chars, and bools; numbers
/// compare by promotion; everything else is a type error.
fn eval_infix_equality(op: TokenKind, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    let equal = match (&lhs, &rhs) {
        (Value::Str(a), Value::Str(b)) => Some(a == b),
        (Value::Char(a), Value::Char(b)) => Some(a == b),
        (Value::Bool(a), Value::Bool(b)) => Some(a == b),
        (Value::Int(a), Value::Int(b)) => Some(a == b),
        _ => match (numeric(&lhs), numeric(&rhs)) {
            (Some(x), Some(y)) => Some(x == y),
            _ => None,
        },
    };
    match equal {
        Some(equal) => Ok(Value::Bool(if op == TokenKind::Eq { equal } else { !equal })),
        None => Err(RuntimeError::type_error(format!(
            "invalid operand types for equality, got {} {} {}",
            lhs.type_name(),
            op.symbol(),
            rhs.type_name()
        ))),
    }
}
