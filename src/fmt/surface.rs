//! Pretty printer for the surface AST
//!
//! Renders programs in the notation the front end reads:
//!
//! ```text
//! fact n = if n == 0 then 1 else n * fact (n - 1)
//! main = let { x = 5 } in fact x
//! ```

use std::fmt::{self, Display, Write};

use crate::ast::{
    Definition, Program,
    expression::{Expression, FunctionCall, Ident, IfThenElse, Lambda, Let},
};

/// Anything may appear here without parentheses.
const TOP: u8 = 0;
/// Function position of an application, or operand of an infix operator.
const OPERAND: u8 = 1;
/// Argument position of an application.
const ARGUMENT: u8 = 2;

struct Formatter {
    buffer: String,
}

impl Formatter {
    fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    fn write_str(&mut self, s: &str) {
        self.buffer.push_str(s);
    }

    fn write_newline(&mut self) {
        self.buffer.push('\n');
    }

    fn finish(self) -> String {
        self.buffer
    }
}

impl<T> Display for Program<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = Formatter::new();

        for def in &self.definitions {
            format_definition(def, &mut formatter);
            formatter.write_newline();
        }

        write!(f, "{}", formatter.finish())
    }
}

impl<T> Display for Definition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = Formatter::new();
        format_definition(self, &mut formatter);
        write!(f, "{}", formatter.finish())
    }
}

impl<T> Display for Expression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = Formatter::new();
        format_expression(self, &mut formatter, TOP);
        write!(f, "{}", formatter.finish())
    }
}

fn format_definition<T>(def: &Definition<T>, fmt: &mut Formatter) {
    format_name(&def.name, fmt);
    for param in &def.params {
        fmt.write_str(" ");
        format_name(param, fmt);
    }
    fmt.write_str(" = ");
    format_expression(&def.body, fmt, TOP);
}

/// Operator names are written in parentheses outside infix position.
fn format_name<T>(ident: &Ident<T>, fmt: &mut Formatter) {
    if is_operator(&ident.value) {
        fmt.write_str("(");
        fmt.write_str(&ident.value);
        fmt.write_str(")");
    } else {
        fmt.write_str(&ident.value);
    }
}

fn is_operator(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| !c.is_alphanumeric() && c != '_' && c != '\'')
}

fn format_expression<T>(expr: &Expression<T>, fmt: &mut Formatter, precedence: u8) {
    match expr {
        Expression::Ident(ident) => format_name(ident, fmt),
        Expression::Integer(int) => {
            if int.value < 0 && precedence > TOP {
                write!(fmt.buffer, "({})", int.value).unwrap();
            } else {
                write!(fmt.buffer, "{}", int.value).unwrap();
            }
        }
        Expression::FunctionCall(call) => format_function_call(call, fmt, precedence),
        Expression::Lambda(lambda) => {
            parenthesized(fmt, precedence > TOP, |fmt| format_lambda(lambda, fmt))
        }
        Expression::IfThenElse(ite) => {
            parenthesized(fmt, precedence > TOP, |fmt| format_if_then_else(ite, fmt))
        }
        Expression::Let(block) => {
            parenthesized(fmt, precedence > TOP, |fmt| format_let(block, fmt))
        }
    }
}

fn parenthesized(fmt: &mut Formatter, needs_parens: bool, inner: impl FnOnce(&mut Formatter)) {
    if needs_parens {
        fmt.write_str("(");
    }
    inner(fmt);
    if needs_parens {
        fmt.write_str(")");
    }
}

fn format_lambda<T>(lambda: &Lambda<T>, fmt: &mut Formatter) {
    fmt.write_str("\\");
    for (i, param) in lambda.params.iter().enumerate() {
        if i > 0 {
            fmt.write_str(" ");
        }
        format_name(param, fmt);
    }
    fmt.write_str(" -> ");
    format_expression(&lambda.body, fmt, TOP);
}

fn format_function_call<T>(call: &FunctionCall<T>, fmt: &mut Formatter, precedence: u8) {
    // ((op left) right) with an operator name prints infix
    if let Expression::FunctionCall(inner) = &*call.func
        && let Expression::Ident(op) = &*inner.func
        && is_operator(&op.value)
    {
        parenthesized(fmt, precedence > TOP, |fmt| {
            format_expression(&inner.arg, fmt, OPERAND);
            fmt.write_str(" ");
            fmt.write_str(&op.value);
            fmt.write_str(" ");
            format_expression(&call.arg, fmt, OPERAND);
        });
        return;
    }

    parenthesized(fmt, precedence >= ARGUMENT, |fmt| {
        format_expression(&call.func, fmt, OPERAND);
        fmt.write_str(" ");
        format_expression(&call.arg, fmt, ARGUMENT);
    });
}

fn format_if_then_else<T>(ite: &IfThenElse<T>, fmt: &mut Formatter) {
    fmt.write_str("if ");
    format_expression(&ite.condition, fmt, TOP);
    fmt.write_str(" then ");
    format_expression(&ite.then_expr, fmt, TOP);
    fmt.write_str(" else ");
    format_expression(&ite.else_expr, fmt, TOP);
}

fn format_let<T>(block: &Let<T>, fmt: &mut Formatter) {
    fmt.write_str("let { ");
    for (i, def) in block.bindings.iter().enumerate() {
        if i > 0 {
            fmt.write_str("; ");
        }
        format_definition(def, fmt);
    }
    fmt.write_str(" } in ");
    format_expression(&block.body, fmt, TOP);
}

#[cfg(test)]
mod tests {
    use crate::ast::build::*;

    #[test]
    fn test_definition_with_infix_operators() {
        let def = define(
            "fact",
            &["n"],
            if_then_else(
                binary("==", var("n"), int(0)),
                int(1),
                binary(
                    "*",
                    var("n"),
                    call(var("fact"), binary("-", var("n"), int(1))),
                ),
            ),
        );

        assert_eq!(
            def.to_string(),
            "fact n = if n == 0 then 1 else n * fact (n - 1)"
        );
    }

    #[test]
    fn test_nested_infix_is_parenthesized() {
        let expr = binary("*", binary("+", var("a"), var("b")), var("c"));
        assert_eq!(expr.to_string(), "(a + b) * c");
    }

    #[test]
    fn test_application_is_left_associative() {
        let expr = call_n(var("f"), [var("x"), call(var("g"), var("y"))]);
        assert_eq!(expr.to_string(), "f x (g y)");
    }

    #[test]
    fn test_operator_as_value() {
        let expr = call(var("+"), int(1));
        assert_eq!(expr.to_string(), "(+) 1");
    }

    #[test]
    fn test_lambda_and_let() {
        let expr = let_in(
            vec![
                define("k", &[], lambda(&["x", "y"], var("x"))),
                define("z", &[], int(-3)),
            ],
            call_n(var("k"), [var("z"), int(0)]),
        );
        assert_eq!(
            expr.to_string(),
            "let { k = \\x y -> x; z = -3 } in k z 0"
        );
    }

    #[test]
    fn test_program_one_definition_per_line() {
        let prog = program(vec![
            define("id", &["x"], var("x")),
            define("main", &[], call(var("id"), int(1))),
        ]);
        assert_eq!(prog.to_string(), "id x = x\nmain = id 1\n");
    }
}
