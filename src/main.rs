use fixpoint::ast::build::*;
use fixpoint::interpreter::{Builtins, Interpreter};
use fixpoint::{Options, ParsedProgram, compile};
use log::info;

/// fact n = if n == 0 then 1 else n * fact (n - 1)
/// main = fact 10
fn factorial() -> ParsedProgram {
    program(vec![
        define(
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
        ),
        define("main", &[], call(var("fact"), int(10))),
    ])
}

/// isEven n = if n == 0 then 1 else isOdd (n - 1)
/// isOdd n = if n == 0 then 0 else isEven (n - 1)
/// main = let { x = 7 } in isOdd x
fn parity() -> ParsedProgram {
    program(vec![
        define(
            "isEven",
            &["n"],
            if_then_else(
                binary("==", var("n"), int(0)),
                int(1),
                call(var("isOdd"), binary("-", var("n"), int(1))),
            ),
        ),
        define(
            "isOdd",
            &["n"],
            if_then_else(
                binary("==", var("n"), int(0)),
                int(0),
                call(var("isEven"), binary("-", var("n"), int(1))),
            ),
        ),
        define(
            "main",
            &[],
            let_in(vec![define("x", &[], int(7))], call(var("isOdd"), var("x"))),
        ),
    ])
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let builtins = Builtins::standard();
    let options = Options::default();

    for (name, program) in [("factorial", factorial()), ("parity", parity())] {
        info!("running {}", name);
        println!("{}", program);

        let compiled = compile(program, &builtins, &options)?;
        for (id, flags) in compiled.classification.iter() {
            if let Some(binding) = compiled.resolution.tree.binding(id) {
                info!("{} (dispatch id {}): {:?}", binding.name, id, flags);
            }
        }
        println!("-- lowered\n{}\n", compiled.term);

        let value = Interpreter::with_options(options.eval)
            .evaluate(&compiled.term, &builtins.environment())?;
        println!("-- result\n{}\n", value);
    }

    Ok(())
}
