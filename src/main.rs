//! lectlang compiler CLI entry point.

mod cli;

use std::fmt::Display;
use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Stage};
use lectlang::pretty::{PrettyExpr, PrettyProgram};
use lectlang::{
    CompileOptions, Compiler, LectError, Machine, MachineConfig, NameMode, Type, evaluate,
};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let source = match (&cli.expr, &cli.file) {
        (Some(expr), _) => expr.clone(),
        (None, Some(path)) => match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("error: cannot read {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        (None, None) => {
            eprintln!("error: no input given");
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, &source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, source: &str) -> Result<(), LectError> {
    let stages = match cli.stage {
        Some(stage) => vec![stage],
        None => Stage::ALL.to_vec(),
    };
    let printer = Printer {
        headers: stages.len() > 1,
    };
    let mode = if cli.source_names {
        NameMode::Display
    } else {
        NameMode::Resolved
    };

    let parsed = lectlang::parse(source)?;

    if stages.contains(&Stage::Resolve) {
        let mut resolved = parsed.clone();
        lectlang_compiler::resolve(&mut resolved);
        printer.section(Stage::Resolve, PrettyExpr::new(&resolved, mode));
    }

    let compiles = stages
        .iter()
        .any(|stage| !matches!(stage, Stage::Resolve | Stage::Eval));
    if compiles {
        let unit = Compiler::new(CompileOptions::traced()).compile(parsed.clone())?;
        for &stage in &stages {
            match stage {
                Stage::Typecheck => printer.section(stage, unit.ty),
                Stage::Lift => printer.section(stage, PrettyProgram::new(&unit.program, mode)),
                Stage::Codegen => {
                    if let Some(unlinked) = &unit.unlinked {
                        printer.section(stage, unlinked);
                    }
                }
                Stage::Link => printer.section(stage, &unit.module),
                Stage::Run => {
                    let config = MachineConfig {
                        stack_size: cli.stack_size,
                        max_steps: cli.max_steps,
                    };
                    let word = Machine::new(config).run(&unit.module)?;
                    match unit.ty {
                        Type::Num => printer.section(stage, word),
                        Type::Bool => printer.section(stage, word != 0),
                    }
                }
                Stage::Resolve | Stage::Eval => {}
            }
        }
    }

    if stages.contains(&Stage::Eval) {
        let value = evaluate(&parsed)?;
        printer.section(Stage::Eval, value);
    }
    Ok(())
}

struct Printer {
    headers: bool,
}

impl Printer {
    fn section(&self, stage: Stage, body: impl Display) {
        let body = body.to_string();
        if self.headers {
            println!("=== {} ===", stage.title());
        }
        println!("{}", body.trim_end());
        if self.headers {
            println!();
        }
    }
}
