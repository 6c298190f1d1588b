//! Command-line interface for the lectlang compiler.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(name = "lectlang")]
#[command(about = "Lecture language compiler for the Trac42 machine", long_about = None)]
pub struct Cli {
    /// Source file to compile
    #[arg(required_unless_present = "expr", conflicts_with = "expr")]
    pub file: Option<PathBuf>,

    /// Compile an expression given on the command line
    #[arg(short = 'e', long = "expr", value_name = "EXPR")]
    pub expr: Option<String>,

    /// Print only this stage (default: every stage in order)
    #[arg(long, value_enum)]
    pub stage: Option<Stage>,

    /// Print source names instead of resolved names
    #[arg(long)]
    pub source_names: bool,

    /// Stack size of the emulator, in words
    #[arg(long, default_value_t = 4096)]
    pub stack_size: usize,

    /// Step limit of the emulator
    #[arg(long, default_value_t = 1_000_000)]
    pub max_steps: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Stage {
    /// Tree after scope resolution
    Resolve,
    /// Type of the whole program
    Typecheck,
    /// Lambda-lifted program
    Lift,
    /// Instructions before linking
    Codegen,
    /// Linked instructions
    Link,
    /// Result of running on the emulator
    Run,
    /// Result of the tree-walking evaluator
    Eval,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Resolve,
        Stage::Typecheck,
        Stage::Lift,
        Stage::Codegen,
        Stage::Link,
        Stage::Run,
        Stage::Eval,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Stage::Resolve => "Resolved",
            Stage::Typecheck => "Type",
            Stage::Lift => "Lifted",
            Stage::Codegen => "Code",
            Stage::Link => "Linked",
            Stage::Run => "Result",
            Stage::Eval => "Evaluated",
        }
    }
}
