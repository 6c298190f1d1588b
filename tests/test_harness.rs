// tests/test_harness.rs
//! Test harness for whole-pipeline tests.
//!
//! Loads programs from `tests/test_scripts`, where each file starts with a
//! `// expect: <value>` line, and runs them through the compiler, the
//! Trac42 emulator and the evaluator.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use lectlang::{CompileOptions, CompiledUnit, Value, compile_source_with, evaluate_source, vm};

/// A test program and its expected value.
pub struct Script {
    pub name: String,
    pub source: String,
    pub expected: Value,
}

/// Outcome of compiling and running one script.
pub struct ScriptRun {
    pub unit: CompiledUnit,
    pub machine_word: i32,
    pub evaluated: Value,
}

pub struct TestHarness {
    test_scripts_dir: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let test_scripts_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("test_scripts");
        Self { test_scripts_dir }
    }

    /// Load one script by file name.
    pub fn load(&self, filename: &str) -> Script {
        let path = self.test_scripts_dir.join(filename);
        let source = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
        let expected = source
            .lines()
            .next()
            .and_then(|line| line.strip_prefix("// expect:"))
            .map(|value| parse_value(value.trim()))
            .unwrap_or_else(|| panic!("{filename} has no '// expect:' header"));
        Script {
            name: filename.to_string(),
            source,
            expected,
        }
    }

    /// Every script in the directory, sorted by name.
    pub fn load_all(&self) -> Vec<Script> {
        let mut names: Vec<String> = fs::read_dir(&self.test_scripts_dir)
            .expect("test_scripts directory")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".lect"))
            .collect();
        names.sort();
        names.iter().map(|name| self.load(name)).collect()
    }
}

fn parse_value(text: &str) -> Value {
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        n => Value::Num(n.parse().unwrap_or_else(|_| panic!("bad expected value '{n}'"))),
    }
}

impl Script {
    /// Compile with every stage kept, then run both back ends.
    pub fn run(&self) -> ScriptRun {
        let unit = compile_source_with(&self.source, CompileOptions::traced())
            .unwrap_or_else(|e| panic!("{} failed to compile: {}", self.name, e));
        let machine_word = vm::execute(&unit.module)
            .unwrap_or_else(|e| panic!("{} failed on the machine: {}", self.name, e));
        let evaluated = evaluate_source(&self.source)
            .unwrap_or_else(|e| panic!("{} failed to evaluate: {}", self.name, e));
        ScriptRun {
            unit,
            machine_word,
            evaluated,
        }
    }
}
