//! Unified error types for the lecture language toolchain.
//!
//! ## Error Hierarchy
//!
//! ```text
//! LectError (top-level wrapper)
//! ├── ParseError    - Lexer and parser errors (with ParseErrorKind)
//! ├── TypeError     - User-facing type errors; abort the pipeline
//! ├── InternalError - Broken pass contracts; never a language error
//! ├── EvalError     - Tree-walking evaluator errors
//! └── MachineError  - Trac42 abstract machine errors
//! ```
//!
//! Each phase-specific error type can be used directly, or converted to
//! [`LectError`] with `?`.

use thiserror::Error;

use crate::Span;
use crate::ast::{BinaryOp, Type};

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors that occur during lexical analysis (tokenization).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// An unexpected character was encountered.
    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },

    /// A numeric literal could not be parsed.
    #[error("invalid number at {span}: {detail}")]
    InvalidNumber { span: Span, detail: String },
}

impl LexError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. } => *span,
            LexError::InvalidNumber { span, .. } => *span,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// The lexer rejected the input.
    InvalidToken,
    /// A specific token was expected but not found.
    ExpectedToken,
    /// An expression was expected.
    ExpectedExpression,
    /// An identifier was expected.
    ExpectedIdentifier,
    /// A type annotation (`num` or `bool`) was expected.
    ExpectedType,
    /// Input continued after a complete expression.
    UnexpectedToken,
    /// Unexpected end of input.
    UnexpectedEof,
}

impl ParseErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::InvalidToken => "invalid token",
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::ExpectedExpression => "expected expression",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::ExpectedType => "expected type",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::UnexpectedEof => "unexpected end of input",
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parse error with location and context.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}: {message}")]
pub struct ParseError {
    /// The category of this error.
    pub kind: ParseErrorKind,
    /// The source location where the error occurred.
    pub span: Span,
    /// A detailed error message.
    pub message: String,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Create an "expected token" error.
    pub fn expected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedToken,
            span,
            format!("expected {expected}, found {found}"),
        )
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::new(ParseErrorKind::InvalidToken, err.span(), err.to_string())
    }
}

// ============================================================================
// Type Errors
// ============================================================================

/// User-facing type errors. The first one aborts the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    /// A variable reference has no enclosing binding.
    #[error("at {span}: variable '{name}' not declared")]
    UndeclaredVariable { name: String, span: Span },

    /// A call names no enclosing function.
    #[error("at {span}: function '{name}' not declared")]
    UndeclaredFunction { name: String, span: Span },

    /// A call's argument does not match the declared parameter type.
    #[error("at {span}: argument type mismatch in call to '{function}': expected {expected}, found {found}")]
    ArgumentTypeMismatch {
        function: String,
        expected: Type,
        found: Type,
        span: Span,
    },

    /// A call to a lifted function passes the wrong number of arguments.
    #[error("at {span}: '{function}' expects {expected} argument(s), found {found}")]
    ArityMismatch {
        function: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    /// A function body does not produce the declared return type.
    #[error("at {span}: return type mismatch in '{function}': declared {expected}, body has {found}")]
    ReturnTypeMismatch {
        function: String,
        expected: Type,
        found: Type,
        span: Span,
    },

    /// An operator was applied to operands of the wrong types.
    #[error("at {span}: {message} (found {left} {op} {right})")]
    OperandTypeMismatch {
        op: BinaryOp,
        left: Type,
        right: Type,
        message: &'static str,
        span: Span,
    },
}

impl TypeError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            TypeError::UndeclaredVariable { span, .. } => *span,
            TypeError::UndeclaredFunction { span, .. } => *span,
            TypeError::ArgumentTypeMismatch { span, .. } => *span,
            TypeError::ArityMismatch { span, .. } => *span,
            TypeError::ReturnTypeMismatch { span, .. } => *span,
            TypeError::OperandTypeMismatch { span, .. } => *span,
        }
    }
}

// ============================================================================
// Internal Errors
// ============================================================================

/// A pass received input that an earlier pass should have ruled out.
///
/// These are defects in the compiler, not errors in the user's program.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InternalError {
    /// A call names a function with no active lift mapping.
    #[error("internal error: call to '{name}' has no lifted function")]
    UnliftedFunction { name: String },

    /// A branch or call targets a label that was never emitted.
    #[error("internal error: unresolved label '{label}'")]
    UnresolvedLabel { label: String },

    /// The same label was emitted twice.
    #[error("internal error: duplicate label '{label}'")]
    DuplicateLabel { label: String },

    /// A node kind reached a pass that must never see it.
    #[error("internal error: unexpected {node} node during {pass}")]
    UnexpectedNode {
        pass: &'static str,
        node: &'static str,
    },

    /// A variable has no frame offset.
    #[error("internal error: no frame offset for '{name}'")]
    UnboundOffset { name: String },

    /// A node that needs a checked type has none.
    #[error("internal error: missing type for {what}")]
    MissingType { what: String },
}

// ============================================================================
// Evaluation Errors
// ============================================================================

/// Errors raised by the tree-walking evaluator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A variable reference has no binding.
    #[error("at {span}: variable '{name}' not found")]
    UnboundVariable { name: String, span: Span },

    /// A call names no function.
    #[error("at {span}: function '{name}' not found")]
    UnboundFunction { name: String, span: Span },

    /// An operator received a value of the wrong kind.
    #[error("at {span}: operands of '{op}' have the wrong kind")]
    OperandMismatch { op: BinaryOp, span: Span },

    /// A lifted call received the wrong number of arguments.
    #[error("at {span}: '{name}' expects {expected} argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
        span: Span,
    },
}

// ============================================================================
// Machine Errors
// ============================================================================

/// Errors raised while running a module on the Trac42 abstract machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineError {
    /// The stack grew past its configured size.
    #[error("stack overflow at pc {pc}")]
    StackOverflow { pc: usize },

    /// An instruction popped an empty stack.
    #[error("stack underflow at pc {pc}")]
    StackUnderflow { pc: usize },

    /// A frame-relative address fell outside the stack.
    #[error("invalid address {address} at pc {pc}")]
    InvalidAddress { pc: usize, address: i64 },

    /// Control transferred outside the instruction sequence.
    #[error("program counter {pc} out of bounds")]
    PcOutOfBounds { pc: usize },

    /// A control-flow instruction still has a symbolic target.
    #[error("unlinked target '{label}' at pc {pc}")]
    UnlinkedTarget { pc: usize, label: String },

    /// An instruction is missing the operand it needs.
    #[error("malformed instruction at pc {pc}")]
    MalformedInstruction { pc: usize },

    /// The module has no `main` label.
    #[error("module has no main entry point")]
    MissingEntryPoint,

    /// Execution ran for more steps than allowed.
    #[error("step limit of {limit} exceeded")]
    StepLimit { limit: u64 },
}

// ============================================================================
// Unified Error
// ============================================================================

/// The unified error type for all toolchain operations.
///
/// ## Example
///
/// ```ignore
/// fn run(source: &str) -> Result<i32, LectError> {
///     let expr = parse(source)?;        // ParseError -> LectError
///     let unit = compile(expr)?;        // TypeError / InternalError -> LectError
///     Ok(execute(&unit.module)?)        // MachineError -> LectError
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LectError {
    /// A lexer or parser error.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A type error.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// A broken compiler invariant.
    #[error(transparent)]
    Internal(#[from] InternalError),

    /// An evaluator error.
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// An abstract machine error.
    #[error(transparent)]
    Machine(#[from] MachineError),
}

impl From<LexError> for LectError {
    fn from(err: LexError) -> Self {
        LectError::Parse(err.into())
    }
}

impl LectError {
    /// Check if this is a parse error.
    pub fn is_parse(&self) -> bool {
        matches!(self, LectError::Parse(_))
    }

    /// Check if this is a type error.
    pub fn is_type(&self) -> bool {
        matches!(self, LectError::Type(_))
    }

    /// Check if this is an internal error.
    pub fn is_internal(&self) -> bool {
        matches!(self, LectError::Internal(_))
    }

    /// Check if this is an evaluator error.
    pub fn is_eval(&self) -> bool {
        matches!(self, LectError::Eval(_))
    }

    /// Check if this is a machine error.
    pub fn is_machine(&self) -> bool {
        matches!(self, LectError::Machine(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
