use thiserror::Error;

use crate::value::Tag;

/// A runtime error: a semantic violation inside the VM (uninitialized read,
/// type mismatch, division by zero, ...). Reported through the engine's
/// `Io` sink, then the engine halts: `pc := program_length + 1`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Source register {0} is not initialized.")]
    UninitializedRegister(String),

    #[error("Memory address {0} is not initialized.")]
    UninitializedMemory(u32),

    #[error("{reg} does not contain a memory address.")]
    NotAMemoryAddress { reg: String },

    #[error("{a} and {b} are of different types {a_tag}, {b_tag}.")]
    TypeMismatch { a: String, b: String, a_tag: Tag, b_tag: Tag },

    #[error("{reg} holds an incompatible type {tag} for this operation.")]
    ImpermissibleType { reg: String, tag: Tag },

    #[error("Division by zero.")]
    DivisionByZero,

    #[error("Stack is empty.")]
    StackUnderflow,

    #[error("Malformed address literal: {0}")]
    MalformedAddressLiteral(String),

    #[error("Floating point values are not supported at runtime.")]
    FloatUnsupported,

    #[error("Operand decoder does not recognize type tag {0:?}")]
    UnrecognizedOperandKind(crate::ast::OperandKind),

    #[error("Invalid literal {0:?} for create.")]
    InvalidLiteral(String),

    #[error("Instruction is missing its operand at position {0}.")]
    MissingOperand(usize),
}

/// An input error: user-supplied data for `input` failed validation.
/// Reported through the `Io` sink; unlike `RuntimeError`, `pc` is left
/// untouched so the driver may retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid input {0:?} for type int.")]
    InvalidInteger(String),

    #[error("Excess input {0:?} for type char.")]
    ExcessCharacterInput(String),

    #[error("Input {0:?} out of extended ASCII range.")]
    CharacterOutOfRange(String),

    #[error("Invalid input {0:?} for type bool.")]
    InvalidBoolean(String),

    #[error(transparent)]
    Io(#[from] IoReadError),
}

/// Wraps a failure to read from the input channel itself (as opposed to a
/// validation failure on what was read).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to read from input channel: {0}")]
pub struct IoReadError(pub String);

/// Either failure mode a handler can signal. The engine's top-level
/// dispatcher is the only place that inspects this to decide whether to
/// halt — handlers themselves just return one or the other.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Input(#[from] InputError),
}

impl Fault {
    pub fn halts(&self) -> bool {
        matches!(self, Fault::Runtime(_))
    }
}
