//! The typed AST the compiler hands us.
//!
//! This tree is immutable once loaded: `Root` owns an ordered sequence of
//! `Instruction`s, each of which owns an ordered sequence of `Operand`
//! children. Nothing here executes anything — see `crate::engine`.

use std::fmt;

/// One of the 25 instruction kinds the compiler can emit.
/// The ordinal values match the JSON wire encoding exactly so `TryFrom<u8>`
/// can double as the decoder.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum InstructionKind {
    Move = 0,
    Load = 1,
    Store = 2,
    Create = 3,
    Cast = 4,
    Add = 5,
    Sub = 6,
    Multiply = 7,
    Divide = 8,
    Or = 9,
    And = 10,
    Not = 11,
    Shift = 12,
    Compare = 13,
    Jump = 14,
    Call = 15,
    Push = 16,
    Pop = 17,
    Return = 18,
    Stop = 19,
    Input = 20,
    Output = 21,
    Print = 22,
    Label = 23,
    Comment = 24,
}

impl TryFrom<u8> for InstructionKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use InstructionKind::*;
        Ok(match value {
            0 => Move,
            1 => Load,
            2 => Store,
            3 => Create,
            4 => Cast,
            5 => Add,
            6 => Sub,
            7 => Multiply,
            8 => Divide,
            9 => Or,
            10 => And,
            11 => Not,
            12 => Shift,
            13 => Compare,
            14 => Jump,
            15 => Call,
            16 => Push,
            17 => Pop,
            18 => Return,
            19 => Stop,
            20 => Input,
            21 => Output,
            22 => Print,
            23 => Label,
            24 => Comment,
            other => return Err(other),
        })
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The compile-time-known kind of an operand literal.
/// `Float` is kept as a recognized wire value — it existed in earlier
/// drafts of the language — purely so the loader doesn't choke on it; any
/// attempt to actually use a `Float` operand at runtime is a `RuntimeError`.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum OperandKind {
    Register = 0,
    InstructionAddress = 1,
    MemoryAddress = 2,
    Integer = 3,
    Float = 4,
    Boolean = 5,
    Character = 6,
    String = 7,
    Newline = 8,
    TypeCondition = 9,
    ShiftCondition = 10,
    JumpCondition = 11,
    Unknown = 12,
    Empty = 13,
}

impl TryFrom<u8> for OperandKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use OperandKind::*;
        Ok(match value {
            0 => Register,
            1 => InstructionAddress,
            2 => MemoryAddress,
            3 => Integer,
            4 => Float,
            5 => Boolean,
            6 => Character,
            7 => String,
            8 => Newline,
            9 => TypeCondition,
            10 => ShiftCondition,
            11 => JumpCondition,
            12 => Unknown,
            13 => Empty,
            other => return Err(other),
        })
    }
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// How many operands an instruction kind expects. Carried alongside the
/// instruction rather than recomputed, since the compiler already knows it.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum NumOperands {
    Nullary = 0,
    Unary = 1,
    Binary = 2,
    Ternary = 3,
    Invalid = 4,
}

impl TryFrom<u8> for NumOperands {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use NumOperands::*;
        Ok(match value {
            0 => Nullary,
            1 => Unary,
            2 => Binary,
            3 => Ternary,
            4 => Invalid,
            other => return Err(other),
        })
    }
}

/// A leaf node: raw source text, its compile-time type tag, and source
/// position.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Operand {
    pub text: String,
    pub kind: OperandKind,
    pub line: i64,
    pub position: i64,
}

/// One instruction: display text, kind, arity, source line, and its
/// operand children in source order.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Instruction {
    pub text: String,
    pub kind: InstructionKind,
    pub arity: NumOperands,
    pub line: i64,
    pub operands: Vec<Operand>,
}

impl Instruction {
    pub fn operand(&self, index: usize) -> Option<&Operand> {
        self.operands.get(index)
    }
}

/// The root of the parsed program: an ordered sequence of instructions.
/// Immutable once loaded.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct Root {
    pub instructions: Vec<Instruction>,
}

impl Root {
    /// The index of the last valid instruction; the driver binds the
    /// engine to this.
    pub fn program_length(&self) -> u32 {
        self.instructions.len().saturating_sub(1) as u32
    }

    pub fn instruction_at(&self, pc: u32) -> Option<&Instruction> {
        self.instructions.get(pc as usize)
    }
}
