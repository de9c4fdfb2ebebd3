//! Deserializes the compiler's JSON output into the AST model. The compiler
//! itself — spawning `run-container <image> ast <path>` and reading its
//! stdout — is the driver's job; this module only turns already-read JSON
//! text into a `Root`.

use serde::Deserialize;
use thiserror::Error;

use crate::ast::{Instruction, NumOperands, Operand, OperandKind, Root, InstructionKind};

/// The recursive wire shape the compiler emits. Every node carries `type`
/// and `value`; `instruction_type`/`num_operands`/`operand_type`/`position`
/// are only present on the node kinds that use them, hence `Option`.
#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    children: Vec<RawNode>,
    instruction_type: Option<u8>,
    num_operands: Option<u8>,
    line: Option<i64>,
    operand_type: Option<u8>,
    position: Option<i64>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoaderError {
    #[error("failed to parse compiler output as JSON: {0}")]
    Json(String),

    #[error("unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("unknown instruction type: {0}")]
    UnknownInstructionType(u8),

    #[error("unknown operand type: {0}")]
    UnknownOperandType(u8),

    #[error("unknown operand arity: {0}")]
    UnknownArity(u8),

    #[error("INSTRUCTION node is missing its instruction_type field")]
    MissingInstructionType,

    #[error("OPERAND node is missing its operand_type field")]
    MissingOperandType,

    #[error("ROOT node's children must all be INSTRUCTION nodes, found {0}")]
    RootChildNotInstruction(String),

    #[error("INSTRUCTION node's children must all be OPERAND nodes, found {0}")]
    InstructionChildNotOperand(String),
}

/// Parse a compiler JSON document into a `Root`.
pub fn load_from_str(json: &str) -> Result<Root, LoaderError> {
    let raw: RawNode = serde_json::from_str(json).map_err(|e| LoaderError::Json(e.to_string()))?;
    build_root(&raw)
}

fn build_root(raw: &RawNode) -> Result<Root, LoaderError> {
    if raw.node_type != "ROOT" {
        return Err(LoaderError::UnknownNodeType(raw.node_type.clone()));
    }

    let mut instructions = Vec::with_capacity(raw.children.len());
    for child in &raw.children {
        if child.node_type != "INSTRUCTION" {
            return Err(LoaderError::RootChildNotInstruction(child.node_type.clone()));
        }
        instructions.push(build_instruction(child)?);
    }

    Ok(Root { instructions })
}

fn build_instruction(raw: &RawNode) -> Result<Instruction, LoaderError> {
    let ordinal = raw.instruction_type.ok_or(LoaderError::MissingInstructionType)?;
    let kind = InstructionKind::try_from(ordinal).map_err(LoaderError::UnknownInstructionType)?;

    let arity = match raw.num_operands {
        Some(n) => NumOperands::try_from(n).map_err(LoaderError::UnknownArity)?,
        None => NumOperands::Invalid,
    };

    let mut operands = Vec::with_capacity(raw.children.len());
    for child in &raw.children {
        if child.node_type != "OPERAND" {
            return Err(LoaderError::InstructionChildNotOperand(child.node_type.clone()));
        }
        operands.push(build_operand(child)?);
    }

    Ok(Instruction {
        text: raw.value.clone(),
        kind,
        arity,
        line: raw.line.unwrap_or(-1),
        operands,
    })
}

fn build_operand(raw: &RawNode) -> Result<Operand, LoaderError> {
    let ordinal = raw.operand_type.ok_or(LoaderError::MissingOperandType)?;
    let kind: OperandKind = OperandKind::try_from(ordinal).map_err(LoaderError::UnknownOperandType)?;

    Ok(Operand {
        text: raw.value.clone(),
        kind,
        line: raw.line.unwrap_or(-1),
        position: raw.position.unwrap_or(-1),
    })
}
