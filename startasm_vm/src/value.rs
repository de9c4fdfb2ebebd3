use std::fmt;

/// `Value` is the tagged payload held by a register, a memory cell, or a
/// stack slot. The tag travels with the payload rather than being inferred
/// from context — two registers can hold the same bit pattern under
/// different tags and the engine must tell them apart.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Value {
    /// 32-bit signed two's complement.
    Integer(i32),

    /// Bitwise operations treat this as a 32-bit word (`0` or `1`) even
    /// though logically it only ever carries `true`/`false`.
    Boolean(bool),

    /// Unsigned 8-bit, extended ASCII. Stored as its code point.
    Character(u8),

    /// Unsigned 32-bit index into the memory map.
    MemoryAddress(u32),

    /// Unsigned 32-bit index into the instruction stream.
    InstructionAddress(u32),

    /// Immediate string literal. Only ever produced transiently by `print`;
    /// never stored in a register or memory cell.
    Str(String),
}

/// The run-time-known kind of a stored `Value`. Distinct from `OperandKind`,
/// which is the compile-time-known kind of the operand literal that may
/// have produced the value.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Tag {
    Integer,
    Boolean,
    Character,
    MemoryAddress,
    InstructionAddress,
    Str,
}

impl Value {
    pub fn tag(&self) -> Tag {
        match self {
            Value::Integer(_) => Tag::Integer,
            Value::Boolean(_) => Tag::Boolean,
            Value::Character(_) => Tag::Character,
            Value::MemoryAddress(_) => Tag::MemoryAddress,
            Value::InstructionAddress(_) => Tag::InstructionAddress,
            Value::Str(_) => Tag::Str,
        }
    }

    /// The raw integer payload used by the flag-setting arithmetic rule.
    /// `Boolean` is treated as `0`/`1`, matching the bitwise operations'
    /// "treat it as a 32-bit word" rule.
    pub fn as_wrapping_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v as i64),
            Value::Boolean(v) => Some(*v as i64),
            Value::Character(v) => Some(*v as i64),
            Value::MemoryAddress(v) => Some(*v as i64),
            Value::InstructionAddress(v) => Some(*v as i64),
            Value::Str(_) => None,
        }
    }

    /// Format this value the way `output` renders it.
    pub fn render(&self) -> String {
        match self {
            Value::Integer(v) => v.to_string(),
            Value::Boolean(v) => if *v { "true".to_string() } else { "false".to_string() },
            Value::Character(v) => (*v as char).to_string(),
            Value::MemoryAddress(v) => format!("m<{}>", v),
            Value::InstructionAddress(v) => format!("i[{}]", v),
            Value::Str(v) => v.clone(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tag::Integer => "INTEGER",
            Tag::Boolean => "BOOLEAN",
            Tag::Character => "CHARACTER",
            Tag::MemoryAddress => "MEMORY_ADDRESS",
            Tag::InstructionAddress => "INSTRUCTION_ADDRESS",
            Tag::Str => "STRING",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.render(), self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_matches_output_format() {
        assert_eq!(Value::Integer(-7).render(), "-7");
        assert_eq!(Value::Boolean(true).render(), "true");
        assert_eq!(Value::Character(65).render(), "A");
        assert_eq!(Value::MemoryAddress(42).render(), "m<42>");
        assert_eq!(Value::InstructionAddress(6).render(), "i[6]");
    }
}
