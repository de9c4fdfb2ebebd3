//! The execution engine: exhaustive dispatch from `InstructionKind` to
//! per-instruction semantics, shared flag-update and address-decoding
//! helpers, and the halt-by-pc-overrun termination channel. A plain `match`
//! over every instruction kind, one handler method per variant.

use crate::ast::{Instruction, InstructionKind, Operand, OperandKind};
use crate::error::{Fault, InputError, IoReadError, RuntimeError};
use crate::flags::Flag;
use crate::io::Io;
use crate::runtime::Runtime;
use crate::value::{Tag, Value};

const ARITHMETIC_TAGS: [Tag; 4] = [Tag::Integer, Tag::MemoryAddress, Tag::Boolean, Tag::Character];

/// Owns the injected `Io` sink and the two pc landmarks every halt check
/// needs. Does not own the `Runtime` or the `Root` AST — those are
/// borrowed for the duration of one `execute` call.
pub struct Engine<I: Io> {
    program_length: u32,
    halt_pc: u32,
    io: I,
}

impl<I: Io> Engine<I> {
    pub fn new(program_length: u32, io: I) -> Engine<I> {
        Engine { program_length, halt_pc: program_length + 1, io }
    }

    pub fn program_length(&self) -> u32 {
        self.program_length
    }

    pub fn halt_pc(&self) -> u32 {
        self.halt_pc
    }

    pub fn io(&mut self) -> &mut I {
        &mut self.io
    }

    /// Runs one instruction to completion: dispatches, then applies the
    /// pc-advance rule and, on a runtime error, halts by pc-overrun. An
    /// input error is reported but leaves `pc` untouched so the driver may
    /// retry.
    pub fn execute(&mut self, rt: &mut Runtime, instruction: &Instruction) {
        match self.dispatch(rt, instruction) {
            Ok(Some(target)) => rt.set_pc(target),
            Ok(None) => rt.increment_pc(),
            Err(fault) => {
                self.io.write_line(&fault.to_string());
                if fault.halts() {
                    rt.set_pc(self.halt_pc);
                }
            }
        }
    }

    fn dispatch(&mut self, rt: &mut Runtime, instruction: &Instruction) -> Result<Option<u32>, Fault> {
        use InstructionKind::*;
        match instruction.kind {
            Move => self.op_move(rt, instruction),
            Load => self.op_load(rt, instruction),
            Store => self.op_store(rt, instruction),
            Create => self.op_create(rt, instruction),
            Cast | Call | Return | Label | Comment => Ok(None),
            Add => self.op_arith(rt, instruction, |a, b| a + b),
            Sub => self.op_arith(rt, instruction, |a, b| a - b),
            Multiply => self.op_arith(rt, instruction, |a, b| a * b),
            Divide => self.op_divide(rt, instruction),
            Or => self.op_bitwise(rt, instruction, |a, b| a | b),
            And => self.op_bitwise(rt, instruction, |a, b| a & b),
            Not => self.op_not(rt, instruction),
            Shift => self.op_shift(rt, instruction),
            Compare => self.op_compare(rt, instruction),
            Jump => self.op_jump(rt, instruction),
            Push => self.op_push(rt, instruction),
            Pop => self.op_pop(rt, instruction),
            Stop => Ok(Some(self.halt_pc)),
            Input => self.op_input(rt, instruction),
            Output => self.op_output(rt, instruction),
            Print => self.op_print(instruction),
        }
    }

    // --- Data movement ---------------------------------------------------

    fn op_move(&mut self, rt: &mut Runtime, instr: &Instruction) -> Result<Option<u32>, Fault> {
        let src = operand(instr, 0)?;
        let dst = operand(instr, 1)?;
        let value = read_register(rt, &src.text)?;
        rt.set_register(&dst.text, value);
        Ok(None)
    }

    fn op_load(&mut self, rt: &mut Runtime, instr: &Instruction) -> Result<Option<u32>, Fault> {
        let src = operand(instr, 0)?;
        let dst = operand(instr, 1)?;
        let addr = resolve_address_operand(rt, src)?;
        if !rt.addr_initialized(addr) {
            return Err(RuntimeError::UninitializedMemory(addr).into());
        }
        let value = rt.get_memory(addr).expect("just checked addr_initialized");
        rt.set_register(&dst.text, value);
        Ok(None)
    }

    fn op_store(&mut self, rt: &mut Runtime, instr: &Instruction) -> Result<Option<u32>, Fault> {
        let src = operand(instr, 0)?;
        let dst = operand(instr, 1)?;
        let value = read_register(rt, &src.text)?;
        let addr = resolve_address_operand(rt, dst)?;
        rt.set_memory(addr, value);
        Ok(None)
    }

    fn op_create(&mut self, rt: &mut Runtime, instr: &Instruction) -> Result<Option<u32>, Fault> {
        let literal = operand(instr, 1)?;
        let dst = operand(instr, 2)?;
        let value = decode_literal(literal)?;
        rt.set_register(&dst.text, value);
        Ok(None)
    }

    // --- Arithmetic / logical ---------------------------------------------

    fn op_arith(
        &mut self,
        rt: &mut Runtime,
        instr: &Instruction,
        op: fn(i64, i64) -> i64,
    ) -> Result<Option<u32>, Fault> {
        let s1 = operand(instr, 0)?;
        let s2 = operand(instr, 1)?;
        let dst = operand(instr, 2)?;
        let a = read_register(rt, &s1.text)?;
        let b = read_register(rt, &s2.text)?;
        require_same_tag(&s1.text, &a, &s2.text, &b)?;
        require_tag_in(&s1.text, &a, &ARITHMETIC_TAGS)?;

        let raw = op(a.as_wrapping_i64().expect("checked above"), b.as_wrapping_i64().expect("checked above"));
        let (wrapped, overflow) = wrap_result(raw, a.tag());
        rt.update_flags(wrapped, overflow);
        rt.set_register(&dst.text, make_value(wrapped, a.tag()));
        Ok(None)
    }

    fn op_divide(&mut self, rt: &mut Runtime, instr: &Instruction) -> Result<Option<u32>, Fault> {
        let s1 = operand(instr, 0)?;
        let s2 = operand(instr, 1)?;
        let dst = operand(instr, 2)?;
        let a = read_register(rt, &s1.text)?;
        let b = read_register(rt, &s2.text)?;
        require_same_tag(&s1.text, &a, &s2.text, &b)?;
        require_tag_in(&s1.text, &a, &[Tag::Integer])?;

        let (a, b) = match (&a, &b) {
            (Value::Integer(a), Value::Integer(b)) => (*a as i64, *b as i64),
            _ => unreachable!("require_tag_in restricted these to Integer"),
        };
        if b == 0 {
            return Err(RuntimeError::DivisionByZero.into());
        }
        let raw = floor_div(a, b);
        let (wrapped, overflow) = wrap_result(raw, Tag::Integer);
        rt.update_flags(wrapped, overflow);
        rt.set_register(&dst.text, make_value(wrapped, Tag::Integer));
        Ok(None)
    }

    fn op_bitwise(
        &mut self,
        rt: &mut Runtime,
        instr: &Instruction,
        op: fn(u32, u32) -> u32,
    ) -> Result<Option<u32>, Fault> {
        let r1 = operand(instr, 0)?;
        let r2 = operand(instr, 1)?;
        let a = read_register(rt, &r1.text)?;
        let b = read_register(rt, &r2.text)?;
        require_same_tag(&r1.text, &a, &r2.text, &b)?;
        let raw_a = to_u32_bits(&a).ok_or_else(|| RuntimeError::ImpermissibleType { reg: r1.text.clone(), tag: a.tag() })?;
        let raw_b = to_u32_bits(&b).ok_or_else(|| RuntimeError::ImpermissibleType { reg: r2.text.clone(), tag: b.tag() })?;
        let result = op(raw_a, raw_b) as i32 as i64;
        let (wrapped, overflow) = wrap_result(result, a.tag());
        rt.update_flags(wrapped, overflow);
        rt.set_register(&r1.text, make_value(wrapped, a.tag()));
        Ok(None)
    }

    fn op_not(&mut self, rt: &mut Runtime, instr: &Instruction) -> Result<Option<u32>, Fault> {
        let r = operand(instr, 0)?;
        let value = read_register(rt, &r.text)?;
        if let Value::Boolean(b) = value {
            let negated = !b;
            rt.update_flags(if negated { 1 } else { 0 }, Some(false));
            rt.set_register(&r.text, Value::Boolean(negated));
            return Ok(None);
        }
        let raw = to_u32_bits(&value).ok_or_else(|| RuntimeError::ImpermissibleType { reg: r.text.clone(), tag: value.tag() })?;
        let result = (!raw) as i32 as i64;
        let (wrapped, overflow) = wrap_result(result, value.tag());
        rt.update_flags(wrapped, overflow);
        rt.set_register(&r.text, make_value(wrapped, value.tag()));
        Ok(None)
    }

    fn op_shift(&mut self, rt: &mut Runtime, instr: &Instruction) -> Result<Option<u32>, Fault> {
        let direction = operand(instr, 0)?;
        let src = operand(instr, 1)?;
        let amount_reg = operand(instr, 2)?;
        let value = read_register(rt, &src.text)?;

        // The shift-amount register is a precondition of the instruction
        // itself, independent of src's tag, so it's read and validated
        // before the boolean short-circuit below — a malformed or
        // uninitialized amount register must halt even when src is BOOLEAN.
        let amount_value = read_register(rt, &amount_reg.text)?;
        let amount = match amount_value {
            Value::Integer(n) => n as u32,
            other => return Err(RuntimeError::ImpermissibleType { reg: amount_reg.text.clone(), tag: other.tag() }.into()),
        };

        if let Value::Boolean(_) = value {
            rt.update_flags(0, Some(false));
            rt.set_register(&src.text, Value::Boolean(false));
            return Ok(None);
        }

        let raw = to_u32_bits(&value).ok_or_else(|| RuntimeError::ImpermissibleType { reg: src.text.clone(), tag: value.tag() })?;
        let shifted = if direction.text == "left" {
            raw.wrapping_shl(amount)
        } else {
            (raw as i32).wrapping_shr(amount) as u32
        };
        let result = shifted as i32 as i64;
        let (wrapped, overflow) = wrap_result(result, value.tag());
        rt.update_flags(wrapped, overflow);
        rt.set_register(&src.text, make_value(wrapped, value.tag()));
        Ok(None)
    }

    fn op_compare(&mut self, rt: &mut Runtime, instr: &Instruction) -> Result<Option<u32>, Fault> {
        let s1 = operand(instr, 0)?;
        let s2 = operand(instr, 1)?;
        let a = read_register(rt, &s1.text)?;
        let b = read_register(rt, &s2.text)?;
        require_same_tag(&s1.text, &a, &s2.text, &b)?;
        require_tag_in(&s1.text, &a, &ARITHMETIC_TAGS)?;

        let raw = a.as_wrapping_i64().expect("checked above") - b.as_wrapping_i64().expect("checked above");
        let (wrapped, overflow) = wrap_result(raw, a.tag());
        rt.update_flags(wrapped, overflow);
        Ok(None)
    }

    fn op_jump(&mut self, rt: &mut Runtime, instr: &Instruction) -> Result<Option<u32>, Fault> {
        let condition = operand(instr, 0)?;
        let target = operand(instr, 1)?;

        let z = rt.get_flag(Flag::Zero);
        let s = rt.get_flag(Flag::Sign);
        let o = rt.get_flag(Flag::Overflow);
        let taken = match condition.text.as_str() {
            "greater" => !z && (s == o),
            "less" => s != o,
            "equal" | "zero" => z,
            "unequal" | "nonzero" => !z,
            "negative" => s,
            "positive" => !s && !z,
            "unconditional" => true,
            other => return Err(RuntimeError::MalformedAddressLiteral(format!("unknown jump condition {other:?}")).into()),
        };

        if taken {
            Ok(Some(decode_address(&target.text)?))
        } else {
            Ok(None)
        }
    }

    fn op_push(&mut self, rt: &mut Runtime, instr: &Instruction) -> Result<Option<u32>, Fault> {
        let src = operand(instr, 0)?;
        let value = read_register(rt, &src.text)?;
        rt.push_stack(value);
        Ok(None)
    }

    fn op_pop(&mut self, rt: &mut Runtime, instr: &Instruction) -> Result<Option<u32>, Fault> {
        let dst = operand(instr, 0)?;
        if !rt.addr_initialized(rt.stack_pointer()) {
            return Err(RuntimeError::StackUnderflow.into());
        }
        let value = rt.pop_stack().expect("checked addr_initialized at sp");
        rt.set_register(&dst.text, value);
        Ok(None)
    }

    // --- I/O -----------------------------------------------------------

    fn op_input(&mut self, rt: &mut Runtime, instr: &Instruction) -> Result<Option<u32>, Fault> {
        let type_kw = operand(instr, 0)?;
        let dst = operand(instr, 1)?;

        let line = self
            .io
            .read_line()
            .map_err(|e| InputError::from(IoReadError(e.to_string())))?;

        let value = match type_kw.text.as_str() {
            "integer" => line
                .trim()
                .parse::<i32>()
                .map(Value::Integer)
                .map_err(|_| InputError::InvalidInteger(line.clone()))?,
            "character" => {
                let bytes = line.as_bytes();
                if bytes.len() != 1 {
                    return Err(InputError::ExcessCharacterInput(line).into());
                }
                if bytes[0] > 127 {
                    return Err(InputError::CharacterOutOfRange(line).into());
                }
                Value::Character(bytes[0])
            }
            "boolean" => {
                const TRUE_SET: [&str; 6] = ["true", "1", "True", "t", "TRUE", "T"];
                const FALSE_SET: [&str; 6] = ["false", "0", "False", "f", "FALSE", "F"];
                if TRUE_SET.contains(&line.as_str()) {
                    Value::Boolean(true)
                } else if FALSE_SET.contains(&line.as_str()) {
                    Value::Boolean(false)
                } else {
                    return Err(InputError::InvalidBoolean(line).into());
                }
            }
            _ => return Err(RuntimeError::InvalidLiteral(type_kw.text.clone()).into()),
        };

        rt.set_register(&dst.text, value);
        Ok(None)
    }

    fn op_output(&mut self, rt: &mut Runtime, instr: &Instruction) -> Result<Option<u32>, Fault> {
        let src = operand(instr, 0)?;
        let value = read_register(rt, &src.text)?;
        self.io.write_str(&value.render());
        Ok(None)
    }

    fn op_print(&mut self, instr: &Instruction) -> Result<Option<u32>, Fault> {
        let literal = operand(instr, 0)?;
        if literal.kind == OperandKind::Newline {
            self.io.write_line("");
        } else {
            self.io.write_str(strip_quotes(&literal.text));
        }
        Ok(None)
    }
}

// --- Shared helpers --------------------------------------------------------

fn operand(instr: &Instruction, index: usize) -> Result<&Operand, RuntimeError> {
    instr.operand(index).ok_or(RuntimeError::MissingOperand(index))
}

fn read_register(rt: &Runtime, name: &str) -> Result<Value, RuntimeError> {
    rt.get_register(name).ok_or_else(|| RuntimeError::UninitializedRegister(name.to_string()))
}

fn require_same_tag(a_name: &str, a: &Value, b_name: &str, b: &Value) -> Result<(), RuntimeError> {
    if a.tag() == b.tag() {
        Ok(())
    } else {
        Err(RuntimeError::TypeMismatch { a: a_name.to_string(), b: b_name.to_string(), a_tag: a.tag(), b_tag: b.tag() })
    }
}

fn require_tag_in(name: &str, value: &Value, allowed: &[Tag]) -> Result<(), RuntimeError> {
    if allowed.contains(&value.tag()) {
        Ok(())
    } else {
        Err(RuntimeError::ImpermissibleType { reg: name.to_string(), tag: value.tag() })
    }
}

/// Reinterprets a value's raw payload as an unsigned 32-bit word for
/// bitwise operations, which mask both operands to 32 bits. `Str` has no
/// bit pattern and is rejected.
fn to_u32_bits(value: &Value) -> Option<u32> {
    value.as_wrapping_i64().map(|raw| raw as i64 as u32)
}

/// Resolves a `load`/`store` address operand: a bare `m<N>` literal decodes
/// directly, while a register operand must itself hold a `MEMORY_ADDRESS`.
fn resolve_address_operand(rt: &Runtime, operand: &Operand) -> Result<u32, RuntimeError> {
    if operand.kind == OperandKind::Register {
        match read_register(rt, &operand.text)? {
            Value::MemoryAddress(addr) => Ok(addr),
            _ => Err(RuntimeError::NotAMemoryAddress { reg: operand.text.clone() }),
        }
    } else {
        decode_address(&operand.text)
    }
}

/// Strips the two-character prefix (`m<`/`i[`) and trailing bracket from an
/// address literal and parses the remaining digits.
fn decode_address(text: &str) -> Result<u32, RuntimeError> {
    if text.len() < 3 {
        return Err(RuntimeError::MalformedAddressLiteral(text.to_string()));
    }
    let inner = &text[2..text.len() - 1];
    inner.parse::<u32>().map_err(|_| RuntimeError::MalformedAddressLiteral(text.to_string()))
}

/// Strips one leading and one trailing quote character (`'` or `"`), per
/// `print`'s literal-unwrapping rule. Text that isn't quoted is passed
/// through unchanged.
fn strip_quotes(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'\'' || first == b'"') && first == last {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// Parses a `create` literal according to the operand's own compile-time
/// type tag, rather than re-parsing the adjacent type-keyword text.
fn decode_literal(literal: &Operand) -> Result<Value, RuntimeError> {
    match literal.kind {
        OperandKind::Integer => literal
            .text
            .parse::<i32>()
            .map(Value::Integer)
            .map_err(|_| RuntimeError::InvalidLiteral(literal.text.clone())),
        OperandKind::Boolean => match literal.text.as_str() {
            "true" => Ok(Value::Boolean(true)),
            "false" => Ok(Value::Boolean(false)),
            _ => Err(RuntimeError::InvalidLiteral(literal.text.clone())),
        },
        OperandKind::Character => {
            let stripped = strip_quotes(&literal.text);
            let mut chars = stripped.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if (c as u32) <= 255 => Ok(Value::Character(c as u8)),
                _ => Err(RuntimeError::InvalidLiteral(literal.text.clone())),
            }
        }
        OperandKind::MemoryAddress => decode_address(&literal.text).map(Value::MemoryAddress),
        OperandKind::InstructionAddress => decode_address(&literal.text).map(Value::InstructionAddress),
        OperandKind::Float => Err(RuntimeError::FloatUnsupported),
        other => Err(RuntimeError::UnrecognizedOperandKind(other)),
    }
}

/// Floored integer division, rounding toward negative infinity rather than
/// Rust's truncating `/`.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

/// Shared flag-setting wrap rule. The overflow component is `None` for
/// `CHARACTER` results: per spec §4.2 rule 1, a character wrap is
/// definitional rather than an overflow test, so `O` must be left holding
/// whatever a prior flag-setting op set it to rather than forced to `false`.
fn wrap_result(raw: i64, tag: Tag) -> (i64, Option<bool>) {
    if tag == Tag::Character {
        (raw.rem_euclid(256), None)
    } else {
        let overflow = raw < i32::MIN as i64 || raw > i32::MAX as i64;
        let wrapped = ((raw + (1i64 << 31)).rem_euclid(1i64 << 32)) - (1i64 << 31);
        (wrapped, Some(overflow))
    }
}

fn make_value(wrapped: i64, tag: Tag) -> Value {
    match tag {
        Tag::Integer => Value::Integer(wrapped as i32),
        Tag::Boolean => Value::Boolean(wrapped != 0),
        Tag::Character => Value::Character(wrapped as u8),
        Tag::MemoryAddress => Value::MemoryAddress(wrapped as u32),
        Tag::InstructionAddress => Value::InstructionAddress(wrapped as u32),
        Tag::Str => Value::Str(wrapped.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NumOperands, OperandKind};
    use crate::io::ScriptedIo;

    fn reg(text: &str) -> Operand {
        Operand { text: text.to_string(), kind: OperandKind::Register, line: 1, position: 0 }
    }

    fn instr(kind: InstructionKind, operands: Vec<Operand>) -> Instruction {
        Instruction { text: String::new(), kind, arity: NumOperands::Ternary, line: 1, operands }
    }

    #[test]
    fn add_wraps_and_sets_overflow() {
        let mut rt = Runtime::new();
        rt.set_register("r1", Value::Integer(i32::MAX));
        rt.set_register("r2", Value::Integer(1));
        let mut engine = Engine::new(10, ScriptedIo::default());
        let i = instr(InstructionKind::Add, vec![reg("r1"), reg("r2"), reg("r3")]);
        engine.execute(&mut rt, &i);
        assert_eq!(rt.get_register("r3"), Some(Value::Integer(i32::MIN)));
        assert!(rt.get_flag(Flag::Overflow));
        assert!(rt.get_flag(Flag::Sign));
        assert!(!rt.get_flag(Flag::Zero));
        assert_eq!(rt.get_pc(), 1);
    }

    #[test]
    fn divide_by_zero_halts() {
        let mut rt = Runtime::new();
        rt.set_register("r1", Value::Integer(5));
        rt.set_register("r2", Value::Integer(0));
        let mut engine = Engine::new(10, ScriptedIo::default());
        let i = instr(InstructionKind::Divide, vec![reg("r1"), reg("r2"), reg("r3")]);
        engine.execute(&mut rt, &i);
        assert_eq!(rt.get_register("r3"), None);
        assert_eq!(rt.get_pc(), engine.halt_pc());
    }

    #[test]
    fn divide_floors_toward_negative_infinity() {
        let mut rt = Runtime::new();
        rt.set_register("r1", Value::Integer(-7));
        rt.set_register("r2", Value::Integer(2));
        let mut engine = Engine::new(10, ScriptedIo::default());
        let i = instr(InstructionKind::Divide, vec![reg("r1"), reg("r2"), reg("r3")]);
        engine.execute(&mut rt, &i);
        assert_eq!(rt.get_register("r3"), Some(Value::Integer(-4)));
    }

    #[test]
    fn compare_equal_registers_sets_zero_and_leaves_registers_untouched() {
        let mut rt = Runtime::new();
        rt.set_register("r1", Value::Integer(5));
        rt.set_register("r2", Value::Integer(5));
        let mut engine = Engine::new(10, ScriptedIo::default());
        let i = instr(InstructionKind::Compare, vec![reg("r1"), reg("r2")]);
        engine.execute(&mut rt, &i);
        assert!(rt.get_flag(Flag::Zero));
        assert!(!rt.get_flag(Flag::Sign));
        assert!(!rt.get_flag(Flag::Overflow));
        assert_eq!(rt.get_register("r1"), Some(Value::Integer(5)));
    }

    #[test]
    fn jump_unconditional_sets_target_pc() {
        let mut rt = Runtime::new();
        let mut engine = Engine::new(10, ScriptedIo::default());
        let target = Operand { text: "i[6]".to_string(), kind: OperandKind::InstructionAddress, line: 1, position: 1 };
        let cond = Operand { text: "unconditional".to_string(), kind: OperandKind::JumpCondition, line: 1, position: 0 };
        let i = instr(InstructionKind::Jump, vec![cond, target]);
        engine.execute(&mut rt, &i);
        assert_eq!(rt.get_pc(), 6);
    }

    #[test]
    fn push_then_pop_is_a_no_op() {
        let mut rt = Runtime::new();
        rt.set_register("r1", Value::Integer(1));
        let mut engine = Engine::new(10, ScriptedIo::default());
        let sp0 = rt.stack_pointer();
        engine.execute(&mut rt, &instr(InstructionKind::Push, vec![reg("r1")]));
        engine.execute(&mut rt, &instr(InstructionKind::Pop, vec![reg("r2")]));
        assert_eq!(rt.get_register("r2"), Some(Value::Integer(1)));
        assert_eq!(rt.stack_pointer(), sp0);
    }

    #[test]
    fn input_boolean_accepts_either_valid_set() {
        let mut rt = Runtime::new();
        let mut engine = Engine::new(10, ScriptedIo::new(["T", "f"]));
        let kw = Operand { text: "boolean".to_string(), kind: OperandKind::TypeCondition, line: 1, position: 0 };
        engine.execute(&mut rt, &instr(InstructionKind::Input, vec![kw.clone(), reg("r1")]));
        assert_eq!(rt.get_register("r1"), Some(Value::Boolean(true)));
        engine.execute(&mut rt, &instr(InstructionKind::Input, vec![kw, reg("r2")]));
        assert_eq!(rt.get_register("r2"), Some(Value::Boolean(false)));
    }

    #[test]
    fn input_boolean_rejects_garbage() {
        let mut rt = Runtime::new();
        let mut engine = Engine::new(10, ScriptedIo::new(["maybe"]));
        let kw = Operand { text: "boolean".to_string(), kind: OperandKind::TypeCondition, line: 1, position: 0 };
        let pc0 = rt.get_pc();
        engine.execute(&mut rt, &instr(InstructionKind::Input, vec![kw, reg("r1")]));
        assert_eq!(rt.get_register("r1"), None);
        assert_eq!(rt.get_pc(), pc0, "input errors must not advance pc");
    }

    #[test]
    fn output_renders_per_tag() {
        let mut rt = Runtime::new();
        rt.set_register("r1", Value::MemoryAddress(42));
        let mut engine = Engine::new(10, ScriptedIo::default());
        engine.execute(&mut rt, &instr(InstructionKind::Output, vec![reg("r1")]));
        assert_eq!(engine.io().output, "m<42>");
    }

    #[test]
    fn print_strips_quotes_and_writes_no_newline() {
        let mut engine = Engine::new(10, ScriptedIo::default());
        let mut rt = Runtime::new();
        let literal = Operand { text: "\"hi\"".to_string(), kind: OperandKind::String, line: 1, position: 0 };
        engine.execute(&mut rt, &instr(InstructionKind::Print, vec![literal]));
        assert_eq!(engine.io().output, "hi");
    }

    #[test]
    fn shift_right_is_arithmetic_and_sign_extends() {
        let mut rt = Runtime::new();
        rt.set_register("r1", Value::Integer(-8));
        rt.set_register("r2", Value::Integer(1));
        let mut engine = Engine::new(10, ScriptedIo::default());
        let dir = Operand { text: "right".to_string(), kind: OperandKind::ShiftCondition, line: 1, position: 0 };
        engine.execute(&mut rt, &instr(InstructionKind::Shift, vec![dir, reg("r1"), reg("r2")]));
        assert_eq!(rt.get_register("r1"), Some(Value::Integer(-4)));
    }

    #[test]
    fn character_result_leaves_overflow_flag_as_a_prior_op_set_it() {
        let mut rt = Runtime::new();
        // First op1 overflows, setting O.
        rt.set_register("r1", Value::Integer(i32::MAX));
        rt.set_register("r2", Value::Integer(1));
        let mut engine = Engine::new(10, ScriptedIo::default());
        engine.execute(&mut rt, &instr(InstructionKind::Add, vec![reg("r1"), reg("r2"), reg("r3")]));
        assert!(rt.get_flag(Flag::Overflow));

        // A CHARACTER-tagged op must not reset O back to false.
        rt.set_register("r4", Value::Character(200));
        rt.set_register("r5", Value::Character(100));
        engine.execute(&mut rt, &instr(InstructionKind::Add, vec![reg("r4"), reg("r5"), reg("r6")]));
        assert!(rt.get_flag(Flag::Overflow), "CHARACTER wrap must leave O untouched, per spec");
    }

    #[test]
    fn shift_checks_amount_register_even_when_src_is_boolean() {
        let mut rt = Runtime::new();
        rt.set_register("r1", Value::Boolean(true));
        // r2 (the shift-amount register) is left uninitialized.
        let mut engine = Engine::new(10, ScriptedIo::default());
        let dir = Operand { text: "left".to_string(), kind: OperandKind::ShiftCondition, line: 1, position: 0 };
        engine.execute(&mut rt, &instr(InstructionKind::Shift, vec![dir, reg("r1"), reg("r2")]));
        assert_eq!(rt.get_pc(), engine.halt_pc(), "an uninitialized shift-amount register must halt");
        assert_eq!(rt.get_register("r1"), Some(Value::Boolean(true)), "src must be untouched on this error");
    }
}
