//! Runtime state: registers, the unified memory/stack map, the program
//! counter, and the condition flags. `Runtime` has no idea how to execute
//! an instruction — that's `crate::engine::Engine`'s job, which borrows a
//! `Runtime` mutably for the duration of one `execute` call.

use std::collections::BTreeMap;

use crate::flags::{Flag, Flags};
use crate::value::Value;

/// `INT32_MAX + 1`. The stack starts at the top of the address space and
/// grows down.
pub const INITIAL_STACK_POINTER: u32 = (i32::MAX as u32) + 1;

pub const NUM_REGISTERS: usize = 9;

#[derive(Debug, Default)]
pub struct Runtime {
    registers: [Option<Value>; NUM_REGISTERS],
    memory: BTreeMap<u32, Value>,
    sp: u32,
    pc: u32,
    flags: Flags,
}

/// Parses `"r1"`..`"r9"` into a `0..9` register slot index. Any other text
/// (malformed operand text, which the compiler should never produce) is
/// `None` and left for the caller to turn into a `RuntimeError`.
pub fn register_index(name: &str) -> Option<usize> {
    let mut chars = name.chars();
    if chars.next()? != 'r' {
        return None;
    }
    let digit = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let n = digit.to_digit(10)? as usize;
    if (1..=NUM_REGISTERS).contains(&n) {
        Some(n - 1)
    } else {
        None
    }
}

impl Runtime {
    pub fn new() -> Runtime {
        Runtime {
            registers: Default::default(),
            memory: BTreeMap::new(),
            sp: INITIAL_STACK_POINTER,
            pc: 0,
            flags: Flags::default(),
        }
    }

    // --- Registers ---------------------------------------------------

    pub fn get_register(&self, name: &str) -> Option<Value> {
        if name == "sp" {
            return Some(Value::MemoryAddress(self.sp));
        }
        let index = register_index(name)?;
        self.registers[index].clone()
    }

    pub fn set_register(&mut self, name: &str, value: Value) {
        if let Some(index) = register_index(name) {
            self.registers[index] = Some(value);
        }
    }

    // --- Memory --------------------------------------------------------

    pub fn get_memory(&self, addr: u32) -> Option<Value> {
        self.memory.get(&addr).cloned()
    }

    pub fn set_memory(&mut self, addr: u32, value: Value) {
        self.memory.insert(addr, value);
    }

    pub fn addr_initialized(&self, addr: u32) -> bool {
        self.memory.contains_key(&addr)
    }

    // --- Stack -----------------------------------------------------------
    //
    // The stack lives in the top of the same `memory` map — it
    // is not a separate container. `pop_stack` deliberately does not erase
    // the slot it reads: once `sp` moves past an address, that address
    // reverts to being ordinary (possibly stale) memory, exactly as the
    // dump functions below assume.

    pub fn stack_pointer(&self) -> u32 {
        self.sp
    }

    pub fn push_stack(&mut self, value: Value) {
        self.memory.insert(self.sp - 1, value);
        self.sp -= 1;
    }

    pub fn pop_stack(&mut self) -> Option<Value> {
        let value = self.memory.get(&self.sp).cloned();
        self.sp += 1;
        value
    }

    // --- Program counter -------------------------------------------------

    pub fn get_pc(&self) -> u32 {
        self.pc
    }

    pub fn set_pc(&mut self, value: u32) {
        self.pc = value;
    }

    pub fn increment_pc(&mut self) {
        self.pc += 1;
    }

    // --- Flags -------------------------------------------------------------

    pub fn get_flag(&self, flag: Flag) -> bool {
        self.flags.get(flag)
    }

    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        self.flags.set(flag, value);
    }

    pub fn update_flags(&mut self, wrapped: i64, overflow: Option<bool>) {
        self.flags.update(wrapped, overflow);
    }

    // --- Dump (byte-exact textual forms) ----------------------------------

    /// `rI:V(T)` for `I` in `1..=9`, uninitialized rendered `rI:None(None)`.
    pub fn dump_registers(&self) -> String {
        self.registers
            .iter()
            .enumerate()
            .map(|(i, slot)| match slot {
                Some(value) => format!("r{}:{}", i + 1, value),
                None => format!("r{}:None(None)", i + 1),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `ADDR:V(T)` in ascending address order, excluding the stack region
    /// (`addr >= sp`).
    pub fn dump_memory(&self) -> String {
        self.memory
            .iter()
            .filter(|(&addr, _)| addr < self.sp)
            .map(|(addr, value)| format!("{}:{}", addr, value))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `V(T)` in descending address order, restricted to `addr >= sp`.
    pub fn dump_stack(&self) -> String {
        self.memory
            .iter()
            .rev()
            .filter(|(&addr, _)| addr >= self.sp)
            .map(|(_, value)| value.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn dump_flags(&self) -> String {
        self.flags.dump()
    }

    /// `pc:N sp:m<ADDR>|None mem:BytesB stack:BytesB`.
    pub fn dump_program_state(&self) -> String {
        let sp_field = if self.sp > i32::MAX as u32 {
            "None".to_string()
        } else {
            format!("m<{}>", self.sp)
        };
        let mem_bytes = self.memory.len() as u64 * 4;
        let stack_bytes = (i32::MAX as i64 - self.sp as i64 + 1) * 4;
        format!(
            "pc:{} sp:{} mem:{}B stack:{}B",
            self.pc, sp_field, mem_bytes, stack_bytes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn register_index_parses_r1_through_r9() {
        assert_eq!(register_index("r1"), Some(0));
        assert_eq!(register_index("r9"), Some(8));
        assert_eq!(register_index("r0"), None);
        assert_eq!(register_index("r10"), None);
        assert_eq!(register_index("sp"), None);
    }

    #[test]
    fn uninitialized_register_reads_as_none() {
        let rt = Runtime::new();
        assert_eq!(rt.get_register("r1"), None);
    }

    #[test]
    fn set_then_get_register_round_trips() {
        let mut rt = Runtime::new();
        rt.set_register("r3", Value::Integer(42));
        assert_eq!(rt.get_register("r3"), Some(Value::Integer(42)));
    }

    #[test]
    fn sp_register_reads_current_stack_pointer() {
        let rt = Runtime::new();
        assert_eq!(rt.get_register("sp"), Some(Value::MemoryAddress(INITIAL_STACK_POINTER)));
    }

    #[test]
    fn push_then_pop_is_a_no_op_on_sp_delta() {
        let mut rt = Runtime::new();
        let sp0 = rt.stack_pointer();
        rt.push_stack(Value::Integer(7));
        assert_eq!(rt.stack_pointer(), sp0 - 1);
        let popped = rt.pop_stack();
        assert_eq!(popped, Some(Value::Integer(7)));
        assert_eq!(rt.stack_pointer(), sp0);
    }

    #[test]
    fn popped_slot_is_not_erased_and_resurfaces_as_memory() {
        let mut rt = Runtime::new();
        rt.push_stack(Value::Integer(1));
        rt.pop_stack();
        // The slot below the (restored) sp is still populated.
        assert!(rt.addr_initialized(INITIAL_STACK_POINTER - 1));
    }

    #[test]
    fn dump_program_state_initial() {
        let rt = Runtime::new();
        assert_eq!(rt.dump_program_state(), "pc:0 sp:None mem:0B stack:0B");
    }

    #[test]
    fn dump_program_state_after_one_push() {
        let mut rt = Runtime::new();
        rt.push_stack(Value::Integer(1));
        assert_eq!(
            rt.dump_program_state(),
            format!("pc:0 sp:m<{}> mem:4B stack:4B", INITIAL_STACK_POINTER - 1)
        );
    }

    #[test]
    fn dump_registers_shape_is_ri_value_tag() {
        let mut rt = Runtime::new();
        rt.set_register("r1", Value::Integer(7));
        let dump = rt.dump_registers();
        assert!(dump.starts_with("r1:7(INTEGER) r2:None(None)"));
        assert!(dump.ends_with("r9:None(None)"));
    }
}
