//! The driver: owns one runtime and one engine, exposes
//! `initialize / forward / run / restart / terminate / dump / breakpoint`.
//! The text command shell that maps user input onto these methods,
//! session-flag persistence, and the config file format are all external
//! collaborators that live outside this crate.

pub mod compiler;
pub mod config;

use std::collections::HashSet;
use std::path::Path;

use log::{error, info, warn};
use thiserror::Error;

use startasm_vm::{Engine, Io, Root, Runtime, StdIo};

pub use config::DriverConfig;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("no program is loaded; call initialize first")]
    NotInitialized,

    #[error("a program is already loaded; terminate it first")]
    AlreadyInitialized,
}

/// Which sections `dump` should render (the `-r -m -s -f -p --verbose`
/// command-line flags). All-false is a no-op dump, mirroring passing no
/// flags on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct DumpFlags {
    pub registers: bool,
    pub memory: bool,
    pub stack: bool,
    pub flags: bool,
    pub program: bool,
    pub verbose: bool,
}

impl DumpFlags {
    pub fn all() -> DumpFlags {
        DumpFlags { registers: true, memory: true, stack: true, flags: true, program: true, verbose: false }
    }
}

/// One loaded program's live state: the AST it was built from, plus the
/// runtime and engine bound to it. Dropped wholesale by `terminate` and
/// rebuilt from scratch (keeping the AST) by `restart`.
struct Session<I: Io> {
    root: Root,
    runtime: Runtime,
    engine: Engine<I>,
}

pub struct Driver<I: Io + Default = StdIo> {
    config: DriverConfig,
    session: Option<Session<I>>,
    breakpoints: HashSet<u32>,
}

impl<I: Io + Default> Driver<I> {
    pub fn new(config: DriverConfig) -> Driver<I> {
        Driver { config, session: None, breakpoints: HashSet::new() }
    }

    /// Invokes the compiler subprocess, parses its output into an AST, and
    /// constructs a fresh runtime and engine bound to the program's length.
    /// Returns `false` on any compile or parse failure, logging the cause
    /// rather than propagating it — `initialize` never panics a session
    /// that's about to be retried with a different path.
    pub fn initialize(&mut self, program_path: &Path) -> bool {
        if self.session.is_some() {
            warn!("initialize called while a program is already loaded");
            return false;
        }

        let json = match compiler::compile_to_ast_json(&self.config.compiler_image, program_path) {
            Ok(json) => json,
            Err(e) => {
                error!("compiler error: {e:#}");
                return false;
            }
        };

        let root = match startasm_vm::load_from_str(&json) {
            Ok(root) => root,
            Err(e) => {
                error!("AST load error: {e}");
                return false;
            }
        };

        let program_length = root.program_length();
        let runtime = Runtime::new();
        let engine = Engine::new(program_length, I::default());
        info!("loaded {} ({} instructions)", program_path.display(), program_length + 1);
        self.session = Some(Session { root, runtime, engine });
        true
    }

    /// Steps up to `n` instructions, stopping early on halt or on landing
    /// on a breakpointed pc. Breakpoints are tested before the instruction
    /// at that pc executes.
    pub fn forward(&mut self, n: u32) -> Result<(), DriverError> {
        let session = self.session.as_mut().ok_or(DriverError::NotInitialized)?;
        let halt_pc = session.engine.halt_pc();
        for _ in 0..n {
            let pc = session.runtime.get_pc();
            if pc == halt_pc {
                break;
            }
            if self.breakpoints.contains(&pc) {
                break;
            }
            let Some(instruction) = session.root.instruction_at(pc) else {
                break;
            };
            session.engine.execute(&mut session.runtime, instruction);
        }
        Ok(())
    }

    /// Steps until halt or a breakpoint is hit.
    pub fn run(&mut self) -> Result<(), DriverError> {
        self.forward(u32::MAX)
    }

    /// Rebuilds runtime and engine from scratch, keeping the loaded AST and
    /// the breakpoint set.
    pub fn restart(&mut self) -> Result<(), DriverError> {
        let session = self.session.take().ok_or(DriverError::NotInitialized)?;
        let program_length = session.root.program_length();
        self.session = Some(Session {
            root: session.root,
            runtime: Runtime::new(),
            engine: Engine::new(program_length, I::default()),
        });
        Ok(())
    }

    /// Drops runtime, engine, and AST.
    pub fn terminate(&mut self) {
        self.session = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Test-only seam: builds a session directly from an already-parsed
    /// `Root`, bypassing the compiler subprocess `initialize` normally
    /// shells out to. Lets tests drive `forward`/`run`/`restart`/`dump`
    /// against a hand-built program without a real compiler image.
    #[cfg(test)]
    fn load_root_for_test(&mut self, root: Root, io: I) {
        let program_length = root.program_length();
        let engine = Engine::new(program_length, io);
        self.session = Some(Session { root, runtime: Runtime::new(), engine });
    }

    /// Renders the requested dump sections. `--verbose` reformats each
    /// requested section as a labelled line instead of the terse default.
    pub fn dump(&self, flags: DumpFlags) -> Result<String, DriverError> {
        let session = self.session.as_ref().ok_or(DriverError::NotInitialized)?;
        let rt = &session.runtime;
        let mut sections = Vec::new();

        if flags.registers {
            sections.push(labelled("Registers", &rt.dump_registers(), flags.verbose));
        }
        if flags.memory {
            sections.push(labelled("Memory", &rt.dump_memory(), flags.verbose));
        }
        if flags.stack {
            sections.push(labelled("Stack", &rt.dump_stack(), flags.verbose));
        }
        if flags.flags {
            sections.push(labelled("Flags", &rt.dump_flags(), flags.verbose));
        }
        if flags.program {
            sections.push(labelled("Program", &rt.dump_program_state(), flags.verbose));
        }

        let separator = if flags.verbose { "\n" } else { " " };
        Ok(sections.join(separator))
    }

    pub fn breakpoint_set(&mut self, line: u32) {
        self.breakpoints.insert(line);
    }

    pub fn breakpoint_remove(&mut self, line: u32) {
        self.breakpoints.remove(&line);
    }

    pub fn breakpoint_list(&self) -> Vec<u32> {
        let mut lines: Vec<u32> = self.breakpoints.iter().copied().collect();
        lines.sort_unstable();
        lines
    }
}

fn labelled(name: &str, body: &str, verbose: bool) -> String {
    if verbose {
        format!("{name}:\n{body}")
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use startasm_vm::ast::{Instruction, InstructionKind, NumOperands, Operand, OperandKind};
    use startasm_vm::{ScriptedIo, Value};

    fn new_driver() -> Driver<ScriptedIo> {
        Driver::new(DriverConfig::default())
    }

    fn reg(text: &str) -> Operand {
        Operand { text: text.to_string(), kind: OperandKind::Register, line: 0, position: 0 }
    }

    fn imm(text: &str, kind: OperandKind) -> Operand {
        Operand { text: text.to_string(), kind, line: 0, position: 0 }
    }

    fn instruction(kind: InstructionKind, operands: Vec<Operand>) -> Instruction {
        let arity = match operands.len() {
            0 => NumOperands::Nullary,
            1 => NumOperands::Unary,
            2 => NumOperands::Binary,
            _ => NumOperands::Ternary,
        };
        Instruction { text: String::new(), kind, arity, line: 0, operands }
    }

    /// `create integer 3 r1 ; create integer 4 r2 ; add r1 r2 r3 ; output
    /// r3 ; stop` — spec §8 scenario 1, driven through `Driver` rather than
    /// directly through `Engine`/`Runtime`.
    fn add_two_integers_program() -> Root {
        Root {
            instructions: vec![
                instruction(InstructionKind::Create, vec![imm("integer", OperandKind::TypeCondition), imm("3", OperandKind::Integer), reg("r1")]),
                instruction(InstructionKind::Create, vec![imm("integer", OperandKind::TypeCondition), imm("4", OperandKind::Integer), reg("r2")]),
                instruction(InstructionKind::Add, vec![reg("r1"), reg("r2"), reg("r3")]),
                instruction(InstructionKind::Output, vec![reg("r3")]),
                instruction(InstructionKind::Stop, vec![]),
            ],
        }
    }

    #[test]
    fn forward_before_initialize_is_a_usage_error() {
        let mut driver = new_driver();
        assert!(matches!(driver.forward(1), Err(DriverError::NotInitialized)));
    }

    #[test]
    fn breakpoint_list_is_sorted() {
        let mut driver = new_driver();
        driver.breakpoint_set(5);
        driver.breakpoint_set(2);
        driver.breakpoint_set(8);
        assert_eq!(driver.breakpoint_list(), vec![2, 5, 8]);
    }

    #[test]
    fn breakpoint_remove_drops_it_from_the_list() {
        let mut driver = new_driver();
        driver.breakpoint_set(3);
        driver.breakpoint_remove(3);
        assert!(driver.breakpoint_list().is_empty());
    }

    #[test]
    fn forward_steps_one_instruction_at_a_time() {
        let mut driver = new_driver();
        driver.load_root_for_test(add_two_integers_program(), ScriptedIo::default());
        driver.forward(1).unwrap();
        let session = driver.session.as_ref().unwrap();
        assert_eq!(session.runtime.get_pc(), 1);
        assert_eq!(session.runtime.get_register("r1"), Some(Value::Integer(3)));
        assert_eq!(session.runtime.get_register("r2"), None, "forward(1) must not also execute the next instruction");
    }

    #[test]
    fn run_executes_to_halt() {
        let mut driver = new_driver();
        driver.load_root_for_test(add_two_integers_program(), ScriptedIo::default());
        driver.run().unwrap();
        let session = driver.session.as_mut().unwrap();
        assert_eq!(session.runtime.get_pc(), session.engine.halt_pc());
        assert_eq!(session.engine.io().output, "7");
    }

    #[test]
    fn run_stops_at_a_breakpoint_before_executing_it() {
        let mut driver = new_driver();
        driver.load_root_for_test(add_two_integers_program(), ScriptedIo::default());
        driver.breakpoint_set(2); // the `add` instruction
        driver.run().unwrap();
        let session = driver.session.as_ref().unwrap();
        assert_eq!(session.runtime.get_pc(), 2, "must halt at the breakpoint's pc, not past it");
        assert_eq!(session.runtime.get_register("r3"), None, "the breakpointed instruction must not have executed");
    }

    #[test]
    fn restart_rebuilds_runtime_but_keeps_the_ast_and_breakpoints() {
        let mut driver = new_driver();
        driver.load_root_for_test(add_two_integers_program(), ScriptedIo::default());
        driver.breakpoint_set(2);
        driver.forward(2).unwrap();
        assert_eq!(driver.session.as_ref().unwrap().runtime.get_pc(), 2);

        driver.restart().unwrap();
        let session = driver.session.as_ref().unwrap();
        assert_eq!(session.runtime.get_pc(), 0, "restart must rebuild a fresh runtime");
        assert_eq!(session.runtime.get_register("r1"), None);
        assert_eq!(session.root.instructions.len(), 5, "restart must keep the loaded AST");
        assert_eq!(driver.breakpoint_list(), vec![2], "restart must keep the breakpoint set");
    }

    #[test]
    fn dump_concatenates_requested_sections_with_spaces() {
        let mut driver = new_driver();
        driver.load_root_for_test(add_two_integers_program(), ScriptedIo::default());
        driver.run().unwrap();
        let flags = DumpFlags { registers: true, flags: true, ..Default::default() };
        let dump = driver.dump(flags).unwrap();
        assert_eq!(
            dump,
            format!("{} {}", driver.session.as_ref().unwrap().runtime.dump_registers(), "zf:0 sf:0 of:0")
        );
    }

    #[test]
    fn dump_verbose_labels_each_section_on_its_own_line() {
        let mut driver = new_driver();
        driver.load_root_for_test(add_two_integers_program(), ScriptedIo::default());
        let flags = DumpFlags { flags: true, verbose: true, ..Default::default() };
        let dump = driver.dump(flags).unwrap();
        assert_eq!(dump, "Flags:\nzf:0 sf:0 of:0");
    }
}
