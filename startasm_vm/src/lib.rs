//! The StartASM virtual machine core: AST model, JSON loader, runtime
//! state, and the instruction execution engine. No interactive shell, no
//! subprocess handling, no session persistence — those live in the driver
//! crate that sits on top of this one.

pub mod ast;
pub mod engine;
pub mod error;
pub mod flags;
pub mod io;
pub mod loader;
pub mod runtime;
pub mod value;

pub use ast::{Instruction, Operand, Root};
pub use engine::Engine;
pub use error::{Fault, InputError, RuntimeError};
pub use flags::{Flag, Flags};
pub use io::{Io, ScriptedIo, StdIo};
pub use loader::{load_from_str, LoaderError};
pub use runtime::Runtime;
pub use value::{Tag, Value};
