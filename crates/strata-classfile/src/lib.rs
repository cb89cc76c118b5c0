//! Strata compiled-class definitions
//!
//! This crate provides the binary container format for compiled managed
//! classes, the bytecode instruction set used in method bodies, and an
//! instruction-stream parser able to identify field accesses by name.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod opcode;
pub mod class;
pub mod constants;
pub mod insn;
pub mod encoder;

pub use opcode::Opcode;
pub use class::{AnnotationDef, ClassFile, ClassFileError, FieldDef, MethodDef};
pub use constants::ConstantPool;
pub use encoder::{BytecodeReader, BytecodeWriter, DecodeError};
pub use insn::{parse_instructions, Instruction};
