/*!
  Static analysis of programs for the Synacor virtual machine: a 16 bit, word addressed machine
  with 22 operations, eight registers and a stack.

  Given a program image, the crate decodes instructions (`bytecode::decode_instruction`), finds
  their control flow edges (`analysis::edges`), renders disassembly (`analysis::tokenize`, or the
  `Display` impl of `Instruction`), and lifts them to a small IL (`il::lift`). The assembler
  (`bytecode::assemble`) goes the other way. All of these are pure functions of their inputs.

  ```
  use synacor::{analysis, bytecode, Address};

  let bytes = bytecode::assemble("jt R0, 0x0010").unwrap();
  let instruction = bytecode::decode_instruction(&bytecode::WordStream::new(&bytes), Address(0)).unwrap();
  assert_eq!(instruction.to_string(), "jt R0, 0x0010");
  assert_eq!(analysis::edges(&instruction).len(), 2);
  ```
*/

pub mod address;
pub mod bytecode;
pub mod analysis;
pub mod il;

pub use address::Address;
pub use bytecode::{Instruction, Operation};
