/*!
  The operation registry: one immutable `OperationDescriptor` per opcode, built the first time
  it is used and never mutated afterward. The decoder and the assembler consult only this table,
  so an instruction assembled from text always decodes back to the same operation.
*/

use std::str::FromStr;

use lazy_static::lazy_static;
use strum::IntoEnumIterator;

use crate::bytecode::{Operation, OperandKind, Word, WORD_SIZE};

/// The most operand slots any operation has.
pub const MAX_OPERANDS: usize = 3;
/// The length in bytes of the longest instruction.
pub const MAX_INSTRUCTION_LENGTH: usize = WORD_SIZE * (1 + MAX_OPERANDS);

#[derive(Debug, Eq, PartialEq, Hash)]
pub struct OperationDescriptor {
  pub operation : Operation,
  pub mnemonic  : &'static str,
  pub slots     : &'static [OperandKind],
}

impl OperationDescriptor {
  fn new(operation: Operation) -> OperationDescriptor {
    OperationDescriptor{
      operation,
      mnemonic : operation.mnemonic(),
      slots    : operation.slots(),
    }
  }

  pub fn opcode(&self) -> Word {
    self.operation.code()
  }

  pub fn slot_count(&self) -> usize {
    self.slots.len()
  }

  /// Length in bytes of an instruction with this operation.
  pub fn length(&self) -> usize {
    WORD_SIZE * (1 + self.slots.len())
  }
}

lazy_static! {
  static ref REGISTRY: Vec<OperationDescriptor> =
    Operation::iter().map(OperationDescriptor::new).collect();
}

/// The descriptor for an opcode word, if the word is an opcode.
pub fn lookup(opcode: Word) -> Option<&'static OperationDescriptor> {
  Operation::try_from(opcode).ok().map(descriptor)
}

/// The descriptor for an assembly mnemonic. Mnemonics are lowercase.
pub fn lookup_mnemonic(mnemonic: &str) -> Option<&'static OperationDescriptor> {
  Operation::from_str(mnemonic).ok().map(descriptor)
}

pub fn descriptor(operation: Operation) -> &'static OperationDescriptor {
  let registry: &'static Vec<OperationDescriptor> = &REGISTRY;
  &registry[operation.code() as usize]
}

/// All descriptors in opcode order.
pub fn descriptors() -> impl Iterator<Item = &'static OperationDescriptor> {
  Operation::iter().map(descriptor)
}
