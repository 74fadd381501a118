/*!
  This module is responsible for the encoding and decoding of binary instructions.

  A program image is a flat sequence of little-endian 16 bit words. An instruction is an opcode
  word followed by one word per operand slot of its operation.
*/

use thiserror::Error;

use crate::address::Address;
use crate::bytecode::{registry, Instruction, Operand, OperandValue};

// If you change this you must also change `WORD_SIZE` and `WordStream::word_at`.
pub type Word = u16;
/// Size in bytes of a VM word.
pub const WORD_SIZE: usize = 2;

#[derive(Error, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DecodeError {
  /// The word at the address is not an opcode, or there is no word at the address at all.
  #[error("{}", describe_unknown_opcode(.address, .opcode))]
  UnknownOpcode {
    address : Address,
    opcode  : Option<Word>,
  },

  #[error("instruction at {address} needs {needed} bytes but only {available} remain")]
  TruncatedInstruction {
    address   : Address,
    needed    : usize,
    available : usize,
  },

  #[error("operand {index} of instruction at {address} has invalid value {value}")]
  InvalidOperandValue {
    address : Address,
    index   : usize,
    value   : Word,
  },

  #[error("instructions are word aligned, but {address} is odd")]
  MisalignedAddress {
    address : Address,
  },
}

fn describe_unknown_opcode(address: &Address, opcode: &Option<Word>) -> String {
  match opcode {
    Some(value) => format!("{} at {} is not an opcode", value, address),
    None        => format!("no opcode word at {}", address),
  }
}

impl DecodeError {
  /// The address of the instruction that failed to decode.
  pub fn address(&self) -> Address {
    match self {
      | DecodeError::UnknownOpcode{ address, .. }
      | DecodeError::TruncatedInstruction{ address, .. }
      | DecodeError::InvalidOperandValue{ address, .. }
      | DecodeError::MisalignedAddress{ address } => *address
    }
  }
}

/// Read-only little-endian word access over a caller-owned byte buffer.
#[derive(Copy, Clone, Debug)]
pub struct WordStream<'a> {
  bytes: &'a [u8]
}

impl<'a> WordStream<'a> {
  pub fn new(bytes: &'a [u8]) -> WordStream<'a> {
    WordStream{ bytes }
  }

  /// Length in bytes.
  pub fn len(&self) -> usize {
    self.bytes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bytes.is_empty()
  }

  /// Number of bytes from `address` to the end of the stream.
  pub fn remaining(&self, address: Address) -> usize {
    self.bytes.len().saturating_sub(address.idx())
  }

  /// The word starting at the byte `address`, or `None` if it runs past the end.
  pub fn word_at(&self, address: Address) -> Option<Word> {
    let start = address.idx();
    let end   = start.checked_add(WORD_SIZE)?;
    let bytes = self.bytes.get(start..end)?;
    Some(Word::from_le_bytes([bytes[0], bytes[1]]))
  }
}

/**
  Decodes the instruction at `address`. Only the bytes of `stream` are consulted, so decoding is
  safe to do in any order, at any address, from any thread.
*/
pub fn decode_instruction(stream: &WordStream, address: Address) -> Result<Instruction, DecodeError> {
  if !address.is_aligned() {
    return Err(DecodeError::MisalignedAddress{ address });
  }

  let opcode = stream.word_at(address)
                     .ok_or(DecodeError::UnknownOpcode{ address, opcode: None })?;
  let descriptor = registry::lookup(opcode)
                     .ok_or(DecodeError::UnknownOpcode{ address, opcode: Some(opcode) })?;

  let available = stream.remaining(address);
  if available < descriptor.length() {
    return Err(DecodeError::TruncatedInstruction{ address, needed: descriptor.length(), available });
  }

  let mut operands = Vec::with_capacity(descriptor.slot_count());
  for (index, kind) in descriptor.slots.iter().enumerate() {
    let operand_address = address + WORD_SIZE * (index + 1);
    // The length check above guarantees the word is present.
    let value = stream.word_at(operand_address)
                      .ok_or(DecodeError::TruncatedInstruction{
                        address,
                        needed: descriptor.length(),
                        available
                      })?;
    if let OperandValue::Invalid(value) = OperandValue::classify(value) {
      return Err(DecodeError::InvalidOperandValue{ address, index, value });
    }
    operands.push(Operand::new(index, *kind, value));
  }

  let instruction = Instruction{ address, descriptor, operands };

  #[cfg(feature = "trace_decode")]
  log::trace!("{}: {}", address, instruction);

  Ok(instruction)
}

/// Like `decode_instruction`, but a failure is logged and reported as "no instruction here".
pub fn try_decode_instruction(bytes: &[u8], address: Address) -> Option<Instruction> {
  match decode_instruction(&WordStream::new(bytes), address) {
    Ok(instruction) => Some(instruction),
    Err(e) => {
      log::debug!("{}", e);
      None
    }
  }
}

/// Packs words into their little-endian byte encoding.
pub fn encode_words(words: &[Word]) -> Vec<u8> {
  words.iter().flat_map(|word| word.to_le_bytes()).collect()
}

/// Encodes the instruction into bytecode. This is the inverse of `decode_instruction`.
pub fn encode_instruction(instruction: &Instruction) -> Vec<u8> {
  let mut words = Vec::with_capacity(1 + instruction.operands.len());
  words.push(instruction.descriptor.opcode());
  words.extend(instruction.operands.iter().map(|operand| operand.value));
  encode_words(&words)
}

/**
  Returns `noop` words covering `data`. A trailing odd byte cannot hold a word and is dropped, so
  the result may be one byte shorter than the input.
*/
pub fn convert_to_nop(data: &[u8]) -> Vec<u8> {
  let noop = registry::descriptor(crate::bytecode::Operation::Noop).opcode();
  encode_words(&vec![noop; data.len() / WORD_SIZE])
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::bytecode::Operation;

  #[test]
  fn word_access(){
    let bytes = [0x34, 0x12, 0xFF];
    let stream = WordStream::new(&bytes);
    assert_eq!(stream.word_at(Address(0)), Some(0x1234));
    assert_eq!(stream.word_at(Address(1)), Some(0xFF12));
    assert_eq!(stream.word_at(Address(2)), None);
    assert_eq!(stream.word_at(Address(usize::MAX)), None);
    assert_eq!(stream.remaining(Address(5)), 0);
  }

  #[test]
  fn decode_add(){
    let bytes = encode_words(&[9, 32768, 32769, 4]);
    let instruction = decode_instruction(&WordStream::new(&bytes), Address(0)).unwrap();
    assert_eq!(instruction.operation(), Operation::Add);
    assert_eq!(instruction.length(), 8);
    let values: Vec<Word> = instruction.operands.iter().map(|o| o.value).collect();
    assert_eq!(values, vec![32768, 32769, 4]);
    assert_eq!(encode_instruction(&instruction), bytes);
  }

  #[test]
  fn decode_at_offset(){
    let bytes = encode_words(&[21, 6, 0]);
    let instruction = decode_instruction(&WordStream::new(&bytes), Address(2)).unwrap();
    assert_eq!(instruction.operation(), Operation::Jump);
    assert_eq!(instruction.address, Address(2));
    assert_eq!(instruction.next_address(), Address(6));
  }

  #[test]
  fn truncated(){
    let bytes = encode_words(&[9, 32768, 32769]);
    assert_eq!(
      decode_instruction(&WordStream::new(&bytes), Address(0)),
      Err(DecodeError::TruncatedInstruction{ address: Address(0), needed: 8, available: 6 })
    );
  }

  #[test]
  fn unknown_opcode(){
    let bytes = encode_words(&[22]);
    assert_eq!(
      decode_instruction(&WordStream::new(&bytes), Address(0)),
      Err(DecodeError::UnknownOpcode{ address: Address(0), opcode: Some(22) })
    );
    // A lone byte is not enough for an opcode word.
    assert_eq!(
      decode_instruction(&WordStream::new(&[0]), Address(0)),
      Err(DecodeError::UnknownOpcode{ address: Address(0), opcode: None })
    );
    assert_eq!(try_decode_instruction(&[], Address(0)), None);
  }

  #[test]
  fn invalid_operand(){
    let bytes = encode_words(&[1, 32768, 32776]);
    let error = decode_instruction(&WordStream::new(&bytes), Address(0)).unwrap_err();
    assert_eq!(error, DecodeError::InvalidOperandValue{ address: Address(0), index: 1, value: 32776 });
    assert_eq!(error.to_string(), "operand 1 of instruction at 0x0000 has invalid value 32776");
  }

  #[test]
  fn misaligned(){
    let bytes = encode_words(&[21, 21]);
    assert_eq!(
      decode_instruction(&WordStream::new(&bytes), Address(1)),
      Err(DecodeError::MisalignedAddress{ address: Address(1) })
    );
  }

  #[test]
  fn nop_conversion(){
    assert_eq!(convert_to_nop(&[1, 2, 3, 4]), vec![21, 0, 21, 0]);
    assert_eq!(convert_to_nop(&[1, 2, 3]), vec![21, 0]);
    assert!(convert_to_nop(&[]).is_empty());
  }
}
