/*!
  Linear sweep over a program image. Every address the sweep visits yields either an instruction
  or the reason there is none; a bad word is skipped and the sweep continues at the next word.
*/

use crate::address::Address;
use crate::bytecode::{decode_instruction, DecodeError, Instruction, WordStream, WORD_SIZE};

pub struct Disassembler<'a> {
  stream   : WordStream<'a>,
  position : Address,
}

impl<'a> Disassembler<'a> {
  pub fn new(bytes: &'a [u8]) -> Disassembler<'a> {
    Disassembler::starting_at(bytes, Address(0))
  }

  pub fn starting_at(bytes: &'a [u8], start: Address) -> Disassembler<'a> {
    Disassembler{ stream: WordStream::new(bytes), position: start }
  }
}

impl<'a> Iterator for Disassembler<'a> {
  type Item = (Address, Result<Instruction, DecodeError>);

  fn next(&mut self) -> Option<Self::Item> {
    if self.position.idx() >= self.stream.len() {
      return None;
    }
    let address = self.position;
    let result  = decode_instruction(&self.stream, address);
    let advance = match &result {
      Ok(instruction) => instruction.length(),
      Err(e) => {
        log::debug!("{}", e);
        WORD_SIZE
      }
    };
    self.position = address + advance;
    Some((address, result))
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::bytecode::{encode_words, Operation};

  #[test]
  fn sweeps_past_bad_words(){
    // noop, garbage, out 'A', truncated add
    let bytes = encode_words(&[21, 0x7777, 19, 65, 9, 32768]);
    let items: Vec<_> = Disassembler::new(&bytes).collect();
    let addresses: Vec<Address> = items.iter().map(|(a, _)| *a).collect();
    assert_eq!(addresses, vec![Address(0), Address(2), Address(4), Address(8), Address(10)]);

    assert_eq!(items[0].1.as_ref().map(|i| i.operation()), Ok(Operation::Noop));
    assert_eq!(items[1].1, Err(DecodeError::UnknownOpcode{ address: Address(2), opcode: Some(0x7777) }));
    assert_eq!(items[2].1.as_ref().map(|i| i.operation()), Ok(Operation::Out));
    assert!(matches!(items[3].1, Err(DecodeError::TruncatedInstruction{ .. })));
    // The add's operand word, 32768, is not an opcode either.
    assert!(matches!(items[4].1, Err(DecodeError::UnknownOpcode{ .. })));
  }

  #[test]
  fn starting_offset(){
    let bytes = encode_words(&[0, 21, 18]);
    let operations: Vec<Operation> =
      Disassembler::starting_at(&bytes, Address(2))
        .filter_map(|(_, result)| result.ok())
        .map(|instruction| instruction.operation())
        .collect();
    assert_eq!(operations, vec![Operation::Noop, Operation::Return]);
    assert_eq!(Disassembler::new(&[]).next(), None);
  }
}
