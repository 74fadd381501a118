//! Property tests tying the assembler, decoder and disassembler together.

use proptest::prelude::*;

use synacor::analysis::{edges, Disassembler, EdgeKind};
use synacor::bytecode::{
  assemble, decode_instruction, encode_instruction, encode_words, lookup, OperandKind,
  OperationDescriptor, WordStream, LITERAL_MAX, MAX_INSTRUCTION_LENGTH
};
use synacor::il::{lift, Stmt};
use synacor::{Address, Operation};

fn register_text() -> BoxedStrategy<String> {
  (0u8..8).prop_map(|r| format!("R{}", r)).boxed()
}

/// Legal assembly text for an operand filling a slot of the given kind.
fn operand_text(kind: OperandKind) -> BoxedStrategy<String> {
  if kind.requires_register() {
    return register_text();
  }
  let literal = if kind.is_address() {
    (0u16..=LITERAL_MAX).prop_map(|word| format!("0x{:04X}", word as u32 * 2)).boxed()
  } else if kind.is_char() {
    prop_oneof![
      (0u16..=LITERAL_MAX).prop_map(|value| value.to_string()),
      proptest::char::range(' ', '~').prop_map(|c| format!("'{}'", c.escape_default())),
    ].boxed()
  } else {
    prop_oneof![
      (0u16..=LITERAL_MAX).prop_map(|value| value.to_string()),
      (0u16..=LITERAL_MAX).prop_map(|value| format!("0x{:x}", value)),
    ].boxed()
  };
  prop_oneof![register_text(), literal].boxed()
}

/// A random operation together with legal text for each of its operands.
fn instruction_text() -> impl Strategy<Value = (&'static OperationDescriptor, String)> {
  (0u16..22).prop_flat_map(|opcode| {
    let descriptor = lookup(opcode).unwrap();
    let operands: Vec<BoxedStrategy<String>> =
      descriptor.slots.iter().map(|kind| operand_text(*kind)).collect();
    operands.prop_map(move |texts| {
      let text = match texts.is_empty() {
        true  => descriptor.mnemonic.to_string(),
        false => format!("{} {}", descriptor.mnemonic, texts.join(", ")),
      };
      (descriptor, text)
    })
  })
}

proptest! {
  /// Property: assembling the disassembly of assembled text reproduces the bytes.
  #[test]
  fn prop_assemble_disassemble_roundtrip((descriptor, text) in instruction_text()) {
    let bytes = assemble(&text).unwrap();
    let instruction = decode_instruction(&WordStream::new(&bytes), Address(0)).unwrap();
    prop_assert_eq!(instruction.descriptor, descriptor);
    prop_assert_eq!(encode_instruction(&instruction), bytes.clone());
    let reassembled = assemble(&instruction.to_string()).unwrap();
    prop_assert_eq!(reassembled, bytes, "text {:?} disassembled as {:?}", text, instruction.to_string());
  }

  /// Property: the decoded length is the encoded length is 2 + 2 * slots.
  #[test]
  fn prop_length_invariant((descriptor, text) in instruction_text()) {
    let bytes = assemble(&text).unwrap();
    let instruction = decode_instruction(&WordStream::new(&bytes), Address(0)).unwrap();
    prop_assert_eq!(instruction.length(), 2 + 2 * descriptor.slot_count());
    prop_assert_eq!(instruction.length(), bytes.len());
    prop_assert!(instruction.length() <= MAX_INSTRUCTION_LENGTH);
  }

  /// Property: decoding arbitrary bytes at any even address never panics, and a successful
  /// decode stays inside the buffer.
  #[test]
  fn prop_decode_total(bytes in proptest::collection::vec(any::<u8>(), 0..64), word in 0usize..40) {
    let address = Address(word * 2);
    if let Ok(instruction) = decode_instruction(&WordStream::new(&bytes), address) {
      prop_assert!(instruction.next_address().idx() <= bytes.len());
      prop_assert!(instruction.operands.iter().all(|operand| operand.is_valid()));
      let mut il: Vec<Stmt> = Vec::new();
      prop_assert_eq!(lift(&instruction, &mut il), instruction.length());
      prop_assert!(!il.is_empty());
    }
  }

  /// Property: the sweep visits strictly increasing addresses and never re-reads a byte that a
  /// decoded instruction consumed.
  #[test]
  fn prop_sweep_advances(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
    let mut next_free = Address(0);
    for (address, result) in Disassembler::new(&bytes) {
      prop_assert!(address >= next_free);
      next_free = match result {
        Ok(instruction) => instruction.next_address(),
        Err(_)          => address + 2,
      };
    }
  }

  /// Property: conditional branches have exactly two edges, one each way.
  #[test]
  fn prop_conditional_branch_totality(opcode in 7u16..=8, condition in 0u16..=32775, target in 0u16..=32775) {
    let bytes = encode_words(&[opcode, condition, target]);
    let instruction = decode_instruction(&WordStream::new(&bytes), Address(0)).unwrap();
    let found = edges(&instruction);
    prop_assert_eq!(found.len(), 2);
    let fallthrough = found.iter().filter(|e| e.target == Some(Address(6))).count();
    prop_assert!(fallthrough >= 1);
    let (taken, other) = match instruction.operation() {
      Operation::JumpIfTrue => (EdgeKind::TrueBranch, EdgeKind::FalseBranch),
      _                     => (EdgeKind::FalseBranch, EdgeKind::TrueBranch),
    };
    prop_assert_eq!(found[1].kind, other);
    match target <= LITERAL_MAX {
      true  => prop_assert_eq!(found[0].kind, taken),
      false => prop_assert_eq!(found[0].kind, EdgeKind::UnresolvedIndirect),
    }
  }
}

#[test]
fn terminators_have_no_targets(){
  for words in [&[0u16][..], &[18u16][..]] {
    let bytes = encode_words(words);
    let instruction = decode_instruction(&WordStream::new(&bytes), Address(0)).unwrap();
    let found = edges(&instruction);
    assert_eq!(found.len(), 1);
    assert!(found.iter().all(|edge| edge.target.is_none()));
  }
}
