/*!
  Control-flow edges of a decoded instruction. Only transfers other than sequential fallthrough
  are reported, except that conditional branches report both ways out.
*/

use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, IntoStaticStr};

use crate::address::Address;
use crate::bytecode::{Instruction, Operand, Operation};

#[derive(StrumDisplay, IntoStaticStr, Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum EdgeKind {
  Unconditional,
  TrueBranch,
  FalseBranch,
  Call,
  Return,
  /// The target is held in a register and unknown until run time.
  UnresolvedIndirect,
  NoReturn,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Edge {
  pub kind   : EdgeKind,
  pub target : Option<Address>,
}

impl Edge {
  pub fn new(kind: EdgeKind, target: Address) -> Edge {
    Edge{ kind, target: Some(target) }
  }

  pub fn untargeted(kind: EdgeKind) -> Edge {
    Edge{ kind, target: None }
  }

  /// An edge of `kind` to the operand's literal address, or an unresolved edge for a register or
  /// a missing operand.
  fn to_operand(kind: EdgeKind, operand: Option<&Operand>) -> Edge {
    match operand.and_then(Operand::literal_address) {
      Some(target) => Edge::new(kind, target),
      None         => Edge::untargeted(EdgeKind::UnresolvedIndirect),
    }
  }
}

impl Display for Edge {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.target {
      Some(target) => write!(f, "{} -> {}", self.kind, target),
      None         => write!(f, "{}", self.kind),
    }
  }
}

pub fn edges(instruction: &Instruction) -> Vec<Edge> {
  match instruction.operation() {
    Operation::Halt => vec![Edge::untargeted(EdgeKind::NoReturn)],

    Operation::Jump => vec![Edge::to_operand(EdgeKind::Unconditional, instruction.operand(0))],

    Operation::JumpIfTrue => vec![
      Edge::to_operand(EdgeKind::TrueBranch, instruction.operand(1)),
      Edge::new(EdgeKind::FalseBranch, instruction.next_address()),
    ],

    Operation::JumpIfFalse => vec![
      Edge::to_operand(EdgeKind::FalseBranch, instruction.operand(1)),
      Edge::new(EdgeKind::TrueBranch, instruction.next_address()),
    ],

    Operation::Call => vec![Edge::to_operand(EdgeKind::Call, instruction.operand(0))],

    Operation::Return => vec![Edge::untargeted(EdgeKind::Return)],

    | Operation::Set
    | Operation::Push
    | Operation::Pop
    | Operation::Equal
    | Operation::GreaterThan
    | Operation::Add
    | Operation::Multiply
    | Operation::Modulo
    | Operation::And
    | Operation::Or
    | Operation::Not
    | Operation::ReadMemory
    | Operation::WriteMemory
    | Operation::Out
    | Operation::In
    | Operation::Noop => vec![],
  }
}

/// Whether execution can continue at the next instruction.
pub fn falls_through(instruction: &Instruction) -> bool {
  !matches!(
    instruction.operation(),
    Operation::Halt | Operation::Jump | Operation::Return
  )
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::bytecode::{decode_instruction, encode_words, Word, WordStream};

  fn edges_of(words: &[Word]) -> Vec<Edge> {
    let bytes = encode_words(words);
    edges(&decode_instruction(&WordStream::new(&bytes), Address(0)).unwrap())
  }

  #[test]
  fn jump(){
    assert_eq!(edges_of(&[6, 0]), vec![Edge::new(EdgeKind::Unconditional, Address(0))]);
    assert_eq!(edges_of(&[6, 32770]), vec![Edge::untargeted(EdgeKind::UnresolvedIndirect)]);
  }

  #[test]
  fn conditional(){
    assert_eq!(
      edges_of(&[7, 32768, 0x20]),
      vec![Edge::new(EdgeKind::TrueBranch, Address(0x40)), Edge::new(EdgeKind::FalseBranch, Address(6))]
    );
    assert_eq!(
      edges_of(&[8, 32768, 0x20]),
      vec![Edge::new(EdgeKind::FalseBranch, Address(0x40)), Edge::new(EdgeKind::TrueBranch, Address(6))]
    );
    assert_eq!(
      edges_of(&[7, 1, 32768]),
      vec![Edge::untargeted(EdgeKind::UnresolvedIndirect), Edge::new(EdgeKind::FalseBranch, Address(6))]
    );
  }

  #[test]
  fn calls_and_terminators(){
    assert_eq!(edges_of(&[17, 3]), vec![Edge::new(EdgeKind::Call, Address(6))]);
    assert_eq!(edges_of(&[17, 32775]), vec![Edge::untargeted(EdgeKind::UnresolvedIndirect)]);
    assert_eq!(edges_of(&[18]), vec![Edge::untargeted(EdgeKind::Return)]);
    assert_eq!(edges_of(&[0]), vec![Edge::untargeted(EdgeKind::NoReturn)]);
    assert!(edges_of(&[9, 32768, 32769, 4]).is_empty());
    assert!(edges_of(&[21]).is_empty());
  }

  #[test]
  fn fallthrough(){
    let bytes = encode_words(&[6, 0, 7, 1, 0, 18, 0, 21]);
    let stream = WordStream::new(&bytes);
    let falls = |at: usize| falls_through(&decode_instruction(&stream, Address(at)).unwrap());
    assert!(!falls(0));
    assert!(falls(4));
    assert!(!falls(10));
    assert!(!falls(12));
    assert!(falls(14));
  }

  #[test]
  fn missing_target_is_unresolved(){
    let instruction = Instruction{
      address    : Address(4),
      descriptor : crate::bytecode::registry::descriptor(Operation::JumpIfTrue),
      operands   : vec![Operand::new(0, crate::bytecode::OperandKind::VALUE, 1)],
    };
    assert_eq!(
      edges(&instruction),
      vec![Edge::untargeted(EdgeKind::UnresolvedIndirect), Edge::new(EdgeKind::FalseBranch, Address(10))]
    );
  }

  #[test]
  fn display(){
    assert_eq!(Edge::new(EdgeKind::Call, Address(6)).to_string(), "Call -> 0x0006");
    assert_eq!(Edge::untargeted(EdgeKind::Return).to_string(), "Return");
  }
}
