/*!
  Operands of an instruction. A raw operand word is a literal, a register, or garbage, and which
  of these it is depends only on its value:

    0     ..= 32767   literal
    32768 ..= 32775   register R0 through R7
    32776 ..= 65535   invalid

  The slot an operand occupies additionally carries an `OperandKind` mask saying how a literal in
  that slot is to be treated (a plain value, a word index to be scaled into a byte address, or a
  character). Register classification always takes precedence over the mask.
*/

use std::fmt::{Display, Formatter};
use std::ops::BitOr;

use crate::address::Address;
use crate::bytecode::Word;

pub const LITERAL_MAX    : Word = 32767;
pub const LITERAL_MODULO : Word = 32768;
pub const REGISTER_MIN   : Word = 32768;
pub const REGISTER_MAX   : Word = 32775;
pub const REGISTER_COUNT : usize = 8;

/// Set of treatments legal for an operand slot. The empty set is a plain value.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct OperandKind(u8);

impl OperandKind {
  pub const VALUE    : OperandKind = OperandKind(0b000);
  pub const ADDRESS  : OperandKind = OperandKind(0b001);
  pub const CHAR     : OperandKind = OperandKind(0b010);
  pub const REGISTER : OperandKind = OperandKind(0b100);

  /// `|` usable in constant expressions.
  pub const fn union(self, other: OperandKind) -> OperandKind {
    OperandKind(self.0 | other.0)
  }

  /// True if every flag of `other` is set in `self`. Everything contains `VALUE`.
  pub fn contains(&self, other: OperandKind) -> bool {
    self.0 & other.0 == other.0
  }

  /// A slot requires a register only if register is its sole treatment. `rmem`'s destination,
  /// `REGISTER | ADDRESS`, also admits an address literal.
  pub fn requires_register(&self) -> bool {
    *self == OperandKind::REGISTER
  }

  pub fn is_address(&self) -> bool {
    self.contains(OperandKind::ADDRESS)
  }

  pub fn is_char(&self) -> bool {
    self.contains(OperandKind::CHAR)
  }
}

impl BitOr for OperandKind {
  type Output = OperandKind;
  fn bitor(self, rhs: OperandKind) -> OperandKind {
    OperandKind(self.0 | rhs.0)
  }
}

impl Display for OperandKind {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    if *self == OperandKind::VALUE {
      return write!(f, "value");
    }
    let names: Vec<&str> =
      [
        (OperandKind::REGISTER, "register"),
        (OperandKind::ADDRESS,  "address"),
        (OperandKind::CHAR,     "char"),
      ].iter()
       .filter(|(flag, _)| self.contains(*flag))
       .map(|(_, name)| *name)
       .collect();
    write!(f, "{}", names.join("|"))
  }
}

/// One of the eight general purpose registers.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Register(u8);

impl Register {
  /// Returns `None` unless `index < 8`.
  pub fn new(index: u8) -> Option<Register> {
    match (index as usize) < REGISTER_COUNT {
      true  => Some(Register(index)),
      false => None
    }
  }

  /// Interprets an operand word as a register reference.
  pub fn from_word(value: Word) -> Option<Register> {
    match value {
      REGISTER_MIN..=REGISTER_MAX => Some(Register((value - REGISTER_MIN) as u8)),
      _                           => None
    }
  }

  pub fn index(&self) -> u8 {
    self.0
  }

  /// The operand word that encodes this register.
  pub fn to_word(&self) -> Word {
    REGISTER_MIN + self.0 as Word
  }

  /// All registers, in order.
  pub fn all() -> impl Iterator<Item = Register> {
    (0..REGISTER_COUNT as u8).map(Register)
  }
}

impl Display for Register {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "R{}", self.0)
  }
}

/// The classification of a raw operand word.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum OperandValue {
  Literal(Word),
  Register(Register),
  Invalid(Word),
}

impl OperandValue {
  pub fn classify(value: Word) -> OperandValue {
    match value {
      0..=LITERAL_MAX => OperandValue::Literal(value),
      _ => match Register::from_word(value) {
        Some(register) => OperandValue::Register(register),
        None           => OperandValue::Invalid(value)
      }
    }
  }
}

/// An operand as it appears in a decoded instruction.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Operand {
  /// Position of the operand within the instruction, starting at 0.
  pub index : usize,
  pub kind  : OperandKind,
  pub value : Word,
}

impl Operand {
  pub fn new(index: usize, kind: OperandKind, value: Word) -> Operand {
    Operand{ index, kind, value }
  }

  pub fn classify(&self) -> OperandValue {
    OperandValue::classify(self.value)
  }

  pub fn is_literal(&self) -> bool {
    self.value <= LITERAL_MAX
  }

  pub fn is_register(&self) -> bool {
    (REGISTER_MIN..=REGISTER_MAX).contains(&self.value)
  }

  pub fn is_valid(&self) -> bool {
    self.value <= REGISTER_MAX
  }

  pub fn register(&self) -> Option<Register> {
    Register::from_word(self.value)
  }

  /// The byte address named by a literal operand, scaling the word index. `None` for registers,
  /// whose target is only known at run time.
  pub fn literal_address(&self) -> Option<Address> {
    match self.is_literal() {
      true  => Some(Address::from_word_index(self.value)),
      false => None
    }
  }
}
