use strum_macros::{
  Display as StrumDisplay, EnumCount, EnumIter, EnumString, IntoStaticStr
};
use num_enum::{TryFromPrimitive, IntoPrimitive};

use crate::address::Address;
use crate::bytecode::{OperationDescriptor, Operand, OperandKind, Word};

/**
  Opcodes of the virtual machine.

  The discriminant of each variant is its opcode, so the order the opcodes are listed below is
  significant: the registry is indexed by discriminant. The `strum` serialization of each
  variant is its assembly mnemonic.
*/
#[derive(
  StrumDisplay, IntoStaticStr, EnumString, EnumIter, EnumCount, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq,         PartialEq, Debug,    Hash
)]
#[repr(u16)]
pub enum Operation {
  #[strum(serialize = "halt")] Halt,         // halt
  #[strum(serialize = "set")]  Set,          // set( reg, value )
  #[strum(serialize = "push")] Push,         // push( value )
  #[strum(serialize = "pop")]  Pop,          // pop( reg )
  #[strum(serialize = "eq")]   Equal,        // eq( reg, value, value )
  #[strum(serialize = "gt")]   GreaterThan,  // gt( reg, value, value )
  #[strum(serialize = "jmp")]  Jump,         // jmp( address )
  #[strum(serialize = "jt")]   JumpIfTrue,   // jt( value, address )
  #[strum(serialize = "jf")]   JumpIfFalse,  // jf( value, address )
  #[strum(serialize = "add")]  Add,          // add( reg, value, value )
  #[strum(serialize = "mult")] Multiply,     // mult( reg, value, value )
  #[strum(serialize = "mod")]  Modulo,       // mod( reg, value, value )
  #[strum(serialize = "and")]  And,          // and( reg, value, value )
  #[strum(serialize = "or")]   Or,           // or( reg, value, value )
  #[strum(serialize = "not")]  Not,          // not( reg, value )
  #[strum(serialize = "rmem")] ReadMemory,   // rmem( reg|address, value )
  #[strum(serialize = "wmem")] WriteMemory,  // wmem( address, value )
  #[strum(serialize = "call")] Call,         // call( address )
  #[strum(serialize = "ret")]  Return,       // ret
  #[strum(serialize = "out")]  Out,          // out( char )
  #[strum(serialize = "in")]   In,           // in( reg )
  #[strum(serialize = "noop")] Noop,         // noop
}

const R  : OperandKind = OperandKind::REGISTER;
const V  : OperandKind = OperandKind::VALUE;
const A  : OperandKind = OperandKind::ADDRESS;
const C  : OperandKind = OperandKind::CHAR;
const RA : OperandKind = OperandKind::REGISTER.union(OperandKind::ADDRESS);

impl Operation {
  pub fn code(&self) -> Word {
    Into::<Word>::into(*self)
  }

  pub fn mnemonic(&self) -> &'static str {
    self.into()
  }

  /// The kind mask of each operand slot, in order.
  pub fn slots(&self) -> &'static [OperandKind] {
    match self {
      Operation::Halt        => &[],
      Operation::Set         => &[R, V],
      Operation::Push        => &[V],
      Operation::Pop         => &[R],
      Operation::Equal       => &[R, V, V],
      Operation::GreaterThan => &[R, V, V],
      Operation::Jump        => &[A],
      Operation::JumpIfTrue  => &[V, A],
      Operation::JumpIfFalse => &[V, A],
      Operation::Add         => &[R, V, V],
      Operation::Multiply    => &[R, V, V],
      Operation::Modulo      => &[R, V, V],
      Operation::And         => &[R, V, V],
      Operation::Or          => &[R, V, V],
      Operation::Not         => &[R, V],
      Operation::ReadMemory  => &[RA, V],
      Operation::WriteMemory => &[A, V],
      Operation::Call        => &[A],
      Operation::Return      => &[],
      Operation::Out         => &[C],
      Operation::In          => &[R],
      Operation::Noop        => &[],
    }
  }

  pub fn arity(&self) -> usize {
    self.slots().len()
  }
}

/**
  A decoded instruction: where it lives, what it is, and its operands.

  The decoder produces exactly one operand per slot of the descriptor. Instructions built by hand
  may not, so consumers reach operands through `operand`, which tolerates a missing slot.
*/
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Instruction {
  pub address    : Address,
  pub descriptor : &'static OperationDescriptor,
  pub operands   : Vec<Operand>,
}

impl Instruction {
  pub fn operation(&self) -> Operation {
    self.descriptor.operation
  }

  /// Length in bytes, including the opcode word.
  pub fn length(&self) -> usize {
    self.descriptor.length()
  }

  /// The operand filling `slot`, if there is one.
  pub fn operand(&self, slot: usize) -> Option<&Operand> {
    self.operands.get(slot)
  }

  /// The address execution falls through to.
  pub fn next_address(&self) -> Address {
    self.address + self.length()
  }
}
