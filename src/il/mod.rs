/*!
  A small low level intermediate language for analysing VM programs. The abstract machine has the
  eight general registers, a stack, a flat word-addressable memory the size of the program image
  (addressed in bytes, like the image), and abstract character I/O. Statements are collected by an
  `IlEmitter`; a `Vec<Stmt>` is the simplest one.
*/

mod lift;

use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, IntoStaticStr};

use crate::address::Address;
use crate::bytecode::{Register, Word};

pub use lift::lift;

#[derive(StrumDisplay, IntoStaticStr, Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
  #[strum(serialize = "~")] Not,
}

#[derive(StrumDisplay, IntoStaticStr, Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
  #[strum(serialize = "+")]   Add,
  #[strum(serialize = "*")]   Mult,
  #[strum(serialize = "%u")]  ModUnsigned,
  #[strum(serialize = "&")]   And,
  #[strum(serialize = "|")]   Or,
  #[strum(serialize = "==")]  CompareEqual,
  // The VM's `gt` is defined with a signed comparison.
  #[strum(serialize = "s>")]  CompareSignedGreaterThan,
}

/// A value computed without side effects other than `Pop` and `Input`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Expr {
  Const(Word),
  Reg(Register),
  /// Removes and yields the top of the stack.
  Pop,
  /// Reads one character of input.
  Input,
  /// The memory word at a byte address.
  Load(Box<Expr>),
  Unary {
    op      : UnaryOp,
    operand : Box<Expr>,
  },
  Binary {
    op  : BinaryOp,
    lhs : Box<Expr>,
    rhs : Box<Expr>,
  },
}

impl Expr {
  pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    Expr::Unary{ op, operand: Box::new(operand) }
  }

  pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary{ op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
  }

  pub fn load(address: Expr) -> Expr {
    Expr::Load(Box::new(address))
  }
}

impl Display for Expr {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Expr::Const(value)             => write!(f, "0x{:X}", value),
      Expr::Reg(register)            => write!(f, "{}", register),
      Expr::Pop                      => write!(f, "pop"),
      Expr::Input                    => write!(f, "in"),
      Expr::Load(address)            => write!(f, "[{}]", address),
      Expr::Unary{ op, operand }     => write!(f, "{}{}", op, operand),
      Expr::Binary{ op, lhs, rhs }   => write!(f, "({} {} {})", lhs, op, rhs),
    }
  }
}

/// Where a branch goes: a known address, or one computed at run time.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum BranchTarget {
  Label(Address),
  Indirect(Expr),
}

impl Display for BranchTarget {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      BranchTarget::Label(address) => write!(f, "{}", address),
      BranchTarget::Indirect(expr) => write!(f, "{}", expr),
    }
  }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Stmt {
  SetReg {
    dest  : Register,
    value : Expr,
  },
  Push(Expr),
  Store {
    address : Expr,
    value   : Expr,
  },
  Jump(BranchTarget),
  If {
    condition : Expr,
    if_true   : BranchTarget,
    if_false  : BranchTarget,
  },
  /// Pushes the return address and transfers control.
  Call(BranchTarget),
  Return(Expr),
  NoReturn,
  Output(Expr),
  Nop,
  /// The instruction could not be lifted.
  Unimplemented,
}

impl Display for Stmt {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Stmt::SetReg{ dest, value }    => write!(f, "{} = {}", dest, value),
      Stmt::Push(value)              => write!(f, "push({})", value),
      Stmt::Store{ address, value }  => write!(f, "[{}] = {}", address, value),
      Stmt::Jump(target)             => write!(f, "jump({})", target),
      Stmt::If{ condition, if_true, if_false } => {
        write!(f, "if ({}) then {} else {}", condition, if_true, if_false)
      }
      Stmt::Call(target)             => write!(f, "call({})", target),
      Stmt::Return(value)            => write!(f, "return({})", value),
      Stmt::NoReturn                 => write!(f, "no_return"),
      Stmt::Output(value)            => write!(f, "out({})", value),
      Stmt::Nop                      => write!(f, "nop"),
      Stmt::Unimplemented            => write!(f, "unimplemented"),
    }
  }
}

/// Receives lifted statements in order.
pub trait IlEmitter {
  fn emit(&mut self, stmt: Stmt);
}

impl IlEmitter for Vec<Stmt> {
  fn emit(&mut self, stmt: Stmt) {
    self.push(stmt);
  }
}
