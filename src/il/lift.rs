//! Lifting of decoded instructions to IL.

use crate::bytecode::{
  Instruction, Operand, OperandValue, Operation, Register, LITERAL_MAX, LITERAL_MODULO, WORD_SIZE
};
use crate::il::{BinaryOp, BranchTarget, Expr, IlEmitter, Stmt, UnaryOp};

/// A register slot must hold a register; a literal there has no IL meaning.
fn destination(operand: &Operand) -> Option<Register> {
  operand.register()
}

fn value(operand: &Operand) -> Option<Expr> {
  match operand.classify() {
    OperandValue::Literal(value)     => Some(Expr::Const(value)),
    OperandValue::Register(register) => Some(Expr::Reg(register)),
    OperandValue::Invalid(_)         => None,
  }
}

/// A word index as a byte address. Registers hold word indices too, so they are scaled here.
fn address(operand: &Operand) -> Option<Expr> {
  match operand.classify() {
    OperandValue::Literal(value) => Some(Expr::Const(value * WORD_SIZE as u16)),
    OperandValue::Register(register) => {
      Some(Expr::binary(BinaryOp::Mult, Expr::Reg(register), Expr::Const(WORD_SIZE as u16)))
    }
    OperandValue::Invalid(_) => None,
  }
}

fn target(operand: &Operand) -> Option<BranchTarget> {
  match operand.literal_address() {
    Some(address) => Some(BranchTarget::Label(address)),
    None          => address(operand).map(BranchTarget::Indirect),
  }
}

/// Arithmetic on VM values wraps at 15 bits.
fn modulo_15_bits(expr: Expr) -> Expr {
  Expr::binary(BinaryOp::ModUnsigned, expr, Expr::Const(LITERAL_MODULO))
}

/// `reg := lhs op rhs` for the three operand arithmetic and comparison operations.
fn set_binary(instruction: &Instruction, op: BinaryOp, wrap: bool) -> Option<Vec<Stmt>> {
  let dest = destination(instruction.operand(0)?)?;
  let result = Expr::binary(op, value(instruction.operand(1)?)?, value(instruction.operand(2)?)?);
  let value = match wrap {
    true  => modulo_15_bits(result),
    false => result
  };
  Some(vec![Stmt::SetReg{ dest, value }])
}

fn statements(instruction: &Instruction) -> Option<Vec<Stmt>> {
  let operand = |slot: usize| instruction.operand(slot);
  let fallthrough = BranchTarget::Label(instruction.next_address());

  let stmts = match instruction.operation() {
    Operation::Halt => vec![Stmt::NoReturn],

    Operation::Set => {
      vec![Stmt::SetReg{ dest: destination(operand(0)?)?, value: value(operand(1)?)? }]
    }

    Operation::Push => vec![Stmt::Push(value(operand(0)?)?)],

    Operation::Pop => vec![Stmt::SetReg{ dest: destination(operand(0)?)?, value: Expr::Pop }],

    Operation::Equal       => set_binary(instruction, BinaryOp::CompareEqual, false)?,
    Operation::GreaterThan => set_binary(instruction, BinaryOp::CompareSignedGreaterThan, false)?,

    Operation::Jump => vec![Stmt::Jump(target(operand(0)?)?)],

    Operation::JumpIfTrue => {
      vec![Stmt::If{
        condition : value(operand(0)?)?,
        if_true   : target(operand(1)?)?,
        if_false  : fallthrough,
      }]
    }

    Operation::JumpIfFalse => {
      vec![Stmt::If{
        condition : value(operand(0)?)?,
        if_true   : fallthrough,
        if_false  : target(operand(1)?)?,
      }]
    }

    Operation::Add      => set_binary(instruction, BinaryOp::Add, true)?,
    Operation::Multiply => set_binary(instruction, BinaryOp::Mult, true)?,
    Operation::Modulo   => set_binary(instruction, BinaryOp::ModUnsigned, false)?,
    Operation::And      => set_binary(instruction, BinaryOp::And, false)?,
    Operation::Or       => set_binary(instruction, BinaryOp::Or, false)?,

    Operation::Not => {
      let inverted = Expr::unary(UnaryOp::Not, value(operand(1)?)?);
      vec![Stmt::SetReg{
        dest  : destination(operand(0)?)?,
        value : Expr::binary(BinaryOp::And, inverted, Expr::Const(LITERAL_MAX)),
      }]
    }

    Operation::ReadMemory => {
      vec![Stmt::SetReg{
        dest  : destination(operand(0)?)?,
        value : Expr::load(address(operand(1)?)?),
      }]
    }

    Operation::WriteMemory => {
      vec![Stmt::Store{ address: address(operand(0)?)?, value: value(operand(1)?)? }]
    }

    Operation::Call   => vec![Stmt::Call(target(operand(0)?)?)],
    Operation::Return => vec![Stmt::Return(Expr::Pop)],
    Operation::Out    => vec![Stmt::Output(value(operand(0)?)?)],
    Operation::In     => vec![Stmt::SetReg{ dest: destination(operand(0)?)?, value: Expr::Input }],
    Operation::Noop   => vec![Stmt::Nop],
  };
  Some(stmts)
}

/**
  Emits the IL for `instruction` and returns its length in bytes. An instruction whose operands
  cannot be expressed in IL (such as a literal where a register is written) is emitted as a single
  `Stmt::Unimplemented` rather than dropped.
*/
pub fn lift(instruction: &Instruction, il: &mut impl IlEmitter) -> usize {
  match statements(instruction) {
    Some(stmts) => {
      for stmt in stmts {
        log::trace!("{}: {}", instruction.address, stmt);
        il.emit(stmt);
      }
    }
    None => {
      log::debug!("cannot lift `{}` at {}", instruction, instruction.address);
      il.emit(Stmt::Unimplemented);
    }
  }
  instruction.length()
}
