/*!
  Disassembly text. `tokenize` produces typed tokens for a host that colours or links them; the
  `Display` impl of `Instruction` writes the same text without the address label, in a form the
  assembler accepts.
*/

use std::fmt::{Display, Formatter};

use crate::bytecode::{Instruction, Operand, OperandValue};

/// Width the mnemonic is padded to so that operands line up.
pub const MNEMONIC_WIDTH: usize = 6;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
  AddressDisplay,
  Text,
  Instruction,
  OperandSeparator,
  Register,
  CharacterConstant,
  PossibleAddress,
  Integer,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TextToken {
  pub kind : TokenKind,
  pub text : String,
}

impl TextToken {
  pub fn new(kind: TokenKind, text: impl Into<String>) -> TextToken {
    TextToken{ kind, text: text.into() }
  }
}

/**
  The display token for one operand. Operands built by hand may carry a word the decoder would
  reject; such a word is shown as a plain integer.
*/
pub fn operand_token(operand: &Operand) -> TextToken {
  match operand.classify() {
    OperandValue::Register(register) => TextToken::new(TokenKind::Register, register.to_string()),

    OperandValue::Literal(value) if operand.kind.is_char() => {
      // Literals are at most 15 bits, below the surrogate range, so every one is a `char`.
      let c = char::from_u32(value as u32).unwrap_or(char::REPLACEMENT_CHARACTER);
      TextToken::new(TokenKind::CharacterConstant, format!("'{}'", c.escape_default()))
    }

    OperandValue::Literal(_) if operand.kind.is_address() => {
      // `literal_address` is always `Some` for a literal.
      let text = operand.literal_address().map(|a| a.to_string()).unwrap_or_default();
      TextToken::new(TokenKind::PossibleAddress, text)
    }

    | OperandValue::Literal(value)
    | OperandValue::Invalid(value) => TextToken::new(TokenKind::Integer, format!("0x{:X}", value)),
  }
}

fn operand_tokens(instruction: &Instruction) -> Vec<TextToken> {
  let mut tokens = Vec::new();
  for (i, operand) in instruction.operands.iter().enumerate() {
    if i > 0 {
      tokens.push(TextToken::new(TokenKind::OperandSeparator, ", "));
    }
    tokens.push(operand_token(operand));
  }
  tokens
}

/// Address label, mnemonic padded for alignment, then comma separated operands.
pub fn tokenize(instruction: &Instruction) -> Vec<TextToken> {
  let mut tokens = vec![
    TextToken::new(TokenKind::AddressDisplay, instruction.address.to_string()),
    TextToken::new(TokenKind::Text, "  "),
    TextToken::new(
      TokenKind::Instruction,
      format!("{:width$}", instruction.descriptor.mnemonic, width = MNEMONIC_WIDTH)
    ),
  ];
  tokens.extend(operand_tokens(instruction));
  tokens
}

/// Concatenates token text.
pub fn render(tokens: &[TextToken]) -> String {
  tokens.iter().map(|token| token.text.as_str()).collect()
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.descriptor.mnemonic)?;
    if !self.operands.is_empty() {
      write!(f, " {}", render(&operand_tokens(self)))?;
    }
    Ok(())
  }
}
