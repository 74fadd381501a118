/*!
  The human readable textual form of bytecode is called assembly. This module parses assembly
  into the binary encoding, consulting the operation registry for the arity and operand kinds of
  each mnemonic. Anything the disassembler prints can be read back here.

  A line is a mnemonic (or a numeric opcode) followed by operands separated by commas and/or
  spaces, optionally followed by a `;` comment:

    add R0, R1, 0x4
    out 'A'      ; same as `out 65`
    jmp 0x0010   ; byte address, encoded as word index 8
*/

use nom::{
  branch::alt,
  bytes::complete::is_not,
  character::complete::{
    alphanumeric1,
    char as one_char,
    hex_digit1,
    none_of,
    space0,
    space1
  },
  combinator::{all_consuming, map, map_opt, opt, rest, value},
  multi::many0,
  sequence::{delimited, pair, preceded, tuple},
  IResult
};
use thiserror::Error;

use crate::bytecode::{
  encode_words, lookup, lookup_mnemonic, OperandKind, Register, Word, LITERAL_MAX, WORD_SIZE
};

#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum AssembleError {
  #[error("nothing to assemble")]
  Empty,

  #[error("unexpected input: `{text}`")]
  Syntax { text: String },

  #[error("{mnemonic} is not an operation")]
  UnknownMnemonic { mnemonic: String },

  #[error("{mnemonic} requires {expected} operands but was given {found}")]
  OperandCountMismatch {
    mnemonic : String,
    expected : usize,
    found    : usize,
  },

  #[error("operand {index} expects a register but was given `{text}`")]
  ExpectedRegister { index: usize, text: String },

  #[error("operand {index}: `{text}` is not one of R0 through R7")]
  InvalidRegister { index: usize, text: String },

  #[error("operand {index}: cannot parse `{text}`")]
  UnparsableOperand { index: usize, text: String },

  #[error("operand {index}: {value} does not fit in a 15 bit literal")]
  LiteralOutOfRange { index: usize, value: u32 },

  #[error("operand {index}: address {value:#X} is not word aligned")]
  MisalignedAddress { index: usize, value: u32 },
}

/// An assembly error together with the line it occurred on.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
#[error("Error on line {line}: {error}")]
pub struct ProgramError {
  pub line  : usize,
  #[source]
  pub error : AssembleError,
}

/// An operand as written, before the slot it fills gives it meaning.
#[derive(Clone, Debug, Eq, PartialEq)]
enum OperandToken<'a> {
  /// A quoted character such as `'A'` or `'\n'`, already unescaped.
  Quoted(char),
  Bare(&'a str),
}

// region Parsers

fn unicode_escape(input: &str) -> IResult<&str, char> {
  map_opt(
    preceded(one_char('u'), delimited(one_char('{'), hex_digit1, one_char('}'))),
    |digits: &str| u32::from_str_radix(digits, 16).ok().and_then(char::from_u32)
  )(input)
}

fn character(input: &str) -> IResult<&str, char> {
  alt((
    preceded(
      one_char('\\'),
      alt((
        value('\n', one_char('n')),
        value('\r', one_char('r')),
        value('\t', one_char('t')),
        value('\0', one_char('0')),
        value('\\', one_char('\\')),
        value('\'', one_char('\'')),
        value('"',  one_char('"')),
        unicode_escape,
      ))
    ),
    none_of("\\")
  ))(input)
}

fn operand_token(input: &str) -> IResult<&str, OperandToken<'_>> {
  alt((
    map(delimited(one_char('\''), character, one_char('\'')), OperandToken::Quoted),
    map(delimited(one_char('"'),  character, one_char('"')),  OperandToken::Quoted),
    map(is_not(" \t,;"), OperandToken::Bare),
  ))(input)
}

fn separator(input: &str) -> IResult<&str, ()> {
  alt((
    value((), delimited(space0, one_char(','), space0)),
    value((), space1),
  ))(input)
}

fn instruction_line(input: &str) -> IResult<&str, (&str, Vec<OperandToken<'_>>)> {
  all_consuming(
    delimited(
      space0,
      pair(alphanumeric1, many0(preceded(separator, operand_token))),
      tuple((space0, opt(preceded(one_char(';'), rest))))
    )
  )(input)
}

// endregion

/// Parses a decimal or `0x`-prefixed hexadecimal number.
fn parse_integer(text: &str) -> Option<u32> {
  match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
    Some(digits) => u32::from_str_radix(digits, 16).ok(),
    None if text.chars().all(|c| c.is_ascii_digit()) => text.parse::<u32>().ok(),
    None => None
  }
}

/// Recognizes `R<n>`. Returns `None` if the text does not have that shape at all.
fn parse_register(index: usize, text: &str) -> Option<Result<Register, AssembleError>> {
  let digits = text.strip_prefix('R')?;
  if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
    return None;
  }
  let register = digits.parse::<u8>().ok().and_then(Register::new);
  Some(register.ok_or_else(|| AssembleError::InvalidRegister{ index, text: text.to_string() }))
}

fn literal(index: usize, kind: OperandKind, number: u32) -> Result<Word, AssembleError> {
  let word_value = match kind.is_address() {
    true => {
      // Byte address to word index.
      if number % WORD_SIZE as u32 != 0 {
        return Err(AssembleError::MisalignedAddress{ index, value: number });
      }
      number / WORD_SIZE as u32
    }
    false => number
  };
  match word_value <= LITERAL_MAX as u32 {
    true  => Ok(word_value as Word),
    false => Err(AssembleError::LiteralOutOfRange{ index, value: number })
  }
}

fn character_literal(index: usize, c: char) -> Result<Word, AssembleError> {
  literal(index, OperandKind::CHAR, c as u32)
}

/// Resolves one operand token against the kind mask of the slot it fills.
fn resolve_operand(index: usize, kind: OperandKind, token: &OperandToken) -> Result<Word, AssembleError> {
  match token {

    OperandToken::Bare(text) => {
      if let Some(register) = parse_register(index, text) {
        return register.map(|r| r.to_word());
      }
      if kind.requires_register() {
        return Err(AssembleError::ExpectedRegister{ index, text: text.to_string() });
      }
      if let Some(number) = parse_integer(text) {
        return literal(index, kind, number);
      }
      let unquoted = text.trim_matches(|c: char| c == '\'' || c == '"');
      let mut chars = unquoted.chars();
      match (kind.is_char(), chars.next(), chars.next()) {
        (true, Some(c), None) => character_literal(index, c),
        _ => Err(AssembleError::UnparsableOperand{ index, text: text.to_string() })
      }
    }

    OperandToken::Quoted(c) => {
      match kind {
        kind if kind.requires_register() => {
          Err(AssembleError::ExpectedRegister{ index, text: format!("{:?}", c) })
        }
        kind if kind.is_char() => character_literal(index, *c),
        _ => Err(AssembleError::UnparsableOperand{ index, text: format!("{:?}", c) })
      }
    }

  }
}

/**
  Assembles one instruction to its little-endian encoding: the opcode word followed by one word
  per operand.
*/
pub fn assemble(text: &str) -> Result<Vec<u8>, AssembleError> {
  let text = text.trim();
  if text.is_empty() {
    return Err(AssembleError::Empty);
  }

  let (mnemonic, tokens) = match instruction_line(text) {
    Ok((_rest, parsed)) => parsed,
    Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
      return Err(AssembleError::Syntax{ text: e.input.to_string() });
    }
    Err(nom::Err::Incomplete(_)) => {
      return Err(AssembleError::Syntax{ text: text.to_string() });
    }
  };

  let descriptor =
    lookup_mnemonic(mnemonic)
      .or_else(|| parse_integer(mnemonic).and_then(|n| Word::try_from(n).ok()).and_then(lookup))
      .ok_or_else(|| AssembleError::UnknownMnemonic{ mnemonic: mnemonic.to_string() })?;

  if tokens.len() != descriptor.slot_count() {
    return Err(AssembleError::OperandCountMismatch{
      mnemonic : descriptor.mnemonic.to_string(),
      expected : descriptor.slot_count(),
      found    : tokens.len()
    });
  }

  let mut words = vec![descriptor.opcode()];
  for (index, (kind, token)) in descriptor.slots.iter().zip(tokens.iter()).enumerate() {
    words.push(resolve_operand(index, *kind, token)?);
  }
  Ok(encode_words(&words))
}

/**
  Assembles a listing of one instruction per line into a program image. Blank lines and lines
  containing only a `;` comment are skipped. Line numbers in errors count from 1.
*/
pub fn assemble_program(text: &str) -> Result<Vec<u8>, ProgramError> {
  let mut image = Vec::new();
  for (number, line) in text.lines().enumerate() {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(';') {
      continue;
    }
    match assemble(trimmed) {
      Ok(bytes) => image.extend(bytes),
      Err(error) => {
        log::debug!("assembly failed on line {}: {}", number + 1, error);
        return Err(ProgramError{ line: number + 1, error });
      }
    }
  }
  Ok(image)
}
