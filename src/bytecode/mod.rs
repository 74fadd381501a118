/*!

  The VM uses a 16 bit little-endian word size, and memory addresses words, not bytes. An
  instruction is an opcode word followed by zero to three operand words, so instructions are
  2, 4, 6, or 8 bytes long. The number of operands is fixed by the opcode. Analysis works in
  byte addresses, so a jump target literal `n` is the byte address `2n`.

  Operand words are interpreted by value:

    Literal:  0..=32767
    Register: 32768..=32775 (R0..R7)
    Invalid:  everything else

  An enum is used for the opcode itself, with one variant per opcode. The per-slot layout of
  each operation lives in the registry, which is the only place the decoder and the assembler
  learn operand arity and operand kinds from.

*/

mod binary;
mod instruction;
mod operand;
pub mod registry;
mod assembly;

pub use binary::{
  decode_instruction, try_decode_instruction, encode_instruction, encode_words, convert_to_nop,
  DecodeError, Word, WordStream, WORD_SIZE
};
pub use instruction::{Instruction, Operation};
pub use operand::{
  Operand, OperandKind, OperandValue, Register,
  LITERAL_MAX, LITERAL_MODULO, REGISTER_MIN, REGISTER_MAX, REGISTER_COUNT
};
pub use registry::{lookup, lookup_mnemonic, OperationDescriptor, MAX_INSTRUCTION_LENGTH};
pub use assembly::{assemble, assemble_program, AssembleError, ProgramError};
