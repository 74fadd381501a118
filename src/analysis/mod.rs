//! Analyses of decoded instructions: control flow, display text, and whole-image sweeps.

mod branch;
mod text;
mod sweep;

pub use branch::{edges, falls_through, Edge, EdgeKind};
pub use text::{operand_token, render, tokenize, TextToken, TokenKind, MNEMONIC_WIDTH};
pub use sweep::Disassembler;
