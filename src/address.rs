//! A byte address into a program image, with some convenience functions for converting to and
//! from the word indices the VM itself uses.

use std::ops::Add;
use std::fmt::{Display, Formatter};

use crate::bytecode::{Word, WORD_SIZE};

// `AddressNumberType` is `usize`, as it is naturally an index into the image.
pub type AddressNumberType = usize;

/**
  A byte offset into a program image. The VM addresses words, not bytes, so a word index `i`
  lives at byte address `i * WORD_SIZE`. Instruction addresses are always even.
*/
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default)]
pub struct Address(pub AddressNumberType);

impl Address {
  /// Converts a VM word index (as found in jump targets) to a byte address.
  pub fn from_word_index(word_index: Word) -> Address {
    Address(word_index as AddressNumberType * WORD_SIZE)
  }

  /// The byte offset into the image.
  pub fn idx(&self) -> AddressNumberType {
    self.0
  }

  /// The word index this address names. Only meaningful for aligned addresses.
  pub fn word_index(&self) -> AddressNumberType {
    self.0 / WORD_SIZE
  }

  pub fn is_aligned(&self) -> bool {
    self.0 % WORD_SIZE == 0
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "0x{:04X}", self.0)
  }
}

// Advance an address by a number of bytes
impl Add<AddressNumberType> for Address {
  type Output = Address;
  fn add(self, rhs: AddressNumberType) -> Address {
    Address(self.0 + rhs)
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn word_index_doubles(){
    assert_eq!(Address::from_word_index(0), Address(0));
    assert_eq!(Address::from_word_index(0x1234), Address(0x2468));
    assert_eq!(Address::from_word_index(32767).word_index(), 32767);
  }

  #[test]
  fn display_pads_to_four_digits(){
    assert_eq!(Address(0).to_string(), "0x0000");
    assert_eq!(Address(0xABC).to_string(), "0x0ABC");
    assert_eq!(Address(0x1FFFE).to_string(), "0x1FFFE");
  }

  #[test]
  fn alignment(){
    assert!(Address(4).is_aligned());
    assert!(!Address(5).is_aligned());
    assert_eq!(Address(4) + 6, Address(10));
  }
}
