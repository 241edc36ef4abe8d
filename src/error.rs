//! Error types and utilities.

use std::error::Error as StdError;
use std::fmt;

/// The result of a hook or decoder operation.
pub type Result<T> = std::result::Result<T, Error>;

/// A representation of all possible errors.
#[derive(Debug)]
pub enum Error {
  /// The OS refused to allocate a trampoline page.
  AllocFailed(region::Error),
  /// The OS refused to change a region's protection.
  ProtectFailed(region::Error),
  /// The target's prolog covers fewer than five bytes.
  TargetTooSmall,
  /// An instruction in the prolog could not be relocated: either its
  /// relative target lies inside the stolen byte range, or the relocated
  /// displacement no longer fits its original encoded width.
  CannotRelocate,
  /// A hook already exists for this target address.
  DuplicateTarget,
  /// `disable` was called on a hook that is not enabled.
  NotEnabled,
  /// The decoder encountered an opcode it does not cover (e.g. the
  /// two-byte `0F` escape map).
  UnknownOpcode,
  /// The decoder encountered an operand type outside the covered subset.
  UnsupportedOperand,
}

impl StdError for Error {
  fn source(&self) -> Option<&(dyn StdError + 'static)> {
    match self {
      Error::AllocFailed(error) | Error::ProtectFailed(error) => Some(error),
      _ => None,
    }
  }
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Error::AllocFailed(error) => write!(f, "Failed to allocate a trampoline page: {}", error),
      Error::ProtectFailed(error) => write!(f, "Failed to change memory protection: {}", error),
      Error::TargetTooSmall => write!(f, "Target prolog is smaller than a 5-byte jump"),
      Error::CannotRelocate => write!(f, "An instruction in the prolog cannot be relocated"),
      Error::DuplicateTarget => write!(f, "A hook already exists for this target"),
      Error::NotEnabled => write!(f, "Hook is not enabled"),
      Error::UnknownOpcode => write!(f, "Encountered an opcode outside the decoder's coverage"),
      Error::UnsupportedOperand => {
        write!(f, "Encountered an operand type outside the decoder's coverage")
      }
    }
  }
}
