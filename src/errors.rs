// -*- mode: rust; -*-
//
// This file is part of ctnum.
// See LICENSE for licensing information.

//! Errors which may occur when decoding numbers from strings or bytes.

use core::fmt;
use core::fmt::Display;

/// Errors which may occur while decoding a number from its textual or
/// binary encoding.
///
/// Error classification never depends on the numeric value of an
/// operand, only on the bytes of the input buffer, which are treated
/// as public.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecodeError {
    /// A hex string contained a byte outside the strict `0-9A-F`
    /// alphabet (lower-case digits are rejected).
    InvalidHexCharacter {
        /// The offending byte.
        byte: u8,
        /// Its position in the input string.
        index: usize,
    },
    /// A binary encoding was structurally invalid: an empty [`Int`]
    /// buffer, or a modulus encoding denoting the value zero.
    ///
    /// [`Int`]: crate::Int
    InvalidEncoding,
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DecodeError::InvalidHexCharacter { byte, index } => {
                write!(f, "invalid hex character {:#04x} at index {}", byte, index)
            }
            DecodeError::InvalidEncoding => {
                write!(f, "encoding is empty or denotes an invalid value")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}
