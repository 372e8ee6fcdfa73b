// -*- mode: rust; -*-
//
// This file is part of ctnum.
// See LICENSE for licensing information.

#![no_std]
#![deny(missing_docs)] // refuse to compile if documentation is missing
#![doc(html_root_url = "https://docs.rs/ctnum/0.1.0")]

//! # ctnum
//!
//! **Arbitrary-precision modular arithmetic whose running time and
//! memory trace depend only on the announced sizes of its operands,
//! never on their values.**
//!
//! This crate is a building block for protocols that do bignum
//! arithmetic over secrets — RSA, finite-field Diffie–Hellman,
//! Paillier, threshold signatures — where the numbers involved are
//! private but their *sizes* are not.  Every [`Nat`] carries an
//! announced bit length, and the contract of every operation is that
//! an attacker watching timing or cache behaviour learns at most:
//!
//! * the announced lengths of the operands,
//! * the (public, by construction) bit length and parity of any
//!   [`Modulus`] involved,
//! * which operations were called.
//!
//! Decisions internal to an operation — carries, comparisons, window
//! values, quotient digits — are all taken with the masked selects of
//! the [`subtle`] crate.  There are no value-dependent branches, no
//! value-dependent table indexes, and no hardware division.
//!
//! # Example
//!
//! ```
//! use ctnum::{Modulus, Nat};
//!
//! // 40 + 40 ≡ 2 (mod 13)
//! let m = Modulus::from_u64(13);
//! let x = Nat::from_u64(40);
//! assert_eq!(x.mod_add(&x, &m).to_u64(), 2);
//!
//! // Fermat: 3^12 ≡ 1 (mod 13)
//! let z = Nat::from_u64(3).exp(&Nat::from_u64(12), &m);
//! assert_eq!(z.to_u64(), 1);
//! ```
//!
//! # What is *not* protected
//!
//! Constant-time here means constant across *values* of equal
//! announced size, not across sizes: resizing a number, constructing
//! a modulus (which trims to the true bit length), or calling the
//! explicitly-flagged [`Nat::true_len`] all leak lengths.  Physical
//! side channels (power, EM) are out of scope, as is enforcing that
//! callers pre-reduce their operands — reduction happens internally
//! where it is needed.

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// The arithmetic core, leaves first.

mod limb;
mod nat;
mod modulus;
mod montgomery;
mod window;
mod modular;
mod inverse;
mod sqrt;
mod int;

// Errors and the public surface.

mod errors;

pub use crate::errors::DecodeError;
pub use crate::int::Int;
pub use crate::limb::{Word, WORD_BITS, WORD_BYTES};
pub use crate::modulus::Modulus;
pub use crate::nat::Nat;
