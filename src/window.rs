// -*- mode: rust; -*-
//
// This file is part of ctnum.
// See LICENSE for licensing information.

//! Fixed-window lookup tables for exponentiation.

use alloc::vec;
use alloc::vec::Vec;

use subtle::ConstantTimeEq;

use crate::limb;
use crate::limb::Word;
use crate::modulus::Modulus;
use crate::montgomery::montgomery_mul;

/// The exponent is scanned in windows of this many bits.
pub(crate) const WINDOW_BITS: usize = 4;

/// The number of table entries, \\( 2^{\mathtt{WINDOW\_BITS}} \\).
pub(crate) const TABLE_SIZE: usize = 1 << WINDOW_BITS;

/// The mask extracting one window from an exponent limb.
pub(crate) const WINDOW_MASK: Word = (TABLE_SIZE - 1) as Word;

/// A table of the first sixteen powers of a base in Montgomery form,
/// \\( x^0 R, x^1 R, \ldots, x^{15} R \pmod m \\).
///
/// The table is only ever read through [`PowerTable::select`], which
/// touches every entry, so which power a window asked for never shows
/// up in the cache trace.
pub(crate) struct PowerTable {
    entries: Vec<Vec<Word>>,
}

impl PowerTable {
    /// Build the table for a base given in Montgomery form, with
    /// `one_mont` the Montgomery form of one (that is,
    /// \\( R \bmod m \\)).
    pub(crate) fn new(one_mont: &[Word], x_mont: &[Word], m: &Modulus) -> PowerTable {
        let mut entries = Vec::with_capacity(TABLE_SIZE);
        entries.push(one_mont.to_vec());
        for i in 1..TABLE_SIZE {
            let next = montgomery_mul(&entries[i - 1], x_mont, m);
            entries.push(next);
        }
        PowerTable { entries }
    }

    /// Given a window value \\( 0 \leq w < 16 \\), return
    /// \\( x^w R \bmod m \\) in constant time.
    ///
    /// Every entry is copied under a mask; do not "optimise" this into
    /// a direct index, the full scan is what keeps the memory access
    /// pattern independent of `w`.
    pub(crate) fn select(&self, w: Word) -> Vec<Word> {
        let mut t = vec![0 as Word; self.entries[0].len()];
        for (j, entry) in self.entries.iter().enumerate() {
            let c = w.ct_eq(&(j as Word));
            limb::conditional_assign_limbs(&mut t, entry, c);
        }
        t
    }
}
