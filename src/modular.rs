// -*- mode: rust; -*-
//
// This file is part of ctnum.
// See LICENSE for licensing information.

//! Arithmetic in the ring \\( \mathbb{Z}/m \\).
//!
//! All operations here reduce their inputs first (free when the input
//! already carries the reduction claim for `m`), produce values
//! announced at the modulus' bit length, and stamp the claim on the
//! result.  Addition and subtraction run one pass of limb arithmetic
//! plus one masked correction; multiplication is a full product
//! followed by the division engine, since for a single multiplication
//! the cost of moving in and out of Montgomery form would not pay for
//! itself.  Exponentiation is where Montgomery form earns its keep.

use alloc::vec;

use subtle::{Choice, ConstantTimeEq};

use crate::limb;
use crate::limb::{Word, WORD_BITS};
use crate::modulus::Modulus;
use crate::montgomery::{montgomery_mul, montgomery_representation};
use crate::nat::Nat;
use crate::window::{PowerTable, WINDOW_BITS, WINDOW_MASK};

impl Nat {
    /// \\( x + y \bmod m \\).
    pub fn mod_add(&self, y: &Nat, m: &Modulus) -> Nat {
        let xr = self.reduce(m);
        let yr = y.reduce(m);
        let mut s = xr.limbs().to_vec();
        let carry = limb::add_assign(&mut s, yr.limbs());
        let mut t = s.clone();
        let borrow = limb::sub_assign(&mut t, m.limbs());
        // carry == borrow covers exactly the cases where the sum
        // reaches m: (0,0) plain overflow of m, (1,1) wrapped past the
        // limb boundary.  (0,1) means the sum was already reduced, and
        // (1,0) cannot happen for reduced inputs.
        limb::conditional_assign_limbs(&mut s, &t, carry.ct_eq(&borrow));
        let mut out = Nat::from_limbs(m.bit_len(), s);
        out.set_reduced(m.id());
        out
    }

    /// \\( x - y \bmod m \\).
    pub fn mod_sub(&self, y: &Nat, m: &Modulus) -> Nat {
        let xr = self.reduce(m);
        let yr = y.reduce(m);
        let mut d = xr.limbs().to_vec();
        let borrow = limb::sub_assign(&mut d, yr.limbs());
        let mut t = d.clone();
        limb::add_assign(&mut t, m.limbs());
        limb::conditional_assign_limbs(&mut d, &t, Choice::from(borrow as u8));
        let mut out = Nat::from_limbs(m.bit_len(), d);
        out.set_reduced(m.id());
        out
    }

    /// \\( -x \bmod m \\).
    pub fn mod_neg(&self, m: &Modulus) -> Nat {
        let xr = self.reduce(m);
        let mut d = vec![0 as Word; m.size()];
        let borrow = limb::sub_assign(&mut d, xr.limbs());
        let mut t = d.clone();
        limb::add_assign(&mut t, m.limbs());
        limb::conditional_assign_limbs(&mut d, &t, Choice::from(borrow as u8));
        let mut out = Nat::from_limbs(m.bit_len(), d);
        out.set_reduced(m.id());
        out
    }

    /// \\( x \cdot y \bmod m \\), for odd and even moduli alike.
    pub fn mod_mul(&self, y: &Nat, m: &Modulus) -> Nat {
        let xr = self.reduce(m);
        let yr = y.reduce(m);
        xr.mul(&yr, None).reduce(m)
    }

    /// \\( x^y \bmod m \\).
    ///
    /// Dispatches on the public parity of `m`: odd moduli use 4-bit
    /// fixed windows over Montgomery form, even moduli fall back to
    /// square-and-multiply under [`Nat::mod_mul`].  The exponent's
    /// announced length is leaked (every window is processed, zero or
    /// not); its value is not.
    pub fn exp(&self, y: &Nat, m: &Modulus) -> Nat {
        if m.is_even() {
            self.exp_even(y, m)
        } else {
            self.exp_odd(y, m)
        }
    }

    fn exp_odd(&self, y: &Nat, m: &Modulus) -> Nat {
        let size = m.size();
        let mut scratch = vec![0 as Word; size];

        // R mod m, the Montgomery form of one, doubles as the
        // accumulator's starting value and the table's first entry.
        let mut one_mont = Nat::from_u64(1).reduce(m).limbs().to_vec();
        montgomery_representation(&mut one_mont, &mut scratch, m);
        let mut x_mont = self.reduce(m).limbs().to_vec();
        montgomery_representation(&mut x_mont, &mut scratch, m);
        let table = PowerTable::new(&one_mont, &x_mont, m);

        let mut acc = one_mont;
        let windows_per_limb = WORD_BITS / WINDOW_BITS;
        for i in (0..y.limbs().len()).rev() {
            let limb = y.limbs()[i];
            for w in (0..windows_per_limb).rev() {
                for _ in 0..WINDOW_BITS {
                    acc = montgomery_mul(&acc, &acc, m);
                }
                let window = (limb >> (w * WINDOW_BITS)) & WINDOW_MASK;
                let entry = table.select(window);
                let product = montgomery_mul(&acc, &entry, m);
                // multiply only for a nonzero window; the zero window
                // must cost the same, so the product is computed and
                // then masked away
                limb::conditional_assign_limbs(&mut acc, &product, !window.ct_eq(&0));
            }
        }

        // leave Montgomery form with a final multiplication by one
        let mut one = vec![0 as Word; size];
        one[0] = 1;
        let out_limbs = montgomery_mul(&acc, &one, m);
        let mut out = Nat::from_limbs(m.bit_len(), out_limbs);
        out.set_reduced(m.id());
        out
    }

    fn exp_even(&self, y: &Nat, m: &Modulus) -> Nat {
        let xr = self.reduce(m);
        let mut acc = Nat::from_u64(1).reduce(m);
        for i in (0..y.limbs().len()).rev() {
            let limb = y.limbs()[i];
            for b in (0..WORD_BITS).rev() {
                acc = acc.mod_mul(&acc, m);
                let t = acc.mod_mul(&xr, m);
                let bit = Choice::from(((limb >> b) & 1) as u8);
                acc.conditional_assign(&t, bit);
            }
        }
        acc
    }
}
