// -*- mode: rust; -*-
//
// This file is part of ctnum.
// See LICENSE for licensing information.

//! Montgomery multiplication.
//!
//! For an odd modulus \\( m \\) of \\( n \\) limbs, write
//! \\( R = 2^{Wn} \\).  The *Montgomery form* of \\( a \\) is
//! \\( aR \bmod m \\), and the product of two numbers in that form,
//! divided by \\( R \\), is the Montgomery form of their product:
//!
//! $$ \mathrm{mont}(aR, bR) = a b R \bmod m. $$
//!
//! The division by \\( R \\) is free: each round of the multiplier
//! below adds a multiple of \\( m \\) chosen (via the precomputed
//! \\( -m_0^{-1} \bmod 2^W \\)) to zero out the lowest limb, then
//! discards that limb.  This is the coarsely-integrated operand
//! scanning layout, with a single overflow word carried across rounds
//! and one masked subtraction at the end.
//!
//! Entering Montgomery form goes through the division engine instead:
//! shifting a reduced value up by one limb and reducing, \\( n \\)
//! times over, multiplies it by \\( R \bmod m \\).  The cost only pays
//! off when many multiplications share the same modulus, which is why
//! only exponentiation uses this path.

use alloc::vec;
use alloc::vec::Vec;

use subtle::ConstantTimeEq;

use crate::limb;
use crate::limb::{WideWord, Word, WORD_BITS};
use crate::modulus::{shift_add_in, Modulus};

/// \\( x y R^{-1} \bmod m \\) for `x`, `y` already reduced mod the odd
/// modulus `m`.  All three slices have `m.size()` limbs.
pub(crate) fn montgomery_mul(x: &[Word], y: &[Word], m: &Modulus) -> Vec<Word> {
    let size = m.size();
    debug_assert_eq!(x.len(), size);
    debug_assert_eq!(y.len(), size);
    debug_assert!(!m.is_even());
    let ml = m.limbs();
    let m0inv = m.m0inv();

    let mut u = vec![0 as Word; size];
    let mut overflow: Word = 0;
    for &xi in x {
        let carry1 = limb::mul_add_word(&mut u, y, xi);
        // Adding f·m clears the low limb: f ≡ −u[0]·m₀⁻¹ (mod 2^W)
        let f = u[0].wrapping_mul(m0inv);
        let carry2 = limb::mul_add_word(&mut u, ml, f);
        debug_assert_eq!(u[0], 0);
        for j in 0..size - 1 {
            u[j] = u[j + 1];
        }
        let t = (overflow as WideWord) + (carry1 as WideWord) + (carry2 as WideWord);
        u[size - 1] = t as Word;
        overflow = (t >> WORD_BITS) as Word;
    }

    // The accumulator sits in [0, 2m); subtract m exactly when the
    // value still covers it, i.e. when the borrow matches the overflow
    // word bit for bit.
    let mut out = u.clone();
    let borrow = limb::sub_assign(&mut out, ml);
    let keep_sub = borrow.ct_eq(&overflow);
    limb::conditional_assign_limbs(&mut out, &u, !keep_sub);
    out
}

/// Map the reduced value `z` to its Montgomery form
/// \\( z R \bmod m \\), in place: `size` rounds of appending a zero
/// limb and reducing.
pub(crate) fn montgomery_representation(z: &mut [Word], scratch: &mut [Word], m: &Modulus) {
    for _ in 0..m.size() {
        shift_add_in(z, scratch, 0, m);
    }
}
