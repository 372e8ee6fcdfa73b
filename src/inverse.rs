// -*- mode: rust; -*-
//
// This file is part of ctnum.
// See LICENSE for licensing information.

//! Modular inversion.
//!
//! The workhorse is a binary extended GCD over \\( (a, b) \\) with
//! cofactors \\( (u, v) \\) kept reduced modulo the (odd) modulus:
//! at every step either \\( a \\) is halved, or the pairs are swapped
//! and \\( (a - b)/2 \\) is taken, whichever the parity and ordering
//! demand — and both outcomes are computed every iteration, with masks
//! deciding which one lands.  The iteration count depends only on the
//! operand sizes, so the whole thing is one long straight line.
//!
//! Even moduli have no Montgomery structure and the binary GCD needs
//! an odd anchor, so they go through an exchange trick instead: with
//! \\( x \\) odd (it must be, to be a unit mod even \\( m \\)), find
//! \\( A \\) with \\( A m \equiv 1 \pmod{x} \\) using the odd-modulus
//! routine with the roles swapped, and then
//! \\( -\frac{A m - 1}{x} \bmod m \\) is the inverse sought.  The
//! division is exact and runs bit-serially; deliberately, no
//! [`Modulus`] is ever constructed around \\( x \\), because modulus
//! construction leaks the true bit length and \\( x \\) is secret.
//!
//! Nothing here reports failure: inverting a value that shares a
//! factor with the modulus yields a well-formed but meaningless
//! number.  Callers who cannot guarantee coprimality up front check
//! with [`Nat::coprime`] first.

use alloc::vec;
use alloc::vec::Vec;
use core::cmp::max;

use subtle::{Choice, ConstantTimeEq};

use crate::limb;
use crate::limb::{Word, WORD_BITS};
use crate::modulus::Modulus;
use crate::nat::Nat;

/// Halve `u` modulo the odd modulus whose \\( (m+1)/2 \\) is `mh`:
/// even residues shift right, odd ones shift right and add `mh`.
fn halve_mod(u: &mut [Word], mh: &[Word], scratch: &mut [Word]) {
    let odd = Choice::from((u[0] & 1) as u8);
    limb::shr1(u);
    scratch.copy_from_slice(u);
    limb::add_assign(scratch, mh);
    limb::conditional_assign_limbs(u, scratch, odd);
}

/// The cofactor \\( v \\) with \\( v x \equiv \gcd(x, m) \pmod{m} \\),
/// for odd `m`.  When the inputs are coprime this is the inverse of
/// `x`.  Sized by announced lengths only.
pub(crate) fn invert_odd(x: &Nat, m: &Nat) -> Vec<Word> {
    let ml = m.limbs();
    let mlen = ml.len();
    debug_assert!(mlen > 0);
    // m is odd on every supported path; an even anchor would make the
    // halvings below meaningless, which is the usual undefined-result
    // contract for violated preconditions, not a crash
    let size = max(x.limbs().len(), mlen);

    let mut a = vec![0 as Word; size];
    a[..x.limbs().len()].copy_from_slice(x.limbs());
    let mut b = vec![0 as Word; size];
    b[..mlen].copy_from_slice(ml);
    let mut u = vec![0 as Word; mlen];
    u[0] = 1;
    let mut v = vec![0 as Word; mlen];

    // (m + 1) / 2
    let mut mh = ml.to_vec();
    limb::shr1(&mut mh);
    limb::add_word(&mut mh, 1);

    let mut a_sub = vec![0 as Word; size];
    let mut a_half = vec![0 as Word; size];
    let mut u_sub = vec![0 as Word; mlen];
    let mut u_half = vec![0 as Word; mlen];
    let mut t = vec![0 as Word; mlen];

    // The sum of the bit lengths of a and b starts at no more than
    // 2·W·size and drops by at least one per iteration while a is
    // nonzero; once a reaches zero, b and v sit still.
    for _ in 0..(2 * WORD_BITS * size - 1) {
        let a_odd = Choice::from((a[0] & 1) as u8);
        let (_, _, a_lt) = limb::ct_cmp(&a, &b);
        let swap = a_odd & a_lt;
        limb::conditional_swap_limbs(&mut a, &mut b, swap);
        limb::conditional_swap_limbs(&mut u, &mut v, swap);

        // subtract-and-halve outcome; after the swap, an odd a is ≥ b
        a_sub.copy_from_slice(&a);
        limb::sub_assign(&mut a_sub, &b);
        limb::shr1(&mut a_sub);
        u_sub.copy_from_slice(&u);
        let borrow = limb::sub_assign(&mut u_sub, &v);
        t.copy_from_slice(&u_sub);
        limb::add_assign(&mut t, ml);
        limb::conditional_assign_limbs(&mut u_sub, &t, Choice::from(borrow as u8));
        halve_mod(&mut u_sub, &mh, &mut t);

        // plain-halve outcome
        a_half.copy_from_slice(&a);
        limb::shr1(&mut a_half);
        u_half.copy_from_slice(&u);
        halve_mod(&mut u_half, &mh, &mut t);

        limb::conditional_assign_limbs(&mut a, &a_sub, a_odd);
        limb::conditional_assign_limbs(&mut a, &a_half, !a_odd);
        limb::conditional_assign_limbs(&mut u, &u_sub, a_odd);
        limb::conditional_assign_limbs(&mut u, &u_half, !a_odd);
    }
    // here b = gcd(x, m) and v·x ≡ b (mod m)
    v
}

/// Exact bit-serial division of `t` by the odd nonzero `d`, in time
/// depending only on the two lengths.
pub(crate) fn div_double(t: &[Word], d: &[Word]) -> Vec<Word> {
    let dl = d.len();
    let mut q = vec![0 as Word; t.len()];
    let mut r = vec![0 as Word; dl + 1];
    let mut s = vec![0 as Word; dl + 1];
    let mut dd = vec![0 as Word; dl + 1];
    dd[..dl].copy_from_slice(d);
    for bit in (0..t.len() * WORD_BITS).rev() {
        let b = (t[bit / WORD_BITS] >> (bit % WORD_BITS)) & 1;
        limb::shl1(&mut r);
        r[0] |= b;
        s.copy_from_slice(&r);
        let borrow = limb::sub_assign(&mut s, &dd);
        let ge = borrow.ct_eq(&0);
        limb::conditional_assign_limbs(&mut r, &s, ge);
        q[bit / WORD_BITS] |= (ge.unwrap_u8() as Word) << (bit % WORD_BITS);
    }
    q
}

impl Nat {
    /// \\( x^{-1} \bmod m \\), for `x` coprime to `m`.
    ///
    /// When \\( \gcd(x, m) \neq 1 \\) the result is well-formed but
    /// meaningless, and no error is reported — reporting one would
    /// leak non-coprimality through the control flow.  Check with
    /// [`Nat::coprime`] beforehand when it is not known by
    /// construction.
    pub fn mod_inverse(&self, m: &Modulus) -> Nat {
        if m.is_even() {
            self.mod_inverse_even(m)
        } else {
            let xr = self.reduce(m);
            let v = invert_odd(&xr, m.as_nat());
            let mut out = Nat::from_limbs(m.bit_len(), v);
            out.set_reduced(m.id());
            out
        }
    }

    fn mod_inverse_even(&self, m: &Modulus) -> Nat {
        // reduction by an even modulus preserves the (odd) parity of x
        let xr = self.reduce(m);
        let one = Nat::from_u64(1);
        // x ≡ 1 (mod m) makes the cofactor below vanish; its inverse
        // is pinned at the end instead
        let is_one = xr.ct_eq(&one);

        // A·m ≡ 1 (mod x), roles swapped into the odd routine
        let a = Nat::from_limbs(m.bit_len(), invert_odd(m.as_nat(), &xr));
        // (A·m − 1) / x, exact and strictly below m
        let t = a.mul(m.as_nat(), None);
        let t = t.sub(&one, Some(t.announced_len()));
        let k = Nat::from_limbs(t.announced_len(), div_double(t.limbs(), xr.limbs()));
        let mut out = k.mod_neg(m);
        out.conditional_assign(&one.reduce(m), is_one);
        out
    }

    /// Whether \\( \gcd(x, y) = 1 \\), in constant time with respect
    /// to both values.
    pub fn coprime(&self, y: &Nat) -> Choice {
        let size = max(max(self.limbs().len(), y.limbs().len()), 1);
        let mut a = vec![0 as Word; size];
        a[..self.limbs().len()].copy_from_slice(self.limbs());
        let mut b = vec![0 as Word; size];
        b[..y.limbs().len()].copy_from_slice(y.limbs());

        let a_odd = Choice::from((a[0] & 1) as u8);
        let b_odd = Choice::from((b[0] & 1) as u8);
        // a shared factor of two settles it regardless of the loop
        let both_even = !a_odd & !b_odd;
        // the gcd loop needs its anchor in b to be odd
        limb::conditional_swap_limbs(&mut a, &mut b, !b_odd);

        let mut a_sub = vec![0 as Word; size];
        let mut a_half = vec![0 as Word; size];
        for _ in 0..(2 * WORD_BITS * size - 1) {
            let a_odd = Choice::from((a[0] & 1) as u8);
            let (_, _, a_lt) = limb::ct_cmp(&a, &b);
            let swap = a_odd & a_lt;
            limb::conditional_swap_limbs(&mut a, &mut b, swap);

            a_sub.copy_from_slice(&a);
            limb::sub_assign(&mut a_sub, &b);
            limb::shr1(&mut a_sub);
            a_half.copy_from_slice(&a);
            limb::shr1(&mut a_half);

            limb::conditional_assign_limbs(&mut a, &a_sub, a_odd);
            limb::conditional_assign_limbs(&mut a, &a_half, !a_odd);
        }
        // b now holds the odd part of the gcd
        let mut acc = b[0] ^ 1;
        for &w in &b[1..] {
            acc |= w;
        }
        !both_even & acc.ct_eq(&0)
    }
}
