// -*- mode: rust; -*-
//
// This file is part of ctnum.
// See LICENSE for licensing information.

//! Reduction targets, and the division engine built around them.
//!
//! A [`Modulus`] wraps a nonzero [`Nat`] together with three values
//! precomputed at construction time:
//!
//! * `leading`, the number of leading zero bits in the top limb, which
//!   normalizes the divisor for quotient estimation;
//! * `m0inv`, the negated inverse of the low limb modulo
//!   \\( 2^W \\), which drives Montgomery multiplication (odd moduli
//!   only);
//! * `even`, the parity flag that picks between the Montgomery and
//!   plain code paths.
//!
//! Construction trims the wrapped number to its true length: the bit
//! length of a modulus is public by contract, in the same way a
//! protocol's group order is public.  Everything *about* the modulus
//! may leak; the values reduced by it may not.

use alloc::vec;
use alloc::vec::Vec;
use core::cmp::min;
use core::sync::atomic::{AtomicU64, Ordering};

use subtle::{ConditionallySelectable, ConstantTimeEq, ConstantTimeGreater};

#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

use crate::errors::DecodeError;
use crate::limb;
use crate::limb::{Word, WORD_BITS};
use crate::nat::{limb_count, Nat};

/// Source of unique modulus ids, used to track reduction claims on
/// [`Nat`]s.  Ids are public metadata and are never reused, so a stale
/// claim can never alias a newer modulus.
static MODULUS_IDS: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    MODULUS_IDS.fetch_add(1, Ordering::Relaxed)
}

/// A natural number \\( m \geq 1 \\) prepared for use as a reduction
/// target.
///
/// Immutable after construction, and freely shareable across threads.
/// Operations taking a `Modulus` are constant-time with respect to the
/// values being reduced, but the modulus itself — its bit length and
/// parity — is treated as public.
#[derive(Clone, Debug)]
pub struct Modulus {
    nat: Nat,
    leading: usize,
    m0inv: Word,
    even: bool,
    id: u64,
}

/// \\( -m_0^{-1} \bmod 2^W \\) for odd \\( m_0 \\), by five Newton
/// iterations \\( y \gets y (2 - m_0 y) \\) starting from
/// \\( y = m_0 \\), which doubles the correct low bits each round.
fn negated_inverse(m0: Word) -> Word {
    let mut y = m0;
    for _ in 0..5 {
        y = y.wrapping_mul((2 as Word).wrapping_sub(m0.wrapping_mul(y)));
    }
    y.wrapping_neg()
}

impl Modulus {
    /// Wrap `n` as a modulus, precomputing the reduction constants.
    ///
    /// The value is trimmed to its true bit length, which this
    /// constructor therefore leaks — that is part of the contract.
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero.  An empty modulus is a programmer error,
    /// not a runtime condition; the wire decoders return
    /// [`DecodeError::InvalidEncoding`] instead.
    pub fn new(n: &Nat) -> Modulus {
        assert!(!bool::from(n.is_zero()), "modulus must be nonzero");
        let nat = n.resize(n.true_len());
        let top = *nat.limbs().last().expect("nonzero modulus has limbs");
        let leading = limb::ct_leading_zeros(top);
        let even = nat.limbs()[0] & 1 == 0;
        let m0inv = if even { 0 } else { negated_inverse(nat.limbs()[0]) };
        Modulus {
            nat,
            leading,
            m0inv,
            even,
            id: next_id(),
        }
    }

    /// Construct from a `u64`.  Panics on zero, like [`Modulus::new`].
    pub fn from_u64(x: u64) -> Modulus {
        Modulus::new(&Nat::from_u64(x))
    }

    /// Decode from big-endian bytes, rejecting the value zero.
    pub fn from_bytes(buf: &[u8]) -> Result<Modulus, DecodeError> {
        let n = Nat::from_bytes(buf);
        if bool::from(n.is_zero()) {
            return Err(DecodeError::InvalidEncoding);
        }
        Ok(Modulus::new(&n))
    }

    /// Decode from an upper-case hex string, rejecting the value zero.
    pub fn from_hex(s: &str) -> Result<Modulus, DecodeError> {
        let n = Nat::from_hex(s)?;
        if bool::from(n.is_zero()) {
            return Err(DecodeError::InvalidEncoding);
        }
        Ok(Modulus::new(&n))
    }

    /// The big-endian byte encoding, sized to the true bit length
    /// rounded up to whole bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.nat.to_bytes()
    }

    /// The true bit length of the modulus.  Public by contract.
    pub fn bit_len(&self) -> usize {
        self.nat.limbs().len() * WORD_BITS - self.leading
    }

    /// Whether the modulus is even.  Public by contract; `exp` and
    /// `mod_inverse` dispatch on it.
    pub fn is_even(&self) -> bool {
        self.even
    }

    /// A read-only view of the wrapped number.
    pub fn as_nat(&self) -> &Nat {
        &self.nat
    }

    /// The number of limbs in the trimmed modulus.
    pub(crate) fn size(&self) -> usize {
        self.nat.limbs().len()
    }

    pub(crate) fn limbs(&self) -> &[Word] {
        self.nat.limbs()
    }

    pub(crate) fn leading(&self) -> usize {
        self.leading
    }

    pub(crate) fn m0inv(&self) -> Word {
        self.m0inv
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }
}

impl PartialEq for Modulus {
    /// Value equality, in constant time with respect to the values
    /// (their lengths are public anyway).
    fn eq(&self, other: &Modulus) -> bool {
        self.nat == other.nat
    }
}

impl Eq for Modulus {}

#[cfg(feature = "zeroize")]
impl Zeroize for Modulus {
    fn zeroize(&mut self) {
        self.nat.zeroize();
        self.leading = 0;
        self.m0inv = 0;
        self.even = false;
    }
}

/// One step of schoolbook division: replace `z`, a value strictly less
/// than `m`, with \\( (z \cdot 2^W + x) \bmod m \\), returning the
/// quotient word.
///
/// The quotient estimate divides the top two normalized words of the
/// shifted value by the top normalized word of `m` with [`limb::div_word`]
/// and is then off by at most one in either direction; both corrections
/// are applied as masked copies.
pub(crate) fn shift_add_in(z: &mut [Word], scratch: &mut [Word], x: Word, m: &Modulus) -> Word {
    let size = m.size();
    debug_assert_eq!(z.len(), size);
    debug_assert_eq!(scratch.len(), size);
    if size == 1 {
        let (q, r) = limb::div_word(z[0], x, m.limbs()[0]);
        z[0] = r;
        return q;
    }

    let ml = m.limbs();
    let l = m.leading();
    // Top two words of (z·2^W + x) and top word of m, all shifted left
    // by `leading` so the divisor's high bit is set.
    let hi = z[size - 1];
    let a1 = (z[size - 1] << l) | limb::wshr(z[size - 2], WORD_BITS - l);
    let a0_spill = if size > 2 { z[size - 3] } else { x };
    let a0 = (z[size - 2] << l) | limb::wshr(a0_spill, WORD_BITS - l);
    let b0 = (ml[size - 1] << l) | limb::wshr(ml[size - 2], WORD_BITS - l);

    let (raw_q, _) = limb::div_word(a1, a0, b0);
    // a1 == b0 would need a quotient of 2^W, which saturates to the
    // largest word; a raw estimate of zero stays zero; anything else
    // backs off by one.  The result is within one of the truth.
    let mut q = Word::conditional_select(&raw_q.wrapping_sub(1), &0, raw_q.ct_eq(&0));
    q = Word::conditional_select(&q, &Word::MAX, a1.ct_eq(&b0));

    // z := (z·2^W + x) - q·m, keeping the stashed top word out of band
    for i in (1..size).rev() {
        z[i] = z[i - 1];
    }
    z[0] = x;
    let c = limb::mul_sub_word(z, ml, q);

    // Estimate one too large: the borrow ate past the stashed word.
    let over = c.ct_gt(&hi);
    scratch.copy_from_slice(z);
    limb::add_assign(scratch, ml);
    limb::conditional_assign_limbs(z, scratch, over);
    q = q.wrapping_sub(Word::conditional_select(&0, &1, over));

    // Estimate one too small: a full word of value remains above z, or
    // z itself still reaches m.
    let spill = Word::conditional_select(&hi.wrapping_sub(c), &0, over);
    scratch.copy_from_slice(z);
    let borrow = limb::sub_assign(scratch, ml);
    let geq = spill.ct_eq(&1) | borrow.ct_eq(&0);
    limb::conditional_assign_limbs(z, scratch, geq);
    q = q.wrapping_add(Word::conditional_select(&0, &1, geq));

    q
}

impl Nat {
    /// \\( x \bmod m \\), announced at the modulus' bit length.
    ///
    /// Runs one [`shift_add_in`] step per limb of `x` beyond the
    /// directly injected top limbs; when `x` already carries the
    /// reduction claim for `m`, the whole thing collapses to a copy
    /// (the claim is public call-graph metadata, so the shortcut leaks
    /// nothing about the value).
    pub fn reduce(&self, m: &Modulus) -> Nat {
        let size = m.size();
        let mut z = vec![0 as Word; size];

        if self.reduced_claim() == Some(m.id()) {
            for (i, limb) in z.iter_mut().enumerate() {
                *limb = self.limb(i);
            }
            let mut out = Nat::from_limbs(m.bit_len(), z);
            out.set_reduced(m.id());
            return out;
        }

        let mut scratch = vec![0 as Word; size];
        let xl = self.limbs();
        // The top size−1 limbs of x start the remainder: they are less
        // than m by construction, since m's top limb is nonzero.
        let inject = min(xl.len(), size - 1);
        for i in 0..inject {
            z[i] = xl[xl.len() - inject + i];
        }
        for i in (0..xl.len() - inject).rev() {
            shift_add_in(&mut z, &mut scratch, xl[i], m);
        }
        let mut out = Nat::from_limbs(m.bit_len(), z);
        out.set_reduced(m.id());
        out
    }

    /// \\( \lfloor x / m \rfloor \bmod 2^{cap} \\).
    ///
    /// Runs the same per-limb iteration as [`Nat::reduce`], recording
    /// the emitted quotient words.  With `cap == None` the quotient is
    /// announced at `announced - m.bit_len() + 2` bits (saturating),
    /// which always holds the full quotient.
    pub fn div(&self, m: &Modulus, cap: Option<usize>) -> Nat {
        let cap = cap.unwrap_or_else(|| (self.announced_len() + 2).saturating_sub(m.bit_len()));
        let size = m.size();
        let mut z = vec![0 as Word; size];
        let mut scratch = vec![0 as Word; size];
        let xl = self.limbs();
        let inject = min(xl.len(), size - 1);
        for i in 0..inject {
            z[i] = xl[xl.len() - inject + i];
        }
        let steps = xl.len() - inject;
        let mut quo = vec![0 as Word; steps];
        for i in (0..steps).rev() {
            quo[i] = shift_add_in(&mut z, &mut scratch, xl[i], m);
        }
        quo.resize(limb_count(cap), 0);
        Nat::from_limbs(cap, quo)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn construction_trims_and_precomputes() {
        let m = Modulus::new(&Nat::from_u64(13).resize(4096));
        assert_eq!(m.bit_len(), 4);
        assert_eq!(m.as_nat().limbs().len(), 1);
        assert!(!m.is_even());
        // m0inv·m0 ≡ −1 (mod 2^W)
        assert_eq!(m.m0inv().wrapping_mul(13), Word::MAX);
    }

    #[test]
    fn even_flag_is_set() {
        assert!(Modulus::from_u64(10).is_even());
        assert!(!Modulus::from_u64(9).is_even());
    }

    #[test]
    #[should_panic(expected = "modulus must be nonzero")]
    fn zero_modulus_panics() {
        Modulus::new(&Nat::from_u64(0));
    }

    #[test]
    fn zero_modulus_bytes_reports() {
        assert_eq!(
            Modulus::from_bytes(&[0, 0, 0]),
            Err(DecodeError::InvalidEncoding)
        );
        assert!(Modulus::from_bytes(&[0, 1, 0]).is_ok());
    }

    #[test]
    fn bytes_round_trip_at_true_width() {
        let m = Modulus::from_bytes(&[0x0F, 0xFE]).unwrap();
        assert_eq!(m.bit_len(), 12);
        assert_eq!(m.to_bytes(), alloc::vec![0x0F, 0xFE]);
    }

    #[test]
    fn reduce_small_values() {
        let m = Modulus::from_u64(13);
        assert_eq!(Nat::from_u64(40).reduce(&m).to_u64(), 1);
        assert_eq!(Nat::from_u64(13).reduce(&m).to_u64(), 0);
        assert_eq!(Nat::from_u64(12).reduce(&m).to_u64(), 12);
        assert_eq!(Nat::new().reduce(&m).to_u64(), 0);
    }

    #[test]
    fn reduce_is_idempotent() {
        let m = Modulus::from_u64(0xFFFF_FFFB);
        let x = Nat::from_bytes(&[0x37; 40]);
        let once = x.reduce(&m);
        let twice = once.reduce(&m);
        assert_eq!(once, twice);
        assert_eq!(once.announced_len(), m.bit_len());
    }

    #[test]
    fn reduce_multi_limb_modulus() {
        // m = 2^W + 1, x = (2^W + 1)·3 + 7
        let m = Modulus::new(&Nat::from_limbs(2 * WORD_BITS, alloc::vec![1, 1]));
        let x = Nat::from_limbs(2 * WORD_BITS, alloc::vec![10, 3]);
        assert_eq!(x.reduce(&m).to_u64(), 7);
        assert_eq!(x.div(&m, None).to_u64(), 3);
    }

    #[test]
    fn div_emits_the_quotient_limbs() {
        // (64·W² + 64·W) / (W + 1) = 64·W
        let m = Modulus::new(&Nat::from_limbs(2 * WORD_BITS, alloc::vec![1, 1]));
        let x = Nat::from_limbs(3 * WORD_BITS, alloc::vec![0, 64, 64]);
        let q = x.div(&m, Some(2 * WORD_BITS));
        assert_eq!(q.limbs(), &[0, 64]);
    }

    #[test]
    fn multiply_then_divide_returns_the_start() {
        let m = Modulus::from_bytes(&[0xB5, 0x03, 0x11, 0x29]).unwrap();
        let x = Nat::from_bytes(&[0x01, 0xC7, 0x77, 0x13, 0x55]);
        let q = x.mul(m.as_nat(), None).div(&m, Some(x.announced_len()));
        assert_eq!(q, x);
        // and with m − 1 added on top, the quotient is unchanged
        let m1 = m.as_nat().sub(&Nat::from_u64(1), None);
        let q = x
            .mul(m.as_nat(), None)
            .add(&m1, None)
            .div(&m, Some(x.announced_len()));
        assert_eq!(q, x);
    }

    #[test]
    fn reduction_claim_shortcut_matches_full_reduction() {
        let m = Modulus::from_u64(1_000_003);
        let x = Nat::from_bytes(&[0x99; 32]);
        let r = x.reduce(&m);
        // r carries the claim; reducing it again must be a pure copy
        assert_eq!(r.reduce(&m), r);
    }

    #[test]
    fn negated_inverse_fixed_points() {
        assert_eq!(negated_inverse(1), Word::MAX);
        for m0 in [3 as Word, 5, 7, 0xFFFF_FFFB, 0x1000_0001] {
            assert_eq!(negated_inverse(m0).wrapping_mul(m0), Word::MAX);
        }
    }
}
