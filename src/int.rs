// -*- mode: rust; -*-
//
// This file is part of ctnum.
// See LICENSE for licensing information.

//! Signed integers over [`Nat`].
//!
//! An [`Int`] is a magnitude plus a sign held in a [`Choice`], so sign
//! handling goes through the same masked selects as everything else.
//! The representation is redundant at zero: `+0` and `-0` are distinct
//! bit patterns that compare equal.  Operations that can produce zero
//! canonicalize the sign back to non-negative, but decoded values may
//! arrive as `-0` and are accepted.
//!
//! The signed arithmetic computes every candidate outcome and selects:
//! an addition always performs the sum of magnitudes *and* both
//! differences, then keeps the right one based on the signs and the
//! magnitude comparison.
//!
//! The symmetric-residue helpers ([`Int::from_mod_symmetric`],
//! [`Int::check_in_range`], [`Int::modulo`]) move between
//! \\( [0, m) \\) and the balanced window
//! \\( [-(m-1)/2, (m-1)/2] \\) that signature protocols work in
//! (stated for odd \\( m \\); an even modulus shifts the window by a
//! half).

use alloc::vec;
use alloc::vec::Vec;
use core::cmp::max;
use core::fmt;

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

use crate::errors::DecodeError;
use crate::modulus::Modulus;
use crate::nat::Nat;

/// A signed integer of announced size, stored as sign and magnitude.
#[derive(Clone)]
pub struct Int {
    /// Set when the value is negative; side-channel-safe storage.
    negative: Choice,
    /// The absolute value; its announced length is the `Int`'s.
    abs: Nat,
}

impl Int {
    /// The number zero, with an announced length of zero bits.
    pub fn new() -> Int {
        Int {
            negative: Choice::from(0),
            abs: Nat::new(),
        }
    }

    /// Construct a non-negative value from big-endian bytes.
    pub fn from_bytes(buf: &[u8]) -> Int {
        Int {
            negative: Choice::from(0),
            abs: Nat::from_bytes(buf),
        }
    }

    /// Construct a non-negative value from a `u64`.
    pub fn from_u64(x: u64) -> Int {
        Int {
            negative: Choice::from(0),
            abs: Nat::from_u64(x),
        }
    }

    /// Wrap a natural number as a non-negative `Int`.
    pub fn from_nat(n: &Nat) -> Int {
        Int {
            negative: Choice::from(0),
            abs: n.clone(),
        }
    }

    /// The absolute value.
    pub fn abs(&self) -> &Nat {
        &self.abs
    }

    /// Whether this value is negative.  `-0` reports negative here;
    /// use [`Int::eq`] for value comparisons.
    pub fn is_negative(&self) -> Choice {
        self.negative
    }

    /// The announced bit length of the magnitude.
    pub fn announced_len(&self) -> usize {
        self.abs.announced_len()
    }

    /// Adjust the announced length of the magnitude to `cap` bits.
    pub fn resize(&self, cap: usize) -> Int {
        Int {
            negative: self.negative,
            abs: self.abs.resize(cap),
        }
    }

    /// Conditionally negate: flips the sign iff `yes` is set.
    pub fn neg(&self, yes: Choice) -> Int {
        Int {
            negative: self.negative ^ yes,
            abs: self.abs.clone(),
        }
    }

    /// Value equality: magnitudes match, and the signs match or the
    /// value is zero.
    pub fn eq(&self, other: &Int) -> Choice {
        let abs_eq = self.abs.ct_eq(&other.abs);
        let both_zero = self.abs.is_zero() & other.abs.is_zero();
        let sign_eq = !(self.negative ^ other.negative);
        abs_eq & (both_zero | sign_eq)
    }

    /// The mathematical signed sum, with the magnitude truncated to
    /// `cap` bits (`None`: one bit more than the wider operand).
    ///
    /// Both the sum and the differences of the magnitudes are
    /// computed; signs and the magnitude ordering pick the result.
    pub fn add(&self, y: &Int, cap: Option<usize>) -> Int {
        let cap = cap.unwrap_or(max(self.announced_len(), y.announced_len()) + 1);
        let sum = self.abs.add(&y.abs, Some(cap));
        let (_, _, lt) = self.abs.compare(&y.abs);
        let mut diff = self.abs.sub(&y.abs, Some(cap));
        let flipped = y.abs.sub(&self.abs, Some(cap));
        diff.conditional_assign(&flipped, lt);

        let same_sign = !(self.negative ^ y.negative);
        let mut abs = diff;
        abs.conditional_assign(&sum, same_sign);
        // opposite signs: the larger magnitude's sign survives
        let diff_sign = Choice::conditional_select(&self.negative, &y.negative, lt);
        let mut negative = Choice::conditional_select(&diff_sign, &self.negative, same_sign);
        negative &= !abs.is_zero();
        Int { negative, abs }
    }

    /// The signed product, with the magnitude truncated to `cap` bits
    /// (`None`: the sum of the announced lengths).
    pub fn mul(&self, y: &Int, cap: Option<usize>) -> Int {
        let abs = self.abs.mul(&y.abs, cap);
        let mut negative = self.negative ^ y.negative;
        negative &= !abs.is_zero();
        Int { negative, abs }
    }

    /// The representative of this value in \\( [0, m) \\).
    pub fn modulo(&self, m: &Modulus) -> Nat {
        let r = self.abs.reduce(m);
        let flipped = r.mod_neg(m);
        let mut out = r;
        out.conditional_assign(&flipped, self.negative);
        out
    }

    /// Lift `x` (reduced mod `m`) into the symmetric residue window:
    /// representatives above \\( \lfloor m/2 \rfloor \\) become
    /// negative.
    pub fn from_mod_symmetric(x: &Nat, m: &Modulus) -> Int {
        let xr = x.reduce(m);
        let half = m.as_nat().rsh(1, None);
        let (gt, _, _) = xr.compare(&half);
        let flipped = xr.mod_neg(m);
        let mut abs = xr;
        abs.conditional_assign(&flipped, gt);
        let abs = abs.resize(m.bit_len().saturating_sub(1));
        Int {
            negative: gt & !abs.is_zero(),
            abs,
        }
    }

    /// Whether the magnitude fits the symmetric window for `m`, i.e.
    /// \\( |z| \leq \lfloor m/2 \rfloor \\).
    pub fn check_in_range(&self, m: &Modulus) -> Choice {
        let half = m.as_nat().rsh(1, None);
        let (gt, _, _) = self.abs.compare(&half);
        !gt
    }

    /// Encode as a sign byte (bit 0 only) followed by the big-endian
    /// magnitude.
    pub fn marshal_binary(&self) -> Vec<u8> {
        let abs = self.abs.to_bytes();
        let mut out = vec![0u8; 1 + abs.len()];
        out[0] = self.negative.unwrap_u8();
        out[1..].copy_from_slice(&abs);
        out
    }

    /// Decode the [`Int::marshal_binary`] format.  The empty buffer is
    /// rejected; high bits of the sign byte are ignored.
    pub fn unmarshal_binary(buf: &[u8]) -> Result<Int, DecodeError> {
        if buf.is_empty() {
            return Err(DecodeError::InvalidEncoding);
        }
        Ok(Int {
            negative: Choice::from(buf[0] & 1),
            abs: Nat::from_bytes(&buf[1..]),
        })
    }
}

impl Nat {
    /// \\( x^i \bmod m \\) for a signed exponent: the magnitude
    /// exponentiation, inverted mod `m` when `i` is negative.
    ///
    /// A negative exponent requires `x` to be a unit mod `m`, exactly
    /// as [`Nat::mod_inverse`] does.
    pub fn exp_i(&self, i: &Int, m: &Modulus) -> Nat {
        let pow = self.exp(i.abs(), m);
        let inv = pow.mod_inverse(m);
        let mut out = pow;
        out.conditional_assign(&inv, i.is_negative());
        out
    }
}

impl Default for Int {
    fn default() -> Int {
        Int::new()
    }
}

impl PartialEq for Int {
    fn eq(&self, other: &Int) -> bool {
        Int::eq(self, other).into()
    }
}

impl Eq for Int {}

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if bool::from(self.negative & !self.abs.is_zero()) {
            write!(f, "-{}", self.abs)
        } else {
            write!(f, "{}", self.abs)
        }
    }
}

impl fmt::Debug for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Int({}, {} bits)", self, self.announced_len())
    }
}

#[cfg(feature = "zeroize")]
impl Zeroize for Int {
    fn zeroize(&mut self) {
        self.negative = Choice::from(0);
        self.abs.zeroize();
    }
}

#[cfg(feature = "num-bigint")]
impl Int {
    /// Construct from a [`num_bigint::BigInt`], with the magnitude
    /// truncated to `cap` announced bits.
    pub fn from_bigint(x: &num_bigint::BigInt, cap: usize) -> Int {
        let abs = Nat::from_biguint(x.magnitude(), cap);
        let negative =
            Choice::from((x.sign() == num_bigint::Sign::Minus) as u8) & !abs.is_zero();
        Int { negative, abs }
    }

    /// Convert into a [`num_bigint::BigInt`].
    pub fn to_bigint(&self) -> num_bigint::BigInt {
        let sign = if bool::from(self.negative & !self.abs.is_zero()) {
            num_bigint::Sign::Minus
        } else {
            num_bigint::Sign::Plus
        };
        num_bigint::BigInt::from_biguint(sign, self.abs.to_biguint())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Int {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.marshal_binary())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Int {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Int, D::Error> {
        struct IntVisitor;

        impl<'de> serde::de::Visitor<'de> for IntVisitor {
            type Value = Int;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a sign byte followed by a big-endian magnitude")
            }

            fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<Int, E> {
                Int::unmarshal_binary(v).map_err(E::custom)
            }

            fn visit_seq<A: serde::de::SeqAccess<'de>>(self, mut seq: A) -> Result<Int, A::Error> {
                let mut bytes = Vec::new();
                while let Some(b) = seq.next_element::<u8>()? {
                    bytes.push(b);
                }
                Int::unmarshal_binary(&bytes).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_bytes(IntVisitor)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn int(v: i64) -> Int {
        Int::from_u64(v.unsigned_abs()).neg(Choice::from((v < 0) as u8))
    }

    #[test]
    fn wire_format_of_minus_seven() {
        let x = int(-7).resize(8);
        assert_eq!(x.marshal_binary(), alloc::vec![0x01, 0x07]);
        let back = Int::unmarshal_binary(&[0x01, 0x07]).unwrap();
        assert_eq!(back.is_negative().unwrap_u8(), 1);
        assert_eq!(back.abs().to_u64(), 7);
        assert_eq!(back, x);
    }

    #[test]
    fn unmarshal_rejects_the_empty_buffer() {
        assert_eq!(Int::unmarshal_binary(&[]), Err(DecodeError::InvalidEncoding));
        // a lone sign byte is fine: it encodes zero
        assert_eq!(Int::unmarshal_binary(&[0]).unwrap(), Int::new());
    }

    #[test]
    fn marshal_round_trip() {
        for v in [-300_000i64, -7, -1, 0, 1, 255, 300_000] {
            let x = int(v);
            let back = Int::unmarshal_binary(&x.marshal_binary()).unwrap();
            assert_eq!(back, x, "v = {}", v);
        }
    }

    #[test]
    fn plus_and_minus_zero_are_equal() {
        let pos = Int::from_u64(0);
        let neg = pos.neg(Choice::from(1));
        assert_eq!(pos, neg);
        assert_eq!(neg.is_negative().unwrap_u8(), 1);
    }

    #[test]
    fn signed_addition_cases() {
        let check = |a: i64, b: i64| {
            let got = int(a).add(&int(b), None);
            assert_eq!(got, int(a + b), "{} + {}", a, b);
        };
        check(5, 3);
        check(-5, 3);
        check(5, -3);
        check(3, -5);
        check(-3, -5);
        check(7, -7);
        check(0, -3);
        check(0, 0);
    }

    #[test]
    fn signed_multiplication_cases() {
        let check = |a: i64, b: i64| {
            let got = int(a).mul(&int(b), None);
            assert_eq!(got, int(a * b), "{} * {}", a, b);
        };
        check(4, 5);
        check(-4, 5);
        check(4, -5);
        check(-4, -5);
        check(-4, 0);
    }

    #[test]
    fn modulo_folds_the_sign_in() {
        let m = Modulus::from_u64(13);
        assert_eq!(int(-1).modulo(&m).to_u64(), 12);
        assert_eq!(int(-13).modulo(&m).to_u64(), 0);
        assert_eq!(int(27).modulo(&m).to_u64(), 1);
        assert_eq!(int(-27).modulo(&m).to_u64(), 12);
    }

    #[test]
    fn symmetric_lift_round_trips() {
        let m = Modulus::from_u64(13);
        for v in 0..13u64 {
            let x = Nat::from_u64(v);
            let lifted = Int::from_mod_symmetric(&x, &m);
            assert!(bool::from(lifted.check_in_range(&m)));
            assert_eq!(lifted.modulo(&m).to_u64(), v);
            // the window splits at 6 = (13 − 1)/2
            assert_eq!(lifted.is_negative().unwrap_u8(), (v > 6) as u8);
        }
    }

    #[test]
    fn check_in_range_rejects_wide_values() {
        let m = Modulus::from_u64(13);
        assert!(!bool::from(int(7).check_in_range(&m)));
        assert!(bool::from(int(-6).check_in_range(&m)));
    }

    #[test]
    fn signed_exponents_invert() {
        let m = Modulus::from_u64(13);
        let x = Nat::from_u64(3);
        assert_eq!(x.exp_i(&int(4), &m).to_u64(), 3);
        // 3^(−1) ≡ 9, since 3·9 = 27 ≡ 1
        assert_eq!(x.exp_i(&int(-1), &m).to_u64(), 9);
        assert_eq!(x.exp_i(&int(-4), &m).to_u64(), 9);
    }

    #[test]
    fn conditional_negation_composes() {
        let x = int(5);
        let y = x.neg(Choice::from(1));
        assert_eq!(y, int(-5));
        assert_eq!(y.neg(Choice::from(1)), x);
        assert_eq!(y.neg(Choice::from(0)), y);
    }
}
