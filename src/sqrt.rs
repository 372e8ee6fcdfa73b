// -*- mode: rust; -*-
//
// This file is part of ctnum.
// See LICENSE for licensing information.

//! Modular square roots for prime moduli.
//!
//! The modulus is public here — both the \\( p \equiv 3 \pmod 4 \\)
//! shortcut and the Tonelli–Shanks setup branch freely on its
//! structure.  The argument stays secret: every refinement decision in
//! the Tonelli–Shanks loop is a masked copy, and the loop bounds
//! follow from \\( p \\) alone.
//!
//! Feeding in a quadratic non-residue, or a composite modulus, yields
//! a well-formed but meaningless result; no error is reported.

use subtle::ConstantTimeEq;

use crate::limb::WORD_BITS;
use crate::modulus::Modulus;
use crate::nat::Nat;

impl Nat {
    /// A square root of `x` modulo the prime `p`: a value \\( z \\)
    /// with \\( z^2 \equiv x \pmod p \\), when one exists.
    ///
    /// Which of the two roots comes back is not specified.  For
    /// \\( p \equiv 3 \pmod 4 \\) this is a single exponentiation by
    /// \\( (p+1)/4 \\); other odd primes run Tonelli–Shanks.  The
    /// result is undefined when `x` is a non-residue or `p` is not
    /// prime.
    pub fn mod_sqrt(&self, p: &Modulus) -> Nat {
        if p.is_even() {
            // two is the only even prime, and mod 2 every value is its
            // own square
            return self.reduce(p);
        }
        if p.limbs()[0] & 3 == 3 {
            self.sqrt_3_mod_4(p)
        } else {
            self.sqrt_tonelli_shanks(p)
        }
    }

    fn sqrt_3_mod_4(&self, p: &Modulus) -> Nat {
        // z = x^((p+1)/4); the +1 may carry into a fresh limb
        let e = p
            .as_nat()
            .add(&Nat::from_u64(1), Some(p.bit_len() + 1))
            .rsh(2, None);
        self.exp(&e, p)
    }

    fn sqrt_tonelli_shanks(&self, p: &Modulus) -> Nat {
        // p − 1 = q·2^s with q odd
        let p_minus_1 = p.as_nat().sub(&Nat::from_u64(1), None);
        let s = {
            let limbs = p_minus_1.limbs();
            let mut s = 0;
            let mut i = 0;
            while i < limbs.len() && limbs[i] == 0 {
                s += WORD_BITS;
                i += 1;
            }
            if i < limbs.len() {
                s += limbs[i].trailing_zeros() as usize;
            }
            s
        };
        let q = p_minus_1.rsh(s, None);

        // the smallest non-residue; the search touches nothing secret
        let one = Nat::from_u64(1);
        let half = p_minus_1.rsh(1, None);
        let mut n = Nat::from_u64(2);
        while bool::from(n.exp(&half, p).ct_eq(&one)) {
            n = n.add(&Nat::from_u64(1), Some(64));
        }

        let q_plus_1_half = q.add(&one, None).rsh(1, None);
        let mut h = n.exp(&q, p);
        let mut t = self.exp(&q, p);
        let mut r = self.exp(&q_plus_1_half, p);

        // Invariant entering step i: t^(2^i) = 1 and r² = t·x.  The
        // probe b = t^(2^(i−1)) is ±1; on −1, multiply r by h and t by
        // h², masked so the probe's value stays out of the trace.
        for i in (1..s).rev() {
            let mut b = t.clone();
            for _ in 0..i - 1 {
                b = b.mod_mul(&b, p);
            }
            let advance = !b.ct_eq(&one);
            let g = h.mod_mul(&h, p);
            let r_next = r.mod_mul(&h, p);
            let t_next = t.mod_mul(&g, p);
            r.conditional_assign(&r_next, advance);
            t.conditional_assign(&t_next, advance);
            h = g;
        }
        r
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sqrt_example() {
        // 13 ≡ 1 (mod 4), so this walks the Tonelli–Shanks path
        let p = Modulus::from_u64(13);
        assert_eq!(Nat::from_u64(4).mod_sqrt(&p).to_u64(), 11);
    }

    #[test]
    fn sqrt_round_trips_over_small_primes() {
        for p0 in [3u64, 7, 11, 13, 17, 29, 97, 193, 65_537] {
            let p = Modulus::from_u64(p0);
            for v in 0..p0.min(60) {
                let sq = Nat::from_u64(v).mod_mul(&Nat::from_u64(v), &p);
                let root = sq.mod_sqrt(&p);
                let back = root.mod_mul(&root, &p);
                assert_eq!(back, sq, "p = {}, v = {}", p0, v);
            }
        }
    }

    #[test]
    fn sqrt_mod_two() {
        let p = Modulus::from_u64(2);
        assert_eq!(Nat::from_u64(7).mod_sqrt(&p).to_u64(), 1);
        assert_eq!(Nat::from_u64(6).mod_sqrt(&p).to_u64(), 0);
    }

    #[test]
    fn sqrt_of_zero_is_zero() {
        for p0 in [7u64, 13, 65_537] {
            let p = Modulus::from_u64(p0);
            assert_eq!(Nat::new().mod_sqrt(&p).to_u64(), 0);
        }
    }

    #[test]
    fn sqrt_three_mod_four_shortcut() {
        // p ≡ 3 (mod 4): x^((p+1)/4) with x = 2², p = 1000003
        let p = Modulus::from_u64(1_000_003);
        let root = Nat::from_u64(4).mod_sqrt(&p);
        let back = root.mod_mul(&root, &p);
        assert_eq!(back.to_u64(), 4);
    }

    #[test]
    fn sqrt_multi_limb_prime() {
        // 2^89 − 1 ≡ 3 (mod 4)
        let p = Modulus::new(&Nat::from_hex("1FFFFFFFFFFFFFFFFFFFFFF").unwrap());
        let x = Nat::from_bytes(&[0xC4, 0xFE, 0x01, 0x88, 0x33, 0x21, 0x07, 0x9A]);
        let sq = x.mod_mul(&x, &p);
        let root = sq.mod_sqrt(&p);
        assert_eq!(root.mod_mul(&root, &p), sq);
    }
}
