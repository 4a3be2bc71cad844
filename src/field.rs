//! Base field of secp256k1. p = 2^256 - 2^32 - 977
//!
//! This implementation uses Montgomery form for efficient modular arithmetic.
//! The field element is represented as [u64; 4] in little-endian order.

use core::fmt::{self, Debug, Display, Formatter};
use core::hash::{Hash, Hasher};
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use num_bigint::BigUint;
use rand::distr::{Distribution, StandardUniform};
use rand::Rng;
use serde::{Deserialize, Serialize};
use subtle::{Choice, ConditionallySelectable};

/// Base field element for secp256k1, the coordinate field of curve points.
/// Represented in Montgomery form with [u64; 4]
#[derive(Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct FieldElement {
    /// Montgomery form: value * R mod p, where R = 2^256
    limbs: [u64; 4],
}

// Field modulus: p = 0xfffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f
const MODULUS: [u64; 4] = [
    0xfffffffefffffc2f,
    0xffffffffffffffff,
    0xffffffffffffffff,
    0xffffffffffffffff,
];

// R = 2^256 mod p (Montgomery parameter)
const R: [u64; 4] = [0x00000001000003d1, 0, 0, 0];

// R^2 = 2^512 mod p (for Montgomery conversion)
const R2: [u64; 4] = [0x000007a2000e90a1, 0x0000000000000001, 0, 0];

// -p^{-1} mod 2^64 (Montgomery parameter mu)
const MU: u64 = 0xd838091dd2253531;

impl FieldElement {
    /// Zero element (in Montgomery form)
    pub const ZERO: Self = FieldElement {
        limbs: [0, 0, 0, 0],
    };

    /// One element (in Montgomery form: R mod p)
    pub const ONE: Self = FieldElement { limbs: R };

    /// Create a new field element from a u64 value
    #[inline]
    pub fn from_canonical_u64(val: u64) -> Self {
        // Convert to Montgomery form: val * R^2 * R^{-1} = val * R
        let result = FieldElement {
            limbs: [val, 0, 0, 0],
        };
        montgomery_mul(result, FieldElement { limbs: R2 })
    }

    /// Construct from limbs that are already in Montgomery form.
    /// Used for compile-time curve constants.
    #[inline]
    pub(crate) const fn from_montgomery(limbs: [u64; 4]) -> Self {
        FieldElement { limbs }
    }

    /// Convert from Montgomery form to canonical form
    #[inline]
    pub fn to_canonical_limbs(&self) -> [u64; 4] {
        // Multiply by 1 to get out of Montgomery form
        let one = FieldElement {
            limbs: [1, 0, 0, 0],
        };
        montgomery_mul(*self, one).limbs
    }

    #[inline]
    pub(crate) fn from_canonical_limbs(limbs: [u64; 4]) -> Self {
        debug_assert!(is_canonical(limbs));
        montgomery_mul(FieldElement { limbs }, FieldElement { limbs: R2 })
    }
}

/// Helper: Add two 256-bit numbers mod p
#[inline]
const fn add_mod(a: [u64; 4], b: [u64; 4]) -> [u64; 4] {
    let (r0, carry) = a[0].overflowing_add(b[0]);
    let (r1, carry) = carrying_add(a[1], b[1], carry);
    let (r2, carry) = carrying_add(a[2], b[2], carry);
    let (r3, carry) = carrying_add(a[3], b[3], carry);

    // Subtract modulus if we overflowed or result >= p
    let (s0, borrow) = r0.overflowing_sub(MODULUS[0]);
    let (s1, borrow) = borrowing_sub(r1, MODULUS[1], borrow);
    let (s2, borrow) = borrowing_sub(r2, MODULUS[2], borrow);
    let (s3, borrow) = borrowing_sub(r3, MODULUS[3], borrow);

    // If no borrow and no carry, or if carry, we need to subtract
    if carry || !borrow {
        [s0, s1, s2, s3]
    } else {
        [r0, r1, r2, r3]
    }
}

/// Helper: Subtract two 256-bit numbers mod p
#[inline]
const fn sub_mod(a: [u64; 4], b: [u64; 4]) -> [u64; 4] {
    let (r0, borrow) = a[0].overflowing_sub(b[0]);
    let (r1, borrow) = borrowing_sub(a[1], b[1], borrow);
    let (r2, borrow) = borrowing_sub(a[2], b[2], borrow);
    let (r3, borrow) = borrowing_sub(a[3], b[3], borrow);

    // Add modulus if we underflowed
    if borrow {
        let (r0, carry) = r0.overflowing_add(MODULUS[0]);
        let (r1, carry) = carrying_add(r1, MODULUS[1], carry);
        let (r2, carry) = carrying_add(r2, MODULUS[2], carry);
        let (r3, _) = carrying_add(r3, MODULUS[3], carry);
        [r0, r1, r2, r3]
    } else {
        [r0, r1, r2, r3]
    }
}

/// Helper: Negate a 256-bit number mod p
#[inline]
const fn neg_mod(a: [u64; 4]) -> [u64; 4] {
    if a[0] == 0 && a[1] == 0 && a[2] == 0 && a[3] == 0 {
        return [0, 0, 0, 0];
    }
    sub_mod(MODULUS, a)
}

/// Helper: Plain 256-bit subtraction, discarding the final borrow
#[inline]
const fn sub_limbs(a: [u64; 4], b: [u64; 4]) -> [u64; 4] {
    let (r0, borrow) = a[0].overflowing_sub(b[0]);
    let (r1, borrow) = borrowing_sub(a[1], b[1], borrow);
    let (r2, borrow) = borrowing_sub(a[2], b[2], borrow);
    let (r3, _) = borrowing_sub(a[3], b[3], borrow);
    [r0, r1, r2, r3]
}

#[inline]
const fn is_canonical(limbs: [u64; 4]) -> bool {
    let (_, borrow) = limbs[0].overflowing_sub(MODULUS[0]);
    let (_, borrow) = borrowing_sub(limbs[1], MODULUS[1], borrow);
    let (_, borrow) = borrowing_sub(limbs[2], MODULUS[2], borrow);
    let (_, borrow) = borrowing_sub(limbs[3], MODULUS[3], borrow);
    borrow
}

/// Helper: Carrying addition
#[inline]
const fn carrying_add(a: u64, b: u64, carry: bool) -> (u64, bool) {
    let (sum, overflow1) = a.overflowing_add(b);
    let (sum, overflow2) = sum.overflowing_add(carry as u64);
    (sum, overflow1 || overflow2)
}

/// Helper: Borrowing subtraction
#[inline]
const fn borrowing_sub(a: u64, b: u64, borrow: bool) -> (u64, bool) {
    let (diff, overflow1) = a.overflowing_sub(b);
    let (diff, overflow2) = diff.overflowing_sub(borrow as u64);
    (diff, overflow1 || overflow2)
}

/// Montgomery multiplication: (a * b * R^{-1}) mod p
#[inline]
fn montgomery_mul(a: FieldElement, b: FieldElement) -> FieldElement {
    // Compute a * b
    let mut t = [0u64; 8];

    for i in 0..4 {
        let mut carry = 0u128;
        for j in 0..4 {
            let product = (a.limbs[i] as u128) * (b.limbs[j] as u128) + (t[i + j] as u128) + carry;
            t[i + j] = product as u64;
            carry = product >> 64;
        }
        t[i + 4] = carry as u64;
    }

    // Montgomery reduction. p is within 2^32 of 2^256, so the reduced value
    // can reach 257 bits; the carry above t[7] must be kept.
    let mut extra = 0u64;
    for i in 0..4 {
        let k = t[i].wrapping_mul(MU);
        let mut carry = 0u128;

        for j in 0..4 {
            let product = (k as u128) * (MODULUS[j] as u128) + (t[i + j] as u128) + carry;
            t[i + j] = product as u64;
            carry = product >> 64;
        }

        for j in (i + 4)..8 {
            let sum = (t[j] as u128) + carry;
            t[j] = sum as u64;
            carry = sum >> 64;
        }
        extra += carry as u64;
    }

    // Extract high half; the value extra*2^256 + result is < 2p, so a single
    // conditional subtraction is enough.
    let result = [t[4], t[5], t[6], t[7]];

    if extra != 0 || !is_canonical(result) {
        FieldElement {
            limbs: sub_limbs(result, MODULUS),
        }
    } else {
        FieldElement { limbs: result }
    }
}

impl Distribution<FieldElement> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> FieldElement {
        loop {
            let bytes: [u8; 32] = rng.random();

            let limbs = [
                u64::from_le_bytes(bytes[0..8].try_into().unwrap()),
                u64::from_le_bytes(bytes[8..16].try_into().unwrap()),
                u64::from_le_bytes(bytes[16..24].try_into().unwrap()),
                u64::from_le_bytes(bytes[24..32].try_into().unwrap()),
            ];

            if is_canonical(limbs) {
                return FieldElement::from_canonical_limbs(limbs);
            }
        }
    }
}

// Arithmetic operations
impl Add for FieldElement {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        FieldElement {
            limbs: add_mod(self.limbs, rhs.limbs),
        }
    }
}

impl AddAssign for FieldElement {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for FieldElement {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        FieldElement {
            limbs: sub_mod(self.limbs, rhs.limbs),
        }
    }
}

impl SubAssign for FieldElement {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for FieldElement {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        FieldElement {
            limbs: neg_mod(self.limbs),
        }
    }
}

impl Mul for FieldElement {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        montgomery_mul(self, rhs)
    }
}

impl MulAssign for FieldElement {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Div for FieldElement {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        self * rhs.inverse()
    }
}

impl DivAssign for FieldElement {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

// Display and Debug
impl Display for FieldElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let canonical = self.to_canonical_limbs();
        write!(
            f,
            "0x{:016x}{:016x}{:016x}{:016x}",
            canonical[3], canonical[2], canonical[1], canonical[0]
        )
    }
}

impl Debug for FieldElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", self)
    }
}

impl Hash for FieldElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.limbs.hash(state);
    }
}

impl ConditionallySelectable for FieldElement {
    #[inline]
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        FieldElement {
            limbs: [
                u64::conditional_select(&a.limbs[0], &b.limbs[0], choice),
                u64::conditional_select(&a.limbs[1], &b.limbs[1], choice),
                u64::conditional_select(&a.limbs[2], &b.limbs[2], choice),
                u64::conditional_select(&a.limbs[3], &b.limbs[3], choice),
            ],
        }
    }
}

impl FieldElement {
    /// Compute multiplicative inverse using binary exponentiation
    pub fn inverse(&self) -> Self {
        // p - 2 for Fermat's little theorem
        let exp = sub_limbs(MODULUS, [2, 0, 0, 0]);
        self.pow_vartime(exp)
    }

    /// Squaring
    #[inline]
    pub fn square(&self) -> Self {
        montgomery_mul(*self, *self)
    }

    /// Variable-time exponentiation
    fn pow_vartime(&self, exp: [u64; 4]) -> Self {
        if self.is_zero() {
            return Self::ZERO;
        }

        let mut result = Self::ONE;
        let mut base = *self;

        // Process bits from least significant to most significant
        for &limb in exp.iter() {
            let mut remaining = limb;
            for _ in 0..64 {
                if remaining & 1 == 1 {
                    result = result * base;
                }
                base = base * base;
                remaining >>= 1;
            }
        }

        result
    }

    /// Check if this field element is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.limbs == [0, 0, 0, 0]
    }

    /// Invert every element of the slice with a single field inversion
    /// (Montgomery's trick). All elements must be non-zero.
    pub fn batch_invert(values: &mut [Self]) {
        if values.is_empty() {
            return;
        }

        // Prefix products: prefixes[i] = values[0] * ... * values[i-1]
        let mut prefixes = Vec::with_capacity(values.len());
        let mut acc = Self::ONE;
        for v in values.iter() {
            debug_assert!(!v.is_zero());
            prefixes.push(acc);
            acc = acc * *v;
        }

        // One inversion of the total product, then walk backwards
        let mut inv = acc.inverse();
        for (v, prefix) in values.iter_mut().zip(prefixes).rev() {
            let v_inv = inv * prefix;
            inv = inv * *v;
            *v = v_inv;
        }
    }

    /// Canonical value as a big integer.
    pub fn as_biguint(&self) -> BigUint {
        let canonical = self.to_canonical_limbs();
        let mut bytes = Vec::with_capacity(32);
        for &limb in &canonical {
            bytes.extend_from_slice(&limb.to_le_bytes());
        }
        BigUint::from_bytes_le(&bytes)
    }

    /// The field modulus as a big integer.
    pub fn order() -> BigUint {
        let mut bytes = Vec::with_capacity(32);
        for &limb in &MODULUS {
            bytes.extend_from_slice(&limb.to_le_bytes());
        }
        BigUint::from_bytes_le(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zero_one() {
        assert_eq!(FieldElement::ZERO + FieldElement::ZERO, FieldElement::ZERO);
        assert_eq!(FieldElement::ONE * FieldElement::ONE, FieldElement::ONE);
        assert_eq!(FieldElement::ZERO * FieldElement::ONE, FieldElement::ZERO);
        assert_eq!(FieldElement::ONE + FieldElement::ZERO, FieldElement::ONE);
    }

    #[test]
    fn test_addition() {
        let a = FieldElement::from_canonical_u64(5);
        let b = FieldElement::from_canonical_u64(7);
        assert_eq!(a + b, FieldElement::from_canonical_u64(12));
    }

    #[test]
    fn test_subtraction() {
        let a = FieldElement::from_canonical_u64(10);
        let b = FieldElement::from_canonical_u64(3);
        assert_eq!(a - b, FieldElement::from_canonical_u64(7));
    }

    #[test]
    fn test_multiplication() {
        let a = FieldElement::from_canonical_u64(6);
        let b = FieldElement::from_canonical_u64(7);
        assert_eq!(a * b, FieldElement::from_canonical_u64(42));
    }

    #[test]
    fn test_negation() {
        let a = FieldElement::from_canonical_u64(5);
        let b = -a;
        assert_eq!(a + b, FieldElement::ZERO);
        assert_eq!(-FieldElement::ZERO, FieldElement::ZERO);
    }

    #[test]
    fn test_inverse() {
        let a = FieldElement::from_canonical_u64(5);
        let a_inv = a.inverse();
        assert_eq!(a * a_inv, FieldElement::ONE);
    }

    #[test]
    fn test_order_value() {
        // p = 2^256 - 2^32 - 977
        let two = BigUint::from(2u32);
        let expected = two.pow(256) - two.pow(32) - BigUint::from(977u32);
        assert_eq!(FieldElement::order(), expected);
    }

    #[test]
    fn test_montgomery_mul_against_biguint() {
        let p = FieldElement::order();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let a: FieldElement = rng.random();
            let b: FieldElement = rng.random();
            let expected = (a.as_biguint() * b.as_biguint()) % &p;
            assert_eq!((a * b).as_biguint(), expected);
        }
    }

    #[test]
    fn test_add_sub_against_biguint() {
        let p = FieldElement::order();
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..200 {
            let a: FieldElement = rng.random();
            let b: FieldElement = rng.random();
            let sum = (a.as_biguint() + b.as_biguint()) % &p;
            assert_eq!((a + b).as_biguint(), sum);
            let diff = (&p + a.as_biguint() - b.as_biguint()) % &p;
            assert_eq!((a - b).as_biguint(), diff);
        }
    }

    #[test]
    fn test_mul_near_modulus() {
        // Values just below p stress the reduction carry path
        let p = FieldElement::order();
        let near = FieldElement::ZERO - FieldElement::ONE; // p - 1
        let expected = ((&p - 1u32) * (&p - 1u32)) % &p;
        assert_eq!((near * near).as_biguint(), expected);
        assert_eq!(near * near, FieldElement::ONE);
    }

    #[test]
    fn test_batch_invert() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut values: Vec<FieldElement> = (0..17).map(|_| rng.random()).collect();
        let expected: Vec<FieldElement> = values.iter().map(|v| v.inverse()).collect();
        FieldElement::batch_invert(&mut values);
        assert_eq!(values, expected);
    }

    #[test]
    fn test_batch_invert_empty_and_single() {
        let mut empty: Vec<FieldElement> = Vec::new();
        FieldElement::batch_invert(&mut empty);

        let mut single = [FieldElement::from_canonical_u64(42)];
        FieldElement::batch_invert(&mut single);
        assert_eq!(single[0], FieldElement::from_canonical_u64(42).inverse());
    }

    #[test]
    fn test_conditional_select() {
        let a = FieldElement::from_canonical_u64(1);
        let b = FieldElement::from_canonical_u64(2);
        assert_eq!(
            FieldElement::conditional_select(&a, &b, Choice::from(0)),
            a
        );
        assert_eq!(
            FieldElement::conditional_select(&a, &b, Choice::from(1)),
            b
        );
    }

    #[test]
    fn test_display() {
        let one = FieldElement::ONE;
        assert_eq!(
            format!("{}", one),
            "0x0000000000000000000000000000000000000000000000000000000000000001"
        );
    }
}
