//! Scalar field of secp256k1 (integers modulo the group order).
//! n = 0xfffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141
//!
//! This implementation uses Montgomery form for efficient modular arithmetic.
//! The scalar is represented as [u64; 4] in little-endian order. On top of
//! the ring operations it provides the two decompositions the multiplication
//! engine needs: the lambda (endomorphism) split and the 128-bit split.

use core::fmt::{self, Debug, Display, Formatter};
use core::hash::{Hash, Hasher};
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use num_bigint::BigUint;
use rand::distr::{Distribution, StandardUniform};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::group::ScalarBits;

/// Scalar for secp256k1, an integer modulo the group order n.
/// Represented in Montgomery form with [u64; 4]
#[derive(Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Scalar {
    /// Montgomery form: value * R mod n, where R = 2^256
    limbs: [u64; 4],
}

// Group order: n = 0xfffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141
pub(crate) const MODULUS: [u64; 4] = [
    0xbfd25e8cd0364141,
    0xbaaedce6af48a03b,
    0xfffffffffffffffe,
    0xffffffffffffffff,
];

// R = 2^256 mod n (Montgomery parameter)
const R: [u64; 4] = [
    0x402da1732fc9bebf,
    0x4551231950b75fc4,
    0x0000000000000001,
    0x0000000000000000,
];

// R^2 = 2^512 mod n (for Montgomery conversion)
const R2: [u64; 4] = [
    0x896cf21467d7d140,
    0x741496c20e7cf878,
    0xe697f5e45bcd07c6,
    0x9d671cd581c69bc5,
];

// -n^{-1} mod 2^64 (Montgomery parameter mu)
const MU: u64 = 0x4b0dff665588b13f;

// Lambda decomposition constants. lambda is a cube root of unity mod n with
// lambda*(x, y) = (beta*x, y) on the curve; any scalar k splits as
// k = r1 + r2*lambda with |r1|, |r2| < 2^128 via the lattice below.
//
// lambda = 0x5363ad4cc05c30e0a5261c028812645a122e22ea20816678df02967c1b23bd72

/// lambda (in Montgomery form), exposed for consistency checks.
pub(crate) const LAMBDA: Scalar = Scalar {
    limbs: [
        0xf07deb3dc9926c9e,
        0x2c93e7ad83c6944c,
        0x73a9660652697d91,
        0x532840178558d639,
    ],
};

// -lambda mod n (in Montgomery form)
const MINUS_LAMBDA: Scalar = Scalar {
    limbs: [
        0xcf54734f06a3d4a3,
        0x8e1af5392b820bee,
        0x8c5699f9ad96826d,
        0xacd7bfe87aa729c6,
    ],
};

// -b1 = 0xe4437ed6010e88286f547fa90abfe4c3 (in Montgomery form)
const MINUS_B1: Scalar = Scalar {
    limbs: [
        0xc50468d00ad9263c,
        0x1b1c8205faa6ed42,
        0x1571b4ae8ac47f71,
        0x221208ac9df506c6,
    ],
};

// -b2 = n - 0x3086d221a7d46bcde86c90e49284eb15 (in Montgomery form)
const MINUS_B2: Scalar = Scalar {
    limbs: [
        0x0cac5e506a144696,
        0x1e8a8dc5f3ba5939,
        0x176cdf65ba244fce,
        0xc25575eb8e173580,
    ],
};

// g1 = round(2^272 * b2 / n) and g2 = round(2^272 * (-b1) / n), canonical
// (non-Montgomery) limbs; only used as plain integers by mul_shift_var.
const G1: [u64; 4] = [0x90e49284eb153dab, 0xd221a7d46bcde86c, 0x0000000000003086, 0];
const G2: [u64; 4] = [0x7fa90abfe4c42212, 0x7ed6010e88286f54, 0x000000000000e443, 0];

impl Scalar {
    /// Zero element (in Montgomery form)
    pub const ZERO: Self = Scalar {
        limbs: [0, 0, 0, 0],
    };

    /// One element (in Montgomery form: R mod n)
    pub const ONE: Self = Scalar { limbs: R };

    /// Create a new scalar from a u64 value
    #[inline]
    pub fn from_canonical_u64(val: u64) -> Self {
        let result = Scalar {
            limbs: [val, 0, 0, 0],
        };
        montgomery_mul(result, Scalar { limbs: R2 })
    }

    /// Convert from Montgomery form to canonical form
    #[inline]
    pub fn to_canonical_limbs(&self) -> [u64; 4] {
        let one = Scalar {
            limbs: [1, 0, 0, 0],
        };
        montgomery_mul(*self, one).limbs
    }

    /// Reduce canonical little-endian limbs into a scalar. Values >= n wrap
    /// around (the limbs are treated as an integer mod n).
    #[inline]
    pub fn from_limbs_mod_order(limbs: [u64; 4]) -> Self {
        montgomery_mul(Scalar { limbs }, Scalar { limbs: R2 })
    }

    #[inline]
    pub(crate) fn from_canonical_limbs(limbs: [u64; 4]) -> Self {
        debug_assert!(is_canonical(limbs));
        Self::from_limbs_mod_order(limbs)
    }

    /// Check if this scalar is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.limbs == [0, 0, 0, 0]
    }

    /// True if the canonical value has bit 255 set, i.e. the scalar is
    /// "closer" to n than to zero. The wNAF recoder negates such scalars.
    #[inline]
    pub fn is_high(&self) -> bool {
        self.to_canonical_limbs()[3] >> 63 == 1
    }

    /// Split into (low, high) 128-bit halves: self = low + 2^128 * high.
    pub fn split_128(&self) -> (Scalar, Scalar) {
        let l = self.to_canonical_limbs();
        let low = Self::from_canonical_limbs([l[0], l[1], 0, 0]);
        let high = Self::from_canonical_limbs([l[2], l[3], 0, 0]);
        (low, high)
    }

    /// Decompose self into r1, r2 such that r1 + r2*lambda = self (mod n)
    /// and both r1 and r2 have magnitude below 2^128 (after folding values
    /// above n/2 to their negatives).
    pub fn split_lambda(&self) -> (Scalar, Scalar) {
        let c1 = self.mul_shift_var(&G1, 272);
        let c2 = self.mul_shift_var(&G2, 272);
        let r2 = c1 * MINUS_B1 + c2 * MINUS_B2;
        let r1 = r2 * MINUS_LAMBDA + *self;
        (r1, r2)
    }

    /// Compute round(self * b / 2^shift) mod n on the canonical values.
    /// Requires shift >= 256 so the result is at most 256 bits.
    fn mul_shift_var(&self, b: &[u64; 4], shift: usize) -> Scalar {
        debug_assert!(shift >= 256);
        let a = self.to_canonical_limbs();

        // Full 512-bit product
        let mut t = [0u64; 8];
        for i in 0..4 {
            let mut carry = 0u128;
            for j in 0..4 {
                let product = (a[i] as u128) * (b[j] as u128) + (t[i + j] as u128) + carry;
                t[i + j] = product as u64;
                carry = product >> 64;
            }
            t[i + 4] = carry as u64;
        }

        // Shift right, then round by the dropped top bit
        let word = shift >> 6;
        let bits = shift & 63;
        let mut shifted = [0u64; 4];
        for (i, limb) in shifted.iter_mut().enumerate() {
            if word + i < 8 {
                let mut value = t[word + i] >> bits;
                if bits > 0 && word + i + 1 < 8 {
                    value |= t[word + i + 1] << (64 - bits);
                }
                *limb = value;
            }
        }
        let round = (t[(shift - 1) >> 6] >> ((shift - 1) & 63)) & 1;

        let mut result = Scalar::from_canonical_limbs(shifted);
        if round == 1 {
            result = result + Scalar::ONE;
        }
        result
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

    /// The group order as a big integer.
    pub fn order() -> BigUint {
        let mut bytes = Vec::with_capacity(32);
        for &limb in &MODULUS {
            bytes.extend_from_slice(&limb.to_le_bytes());
        }
        BigUint::from_bytes_le(&bytes)
    }
}

impl ScalarBits for Scalar {
    #[inline]
    fn to_u64_limbs(&self) -> [u64; 4] {
        self.to_canonical_limbs()
    }
}

/// Helper: Add two 256-bit numbers mod n
#[inline]
const fn add_mod(a: [u64; 4], b: [u64; 4]) -> [u64; 4] {
    let (r0, carry) = a[0].overflowing_add(b[0]);
    let (r1, carry) = carrying_add(a[1], b[1], carry);
    let (r2, carry) = carrying_add(a[2], b[2], carry);
    let (r3, carry) = carrying_add(a[3], b[3], carry);

    let (s0, borrow) = r0.overflowing_sub(MODULUS[0]);
    let (s1, borrow) = borrowing_sub(r1, MODULUS[1], borrow);
    let (s2, borrow) = borrowing_sub(r2, MODULUS[2], borrow);
    let (s3, borrow) = borrowing_sub(r3, MODULUS[3], borrow);

    if carry || !borrow {
        [s0, s1, s2, s3]
    } else {
        [r0, r1, r2, r3]
    }
}

/// Helper: Subtract two 256-bit numbers mod n
#[inline]
const fn sub_mod(a: [u64; 4], b: [u64; 4]) -> [u64; 4] {
    let (r0, borrow) = a[0].overflowing_sub(b[0]);
    let (r1, borrow) = borrowing_sub(a[1], b[1], borrow);
    let (r2, borrow) = borrowing_sub(a[2], b[2], borrow);
    let (r3, borrow) = borrowing_sub(a[3], b[3], borrow);

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

/// Helper: Negate a 256-bit number mod n
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

/// Montgomery multiplication: (a * b * R^{-1}) mod n
#[inline]
fn montgomery_mul(a: Scalar, b: Scalar) -> Scalar {
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

    // Montgomery reduction. n is close to 2^256, so the carry above the top
    // limb must be tracked before the final conditional subtraction.
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

    let result = [t[4], t[5], t[6], t[7]];

    if extra != 0 || !is_canonical(result) {
        Scalar {
            limbs: sub_limbs(result, MODULUS),
        }
    } else {
        Scalar { limbs: result }
    }
}

impl Distribution<Scalar> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Scalar {
        loop {
            let bytes: [u8; 32] = rng.random();

            let limbs = [
                u64::from_le_bytes(bytes[0..8].try_into().unwrap()),
                u64::from_le_bytes(bytes[8..16].try_into().unwrap()),
                u64::from_le_bytes(bytes[16..24].try_into().unwrap()),
                u64::from_le_bytes(bytes[24..32].try_into().unwrap()),
            ];

            if is_canonical(limbs) {
                return Scalar::from_canonical_limbs(limbs);
            }
        }
    }
}

// Arithmetic operations
impl Add for Scalar {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Scalar {
            limbs: add_mod(self.limbs, rhs.limbs),
        }
    }
}

impl AddAssign for Scalar {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Scalar {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Scalar {
            limbs: sub_mod(self.limbs, rhs.limbs),
        }
    }
}

impl SubAssign for Scalar {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Scalar {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Scalar {
            limbs: neg_mod(self.limbs),
        }
    }
}

impl Mul for Scalar {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        montgomery_mul(self, rhs)
    }
}

impl MulAssign for Scalar {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

// Display and Debug
impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let canonical = self.to_canonical_limbs();
        write!(
            f,
            "0x{:016x}{:016x}{:016x}{:016x}",
            canonical[3], canonical[2], canonical[1], canonical[0]
        )
    }
}

impl Debug for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Scalar({})", self)
    }
}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.limbs.hash(state);
    }
}
