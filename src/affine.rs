// E(GF(p)) : y^2 = x^3 + 7, p = 2^256 - 2^32 - 977 (secp256k1)
// Generator point:
//   (0x79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798 :
//    0x483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8 : 1)
// Group order n: 0xfffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141
// Curve cofactor: 1
// beta = 0x7ae96a2b657c07106e64479eac3434e99cf0497512f58995c1396c28719501ee,
// a cube root of unity mod p; (x, y) -> (beta*x, y) multiplies points by lambda.

use crate::field::FieldElement;
use crate::{Group, Scalar};
use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use serde::{Deserialize, Serialize};
use subtle::{Choice, ConditionallySelectable};

/// Affine point on the curve.
/// Represents a point in affine coordinates (x, y) or the point at infinity.
/// This doubles as the storage representation: coordinates are always in
/// canonical reduced form, and precomputation tables hold affine entries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affine {
    /// The x-coordinate of the point
    pub x: FieldElement,
    /// The y-coordinate of the point
    pub y: FieldElement,
    /// Whether this point is the point at infinity (identity element)
    pub is_infinity: bool,
}

// Curve coefficient b = 7 (in Montgomery form); a = 0.
pub(crate) const CURVE_B: FieldElement =
    FieldElement::from_montgomery([0x0000000700001ab7, 0, 0, 0]);

// Generator coordinates (in Montgomery form).
const GENERATOR_X: FieldElement = FieldElement::from_montgomery([
    0xd7362e5a487e2097,
    0x231e295329bc66db,
    0x979f48c033fd129c,
    0x9981e643e9089f48,
]);
const GENERATOR_Y: FieldElement = FieldElement::from_montgomery([
    0xb15ea6d2d3dbabe2,
    0x8dfc5d5d1f1dc64d,
    0x70b6b59aac19c136,
    0xcf3f851fd4a582d6,
]);

// beta (in Montgomery form)
const BETA: FieldElement = FieldElement::from_montgomery([
    0x58a4361c8e81894e,
    0x03fde1631c4b80af,
    0xf8e98978d02e3905,
    0x7a4a36aebcbb3d53,
]);

impl Affine {
    /// The point at infinity (identity element)
    pub const INFINITY: Self = Affine {
        x: FieldElement::ZERO,
        y: FieldElement::ZERO,
        is_infinity: true,
    };

    /// Create a new affine point.
    pub fn new(x: FieldElement, y: FieldElement) -> Self {
        Affine {
            x,
            y,
            is_infinity: false,
        }
    }

    /// Check if this point is the point at infinity.
    #[inline]
    pub fn is_infinity(&self) -> bool {
        self.is_infinity
    }

    /// Check if a point is on the curve: y^2 = x^3 + 7.
    pub fn is_on_curve(&self) -> bool {
        if self.is_infinity {
            return true;
        }

        let y2 = self.y * self.y;
        let x2 = self.x * self.x;
        let x3 = x2 * self.x;

        y2 == x3 + CURVE_B
    }

    /// The secp256k1 generator point.
    pub fn generator() -> Self {
        Affine::new(GENERATOR_X, GENERATOR_Y)
    }

    /// Point doubling: 2*P.
    pub fn double(&self) -> Self {
        if self.is_infinity {
            return *self;
        }

        // If y = 0, then 2P = O (cannot happen for a valid point on this
        // curve, which has odd prime order, but keep the identity correct)
        if self.y.is_zero() {
            return Self::INFINITY;
        }

        // Compute slope: lambda = 3x^2 / (2y), since a = 0
        let x2 = self.x * self.x;
        let numerator = x2 + x2 + x2;
        let denominator = self.y + self.y;
        let lambda = numerator / denominator;

        // x_r = lambda^2 - 2x
        let lambda2 = lambda * lambda;
        let x_r = lambda2 - self.x - self.x;

        // y_r = lambda(x - x_r) - y
        let y_r = lambda * (self.x - x_r) - self.y;

        Affine::new(x_r, y_r)
    }

    /// Negate a point.
    pub fn negate(&self) -> Self {
        if self.is_infinity {
            return *self;
        }
        Affine::new(self.x, -self.y)
    }

    /// Apply the curve endomorphism: (x, y) -> (beta*x, y).
    /// Equivalent to multiplying the point by the scalar lambda.
    pub fn endomorphism(&self) -> Self {
        if self.is_infinity {
            return *self;
        }
        Affine::new(self.x * BETA, self.y)
    }
}

impl Group for Affine {
    type Scalar = Scalar;

    #[inline]
    fn identity() -> Self {
        Self::INFINITY
    }

    #[inline]
    fn is_identity(&self) -> bool {
        self.is_infinity
    }

    #[inline]
    fn generator() -> Self {
        Affine::generator()
    }

    #[inline]
    fn double(&self) -> Self {
        Self::double(self)
    }

    #[inline]
    fn negate(&self) -> Self {
        Self::negate(self)
    }
}

// Implement addition for affine points
impl Add for Affine {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        // Handle infinity cases
        if self.is_infinity {
            return other;
        }
        if other.is_infinity {
            return self;
        }

        // Check if points are the same
        if self.x == other.x {
            if self.y == other.y {
                // Point doubling
                return self.double();
            } else {
                // Points are inverses, return infinity
                return Self::INFINITY;
            }
        }

        // Regular point addition
        // lambda = (y2 - y1) / (x2 - x1)
        let numerator = other.y - self.y;
        let denominator = other.x - self.x;
        let lambda = numerator / denominator;

        // x_r = lambda^2 - x1 - x2
        let lambda2 = lambda * lambda;
        let x_r = lambda2 - self.x - other.x;

        // y_r = lambda(x1 - x_r) - y1
        let y_r = lambda * (self.x - x_r) - self.y;

        Affine::new(x_r, y_r)
    }
}

impl AddAssign for Affine {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

#[allow(clippy::suspicious_arithmetic_impl)]
impl Sub for Affine {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self + other.negate()
    }
}

impl SubAssign for Affine {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Neg for Affine {
    type Output = Self;

    fn neg(self) -> Self {
        self.negate()
    }
}

// Scalar multiplication
impl Mul<Scalar> for Affine {
    type Output = Self;

    fn mul(self, scalar: Scalar) -> Self {
        <Self as Group>::scalar_mul(&self, &scalar)
    }
}

impl Mul<&Scalar> for Affine {
    type Output = Self;

    fn mul(self, scalar: &Scalar) -> Self {
        <Self as Group>::scalar_mul(&self, scalar)
    }
}

impl Mul<Affine> for Scalar {
    type Output = Affine;

    fn mul(self, point: Affine) -> Affine {
        <Affine as Group>::scalar_mul(&point, &self)
    }
}

impl ConditionallySelectable for Affine {
    #[inline]
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Affine {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            is_infinity: u8::conditional_select(
                &(a.is_infinity as u8),
                &(b.is_infinity as u8),
                choice,
            ) != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Group;

    #[test]
    fn test_infinity() {
        let inf = Affine::INFINITY;
        assert!(inf.is_infinity());
        assert!(inf.is_on_curve());
    }

    #[test]
    fn test_generator_on_curve() {
        let g = Affine::generator();
        assert!(g.is_on_curve(), "Generator point is not on the curve");
        assert!(!g.is_infinity());
    }

    #[test]
    fn test_generator_coordinates() {
        let g = Affine::generator();
        assert_eq!(
            format!("{}", g.x),
            "0x79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        assert_eq!(
            format!("{}", g.y),
            "0x483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"
        );
    }

    #[test]
    fn test_point_addition_with_infinity() {
        let g = Affine::generator();
        let inf = Affine::INFINITY;

        assert_eq!(g + inf, g);
        assert_eq!(inf + g, g);
        assert_eq!(inf + inf, inf);
    }

    #[test]
    fn test_point_doubling() {
        let g = Affine::generator();
        let g2 = g.double();

        assert!(g2.is_on_curve(), "Doubled point is not on the curve");
        assert_eq!(g + g, g2);
    }

    #[test]
    fn test_doubled_generator_test_vector() {
        // Published 2*G coordinates for secp256k1
        let g2 = Affine::generator().double();
        assert_eq!(
            format!("{}", g2.x),
            "0xc6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5"
        );
        assert_eq!(
            format!("{}", g2.y),
            "0x1ae168fea63dc339a3c58419466ceaeef7f632653266d0e1236431a950cfe52a"
        );
    }

    #[test]
    fn test_point_negation() {
        let g = Affine::generator();
        let neg_g = g.negate();

        assert!(neg_g.is_on_curve());
        assert_eq!(g + neg_g, Affine::INFINITY);
    }

    #[test]
    fn test_scalar_multiplication() {
        let g = Affine::generator();
        let scalar = Scalar::from_canonical_u64(5);
        let result = g.scalar_mul(&scalar);

        // 5*G = G + G + G + G + G
        let expected = g + g + g + g + g;
        assert_eq!(result, expected);
        assert!(result.is_on_curve());
    }

    #[test]
    fn test_scalar_mul_zero() {
        let g = Affine::generator();
        assert_eq!(g.scalar_mul(&Scalar::ZERO), Affine::INFINITY);
    }

    #[test]
    fn test_scalar_mul_one() {
        let g = Affine::generator();
        assert_eq!(g.scalar_mul(&Scalar::ONE), g);
    }

    #[test]
    fn test_associativity() {
        let g = Affine::generator();
        let a = Scalar::from_canonical_u64(3);
        let b = Scalar::from_canonical_u64(5);

        // (a + b) * G = a*G + b*G
        let left = g.scalar_mul(&(a + b));
        let right = g.scalar_mul(&a) + g.scalar_mul(&b);

        assert_eq!(left, right);
    }

    #[test]
    fn test_mul_u64() {
        let g = Affine::generator();
        let result1 = g.mul_u64(42);
        let result2 = g.scalar_mul(&Scalar::from_canonical_u64(42));

        assert_eq!(result1, result2);
        assert!(result1.is_on_curve());
    }

    #[test]
    fn test_endomorphism_is_mul_by_lambda() {
        let g = Affine::generator();
        let mapped = g.endomorphism();

        assert!(mapped.is_on_curve());
        assert_eq!(mapped, g.scalar_mul(&crate::scalar::LAMBDA));
    }

    #[test]
    fn test_endomorphism_of_infinity() {
        assert_eq!(Affine::INFINITY.endomorphism(), Affine::INFINITY);
    }

    #[test]
    fn test_conditional_select() {
        let g = Affine::generator();
        let g2 = g.double();
        assert_eq!(Affine::conditional_select(&g, &g2, Choice::from(0)), g);
        assert_eq!(Affine::conditional_select(&g, &g2, Choice::from(1)), g2);
    }

    #[test]
    fn test_group_properties() {
        let g = Affine::generator();

        assert_eq!(g.double(), g + g);

        let triple1 = g + g + g;
        let triple2 = g.mul_u64(3);
        assert_eq!(triple1, triple2);

        let h = g.mul_u64(5);
        let neg_h = -h;
        assert_eq!(h + neg_h, Affine::INFINITY);
    }
}
