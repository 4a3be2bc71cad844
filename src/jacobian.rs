use crate::affine::{Affine, CURVE_B};
use crate::field::FieldElement;
use crate::{Group, Scalar};
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use serde::{Deserialize, Serialize};

/// Jacobian point on the curve.
/// Represents a point as (X:Y:Z) with (x, y) = (X/Z^2, Y/Z^3); the point at
/// infinity has Z = 0. This is the fast representation used while combining
/// points; tables store the affine form.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Jacobian {
    pub x: FieldElement,
    pub y: FieldElement,
    pub z: FieldElement,
}

impl Jacobian {
    /// The point at infinity (identity element): Z = 0.
    pub const INFINITY: Self = Jacobian {
        x: FieldElement::ONE,
        y: FieldElement::ONE,
        z: FieldElement::ZERO,
    };

    /// Create a new Jacobian point.
    pub fn new(x: FieldElement, y: FieldElement, z: FieldElement) -> Self {
        Jacobian { x, y, z }
    }

    /// Check if this point is the point at infinity.
    #[inline]
    pub fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }

    /// Convert to affine coordinates with one field inversion.
    pub fn to_affine(&self) -> Affine {
        if self.is_infinity() {
            return Affine::INFINITY;
        }

        let z_inv = self.z.inverse();
        let z_inv2 = z_inv.square();
        let x = self.x * z_inv2;
        let y = self.y * z_inv2 * z_inv;

        Affine::new(x, y)
    }

    /// Convert from affine coordinates.
    pub fn from_affine(point: &Affine) -> Self {
        if point.is_infinity() {
            return Self::INFINITY;
        }

        Jacobian::new(point.x, point.y, FieldElement::ONE)
    }

    /// Check if a point is on the curve: Y^2 = X^3 + 7*Z^6.
    pub fn is_on_curve(&self) -> bool {
        if self.is_infinity() {
            return true;
        }

        let y2 = self.y.square();
        let x3 = self.x.square() * self.x;
        let z2 = self.z.square();
        let z6 = z2.square() * z2;

        y2 == x3 + CURVE_B * z6
    }

    /// The secp256k1 generator point.
    pub fn generator() -> Self {
        Self::from_affine(&Affine::generator())
    }

    /// Point doubling: 2*P (a = 0 formulas, no inversion).
    pub fn double(&self) -> Self {
        if self.is_infinity() {
            return *self;
        }

        // No valid point has y = 0 (the group has odd prime order), so the
        // formula below only degenerates for the identity handled above.
        let a = self.x.square();
        let b = self.y.square();
        let c = b.square();

        // d = 2*((x + b)^2 - a - c)
        let xb = self.x + b;
        let d_half = xb.square() - a - c;
        let d = d_half + d_half;

        let e = a + a + a;
        let f = e.square();

        let x3 = f - d - d;
        let c8 = {
            let c2 = c + c;
            let c4 = c2 + c2;
            c4 + c4
        };
        let y3 = e * (d - x3) - c8;
        let z3 = (self.y + self.y) * self.z;

        Jacobian::new(x3, y3, z3)
    }

    /// Mixed addition: self + q, with q in affine coordinates.
    /// Cheaper than full Jacobian addition; the scan loop lives on this.
    pub fn add_affine(&self, q: &Affine) -> Self {
        if q.is_infinity() {
            return *self;
        }
        if self.is_infinity() {
            return Self::from_affine(q);
        }

        let z1z1 = self.z.square();
        let u2 = q.x * z1z1;
        let s2 = q.y * self.z * z1z1;

        if u2 == self.x {
            if s2 == self.y {
                return self.double();
            }
            // Opposite points
            return Self::INFINITY;
        }

        let h = u2 - self.x;
        let r = s2 - self.y;
        let hh = h.square();
        let hhh = hh * h;
        let v = self.x * hh;

        let x3 = r.square() - hhh - v - v;
        let y3 = r * (v - x3) - self.y * hhh;
        let z3 = self.z * h;

        Jacobian::new(x3, y3, z3)
    }

    /// Negate a point.
    pub fn negate(&self) -> Self {
        if self.is_infinity() {
            return *self;
        }
        Jacobian::new(self.x, -self.y, self.z)
    }

    /// Batch conversion to affine: one field inversion for the whole slice
    /// instead of one per point.
    pub fn batch_normalize(points: &[Self]) -> Vec<Affine> {
        let mut zs: Vec<FieldElement> = points
            .iter()
            .map(|p| {
                if p.is_infinity() {
                    FieldElement::ONE
                } else {
                    p.z
                }
            })
            .collect();
        FieldElement::batch_invert(&mut zs);

        points
            .iter()
            .zip(zs)
            .map(|(p, z_inv)| {
                if p.is_infinity() {
                    Affine::INFINITY
                } else {
                    let z_inv2 = z_inv.square();
                    Affine::new(p.x * z_inv2, p.y * z_inv2 * z_inv)
                }
            })
            .collect()
    }
}

// Jacobian coordinates are not unique, so equality cross-multiplies by the
// Z factors instead of comparing coordinates.
impl PartialEq for Jacobian {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_infinity(), other.is_infinity()) {
            (true, true) => true,
            (false, false) => {
                let z1z1 = self.z.square();
                let z2z2 = other.z.square();
                self.x * z2z2 == other.x * z1z1
                    && self.y * z2z2 * other.z == other.y * z1z1 * self.z
            }
            _ => false,
        }
    }
}

impl Eq for Jacobian {}

impl Group for Jacobian {
    type Scalar = Scalar;

    #[inline]
    fn identity() -> Self {
        Self::INFINITY
    }

    #[inline]
    fn is_identity(&self) -> bool {
        self.is_infinity()
    }

    #[inline]
    fn generator() -> Self {
        Jacobian::generator()
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

// Implement addition for Jacobian points
impl Add for Jacobian {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        if self.is_infinity() {
            return other;
        }
        if other.is_infinity() {
            return self;
        }

        let z1z1 = self.z.square();
        let z2z2 = other.z.square();
        let u1 = self.x * z2z2;
        let u2 = other.x * z1z1;
        let s1 = self.y * other.z * z2z2;
        let s2 = other.y * self.z * z1z1;

        if u1 == u2 {
            if s1 == s2 {
                return self.double();
            }
            return Self::INFINITY;
        }

        let h = u2 - u1;
        let r = s2 - s1;
        let hh = h.square();
        let hhh = hh * h;
        let v = u1 * hh;

        let x3 = r.square() - hhh - v - v;
        let y3 = r * (v - x3) - s1 * hhh;
        let z3 = self.z * other.z * h;

        Jacobian::new(x3, y3, z3)
    }
}

impl AddAssign for Jacobian {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Add<Affine> for Jacobian {
    type Output = Self;

    fn add(self, other: Affine) -> Self {
        self.add_affine(&other)
    }
}

impl AddAssign<Affine> for Jacobian {
    fn add_assign(&mut self, other: Affine) {
        *self = self.add_affine(&other);
    }
}

#[allow(clippy::suspicious_arithmetic_impl)]
impl Sub for Jacobian {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self + other.negate()
    }
}

impl SubAssign for Jacobian {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Neg for Jacobian {
    type Output = Self;

    fn neg(self) -> Self {
        self.negate()
    }
}

// Conversions
impl From<Affine> for Jacobian {
    fn from(point: Affine) -> Self {
        Jacobian::from_affine(&point)
    }
}

impl From<&Affine> for Jacobian {
    fn from(point: &Affine) -> Self {
        Jacobian::from_affine(point)
    }
}

impl From<Jacobian> for Affine {
    fn from(point: Jacobian) -> Self {
        point.to_affine()
    }
}

impl From<&Jacobian> for Affine {
    fn from(point: &Jacobian) -> Self {
        point.to_affine()
    }
}
