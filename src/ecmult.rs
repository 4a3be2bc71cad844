//! Double-base scalar multiplication: R = na*A + ng*G.
//!
//! Both scalars are recoded into windowed non-adjacent form and scanned
//! jointly from the most significant digit. The G digits index the
//! persistent context tables; the A digits select from a small table of odd
//! multiples built per call. With the endomorphism tables present, na is
//! decomposed via the lambda split and ng into 128-bit halves, so every
//! digit sequence is roughly half length and the doubling count drops
//! accordingly.

use crate::affine::Affine;
use crate::jacobian::Jacobian;
use crate::precompute::{odd_multiples, table_size, EcmultContext, Tables, WINDOW_A, WINDOW_G};
use crate::scalar::Scalar;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// Digit positions for a full 256-bit scalar.
const WNAF_LEN: usize = 256;

/// Digit positions for a lambda-split half: at most 128 bits of magnitude,
/// plus room for the window carry to run past the top bit.
const WNAF_LEN_SPLIT_A: usize = 130;

/// Digit positions for a 128-bit half of ng, plus one carry position.
const WNAF_LEN_SPLIT_G: usize = 129;

/// Extract `count` bits (count <= 32) starting at `offset` from canonical
/// little-endian limbs. The caller keeps offset + count <= 256.
#[inline]
fn get_bits(limbs: &[u64; 4], offset: usize, count: usize) -> u32 {
    let limb = offset >> 6;
    let shift = offset & 63;
    let mask = (1u64 << count) - 1;
    if shift + count <= 64 {
        ((limbs[limb] >> shift) & mask) as u32
    } else {
        (((limbs[limb] >> shift) | (limbs[limb + 1] << (64 - shift))) & mask) as u32
    }
}

/// Recode a scalar into windowed non-adjacent form with window width `w`:
/// out[i] is either zero or an odd digit in [-(2^(w-1) - 1), 2^(w-1) - 1],
/// and the represented value sum(out[i] * 2^i) is congruent to the scalar
/// mod n. Scalars with bit 255 set are negated up front and the digit signs
/// flipped, which keeps every recoded value below 2^255 so the digits fit in
/// `out`. Returns the number of significant digit positions.
pub(crate) fn scalar_wnaf(out: &mut [i32], scalar: &Scalar, w: usize) -> usize {
    debug_assert!((2..=30).contains(&w));
    for digit in out.iter_mut() {
        *digit = 0;
    }

    let mut s = *scalar;
    let mut sign = 1i32;
    if s.is_high() {
        s = -s;
        sign = -1;
    }
    let limbs = s.to_canonical_limbs();

    let len = out.len();
    let mut bit = 0;
    let mut carry = 0u32;
    let mut used = 0;
    while bit < len {
        if get_bits(&limbs, bit, 1) == carry {
            bit += 1;
            continue;
        }

        let now = w.min(len - bit);
        let mut word = (get_bits(&limbs, bit, now) + carry) as i32;
        // The window is odd; if its top bit is set, fold it to a negative
        // digit and carry one into the next window.
        carry = ((word >> (w - 1)) & 1) as u32;
        word -= (carry as i32) << w;

        out[bit] = sign * word;
        bit += now;
        used = bit;
    }
    debug_assert_eq!(carry, 0);
    used
}

/// Variable-time lookup for public digits: directly index the entry for an
/// odd digit and negate for negative digits.
#[inline]
fn table_get(table: &[Affine], digit: i32) -> Affine {
    debug_assert!(digit != 0 && digit & 1 == 1);
    let entry = table[((digit.unsigned_abs() as usize) - 1) / 2];
    if digit < 0 {
        entry.negate()
    } else {
        entry
    }
}

/// Constant-pattern lookup for secret digits: every table entry is read and
/// conditionally assigned, and the negation is applied by conditional select,
/// so neither the memory access pattern nor the branch structure depends on
/// the digit value.
#[inline]
fn table_select(table: &[Affine], digit: i32) -> Affine {
    let target = ((digit.unsigned_abs() as u64) - 1) / 2;
    let mut selected = table[0];
    for (index, entry) in table.iter().enumerate().skip(1) {
        selected.conditional_assign(entry, (index as u64).ct_eq(&target));
    }
    let negated = selected.negate();
    selected.conditional_assign(&negated, Choice::from((digit < 0) as u8));
    selected
}

/// Compute na*A + ng*G against built tables.
pub(crate) fn ecmult(tables: &Tables, a: &Jacobian, na: &Scalar, ng: &Scalar) -> Jacobian {
    // The na*A term contributes nothing when A is the identity or na is
    // zero; the A tables and digit sequences are skipped entirely then.
    let scan_a = !a.is_infinity() && !na.is_zero();

    match &tables.pre_g_128 {
        Some(pre_g_128) => ecmult_endo(&tables.pre_g, pre_g_128, a, na, ng, scan_a),
        None => ecmult_plain(&tables.pre_g, a, na, ng, scan_a),
    }
}

fn ecmult_plain(
    pre_g: &[Affine],
    a: &Jacobian,
    na: &Scalar,
    ng: &Scalar,
    scan_a: bool,
) -> Jacobian {
    let mut wnaf_na = [0i32; WNAF_LEN];
    let mut bits_na = 0;
    let mut pre_a: Vec<Affine> = Vec::new();
    if scan_a {
        bits_na = scalar_wnaf(&mut wnaf_na, na, WINDOW_A);
        pre_a = odd_multiples(a, table_size(WINDOW_A));
    }

    let mut wnaf_ng = [0i32; WNAF_LEN];
    let bits_ng = scalar_wnaf(&mut wnaf_ng, ng, WINDOW_G);

    let mut r = Jacobian::INFINITY;
    for i in (0..bits_na.max(bits_ng)).rev() {
        r = r.double();

        if i < bits_na {
            let digit = wnaf_na[i];
            if digit != 0 {
                r = r.add_affine(&table_select(&pre_a, digit));
            }
        }
        if i < bits_ng {
            let digit = wnaf_ng[i];
            if digit != 0 {
                r = r.add_affine(&table_get(pre_g, digit));
            }
        }
    }
    r
}

fn ecmult_endo(
    pre_g: &[Affine],
    pre_g_128: &[Affine],
    a: &Jacobian,
    na: &Scalar,
    ng: &Scalar,
    scan_a: bool,
) -> Jacobian {
    let mut wnaf_na_1 = [0i32; WNAF_LEN_SPLIT_A];
    let mut wnaf_na_lam = [0i32; WNAF_LEN_SPLIT_A];
    let mut bits_na_1 = 0;
    let mut bits_na_lam = 0;
    let mut pre_a: Vec<Affine> = Vec::new();
    let mut pre_a_lam: Vec<Affine> = Vec::new();
    if scan_a {
        // na = na_1 + na_lam * lambda with both halves short
        let (na_1, na_lam) = na.split_lambda();
        bits_na_1 = scalar_wnaf(&mut wnaf_na_1, &na_1, WINDOW_A);
        bits_na_lam = scalar_wnaf(&mut wnaf_na_lam, &na_lam, WINDOW_A);

        pre_a = odd_multiples(a, table_size(WINDOW_A));
        // The table for lambda*A is the beta image of the table for A
        pre_a_lam = pre_a.iter().map(Affine::endomorphism).collect();
    }

    // ng = ng_low + ng_high * 2^128, each half scanned against its own table
    let (ng_low, ng_high) = ng.split_128();
    let mut wnaf_ng_low = [0i32; WNAF_LEN_SPLIT_G];
    let mut wnaf_ng_high = [0i32; WNAF_LEN_SPLIT_G];
    let bits_ng_low = scalar_wnaf(&mut wnaf_ng_low, &ng_low, WINDOW_G);
    let bits_ng_high = scalar_wnaf(&mut wnaf_ng_high, &ng_high, WINDOW_G);

    let bits = bits_na_1
        .max(bits_na_lam)
        .max(bits_ng_low)
        .max(bits_ng_high);

    let mut r = Jacobian::INFINITY;
    for i in (0..bits).rev() {
        r = r.double();

        if i < bits_na_1 {
            let digit = wnaf_na_1[i];
            if digit != 0 {
                r = r.add_affine(&table_select(&pre_a, digit));
            }
        }
        if i < bits_na_lam {
            let digit = wnaf_na_lam[i];
            if digit != 0 {
                r = r.add_affine(&table_select(&pre_a_lam, digit));
            }
        }
        if i < bits_ng_low {
            let digit = wnaf_ng_low[i];
            if digit != 0 {
                r = r.add_affine(&table_get(pre_g, digit));
            }
        }
        if i < bits_ng_high {
            let digit = wnaf_ng_high[i];
            if digit != 0 {
                r = r.add_affine(&table_get(pre_g_128, digit));
            }
        }
    }
    r
}

impl EcmultContext {
    /// Double-base multiplication: na*A + ng*G.
    ///
    /// The context must be built; calling this on an unbuilt context is a
    /// programming error and panics. The context is never mutated, so any
    /// number of threads may call this concurrently on a shared context.
    pub fn ecmult(&self, a: &Jacobian, na: &Scalar, ng: &Scalar) -> Jacobian {
        let tables = self
            .tables()
            .expect("ecmult called on a context that is not built");
        ecmult(tables, a, na, ng)
    }
}
