//! Precomputation context for double-base scalar multiplication.
//!
//! The context owns tables of odd multiples of the generator G (and, when
//! the endomorphism optimization is active, of 2^128 * G). It is built once,
//! immutable afterwards, and shared by reference across every multiplication.

use crate::affine::Affine;
use crate::jacobian::Jacobian;

/// Window width for the on-the-fly table of the runtime point A.
pub(crate) const WINDOW_A: usize = 5;

/// Window width for the persistent generator tables. Larger than WINDOW_A
/// because the build cost is paid once; small enough that a table builds in
/// negligible time at startup.
pub(crate) const WINDOW_G: usize = 8;

/// Number of table entries for a window width: the odd multiples
/// 1*B, 3*B, ..., (2^(w-1) - 1)*B.
pub(crate) const fn table_size(window: usize) -> usize {
    1 << (window - 2)
}

/// Errors from building or cloning a precomputation context.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EcmultError {
    /// Table storage could not be allocated. The context is left in the
    /// uninitialized state; nothing is partially built.
    Allocation,
    /// `build` was called on a context that is already built. Call `clear`
    /// first to rebuild. This signals a caller bug, not a resource problem.
    AlreadyBuilt,
}

/// The precomputed tables. Entries are stored in the compact affine form;
/// entry k of a table for base B holds (2k+1)*B.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Tables {
    pub(crate) pre_g: Box<[Affine]>,
    pub(crate) pre_g_128: Option<Box<[Affine]>>,
}

/// Precomputation context for `ecmult`.
///
/// Lifecycle: `new` creates it uninitialized with no allocation; `build`
/// populates the tables; `clear` releases them, returning to a state
/// indistinguishable from a fresh context. A built context never changes,
/// so `&EcmultContext` can be shared freely between threads.
#[derive(Debug, Default)]
pub struct EcmultContext {
    tables: Option<Tables>,
}

impl EcmultContext {
    /// Create an uninitialized context. Allocates nothing.
    pub const fn new() -> Self {
        EcmultContext { tables: None }
    }

    /// Build the generator tables. The endomorphism table is included iff
    /// the `endomorphism` crate feature is enabled; `build_with` gives
    /// explicit control.
    pub fn build(&mut self) -> Result<(), EcmultError> {
        self.build_with(cfg!(feature = "endomorphism"))
    }

    /// Build the generator tables, with the 2^128*G table included iff
    /// `endomorphism` is true.
    pub fn build_with(&mut self, endomorphism: bool) -> Result<(), EcmultError> {
        if self.tables.is_some() {
            return Err(EcmultError::AlreadyBuilt);
        }

        let g = Jacobian::generator();
        let pre_g = alloc_table(&odd_multiples(&g, table_size(WINDOW_G)))?;

        let pre_g_128 = if endomorphism {
            // 2^128 * G by repeated doubling
            let mut g_128 = g;
            for _ in 0..128 {
                g_128 = g_128.double();
            }
            Some(alloc_table(&odd_multiples(&g_128, table_size(WINDOW_G)))?)
        } else {
            None
        };

        self.tables = Some(Tables { pre_g, pre_g_128 });
        Ok(())
    }

    /// Deep copy: the clone owns independent table storage with identical
    /// contents, so it can be cleared or dropped on its own schedule without
    /// repeating the build. Cloning an unbuilt context yields an unbuilt one.
    pub fn try_clone(&self) -> Result<Self, EcmultError> {
        let tables = match &self.tables {
            None => None,
            Some(t) => Some(Tables {
                pre_g: alloc_table(&t.pre_g)?,
                pre_g_128: match &t.pre_g_128 {
                    None => None,
                    Some(table) => Some(alloc_table(table)?),
                },
            }),
        };
        Ok(EcmultContext { tables })
    }

    /// Release the tables and return to the uninitialized state. No-op on a
    /// context that is not built.
    pub fn clear(&mut self) {
        self.tables = None;
    }

    /// True iff the tables are allocated and populated.
    #[inline]
    pub fn is_built(&self) -> bool {
        self.tables.is_some()
    }

    pub(crate) fn tables(&self) -> Option<&Tables> {
        self.tables.as_ref()
    }
}

/// Allocate owned table storage, reporting failure instead of aborting.
fn alloc_table(entries: &[Affine]) -> Result<Box<[Affine]>, EcmultError> {
    let mut table = Vec::new();
    table
        .try_reserve_exact(entries.len())
        .map_err(|_| EcmultError::Allocation)?;
    table.extend_from_slice(entries);
    Ok(table.into_boxed_slice())
}

/// The odd multiples 1*B, 3*B, ..., (2*count - 1)*B of a non-identity base.
/// All intermediates stay in Jacobian form; the single batch conversion at
/// the end amortizes the one required field inversion over the whole table.
pub(crate) fn odd_multiples(base: &Jacobian, count: usize) -> Vec<Affine> {
    debug_assert!(!base.is_infinity());
    debug_assert!(count >= 1);

    let twice_base = base.double();
    let mut multiples = Vec::with_capacity(count);
    multiples.push(*base);
    for i in 1..count {
        multiples.push(multiples[i - 1] + twice_base);
    }

    Jacobian::batch_normalize(&multiples)
}
