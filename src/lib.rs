//! Double-base scalar multiplication for secp256k1.
//!
//! This crate computes R = na*A + ng*G, the operation at the core of ECDSA
//! signature verification, for the fixed generator G. A precomputation
//! context built once per process holds tables of odd multiples of G (and of
//! 2^128 * G when the endomorphism optimization is active); every call recodes
//! the scalars into windowed non-adjacent form and scans both digit sequences
//! jointly against the precomputed tables and a small per-call table for A.
//! Field, scalar and curve-point arithmetic are provided by the sibling
//! modules in this crate.

mod affine;
mod ecmult;
mod field;
mod group;
mod jacobian;
mod precompute;
mod random;
mod scalar;

pub use affine::Affine;
pub use field::FieldElement;
pub use group::{Group, ScalarBits};
pub use jacobian::Jacobian;
pub use precompute::{EcmultContext, EcmultError};
pub use random::RandomField;
pub use scalar::Scalar;
