//! Shared plumbing: the error type, length/bounds macros and NaN-aware
//! slice helpers used by every numeric module.

pub mod errors;
pub mod general;
pub mod macros;
