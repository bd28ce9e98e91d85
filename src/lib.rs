//! Numeric kernel for gene set enrichment analysis.
//!
//! Vectors and matrices are assembled through builders and then frozen into
//! immutable values whose aggregates are computed once:
//!
//! ```
//! use gsea_kernel::core::base::vector::VectorBuilder;
//!
//! let mut builder = VectorBuilder::from_vec(vec![3.0, f32::NAN, 1.0]);
//! builder.sort();
//! let v = builder.freeze();
//!
//! assert_eq!(v.min(), 1.0);
//! assert_eq!(v.nan_less().len(), 2);
//! ```
//!
//! The library emits `tracing` events but never installs a subscriber.

pub mod core;
pub mod utils;

pub use crate::core::base::matrix::{MatrixBuilder, NumericMatrix};
pub use crate::core::base::random::SeededRandomSource;
pub use crate::core::base::ranking::IndexedElement;
pub use crate::core::base::vector::{NumericVector, VectorBuilder};
pub use crate::utils::errors::{KernelError, KernelResult};
