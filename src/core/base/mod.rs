//! Numeric building blocks: immutable vectors and matrices, ranking,
//! distances, statistics and seeded sampling.

pub mod cors_similarity;
pub mod matrix;
pub mod random;
pub mod ranking;
pub mod stats;
pub mod vector;
