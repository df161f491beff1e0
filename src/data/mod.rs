//! Data loading, validation and partitioning
//!
//! This module turns CSV input into validated [`TabularDataset`]s and splits
//! them into reproducible train/test partitions.

pub mod csv;
pub mod split;

pub use self::csv::*;
pub use self::split::*;
