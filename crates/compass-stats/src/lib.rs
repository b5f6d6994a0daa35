//! Numeric primitives for the Compass recommender.
//!
//! This crate provides the small set of statistical and linear-algebra tools
//! used by the dataset preparer and the query engine:
//!
//! - **Descriptive statistics**: min, max, mean, median, variance and standard deviation
//! - **Min-max ranges**: map raw values into `[0, 1]` with a defined constant fallback
//! - **Vector math**: dot product, magnitude, cosine similarity
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing a column of values
//! - [`range`]: Min-max range fitting and scaling
//! - [`vector`]: Dense `f64` vector operations
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use compass_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Scaling into `[0, 1]`
//!
//! ```
//! use compass_stats::range::MinMaxRange;
//!
//! let range = MinMaxRange::fit([10.0, 20.0, 30.0]).unwrap();
//! assert_eq!(range.scale(20.0), 0.5);
//! ```
//!
//! ## Comparing vectors
//!
//! ```
//! use compass_stats::vector;
//!
//! let sim = vector::cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]);
//! assert_eq!(sim, 1.0);
//! ```

pub mod descriptive;
pub mod range;
pub mod vector;
