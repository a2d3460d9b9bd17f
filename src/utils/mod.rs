//! Utility modules supporting catalog searches.
//!
//! - [`matches`] / [`matches_with_tolerance`]: tolerant comparison of artist and album names
//! - [`levenshtein`]: edit distance over Unicode scalar values
//! - [`HttpClient`]: shared HTTP client configured from [`HttpConfig`](crate::config::HttpConfig)
//!
//! # Matching
//!
//! ```rust
//! use album_art::utils::{levenshtein, matches, matches_with_tolerance};
//!
//! assert!(matches("Phish", "phish"));
//! assert!(matches("Rift", "Rift (Remastered)"));
//! assert_eq!(levenshtein("kitten", "sitting"), 3);
//! assert!(!matches_with_tolerance("kitten", "sitting", 2));
//! ```

mod http;
mod matching;

pub use http::HttpClient;
pub use matching::{levenshtein, matches, matches_with_tolerance, DEFAULT_TOLERANCE};
