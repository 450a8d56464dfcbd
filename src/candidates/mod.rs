//! Candidate identifier generation
//!
//! This module produces the exhaustive, ordered space of fixed-length
//! identifiers over an alphabet and resolves each identifier against the
//! probe URL template.
//!
//! # Example
//!
//! ```
//! use profile_sweep::candidates::generate;
//!
//! let all: Vec<String> = generate("ab", 2).unwrap().collect();
//! assert_eq!(all, vec!["aa", "ab", "ba", "bb"]);
//! ```

mod generator;

pub use generator::{generate, space_size, Candidates};

/// Resolves a candidate identifier against the base URL template
///
/// The template is a plain prefix: the probe URL is the base followed by the
/// identifier, with no separator or escaping added.
pub fn probe_url(base_url: &str, candidate: &str) -> String {
    format!("{}{}", base_url, candidate)
}
