//! Maximal-pair substring matching
//!
//! ## Architecture
//!
//! - `enumerate`: Bottom-up maximal pair enumeration over lcp-intervals
//! - `query`: Query mode, pattern search in the database suffix array
//! - `selfmatch`: Self mode over `db ++ SEPARATOR ++ query`, and repeats
//!   within one indexed collection
//! - `validate`: Randomized agreement check between the two modes
//! - `types`: Match records and configuration
//!
//! Both modes report the same set of [`Substringmatch`]es for the same
//! inputs; `validate` checks exactly that.

pub mod enumerate;
pub mod query;
pub mod selfmatch;
pub mod types;
pub mod validate;

pub use enumerate::{enumerate_maxpairs, MaxpairsEnumerator};
pub use query::sarr_query_substring_match;
pub use selfmatch::{
    encseq_repeats, sarr_self_substring_match, sep_to_seqnum, sequence_to_mark_positions,
    SelfMatchCollector,
};
pub use types::*;
pub use validate::{check_sample, test_maxpairs, SampleCheck, ValidationSummary};
