//! # Lexdawg Library
//!
//! Build and query two-way DAWG (directed acyclic word graph) lexicons.
//! * `trie` builds the word graph in memory and compresses it into a DAWG
//! * `dawg` defines the packed on-disk format, the writer, and the reader
//! * `lexicon` reads plain-text word lists into a trie
//!
//! The graph holds every word twice: once forward, and once as the set of
//! reversed part words (reversed prefixes), so a loaded DAWG can answer both
//! `is_word` and `is_reverse_part_word`.
//!
//! ## Build Example
//!
//! ```rs
//! use lexdawg::trie::Trie;
//! let mut trie = Trie::new();
//! trie.add_word("BATH").expect("add failed");
//! while !trie.compress().expect("compress failed") {
//!     // caller may do other work between steps
//! }
//! trie.save_as_dawg("bath.lxd","tiny").expect("save failed");
//! ```
//!
//! ## Query Example
//!
//! ```rs
//! use lexdawg::dawg::Dawg;
//! let dawg = Dawg::initialize("bath.lxd").expect("load failed");
//! assert!(dawg.is_word("BATH"));
//! assert!(dawg.is_reverse_part_word("TAB"));
//! ```

mod tools;
pub mod trie;
pub mod dawg;
pub mod lexicon;

type DYNERR = Box<dyn std::error::Error>;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// Lexicon graph errors
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("words can no longer be added")]
    AddingFrozen,
    #[error("graph is already compressed")]
    AlreadyCompressed,
    #[error("graph is not compressed yet")]
    NotCompressed,
    #[error("node count mismatch")]
    NodeCountMismatch,
    #[error("node capacity exceeded")]
    CapacityExceeded,
    #[error("allocation exceeds block size")]
    OversizeAllocation,
    #[error("file too short")]
    FileTooShort,
    #[error("header does not match content")]
    HeaderMismatch,
    #[error("too few nodes")]
    TooFewNodes
}
