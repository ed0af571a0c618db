//! The query engine: predicate filtering and stable sorting.

pub mod filter;
pub mod sort;

pub use filter::ContentFilter;
pub use sort::ContentSorter;
