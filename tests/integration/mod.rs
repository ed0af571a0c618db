//! Integration test suite for mdrepo
//!
//! End-to-end scenarios against real temporary content trees: indexing,
//! querying, taxonomy, directory assembly, cache degradation, writing, and
//! change watching.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! Tests are organized by functionality area:
//! - **end_to_end**: full index-and-query flows over a blog fixture
//! - **queries**: filtering, sorting, and pagination through the provider
//! - **directory_tree**: tree assembly, index documents, locale filtering
//! - **cache_behavior**: stale-on-error, refresh, and watcher invalidation
//! - **writing**: the writer capability and its cache post-conditions

mod common;

mod cache_behavior;
mod directory_tree;
mod end_to_end;
mod queries;
mod writing;
