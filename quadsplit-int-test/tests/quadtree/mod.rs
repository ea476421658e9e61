//! Loose quadtree integration tests.
//!
//! These tests drive the operator class through the in-memory tree and by
//! hand, and check search results against a linear scan.

mod operator_class_test;
mod search_test;
