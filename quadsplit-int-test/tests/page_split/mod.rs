//! Multi-column page split integration tests.

mod page_split_test;
