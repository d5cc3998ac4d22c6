//! R-Tree integration tests.
//!
//! These tests drive every geometry and split combination through the
//! public API and check the structure after each step.

mod delete_test;
mod insert_test;
mod query_test;
