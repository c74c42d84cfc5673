// Test library for the finance client
// Shared fixtures for the HTTP-level tests


pub use test_utils::*;
