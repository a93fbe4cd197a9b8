//! Property-based tests for the pure search components.
