//! Cross-crate integration tests for the allocation core live in
//! `tests/`. This library target is intentionally empty.
