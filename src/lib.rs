//! Test-support package hosting workspace-level integration tests.
//! See `tests/` at the repository root.
