//! Small runtime utilities shared by the orchestrator and callers.

pub mod debounce;
