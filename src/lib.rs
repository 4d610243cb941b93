//! Library entry for Operator Engine exposing the report orchestrator,
//! remote clients and operator logic for the binary and integration tests.

pub mod config;
pub mod logic;
pub mod sources;
pub mod util;
