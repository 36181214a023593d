// Library target: the practice engine plus its storage and config glue.
// The binary in main.rs and the criterion benchmarks both build on it.

pub mod app;
pub mod config;
pub mod dictionary;
pub mod engine;
pub mod error;
pub mod event;
pub mod session;
pub mod store;

pub use app::{RoundHandle, Trainer};
pub use error::EngineError;
