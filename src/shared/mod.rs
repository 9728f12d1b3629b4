//! Cross-cutting pieces: configuration and the retry executor.

pub mod config;
pub mod retry;

pub use retry::{
    RetryCancelled, RetryExecutor, RetryPolicy, Sleeper, TokioSleeper, TransientClassifier,
};
