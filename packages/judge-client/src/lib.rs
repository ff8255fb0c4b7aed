pub mod client;
pub mod error;
pub mod models;

pub use client::{Judge0Client, JudgeClient};
pub use error::JudgeClientError;
pub use models::{Evaluation, EvaluationRequest};
