//! Exploit-alert risk evaluation.
//!
//! This crate provides:
//! - The [`Evaluator`] contract with fail-closed error conversion
//! - [`ChainedEvaluator`], an ordered short-circuiting composite
//! - Leaf checks: entity labels, null-address victim, gas cost, account age
//! - Collaborator traits with Arkham and JSON-RPC backed implementations

pub mod checks;
pub mod evaluator;
pub mod pipeline;
pub mod sources;

pub use evaluator::{ChainedEvaluator, EvalError, Evaluator};
pub use pipeline::{standard_chain, Collaborators, PipelineSettings};
