//! Shared types for the GSV update-semantics evaluator.
//!
//! This crate defines the QML expression AST consumed by the evaluator,
//! the abstract [`Model`] interface (plus a table-backed reference model),
//! and the error types used across the evaluation and relation layers.

mod error;
pub mod ast;
pub mod model;

pub use ast::{BinaryOp, Expr, Quantifier, Term, UnaryOp};
pub use error::{EvalError, EvalResult, ModelError};
pub use model::{Extension, Individual, Model, TableModel, Tuple, World};
