//! GSV update-semantics evaluator.
//!
//! Formulas of Quantified Modal Logic are evaluated as *updates*: an
//! [`Evaluator`] maps a formula and an information state to the state that
//! results from accepting the formula, or to an [`EvalError`] naming every
//! enclosing formula on the way to the failure.
//!
//! # Example
//!
//! ```
//! use gsv_core::InformationState;
//! use gsv_eval::evaluate;
//! use gsv_types::{Expr, TableModel, Term};
//!
//! let model = TableModel::new(2, 1).with_predicate("P", vec![vec![vec![0]], vec![]]);
//! let state = InformationState::create(&model);
//! let formula = Expr::exists("x", Expr::predication("P", vec![Term::variable("x")]));
//!
//! let update = evaluate(&formula, &state, &model).unwrap();
//! assert_eq!(update.worlds().into_iter().collect::<Vec<_>>(), vec![0]);
//! ```
//!
//! [`EvalError`]: gsv_types::EvalError

pub mod config;
pub mod evaluator;
pub mod log;
pub mod logger;

pub use config::{CancelToken, Limits};
pub use evaluator::{evaluate, evaluate_with, Evaluator};
pub use logger::{normalize, BufferLogger, Logger, NullLogger, TraceLogger};
