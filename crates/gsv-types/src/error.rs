//! Error types for model lookups and evaluation.

use thiserror::Error;

use crate::model::World;

/// A term or predicate has no interpretation in the model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Non-existent term: {0}")]
    UndefinedTerm(String),

    #[error("Non-existent predicate: {0}")]
    UndefinedPredicate(String),

    /// The symbol is known, but the model has no entry for this world.
    #[error("{name} is not interpreted at world w{world}")]
    UnknownWorld { name: String, world: World },
}

/// Errors that can occur while updating an information state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A variable with no peg: no anaphoric antecedent or binding quantifier.
    #[error("Variable {0} has no anaphoric antecedent or binding quantifier")]
    UnknownVariable(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    /// The step budget of a single evaluation ran out.
    #[error("evaluation exceeded its gas limit of {limit} steps")]
    GasExhausted { limit: u64 },

    #[error("evaluation exceeded its time limit")]
    DeadlineExceeded,

    #[error("evaluation was cancelled")]
    Cancelled,

    /// Breadcrumb: a failure inside the evaluation of `formula`.
    #[error("In evaluating formula {formula}:\n{source}")]
    InFormula {
        formula: String,
        source: Box<EvalError>,
    },
}

impl EvalError {
    /// Wrap `self` with the textual form of the enclosing formula.
    pub fn in_formula(self, formula: impl ToString) -> Self {
        Self::InFormula {
            formula: formula.to_string(),
            source: Box::new(self),
        }
    }

    /// The failure at the end of the breadcrumb trail.
    pub fn root_cause(&self) -> &EvalError {
        let mut current = self;
        while let Self::InFormula { source, .. } = current {
            current = source;
        }
        current
    }

    /// True when the update is undefined: an unbound variable or a term or
    /// predicate the model does not interpret. Limit failures are not.
    pub fn is_undefined(&self) -> bool {
        matches!(
            self.root_cause(),
            Self::UnknownVariable(_) | Self::Model(_)
        )
    }

    /// Formulas on the breadcrumb trail, outermost first.
    pub fn trail(&self) -> Vec<&str> {
        let mut formulas = Vec::new();
        let mut current = self;
        while let Self::InFormula { formula, source } = current {
            formulas.push(formula.as_str());
            current = source;
        }
        formulas
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;
