//! The update procedure: evaluates a formula against an information state.

use gsv_core::{InformationState, Possibility};
use gsv_types::ast::*;
use gsv_types::{EvalError, EvalResult, Individual, Model, Tuple};
use std::time::Instant;

use crate::config::Limits;
use crate::log::targets;
use crate::logger::{normalize, Logger};

/// Recursive evaluator over the QML expression tree.
///
/// Every recursive step consumes one unit of gas and checks the deadline
/// and cancellation token of its [`Limits`]. Gas is reset at the start of
/// each top-level [`evaluate`](Self::evaluate) call.
pub struct Evaluator<'a> {
    model: &'a dyn Model,
    logger: &'a dyn Logger,
    limits: Limits,
    /// Steps taken by the current top-level evaluation.
    gas: u64,
}

impl<'a> Evaluator<'a> {
    /// An evaluator over `model` with no trace output and no limits.
    pub fn new(model: &'a dyn Model) -> Self {
        Self {
            model,
            logger: normalize(None),
            limits: Limits::default(),
            gas: 0,
        }
    }

    pub fn with_logger(mut self, logger: Option<&'a dyn Logger>) -> Self {
        self.logger = normalize(logger);
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn model(&self) -> &'a dyn Model {
        self.model
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Steps taken by the most recent top-level evaluation.
    pub fn gas_used(&self) -> u64 {
        self.gas
    }

    /// Update `state` with `expr`.
    pub fn evaluate(&mut self, expr: &Expr, state: InformationState) -> EvalResult<InformationState> {
        self.gas = 0;
        let result = self.eval(expr, state);
        if let Err(e) = &result {
            log::debug!(target: targets::EVALUATION, "Evaluation of {expr} failed after {} steps: {}", self.gas, e.root_cause());
        }
        result
    }

    /// Consume one unit of gas and check the remaining limits.
    fn tick(&mut self) -> EvalResult<()> {
        self.gas += 1;
        if let Some(limit) = self.limits.gas_limit {
            if self.gas > limit {
                return Err(EvalError::GasExhausted { limit });
            }
        }
        if self.limits.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(EvalError::DeadlineExceeded);
        }
        if self.limits.cancel.as_ref().is_some_and(|token| token.is_cancelled()) {
            return Err(EvalError::Cancelled);
        }
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Dispatch
    // ══════════════════════════════════════════════════════════════════════

    fn eval(&mut self, expr: &Expr, state: InformationState) -> EvalResult<InformationState> {
        // Rendered only for the trace; the error path renders its own copy.
        let formula = if self.logger.is_enabled() {
            expr.to_string()
        } else {
            String::new()
        };
        self.start_log(&formula, &state);

        let result = self.tick().and_then(|()| self.dispatch(expr, &formula, state));
        let result = match result {
            Ok(output) => {
                self.end_log(&formula, &output);
                Ok(output)
            }
            Err(e) => Err(e.in_formula(expr)),
        };

        self.logger.decrease_depth();
        result
    }

    fn dispatch(
        &mut self,
        expr: &Expr,
        formula: &str,
        state: InformationState,
    ) -> EvalResult<InformationState> {
        match expr {
            Expr::Unary { op, scope } => self.eval_unary(*op, scope, formula, state),
            Expr::Binary { op, lhs, rhs } => match op {
                BinaryOp::Conjunction => self.eval_conjunction(lhs, rhs, formula, state),
                BinaryOp::Disjunction => self.eval_disjunction(lhs, rhs, formula, state),
                BinaryOp::Conditional => self.eval_conditional(lhs, rhs, formula, state),
            },
            Expr::Quantification {
                quantifier,
                variable,
                scope,
            } => match quantifier {
                Quantifier::Existential => self.eval_existential(variable, scope, formula, state),
                Quantifier::Universal => self.eval_universal(variable, scope, formula, state),
            },
            Expr::Identity { lhs, rhs } => self.eval_identity(lhs, rhs, state),
            Expr::Predication {
                predicate,
                arguments,
            } => self.eval_predication(predicate, arguments, state),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Unary operators
    // ══════════════════════════════════════════════════════════════════════

    fn eval_unary(
        &mut self,
        op: UnaryOp,
        scope: &Expr,
        formula: &str,
        mut state: InformationState,
    ) -> EvalResult<InformationState> {
        self.logger.log("Calculating prejacent update");
        let prejacent = self.eval(scope, state.clone())?;
        self.returning_to(formula);

        match op {
            UnaryOp::Negation => {
                self.logger.log("Filtering with negation of the prejacent");
                filter_negation(&mut state, &prejacent);
            }
            UnaryOp::EpistemicPossibility => {
                self.logger.log("Applying test for epistemic possibility");
                if prejacent.is_empty() {
                    self.logger.log("compatibility test failed");
                    state.clear();
                } else {
                    self.logger.log("compatibility test passed");
                }
            }
            UnaryOp::EpistemicNecessity => {
                self.logger.log("Applying test for epistemic necessity");
                if state.subsists_in(&prejacent) {
                    self.logger.log("support test passed");
                } else {
                    self.logger.log("support test failed");
                    state.clear();
                }
            }
        }
        Ok(state)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Binary connectives
    // ══════════════════════════════════════════════════════════════════════

    fn eval_conjunction(
        &mut self,
        lhs: &Expr,
        rhs: &Expr,
        formula: &str,
        state: InformationState,
    ) -> EvalResult<InformationState> {
        self.logger.log("Performing sequential update");
        self.logger.log("Updating with LHS");
        let lhs_update = self.eval(lhs, state)?;
        self.returning_to(formula);

        self.logger.log("Updating with RHS");
        let rhs_update = self.eval(rhs, lhs_update)?;
        self.returning_to(formula);
        Ok(rhs_update)
    }

    /// Keep the possibilities that survive either the left disjunct, or the
    /// right disjunct evaluated under the negation of the left.
    fn eval_disjunction(
        &mut self,
        lhs: &Expr,
        rhs: &Expr,
        formula: &str,
        mut state: InformationState,
    ) -> EvalResult<InformationState> {
        self.logger.log("Calculating hypothetical LHS update");
        let hypothetical_lhs = self.eval(lhs, state.clone())?;
        self.returning_to(formula);

        self.logger.log("Assuming negation of LHS");
        let mut negated_lhs = state.clone();
        filter_negation(&mut negated_lhs, &hypothetical_lhs);

        self.logger.log("Calculating hypothetical RHS update");
        let hypothetical_rhs = self.eval(rhs, negated_lhs)?;
        self.returning_to(formula);

        self.logger.log("Filtering for disjunction");
        state.retain(|p| hypothetical_lhs.contains(p) || hypothetical_rhs.contains(p));
        Ok(state)
    }

    /// Keep `p` unless it survives the antecedent with some descendant that
    /// does not survive the consequent.
    fn eval_conditional(
        &mut self,
        lhs: &Expr,
        rhs: &Expr,
        formula: &str,
        mut state: InformationState,
    ) -> EvalResult<InformationState> {
        self.logger.log("Calculating hypothetical LHS update");
        let hypothetical_lhs = self.eval(lhs, state.clone())?;
        self.returning_to(formula);

        self.logger.log("Calculating hypothetical RHS update");
        let hypothetical_consequent = self.eval(rhs, hypothetical_lhs.clone())?;
        self.returning_to(formula);

        self.logger.log("Filtering for conditional");
        state.retain(|p| {
            !p.subsists_in(&hypothetical_lhs)
                || p
                    .descendants_in(&hypothetical_lhs)
                    .all(|descendant| descendant.subsists_in(&hypothetical_consequent))
        });
        Ok(state)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Quantifiers
    // ══════════════════════════════════════════════════════════════════════

    fn eval_existential(
        &mut self,
        variable: &str,
        scope: &Expr,
        formula: &str,
        state: InformationState,
    ) -> EvalResult<InformationState> {
        let mut output = InformationState::with_identity(state.identity());
        for d in 0..self.model.domain_cardinality() {
            let variant = self.association(variable, d, scope, &state);
            let update = self.eval(scope, variant)?;
            self.finished_association(variable, d, scope);
            output.union(update);
        }
        self.returning_to(formula);
        Ok(output)
    }

    fn eval_universal(
        &mut self,
        variable: &str,
        scope: &Expr,
        formula: &str,
        mut state: InformationState,
    ) -> EvalResult<InformationState> {
        let domain = self.model.domain_cardinality();
        let mut hypothetical_updates = Vec::with_capacity(domain);
        for d in 0..domain {
            let variant = self.association(variable, d, scope, &state);
            hypothetical_updates.push(self.eval(scope, variant)?);
            self.finished_association(variable, d, scope);
        }
        self.returning_to(formula);

        self.logger.log("Filtering for universal quantification");
        state.retain(|p| hypothetical_updates.iter().all(|update| p.subsists_in(update)));
        Ok(state)
    }

    fn association(
        &self,
        variable: &str,
        individual: Individual,
        scope: &Expr,
        state: &InformationState,
    ) -> InformationState {
        self.logger.log(&format!(
            "Evaluating {scope} with respect to association {variable} -> e{individual}"
        ));
        state.update(variable, individual)
    }

    fn finished_association(&self, variable: &str, individual: Individual, scope: &Expr) {
        self.logger.log(&format!(
            "Finished evaluation of {scope} with respect to association {variable} -> e{individual}"
        ));
    }

    // ══════════════════════════════════════════════════════════════════════
    // Atomic formulas
    // ══════════════════════════════════════════════════════════════════════

    fn eval_identity(
        &mut self,
        lhs: &Term,
        rhs: &Term,
        mut state: InformationState,
    ) -> EvalResult<InformationState> {
        let model = self.model;
        self.logger.log("Filtering for identity");
        state.try_retain(|p| Ok(denotation(model, lhs, p)? == denotation(model, rhs, p)?))?;
        Ok(state)
    }

    fn eval_predication(
        &mut self,
        predicate: &str,
        arguments: &[Term],
        mut state: InformationState,
    ) -> EvalResult<InformationState> {
        let model = self.model;
        self.logger.log("Filtering for predication");
        state.try_retain(|p| {
            let tuple = arguments
                .iter()
                .map(|argument| denotation(model, argument, p))
                .collect::<EvalResult<Tuple>>()?;
            Ok(model.predicate_interpretation(predicate, p.world())?.contains(&tuple))
        })?;
        Ok(state)
    }

    // ── Trace helpers ─────────────────────────────────────────────────────

    fn start_log(&self, formula: &str, state: &InformationState) {
        self.logger.log(&format!("===> Starting evaluation of {formula}"));
        self.logger.increase_depth();
        self.log_state("Input information state is:", state);
    }

    fn end_log(&self, formula: &str, state: &InformationState) {
        self.logger.log(&format!("Finished the evaluation of {formula}"));
        self.log_state("Output information state is:", state);
    }

    fn returning_to(&self, formula: &str) {
        self.logger.log(&format!("Returning to evaluation of {formula}"));
    }

    fn log_state(&self, heading: &str, state: &InformationState) {
        if self.logger.is_enabled() {
            let rendered = state.render(&self.logger.current_indent());
            self.logger.log(&format!("{heading}\n{rendered}"));
        }
    }
}

/// Remove from `state` every possibility that subsists in `prejacent`.
fn filter_negation(state: &mut InformationState, prejacent: &InformationState) {
    state.retain(|p| !p.subsists_in(prejacent));
}

/// The individual `term` denotes at `p`: a variable through its peg, a
/// constant through the model at `p`'s world.
fn denotation(model: &dyn Model, term: &Term, p: &Possibility) -> EvalResult<Individual> {
    match term {
        Term::Variable(variable) => p.denotation(variable),
        Term::Constant(constant) => Ok(model.term_interpretation(constant, p.world())?),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Entry points
// ══════════════════════════════════════════════════════════════════════════════

/// Update `state` with `expr` relative to `model`, with no limits and no
/// trace output.
pub fn evaluate(
    expr: &Expr,
    state: &InformationState,
    model: &dyn Model,
) -> EvalResult<InformationState> {
    Evaluator::new(model).evaluate(expr, state.clone())
}

/// Like [`evaluate`], narrating to `logger` and bounded by `limits`.
pub fn evaluate_with(
    expr: &Expr,
    state: &InformationState,
    model: &dyn Model,
    logger: Option<&dyn Logger>,
    limits: Limits,
) -> EvalResult<InformationState> {
    Evaluator::new(model)
        .with_logger(logger)
        .with_limits(limits)
        .evaluate(expr, state.clone())
}
