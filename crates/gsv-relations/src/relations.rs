//! Semantic relations between formulas, information states and a model.
//!
//! Local relations (`consistent_in`, `allows`, `supports`, `is_supported_by`)
//! evaluate a formula once against a given state. Global relations quantify
//! over every state definable from the model's worlds (see
//! [`substates`](crate::substates)) and can be spread over worker threads.

use gsv_core::InformationState;
use gsv_eval::log::targets;
use gsv_eval::{normalize, Evaluator, Limits, Logger};
use gsv_types::{EvalResult, Expr, Model};

use crate::config::RelationConfig;
use crate::parallel::find_first;
use crate::similarity::similar;
use crate::substates::states_of_size;

// ══════════════════════════════════════════════════════════════════════════════
// Evaluation context
// ══════════════════════════════════════════════════════════════════════════════

/// What a single per-state check needs: the model, the limits of the query
/// and the logger nested evaluations narrate to.
pub(crate) struct Context<'a> {
    model: &'a dyn Model,
    limits: Limits,
    logger: &'a dyn Logger,
}

impl<'a> Context<'a> {
    pub(crate) fn new(model: &'a dyn Model, limits: Limits, logger: &'a dyn Logger) -> Self {
        Self {
            model,
            limits,
            logger,
        }
    }

    pub(crate) fn model(&self) -> &'a dyn Model {
        self.model
    }

    pub(crate) fn limits(&self) -> &Limits {
        &self.limits
    }

    fn evaluate(&self, expr: &Expr, state: &InformationState) -> EvalResult<InformationState> {
        Evaluator::new(self.model)
            .with_logger(Some(self.logger))
            .with_limits(self.limits.clone())
            .evaluate(expr, state.clone())
    }

    fn consistent(&self, expr: &Expr, state: &InformationState) -> EvalResult<bool> {
        Ok(!self.evaluate(expr, state)?.is_empty())
    }

    fn supports(&self, state: &InformationState, expr: &Expr) -> EvalResult<bool> {
        let update = self.evaluate(expr, state)?;
        Ok(state.subsists_in(&update))
    }

    fn update_sequentially(
        &self,
        mut state: InformationState,
        exprs: &[Expr],
    ) -> EvalResult<InformationState> {
        for expr in exprs {
            state = self.evaluate(expr, &state)?;
        }
        Ok(state)
    }
}

/// Treat an undefined update as "no", let every other failure through.
fn defined_or_false(result: EvalResult<bool>) -> EvalResult<bool> {
    match result {
        Err(e) if e.is_undefined() => Ok(false),
        other => other,
    }
}

fn join_formulas(exprs: &[Expr]) -> String {
    exprs
        .iter()
        .map(Expr::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn verdict_word(holds: bool) -> &'static str {
    if holds {
        "True"
    } else {
        "False"
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Relations
// ══════════════════════════════════════════════════════════════════════════════

/// Relation queries against one model.
///
/// The caller's logger receives the question asked, any counterexample and
/// the verdict. Nested evaluations narrate to it only when
/// [`RelationConfig::log_details`] is set.
pub struct Relations<'a> {
    model: &'a dyn Model,
    logger: &'a dyn Logger,
    config: RelationConfig,
}

impl<'a> Relations<'a> {
    pub fn new(model: &'a dyn Model) -> Self {
        Self {
            model,
            logger: normalize(None),
            config: RelationConfig::default(),
        }
    }

    pub fn with_logger(mut self, logger: Option<&'a dyn Logger>) -> Self {
        self.logger = normalize(logger);
        self
    }

    pub fn with_config(mut self, config: RelationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RelationConfig {
        &self.config
    }

    fn context(&self) -> Context<'a> {
        let nested = if self.config.log_details {
            self.logger
        } else {
            normalize(None)
        };
        Context::new(self.model, self.config.limits(), nested)
    }

    fn report(&self, relation: &str, verdict: EvalResult<bool>) -> EvalResult<bool> {
        match &verdict {
            Ok(holds) => {
                self.logger
                    .log(&format!("Evaluation result: {}", verdict_word(*holds)));
                log::debug!(target: targets::RELATIONS, "{relation}: {}", verdict_word(*holds));
            }
            Err(e) => {
                self.logger
                    .log(&format!("Evaluation failed with the following error:\n{e}"));
                log::debug!(target: targets::RELATIONS, "{relation} failed: {}", e.root_cause());
            }
        }
        verdict
    }

    fn log_state(&self, heading: &str, state: &InformationState) {
        if self.logger.is_enabled() {
            self.logger.log(&format!("{heading}\n{state}"));
        }
    }

    /// The first state with `k` worlds on which `probe` holds.
    fn first_of_size<P>(
        &self,
        context: &Context<'_>,
        k: usize,
        probe: &P,
    ) -> EvalResult<Option<InformationState>>
    where
        P: Fn(&Context<'_>, &InformationState) -> EvalResult<bool> + Sync,
    {
        let mut states = states_of_size(self.model.world_cardinality(), k, self.config.identity);
        log::trace!(target: targets::ENUMERATION, "Checking {} states of size {k}", states.len());
        let hit = find_first(context, &states, self.config.threads, probe)?;
        Ok(hit.map(|index| states.swap_remove(index)))
    }

    /// The first state, by increasing size, on which `probe` holds.
    fn first_in_space<P>(&self, context: &Context<'_>, probe: &P) -> EvalResult<Option<InformationState>>
    where
        P: Fn(&Context<'_>, &InformationState) -> EvalResult<bool> + Sync,
    {
        for k in 0..=self.model.world_cardinality() {
            if let Some(state) = self.first_of_size(context, k, probe)? {
                return Ok(Some(state));
            }
        }
        Ok(None)
    }

    // ── Local relations ───────────────────────────────────────────────────

    /// Whether updating `state` with `expr` leaves some possibility.
    pub fn consistent_in(&self, expr: &Expr, state: &InformationState) -> EvalResult<bool> {
        self.logger.log(&format!(
            "Evaluating formula '{expr}' for consistency with current information state"
        ));
        self.log_state("Current state is:", state);
        let verdict = self.context().consistent(expr, state);
        self.report("consistency", verdict)
    }

    pub fn allows(&self, state: &InformationState, expr: &Expr) -> EvalResult<bool> {
        self.consistent_in(expr, state)
    }

    /// Whether `state` survives its own update with `expr`.
    pub fn supports(&self, state: &InformationState, expr: &Expr) -> EvalResult<bool> {
        self.logger.log(&format!(
            "Evaluating formula '{expr}' for support by current information state"
        ));
        self.log_state("Current state is:", state);
        let verdict = self.context().supports(state, expr);
        self.report("support", verdict)
    }

    pub fn is_supported_by(&self, expr: &Expr, state: &InformationState) -> EvalResult<bool> {
        self.supports(state, expr)
    }

    // ── Global relations ──────────────────────────────────────────────────

    /// Whether, for every number of worlds `k` from 1 up to the model's,
    /// some state with `k` worlds is consistent with `expr`.
    pub fn consistent(&self, expr: &Expr) -> EvalResult<bool> {
        self.logger
            .log(&format!("Evaluating formula '{expr}' for consistency"));
        let witness = |ctx: &Context<'_>, state: &InformationState| -> EvalResult<bool> {
            ctx.consistent(expr, state)
        };
        let verdict = self.every_size_has(expr, "inconsistent with", &witness);
        self.report("consistency", verdict)
    }

    /// Whether, for every number of worlds `k` from 1 up to the model's,
    /// some non-empty state with `k` worlds supports `expr`.
    pub fn coherent(&self, expr: &Expr) -> EvalResult<bool> {
        self.logger
            .log(&format!("Evaluating formula '{expr}' for coherence"));
        let witness = |ctx: &Context<'_>, state: &InformationState| -> EvalResult<bool> {
            Ok(!state.is_empty() && ctx.supports(state, expr)?)
        };
        let verdict = self.every_size_has(expr, "incoherent with", &witness);
        self.report("coherence", verdict)
    }

    fn every_size_has<P>(&self, expr: &Expr, failure: &str, probe: &P) -> EvalResult<bool>
    where
        P: Fn(&Context<'_>, &InformationState) -> EvalResult<bool> + Sync,
    {
        let context = self.context();
        for k in 1..=self.model.world_cardinality() {
            if self.first_of_size(&context, k, probe)?.is_none() {
                self.logger.log(&format!(
                    "Formula '{expr}' is {failure} every information state with {k} worlds"
                ));
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// General entailment; see [`entails_g`](Self::entails_g).
    pub fn entails(&self, premises: &[Expr], conclusion: &Expr) -> EvalResult<bool> {
        self.entails_g(premises, conclusion)
    }

    /// Whether updating the ignorant state with the premises, in order,
    /// yields a state that supports the conclusion.
    pub fn entails_0(&self, premises: &[Expr], conclusion: &Expr) -> EvalResult<bool> {
        self.logger.log(&format!(
            "Evaluating entailment relative to the ignorant state\n- Premises: {}\n- Conclusion: {conclusion}",
            join_formulas(premises)
        ));
        let verdict = self.supports_after_premises(premises, conclusion);
        self.report("entailment at the ignorant state", verdict)
    }

    fn supports_after_premises(&self, premises: &[Expr], conclusion: &Expr) -> EvalResult<bool> {
        let context = self.context();
        let ignorant = InformationState::create_with_identity(self.model, self.config.identity);
        let updated = context.update_sequentially(ignorant, premises)?;
        let holds = context.supports(&updated, conclusion)?;
        if !holds {
            self.log_state("The ignorant state updated with the premises does not support the conclusion:", &updated);
        }
        Ok(holds)
    }

    /// Whether, for every state, updating it with the premises in order
    /// yields a state that supports the conclusion.
    ///
    /// States on which a premise update is undefined are not
    /// counterexamples.
    pub fn entails_g(&self, premises: &[Expr], conclusion: &Expr) -> EvalResult<bool> {
        self.logger.log(&format!(
            "Evaluating entailment relative to every state\n- Premises: {}\n- Conclusion: {conclusion}",
            join_formulas(premises)
        ));
        let counterexample = |ctx: &Context<'_>, state: &InformationState| -> EvalResult<bool> {
            let updated = match ctx.update_sequentially(state.clone(), premises) {
                Ok(updated) => updated,
                Err(e) if e.is_undefined() => return Ok(false),
                Err(e) => return Err(e),
            };
            Ok(!ctx.supports(&updated, conclusion)?)
        };
        let verdict = self.no_counterexample("argument", &counterexample);
        self.report("entailment", verdict)
    }

    /// Whether every state that supports all the premises also supports the
    /// conclusion.
    ///
    /// States on which a premise update is undefined do not support it.
    pub fn entails_c(&self, premises: &[Expr], conclusion: &Expr) -> EvalResult<bool> {
        self.logger.log(&format!(
            "Evaluating entailment as support relative to every state\n- Premises: {}\n- Conclusion: {conclusion}",
            join_formulas(premises)
        ));
        let counterexample = |ctx: &Context<'_>, state: &InformationState| -> EvalResult<bool> {
            for premise in premises {
                if !defined_or_false(ctx.supports(state, premise))? {
                    return Ok(false);
                }
            }
            Ok(!ctx.supports(state, conclusion)?)
        };
        let verdict = self.no_counterexample("argument", &counterexample);
        self.report("entailment as support", verdict)
    }

    /// Whether `lhs` and `rhs` update every state to similar states.
    pub fn equivalent(&self, lhs: &Expr, rhs: &Expr) -> EvalResult<bool> {
        self.logger.log(&format!(
            "Evaluating equivalence between\n- LHS formula: {lhs}\n- RHS formula: {rhs}"
        ));
        let counterexample = |ctx: &Context<'_>, state: &InformationState| -> EvalResult<bool> {
            let lhs_update = ctx.evaluate(lhs, state)?;
            let rhs_update = ctx.evaluate(rhs, state)?;
            Ok(!similar(&lhs_update, &rhs_update)?)
        };
        let verdict = self.no_counterexample("equivalence", &counterexample);
        self.report("equivalence", verdict)
    }

    fn no_counterexample<P>(&self, claim: &str, probe: &P) -> EvalResult<bool>
    where
        P: Fn(&Context<'_>, &InformationState) -> EvalResult<bool> + Sync,
    {
        let context = self.context();
        match self.first_in_space(&context, probe)? {
            Some(state) => {
                log::debug!(target: targets::RELATIONS, "Counterexample to the {claim}: {:?}", state.worlds());
                self.log_state(
                    &format!("The following information state provides a counterexample to the {claim}:"),
                    &state,
                );
                Ok(false)
            }
            None => Ok(true),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Entry points
// ══════════════════════════════════════════════════════════════════════════════

pub fn consistent_in(expr: &Expr, state: &InformationState, model: &dyn Model) -> EvalResult<bool> {
    Relations::new(model).consistent_in(expr, state)
}

pub fn allows(state: &InformationState, expr: &Expr, model: &dyn Model) -> EvalResult<bool> {
    Relations::new(model).allows(state, expr)
}

pub fn supports(state: &InformationState, expr: &Expr, model: &dyn Model) -> EvalResult<bool> {
    Relations::new(model).supports(state, expr)
}

pub fn is_supported_by(expr: &Expr, state: &InformationState, model: &dyn Model) -> EvalResult<bool> {
    Relations::new(model).is_supported_by(expr, state)
}

pub fn consistent(expr: &Expr, model: &dyn Model) -> EvalResult<bool> {
    Relations::new(model).consistent(expr)
}

pub fn coherent(expr: &Expr, model: &dyn Model) -> EvalResult<bool> {
    Relations::new(model).coherent(expr)
}

pub fn entails(premises: &[Expr], conclusion: &Expr, model: &dyn Model) -> EvalResult<bool> {
    Relations::new(model).entails(premises, conclusion)
}

pub fn entails_0(premises: &[Expr], conclusion: &Expr, model: &dyn Model) -> EvalResult<bool> {
    Relations::new(model).entails_0(premises, conclusion)
}

pub fn entails_g(premises: &[Expr], conclusion: &Expr, model: &dyn Model) -> EvalResult<bool> {
    Relations::new(model).entails_g(premises, conclusion)
}

pub fn entails_c(premises: &[Expr], conclusion: &Expr, model: &dyn Model) -> EvalResult<bool> {
    Relations::new(model).entails_c(premises, conclusion)
}

pub fn equivalent(lhs: &Expr, rhs: &Expr, model: &dyn Model) -> EvalResult<bool> {
    Relations::new(model).equivalent(lhs, rhs)
}
