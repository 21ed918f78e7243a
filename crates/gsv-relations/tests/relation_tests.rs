//! Integration tests for the GSV semantic relations.
//!
//! Tests key relation features:
//! - local consistency and support
//! - global consistency and coherence
//! - entailment at the ignorant state, at every state, and as support
//! - equivalence up to peg renaming
//! - error propagation and undefined premises
//! - limits and cancellation
//! - relation-level trace output
//! - agreement between sequential and parallel checking
//! - models loaded from JSON

use gsv_core::{Identity, InformationState};
use gsv_eval::{BufferLogger, CancelToken};
use gsv_relations::*;
use gsv_types::{EvalError, Expr, TableModel, Term};
use proptest::prelude::*;

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

/// Two worlds, one individual; `P` holds of e0 at w0 only; `c` denotes e0.
fn single_model() -> TableModel {
    TableModel::new(2, 1)
        .with_rigid_term("c", 0)
        .with_predicate("P", vec![vec![vec![0]], vec![]])
}

/// Four worlds, two individuals.
fn wide_model() -> TableModel {
    TableModel::new(4, 2)
        .with_rigid_term("c", 0)
        .with_predicate("P", vec![vec![vec![0], vec![1]], vec![vec![0]], vec![vec![1]], vec![]])
        .with_predicate("Q", vec![vec![vec![0]], vec![], vec![vec![1]], vec![vec![0]]])
}

fn pred(name: &str, term: Term) -> Expr {
    Expr::predication(name, vec![term])
}

fn p_c() -> Expr {
    pred("P", Term::constant("c"))
}

fn x() -> Term {
    Term::variable("x")
}

fn not(expr: Expr) -> Expr {
    Expr::negation(expr)
}

fn with_threads(model: &TableModel, threads: usize) -> Relations<'_> {
    Relations::new(model).with_config(RelationConfig::default().with_threads(threads))
}

// ══════════════════════════════════════════════════════════════════════════════
// Local relations
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn local_consistency_and_support() {
    let model = single_model();
    let ignorant = InformationState::create(&model);
    let only_w1 = InformationState::from_worlds([1], Identity::Structural);

    assert_eq!(consistent_in(&p_c(), &ignorant, &model), Ok(true));
    assert_eq!(consistent_in(&p_c(), &only_w1, &model), Ok(false));
    assert_eq!(allows(&ignorant, &p_c(), &model), Ok(true));

    assert_eq!(supports(&ignorant, &p_c(), &model), Ok(false));
    assert_eq!(supports(&only_w1, &not(p_c()), &model), Ok(true));
    assert_eq!(is_supported_by(&not(p_c()), &only_w1, &model), Ok(true));
}

#[test]
fn local_relation_propagates_errors() {
    let model = single_model();
    let ignorant = InformationState::create(&model);
    let err = supports(&ignorant, &pred("Q", Term::constant("c")), &model).unwrap_err();
    assert!(err.is_undefined());
}

// ══════════════════════════════════════════════════════════════════════════════
// Consistency & coherence
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn existential_is_consistent() {
    let model = single_model();
    assert_eq!(consistent(&Expr::exists("x", pred("P", x())), &model), Ok(true));
}

#[test]
fn excluded_middle_is_consistent_and_coherent() {
    for model in [single_model(), wide_model()] {
        let expr = Expr::disjunction(p_c(), not(p_c()));
        assert_eq!(consistent(&expr, &model), Ok(true));
        assert_eq!(coherent(&expr, &model), Ok(true));
    }
}

#[test]
fn contradiction_is_neither_consistent_nor_coherent() {
    let model = single_model();
    let expr = Expr::conjunction(p_c(), not(p_c()));
    assert_eq!(consistent(&expr, &model), Ok(false));
    assert_eq!(coherent(&expr, &model), Ok(false));
}

#[test]
fn model_without_worlds_is_vacuous() {
    let model = TableModel::new(0, 1).with_rigid_term("c", 0);
    let expr = pred("P", Term::constant("c"));
    assert_eq!(consistent(&expr, &model), Ok(true));
    assert_eq!(coherent(&expr, &model), Ok(true));
}

#[test]
fn global_consistency_propagates_errors() {
    let model = single_model();
    let err = consistent(&pred("Q", Term::constant("c")), &model).unwrap_err();
    assert_eq!(err.trail(), vec!["Q(c)"]);
}

// ══════════════════════════════════════════════════════════════════════════════
// Entailment
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn ignorant_state_does_not_entail_contingent_fact() {
    let model = single_model();
    assert_eq!(entails_0(&[], &p_c(), &model), Ok(false));
    assert_eq!(entails_0(&[p_c()], &p_c(), &model), Ok(true));
}

#[test]
fn premise_entails_itself_everywhere() {
    let model = wide_model();
    assert_eq!(entails(&[p_c()], &p_c(), &model), Ok(true));
    assert_eq!(entails_g(&[], &p_c(), &model), Ok(false));
    assert_eq!(entails_c(&[p_c()], &p_c(), &model), Ok(true));
}

#[test]
fn fact_entails_its_necessity() {
    let model = single_model();
    let necessity = Expr::must(p_c());
    assert_eq!(entails_g(&[p_c()], &necessity, &model), Ok(true));
    assert_eq!(entails_c(&[p_c()], &necessity, &model), Ok(true));
}

#[test]
fn possibility_does_not_entail_fact() {
    let model = single_model();
    let possibility = Expr::might(p_c());
    assert_eq!(entails_g(&[possibility.clone()], &p_c(), &model), Ok(false));
    assert_eq!(entails_c(&[possibility], &p_c(), &model), Ok(false));
}

#[test]
fn premise_order_separates_general_from_classical() {
    // Updating with "might not P" and then "P" ends in a state where "might
    // not P" fails, yet only the empty state supports both premises.
    let model = single_model();
    let might_not = Expr::might(not(p_c()));
    let premises = [might_not.clone(), p_c()];
    assert_eq!(entails_g(&premises, &might_not, &model), Ok(false));
    assert_eq!(entails_c(&premises, &might_not, &model), Ok(true));
}

#[test]
fn existential_premise_binds_into_conclusion() {
    let model = wide_model();
    let premise = Expr::exists("x", pred("P", x()));
    assert_eq!(entails_g(&[premise.clone()], &pred("P", x()), &model), Ok(true));
    assert_eq!(entails_0(&[premise], &pred("P", x()), &model), Ok(true));
}

#[test]
fn undefined_premise_is_not_a_counterexample() {
    let model = single_model();
    let undefined = pred("Q", Term::constant("c"));
    assert_eq!(entails_g(&[undefined.clone()], &p_c(), &model), Ok(true));
    assert_eq!(entails_c(&[undefined.clone()], &p_c(), &model), Ok(true));

    let err = entails_0(&[undefined], &p_c(), &model).unwrap_err();
    assert!(err.is_undefined());
}

#[test]
fn undefined_conclusion_aborts() {
    let model = single_model();
    let undefined = pred("Q", Term::constant("c"));
    assert!(entails_g(&[], &undefined, &model).is_err());
    assert!(entails_c(&[], &undefined, &model).is_err());
}

// ══════════════════════════════════════════════════════════════════════════════
// Equivalence
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn double_negation_is_equivalent_for_quantifier_free_formulas() {
    let model = wide_model();
    let q_c = pred("Q", Term::constant("c"));
    let formulas = [
        p_c(),
        not(p_c()),
        Expr::conjunction(p_c(), q_c.clone()),
        Expr::disjunction(p_c(), q_c.clone()),
        Expr::conditional(p_c(), q_c.clone()),
        Expr::might(q_c.clone()),
        Expr::must(q_c),
    ];
    for phi in formulas {
        assert_eq!(equivalent(&phi, &not(not(phi.clone())), &model), Ok(true), "{phi}");
    }
}

#[test]
fn distinct_formulas_are_not_equivalent() {
    let model = wide_model();
    let q_c = pred("Q", Term::constant("c"));
    assert_eq!(equivalent(&p_c(), &q_c, &model), Ok(false));
}

#[test]
fn binding_a_variable_changes_the_update() {
    let model = single_model();
    let bound = Expr::exists("x", pred("P", x()));
    assert_eq!(equivalent(&bound, &p_c(), &model), Ok(false));
}

#[test]
fn existential_scope_extends_over_later_conjuncts() {
    let model = wide_model();
    let outside = Expr::conjunction(Expr::exists("x", pred("P", x())), pred("Q", x()));
    let inside = Expr::exists("x", Expr::conjunction(pred("P", x()), pred("Q", x())));
    assert_eq!(equivalent(&outside, &inside, &model), Ok(true));
}

// ══════════════════════════════════════════════════════════════════════════════
// Configuration
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn world_identity_configuration() {
    let model = wide_model();
    let relations = Relations::new(&model)
        .with_config(RelationConfig::default().with_identity(Identity::World));
    assert_eq!(relations.consistent(&Expr::exists("x", pred("P", x()))), Ok(true));
    assert_eq!(relations.entails_0(&[], &p_c()), Ok(false));
}

#[test]
fn cancelled_query_aborts() {
    let model = wide_model();
    let token = CancelToken::new();
    token.cancel();
    let relations =
        Relations::new(&model).with_config(RelationConfig::default().with_cancel(token));
    let err = relations.entails(&[], &p_c()).unwrap_err();
    assert_eq!(err.root_cause(), &EvalError::Cancelled);
}

#[test]
fn default_config_sets_no_limits() {
    let config = RelationConfig::default();
    assert!(config.gas_limit.is_none());
    assert!(config.time_limit.is_none());
    assert!(config.cancel.is_none());
}

#[test]
fn gas_limit_applies_per_evaluation() {
    let model = wide_model();
    let deep = not(not(not(p_c())));
    let tight = Relations::new(&model)
        .with_config(RelationConfig::default().with_gas_limit(Some(2)));
    let err = tight.consistent(&deep).unwrap_err();
    assert_eq!(err.root_cause(), &EvalError::GasExhausted { limit: 2 });

    let enough = Relations::new(&model)
        .with_config(RelationConfig::default().with_gas_limit(Some(4)));
    assert!(enough.consistent(&deep).is_ok());
}

// ══════════════════════════════════════════════════════════════════════════════
// Trace output
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn counterexample_is_reported() {
    let model = single_model();
    let logger = BufferLogger::new();
    let relations = Relations::new(&model).with_logger(Some(&logger));
    assert_eq!(relations.entails_g(&[], &p_c()), Ok(false));

    assert!(logger.contains("Evaluating entailment relative to every state"));
    assert!(logger.contains("- Conclusion: P(c)"));
    assert!(logger.contains("provides a counterexample to the argument"));
    assert!(logger.contains("World : w1"));
    assert_eq!(logger.lines().last().map(String::as_str), Some("Evaluation result: False"));
    assert!(!logger.contains("===> Starting evaluation"));
}

#[test]
fn detailed_logging_includes_nested_evaluations() {
    let model = single_model();
    let logger = BufferLogger::new();
    let relations = Relations::new(&model)
        .with_logger(Some(&logger))
        .with_config(RelationConfig::default().with_log_details(true));
    assert_eq!(relations.coherent(&p_c()), Ok(false));
    assert!(logger.contains("Evaluating formula 'P(c)' for coherence"));
    assert!(logger.contains("===> Starting evaluation of P(c)"));
    assert!(logger.contains("is incoherent with every information state with 2 worlds"));
    assert_eq!(logger.depth(), 0);
}

#[test]
fn failure_is_reported() {
    let model = single_model();
    let logger = BufferLogger::new();
    let relations = Relations::new(&model).with_logger(Some(&logger));
    assert!(relations.equivalent(&p_c(), &pred("Q", x())).is_err());
    assert!(logger.contains("Evaluation failed with the following error:"));
}

#[test]
fn relations_run_with_env_logger_installed() {
    let _ = env_logger::builder().is_test(true).try_init();
    let model = wide_model();
    assert_eq!(with_threads(&model, 2).consistent(&p_c()), Ok(true));
}

// ══════════════════════════════════════════════════════════════════════════════
// Parallel checking
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn parallel_verdicts_match_sequential() {
    let model = wide_model();
    let q_c = pred("Q", Term::constant("c"));
    let some_p = Expr::exists("x", pred("P", x()));
    let sequential = with_threads(&model, 1);

    for threads in [2, 3, 8] {
        let parallel = with_threads(&model, threads);
        for phi in [p_c(), q_c.clone(), some_p.clone(), Expr::might(q_c.clone())] {
            assert_eq!(parallel.consistent(&phi), sequential.consistent(&phi));
            assert_eq!(parallel.coherent(&phi), sequential.coherent(&phi));
            assert_eq!(
                parallel.equivalent(&phi, &not(not(phi.clone()))),
                sequential.equivalent(&phi, &not(not(phi.clone())))
            );
            assert_eq!(
                parallel.entails_g(&[phi.clone()], &q_c),
                sequential.entails_g(&[phi.clone()], &q_c)
            );
            assert_eq!(
                parallel.entails_c(&[phi.clone()], &q_c),
                sequential.entails_c(&[phi.clone()], &q_c)
            );
        }
    }
}

#[test]
fn parallel_reports_the_same_error() {
    let model = wide_model();
    let broken = pred("R", x());
    let sequential = with_threads(&model, 1).consistent(&broken);
    let parallel = with_threads(&model, 4).consistent(&broken);
    assert!(sequential.is_err());
    assert_eq!(parallel, sequential);
}

// ══════════════════════════════════════════════════════════════════════════════
// JSON models
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn relations_over_json_model() {
    let json = serde_json::json!({
        "worlds": 3,
        "individuals": 2,
        "terms": { "j": [0, 0, 0] },
        "predicates": {
            "Walks": [[[0]], [[0]], []],
            "Talks": [[[0]], [[0]], [[0]]]
        }
    });
    let model = TableModel::from_json(&json.to_string()).unwrap();
    let walks = pred("Walks", Term::constant("j"));
    let talks = pred("Talks", Term::constant("j"));

    assert_eq!(consistent(&walks, &model), Ok(true));
    assert_eq!(entails_g(&[walks.clone()], &talks, &model), Ok(true));
    assert_eq!(entails_g(&[talks], &walks, &model), Ok(false));
}

// ══════════════════════════════════════════════════════════════════════════════
// Properties
// ══════════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn state_space_has_every_subset(worlds in 0..8usize) {
        prop_assert_eq!(state_space(worlds, Identity::Structural).count(), 1 << worlds);
        for k in 0..=worlds {
            prop_assert_eq!(
                states_of_size(worlds, k, Identity::Structural).len(),
                binomial(worlds, k)
            );
        }
    }

    #[test]
    fn thread_count_does_not_change_verdicts(threads in 1..6usize, choice in 0..4usize) {
        let model = wide_model();
        let q_c = pred("Q", Term::constant("c"));
        let phi = [
            p_c(),
            not(q_c.clone()),
            Expr::disjunction(p_c(), q_c.clone()),
            Expr::exists("x", pred("Q", x())),
        ][choice]
            .clone();
        let sequential = with_threads(&model, 1);
        let parallel = with_threads(&model, threads);
        prop_assert_eq!(parallel.consistent(&phi), sequential.consistent(&phi));
        prop_assert_eq!(parallel.entails_g(&[phi.clone()], &q_c), sequential.entails_g(&[phi.clone()], &q_c));
    }
}
