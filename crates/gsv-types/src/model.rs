//! The model interface consumed by the evaluator, and a table-backed model.
//!
//! Worlds and individuals are indices: a model with `W` worlds and `D`
//! individuals has worlds `0..W` and individuals `0..D`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::ModelError;

/// Index of a possible world.
pub type World = usize;
/// Index of an individual in the domain.
pub type Individual = usize;
/// Argument tuple of a predication.
pub type Tuple = Vec<Individual>;
/// Extension of a predicate at a world.
pub type Extension = BTreeSet<Tuple>;

/// A fixed, finite model for Quantified Modal Logic.
///
/// The model is read-only during evaluation. `Sync` is required so a single
/// model can be shared by the workers that check relations in parallel.
pub trait Model: Sync {
    /// Cardinality of the set of worlds.
    fn world_cardinality(&self) -> usize;

    /// Cardinality of the domain of individuals.
    fn domain_cardinality(&self) -> usize;

    /// Denotation of a constant at a world.
    fn term_interpretation(&self, term: &str, world: World) -> Result<Individual, ModelError>;

    /// Extension of a predicate at a world.
    fn predicate_interpretation(&self, predicate: &str, world: World)
        -> Result<&Extension, ModelError>;
}

// ══════════════════════════════════════════════════════════════════════════════
// TableModel
// ══════════════════════════════════════════════════════════════════════════════

/// A model given by explicit tables, indexed by world.
///
/// ```
/// use gsv_types::{Model, TableModel};
///
/// let model = TableModel::new(2, 1)
///     .with_rigid_term("c", 0)
///     .with_predicate("P", vec![vec![vec![0]], vec![]]);
/// assert_eq!(model.term_interpretation("c", 1), Ok(0));
/// assert!(model.predicate_interpretation("P", 0).unwrap().contains(&vec![0]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableModel {
    pub worlds: usize,
    pub individuals: usize,
    /// term → denotation at each world
    #[serde(default)]
    pub terms: BTreeMap<String, Vec<Individual>>,
    /// predicate → extension at each world
    #[serde(default)]
    pub predicates: BTreeMap<String, Vec<Extension>>,
}

impl TableModel {
    /// A model with no interpreted symbols.
    pub fn new(worlds: usize, individuals: usize) -> Self {
        Self {
            worlds,
            individuals,
            terms: BTreeMap::new(),
            predicates: BTreeMap::new(),
        }
    }

    /// Interpret `term` with one denotation per world.
    pub fn with_term(mut self, term: impl Into<String>, denotations: Vec<Individual>) -> Self {
        self.terms.insert(term.into(), denotations);
        self
    }

    /// Interpret `term` as the same individual at every world.
    pub fn with_rigid_term(self, term: impl Into<String>, individual: Individual) -> Self {
        let worlds = self.worlds;
        self.with_term(term, vec![individual; worlds])
    }

    /// Interpret `predicate` with one extension per world.
    pub fn with_predicate(mut self, predicate: impl Into<String>, extensions: Vec<Vec<Tuple>>) -> Self {
        let extensions = extensions
            .into_iter()
            .map(|tuples| tuples.into_iter().collect())
            .collect();
        self.predicates.insert(predicate.into(), extensions);
        self
    }

    /// Interpret `predicate` with the same extension at every world.
    pub fn with_rigid_predicate(self, predicate: impl Into<String>, tuples: Vec<Tuple>) -> Self {
        let worlds = self.worlds;
        self.with_predicate(predicate, vec![tuples; worlds])
    }

    /// Load a model from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Model for TableModel {
    fn world_cardinality(&self) -> usize {
        self.worlds
    }

    fn domain_cardinality(&self) -> usize {
        self.individuals
    }

    fn term_interpretation(&self, term: &str, world: World) -> Result<Individual, ModelError> {
        let denotations = self
            .terms
            .get(term)
            .ok_or_else(|| ModelError::UndefinedTerm(term.to_string()))?;
        denotations
            .get(world)
            .copied()
            .ok_or_else(|| ModelError::UnknownWorld {
                name: term.to_string(),
                world,
            })
    }

    fn predicate_interpretation(
        &self,
        predicate: &str,
        world: World,
    ) -> Result<&Extension, ModelError> {
        let extensions = self
            .predicates
            .get(predicate)
            .ok_or_else(|| ModelError::UndefinedPredicate(predicate.to_string()))?;
        extensions.get(world).ok_or_else(|| ModelError::UnknownWorld {
            name: predicate.to_string(),
            world,
        })
    }
}

impl fmt::Display for TableModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "World domain cardinality:      {}", self.worlds)?;
        write!(f, "Individual domain cardinality: {}", self.individuals)
    }
}
