//! Information states: the sets of possibilities that formulas update.

use gsv_types::{EvalResult, Individual, Model, World};
use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::possibility::Possibility;
use crate::referent_system::ReferentSystem;

const RULE: &str = "--------------------";

/// How an information state decides whether two possibilities are the same
/// member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Identity {
    /// World, assignment and referent system must all agree.
    #[default]
    Structural,
    /// At most one possibility per world: once a world is present, further
    /// possibilities at that world are dropped on insertion.
    World,
}

/// A set of possibilities.
///
/// Iteration is deterministic: by world, then assignment, then referent
/// system. States derived from a state (by [`update`](Self::update) or by
/// filtering) inherit its [`Identity`].
#[derive(Debug, Clone, Default)]
pub struct InformationState {
    possibilities: BTreeSet<Possibility>,
    identity: Identity,
}

impl InformationState {
    /// The empty state, with structural identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// The empty state with the given identity.
    pub fn with_identity(identity: Identity) -> Self {
        Self {
            possibilities: BTreeSet::new(),
            identity,
        }
    }

    /// The ignorant state of `model`: one possibility per world, all sharing
    /// one empty referent system.
    pub fn create(model: &dyn Model) -> Self {
        Self::create_with_identity(model, Identity::default())
    }

    pub fn create_with_identity(model: &dyn Model, identity: Identity) -> Self {
        Self::from_worlds(0..model.world_cardinality(), identity)
    }

    /// Bare possibilities (no bindings) at each of `worlds`.
    pub fn from_worlds(worlds: impl IntoIterator<Item = World>, identity: Identity) -> Self {
        let referent_system = Arc::new(ReferentSystem::new());
        let mut state = Self::with_identity(identity);
        for world in worlds {
            state.insert(Possibility::new(Arc::clone(&referent_system), world));
        }
        state
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    pub fn len(&self) -> usize {
        self.possibilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.possibilities.is_empty()
    }

    pub fn contains(&self, p: &Possibility) -> bool {
        match self.identity {
            Identity::Structural => self.possibilities.contains(p),
            Identity::World => self.possibilities.iter().any(|q| q.world() == p.world()),
        }
    }

    /// Insert `p`. Returns whether the state changed.
    pub fn insert(&mut self, p: Possibility) -> bool {
        if self.identity == Identity::World && self.contains(&p) {
            return false;
        }
        self.possibilities.insert(p)
    }

    pub fn clear(&mut self) {
        self.possibilities.clear();
    }

    pub fn iter(&self) -> btree_set::Iter<'_, Possibility> {
        self.possibilities.iter()
    }

    /// Keep only the possibilities satisfying `keep`.
    pub fn retain(&mut self, keep: impl FnMut(&Possibility) -> bool) {
        self.possibilities.retain(keep);
    }

    /// Keep only the possibilities satisfying `keep`, stopping at the first
    /// failure. On failure the state is left partially filtered.
    pub fn try_retain<F>(&mut self, mut keep: F) -> EvalResult<()>
    where
        F: FnMut(&Possibility) -> EvalResult<bool>,
    {
        let mut failure = None;
        self.possibilities.retain(|p| {
            if failure.is_some() {
                return true;
            }
            match keep(p) {
                Ok(kept) => kept,
                Err(e) => {
                    failure = Some(e);
                    true
                }
            }
        });
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Add every possibility of `other`.
    pub fn union(&mut self, other: InformationState) {
        for p in other.possibilities {
            self.insert(p);
        }
    }

    /// The worlds represented in this state.
    pub fn worlds(&self) -> BTreeSet<World> {
        self.possibilities.iter().map(Possibility::world).collect()
    }

    /// Extend every possibility with a fresh peg for `variable` assigned to
    /// `individual`.
    ///
    /// Each resulting possibility owns a private copy of its predecessor's
    /// referent system, so the new binding cannot leak into possibilities
    /// outside the result.
    pub fn update(&self, variable: &str, individual: Individual) -> InformationState {
        let mut output = Self::with_identity(self.identity);
        for p in &self.possibilities {
            let mut p_star = p.clone();
            p_star.update(variable, individual);
            output.insert(p_star);
        }
        output
    }

    /// Whether every possibility of `self` extends some possibility of `base`.
    pub fn extends(&self, base: &InformationState) -> bool {
        self.possibilities
            .iter()
            .all(|p2| base.possibilities.iter().any(|p1| p2.extends(p1)))
    }

    /// Whether every possibility of `self` subsists in `other`.
    pub fn subsists_in(&self, other: &InformationState) -> bool {
        self.possibilities.iter().all(|p| p.subsists_in(other))
    }

    /// Render with every line prefixed by `indent`.
    pub fn render(&self, indent: &str) -> String {
        self.to_string()
            .lines()
            .map(|line| format!("{indent}{line}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl PartialEq for InformationState {
    fn eq(&self, other: &Self) -> bool {
        self.possibilities == other.possibilities
    }
}

impl Eq for InformationState {}

impl FromIterator<Possibility> for InformationState {
    fn from_iter<I: IntoIterator<Item = Possibility>>(iter: I) -> Self {
        let mut state = Self::new();
        for p in iter {
            state.insert(p);
        }
        state
    }
}

impl IntoIterator for InformationState {
    type Item = Possibility;
    type IntoIter = btree_set::IntoIter<Possibility>;

    fn into_iter(self) -> Self::IntoIter {
        self.possibilities.into_iter()
    }
}

impl<'a> IntoIterator for &'a InformationState {
    type Item = &'a Possibility;
    type IntoIter = btree_set::Iter<'a, Possibility>;

    fn into_iter(self) -> Self::IntoIter {
        self.possibilities.iter()
    }
}

impl fmt::Display for InformationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{RULE}")?;
        for p in &self.possibilities {
            write!(f, "\n{p}\n{RULE}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsv_types::TableModel;

    #[test]
    fn test_create_one_possibility_per_world() {
        let model = TableModel::new(3, 2);
        let state = InformationState::create(&model);
        assert_eq!(state.len(), 3);
        assert_eq!(state.worlds().into_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(state.iter().all(|p| p.assignment().is_empty()));
        assert!(state.iter().all(|p| p.referent_system().pegs() == 0));
    }

    #[test]
    fn test_structural_identity_keeps_same_world_variants() {
        let model = TableModel::new(1, 2);
        let base = InformationState::create(&model);
        let mut state = base.update("x", 0);
        state.union(base.update("x", 1));
        assert_eq!(state.len(), 2);
        assert_eq!(state.worlds().len(), 1);
    }

    #[test]
    fn test_world_identity_collapses_same_world_variants() {
        let model = TableModel::new(1, 2);
        let base = InformationState::create_with_identity(&model, Identity::World);
        let mut state = base.update("x", 0);
        state.union(base.update("x", 1));
        assert_eq!(state.len(), 1);
        assert_eq!(state.identity(), Identity::World);
        let p = state.iter().next().unwrap();
        assert_eq!(p.denotation("x"), Ok(0));
    }

    #[test]
    fn test_update_clones_referent_systems() {
        let model = TableModel::new(2, 1);
        let base = InformationState::create(&model);
        let updated = base.update("x", 0);
        let ps: Vec<_> = updated.iter().collect();
        assert!(!ps[0].shares_referent_system(ps[1]));
        assert!(base.iter().all(|p| p.referent_system().domain().is_empty()));
    }

    #[test]
    fn test_try_retain_reports_first_failure() {
        let model = TableModel::new(3, 1);
        let mut state = InformationState::create(&model);
        let result = state.try_retain(|p| p.denotation("x").map(|_| true));
        assert!(result.is_err());

        let mut state = InformationState::create(&model);
        state.try_retain(|p| Ok(p.world() != 1)).unwrap();
        assert_eq!(state.worlds().into_iter().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_display_and_render() {
        let model = TableModel::new(1, 1);
        let state = InformationState::create(&model);
        let expected = "--------------------\n[ R-System : { }, Assignment : { }, World : w0 ]\n--------------------";
        assert_eq!(state.to_string(), expected);
        assert!(state.render("  ").lines().all(|l| l.starts_with("  ")));
        assert_eq!(InformationState::new().to_string(), RULE);
    }
}
