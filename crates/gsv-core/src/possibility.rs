//! Possibilities: the atomic elements of an information state.

use gsv_types::{EvalError, EvalResult, Individual, World};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::information_state::InformationState;
use crate::referent_system::{Peg, ReferentSystem};

/// A referent system, a partial peg → individual assignment, and a world.
///
/// The referent system is reference counted so possibilities created
/// together can share one. [`update`](Self::update) is clone-on-write: a
/// shared referent system is copied before a peg is allocated, so siblings
/// never see each other's bindings.
///
/// Equality, ordering and hashing are structural. Ordering compares the
/// world first, then the assignment, then the referent system.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Possibility {
    world: World,
    assignment: BTreeMap<Peg, Individual>,
    referent_system: Arc<ReferentSystem>,
}

impl Possibility {
    /// A possibility at `world` with an empty assignment.
    pub fn new(referent_system: Arc<ReferentSystem>, world: World) -> Self {
        Self {
            world,
            assignment: BTreeMap::new(),
            referent_system,
        }
    }

    pub fn world(&self) -> World {
        self.world
    }

    pub fn referent_system(&self) -> &ReferentSystem {
        &self.referent_system
    }

    pub fn assignment(&self) -> &BTreeMap<Peg, Individual> {
        &self.assignment
    }

    /// Whether `self` and `other` hold the very same referent system.
    pub fn shares_referent_system(&self, other: &Possibility) -> bool {
        Arc::ptr_eq(&self.referent_system, &other.referent_system)
    }

    /// Bind `variable` to a fresh peg and assign `individual` to it.
    pub fn update(&mut self, variable: &str, individual: Individual) {
        let peg = Arc::make_mut(&mut self.referent_system).bind(variable);
        self.assignment.insert(peg, individual);
    }

    /// The individual `variable` currently denotes.
    pub fn denotation(&self, variable: &str) -> EvalResult<Individual> {
        let peg = self.referent_system.value(variable)?;
        // A bound variable's peg is always assigned; a missing entry means
        // the possibility was assembled by hand inconsistently.
        self.assignment
            .get(&peg)
            .copied()
            .ok_or_else(|| EvalError::UnknownVariable(variable.to_string()))
    }

    /// Whether `self` extends `other`: same world, and every peg assigned in
    /// `other` carries the same individual in `self`.
    pub fn extends(&self, other: &Possibility) -> bool {
        self.world == other.world
            && other
                .assignment
                .iter()
                .all(|(peg, individual)| self.assignment.get(peg) == Some(individual))
    }

    /// Whether `self` is in `state` and extends `ancestor`.
    pub fn is_descendant_of(&self, ancestor: &Possibility, state: &InformationState) -> bool {
        state.contains(self) && self.extends(ancestor)
    }

    /// Whether some member of `state` is a descendant of `self`.
    pub fn subsists_in(&self, state: &InformationState) -> bool {
        state.iter().any(|p| p.extends(self))
    }

    /// The descendants of `self` in `state`.
    pub fn descendants_in<'s>(
        &'s self,
        state: &'s InformationState,
    ) -> impl Iterator<Item = &'s Possibility> + 's {
        state.iter().filter(move |p| p.extends(self))
    }
}

impl fmt::Display for Possibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let assignment = if self.assignment.is_empty() {
            "{ }".to_string()
        } else {
            let pairs = self
                .assignment
                .iter()
                .map(|(peg, individual)| format!("peg{peg} -> e{individual}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{ {pairs} }}")
        };
        write!(
            f,
            "[ R-System : {}, Assignment : {assignment}, World : w{} ]",
            self.referent_system, self.world
        )
    }
}
