//! Referent systems: the variable → peg bookkeeping of a possibility.

use gsv_types::{EvalError, EvalResult};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A discourse-referent slot. Pegs are allocated from 1 upwards.
pub type Peg = usize;

/// Maps variables to pegs and counts the pegs allocated so far.
///
/// Every [`bind`](Self::bind) allocates a fresh peg, so the pegs in use are
/// exactly `1..=pegs`, in allocation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReferentSystem {
    pegs: Peg,
    variable_pegs: BTreeMap<String, Peg>,
}

impl ReferentSystem {
    /// An empty referent system with no pegs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pegs allocated so far.
    pub fn pegs(&self) -> Peg {
        self.pegs
    }

    /// The peg currently associated with `variable`.
    pub fn value(&self, variable: &str) -> EvalResult<Peg> {
        self.variable_pegs
            .get(variable)
            .copied()
            .ok_or_else(|| EvalError::UnknownVariable(variable.to_string()))
    }

    /// The variables this system associates with a peg.
    pub fn domain(&self) -> BTreeSet<&str> {
        self.variable_pegs.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.variable_pegs.contains_key(variable)
    }

    /// Allocate the next peg and associate it with `variable`.
    ///
    /// A variable that was already bound is re-pointed at the new peg; its
    /// old peg stays allocated.
    pub fn bind(&mut self, variable: &str) -> Peg {
        self.pegs += 1;
        self.variable_pegs.insert(variable.to_string(), self.pegs);
        self.pegs
    }

    /// Whether `self` extends `other`.
    ///
    /// `self` extends `other` when it has at least as many pegs, binds every
    /// variable `other` binds, keeps each such variable on its old peg or
    /// moves it to a peg numbered at least `other.pegs()`, and puts every
    /// newly bound variable on a peg numbered at least `other.pegs()`.
    ///
    /// Reflexive and transitive, not symmetric.
    pub fn extends(&self, other: &ReferentSystem) -> bool {
        if other.pegs > self.pegs {
            return false;
        }

        let old_vars_kept = other.variable_pegs.iter().all(|(variable, &old)| {
            self.variable_pegs
                .get(variable)
                .is_some_and(|&new| new == old || new >= other.pegs)
        });
        if !old_vars_kept {
            return false;
        }

        self.variable_pegs
            .iter()
            .filter(|(variable, _)| !other.variable_pegs.contains_key(*variable))
            .all(|(_, &peg)| peg >= other.pegs)
    }

    /// Iterate over `(variable, peg)` pairs in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Peg)> {
        self.variable_pegs.iter().map(|(v, &p)| (v.as_str(), p))
    }
}

impl fmt::Display for ReferentSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.variable_pegs.is_empty() {
            return f.write_str("{ }");
        }
        let pairs = self
            .variable_pegs
            .iter()
            .map(|(variable, peg)| format!("{variable} -> peg{peg}"))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{{ {pairs} }}")
    }
}
