//! Similarity of possibilities and states, up to peg renaming.

use gsv_core::{InformationState, Possibility};
use gsv_types::EvalResult;

/// Whether `p1` and `p2` share a world, bind the same variables and give
/// each variable the same denotation. Peg numbers are not compared.
pub fn similar_possibilities(p1: &Possibility, p2: &Possibility) -> EvalResult<bool> {
    if p1.world() != p2.world() {
        return Ok(false);
    }
    let domain = p1.referent_system().domain();
    if domain != p2.referent_system().domain() {
        return Ok(false);
    }
    for variable in domain {
        if p1.denotation(variable)? != p2.denotation(variable)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Whether every possibility of each state has a similar possibility in the
/// other.
pub fn similar(s1: &InformationState, s2: &InformationState) -> EvalResult<bool> {
    Ok(covered_by(s1, s2)? && covered_by(s2, s1)?)
}

fn covered_by(from: &InformationState, to: &InformationState) -> EvalResult<bool> {
    'outer: for p in from {
        for q in to {
            if similar_possibilities(p, q)? {
                continue 'outer;
            }
        }
        return Ok(false);
    }
    Ok(true)
}
