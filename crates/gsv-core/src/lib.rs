//! The data model of GSV update semantics.
//!
//! A [`Possibility`] pairs a [`ReferentSystem`] (variables → pegs) with a
//! partial assignment (pegs → individuals) and a world. An
//! [`InformationState`] is a set of possibilities; formulas update states.

pub mod information_state;
pub mod possibility;
pub mod referent_system;

pub use information_state::{Identity, InformationState};
pub use possibility::Possibility;
pub use referent_system::{Peg, ReferentSystem};
