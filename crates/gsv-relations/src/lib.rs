//! Semantic relations for GSV update semantics.
//!
//! Consistency, coherence, three entailment relations and equivalence,
//! decided by evaluating formulas over every information state definable
//! from a finite model's worlds.
//!
//! ```
//! use gsv_relations::{entails_0, equivalent};
//! use gsv_types::{Expr, TableModel, Term};
//!
//! let model = TableModel::new(2, 1)
//!     .with_rigid_term("c", 0)
//!     .with_predicate("P", vec![vec![vec![0]], vec![]]);
//! let p = Expr::predication("P", vec![Term::constant("c")]);
//!
//! // The ignorant state still contains w1, where P(c) fails.
//! assert_eq!(entails_0(&[], &p, &model), Ok(false));
//! assert_eq!(entails_0(&[p.clone()], &p, &model), Ok(true));
//! assert_eq!(equivalent(&p, &Expr::negation(Expr::negation(p.clone())), &model), Ok(true));
//! ```

pub mod config;
mod parallel;
pub mod relations;
pub mod similarity;
pub mod substates;

pub use config::RelationConfig;
pub use relations::{
    allows, coherent, consistent, consistent_in, entails, entails_0, entails_c, entails_g,
    equivalent, is_supported_by, supports, Relations,
};
pub use similarity::{similar, similar_possibilities};
pub use substates::{binomial, generate_sub_states, state_space, states_of_size};
