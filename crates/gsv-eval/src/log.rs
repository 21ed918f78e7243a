//! Targets for diagnostics sent through the `log` facade.

pub mod targets {
    /// Logs related to the [update procedure](crate::evaluator)
    pub const EVALUATION: &str = "evaluation";

    /// Logs related to global semantic relations
    pub const RELATIONS: &str = "relations";

    /// Logs related to the enumeration of information states
    pub const ENUMERATION: &str = "enumeration";
}
