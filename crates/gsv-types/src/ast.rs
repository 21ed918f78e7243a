//! AST node types for Quantified Modal Logic formulas.
//!
//! The AST is produced upstream (by a parser or an embedding layer) and is
//! consumed read-only by the evaluator. Large recursive types are boxed to
//! keep enum sizes reasonable. [`std::fmt::Display`] renders the textual form
//! that appears in evaluation breadcrumbs and traces.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ══════════════════════════════════════════════════════════════════════════════
// Terms
// ══════════════════════════════════════════════════════════════════════════════

/// A singular term: either a constant interpreted by the model, or a
/// variable interpreted through the referent system of a possibility.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Term {
    Constant(String),
    Variable(String),
}

impl Term {
    pub fn constant(name: impl Into<String>) -> Self {
        Self::Constant(name.into())
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Tag a raw literal as a variable or a constant.
    ///
    /// Variables are one of `x y z r s t u v w`, optionally followed by
    /// digits, or by `_` and at least one digit (`x`, `y1`, `z_12`).
    /// Every other literal is a constant.
    pub fn classify(literal: &str) -> Self {
        if is_variable(literal) {
            Self::Variable(literal.to_string())
        } else {
            Self::Constant(literal.to_string())
        }
    }

    /// The literal as written.
    pub fn literal(&self) -> &str {
        match self {
            Self::Constant(name) | Self::Variable(name) => name,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.literal())
    }
}

fn is_variable(literal: &str) -> bool {
    let mut chars = literal.chars();
    match chars.next() {
        Some('x' | 'y' | 'z' | 'r' | 's' | 't' | 'u' | 'v' | 'w') => {}
        _ => return false,
    }
    let rest = chars.as_str();
    let digits = rest.strip_prefix('_').unwrap_or(rest);
    if rest.starts_with('_') && digits.is_empty() {
        return false;
    }
    digits.chars().all(|c| c.is_ascii_digit())
}

// ══════════════════════════════════════════════════════════════════════════════
// Operators
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `-φ`
    Negation,
    /// `Lφ`: epistemic "must".
    EpistemicNecessity,
    /// `Mφ`: epistemic "might".
    EpistemicPossibility,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Negation => "-",
            Self::EpistemicNecessity => "L",
            Self::EpistemicPossibility => "M",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `(φ & ψ)`: sequential update.
    Conjunction,
    /// `(φ v ψ)`
    Disjunction,
    /// `(φ -> ψ)`
    Conditional,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Conjunction => "&",
            Self::Disjunction => "v",
            Self::Conditional => "->",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantifier {
    Existential,
    Universal,
}

impl Quantifier {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Existential => "E",
            Self::Universal => "A",
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// A QML formula.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    /// `-φ`, `Lφ`, `Mφ`
    Unary { op: UnaryOp, scope: Box<Expr> },
    /// `(φ & ψ)`, `(φ v ψ)`, `(φ -> ψ)`
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `Ex φ`, `Ax φ`
    Quantification {
        quantifier: Quantifier,
        variable: String,
        scope: Box<Expr>,
    },
    /// `a = b`
    Identity { lhs: Term, rhs: Term },
    /// `P(a₁, …, aₙ)`
    Predication {
        predicate: String,
        arguments: Vec<Term>,
    },
}

impl Expr {
    pub fn unary(op: UnaryOp, scope: Expr) -> Self {
        Self::Unary {
            op,
            scope: Box::new(scope),
        }
    }

    pub fn negation(scope: Expr) -> Self {
        Self::unary(UnaryOp::Negation, scope)
    }

    pub fn must(scope: Expr) -> Self {
        Self::unary(UnaryOp::EpistemicNecessity, scope)
    }

    pub fn might(scope: Expr) -> Self {
        Self::unary(UnaryOp::EpistemicPossibility, scope)
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn conjunction(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Conjunction, lhs, rhs)
    }

    pub fn disjunction(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Disjunction, lhs, rhs)
    }

    pub fn conditional(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Conditional, lhs, rhs)
    }

    pub fn quantification(quantifier: Quantifier, variable: impl Into<String>, scope: Expr) -> Self {
        Self::Quantification {
            quantifier,
            variable: variable.into(),
            scope: Box::new(scope),
        }
    }

    pub fn exists(variable: impl Into<String>, scope: Expr) -> Self {
        Self::quantification(Quantifier::Existential, variable, scope)
    }

    pub fn forall(variable: impl Into<String>, scope: Expr) -> Self {
        Self::quantification(Quantifier::Universal, variable, scope)
    }

    pub fn identity(lhs: Term, rhs: Term) -> Self {
        Self::Identity { lhs, rhs }
    }

    pub fn predication(predicate: impl Into<String>, arguments: Vec<Term>) -> Self {
        Self::Predication {
            predicate: predicate.into(),
            arguments,
        }
    }

    /// Variables occurring outside the scope of a quantifier binding them.
    ///
    /// This is the static notion. Under dynamic binding a variable that is
    /// free here may still be resolved at evaluation time, e.g. the `x` of
    /// `(Ex P(x) & Q(x))` is bound across the conjunction.
    pub fn free_variables(&self) -> BTreeSet<String> {
        let mut free = BTreeSet::new();
        let mut bound = Vec::new();
        collect_free(self, &mut bound, &mut free);
        free
    }

    /// Nesting depth of the formula; atoms have depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Self::Unary { scope, .. } | Self::Quantification { scope, .. } => 1 + scope.depth(),
            Self::Binary { lhs, rhs, .. } => 1 + lhs.depth().max(rhs.depth()),
            Self::Identity { .. } | Self::Predication { .. } => 1,
        }
    }
}

fn collect_free<'a>(expr: &'a Expr, bound: &mut Vec<&'a str>, free: &mut BTreeSet<String>) {
    match expr {
        Expr::Unary { scope, .. } => collect_free(scope, bound, free),
        Expr::Binary { lhs, rhs, .. } => {
            collect_free(lhs, bound, free);
            collect_free(rhs, bound, free);
        }
        Expr::Quantification {
            variable, scope, ..
        } => {
            bound.push(variable.as_str());
            collect_free(scope, bound, free);
            bound.pop();
        }
        Expr::Identity { lhs, rhs } => {
            collect_free_term(lhs, bound, free);
            collect_free_term(rhs, bound, free);
        }
        Expr::Predication { arguments, .. } => {
            for argument in arguments {
                collect_free_term(argument, bound, free);
            }
        }
    }
}

fn collect_free_term(term: &Term, bound: &[&str], free: &mut BTreeSet<String>) {
    if let Term::Variable(name) = term {
        if !bound.contains(&name.as_str()) {
            free.insert(name.clone());
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unary { op, scope } => write!(f, "{}{scope}", op.symbol()),
            Self::Binary { op, lhs, rhs } => write!(f, "({lhs} {} {rhs})", op.symbol()),
            Self::Quantification {
                quantifier,
                variable,
                scope,
            } => write!(f, "{}{variable} {scope}", quantifier.symbol()),
            Self::Identity { lhs, rhs } => write!(f, "{lhs} = {rhs}"),
            Self::Predication {
                predicate,
                arguments,
            } => {
                f.write_str(predicate)?;
                if arguments.is_empty() {
                    return Ok(());
                }
                let args = arguments
                    .iter()
                    .map(Term::literal)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "({args})")
            }
        }
    }
}
