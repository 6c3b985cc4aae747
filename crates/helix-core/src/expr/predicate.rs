use super::{Expr, PathExpr};
use std::ops::{BitAnd, BitOr};

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

///
/// Predicate
///
/// Boolean layer of the expression IR. Pure data; all interpretation
/// happens in the compiler and the driver. `True`/`False` are the
/// explicit tautology/contradiction; the builder layer never
/// materializes them spuriously.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    True,
    False,
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    Compare {
        op: CompareOp,
        lhs: Expr,
        rhs: Expr,
    },
    Between {
        target: Expr,
        low: Expr,
        high: Expr,
    },
    IsNull(Expr),
    IsNotNull(Expr),
    In {
        target: Expr,
        values: Vec<Expr>,
        negated: bool,
    },
    Like {
        target: Expr,
        pattern: Expr,
        escape: Option<char>,
    },
    IsEmpty(PathExpr),
    IsNotEmpty(PathExpr),
    MemberOf {
        element: Expr,
        target: PathExpr,
    },
}

impl Predicate {
    #[must_use]
    pub const fn always_true() -> Self {
        Self::True
    }

    #[must_use]
    pub const fn always_false() -> Self {
        Self::False
    }

    #[must_use]
    pub fn compare(op: CompareOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Compare { op, lhs, rhs }
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::And(mut children) => {
                children.push(other);
                Self::And(children)
            }
            lhs => Self::And(vec![lhs, other]),
        }
    }

    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Or(mut children) => {
                children.push(other);
                Self::Or(children)
            }
            lhs => Self::Or(vec![lhs, other]),
        }
    }

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Fold a sequence of optional predicates with AND, ignoring `None`.
    #[must_use]
    pub fn all_of<I>(predicates: I) -> Option<Self>
    where
        I: IntoIterator<Item = Option<Self>>,
    {
        let present: Vec<Self> = predicates.into_iter().flatten().collect();
        match present.len() {
            0 => None,
            1 => present.into_iter().next(),
            _ => Some(Self::And(present)),
        }
    }

    /// Fold a sequence of optional predicates with OR, ignoring `None`.
    #[must_use]
    pub fn any_of<I>(predicates: I) -> Option<Self>
    where
        I: IntoIterator<Item = Option<Self>>,
    {
        let present: Vec<Self> = predicates.into_iter().flatten().collect();
        match present.len() {
            0 => None,
            1 => present.into_iter().next(),
            _ => Some(Self::Or(present)),
        }
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::TypeTag;

    fn named(path: &str) -> Expr {
        Expr::Path(PathExpr::new("User", path, TypeTag::Text))
    }

    #[test]
    fn and_flattens_left_associated_chains() {
        let p = named("a")
            .equals("x")
            .and(named("b").equals("y"))
            .and(named("c").equals("z"));
        match p {
            Predicate::And(children) => assert_eq!(children.len(), 3),
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn all_of_ignores_missing_and_unwraps_singletons() {
        let single = Predicate::all_of([None, Some(named("a").equals("x")), None]);
        assert!(matches!(single, Some(Predicate::Compare { .. })));
        assert_eq!(Predicate::all_of([None, None]), None);
    }

    #[test]
    fn bit_ops_compose() {
        let p = named("a").equals("x") & named("b").equals("y") | Predicate::always_false();
        assert!(matches!(p, Predicate::Or(_)));
    }
}
