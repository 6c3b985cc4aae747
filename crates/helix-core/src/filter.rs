use crate::expr::Predicate;

///
/// PredicateBuilder
///
/// Mutable conjunctive/disjunctive accumulator over an optional
/// predicate. `None` arguments are no-ops, nested groups that stay
/// empty are discarded, and the accumulator never materializes `True`
/// spuriously; "no predicate" and "always true" remain distinct
/// until execution.
///

#[derive(Clone, Debug, Default)]
pub struct PredicateBuilder {
    current: Option<Predicate>,
}

impl PredicateBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// Conjoin a predicate; `None` is a no-op.
    pub fn and(&mut self, predicate: impl Into<Option<Predicate>>) -> &mut Self {
        if let Some(predicate) = predicate.into() {
            self.current = Some(match self.current.take() {
                Some(existing) => existing.and(predicate),
                None => predicate,
            });
        }
        self
    }

    /// Disjoin a predicate; `None` is a no-op.
    pub fn or(&mut self, predicate: impl Into<Option<Predicate>>) -> &mut Self {
        if let Some(predicate) = predicate.into() {
            self.current = Some(match self.current.take() {
                Some(existing) => existing.or(predicate),
                None => predicate,
            });
        }
        self
    }

    /// Lazily conjoin when `condition` holds.
    pub fn and_if(&mut self, condition: bool, supplier: impl FnOnce() -> Predicate) -> &mut Self {
        if condition {
            self.and(supplier());
        }
        self
    }

    /// Lazily conjoin when the value is present.
    pub fn and_if_some<T>(
        &mut self,
        value: Option<T>,
        supplier: impl FnOnce(T) -> Predicate,
    ) -> &mut Self {
        if let Some(value) = value {
            self.and(supplier(value));
        }
        self
    }

    /// Lazily conjoin when the string is non-empty.
    pub fn and_if_not_empty(
        &mut self,
        value: &str,
        supplier: impl FnOnce(&str) -> Predicate,
    ) -> &mut Self {
        if !value.is_empty() {
            self.and(supplier(value));
        }
        self
    }

    /// Build a nested group and conjoin it; an empty group is
    /// discarded, not folded as a tautology.
    pub fn and_group(&mut self, group: impl FnOnce(&mut Self)) -> &mut Self {
        let mut nested = Self::new();
        group(&mut nested);
        self.and(nested.current)
    }

    /// Build a nested group and disjoin it; an empty group is
    /// discarded.
    pub fn or_group(&mut self, group: impl FnOnce(&mut Self)) -> &mut Self {
        let mut nested = Self::new();
        group(&mut nested);
        self.or(nested.current)
    }

    /// Negate the accumulated predicate; no-op when empty.
    pub fn not(&mut self) -> &mut Self {
        self.current = self.current.take().map(Predicate::not);
        self
    }

    /// Take the accumulated predicate, leaving the builder empty.
    pub fn build(&mut self) -> Option<Predicate> {
        self.current.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Expr, PathExpr};
    use crate::value::TypeTag;

    fn p(path: &str) -> Predicate {
        Expr::Path(PathExpr::new("TestUser", path, TypeTag::Text)).equals("x")
    }

    #[test]
    fn empty_builder_yields_none() {
        assert_eq!(PredicateBuilder::new().build(), None);
    }

    #[test]
    fn none_arguments_are_no_ops() {
        let mut builder = PredicateBuilder::new();
        builder.and(None).or(None);
        assert_eq!(builder.build(), None);
    }

    #[test]
    fn first_predicate_assigns_instead_of_combining() {
        let mut builder = PredicateBuilder::new();
        builder.and(p("a"));
        assert_eq!(builder.build(), Some(p("a")));
    }

    #[test]
    fn and_then_or_composes() {
        let mut builder = PredicateBuilder::new();
        builder.and(p("a")).and(p("b")).or(p("c"));
        assert_eq!(
            builder.build(),
            Some(p("a").and(p("b")).or(p("c")))
        );
    }

    #[test]
    fn empty_groups_are_discarded() {
        let mut builder = PredicateBuilder::new();
        builder.and(p("a")).and_group(|_| {}).or_group(|_| {});
        assert_eq!(builder.build(), Some(p("a")));
    }

    #[test]
    fn groups_fold_with_the_outer_accumulator() {
        let mut builder = PredicateBuilder::new();
        builder.and(p("a")).and_group(|g| {
            g.or(p("b")).or(p("c"));
        });
        assert_eq!(builder.build(), Some(p("a").and(p("b").or(p("c")))));
    }

    #[test]
    fn not_wraps_and_is_noop_when_empty() {
        let mut builder = PredicateBuilder::new();
        builder.not();
        assert_eq!(builder.build(), None);

        builder.and(p("a")).not();
        assert_eq!(builder.build(), Some(p("a").not()));
    }

    #[test]
    fn guarded_variants_apply_lazily() {
        let mut builder = PredicateBuilder::new();
        builder
            .and_if(false, || unreachable!())
            .and_if_some(None::<i32>, |_| unreachable!())
            .and_if_not_empty("", |_| unreachable!())
            .and_if(true, || p("a"))
            .and_if_some(Some(1), |_| p("b"))
            .and_if_not_empty("x", |_| p("c"));
        assert_eq!(builder.build(), Some(p("a").and(p("b")).and(p("c"))));
    }
}
