use super::{HelixField, LIKE_ESCAPE, escape_like};
use crate::entity::Entity;
use crate::expr::{CompareOp, Expr, ExprOp, Predicate};
use crate::value::TypeTag;
use std::marker::PhantomData;

///
/// StringField
///
/// Descriptor for text attributes. Adds pattern matching (with
/// wildcard-safe helpers), case-insensitive equality, the string
/// scalar functions, and blank checks (`NULL OR ''`).
///

pub struct StringField<E> {
    name: &'static str,
    relation_path: Option<&'static str>,
    _marker: PhantomData<fn() -> E>,
}

impl<E> StringField<E> {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            relation_path: None,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn nested(name: &'static str, relation_path: &'static str) -> Self {
        Self {
            name,
            relation_path: Some(relation_path),
            _marker: PhantomData,
        }
    }
}

impl<E> Clone for StringField<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for StringField<E> {}

impl<E: Entity> HelixField<E> for StringField<E> {
    type Value = String;

    fn name(&self) -> &'static str {
        self.name
    }

    fn relation_path(&self) -> Option<&'static str> {
        self.relation_path
    }
}

impl<E: Entity> StringField<E> {
    // ------------------------------------------------------------------
    // Pattern matching
    // ------------------------------------------------------------------

    /// Raw LIKE; the caller owns wildcard semantics.
    #[must_use]
    pub fn like(self, pattern: impl Into<String>) -> Predicate {
        Predicate::Like {
            target: self.expr(),
            pattern: Expr::constant(pattern.into()),
            escape: None,
        }
    }

    #[must_use]
    pub fn like_opt(self, pattern: Option<impl Into<String>>) -> Option<Predicate> {
        pattern.map(|p| self.like(p))
    }

    /// Substring match; `%`, `_`, and the escape character in the
    /// input match literally.
    #[must_use]
    pub fn contains(self, substring: impl AsRef<str>) -> Predicate {
        self.escaped_like(format!("%{}%", escape_like(substring.as_ref())))
    }

    #[must_use]
    pub fn contains_opt(self, substring: Option<impl AsRef<str>>) -> Option<Predicate> {
        substring.map(|s| self.contains(s))
    }

    #[must_use]
    pub fn starts_with(self, prefix: impl AsRef<str>) -> Predicate {
        self.escaped_like(format!("{}%", escape_like(prefix.as_ref())))
    }

    #[must_use]
    pub fn starts_with_opt(self, prefix: Option<impl AsRef<str>>) -> Option<Predicate> {
        prefix.map(|s| self.starts_with(s))
    }

    #[must_use]
    pub fn ends_with(self, suffix: impl AsRef<str>) -> Predicate {
        self.escaped_like(format!("%{}", escape_like(suffix.as_ref())))
    }

    #[must_use]
    pub fn ends_with_opt(self, suffix: Option<impl AsRef<str>>) -> Option<Predicate> {
        suffix.map(|s| self.ends_with(s))
    }

    fn escaped_like(self, pattern: String) -> Predicate {
        Predicate::Like {
            target: self.expr(),
            pattern: Expr::constant(pattern),
            escape: Some(LIKE_ESCAPE),
        }
    }

    // ------------------------------------------------------------------
    // Case-insensitive equality
    // ------------------------------------------------------------------

    #[must_use]
    pub fn eq_ignore_case(self, value: impl AsRef<str>) -> Predicate {
        Predicate::compare(
            CompareOp::Eq,
            self.upper(),
            Expr::constant(value.as_ref().to_uppercase()),
        )
    }

    // ------------------------------------------------------------------
    // Scalar functions
    // ------------------------------------------------------------------

    #[must_use]
    pub fn upper(self) -> Expr {
        Expr::operation(ExprOp::Upper, vec![self.expr()], TypeTag::Text)
    }

    #[must_use]
    pub fn lower(self) -> Expr {
        Expr::operation(ExprOp::Lower, vec![self.expr()], TypeTag::Text)
    }

    #[must_use]
    pub fn trim(self) -> Expr {
        Expr::operation(ExprOp::Trim, vec![self.expr()], TypeTag::Text)
    }

    #[must_use]
    pub fn length(self) -> Expr {
        Expr::operation(ExprOp::Length, vec![self.expr()], TypeTag::Int)
    }

    // ------------------------------------------------------------------
    // Blank checks
    // ------------------------------------------------------------------

    /// `NULL OR ''`.
    #[must_use]
    pub fn is_blank(self) -> Predicate {
        self.is_null().or(Predicate::compare(
            CompareOp::Eq,
            self.expr(),
            Expr::constant(String::new()),
        ))
    }

    #[must_use]
    pub fn is_not_blank(self) -> Predicate {
        self.is_not_null().and(Predicate::compare(
            CompareOp::Ne,
            self.expr(),
            Expr::constant(String::new()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestUser;

    const NAME: StringField<TestUser> = StringField::new("name");

    #[test]
    fn contains_escapes_wildcards() {
        let p = NAME.contains("100%");
        match p {
            Predicate::Like {
                pattern, escape, ..
            } => {
                assert_eq!(
                    pattern,
                    Expr::constant("%100\\%%".to_string())
                );
                assert_eq!(escape, Some('\\'));
            }
            other => panic!("expected Like, got {other:?}"),
        }
    }

    #[test]
    fn raw_like_carries_no_escape() {
        match NAME.like("a%") {
            Predicate::Like { escape, .. } => assert_eq!(escape, None),
            other => panic!("expected Like, got {other:?}"),
        }
    }

    #[test]
    fn is_blank_is_null_or_empty() {
        assert!(matches!(NAME.is_blank(), Predicate::Or(children) if children.len() == 2));
    }
}
