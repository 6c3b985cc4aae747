use super::Expr;

///
/// SortDirection
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

///
/// NullHandling
///
/// Advisory placement of null values within an ordered result.
/// `Default` follows the driver's convention (the reference engine
/// uses nulls-last ascending, nulls-first descending).
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum NullHandling {
    #[default]
    Default,
    First,
    Last,
}

///
/// Order
///
/// One order-by clause: target expression, direction, null placement.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    pub expr: Expr,
    pub direction: SortDirection,
    pub nulls: NullHandling,
}

impl Order {
    #[must_use]
    pub fn asc(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            direction: SortDirection::Asc,
            nulls: NullHandling::Default,
        }
    }

    #[must_use]
    pub fn desc(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            direction: SortDirection::Desc,
            nulls: NullHandling::Default,
        }
    }

    #[must_use]
    pub const fn nulls_first(mut self) -> Self {
        self.nulls = NullHandling::First;
        self
    }

    #[must_use]
    pub const fn nulls_last(mut self) -> Self {
        self.nulls = NullHandling::Last;
        self
    }
}
