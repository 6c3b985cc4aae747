use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

///
/// Float64
///
/// Total-order wrapper over `f64` so that floating-point values can
/// participate in `Eq`/`Ord` value positions (set keys, dedup tables,
/// deterministic sorts). Ordering follows IEEE 754 `totalOrder`.
///

#[derive(Clone, Copy, Debug, Serialize)]
pub struct Float64(pub f64);

impl Float64 {
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl From<f64> for Float64 {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<f32> for Float64 {
    fn from(value: f32) -> Self {
        Self(f64::from(value))
    }
}

impl PartialEq for Float64 {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Float64 {}

impl PartialOrd for Float64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Float64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Float64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
