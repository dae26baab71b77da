//! `Type`: the recursive `{kind, elem, unit}` type descriptor.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Kind, Unit};

/// A value's type: a [`Kind`] plus, for numeric kinds, an optional [`Unit`], or
/// for `chan`/`series` kinds, a required element [`Type`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind_tag")]
pub struct Type {
    /// The scalar kind.
    pub kind: Kind,
    /// The element type, required for `chan` and `series`, absent otherwise.
    pub elem: Option<Box<Type>>,
    /// Unit metadata, meaningful only for numeric kinds.
    pub unit: Option<Unit>,
}

impl Type {
    /// A bare scalar type with no unit.
    #[must_use]
    pub const fn scalar(kind: Kind) -> Self {
        Self {
            kind,
            elem: None,
            unit: None,
        }
    }

    /// A numeric type carrying the given unit.
    #[must_use]
    pub fn with_unit(kind: Kind, unit: Unit) -> Self {
        Self {
            kind,
            elem: None,
            unit: Some(unit),
        }
    }

    /// A `chan` or `series` type carrying the given element type.
    #[must_use]
    pub fn container(kind: Kind, elem: Self) -> Self {
        Self {
            kind,
            elem: Some(Box::new(elem)),
            unit: None,
        }
    }

    /// The canonical timestamp type: `i64` tagged with the nanosecond unit.
    #[must_use]
    pub fn timestamp() -> Self {
        Self::with_unit(Kind::I64, Unit::nanoseconds())
    }

    /// Per-sample byte width; zero for variable/compound kinds. Delegates to
    /// [`Kind::density`].
    #[must_use]
    pub const fn density(&self) -> usize {
        self.kind.density()
    }

    /// True for every kind other than `Invalid`.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.kind.is_valid()
    }

    /// True iff this type represents a timestamp: `kind == I64` and its unit
    /// satisfies [`Unit::is_timestamp`].
    #[must_use]
    pub fn is_timestamp(&self) -> bool {
        matches!(self.kind, Kind::I64) && self.unit.as_ref().is_some_and(Unit::is_timestamp)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Kind::String => return write!(f, "str"),
            Kind::Chan => {
                return match &self.elem {
                    Some(e) => write!(f, "chan {e}"),
                    None => write!(f, "chan <invalid>"),
                };
            }
            Kind::Series => {
                return match &self.elem {
                    Some(e) => write!(f, "series {e}"),
                    None => write!(f, "series <invalid>"),
                };
            }
            Kind::Invalid => return write!(f, "invalid"),
            _ => {}
        }
        write!(f, "{}", self.kind.base_name())?;
        if let Some(unit) = &self.unit {
            if !unit.name.is_empty() {
                write!(f, " {}", unit.name)?;
            }
        }
        Ok(())
    }
}
