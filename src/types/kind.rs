//! The `Kind` scalar-type tag.

use serde::{Deserialize, Serialize};

/// The scalar kind of a value, series, channel, or state variable.
///
/// Timestamps are not a distinct kind: they are carried as [`Kind::I64`] tagged
/// with the canonical nanosecond [`super::Unit`] (see [`super::Type::is_timestamp`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// No value; the zero kind. Density 0.
    Invalid,
    /// Unsigned 8-bit integer.
    U8,
    /// Unsigned 16-bit integer.
    U16,
    /// Unsigned 32-bit integer.
    U32,
    /// Unsigned 64-bit integer.
    U64,
    /// Signed 8-bit integer.
    I8,
    /// Signed 16-bit integer.
    I16,
    /// Signed 32-bit integer.
    I32,
    /// Signed 64-bit integer. Also the carrier kind for timestamps.
    I64,
    /// 32-bit IEEE-754 float.
    F32,
    /// 64-bit IEEE-754 float.
    F64,
    /// UTF-8 string, addressed by handle when crossing the WASM boundary.
    String,
    /// A channel reference, carrying an element type.
    Chan,
    /// A series reference, carrying an element type.
    Series,
}

impl Kind {
    /// Per-sample byte width for fixed-width numeric kinds; zero for variable or
    /// compound kinds (`string`, `chan`, `series`, `invalid`).
    #[must_use]
    pub const fn density(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
            Self::Invalid | Self::String | Self::Chan | Self::Series => 0,
        }
    }

    /// True for every kind other than `Invalid`.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        !matches!(self, Self::Invalid)
    }

    /// True if this kind is numeric (participates in arithmetic and comparison ops).
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
                | Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::F32
                | Self::F64
        )
    }

    /// The base name used by [`super::Type::to_string`], before any unit suffix.
    #[must_use]
    pub const fn base_name(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "str",
            Self::Chan => "chan",
            Self::Series => "series",
        }
    }
}
