//! `Series`: a typed, length-prefixed, contiguous sample buffer.

use std::fmt;

use super::{Kind, Type};

/// Backing storage for a [`Series`], one variant per scalar [`Kind`] that can
/// appear in a buffer (`chan`/`invalid` never back a concrete buffer).
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesData {
    /// `u8` samples.
    U8(Vec<u8>),
    /// `u16` samples.
    U16(Vec<u16>),
    /// `u32` samples.
    U32(Vec<u32>),
    /// `u64` samples.
    U64(Vec<u64>),
    /// `i8` samples.
    I8(Vec<i8>),
    /// `i16` samples.
    I16(Vec<i16>),
    /// `i32` samples.
    I32(Vec<i32>),
    /// `i64` samples (also the carrier for timestamp series).
    I64(Vec<i64>),
    /// `f32` samples.
    F32(Vec<f32>),
    /// `f64` samples.
    F64(Vec<f64>),
    /// UTF-8 string samples.
    String(Vec<String>),
}

/// A single decoded sample, used where a value must be returned without
/// committing to a static Rust type (e.g. IR default-value literals).
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    /// `u8` sample.
    U8(u8),
    /// `u16` sample.
    U16(u16),
    /// `u32` sample.
    U32(u32),
    /// `u64` sample.
    U64(u64),
    /// `i8` sample.
    I8(i8),
    /// `i16` sample.
    I16(i16),
    /// `i32` sample.
    I32(i32),
    /// `i64` sample.
    I64(i64),
    /// `f32` sample.
    F32(f32),
    /// `f64` sample.
    F64(f64),
    /// String sample.
    String(String),
}

macro_rules! data_len {
    ($data:expr) => {
        match $data {
            SeriesData::U8(v) => v.len(),
            SeriesData::U16(v) => v.len(),
            SeriesData::U32(v) => v.len(),
            SeriesData::U64(v) => v.len(),
            SeriesData::I8(v) => v.len(),
            SeriesData::I16(v) => v.len(),
            SeriesData::I32(v) => v.len(),
            SeriesData::I64(v) => v.len(),
            SeriesData::F32(v) => v.len(),
            SeriesData::F64(v) => v.len(),
            SeriesData::String(v) => v.len(),
        }
    };
}

/// A scalar element that can be read from and written to a [`Series`].
pub trait Element: Copy + Default + PartialEq + fmt::Debug + 'static {
    /// The scalar [`Kind`] this Rust type represents.
    const KIND: Kind;

    /// Wraps an owned vector of this type as [`SeriesData`].
    fn wrap_vec(v: Vec<Self>) -> SeriesData;

    /// Borrows the underlying slice, if `data` holds this element type.
    fn as_slice(data: &SeriesData) -> Option<&[Self]>;

    /// Mutably borrows the underlying vector, if `data` holds this element type.
    fn as_mut_vec(data: &mut SeriesData) -> Option<&mut Vec<Self>>;
}

macro_rules! impl_element {
    ($ty:ty, $kind:expr, $variant:ident) => {
        impl Element for $ty {
            const KIND: Kind = $kind;

            fn wrap_vec(v: Vec<Self>) -> SeriesData {
                SeriesData::$variant(v)
            }

            fn as_slice(data: &SeriesData) -> Option<&[Self]> {
                match data {
                    SeriesData::$variant(v) => Some(v.as_slice()),
                    _ => None,
                }
            }

            fn as_mut_vec(data: &mut SeriesData) -> Option<&mut Vec<Self>> {
                match data {
                    SeriesData::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_element!(u8, Kind::U8, U8);
impl_element!(u16, Kind::U16, U16);
impl_element!(u32, Kind::U32, U32);
impl_element!(u64, Kind::U64, U64);
impl_element!(i8, Kind::I8, I8);
impl_element!(i16, Kind::I16, I16);
impl_element!(i32, Kind::I32, I32);
impl_element!(i64, Kind::I64, I64);
impl_element!(f32, Kind::F32, F32);
impl_element!(f64, Kind::F64, F64);

/// A typed, length-prefixed, contiguous sample buffer with a data-type tag.
///
/// `Series` values are meant to be shared via `Rc<Series>` once built: refcounts
/// are thread-local (never atomic) because all runtime-thread mutation happens
/// before a series is published into a value slot or the handle table.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    dtype: Type,
    data: SeriesData,
}

impl Series {
    /// An empty series of the given type.
    #[must_use]
    pub fn empty(dtype: Type) -> Self {
        let data = match dtype.kind {
            Kind::U8 => SeriesData::U8(Vec::new()),
            Kind::U16 => SeriesData::U16(Vec::new()),
            Kind::U32 => SeriesData::U32(Vec::new()),
            Kind::U64 => SeriesData::U64(Vec::new()),
            Kind::I8 => SeriesData::I8(Vec::new()),
            Kind::I16 => SeriesData::I16(Vec::new()),
            Kind::I32 => SeriesData::I32(Vec::new()),
            Kind::I64 => SeriesData::I64(Vec::new()),
            Kind::F32 => SeriesData::F32(Vec::new()),
            Kind::F64 => SeriesData::F64(Vec::new()),
            Kind::String | Kind::Chan | Kind::Series | Kind::Invalid => {
                SeriesData::String(Vec::new())
            }
        };
        Self { dtype, data }
    }

    /// A one-element series holding `value`.
    #[must_use]
    pub fn one<T: Element>(value: T) -> Self {
        let mut s = Self::empty(Type::scalar(T::KIND));
        s.write(value);
        s
    }

    /// A one-element string series.
    #[must_use]
    pub fn one_string(value: impl Into<String>) -> Self {
        Self {
            dtype: Type::scalar(Kind::String),
            data: SeriesData::String(vec![value.into()]),
        }
    }

    /// The series' declared type.
    #[must_use]
    pub const fn data_type(&self) -> &Type {
        &self.dtype
    }

    /// The underlying storage, for callers that must dispatch on [`Kind`]
    /// directly (host bindings, IR default-value materialisation).
    #[must_use]
    pub const fn raw(&self) -> &SeriesData {
        &self.data
    }

    /// Mutable access to the underlying storage, for in-place indexed writes
    /// (`series_set_element_<T>`) that would otherwise require a full
    /// append-and-truncate round trip.
    pub fn raw_mut(&mut self) -> &mut SeriesData {
        &mut self.data
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        data_len!(&self.data)
    }

    /// True if there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the sample at `index`, with negative indices counting from the
    /// tail (`-1` is the last sample). Returns `None` if out of range or if `T`
    /// does not match the series' element type.
    #[must_use]
    pub fn at<T: Element>(&self, index: isize) -> Option<T> {
        let slice = T::as_slice(&self.data)?;
        let len = slice.len();
        let idx = if index < 0 {
            len.checked_sub(index.unsigned_abs())?
        } else {
            index as usize
        };
        slice.get(idx).copied()
    }

    /// Reads the string sample at `index`, with negative indices from the tail.
    #[must_use]
    pub fn at_string(&self, index: isize) -> Option<&str> {
        let SeriesData::String(v) = &self.data else {
            return None;
        };
        let len = v.len();
        let idx = if index < 0 {
            len.checked_sub(index.unsigned_abs())?
        } else {
            index as usize
        };
        v.get(idx).map(String::as_str)
    }

    /// Appends one sample. No-op if `T` does not match the series' element
    /// type (a logic error upstream; host bindings always construct series of
    /// the correct type before writing to them).
    pub fn write<T: Element>(&mut self, value: T) {
        if let Some(v) = T::as_mut_vec(&mut self.data) {
            v.push(value);
        }
    }

    /// Appends one string sample.
    pub fn write_string(&mut self, value: impl Into<String>) {
        if let SeriesData::String(v) = &mut self.data {
            v.push(value.into());
        }
    }

    /// Resizes to `n` samples, padding with the default value or truncating.
    pub fn resize(&mut self, n: usize) {
        macro_rules! resize_variant {
            ($v:expr) => {
                $v.resize(n, Default::default())
            };
        }
        match &mut self.data {
            SeriesData::U8(v) => resize_variant!(v),
            SeriesData::U16(v) => resize_variant!(v),
            SeriesData::U32(v) => resize_variant!(v),
            SeriesData::U64(v) => resize_variant!(v),
            SeriesData::I8(v) => resize_variant!(v),
            SeriesData::I16(v) => resize_variant!(v),
            SeriesData::I32(v) => resize_variant!(v),
            SeriesData::I64(v) => resize_variant!(v),
            SeriesData::F32(v) => resize_variant!(v),
            SeriesData::F64(v) => resize_variant!(v),
            SeriesData::String(v) => v.resize(n, String::new()),
        }
    }

    /// Returns a new series over the half-open byte range `[start, end)` in
    /// sample units, or `None` if `start >= end` or either bound is
    /// out-of-range. Note: per the Arc runtime's preserved historical
    /// behaviour, `start == end` is treated by callers (see
    /// [`crate::wasm::bindings`]) as the out-of-range case, returning handle 0
    /// rather than an empty-series handle.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> Option<Self> {
        if start >= end || end > self.len() {
            return None;
        }
        macro_rules! slice_variant {
            ($variant:ident, $v:expr) => {
                SeriesData::$variant($v[start..end].to_vec())
            };
        }
        let data = match &self.data {
            SeriesData::U8(v) => slice_variant!(U8, v),
            SeriesData::U16(v) => slice_variant!(U16, v),
            SeriesData::U32(v) => slice_variant!(U32, v),
            SeriesData::U64(v) => slice_variant!(U64, v),
            SeriesData::I8(v) => slice_variant!(I8, v),
            SeriesData::I16(v) => slice_variant!(I16, v),
            SeriesData::I32(v) => slice_variant!(I32, v),
            SeriesData::I64(v) => slice_variant!(I64, v),
            SeriesData::F32(v) => slice_variant!(F32, v),
            SeriesData::F64(v) => slice_variant!(F64, v),
            SeriesData::String(v) => SeriesData::String(v[start..end].to_vec()),
        };
        Some(Self {
            dtype: self.dtype.clone(),
            data,
        })
    }

    /// A deep copy of this series (new backing storage, same values).
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    /// True if the last sample is nonzero (numeric kinds) or non-empty
    /// (string kind). Used by `is_output_truthy`. Empty series are falsy.
    #[must_use]
    pub fn last_is_truthy(&self) -> bool {
        match &self.data {
            SeriesData::U8(v) => v.last().is_some_and(|&x| x != 0),
            SeriesData::U16(v) => v.last().is_some_and(|&x| x != 0),
            SeriesData::U32(v) => v.last().is_some_and(|&x| x != 0),
            SeriesData::U64(v) => v.last().is_some_and(|&x| x != 0),
            SeriesData::I8(v) => v.last().is_some_and(|&x| x != 0),
            SeriesData::I16(v) => v.last().is_some_and(|&x| x != 0),
            SeriesData::I32(v) => v.last().is_some_and(|&x| x != 0),
            SeriesData::I64(v) => v.last().is_some_and(|&x| x != 0),
            SeriesData::F32(v) => v.last().is_some_and(|&x| x != 0.0),
            SeriesData::F64(v) => v.last().is_some_and(|&x| x != 0.0),
            SeriesData::String(v) => v.last().is_some_and(|s| !s.is_empty()),
        }
    }
}

/// Applies `f` elementwise across two equal-length numeric series of the same
/// kind, returning a new series of the same kind.
///
/// # Panics
///
/// Panics if the two series have different lengths or non-matching/non-numeric
/// kinds — this is the `wasm_panic` condition of a length-mismatch binary
/// series operation (spec-mandated: compiled user code that triggers this is
/// reported upward, not silently clamped).
pub fn zip_numeric(
    a: &Series,
    b: &Series,
    f: impl Fn(f64, f64) -> f64,
) -> Series {
    assert_eq!(
        a.len(),
        b.len(),
        "series-series op requires equal length ({} vs {})",
        a.len(),
        b.len()
    );
    assert_eq!(a.dtype.kind, b.dtype.kind, "series-series op requires matching kind");
    map_pairs(a, b, f)
}

fn map_pairs(a: &Series, b: &Series, f: impl Fn(f64, f64) -> f64) -> Series {
    macro_rules! arm {
        ($variant:ident, $ctor:expr) => {{
            let (av, bv) = match (&a.data, &b.data) {
                (SeriesData::$variant(av), SeriesData::$variant(bv)) => (av, bv),
                _ => unreachable!("kind already asserted equal"),
            };
            let out: Vec<_> = av
                .iter()
                .zip(bv.iter())
                .map(|(&x, &y)| $ctor(f(x as f64, y as f64)))
                .collect();
            Series {
                dtype: a.dtype.clone(),
                data: SeriesData::$variant(out),
            }
        }};
    }
    match a.dtype.kind {
        Kind::U8 => arm!(U8, |v: f64| v as u8),
        Kind::U16 => arm!(U16, |v: f64| v as u16),
        Kind::U32 => arm!(U32, |v: f64| v as u32),
        Kind::U64 => arm!(U64, |v: f64| v as u64),
        Kind::I8 => arm!(I8, |v: f64| v as i8),
        Kind::I16 => arm!(I16, |v: f64| v as i16),
        Kind::I32 => arm!(I32, |v: f64| v as i32),
        Kind::I64 => arm!(I64, |v: f64| v as i64),
        Kind::F32 => arm!(F32, |v: f64| v as f32),
        Kind::F64 => arm!(F64, |v: f64| v),
        Kind::String | Kind::Chan | Kind::Series | Kind::Invalid => {
            panic!("elementwise op not supported for kind {:?}", a.dtype.kind)
        }
    }
}

/// `series op scalar` (or, with `rhs_on_left = true`, `scalar op series`),
/// elementwise, producing a new series of the same kind.
#[must_use]
pub fn scalar_op(series: &Series, scalar: f64, rhs_on_left: bool, f: impl Fn(f64, f64) -> f64) -> Series {
    let g = move |x: f64| if rhs_on_left { f(scalar, x) } else { f(x, scalar) };
    macro_rules! arm {
        ($variant:ident, $ctor:expr) => {{
            let SeriesData::$variant(v) = &series.data else {
                unreachable!()
            };
            let out: Vec<_> = v.iter().map(|&x| $ctor(g(x as f64))).collect();
            Series {
                dtype: series.dtype.clone(),
                data: SeriesData::$variant(out),
            }
        }};
    }
    match series.dtype.kind {
        Kind::U8 => arm!(U8, |v: f64| v as u8),
        Kind::U16 => arm!(U16, |v: f64| v as u16),
        Kind::U32 => arm!(U32, |v: f64| v as u32),
        Kind::U64 => arm!(U64, |v: f64| v as u64),
        Kind::I8 => arm!(I8, |v: f64| v as i8),
        Kind::I16 => arm!(I16, |v: f64| v as i16),
        Kind::I32 => arm!(I32, |v: f64| v as i32),
        Kind::I64 => arm!(I64, |v: f64| v as i64),
        Kind::F32 => arm!(F32, |v: f64| v as f32),
        Kind::F64 => arm!(F64, |v: f64| v),
        Kind::String | Kind::Chan | Kind::Series | Kind::Invalid => {
            panic!("scalar op not supported for kind {:?}", series.dtype.kind)
        }
    }
}

/// Elementwise comparison of two equal-length series, producing a `u8` series
/// (`1` for true, `0` for false).
///
/// # Panics
///
/// Panics on length mismatch (the `wasm_panic` condition).
#[must_use]
pub fn compare(a: &Series, b: &Series, f: impl Fn(f64, f64) -> bool) -> Series {
    assert_eq!(a.len(), b.len(), "series-series comparison requires equal length");
    let result = zip_numeric(a, b, |x, y| f64::from(u8::from(f(x, y))));
    // zip_numeric preserves `a`'s kind; coerce the 0/1 payload into a u8 series.
    let mut out = Series::empty(Type::scalar(Kind::U8));
    for i in 0..result.len() {
        let v = read_as_f64(&result, i as isize);
        out.write(v as u8);
    }
    out
}

fn read_as_f64(s: &Series, i: isize) -> f64 {
    match &s.data {
        SeriesData::U8(_) => f64::from(s.at::<u8>(i).unwrap()),
        SeriesData::U16(_) => f64::from(s.at::<u16>(i).unwrap()),
        SeriesData::U32(_) => f64::from(s.at::<u32>(i).unwrap()),
        SeriesData::U64(_) => s.at::<u64>(i).unwrap() as f64,
        SeriesData::I8(_) => f64::from(s.at::<i8>(i).unwrap()),
        SeriesData::I16(_) => f64::from(s.at::<i16>(i).unwrap()),
        SeriesData::I32(_) => f64::from(s.at::<i32>(i).unwrap()),
        SeriesData::I64(_) => s.at::<i64>(i).unwrap() as f64,
        SeriesData::F32(_) => f64::from(s.at::<f32>(i).unwrap()),
        SeriesData::F64(_) => s.at::<f64>(i).unwrap(),
        SeriesData::String(_) => 0.0,
    }
}

/// Elementwise negation for signed/float series kinds.
///
/// # Panics
///
/// Panics if `series`'s kind is unsigned or non-numeric.
#[must_use]
pub fn negate(series: &Series) -> Series {
    macro_rules! arm {
        ($variant:ident) => {{
            let SeriesData::$variant(v) = &series.data else {
                unreachable!()
            };
            Series {
                dtype: series.dtype.clone(),
                data: SeriesData::$variant(v.iter().map(|x| -x).collect()),
            }
        }};
    }
    match series.dtype.kind {
        Kind::I8 => arm!(I8),
        Kind::I16 => arm!(I16),
        Kind::I32 => arm!(I32),
        Kind::I64 => arm!(I64),
        Kind::F32 => arm!(F32),
        Kind::F64 => arm!(F64),
        other => panic!("negate not supported for kind {other:?}"),
    }
}

/// Logical not of a boolean-coded `u8` series: `0 -> 1`, any nonzero -> `0`.
#[must_use]
pub fn not_u8(series: &Series) -> Series {
    let SeriesData::U8(v) = &series.data else {
        panic!("series_not_u8 requires a u8 series");
    };
    Series {
        dtype: series.dtype.clone(),
        data: SeriesData::U8(v.iter().map(|&x| u8::from(x == 0)).collect()),
    }
}

/// A collection of [`Series`] accumulated for one channel within a tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiSeries {
    /// The accumulated series, oldest first.
    pub series: Vec<Series>,
}

impl MultiSeries {
    /// An empty accumulation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_and_read_back() {
        let mut s = Series::empty(Type::scalar(Kind::F64));
        s.write(1.0_f64);
        s.write(2.0_f64);
        s.write(3.0_f64);
        assert_eq!(s.at::<f64>(0), Some(1.0));
        assert_eq!(s.at::<f64>(-1), Some(3.0));
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn negative_index_out_of_range_is_none() {
        let s = Series::one(5_i32);
        assert_eq!(s.at::<i32>(-2), None);
    }

    #[test]
    fn resize_pads_with_default() {
        let mut s = Series::one(7_u8);
        s.resize(3);
        assert_eq!(s.len(), 3);
        assert_eq!(s.at::<u8>(1), Some(0));
    }

    #[test]
    fn slice_in_range() {
        let mut s = Series::empty(Type::scalar(Kind::F64));
        for v in [1.0, 2.0, 3.0] {
            s.write(v);
        }
        let sliced = s.slice(0, 2).unwrap();
        assert_eq!(sliced.len(), 2);
        assert_eq!(sliced.at::<f64>(0), Some(1.0));
    }

    #[test]
    fn slice_start_equals_end_is_none() {
        let s = Series::one(1.0_f64);
        assert_eq!(s.slice(0, 0), None);
    }

    #[test]
    fn slice_out_of_range_is_none() {
        let s = Series::one(1.0_f64);
        assert_eq!(s.slice(0, 5), None);
    }

    #[test]
    fn series_series_add_matches_elementwise() {
        let mut a = Series::empty(Type::scalar(Kind::F64));
        let mut b = Series::empty(Type::scalar(Kind::F64));
        for v in [1.0, 2.0, 3.0] {
            a.write(v);
        }
        for v in [10.0, 20.0, 30.0] {
            b.write(v);
        }
        let sum = zip_numeric(&a, &b, |x, y| x + y);
        assert_eq!(sum.at::<f64>(0), Some(11.0));
        assert_eq!(sum.at::<f64>(2), Some(33.0));
    }

    #[test]
    #[should_panic(expected = "equal length")]
    fn series_series_length_mismatch_panics() {
        let a = Series::one(1.0_f64);
        let mut b = Series::empty(Type::scalar(Kind::F64));
        b.write(1.0_f64);
        b.write(2.0_f64);
        let _ = zip_numeric(&a, &b, |x, y| x + y);
    }

    #[test]
    fn scalar_mul_both_orientations() {
        let mut s = Series::empty(Type::scalar(Kind::F64));
        for v in [1.0, 2.0, 3.0] {
            s.write(v);
        }
        let doubled = scalar_op(&s, 2.0, false, |x, y| x * y);
        assert_eq!(doubled.at::<f64>(0), Some(2.0));
        assert_eq!(doubled.at::<f64>(2), Some(6.0));
        let also_doubled = scalar_op(&s, 2.0, true, |x, y| x * y);
        assert_eq!(also_doubled, doubled);
    }

    #[test]
    fn negate_signed_and_float() {
        let s = Series::one(5_i32);
        assert_eq!(negate(&s).at::<i32>(0), Some(-5));
        let s = Series::one(2.5_f64);
        assert_eq!(negate(&s).at::<f64>(0), Some(-2.5));
    }

    #[test]
    fn not_u8_matches_spec_example() {
        let mut s = Series::empty(Type::scalar(Kind::U8));
        for v in [0_u8, 1, 2, 0] {
            s.write(v);
        }
        let n = not_u8(&s);
        let values: Vec<u8> = (0..4).map(|i| n.at::<u8>(i).unwrap()).collect();
        assert_eq!(values, vec![1, 0, 0, 1]);
    }

    #[test]
    fn compare_produces_u8_series() {
        let mut a = Series::empty(Type::scalar(Kind::F64));
        let mut b = Series::empty(Type::scalar(Kind::F64));
        for v in [1.0, 2.0, 3.0] {
            a.write(v);
        }
        for v in [1.0, 5.0, 2.0] {
            b.write(v);
        }
        let eq = compare(&a, &b, |x, y| x == y);
        assert_eq!(eq.at::<u8>(0), Some(1));
        assert_eq!(eq.at::<u8>(1), Some(0));
        assert_eq!(eq.at::<u8>(2), Some(0));
    }

    #[test]
    fn deep_copy_is_independent() {
        let mut s = Series::one(1_i32);
        let copy = s.deep_copy();
        s.write(2_i32);
        assert_eq!(copy.len(), 1);
        assert_eq!(s.len(), 2);
    }
}
