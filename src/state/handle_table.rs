//! The 32-bit handle table: interned strings and handle-addressed series.
//!
//! Grounded on spec §3 "Handle table" and the `string_create`/`series_get`
//! family of bindings in `examples/original_source/arc/cpp/runtime/wasm/bindings.cpp`.
//! Handle `0` is reserved as the null handle; `slab::Slab` indices are offset
//! by one to keep that reservation without wasting a table slot.

use std::collections::HashMap;
use std::rc::Rc;

use slab::Slab;

use crate::types::{Series, SeriesHandle, StringHandle};

/// Interned strings and handle-table series, released when the table (and
/// therefore the owning [`super::State`]) is dropped.
#[derive(Debug, Default)]
pub struct HandleTable {
    strings: Slab<Rc<str>>,
    string_dedup: HashMap<Rc<str>, StringHandle>,
    series: Slab<Rc<Series>>,
}

impl HandleTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `s`, deduplicating by content. Returns the existing handle if
    /// this exact string was interned before. The empty string is never
    /// interned: it returns the null handle, matching the zero-handle
    /// convention `channel_read_str` uses for "no string".
    pub fn string_create(&mut self, s: impl Into<Rc<str>>) -> StringHandle {
        let s: Rc<str> = s.into();
        if s.is_empty() {
            return StringHandle::NULL;
        }
        if let Some(&h) = self.string_dedup.get(&s) {
            return h;
        }
        let idx = self.strings.insert(s.clone());
        let handle = StringHandle(idx as u32 + 1);
        self.string_dedup.insert(s, handle);
        handle
    }

    /// Interns a string decoded from raw bytes (the `string_from_literal`
    /// binding reads these out of WASM linear memory before calling in).
    pub fn string_from_bytes(&mut self, bytes: &[u8]) -> StringHandle {
        let s = String::from_utf8_lossy(bytes);
        self.string_create(s.into_owned())
    }

    /// Looks up an interned string by handle.
    #[must_use]
    pub fn string_get(&self, handle: StringHandle) -> Option<&str> {
        if handle.is_null() {
            return None;
        }
        self.strings
            .get(handle.0 as usize - 1)
            .map(|rc| rc.as_ref())
    }

    /// True if `handle` currently addresses a live string.
    #[must_use]
    pub fn string_exists(&self, handle: StringHandle) -> bool {
        !handle.is_null() && self.strings.contains(handle.0 as usize - 1)
    }

    /// Stores a series, returning a fresh handle. Unlike strings, series are
    /// not deduplicated by content: they are frequently built element-by-element
    /// and then published once.
    pub fn series_store(&mut self, series: Series) -> SeriesHandle {
        let idx = self.series.insert(Rc::new(series));
        SeriesHandle(idx as u32 + 1)
    }

    /// Borrows the series addressed by `handle`.
    #[must_use]
    pub fn series_get(&self, handle: SeriesHandle) -> Option<&Series> {
        if handle.is_null() {
            return None;
        }
        self.series.get(handle.0 as usize - 1).map(Rc::as_ref)
    }

    /// Replaces the series addressed by `handle` in place (used by
    /// `series_set_element_<T>`, which mutates a handle-table series rather
    /// than publishing a new one).
    pub fn series_replace(&mut self, handle: SeriesHandle, series: Series) {
        if handle.is_null() {
            return;
        }
        if let Some(slot) = self.series.get_mut(handle.0 as usize - 1) {
            *slot = Rc::new(series);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Kind, Type};

    #[test]
    fn handle_zero_is_never_issued() {
        let mut t = HandleTable::new();
        let h = t.string_create("hello");
        assert!(!h.is_null());
    }

    #[test]
    fn empty_string_returns_the_null_handle() {
        let mut t = HandleTable::new();
        let h = t.string_create("");
        assert!(h.is_null());
        assert_eq!(h, StringHandle::NULL);
        assert!(!t.string_exists(h));
    }

    #[test]
    fn identical_strings_dedup_to_the_same_handle() {
        let mut t = HandleTable::new();
        let a = t.string_create("x");
        let b = t.string_create("x");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_strings_get_distinct_handles() {
        let mut t = HandleTable::new();
        let a = t.string_create("x");
        let b = t.string_create("y");
        assert_ne!(a, b);
    }

    #[test]
    fn series_round_trips_through_handle() {
        let mut t = HandleTable::new();
        let h = t.series_store(Series::empty(Type::scalar(Kind::I32)));
        assert!(t.series_get(h).is_some());
        assert!(t.series_get(SeriesHandle::NULL).is_none());
    }

    #[test]
    fn series_replace_updates_in_place() {
        let mut t = HandleTable::new();
        let h = t.series_store(Series::one(1_i32));
        t.series_replace(h, Series::one(2_i32));
        assert_eq!(t.series_get(h).unwrap().at::<i32>(0), Some(2));
    }
}
