use std::str::FromStr;

use memchr::memchr;

use crate::error::XlateError;

/// Tab-delimited view over one record.
///
/// A single scan records the byte offset of every delimiter; accessors then
/// slice the record without copying. The offset vector lives in the translator
/// state and is reused from record to record, so steady-state translation
/// allocates nothing on the input side.
pub struct Fields<'a> {
    src: &'a [u8],
    tabs: &'a [usize],
}

/// Scan `src` for tab delimiters, reusing `tabs` as offset storage.
pub fn scan<'a>(src: &'a [u8], tabs: &'a mut Vec<usize>) -> Fields<'a> {
    tabs.clear();
    let mut pos = 0;
    while let Some(idx) = memchr(b'\t', &src[pos..]) {
        tabs.push(pos + idx);
        pos += idx + 1;
    }
    Fields { src, tabs: tabs.as_slice() }
}

impl<'a> Fields<'a> {
    /// Number of fields in the record. An empty record counts as one empty field.
    #[must_use]
    pub fn count(&self) -> usize {
        self.tabs.len() + 1
    }

    fn bounds(&self, idx: usize) -> (usize, usize) {
        let start = if idx == 0 { 0 } else { self.tabs[idx - 1] + 1 };
        let end = if idx < self.tabs.len() { self.tabs[idx] } else { self.src.len() };
        (start, end)
    }

    /// Field `idx` as raw bytes.
    ///
    /// # Panics
    /// Panics if `idx` is out of bounds; callers must check [`Fields::count`]
    /// (or [`Fields::require`]) first.
    #[must_use]
    pub fn get(&self, idx: usize) -> &'a [u8] {
        let (start, end) = self.bounds(idx);
        &self.src[start..end]
    }

    /// Everything from the start of field `idx` to the end of the record,
    /// delimiters included. Used to carry trailing columns through verbatim.
    #[must_use]
    pub fn tail(&self, idx: usize) -> &'a [u8] {
        let (start, _) = self.bounds(idx);
        &self.src[start..]
    }

    /// Fail with a `FieldCount` error unless the record carries at least `min` fields.
    pub fn require(&self, format: &'static str, expected: &'static str, min: usize) -> Result<(), XlateError> {
        if self.count() < min {
            return Err(XlateError::FieldCount { format, expected, found: self.count() })
        }
        Ok(())
    }

    /// Parse field `idx` with its `FromStr` implementation.
    pub fn parse<T: FromStr>(
        &self,
        format: &'static str,
        field: &'static str,
        idx: usize,
    ) -> Result<T, XlateError> {
        let raw = self.get(idx);
        std::str::from_utf8(raw)
            .ok()
            .and_then(|repr| repr.parse().ok())
            .ok_or_else(|| XlateError::invalid(format, field, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_slices_all_fields() {
        let mut tabs = Vec::new();
        let record = b"chr1\t100\t\tlast";
        let fields = scan(record, &mut tabs);

        assert_eq!(fields.count(), 4);
        assert_eq!(fields.get(0), b"chr1");
        assert_eq!(fields.get(1), b"100");
        assert_eq!(fields.get(2), b"");
        assert_eq!(fields.get(3), b"last");
    }

    #[test]
    fn tail_keeps_delimiters() {
        let mut tabs = Vec::new();
        let fields = scan(b"a\tb\tc\td", &mut tabs);
        assert_eq!(fields.tail(1), b"b\tc\td");
        assert_eq!(fields.tail(3), b"d");
    }

    #[test]
    fn parse_reports_field_and_value() {
        let mut tabs = Vec::new();
        let fields = scan(b"chr1\tNaN", &mut tabs);
        let err = fields.parse::<u64>("sam", "POS", 1).unwrap_err();
        assert_eq!(
            err,
            XlateError::InvalidField { format: "sam", field: "POS", value: "NaN".into() }
        );
    }

    #[test]
    fn require_counts_fields() {
        let mut tabs = Vec::new();
        let fields = scan(b"only\tthree\tfields", &mut tabs);
        assert!(fields.require("sam", "at least 11", 11).is_err());
        assert!(fields.require("sam", "at least 3", 3).is_ok());
    }

    #[test]
    fn scan_reuses_offset_storage() {
        let mut tabs = Vec::new();
        {
            let fields = scan(b"a\tb\tc", &mut tabs);
            assert_eq!(fields.count(), 3);
        }
        let fields = scan(b"x\ty", &mut tabs);
        assert_eq!(fields.count(), 2);
        assert_eq!(fields.get(1), b"y");
    }
}
