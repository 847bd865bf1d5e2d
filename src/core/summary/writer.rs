//! Fixed-capacity text buffer for building summaries.

use std::fmt;

/// A scalar value rendered into a summary field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// Rendered inside double quotes, without escaping
    Str(&'a str),
    Int(i64),
    /// Rendered with six fractional digits
    Float(f64),
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => write!(f, "\"{}\"", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(x) => write!(f, "{:.6}", x),
        }
    }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(s: &'a str) -> Self {
        FieldValue::Str(s)
    }
}

impl<'a> From<&'a String> for FieldValue<'a> {
    fn from(s: &'a String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<i64> for FieldValue<'_> {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<u32> for FieldValue<'_> {
    fn from(i: u32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<f64> for FieldValue<'_> {
    fn from(x: f64) -> Self {
        FieldValue::Float(x)
    }
}

/// Append-only buffer that never grows past its capacity.
///
/// Appends that do not fit are cut at the last whole character that
/// does, and the buffer is marked exhausted. Every later append is a
/// no-op, so an exhausted buffer holds a prefix of the intended text.
#[derive(Debug, Clone)]
pub struct BoundedWriter {
    buf: String,
    capacity: usize,
    exhausted: bool,
    completed: bool,
}

impl BoundedWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
            capacity,
            exhausted: false,
            completed: false,
        }
    }

    /// Append as much of `s` as fits. Returns the bytes written.
    pub fn push(&mut self, s: &str) -> usize {
        if self.exhausted {
            return 0;
        }

        let remaining = self.remaining();
        if s.len() <= remaining {
            self.buf.push_str(s);
            return s.len();
        }

        let mut cut = remaining;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        self.buf.push_str(&s[..cut]);
        self.exhausted = true;
        cut
    }

    pub fn begin_object(&mut self) -> usize {
        self.push("{")
    }

    /// Close the object. The document only counts as completed when the
    /// closing brace itself fits.
    pub fn end_object(&mut self) -> usize {
        let written = self.push("}");
        if written == 1 {
            self.completed = true;
        }
        written
    }

    /// Append `"key":value`, followed by a comma unless `is_last`
    pub fn write_field<'a>(
        &mut self,
        key: &str,
        value: impl Into<FieldValue<'a>>,
        is_last: bool,
    ) -> usize {
        let separator = if is_last { "" } else { "," };
        let fragment = format!("\"{}\":{}{}", key, value.into(), separator);
        self.push(&fragment)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.buf.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

impl fmt::Write for BoundedWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.push(s) == s.len() {
            Ok(())
        } else {
            Err(fmt::Error)
        }
    }
}
