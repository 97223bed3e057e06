//! Primitive reading and writing for the SDT text format.
//!
//! Every production is a marker, a colon separated header and a payload whose
//! length is given in characters. Readers work on string slices so that a
//! child production can be handed to the decoder as a complete node.

use crate::error::DecodeError;

// =============================================================================
// DECODING
// =============================================================================

/// Reader over marshalled text.
///
/// Tracks a byte position but measures every declared length in characters.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader positioned at the start of `data`.
    pub fn new(data: &'a str) -> Self {
        Self { data, pos: 0 }
    }

    /// Creates a reader positioned just past `marker`.
    ///
    /// `data` must start with `marker`. Markers are ASCII, so the offset is
    /// always a character boundary.
    pub fn after_marker(data: &'a str, marker: &str) -> Self {
        debug_assert!(data.starts_with(marker));
        Self {
            data,
            pos: marker.len(),
        }
    }

    /// Returns the unread text.
    pub fn remaining(&self) -> &'a str {
        &self.data[self.pos..]
    }

    /// Returns the number of unread characters.
    pub fn remaining_chars(&self) -> usize {
        char_len(self.remaining())
    }

    /// Returns true if all data has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Reads up to the next colon and consumes it.
    pub fn read_field(&mut self, context: &'static str) -> Result<&'a str, DecodeError> {
        let rest = self.remaining();
        let colon = rest
            .find(':')
            .ok_or(DecodeError::MissingDelimiter { context })?;
        self.pos += colon + 1;
        Ok(&rest[..colon])
    }

    /// Reads a colon terminated decimal length.
    pub fn read_length(&mut self, context: &'static str) -> Result<usize, DecodeError> {
        let text = self.read_field(context)?;
        parse_length(text, context)
    }

    /// Reads exactly `n` characters.
    pub fn read_chars(&mut self, n: usize, context: &'static str) -> Result<&'a str, DecodeError> {
        let rest = self.remaining();
        let end = char_offset(rest, n).ok_or(DecodeError::UnexpectedEnd { context })?;
        self.pos += end;
        Ok(&rest[..end])
    }

    /// Reads a `<anything>:<len>:<text>` string and returns the text.
    ///
    /// Map keys and class names are written with an empty leading field.
    pub fn read_string(&mut self, context: &'static str) -> Result<&'a str, DecodeError> {
        self.read_field(context)?;
        let len = self.read_length(context)?;
        self.read_chars(len, context)
    }

    /// Reads one complete nested production and returns all of its text,
    /// marker included.
    ///
    /// Every production has the shape `<marker><field>:<len>:<payload>`, so
    /// the extent of a child is known without interpreting it.
    pub fn read_object(&mut self, context: &'static str) -> Result<&'a str, DecodeError> {
        let start = self.pos;
        self.read_field(context)?;
        let len = self.read_length(context)?;
        self.read_chars(len, context)?;
        Ok(&self.data[start..self.pos])
    }

    /// Checks that exactly `declared` characters remain.
    pub fn expect_remaining(
        &self,
        declared: usize,
        context: &'static str,
    ) -> Result<(), DecodeError> {
        let actual = self.remaining_chars();
        if declared != actual {
            return Err(DecodeError::LengthMismatch {
                context,
                declared,
                actual,
            });
        }
        Ok(())
    }
}

/// Parses a decimal length field.
pub fn parse_length(text: &str, context: &'static str) -> Result<usize, DecodeError> {
    text.parse::<usize>()
        .map_err(|_| DecodeError::InvalidLength {
            context,
            text: text.to_string(),
        })
}

/// Returns the byte offset of the `n`th character of `s`, or `s.len()` when
/// `s` has exactly `n` characters.
#[inline]
pub fn char_offset(s: &str, n: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    if n <= bytes.len() && bytes[..n].is_ascii() {
        return Some(n);
    }

    let mut seen = 0;
    for (offset, _) in s.char_indices() {
        if seen == n {
            return Some(offset);
        }
        seen += 1;
    }
    (seen == n).then_some(s.len())
}

/// Number of characters in `s`.
#[inline]
pub fn char_len(s: &str) -> usize {
    if s.is_ascii() {
        s.len()
    } else {
        s.chars().count()
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writer for marshalled text.
///
/// Keeps a running character count so a finished body can be prefixed with
/// its length without rescanning it.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: String,
    chars: usize,
}

impl Writer {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with `capacity` bytes preallocated.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
            chars: 0,
        }
    }

    /// Consumes the writer and returns the text.
    pub fn into_string(self) -> String {
        self.buf
    }

    /// Returns the text written so far.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Returns the number of characters written.
    pub fn char_len(&self) -> usize {
        self.chars
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes ASCII text such as a marker or delimiter.
    #[inline]
    pub fn write_ascii(&mut self, s: &str) {
        debug_assert!(s.is_ascii());
        self.buf.push_str(s);
        self.chars += s.len();
    }

    /// Writes arbitrary text.
    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.buf.push_str(s);
        self.chars += char_len(s);
    }

    /// Writes a decimal number.
    #[inline]
    pub fn write_number(&mut self, n: usize) {
        self.write_ascii(&n.to_string());
    }

    /// Writes `<len>:<s>` with `len` counted in characters.
    pub fn write_length_prefixed(&mut self, s: &str) {
        let len = char_len(s);
        self.write_number(len);
        self.buf.push(':');
        self.buf.push_str(s);
        self.chars += 1 + len;
    }

    /// Appends the contents of another writer.
    pub fn append(&mut self, other: Writer) {
        self.buf.push_str(&other.buf);
        self.chars += other.chars;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_field_and_length() {
        let mut reader = Reader::new("S:12:rest");
        assert_eq!(reader.read_field("type").unwrap(), "S");
        assert_eq!(reader.read_length("len").unwrap(), 12);
        assert_eq!(reader.remaining(), "rest");
    }

    #[test]
    fn test_missing_delimiter() {
        let mut reader = Reader::new("no colon here");
        assert_eq!(
            reader.read_field("field"),
            Err(DecodeError::MissingDelimiter { context: "field" })
        );
    }

    #[test]
    fn test_invalid_length() {
        let mut reader = Reader::new("x1:");
        assert!(matches!(
            reader.read_length("len"),
            Err(DecodeError::InvalidLength { .. })
        ));
        assert!(parse_length("", "len").is_err());
        assert!(parse_length("-1", "len").is_err());
    }

    #[test]
    fn test_read_chars_counts_characters() {
        let mut reader = Reader::new("h\u{e9}llo!");
        assert_eq!(reader.read_chars(5, "text").unwrap(), "h\u{e9}llo");
        assert_eq!(reader.remaining(), "!");
        assert_eq!(
            reader.read_chars(2, "text"),
            Err(DecodeError::UnexpectedEnd { context: "text" })
        );
    }

    #[test]
    fn test_read_object_returns_whole_production() {
        let mut reader = Reader::new("@SDT/$S:3:abc@SDT/$0:0:");
        assert_eq!(reader.read_object("item").unwrap(), "@SDT/$S:3:abc");
        assert_eq!(reader.read_object("item").unwrap(), "@SDT/$0:0:");
        assert!(reader.is_empty());
    }

    #[test]
    fn test_expect_remaining() {
        let reader = Reader::after_marker("@SDT/{\u{e9}\u{e9}", "@SDT/{");
        assert!(reader.expect_remaining(2, "map").is_ok());
        assert_eq!(
            reader.expect_remaining(4, "map"),
            Err(DecodeError::LengthMismatch {
                context: "map",
                declared: 4,
                actual: 2
            })
        );
    }

    #[test]
    fn test_char_offset() {
        assert_eq!(char_offset("abc", 0), Some(0));
        assert_eq!(char_offset("abc", 3), Some(3));
        assert_eq!(char_offset("abc", 4), None);
        assert_eq!(char_offset("\u{e9}a", 1), Some(2));
        assert_eq!(char_offset("\u{e9}a", 2), Some(3));
        assert_eq!(char_offset("\u{e9}a", 3), None);
    }

    #[test]
    fn test_writer_tracks_characters() {
        let mut writer = Writer::new();
        writer.write_ascii("@SDT/$S:");
        writer.write_length_prefixed("h\u{e9}");
        assert_eq!(writer.as_str(), "@SDT/$S:2:h\u{e9}");
        assert_eq!(writer.char_len(), 12);
        assert_eq!(writer.len(), 13);

        let mut outer = Writer::with_capacity(32);
        outer.write_number(writer.char_len());
        outer.append(writer);
        assert_eq!(outer.char_len(), 14);
    }
}
