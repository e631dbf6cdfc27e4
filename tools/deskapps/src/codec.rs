//! One-record-per-line comma format.
//!
//! Fields are joined with a bare `,` and never quoted or escaped, so a field
//! that itself contains a comma does not survive a save/load cycle.

pub const DELIMITER: char = ',';

pub trait TextCodec: Sized {
    /// Number of fields in one encoded line.
    const ARITY: usize;

    /// Field values in their fixed declared order.
    fn fields(&self) -> Vec<String>;

    /// Builds a record from exactly `ARITY` trimmed fields, or `None` when a
    /// typed field does not parse.
    fn from_fields(fields: &[&str]) -> Option<Self>;

    fn encode(&self) -> String {
        self.fields().join(&DELIMITER.to_string())
    }

    fn decode(line: &str) -> Option<Self> {
        let fields = split_fields(line);
        if fields.len() != Self::ARITY {
            return None;
        }
        Self::from_fields(&fields)
    }
}

/// Splits a line on the delimiter, trims each field, and drops trailing empty
/// fields. A blank line yields a single empty field.
pub fn split_fields(line: &str) -> Vec<&str> {
    let mut fields = line.split(DELIMITER).map(str::trim).collect::<Vec<_>>();
    while fields.len() > 1 && fields.last().is_some_and(|field| field.is_empty()) {
        fields.pop();
    }
    fields
}
