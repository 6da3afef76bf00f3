//! Table subjects: the partition key of a table's event stream.

use jotti_core::error::DomainError;

/// Prefix of every table subject.
pub const TABLE_SUBJECT_PREFIX: &str = "table:";

/// Builds the subject of a table's event stream, e.g. `table:12`.
#[must_use]
pub fn table_subject(table_id: i64) -> String {
    format!("{TABLE_SUBJECT_PREFIX}{table_id}")
}

/// Parses the table id out of a subject.
///
/// The remainder after the prefix must be a non-empty run of ASCII digits.
///
/// # Errors
///
/// Returns `DomainError::InvalidSubject` if the prefix is missing or the
/// remainder is not a decimal integer that fits an `i64`.
pub fn parse_table_id(subject: &str) -> Result<i64, DomainError> {
    let digits = subject
        .strip_prefix(TABLE_SUBJECT_PREFIX)
        .filter(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| DomainError::InvalidSubject(subject.to_owned()))?;
    digits
        .parse()
        .map_err(|_| DomainError::InvalidSubject(subject.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_subject_format() {
        assert_eq!(table_subject(1), "table:1");
        assert_eq!(table_subject(4711), "table:4711");
    }

    #[test]
    fn test_parse_table_id_round_trips() {
        assert_eq!(parse_table_id(&table_subject(42)).unwrap(), 42);
    }

    #[test]
    fn test_parse_table_id_rejects_malformed_subjects() {
        for subject in [
            "table:abc",
            "table:",
            "table:-1",
            "table:+1",
            "table: 1",
            "tables:1",
            "user:1",
            "",
            "table:99999999999999999999",
        ] {
            match parse_table_id(subject) {
                Err(DomainError::InvalidSubject(s)) => assert_eq!(s, subject),
                other => panic!("expected InvalidSubject for {subject:?}, got {other:?}"),
            }
        }
    }
}
