//! Sequential human-readable codes
//!
//! Books and loans are identified by `PREFIX-PARTITION-NNNN` codes. The
//! sequence is scoped to a partition key (genre for books, borrower for
//! loans) and continues from the last code issued for that partition.

use crate::error::{AppError, AppResult};

const SEPARATOR: char = '-';

/// Build the code following `last` for the given partition.
///
/// The partition segment always comes from `partition`, never from `last`.
/// Sequences past 9999 keep all their digits.
pub fn next_code(prefix: &str, partition: &str, last: Option<&str>) -> AppResult<String> {
    let next = match last {
        None => 1,
        Some(code) => {
            let current = sequence_of(code).ok_or_else(|| {
                AppError::Internal(format!("Cannot continue sequence from malformed code '{}'", code))
            })?;
            current
                .checked_add(1)
                .ok_or_else(|| AppError::Internal(format!("Sequence exhausted after '{}'", code)))?
        }
    };

    Ok(format!("{}{}{}{}{:04}", prefix, SEPARATOR, partition, SEPARATOR, next))
}

/// Numeric suffix of a code, if it has one
pub fn sequence_of(code: &str) -> Option<u32> {
    let (_, suffix) = code.rsplit_once(SEPARATOR)?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_code_of_partition() {
        assert_eq!(next_code("LOAN", "alice", None).unwrap(), "LOAN-alice-0001");
        assert_eq!(next_code("LIB", "FIC", None).unwrap(), "LIB-FIC-0001");
    }

    #[test]
    fn continues_from_last_code() {
        assert_eq!(
            next_code("LOAN", "alice", Some("LOAN-alice-0009")).unwrap(),
            "LOAN-alice-0010"
        );
        assert_eq!(
            next_code("LIB", "FIC", Some("LIB-FIC-0099")).unwrap(),
            "LIB-FIC-0100"
        );
    }

    #[test]
    fn sequence_is_monotonic() {
        let mut last: Option<String> = None;
        for expected in 1..=25u32 {
            let code = next_code("LOAN", "bob", last.as_deref()).unwrap();
            assert_eq!(sequence_of(&code), Some(expected));
            last = Some(code);
        }
        assert_eq!(last.as_deref(), Some("LOAN-bob-0025"));
    }

    #[test]
    fn partition_comes_from_new_record() {
        assert_eq!(
            next_code("LOAN", "carol", Some("LOAN-alice-0004")).unwrap(),
            "LOAN-carol-0005"
        );
    }

    #[test]
    fn does_not_truncate_past_four_digits() {
        assert_eq!(
            next_code("LOAN", "alice", Some("LOAN-alice-9999")).unwrap(),
            "LOAN-alice-10000"
        );
        assert_eq!(
            next_code("LOAN", "alice", Some("LOAN-alice-10000")).unwrap(),
            "LOAN-alice-10001"
        );
    }

    #[test]
    fn partition_containing_separator() {
        assert_eq!(sequence_of("LOAN-jean-paul-0003"), Some(3));
        assert_eq!(
            next_code("LOAN", "jean-paul", Some("LOAN-jean-paul-0003")).unwrap(),
            "LOAN-jean-paul-0004"
        );
    }

    #[test]
    fn malformed_last_code_is_rejected() {
        assert!(next_code("LOAN", "alice", Some("LOAN-alice-abc")).is_err());
        tokio_test::assert_err!(next_code("LOAN", "alice", Some("nodash")));
        assert!(next_code("LOAN", "alice", Some("LOAN-alice-")).is_err());
    }
}
