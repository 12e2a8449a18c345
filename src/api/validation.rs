use thiserror::Error;

use super::models::RangeQuery;
use crate::backend::Range;
use crate::partition::parse_u32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestValidationError {
    #[error("'{0}' is not a valid ledger sequence")]
    InvalidSequence(String),
    #[error("query parameter 'from' is required")]
    MissingFrom,
    #[error("range end {to} is before range start {from}")]
    InvertedRange { from: u32, to: u32 },
}

pub fn parse_sequence(raw: &str) -> Result<u32, RequestValidationError> {
    parse_u32(raw).ok_or_else(|| RequestValidationError::InvalidSequence(raw.to_string()))
}

/// Range described by `from` and optional `to`; no `to` means unbounded
pub fn validate_range(query: &RangeQuery) -> Result<Range, RequestValidationError> {
    let from = query
        .from
        .as_deref()
        .ok_or(RequestValidationError::MissingFrom)
        .and_then(parse_sequence)?;

    match query.to.as_deref() {
        None => Ok(Range::unbounded(from)),
        Some(raw) => {
            let to = parse_sequence(raw)?;
            if to < from {
                return Err(RequestValidationError::InvertedRange { from, to });
            }
            Ok(Range::bounded(from, to))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(from: Option<&str>, to: Option<&str>) -> RangeQuery {
        RangeQuery {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
        }
    }

    #[test]
    fn parse_sequence_rejects_non_digits() {
        assert_eq!(parse_sequence("42"), Ok(42));
        assert!(parse_sequence("-1").is_err());
        assert!(parse_sequence("+1").is_err());
        assert!(parse_sequence("4294967296").is_err());
        assert!(parse_sequence("").is_err());
    }

    #[test]
    fn validate_range_bounded_and_unbounded() {
        assert_eq!(
            validate_range(&query(Some("10"), Some("20"))),
            Ok(Range::bounded(10, 20))
        );
        assert_eq!(
            validate_range(&query(Some("10"), None)),
            Ok(Range::unbounded(10))
        );
        assert_eq!(
            validate_range(&query(Some("7"), Some("7"))),
            Ok(Range::single(7))
        );
    }

    #[test]
    fn validate_range_rejects_bad_input() {
        assert_eq!(
            validate_range(&query(None, Some("5"))),
            Err(RequestValidationError::MissingFrom)
        );
        assert_eq!(
            validate_range(&query(Some("9"), Some("3"))),
            Err(RequestValidationError::InvertedRange { from: 9, to: 3 })
        );
        assert!(matches!(
            validate_range(&query(Some("abc"), None)),
            Err(RequestValidationError::InvalidSequence(_))
        ));
    }
}
