//! Task id lists: `3`, `2,4-6`, `1 3 5`, `last`, `all`, `max`.
//!
//! Ids are 1-based positions in the current list.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ParseError;
use crate::input::DELIMITER_DASH;

const KEYWORD_LAST: &str = "last";
const KEYWORD_MAX: &str = "max";
const KEYWORD_ALL: &str = "all";
const KEYWORD_EVERYTHING: &str = "everything";

static DASH_SPACING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*-\s*").unwrap_or_else(|e| panic!("invalid dash pattern: {e}")));

/// The parts of the store an id list can refer to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdContext {
    pub total: usize,
    /// 0-based position of the most recently added task.
    pub last: Option<usize>,
}

/// Resolves an id list into ascending, de-duplicated 1-based ids.
pub fn resolve_ids(text: &str, ctx: IdContext) -> Result<Vec<usize>, ParseError> {
    let compact = DASH_SPACING.replace_all(text.trim(), "-").to_lowercase();
    let mut ids = BTreeSet::new();

    for token in compact
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
    {
        match token {
            KEYWORD_ALL | KEYWORD_EVERYTHING => {
                if ctx.total == 0 {
                    return Err(ParseError::NoTasks);
                }
                ids.extend(1..=ctx.total);
            }
            _ => match token.split_once(DELIMITER_DASH) {
                Some((from, to)) => {
                    if from.is_empty() || to.is_empty() || to.contains(DELIMITER_DASH) {
                        return Err(ParseError::NotARange(token.to_string()));
                    }
                    let from = resolve_single(from, ctx)?;
                    let to = resolve_single(to, ctx)?;
                    if from > to {
                        return Err(ParseError::InvalidRange(from, to));
                    }
                    ids.extend(from..=to);
                }
                None => {
                    ids.insert(resolve_single(token, ctx)?);
                }
            },
        }
    }

    Ok(ids.into_iter().collect())
}

fn resolve_single(token: &str, ctx: IdContext) -> Result<usize, ParseError> {
    let id = match token {
        KEYWORD_LAST => ctx.last.map(|pos| pos + 1).ok_or(ParseError::NoLast)?,
        KEYWORD_MAX => {
            if ctx.total == 0 {
                return Err(ParseError::NoTasks);
            }
            ctx.total
        }
        _ => token
            .parse::<usize>()
            .map_err(|_| ParseError::NotANumber(token.to_string()))?,
    };
    if id == 0 || id > ctx.total {
        return Err(ParseError::IdOutOfRange(id, ctx.total));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(total: usize) -> IdContext {
        IdContext { total, last: None }
    }

    #[test]
    fn test_single_and_lists() {
        assert_eq!(resolve_ids("3", ctx(5)), Ok(vec![3]));
        assert_eq!(resolve_ids("3, 1 ,2", ctx(5)), Ok(vec![1, 2, 3]));
        assert_eq!(resolve_ids("1 3 5", ctx(5)), Ok(vec![1, 3, 5]));
        assert_eq!(resolve_ids("2,2,2", ctx(5)), Ok(vec![2]));
    }

    #[test]
    fn test_comma_of_ranges() {
        assert_eq!(resolve_ids("2,4-6", ctx(6)), Ok(vec![2, 4, 5, 6]));
        assert_eq!(resolve_ids("4 - 6, 1", ctx(6)), Ok(vec![1, 4, 5, 6]));
        assert_eq!(resolve_ids("1-3,2-4", ctx(6)), Ok(vec![1, 2, 3, 4]));
    }

    #[test]
    fn test_range_errors() {
        assert_eq!(resolve_ids("5-2", ctx(6)), Err(ParseError::InvalidRange(5, 2)));
        assert_eq!(resolve_ids("5-", ctx(6)), Err(ParseError::NotARange("5-".to_string())));
        assert_eq!(resolve_ids("-5", ctx(6)), Err(ParseError::NotARange("-5".to_string())));
        assert_eq!(resolve_ids("1-2-3", ctx(6)), Err(ParseError::NotARange("1-2-3".to_string())));
        assert_eq!(resolve_ids("1 - 2 - 3", ctx(6)), Err(ParseError::NotARange("1-2-3".to_string())));
        assert_eq!(resolve_ids("2-9", ctx(6)), Err(ParseError::IdOutOfRange(9, 6)));
    }

    #[test]
    fn test_bad_numbers() {
        assert_eq!(resolve_ids("two", ctx(6)), Err(ParseError::NotANumber("two".to_string())));
        assert_eq!(resolve_ids("0", ctx(6)), Err(ParseError::IdOutOfRange(0, 6)));
        assert_eq!(resolve_ids("7", ctx(6)), Err(ParseError::IdOutOfRange(7, 6)));
        assert_eq!(resolve_ids("1", ctx(0)), Err(ParseError::IdOutOfRange(1, 0)));
    }

    #[test]
    fn test_keywords() {
        let with_last = IdContext {
            total: 4,
            last: Some(1),
        };
        assert_eq!(resolve_ids("last", with_last), Ok(vec![2]));
        assert_eq!(resolve_ids("LAST", with_last), Ok(vec![2]));
        assert_eq!(resolve_ids("max", with_last), Ok(vec![4]));
        assert_eq!(resolve_ids("last-max", with_last), Ok(vec![2, 3, 4]));
        assert_eq!(resolve_ids("all", with_last), Ok(vec![1, 2, 3, 4]));
        assert_eq!(resolve_ids("everything", with_last), Ok(vec![1, 2, 3, 4]));

        assert_eq!(resolve_ids("last", ctx(4)), Err(ParseError::NoLast));
        assert_eq!(resolve_ids("all", ctx(0)), Err(ParseError::NoTasks));
        assert_eq!(resolve_ids("max", ctx(0)), Err(ParseError::NoTasks));
    }
}
