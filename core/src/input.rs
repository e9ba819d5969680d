//! Text normalization: command-word equivalences, keyword extraction and
//! delimiter splitting of command bodies.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ParseError;

pub const COMMAND_ADD: &str = "add";
pub const COMMAND_EDIT: &str = "edit";
pub const COMMAND_REMOVE: &str = "remove";
pub const COMMAND_SHOW: &str = "show";
pub const COMMAND_HIDE: &str = "hide";
pub const COMMAND_DONE: &str = "done";
pub const COMMAND_UNDONE: &str = "undone";
pub const COMMAND_UNDO: &str = "undo";
pub const COMMAND_REDO: &str = "redo";
pub const COMMAND_CLEAR: &str = "clear";
pub const COMMAND_HELP: &str = "help";
pub const COMMAND_ABOUT: &str = "about";
pub const COMMAND_SETTINGS: &str = "settings";
pub const COMMAND_EXIT: &str = "exit";

pub const COMMANDS: &[&str] = &[
    COMMAND_ADD,
    COMMAND_EDIT,
    COMMAND_REMOVE,
    COMMAND_SHOW,
    COMMAND_HIDE,
    COMMAND_DONE,
    COMMAND_UNDONE,
    COMMAND_UNDO,
    COMMAND_REDO,
    COMMAND_CLEAR,
    COMMAND_HELP,
    COMMAND_ABOUT,
    COMMAND_SETTINGS,
    COMMAND_EXIT,
];

pub const DELIMITER_AT: char = '@';
pub const DELIMITER_HASH: char = '#';
pub const DELIMITER_DASH: char = '-';
const DELIMITER_CLEAR_DATES: &str = "-@";
const DELIMITER_CLEAR_TAGS: &str = "-#";
const ESCAPE: char = '\\';

/// Ordered rewrite table applied to the whole input line. Earlier rules run first.
const EQUIVALENCE_RULES: &[(&str, &str)] = &[
    (r"(?i)^\s*(?:do|create)\b", COMMAND_ADD),
    (r"(?i)^\s*change\b", COMMAND_EDIT),
    (r"(?i)^\s*(?:rm|delete)\b", COMMAND_REMOVE),
    (r"(?i)^\s*(?:ls|search|find)\b", COMMAND_SHOW),
    (r"(?i)^\s*quit\b", COMMAND_EXIT),
    (r"(?i)\s(?:by|at|from|on)\b", " @"),
];

static EQUIVALENCES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    EQUIVALENCE_RULES
        .iter()
        .map(|(pattern, replacement)| {
            let regex = Regex::new(pattern)
                .unwrap_or_else(|e| panic!("invalid equivalence pattern {pattern}: {e}"));
            (regex, *replacement)
        })
        .collect()
});

/// A line split into its command keyword and the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// Lower-cased first token of the rewritten line.
    pub keyword: String,
    /// Everything after the keyword, trimmed.
    pub argument: String,
    /// The whole rewritten line, trimmed.
    pub text: String,
}

impl Normalized {
    pub fn is_command(&self) -> bool {
        is_command(&self.keyword)
    }
}

pub fn is_command(keyword: &str) -> bool {
    COMMANDS.contains(&keyword)
}

/// Applies every equivalence rewrite in order.
pub fn rewrite(raw: &str) -> String {
    EQUIVALENCES
        .iter()
        .fold(raw.to_string(), |text, (regex, replacement)| {
            regex.replace_all(&text, *replacement).into_owned()
        })
}

pub fn normalize(raw: &str) -> Normalized {
    let text = rewrite(raw).trim().to_string();
    let (keyword, argument) = match text.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (text.as_str(), ""),
    };

    Normalized {
        keyword: keyword.to_lowercase(),
        argument: argument.to_string(),
        text: text.clone(),
    }
}

/// A tag instruction found in a command body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagToken {
    Add(String),
    Remove(String),
    ClearAll,
}

/// A command body cut along its delimiters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body {
    /// Words before the first `@`, with tags removed.
    pub description: String,
    /// One entry per `@`, in order.
    pub temporal: Vec<String>,
    pub tags: Vec<TagToken>,
    /// A standalone `-@` was present.
    pub clear_dates: bool,
}

impl Body {
    pub fn is_empty(&self) -> bool {
        self.description.is_empty()
            && self.temporal.is_empty()
            && self.tags.is_empty()
            && !self.clear_dates
    }
}

/// Splits a body on `@` and `#` delimiters.
///
/// A `#` only starts a tag at the beginning of a word, so `c#` stays in the
/// description. A word starting with a backslash is taken literally.
pub fn split_body(body: &str) -> Result<Body, ParseError> {
    let mut result = Body::default();
    let mut description: Vec<&str> = Vec::new();
    let mut temporal: Vec<Vec<&str>> = Vec::new();

    for word in body.split_whitespace() {
        if let Some(literal) = word.strip_prefix(ESCAPE) {
            push_word(&mut description, &mut temporal, literal);
            continue;
        }
        if word == DELIMITER_CLEAR_DATES {
            result.clear_dates = true;
            continue;
        }
        if word == DELIMITER_CLEAR_TAGS {
            result.tags.push(TagToken::ClearAll);
            continue;
        }
        if let Some(name) = word.strip_prefix(DELIMITER_HASH) {
            result.tags.push(tag_token(name)?);
            continue;
        }

        let mut pieces = word.split(DELIMITER_AT);
        if let Some(first) = pieces.next() {
            push_word(&mut description, &mut temporal, first);
        }
        for piece in pieces {
            temporal.push(Vec::new());
            push_word(&mut description, &mut temporal, piece);
        }
    }

    result.description = description.join(" ");
    result.temporal = temporal.into_iter().map(|words| words.join(" ")).collect();
    Ok(result)
}

fn push_word<'a>(description: &mut Vec<&'a str>, temporal: &mut [Vec<&'a str>], word: &'a str) {
    if word.is_empty() {
        return;
    }
    match temporal.last_mut() {
        Some(segment) => segment.push(word),
        None => description.push(word),
    }
}

fn tag_token(name: &str) -> Result<TagToken, ParseError> {
    match name.strip_prefix(DELIMITER_DASH) {
        Some("") => Err(ParseError::TagNoName),
        Some(removed) => Ok(TagToken::Remove(removed.to_string())),
        None if name.is_empty() => Err(ParseError::TagNoName),
        None => Ok(TagToken::Add(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_equivalences() {
        assert_eq!(normalize("do homework").keyword, "add");
        assert_eq!(normalize("do homework").argument, "homework");
        assert_eq!(normalize("create report").keyword, "add");
        assert_eq!(normalize("change 1 report").keyword, "edit");
        assert_eq!(normalize("rm 2").keyword, "remove");
        assert_eq!(normalize("delete 2").keyword, "remove");
        assert_eq!(normalize("ls").keyword, "show");
        assert_eq!(normalize("search milk").keyword, "show");
        assert_eq!(normalize("find milk").keyword, "show");
        assert_eq!(normalize("quit").keyword, "exit");
        assert_eq!(normalize("Delete 3").keyword, "remove");
    }

    #[test]
    fn test_equivalence_only_at_start() {
        let n = normalize("add do homework");
        assert_eq!(n.keyword, "add");
        assert_eq!(n.argument, "do homework");
        // "done" is not "do"
        assert_eq!(normalize("done 1").keyword, "done");
    }

    #[test]
    fn test_connectors_become_at() {
        assert_eq!(rewrite("add essay by friday"), "add essay @ friday");
        assert_eq!(rewrite("add meet at 2pm"), "add meet @ 2pm");
        assert_eq!(rewrite("add class from 2pm to 3pm"), "add class @ 2pm to 3pm");
        assert_eq!(rewrite("add party on sat"), "add party @ sat");
        // whole words only
        assert_eq!(rewrite("add buy bread"), "add buy bread");
        assert_eq!(rewrite("add attend online course"), "add attend online course");
    }

    #[test]
    fn test_unknown_keyword_is_reported() {
        let n = normalize("bad command blah blah");
        assert_eq!(n.keyword, "bad");
        assert!(!n.is_command());
        assert_eq!(n.text, "bad command blah blah");
    }

    #[test]
    fn test_split_body() {
        let body = split_body("buy milk @ 2pm - 3pm #shopping").unwrap();
        assert_eq!(body.description, "buy milk");
        assert_eq!(body.temporal, vec!["2pm - 3pm".to_string()]);
        assert_eq!(body.tags, vec![TagToken::Add("shopping".to_string())]);

        let body = split_body("buy milk @2pm-3pm").unwrap();
        assert_eq!(body.description, "buy milk");
        assert_eq!(body.temporal, vec!["2pm-3pm".to_string()]);
    }

    #[test]
    fn test_split_body_tags_and_markers() {
        let body = split_body("#-old #new -@ -# learn c#").unwrap();
        assert_eq!(body.description, "learn c#");
        assert!(body.clear_dates);
        assert_eq!(
            body.tags,
            vec![
                TagToken::Remove("old".to_string()),
                TagToken::Add("new".to_string()),
                TagToken::ClearAll,
            ]
        );
        assert_eq!(split_body("task #"), Err(ParseError::TagNoName));
        assert_eq!(split_body("task #-"), Err(ParseError::TagNoName));
    }

    #[test]
    fn test_split_body_escape() {
        let body = split_body(r"reply \@alice about \#42").unwrap();
        assert_eq!(body.description, "reply @alice about #42");
        assert!(body.temporal.is_empty());
        assert!(body.tags.is_empty());
    }

    #[test]
    fn test_split_body_multiple_at() {
        let body = split_body("meet @ 2pm @ friday").unwrap();
        assert_eq!(body.description, "meet");
        assert_eq!(body.temporal, vec!["2pm".to_string(), "friday".to_string()]);
    }
}
