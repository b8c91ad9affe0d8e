//! Extraction of column limits from CHECK constraint text.
//!
//! Anything the patterns do not recognize yields `None`; a malformed
//! definition is never an error.

use regex::Regex;

/// Length limit a CHECK definition places on `column`, e.g.
/// `CHECK ((char_length((name)::text) <= 50))` gives `Some(50)`.
pub fn extract_length_limit(definition: &str, column: &str) -> Option<u32> {
    let re = Regex::new(
        r#"(?i)\b(?:char_length|character_length|length)\s*\(\s*\(?\s*[`"]?(\w+)[`"]?\s*\)?\s*(?:::\s*[\w ]+?)?\s*\)\s*(<=|<)\s*(\d+)"#,
    )
    .ok()?;

    re.captures_iter(definition)
        .filter(|caps| caps[1].eq_ignore_ascii_case(column))
        .filter_map(|caps| {
            let bound = caps[3].parse::<u32>().ok()?;
            if &caps[2] == "<" {
                bound.checked_sub(1)
            } else {
                Some(bound)
            }
        })
        .min()
}

/// Values a CHECK definition allows for `column`, from either
/// `col = ANY (ARRAY['a', 'b'])` or `col IN ('a', 'b')`.
pub fn extract_allowed_values(definition: &str, column: &str) -> Option<Vec<String>> {
    parse_any_array(definition, column).or_else(|| parse_in_list(definition, column))
}

fn parse_any_array(definition: &str, column: &str) -> Option<Vec<String>> {
    let re = Regex::new(
        r#"(?i)\(?\s*[`"]?(\w+)[`"]?\s*\)?\s*(?:::\s*[\w ]+?)?\s*=\s*any\s*\(\s*\(?\s*array\s*\[([^\]]*)\]"#,
    )
    .ok()?;
    let caps = re
        .captures_iter(definition)
        .find(|caps| caps[1].eq_ignore_ascii_case(column))?;
    literal_list(&caps[2])
}

fn parse_in_list(definition: &str, column: &str) -> Option<Vec<String>> {
    let re = Regex::new(
        r#"(?i)[`"]?(\w+)[`"]?\s*\)?\s*(?:::\s*[\w ]+?)?\s+in\s*\(([^)]*)\)"#,
    )
    .ok()?;
    let caps = re
        .captures_iter(definition)
        .find(|caps| caps[1].eq_ignore_ascii_case(column))?;
    literal_list(&caps[2])
}

fn literal_list(raw: &str) -> Option<Vec<String>> {
    let values: Vec<String> = raw
        .split(',')
        .map(normalize_literal)
        .filter(|value| !value.is_empty())
        .collect();
    if values.is_empty() { None } else { Some(values) }
}

fn normalize_literal(value: &str) -> String {
    let trimmed = value.trim().trim_matches('(').trim_matches(')');
    let without_cast = match trimmed.split_once("::") {
        Some((left, _)) => left.trim(),
        None => trimmed,
    };
    let stripped = without_cast.trim();
    if stripped.starts_with('\'') && stripped.ends_with('\'') && stripped.len() >= 2 {
        stripped[1..stripped.len() - 1].replace("''", "'")
    } else {
        stripped.to_string()
    }
}
