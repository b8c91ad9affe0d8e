//! Engine-specific type-name normalization.

use crate::snapshot::Engine;

/// Type name reduced to the vocabulary the analysis and generators understand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedType {
    pub name: String,
    /// Normalized element type for array columns (`name` is then `ARRAY`).
    pub element_type: Option<String>,
    /// Schema qualifier of a user-defined type.
    pub qualifier: Option<String>,
    /// Labels of an inline enumeration such as MySQL `enum('a','b')`.
    pub inline_labels: Option<Vec<String>>,
}

impl NormalizedType {
    fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            element_type: None,
            qualifier: None,
            inline_labels: None,
        }
    }

    fn array_of(element: NormalizedType) -> Self {
        Self {
            name: "ARRAY".to_string(),
            element_type: Some(element.name),
            qualifier: element.qualifier,
            inline_labels: None,
        }
    }
}

/// Normalize a raw type name as reported by `engine`.
pub fn normalize_type_name(engine: Engine, raw: &str) -> NormalizedType {
    match engine {
        Engine::Postgres => normalize_postgres(raw),
        Engine::Mysql => normalize_mysql(raw),
    }
}

fn normalize_postgres(raw: &str) -> NormalizedType {
    let trimmed = raw.trim();

    if let Some(element) = trimmed.strip_suffix("[]") {
        return NormalizedType::array_of(normalize_postgres(element));
    }
    if let Some(element) = trimmed.strip_prefix('_') {
        return NormalizedType::array_of(normalize_postgres(element));
    }

    let unquoted = trimmed.replace('"', "");
    if let Some((schema, name)) = unquoted.split_once('.') {
        let mut normalized = NormalizedType::named(name.trim());
        normalized.qualifier = Some(schema.trim().to_string());
        return normalized;
    }

    let base = strip_modifiers(&unquoted).to_ascii_lowercase();
    let name = match base.as_str() {
        "int" | "int4" | "serial" | "serial4" => "integer",
        "int8" | "bigserial" | "serial8" => "bigint",
        "int2" | "smallserial" | "serial2" => "smallint",
        "bool" => "boolean",
        "varchar" => "character varying",
        "bpchar" | "char" => "character",
        "timestamptz" => "timestamp with time zone",
        "timestamp" => "timestamp without time zone",
        "timetz" => "time with time zone",
        "time" => "time without time zone",
        "float8" => "double precision",
        "float4" => "real",
        "decimal" => "numeric",
        other => other,
    };
    NormalizedType::named(name)
}

fn normalize_mysql(raw: &str) -> NormalizedType {
    let lower = raw.trim().to_ascii_lowercase();

    if lower.starts_with("enum(") {
        let mut normalized = NormalizedType::named("enum");
        normalized.inline_labels = Some(parse_quoted_list(raw.trim()));
        return normalized;
    }
    if lower.starts_with("tinyint(1)") {
        return NormalizedType::named("boolean");
    }

    let base = strip_modifiers(&lower);
    let base = base
        .split_whitespace()
        .filter(|word| *word != "unsigned" && *word != "zerofill")
        .collect::<Vec<_>>()
        .join(" ");
    let name = match base.as_str() {
        "integer" => "int",
        "bool" => "boolean",
        "dec" | "fixed" => "decimal",
        "double precision" | "real" => "double",
        "character varying" => "varchar",
        other => other,
    };
    NormalizedType::named(name)
}

/// Remove parenthesized modifiers and collapse whitespace:
/// `timestamp(3) with time zone` becomes `timestamp with time zone`.
fn strip_modifiers(raw: &str) -> String {
    let mut depth = 0_usize;
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse the single-quoted items of `enum('a','b','it''s')`.
fn parse_quoted_list(raw: &str) -> Vec<String> {
    let mut labels = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        if !in_quote {
            if ch == '\'' {
                in_quote = true;
                current.clear();
            }
            continue;
        }
        if ch == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
                current.push('\'');
            } else {
                in_quote = false;
                labels.push(current.clone());
            }
        } else {
            current.push(ch);
        }
    }

    labels
}
