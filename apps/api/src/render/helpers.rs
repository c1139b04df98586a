//! Handlebars helpers available to every template.
//!
//! - `{{format_date start_date}}` → `Mar 2021`, missing → `Present`
//! - `{{join technologies " · "}}` → separator defaults to `", "`
//! - `{{#if (exists certifications)}}...{{/if}}` → non-empty test for scalars and arrays

use chrono::{DateTime, NaiveDate};
use handlebars::{
    handlebars_helper, html_escape, Context, Handlebars, Helper, HelperResult, JsonValue, Output,
    RenderContext,
};

pub const PRESENT: &str = "Present";
const DEFAULT_SEPARATOR: &str = ", ";

handlebars_helper!(format_date_helper: |value: Json| format_date(value));
handlebars_helper!(exists_helper: |value: Json| is_present(value));

pub fn register_helpers(registry: &mut Handlebars<'static>) {
    registry.register_helper("format_date", Box::new(format_date_helper));
    registry.register_helper("exists", Box::new(exists_helper));
    registry.register_helper("join", Box::new(join_helper));
}

/// Existence-and-non-emptiness test. Unlike plain truthiness, `0` counts as
/// present and whitespace-only strings do not.
pub fn is_present(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(_) => true,
        JsonValue::String(s) => !s.trim().is_empty(),
        JsonValue::Array(items) => !items.is_empty(),
        JsonValue::Object(map) => !map.is_empty(),
    }
}

/// Formats a date-ish value as `Mon YYYY`. A bare year (`"2019"` or `2019`)
/// has no month and renders as the year alone.
pub fn format_date(value: &JsonValue) -> String {
    let number;
    let raw = match value {
        JsonValue::String(s) => s.trim(),
        JsonValue::Number(n) => {
            number = n.to_string();
            number.as_str()
        }
        _ => return PRESENT.to_string(),
    };
    if raw.is_empty() || raw.eq_ignore_ascii_case("present") {
        return PRESENT.to_string();
    }
    if is_bare_year(raw) {
        return raw.to_string();
    }
    parse_date(raw)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn is_bare_year(raw: &str) -> bool {
    raw.len() == 4 && raw.bytes().all(|b| b.is_ascii_digit())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").ok()
}

/// Joins an array into one escaped string. Objects contribute their `name`
/// (or `title`) field so `{{join skills}}` works on `SkillItem`s.
pub fn join_values(value: &JsonValue, separator: &str) -> String {
    let JsonValue::Array(items) = value else {
        return scalar_text(value).unwrap_or_default();
    };
    items
        .iter()
        .filter_map(|item| match item {
            JsonValue::Object(map) => map
                .get("name")
                .or_else(|| map.get("title"))
                .and_then(scalar_text),
            other => scalar_text(other),
        })
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn join_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let Some(list) = h.param(0) else {
        return Ok(());
    };
    let separator = h
        .param(1)
        .and_then(|p| p.value().as_str())
        .unwrap_or(DEFAULT_SEPARATOR);
    out.write(&html_escape(&join_values(list.value(), separator)))?;
    Ok(())
}
