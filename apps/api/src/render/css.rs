//! CSS declaration rewriting for fixed-unit box dimensions.
//!
//! Third-party templates hard-code page geometry (`width: 800px`,
//! `padding: 40px 60px`) that clips on A4 and on narrow viewports. Widths are
//! rewritten to a percentage of the A4 content width; margins and paddings to
//! `em`. Only declarations are touched: selectors, `@media` conditions and
//! every other property pass through verbatim.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// A4 width at 96 dpi, in CSS px.
pub const PAGE_WIDTH_PX: f64 = 794.0;
/// Root font size used for px → em.
pub const BASE_FONT_PX: f64 = 16.0;

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(^|[;{\s])((?:min-)?width|margin(?:-(?:top|right|bottom|left))?|padding(?:-(?:top|right|bottom|left))?)(\s*:\s*)([^;}]+)",
    )
    .expect("declaration pattern is valid")
});

static FIXED_LENGTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(-?(?:\d+\.?\d*|\.\d+))(px|pt|pc|in|cm|mm)$").expect("length pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Percent,
    Em,
}

/// Rewrites every matching declaration in a style attribute or style sheet.
pub fn rewrite_fixed_units(css: &str) -> String {
    DECLARATION
        .replace_all(css, |caps: &Captures| {
            let property = caps[2].to_ascii_lowercase();
            let target = if property.ends_with("width") {
                Target::Percent
            } else {
                Target::Em
            };
            format!(
                "{}{}{}{}",
                &caps[1],
                &caps[2],
                &caps[3],
                rewrite_value(&caps[4], target)
            )
        })
        .into_owned()
}

fn rewrite_value(value: &str, target: Target) -> String {
    let trailing = &value[value.trim_end().len()..];
    let rewritten = value
        .split_whitespace()
        .map(|token| {
            // Minified sheets glue the priority onto the length: `794px!important`.
            let (length, priority) = token.split_at(token.find('!').unwrap_or(token.len()));
            match to_px(length) {
                Some(px) => {
                    let converted = match target {
                        Target::Percent => format!(
                            "{}%",
                            format_number((px / PAGE_WIDTH_PX * 100.0).clamp(0.0, 100.0))
                        ),
                        Target::Em if px == 0.0 => "0".to_string(),
                        Target::Em => format!("{}em", format_number(px / BASE_FONT_PX)),
                    };
                    format!("{converted}{priority}")
                }
                None => token.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!("{rewritten}{trailing}")
}

/// Converts an absolute length token to CSS px; `None` for anything relative or non-length.
pub fn to_px(token: &str) -> Option<f64> {
    let caps = FIXED_LENGTH.captures(token)?;
    let amount: f64 = caps[1].parse().ok()?;
    let factor = match caps[2].to_ascii_lowercase().as_str() {
        "px" => 1.0,
        "pt" => 96.0 / 72.0,
        "pc" => 16.0,
        "in" => 96.0,
        "cm" => 96.0 / 2.54,
        "mm" => 96.0 / 25.4,
        _ => return None,
    };
    Some(amount * factor)
}

fn format_number(value: f64) -> String {
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
