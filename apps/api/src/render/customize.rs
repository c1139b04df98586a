//! Cosmetic overrides chosen per request. Never persisted, never touch user data:
//! they only add body classes and override style blocks on top of the
//! rendered document.

use std::cell::Cell;

use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, RewriteStrSettings};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const FONT_BLOCK_ID: &str = "resume-font-override";
pub const THEME_BLOCK_ID: &str = "resume-theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorScheme {
    #[default]
    Default,
    Blue,
    Green,
    Teal,
    Burgundy,
    Purple,
    Charcoal,
    Orange,
}

impl ColorScheme {
    fn accent(self) -> Option<(&'static str, &'static str)> {
        match self {
            ColorScheme::Default => None,
            ColorScheme::Blue => Some(("blue", "#1f4e79")),
            ColorScheme::Green => Some(("green", "#2e7d32")),
            ColorScheme::Teal => Some(("teal", "#00796b")),
            ColorScheme::Burgundy => Some(("burgundy", "#8e2430")),
            ColorScheme::Purple => Some(("purple", "#5e35b1")),
            ColorScheme::Charcoal => Some(("charcoal", "#37474f")),
            ColorScheme::Orange => Some(("orange", "#e65100")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    #[default]
    Default,
    Arial,
    Helvetica,
    Georgia,
    TimesNewRoman,
    Garamond,
    Roboto,
    OpenSans,
    Lato,
}

impl FontFamily {
    /// CSS font stack, `None` for the template's own font.
    pub fn stack(self) -> Option<&'static str> {
        match self {
            FontFamily::Default => None,
            FontFamily::Arial => Some("Arial, Helvetica, sans-serif"),
            FontFamily::Helvetica => Some("\"Helvetica Neue\", Helvetica, Arial, sans-serif"),
            FontFamily::Georgia => Some("Georgia, \"Times New Roman\", serif"),
            FontFamily::TimesNewRoman => Some("\"Times New Roman\", Times, serif"),
            FontFamily::Garamond => Some("Garamond, \"EB Garamond\", Georgia, serif"),
            FontFamily::Roboto => Some("Roboto, \"Helvetica Neue\", Arial, sans-serif"),
            FontFamily::OpenSans => Some("\"Open Sans\", Arial, sans-serif"),
            FontFamily::Lato => Some("Lato, \"Helvetica Neue\", Arial, sans-serif"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutDensity {
    #[default]
    Default,
    Compact,
    Spacious,
}

impl LayoutDensity {
    fn class_suffix(self) -> Option<&'static str> {
        match self {
            LayoutDensity::Default => None,
            LayoutDensity::Compact => Some("compact"),
            LayoutDensity::Spacious => Some("spacious"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customizations {
    pub color_scheme: ColorScheme,
    pub font_family: FontFamily,
    #[serde(alias = "layout")]
    pub layout_density: LayoutDensity,
}

impl Customizations {
    pub fn is_default(&self) -> bool {
        *self == Customizations::default()
    }

    fn body_classes(&self) -> Vec<String> {
        let mut classes = Vec::new();
        if let Some((name, _)) = self.color_scheme.accent() {
            classes.push(format!("color-{name}"));
        }
        if let Some(suffix) = self.layout_density.class_suffix() {
            classes.push(format!("layout-{suffix}"));
        }
        classes
    }

    fn theme_block(&self) -> Option<String> {
        let mut css = String::new();
        if let Some((name, accent)) = self.color_scheme.accent() {
            let scope = format!("body.color-{name}");
            css.push_str(&format!(
                "{scope} {{ --resume-accent: {accent}; }}\n\
                 {scope} h1, {scope} h2, {scope} h3, {scope} a {{ color: {accent} !important; }}\n\
                 {scope} hr, {scope} .section-title {{ border-color: {accent} !important; }}\n"
            ));
        }
        match self.layout_density {
            LayoutDensity::Default => {}
            LayoutDensity::Compact => css.push_str(
                "body.layout-compact { line-height: 1.25 !important; }\n\
                 body.layout-compact section, body.layout-compact .section { margin-bottom: 0.6em !important; }\n\
                 body.layout-compact p, body.layout-compact li { margin-top: 0.1em !important; margin-bottom: 0.1em !important; }\n",
            ),
            LayoutDensity::Spacious => css.push_str(
                "body.layout-spacious { line-height: 1.7 !important; }\n\
                 body.layout-spacious section, body.layout-spacious .section { margin-bottom: 1.6em !important; }\n",
            ),
        }
        (!css.is_empty()).then(|| format!("<style id=\"{THEME_BLOCK_ID}\">\n{css}</style>"))
    }

    fn font_block(&self) -> Option<String> {
        self.font_family.stack().map(|stack| {
            format!(
                "<style id=\"{FONT_BLOCK_ID}\">body, body * {{ font-family: {stack} !important; }}</style>"
            )
        })
    }
}

/// Applies customizations to a rendered document. With all options at
/// `default` the document is returned unchanged.
pub fn apply_customizations(html: &str, custom: &Customizations) -> Result<String, AppError> {
    if custom.is_default() {
        return Ok(html.to_string());
    }

    let classes = custom.body_classes();
    let styles: String = [custom.theme_block(), custom.font_block()]
        .into_iter()
        .flatten()
        .collect();
    let head_seen = Cell::new(false);
    let body_seen = Cell::new(false);

    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("body", |el| {
                    body_seen.set(true);
                    if classes.is_empty() {
                        return Ok(());
                    }
                    let mut class_attr = el.get_attribute("class").unwrap_or_default();
                    for class in &classes {
                        if !class_attr.split_whitespace().any(|c| c == class) {
                            if !class_attr.trim().is_empty() {
                                class_attr.push(' ');
                            }
                            class_attr.push_str(class);
                        }
                    }
                    el.set_attribute("class", class_attr.trim())?;
                    Ok(())
                }),
                element!("head", |el| {
                    head_seen.set(true);
                    el.append(&styles, ContentType::Html);
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|e| AppError::Render(format!("applying customizations failed: {e}")))?;

    let output = if body_seen.get() || classes.is_empty() {
        output
    } else {
        wrap_in_body(&output, &classes.join(" "))
    };

    if head_seen.get() {
        Ok(output)
    } else {
        Ok(format!("{styles}{output}"))
    }
}

/// Fragment templates have no `<body>` for the scheme classes to land on;
/// the content after any `<head>` is wrapped in one.
fn wrap_in_body(html: &str, classes: &str) -> String {
    let lower = html.to_ascii_lowercase();
    let start = lower.find("</head>").map_or(0, |i| i + "</head>".len());
    let end = lower.rfind("</html>").filter(|&i| i >= start).unwrap_or(html.len());
    format!(
        "{}<body class=\"{classes}\">{}</body>{}",
        &html[..start],
        &html[start..end],
        &html[end..]
    )
}
