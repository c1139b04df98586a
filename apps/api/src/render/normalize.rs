//! Layout normalization pass over populated template HTML.
//!
//! Templates come from third parties and disagree about page geometry, photo
//! framing and print behavior. This pass walks the markup with a streaming
//! HTML rewriter and:
//! - rewrites fixed-unit widths/margins/paddings (see `css`),
//! - frames every `<img>` as a uniform circle,
//! - forces exact print colors so sidebar backgrounds survive printing,
//! - injects a viewport meta tag when the template has none.

use std::cell::Cell;

use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, text, RewriteStrSettings};

use crate::errors::AppError;
use crate::render::css::rewrite_fixed_units;

pub const VIEWPORT_META: &str =
    r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#;

/// Edge length of the square every image is cropped into.
pub const PORTRAIT_SIZE: &str = "120px";

const NORMALIZE_STYLE: &str = r#"<style id="resume-normalize">
*, *::before, *::after { box-sizing: border-box; -webkit-print-color-adjust: exact; print-color-adjust: exact; }
html, body { max-width: 100%; overflow-wrap: anywhere; }
img { border-radius: 50% !important; object-fit: cover !important; aspect-ratio: 1 / 1; clip-path: circle(50% at 50% 50%); }
</style>"#;

#[derive(Debug, Default, Clone, Copy)]
struct DocumentShape {
    has_viewport: bool,
    has_head: bool,
    has_html: bool,
}

pub fn normalize_layout(html: &str) -> Result<String, AppError> {
    let shape = inspect(html)?;

    let mut head_block = String::new();
    if !shape.has_viewport {
        head_block.push_str(VIEWPORT_META);
    }
    head_block.push_str(NORMALIZE_STYLE);

    let mut css_buffer = String::new();
    let mut element_content_handlers = vec![
        element!("[style]", |el| {
            if el.tag_name().eq_ignore_ascii_case("img") {
                return Ok(());
            }
            if let Some(style) = el.get_attribute("style") {
                let rewritten = rewrite_fixed_units(&style);
                if rewritten != style {
                    el.set_attribute("style", &rewritten)?;
                }
            }
            Ok(())
        }),
        element!("img", |el| {
            let existing = el
                .get_attribute("style")
                .map(|s| rewrite_fixed_units(&s))
                .unwrap_or_default();
            el.remove_attribute("width");
            el.remove_attribute("height");
            el.set_attribute("style", &portrait_style(&existing))?;
            Ok(())
        }),
        text!("style", move |chunk| {
            css_buffer.push_str(chunk.as_str());
            if chunk.last_in_text_node() {
                let rewritten = rewrite_fixed_units(&css_buffer);
                chunk.replace(&rewritten, ContentType::Html);
                css_buffer.clear();
            } else {
                chunk.remove();
            }
            Ok(())
        }),
    ];

    if shape.has_head {
        let block = head_block.clone();
        element_content_handlers.push(element!("head", move |el| {
            el.append(&block, ContentType::Html);
            Ok(())
        }));
    } else if shape.has_html {
        let block = format!("<head>{head_block}</head>");
        element_content_handlers.push(element!("html", move |el| {
            el.prepend(&block, ContentType::Html);
            Ok(())
        }));
    }

    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers,
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|e| AppError::Render(format!("layout normalization failed: {e}")))?;

    if shape.has_head || shape.has_html {
        Ok(output)
    } else {
        Ok(format!("<head>{head_block}</head>{output}"))
    }
}

fn inspect(html: &str) -> Result<DocumentShape, AppError> {
    let has_viewport = Cell::new(false);
    let has_head = Cell::new(false);
    let has_html = Cell::new(false);

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("meta", |el| {
                    let is_viewport = el
                        .get_attribute("name")
                        .is_some_and(|n| n.trim().eq_ignore_ascii_case("viewport"));
                    if is_viewport {
                        has_viewport.set(true);
                    }
                    Ok(())
                }),
                element!("head", |_| {
                    has_head.set(true);
                    Ok(())
                }),
                element!("html", |_| {
                    has_html.set(true);
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|e| AppError::Render(format!("failed to parse template markup: {e}")))?;

    Ok(DocumentShape {
        has_viewport: has_viewport.get(),
        has_head: has_head.get(),
        has_html: has_html.get(),
    })
}

fn portrait_style(existing: &str) -> String {
    let mut style = existing.trim().trim_end_matches(';').to_string();
    if !style.is_empty() {
        style.push(';');
    }
    style.push_str(&format!(
        "width:{PORTRAIT_SIZE} !important;height:{PORTRAIT_SIZE} !important;\
         border-radius:50% !important;object-fit:cover !important;\
         clip-path:circle(50% at 50% 50%) !important;"
    ));
    style
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html><html><head><title>CV</title><style>.page { width: 794px; padding: 32px; }</style></head><body><div class="sidebar" style="background: #223344; width: 280px"><img src="me.png" width="300" height="400" style="border: 1px solid #ccc"></div></body></html>"#;

    #[test]
    fn test_viewport_injected_once() {
        let out = normalize_layout(PAGE).unwrap();
        assert_eq!(out.matches(r#"name="viewport""#).count(), 1);

        let again = normalize_layout(&out).unwrap();
        assert_eq!(again.matches(r#"name="viewport""#).count(), 1);
    }

    #[test]
    fn test_style_block_widths_rewritten() {
        let out = normalize_layout(PAGE).unwrap();
        assert!(out.contains(".page { width: 100%; padding: 2em; }"), "{out}");
    }

    #[test]
    fn test_inline_width_rewritten_and_background_kept() {
        let out = normalize_layout(PAGE).unwrap();
        assert!(out.contains("background: #223344; width: 35.264%"), "{out}");
    }

    #[test]
    fn test_images_framed_as_circles() {
        let out = normalize_layout(PAGE).unwrap();
        assert!(!out.contains(r#"width="300""#));
        assert!(!out.contains(r#"height="400""#));
        assert!(out.contains("border: 1px solid #ccc;width:120px !important"));
        assert!(out.contains("border-radius:50% !important"));
        assert!(out.contains("object-fit:cover !important"));
    }

    #[test]
    fn test_fragment_without_head_gets_one() {
        let out = normalize_layout("<div>Jane</div>").unwrap();
        assert!(out.starts_with("<head>"));
        assert!(out.contains(VIEWPORT_META));
        assert!(out.ends_with("<div>Jane</div>"));
    }

    #[test]
    fn test_html_without_head_gets_head_inside_html() {
        let out = normalize_layout("<html><body>Jane</body></html>").unwrap();
        assert!(out.starts_with("<html><head>"));
    }

    #[test]
    fn test_existing_viewport_respected() {
        let html = r#"<html><head><meta name="Viewport" content="width=600"></head><body></body></html>"#;
        let out = normalize_layout(html).unwrap();
        assert!(!out.contains(VIEWPORT_META));
        assert!(out.contains(r#"id="resume-normalize""#));
    }
}
