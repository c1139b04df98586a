//! Image inlining for the PDF path. The browser loads the document from a
//! temp file, so relative image paths would not resolve; local images are
//! embedded as base64 data URIs instead.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use lol_html::{element, rewrite_str, RewriteStrSettings};
use tracing::{debug, warn};

use crate::errors::AppError;

const PORTRAIT_HINTS: &[&str] = &["profile", "avatar", "photo", "picture"];

/// Neutral silhouette used when a profile picture file is missing.
pub const DEFAULT_AVATAR_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 120 120"><rect width="120" height="120" fill="#d5dae1"/><circle cx="60" cy="46" r="22" fill="#9aa4b2"/><path d="M20 112c4-24 20-36 40-36s36 12 40 36z" fill="#9aa4b2"/></svg>"##;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    /// Remote or already inline; left untouched.
    External,
    Local(PathBuf),
    /// Unusable path (traversal, empty).
    Rejected,
}

/// Rewrites every `<img src>` that points at a local file into a data URI.
pub async fn inline_images(html: &str, assets_dir: &Path) -> Result<String, AppError> {
    let sources = collect_sources(html)?;

    let mut replacements: HashMap<String, String> = HashMap::new();
    for src in sources {
        if replacements.contains_key(&src) {
            continue;
        }
        let replacement = match classify(&src, assets_dir) {
            Source::External => continue,
            Source::Local(path) => match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    debug!(path = %path.display(), bytes = bytes.len(), "Inlined image");
                    Some(data_uri(mime_for(&path), &bytes))
                }
                Err(e) => {
                    warn!(path = %path.display(), "Image not readable: {e}");
                    None
                }
            },
            Source::Rejected => {
                warn!(src = %src, "Refusing to inline image outside the assets directory");
                None
            }
        };
        let replacement = replacement.or_else(|| looks_like_portrait(&src).then(default_avatar_uri));
        if let Some(uri) = replacement {
            replacements.insert(src, uri);
        }
    }

    if replacements.is_empty() {
        return Ok(html.to_string());
    }

    let rewritten = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("img[src]", |el| {
                if let Some(uri) = el
                    .get_attribute("src")
                    .and_then(|src| replacements.get(src.trim()))
                {
                    el.set_attribute("src", uri)?;
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|e| AppError::Export(format!("image inlining failed: {e}")));
    rewritten
}

pub fn default_avatar_uri() -> String {
    data_uri("image/svg+xml", DEFAULT_AVATAR_SVG.as_bytes())
}

fn collect_sources(html: &str) -> Result<Vec<String>, AppError> {
    let mut sources = Vec::new();
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("img[src]", |el| {
                if let Some(src) = el.get_attribute("src") {
                    sources.push(src.trim().to_string());
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|e| AppError::Export(format!("failed to scan images: {e}")))?;
    Ok(sources)
}

fn classify(src: &str, assets_dir: &Path) -> Source {
    let lower = src.to_ascii_lowercase();
    if lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("//")
        || lower.starts_with("data:")
    {
        return Source::External;
    }

    let relative = src
        .strip_prefix("file://")
        .unwrap_or(src)
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_start_matches('/');
    let relative = relative.strip_prefix("uploads/").unwrap_or(relative);
    if relative.is_empty() {
        return Source::Rejected;
    }

    let path = Path::new(relative);
    if path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Source::Rejected;
    }
    Source::Local(assets_dir.join(path))
}

fn looks_like_portrait(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    PORTRAIT_HINTS.iter().any(|hint| lower.contains(hint))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}
