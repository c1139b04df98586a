// Exporters: PDF via a headless browser over the rendered HTML, Word via a
// document tree rebuilt from ResumeData. Both fail closed.

pub mod assets;
pub mod docx;
pub mod pdf;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    #[serde(alias = "word")]
    Docx,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => PDF_CONTENT_TYPE,
            ExportFormat::Docx => DOCX_CONTENT_TYPE,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "PDF",
            ExportFormat::Docx => "Word",
        }
    }
}

/// A finished export: never empty.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub bytes: Bytes,
    pub content_type: &'static str,
    pub filename: String,
}

/// `<person>_<template>.<ext>` restricted to `[A-Za-z0-9_-]`.
pub fn suggested_filename(person: &str, template_name: &str, format: ExportFormat) -> String {
    let stem = [slug(person), slug(template_name)]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    let stem = if stem.is_empty() { "resume".to_string() } else { stem };
    format!("{stem}.{}", format.extension())
}

fn slug(value: &str) -> String {
    let mut out = String::new();
    for c in value.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            out.push(c);
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}
