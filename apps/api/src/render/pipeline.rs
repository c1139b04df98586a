//! Render / export orchestration.
//!
//! Flow: template lookup ∥ aggregation → populate → normalize layout →
//! customize → (PDF: print prep + browser | Word: document tree from data).
//!
//! Everything is request-scoped. A failure at any step aborts the request;
//! no partially populated document is ever returned.

use std::time::Instant;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::aggregate::{aggregate_user, ResumeData};
use crate::errors::AppError;
use crate::export::{self, ExportFormat, ExportedDocument};
use crate::models::template::TemplateRow;
use crate::render::customize::{apply_customizations, Customizations};
use crate::render::normalize::normalize_layout;
use crate::state::AppState;

/// Identifiers and options for one render request.
#[derive(Debug, Clone, Copy)]
pub struct RenderJob {
    pub user_id: Uuid,
    pub template_id: Uuid,
    pub customizations: Customizations,
}

/// Final HTML plus the aggregate it was built from (returned for display/debugging).
#[derive(Debug, Clone)]
pub struct RenderedResume {
    pub html: String,
    pub data: ResumeData,
    pub template: TemplateRow,
}

pub async fn render_resume(state: &AppState, job: RenderJob) -> Result<RenderedResume, AppError> {
    let started = Instant::now();
    let (template, data) = load_inputs(state, job).await?;

    let populated = state.engine.populate(&template.html, &data)?;
    let normalized = normalize_layout(&populated)?;
    let html = apply_customizations(&normalized, &job.customizations)?;

    info!(
        user_id = %job.user_id,
        template_id = %job.template_id,
        html_bytes = html.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Rendered resume"
    );

    Ok(RenderedResume {
        html,
        data,
        template,
    })
}

pub async fn export_resume(
    state: &AppState,
    job: RenderJob,
    format: ExportFormat,
) -> Result<ExportedDocument, AppError> {
    let started = Instant::now();

    let (template, data, bytes) = match format {
        ExportFormat::Pdf => {
            let rendered = render_resume(state, job).await?;
            let print_html =
                export::pdf::prepare_print_html(&rendered.html, &state.config.assets_dir).await?;
            let bytes = state.pdf.render_pdf(&print_html).await?;
            (rendered.template, rendered.data, bytes)
        }
        ExportFormat::Docx => {
            let (template, data) = load_inputs(state, job).await?;
            let bytes = export::docx::build_docx(&data).await?;
            (template, data, bytes)
        }
    };

    if bytes.is_empty() {
        return Err(AppError::Export(format!(
            "{} generation produced an empty document",
            format.label()
        )));
    }

    let filename = export::suggested_filename(&data.personal.full_name, &template.name, format);

    if let Err(e) = state.templates.record_download(template.id).await {
        warn!(template_id = %template.id, "Failed to record template download: {e}");
    }

    info!(
        user_id = %job.user_id,
        template_id = %job.template_id,
        format = format.label(),
        bytes = bytes.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Exported resume"
    );

    Ok(ExportedDocument {
        bytes: Bytes::from(bytes),
        content_type: format.content_type(),
        filename,
    })
}

/// Template lookup and aggregation, issued concurrently.
async fn load_inputs(
    state: &AppState,
    job: RenderJob,
) -> Result<(TemplateRow, ResumeData), AppError> {
    let (template, data) = tokio::try_join!(
        state.templates.get(job.template_id),
        aggregate_user(state.profiles.as_ref(), job.user_id),
    )?;
    let template = template
        .ok_or_else(|| AppError::NotFound(format!("Template {} not found", job.template_id)))?;
    Ok((template, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::customize::FontFamily;
    use crate::test_support::{test_state, TestFixture, SAMPLE_TEMPLATE_ID, SAMPLE_USER_ID};

    fn job(template_id: Uuid) -> RenderJob {
        RenderJob {
            user_id: SAMPLE_USER_ID,
            template_id,
            customizations: Customizations::default(),
        }
    }

    #[tokio::test]
    async fn test_render_returns_html_and_data() {
        let fixture = TestFixture::new();
        let state = test_state(&fixture);
        let rendered = render_resume(&state, job(SAMPLE_TEMPLATE_ID)).await.unwrap();
        assert!(rendered.html.contains("Jane Doe"));
        assert!(rendered.html.contains(r#"name="viewport""#));
        assert_eq!(rendered.data.personal.full_name, "Jane Doe");
    }

    #[tokio::test]
    async fn test_render_unknown_template_is_not_found() {
        let fixture = TestFixture::new();
        let state = test_state(&fixture);
        let err = render_resume(&state, job(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_render_unknown_user_uses_placeholders() {
        let fixture = TestFixture::new();
        let state = test_state(&fixture);
        let rendered = render_resume(
            &state,
            RenderJob {
                user_id: Uuid::new_v4(),
                ..job(SAMPLE_TEMPLATE_ID)
            },
        )
        .await
        .unwrap();
        assert!(rendered.html.contains("Your Name"));
        assert!(!rendered.html.contains("<h2>Experience</h2>"));
    }

    #[tokio::test]
    async fn test_font_choice_changes_only_override_block() {
        let fixture = TestFixture::new();
        let state = test_state(&fixture);
        let mut with_font = job(SAMPLE_TEMPLATE_ID);
        with_font.customizations.font_family = FontFamily::Roboto;
        let mut other_font = with_font;
        other_font.customizations.font_family = FontFamily::Garamond;

        let a = render_resume(&state, with_font).await.unwrap();
        let b = render_resume(&state, other_font).await.unwrap();
        assert_eq!(a.data, b.data);

        let strip = |html: &str| {
            let start = html.find(r#"<style id="resume-font-override">"#).unwrap();
            let end = start + html[start..].find("</style>").unwrap() + "</style>".len();
            format!("{}{}", &html[..start], &html[end..])
        };
        assert_ne!(a.html, b.html);
        assert_eq!(strip(&a.html), strip(&b.html));
    }

    #[tokio::test]
    async fn test_pdf_and_word_carry_name_and_email() {
        let fixture = TestFixture::new();
        let state = test_state(&fixture);

        let pdf = export_resume(&state, job(SAMPLE_TEMPLATE_ID), ExportFormat::Pdf)
            .await
            .unwrap();
        // The fake PDF renderer echoes the print-ready HTML.
        let pdf_text = String::from_utf8_lossy(&pdf.bytes).to_string();
        assert!(pdf_text.contains("Jane Doe"));
        assert!(pdf_text.contains("jane@example.com"));
        assert_eq!(pdf.content_type, "application/pdf");
        assert_eq!(pdf.filename, "Jane_Doe_Modern_Sidebar.pdf");

        let docx = export_resume(&state, job(SAMPLE_TEMPLATE_ID), ExportFormat::Docx)
            .await
            .unwrap();
        assert!(docx.bytes.starts_with(b"PK"));
        assert_eq!(docx.filename, "Jane_Doe_Modern_Sidebar.docx");
        let document = docx_rs::read_docx(&docx.bytes).unwrap().json();
        assert!(document.contains("Jane Doe"));
        assert!(document.contains("jane@example.com"));

        assert_eq!(fixture.download_count(), 2);
    }

    #[tokio::test]
    async fn test_export_unknown_template_produces_nothing() {
        let fixture = TestFixture::new();
        let state = test_state(&fixture);
        for format in [ExportFormat::Pdf, ExportFormat::Docx] {
            let result = export_resume(&state, job(Uuid::new_v4()), format).await;
            assert!(matches!(result, Err(AppError::NotFound(_))));
        }
        assert_eq!(fixture.pdf_calls(), 0);
        assert_eq!(fixture.download_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_pdf_buffer_is_failure() {
        let fixture = TestFixture::with_empty_pdf();
        let state = test_state(&fixture);
        let result = export_resume(&state, job(SAMPLE_TEMPLATE_ID), ExportFormat::Pdf).await;
        assert!(matches!(result, Err(AppError::Export(_))));
        assert_eq!(fixture.download_count(), 0);
    }

    #[tokio::test]
    async fn test_profile_source_failure_aborts_export() {
        let fixture = TestFixture::with_failing_profiles();
        let state = test_state(&fixture);
        let result = export_resume(&state, job(SAMPLE_TEMPLATE_ID), ExportFormat::Docx).await;
        assert!(result.is_err());
        assert_eq!(fixture.download_count(), 0);
    }

    #[tokio::test]
    async fn test_broken_template_is_render_error() {
        let fixture = TestFixture::new();
        let broken = fixture.add_template("Broken", "{{#if personal}}<p>never closed");
        let state = test_state(&fixture);
        let err = render_resume(&state, job(broken)).await.unwrap_err();
        assert!(matches!(err, AppError::Render(_)));
    }
}
