//! PDF export: print preparation + a bounded pool of headless browser processes.
//!
//! Each render spawns one browser process on a private temp directory. A FIFO
//! semaphore caps how many run at once (excess requests queue) and every
//! render is bounded by a timeout; a timed-out browser is killed.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, RewriteStrSettings};
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::export::assets::inline_images;

pub const PRINT_STYLE_ID: &str = "resume-print";

/// Print overrides: A4 with zero page margins and a fixed sidebar/main split
/// for the container class names templates commonly use.
const PRINT_CSS: &str = r#"
@page { size: A4; margin: 0; }
html, body { margin: 0 !important; padding: 0 !important; width: 210mm; min-height: 297mm; }
* { -webkit-print-color-adjust: exact !important; print-color-adjust: exact !important; }
.resume-container, .resume, .container, .wrapper, .page {
  display: flex !important; flex-direction: row !important; align-items: stretch !important;
  width: 210mm !important; max-width: 210mm !important; min-height: 297mm; margin: 0 !important;
}
.sidebar, .left-column, .left, aside {
  flex: 0 0 32% !important; max-width: 32% !important; min-height: 297mm;
}
.main, .main-content, .right-column, .right, main {
  flex: 1 1 68% !important; max-width: 68% !important;
}
section, .section, .job, .entry { break-inside: avoid; page-break-inside: avoid; }
"#;

/// Turns rendered HTML into the document the browser prints.
pub async fn prepare_print_html(html: &str, assets_dir: &Path) -> Result<String, AppError> {
    let inlined = inline_images(html, assets_dir).await?;
    inject_print_css(&inlined)
}

fn inject_print_css(html: &str) -> Result<String, AppError> {
    let block = format!("<style id=\"{PRINT_STYLE_ID}\">{PRINT_CSS}</style>");
    let mut injected = false;
    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("head", |el| {
                if !injected {
                    el.append(&block, ContentType::Html);
                    injected = true;
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|e| AppError::Export(format!("print preparation failed: {e}")))?;

    if injected {
        Ok(output)
    } else {
        Ok(format!("{block}{output}"))
    }
}

/// Converts print-ready HTML into PDF bytes.
///
/// Carried in `AppState` as `Arc<dyn PdfRenderer>`.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>, AppError>;
}

pub struct ChromePdfRenderer {
    binary: String,
    timeout: Duration,
    permits: Arc<Semaphore>,
}

impl ChromePdfRenderer {
    pub fn new(binary: impl Into<String>, max_concurrent: usize, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--no-first-run")
            .arg("--hide-scrollbars")
            .arg("--run-all-compositor-stages-before-draw")
            .arg("--no-pdf-header-footer")
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(file_url(input))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl PdfRenderer for ChromePdfRenderer {
    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>, AppError> {
        let queued = Instant::now();
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| AppError::Export("PDF renderer is shutting down".to_string()))?;
        let waited_ms = queued.elapsed().as_millis() as u64;
        if waited_ms > 0 {
            debug!(waited_ms, "Acquired browser slot");
        }

        let workdir = tempfile::tempdir()
            .map_err(|e| AppError::Export(format!("failed to create temp dir: {e}")))?;
        let input = workdir.path().join("resume.html");
        let output = workdir.path().join("resume.pdf");
        tokio::fs::write(&input, html)
            .await
            .map_err(|e| AppError::Export(format!("failed to stage HTML: {e}")))?;

        let started = Instant::now();
        let result = tokio::time::timeout(self.timeout, self.command(&input, &output).output())
            .await
            .map_err(|_| {
                let timeout_ms = self.timeout.as_millis() as u64;
                warn!(timeout_ms, "Browser render timed out");
                AppError::Export(format!("browser did not finish within {timeout_ms}ms"))
            })?
            .map_err(|e| AppError::Export(format!("failed to launch '{}': {e}", self.binary)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(AppError::Export(format!(
                "browser exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        let pdf = tokio::fs::read(&output)
            .await
            .map_err(|e| AppError::Export(format!("browser produced no PDF: {e}")))?;
        info!(
            bytes = pdf.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Browser render finished"
        );
        Ok(pdf)
    }
}

fn file_url(path: &Path) -> String {
    let absolute: PathBuf = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    format!("file://{}", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_css_injected_into_head() {
        let out = inject_print_css("<html><head><title>x</title></head><body></body></html>").unwrap();
        assert!(out.contains("@page { size: A4; margin: 0; }"));
        assert!(out.find(PRINT_STYLE_ID).unwrap() < out.find("</head>").unwrap());
    }

    #[test]
    fn test_print_css_prefixed_without_head() {
        let out = inject_print_css("<div>Jane</div>").unwrap();
        assert!(out.starts_with(&format!("<style id=\"{PRINT_STYLE_ID}\">")));
    }

    #[tokio::test]
    async fn test_prepare_keeps_content() {
        let dir = tempfile::tempdir().unwrap();
        let html = "<html><head></head><body><h1>Jane Doe</h1><p>jane@example.com</p></body></html>";
        let out = prepare_print_html(html, dir.path()).await.unwrap();
        assert!(out.contains("Jane Doe"));
        assert!(out.contains("jane@example.com"));
    }

    #[tokio::test]
    async fn test_missing_browser_fails_without_output() {
        let renderer = ChromePdfRenderer::new(
            "definitely-not-a-browser-binary",
            1,
            Duration::from_secs(5),
        );
        let err = renderer.render_pdf("<p>x</p>").await.unwrap_err();
        assert!(matches!(err, AppError::Export(_)));
    }

    /// Writes an executable shell script standing in for the browser.
    #[cfg(unix)]
    fn fake_browser(dir: &Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-browser");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    /// Sleeps, then writes a stub PDF to the `--print-to-pdf=` target.
    #[cfg(unix)]
    const SLOW_PRINTER: &str = r#"sleep 0.3
for arg in "$@"; do
  case "$arg" in
    --print-to-pdf=*) printf '%%PDF-1.4 stub' > "${arg#--print-to-pdf=}" ;;
  esac
done"#;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hung_browser_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_browser(dir.path(), "sleep 30");
        let renderer = ChromePdfRenderer::new(binary, 1, Duration::from_millis(300));

        let started = Instant::now();
        let err = renderer.render_pdf("<p>x</p>").await.unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(10));
        match err {
            AppError::Export(msg) => assert!(msg.contains("300ms"), "{msg}"),
            other => panic!("expected export error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_browser_output_returned() {
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_browser(dir.path(), SLOW_PRINTER);
        let renderer = ChromePdfRenderer::new(binary, 1, Duration::from_secs(10));
        let pdf = renderer.render_pdf("<p>x</p>").await.unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_single_slot_runs_renders_one_after_another() {
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_browser(dir.path(), SLOW_PRINTER);
        let renderer = ChromePdfRenderer::new(binary, 1, Duration::from_secs(10));

        let started = Instant::now();
        let (a, b) = tokio::join!(renderer.render_pdf("<p>a</p>"), renderer.render_pdf("<p>b</p>"));
        assert!(a.is_ok() && b.is_ok());
        // Each fake render sleeps 300ms; with one slot they cannot overlap.
        assert!(started.elapsed() >= Duration::from_millis(600));
    }

    #[test]
    fn test_file_url_is_absolute() {
        assert_eq!(file_url(Path::new("/tmp/a.html")), "file:///tmp/a.html");
    }
}
