//! Word export. The document is rebuilt from `ResumeData` (never from the
//! rendered HTML): a single two-column table, shaded sidebar on the left.

use std::io::Cursor;

use chrono::NaiveDate;
use docx_rs::{
    Docx, PageMargin, Paragraph, Run, Shading, Table, TableCell, TableLayoutType, TableRow,
    WidthType,
};
use tracing::debug;

use crate::aggregate::ResumeData;
use crate::errors::AppError;

// A4 in twentieths of a point, half-inch margins.
const PAGE_WIDTH: u32 = 11_906;
const PAGE_HEIGHT: u32 = 16_838;
const PAGE_MARGIN: i32 = 720;
const SIDEBAR_WIDTH: usize = 3_500;
const MAIN_WIDTH: usize = 6_966;

const SIDEBAR_FILL: &str = "EEF2F7";
const ACCENT: &str = "1F4E79";
const MUTED: &str = "595959";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutlineEntry {
    pub heading: String,
    pub subheading: String,
    pub lines: Vec<String>,
}

impl OutlineEntry {
    fn line(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutlineSection {
    pub title: &'static str,
    pub entries: Vec<OutlineEntry>,
}

/// Format-independent layout of the Word document; sections with no
/// entries are left out entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct WordOutline {
    pub name: String,
    pub headline: String,
    pub sidebar: Vec<OutlineSection>,
    pub main: Vec<OutlineSection>,
}

impl WordOutline {
    pub fn from_resume(data: &ResumeData) -> Self {
        let sidebar = vec![
            section("Contact", contact_entries(data)),
            section(
                "Education",
                data.education
                    .iter()
                    .map(|e| OutlineEntry {
                        heading: e.degree.clone(),
                        subheading: join_non_empty(&[&e.institution, &e.field_of_study], " · "),
                        lines: non_empty(vec![
                            date_range(e.start_date, e.end_date, false),
                            e.grade.clone(),
                        ]),
                    })
                    .collect(),
            ),
            section("Skills", skill_entries(data)),
            section(
                "Languages",
                data.languages
                    .iter()
                    .map(|l| {
                        OutlineEntry::line(join_non_empty(&[&l.name, &l.proficiency], " - "))
                    })
                    .collect(),
            ),
        ];

        let main = vec![
            section(
                "Profile",
                non_empty(vec![data.summary.clone()])
                    .into_iter()
                    .map(OutlineEntry::line)
                    .collect(),
            ),
            section(
                "Experience",
                data.experience
                    .iter()
                    .map(|x| {
                        let mut lines = vec![date_range(x.start_date, x.end_date, x.is_ongoing())];
                        if x.highlights.is_empty() {
                            lines.push(x.description.clone());
                        } else {
                            lines.extend(x.highlights.iter().map(|h| format!("• {h}")));
                        }
                        OutlineEntry {
                            heading: x.title.clone(),
                            subheading: join_non_empty(&[&x.company, &x.location], ", "),
                            lines: non_empty(lines),
                        }
                    })
                    .collect(),
            ),
            section(
                "Projects",
                data.projects
                    .iter()
                    .map(|p| OutlineEntry {
                        heading: p.title.clone(),
                        subheading: p.role.clone(),
                        lines: non_empty(vec![
                            p.description.clone(),
                            p.technologies.join(", "),
                            p.url.clone(),
                        ]),
                    })
                    .collect(),
            ),
            section(
                "Certifications",
                data.certifications
                    .iter()
                    .map(|c| OutlineEntry {
                        heading: c.name.clone(),
                        subheading: c.issuer.clone(),
                        lines: non_empty(vec![month_year(c.issued_on), c.url.clone()]),
                    })
                    .collect(),
            ),
            section(
                "Publications",
                data.publications
                    .iter()
                    .map(|p| OutlineEntry {
                        heading: p.title.clone(),
                        subheading: month_year(p.published_on),
                        lines: non_empty(vec![p.description.clone(), p.url.clone()]),
                    })
                    .collect(),
            ),
            section(
                "Presentations",
                data.presentations
                    .iter()
                    .map(|p| OutlineEntry {
                        heading: p.title.clone(),
                        subheading: String::new(),
                        lines: non_empty(vec![p.description.clone(), p.url.clone()]),
                    })
                    .collect(),
            ),
            section(
                "Patents",
                data.patents
                    .iter()
                    .map(|p| OutlineEntry {
                        heading: p.title.clone(),
                        subheading: join_non_empty(&[&p.office, &p.status], " · "),
                        lines: non_empty(vec![
                            p.application_number.clone(),
                            month_year(p.issued_on),
                            p.description.clone(),
                        ]),
                    })
                    .collect(),
            ),
            section(
                "Work Samples",
                data.work_samples
                    .iter()
                    .map(|w| OutlineEntry {
                        heading: w.title.clone(),
                        subheading: w.url.clone(),
                        lines: non_empty(vec![w.description.clone()]),
                    })
                    .collect(),
            ),
        ];

        Self {
            name: data.personal.full_name.clone(),
            headline: data.headline.clone(),
            sidebar: sidebar.into_iter().flatten().collect(),
            main: main.into_iter().flatten().collect(),
        }
    }

    /// Every visible string in document order.
    pub fn plain_text(&self) -> String {
        let mut out = vec![self.name.clone()];
        if !self.headline.is_empty() {
            out.push(self.headline.clone());
        }
        for s in self.sidebar.iter().chain(&self.main) {
            out.push(s.title.to_string());
            for e in &s.entries {
                out.extend(
                    [&e.heading, &e.subheading]
                        .into_iter()
                        .filter(|t| !t.is_empty())
                        .cloned(),
                );
                out.extend(e.lines.iter().cloned());
            }
        }
        out.join("\n")
    }

    fn into_docx(self) -> Docx {
        let mut sidebar = TableCell::new()
            .width(SIDEBAR_WIDTH, WidthType::Dxa)
            .shading(Shading::new().fill(SIDEBAR_FILL));
        for s in &self.sidebar {
            for p in section_paragraphs(s) {
                sidebar = sidebar.add_paragraph(p);
            }
        }

        let mut main = TableCell::new()
            .width(MAIN_WIDTH, WidthType::Dxa)
            .add_paragraph(
                Paragraph::new().add_run(Run::new().add_text(&self.name).bold().size(40).color(ACCENT)),
            );
        if !self.headline.is_empty() {
            main = main.add_paragraph(
                Paragraph::new().add_run(Run::new().add_text(&self.headline).size(24).color(MUTED)),
            );
        }
        for s in &self.main {
            for p in section_paragraphs(s) {
                main = main.add_paragraph(p);
            }
        }

        let table = Table::new(vec![TableRow::new(vec![sidebar, main])])
            .set_grid(vec![SIDEBAR_WIDTH, MAIN_WIDTH])
            .layout(TableLayoutType::Fixed)
            .width(SIDEBAR_WIDTH + MAIN_WIDTH, WidthType::Dxa);

        Docx::new()
            .page_size(PAGE_WIDTH, PAGE_HEIGHT)
            .page_margin(
                PageMargin::new()
                    .top(PAGE_MARGIN)
                    .bottom(PAGE_MARGIN)
                    .left(PAGE_MARGIN)
                    .right(PAGE_MARGIN),
            )
            .add_table(table)
    }
}

/// Builds the `.docx` package. Packing runs on the blocking pool.
pub async fn build_docx(data: &ResumeData) -> Result<Vec<u8>, AppError> {
    let outline = WordOutline::from_resume(data);
    let sections = outline.sidebar.len() + outline.main.len();

    let bytes = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, AppError> {
        let mut cursor = Cursor::new(Vec::new());
        outline
            .into_docx()
            .build()
            .pack(&mut cursor)
            .map_err(|e| AppError::Export(format!("failed to pack Word document: {e}")))?;
        Ok(cursor.into_inner())
    })
    .await
    .map_err(|e| AppError::Export(format!("Word generation task failed: {e}")))??;

    debug!(sections, bytes = bytes.len(), "Word document built");
    Ok(bytes)
}

fn section_paragraphs(section: &OutlineSection) -> Vec<Paragraph> {
    let mut paragraphs = vec![Paragraph::new().add_run(
        Run::new()
            .add_text(section.title.to_uppercase())
            .bold()
            .size(24)
            .color(ACCENT),
    )];
    for entry in &section.entries {
        if !entry.heading.is_empty() {
            paragraphs.push(Paragraph::new().add_run(Run::new().add_text(&entry.heading).bold().size(21)));
        }
        if !entry.subheading.is_empty() {
            paragraphs.push(
                Paragraph::new().add_run(Run::new().add_text(&entry.subheading).italic().size(20).color(MUTED)),
            );
        }
        for line in &entry.lines {
            paragraphs.push(Paragraph::new().add_run(Run::new().add_text(line).size(20)));
        }
    }
    paragraphs
}

fn section(title: &'static str, entries: Vec<OutlineEntry>) -> Option<OutlineSection> {
    (!entries.is_empty()).then_some(OutlineSection { title, entries })
}

fn contact_entries(data: &ResumeData) -> Vec<OutlineEntry> {
    let c = &data.contact;
    let mut lines = non_empty(vec![
        c.email.clone(),
        c.phone.clone(),
        c.location.clone(),
        c.linkedin.clone(),
        c.github.clone(),
        c.website.clone(),
    ]);
    for link in &data.online_profiles {
        if !lines.contains(&link.url) {
            lines.push(link.url.clone());
        }
    }
    lines.into_iter().map(OutlineEntry::line).collect()
}

fn skill_entries(data: &ResumeData) -> Vec<OutlineEntry> {
    let groups = &data.skill_groups;
    [
        ("Key skills", &groups.key_skills),
        ("Technical", &groups.it_skills),
        ("Project tools", &groups.project_skills),
    ]
    .into_iter()
    .filter(|(_, names)| !names.is_empty())
    .map(|(label, names)| OutlineEntry {
        heading: label.to_string(),
        subheading: String::new(),
        lines: vec![names.join(", ")],
    })
    .collect()
}

fn month_year(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%b %Y").to_string()).unwrap_or_default()
}

fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>, ongoing: bool) -> String {
    let end = if ongoing {
        "Present".to_string()
    } else {
        month_year(end)
    };
    join_non_empty(&[&month_year(start), &end], " – ")
}

fn join_non_empty(parts: &[&str], sep: &str) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

fn non_empty(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
