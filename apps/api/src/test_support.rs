//! Shared fixtures for unit and router tests: a sample user, a sample
//! template, and in-memory fakes for the storage and PDF seams.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::aggregate::{ProfileSource, UserRecords};
use crate::config::Config;
use crate::errors::AppError;
use crate::export::pdf::PdfRenderer;
use crate::models::profile::{
    CertificationRow, EducationRow, EmploymentRow, ItSkillRow, KeySkillRow, LanguageRow,
    ProfileSummaryRow, ProjectRow, PublicationRow, ResumeHeadlineRow,
};
use crate::models::template::{TemplateRow, TemplateSummary};
use crate::models::user::{OnlineProfileRow, PersonalDetailsRow, ProfileDetailsRow, UserRow};
use crate::render::TemplateEngine;
use crate::state::AppState;
use crate::templates::TemplateStore;

pub const SAMPLE_USER_ID: Uuid = Uuid::from_u128(0x5a3e_1d2c_0000_4000_8000_0000_0000_0001);
pub const SAMPLE_TEMPLATE_ID: Uuid = Uuid::from_u128(0x7e3b_9f10_0000_4000_8000_0000_0000_0001);

/// Two-column layout exercising every helper. Section names only appear
/// inside their own conditional blocks.
pub const SAMPLE_TEMPLATE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>{{personal.full_name}}</title>
<style>
body { font-family: Helvetica, sans-serif; margin: 24px; }
.page { display: flex; width: 794px; }
.sidebar { width: 260px; padding: 18px; background: #eef2f7; }
.main { width: 534px; padding: 18px 24px; }
</style>
</head>
<body class="resume">
<div class="page">
<aside class="sidebar">
{{#if personal.profile_picture}}<img src="{{personal.profile_picture}}" width="160" height="160" alt="Portrait">{{/if}}
<p>{{contact.email}}</p>
<p>{{contact.phone}}</p>
<p>{{contact.location}}</p>
{{#if (exists skills)}}<h3>Skills</h3><p>{{join skills}}</p>{{/if}}
{{#if (exists languages)}}<h3>Languages</h3><ul>{{#each languages}}<li>{{name}} ({{proficiency}})</li>{{/each}}</ul>{{/if}}
</aside>
<main class="main">
<h1>{{personal.full_name}}</h1>
{{#if (exists headline)}}<p class="headline">{{headline}}</p>{{/if}}
{{#if (exists summary)}}<p class="summary">{{summary}}</p>{{/if}}
{{#if (exists experience)}}<h2>Experience</h2>
{{#each experience}}<div class="job"><h4>{{title}} · {{company}}</h4><span>{{format_date start_date}} – {{format_date end_date}}</span><ul>{{#each highlights}}<li>{{this}}</li>{{/each}}</ul></div>
{{/each}}{{/if}}
{{#if (exists education)}}<h2>Education</h2>{{#each education}}<p>{{degree}}, {{institution}}</p>{{/each}}{{/if}}
{{#if (exists projects)}}<h2>Projects</h2>{{#each projects}}<p>{{title}}: {{join technologies " · "}}</p>{{/each}}{{/if}}
{{#if (exists certifications)}}<section class="certifications"><h2>Certifications</h2>{{#each certifications}}<p>{{name}} ({{issuer}})</p>{{/each}}</section>{{/if}}
</main>
</div>
</body>
</html>"#;

fn date(y: i32, m: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, 1)
}

pub fn sample_user() -> UserRow {
    UserRow {
        id: SAMPLE_USER_ID,
        username: "janedoe".into(),
        email: Some("jane@example.com".into()),
        full_name: Some("Jane Doe".into()),
        created_at: Utc::now(),
    }
}

pub fn sample_records() -> UserRecords {
    let user_id = SAMPLE_USER_ID;
    UserRecords {
        user: Some(sample_user()),
        personal: Some(PersonalDetailsRow {
            user_id,
            full_name: Some("Jane Doe".into()),
            phone: Some("+49 30 1234567".into()),
            city: Some("Berlin".into()),
            country: Some("Germany".into()),
            profile_picture: Some("profile/jane.png".into()),
            ..Default::default()
        }),
        profile: Some(ProfileDetailsRow {
            user_id,
            current_designation: Some("Staff Engineer".into()),
            ..Default::default()
        }),
        summary: Some(ProfileSummaryRow {
            user_id,
            summary: "Backend engineer focused on payment systems.".into(),
        }),
        headline: Some(ResumeHeadlineRow {
            user_id,
            headline: "Staff Backend Engineer".into(),
        }),
        languages: vec![LanguageRow {
            id: Uuid::new_v4(),
            user_id,
            language: "English".into(),
            proficiency: Some("Fluent".into()),
        }],
        employments: vec![
            EmploymentRow {
                id: Uuid::new_v4(),
                user_id,
                designation: "Backend Engineer".into(),
                company: "Globex".into(),
                location: Some("Hamburg".into()),
                start_date: date(2016, 9),
                end_date: date(2021, 1),
                description: Some("- Built the settlement service\n- Cut batch time by half".into()),
                ..Default::default()
            },
            EmploymentRow {
                id: Uuid::new_v4(),
                user_id,
                designation: "Staff Engineer".into(),
                company: "Acme Payments".into(),
                employment_type: Some("Full-time".into()),
                location: Some("Berlin".into()),
                start_date: date(2021, 2),
                is_current: true,
                description: Some("Leads the ledger platform team.".into()),
                ..Default::default()
            },
        ],
        educations: vec![EducationRow {
            id: Uuid::new_v4(),
            user_id,
            degree: "BSc Computer Science".into(),
            institution: "TU Berlin".into(),
            start_date: date(2012, 10),
            end_date: date(2016, 7),
            ..Default::default()
        }],
        key_skills: vec![KeySkillRow {
            id: Uuid::new_v4(),
            user_id,
            name: "Rust".into(),
        }],
        it_skills: vec![ItSkillRow {
            id: Uuid::new_v4(),
            user_id,
            name: "PostgreSQL".into(),
            ..Default::default()
        }],
        projects: vec![ProjectRow {
            id: Uuid::new_v4(),
            user_id,
            title: "Ledger".into(),
            technologies: vec!["Rust, Axum".into()],
            ..Default::default()
        }],
        certifications: vec![CertificationRow {
            id: Uuid::new_v4(),
            user_id,
            name: "AWS Solutions Architect".into(),
            issuer: Some("Amazon Web Services".into()),
            issued_on: date(2022, 5),
            ..Default::default()
        }],
        online_profiles: vec![
            OnlineProfileRow {
                id: Uuid::new_v4(),
                user_id,
                profile_type: "LinkedIn".into(),
                url: "https://linkedin.com/in/janedoe".into(),
                description: None,
            },
            OnlineProfileRow {
                id: Uuid::new_v4(),
                user_id,
                profile_type: "GitHub".into(),
                url: "https://github.com/janedoe".into(),
                description: None,
            },
        ],
        publications: vec![PublicationRow {
            id: Uuid::new_v4(),
            user_id,
            title: "Idempotent Payment APIs".into(),
            published_on: date(2023, 3),
            ..Default::default()
        }],
        ..Default::default()
    }
}

pub fn sample_template(id: Uuid, name: &str, html: &str) -> TemplateRow {
    TemplateRow {
        id,
        name: name.to_string(),
        category: "Modern".into(),
        industry: Some("Technology".into()),
        rating: 4.6,
        features: vec!["Two column".into(), "Photo".into()],
        html: html.to_string(),
        download_count: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub struct FakeProfileSource {
    fail: bool,
}

#[async_trait]
impl ProfileSource for FakeProfileSource {
    async fn load(&self, user_id: Uuid) -> Result<UserRecords, AppError> {
        if self.fail {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        if user_id == SAMPLE_USER_ID {
            Ok(sample_records())
        } else {
            Ok(UserRecords::default())
        }
    }
}

#[derive(Default)]
pub struct FakeTemplateStore {
    templates: Mutex<Vec<TemplateRow>>,
    downloads: AtomicUsize,
}

#[async_trait]
impl TemplateStore for FakeTemplateStore {
    async fn list(&self, category: Option<&str>) -> Result<Vec<TemplateSummary>, AppError> {
        let templates = self.templates.lock().unwrap();
        Ok(templates
            .iter()
            .filter(|t| category.map_or(true, |c| t.category.eq_ignore_ascii_case(c)))
            .map(TemplateSummary::from)
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<TemplateRow>, AppError> {
        let templates = self.templates.lock().unwrap();
        Ok(templates.iter().find(|t| t.id == id).cloned())
    }

    async fn record_download(&self, _id: Uuid) -> Result<(), AppError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Echoes the print-ready HTML back as the "PDF" so tests can inspect it.
pub struct FakePdfRenderer {
    empty: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl PdfRenderer for FakePdfRenderer {
    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.empty {
            Ok(Vec::new())
        } else {
            Ok(html.as_bytes().to_vec())
        }
    }
}

pub struct TestFixture {
    profiles: Arc<FakeProfileSource>,
    templates: Arc<FakeTemplateStore>,
    pdf: Arc<FakePdfRenderer>,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::build(false, false)
    }

    pub fn with_empty_pdf() -> Self {
        Self::build(true, false)
    }

    pub fn with_failing_profiles() -> Self {
        Self::build(false, true)
    }

    fn build(empty_pdf: bool, failing_profiles: bool) -> Self {
        let templates = FakeTemplateStore::default();
        templates.templates.lock().unwrap().push(sample_template(
            SAMPLE_TEMPLATE_ID,
            "Modern Sidebar",
            SAMPLE_TEMPLATE_HTML,
        ));
        Self {
            profiles: Arc::new(FakeProfileSource {
                fail: failing_profiles,
            }),
            templates: Arc::new(templates),
            pdf: Arc::new(FakePdfRenderer {
                empty: empty_pdf,
                calls: AtomicUsize::new(0),
            }),
        }
    }

    pub fn add_template(&self, name: &str, html: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.templates
            .templates
            .lock()
            .unwrap()
            .push(sample_template(id, name, html));
        id
    }

    pub fn download_count(&self) -> usize {
        self.templates.downloads.load(Ordering::SeqCst)
    }

    pub fn pdf_calls(&self) -> usize {
        self.pdf.calls.load(Ordering::SeqCst)
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/resume_test".into(),
        port: 0,
        rust_log: "debug".into(),
        chrome_bin: "chromium".into(),
        pdf_render_timeout: Duration::from_secs(5),
        pdf_max_concurrent_renders: 1,
        assets_dir: PathBuf::from("/nonexistent/resume-api-assets"),
    }
}

pub fn test_state(fixture: &TestFixture) -> AppState {
    AppState {
        config: test_config(),
        engine: Arc::new(TemplateEngine::new()),
        profiles: fixture.profiles.clone(),
        templates: fixture.templates.clone(),
        pdf: fixture.pdf.clone(),
    }
}
