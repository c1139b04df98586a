//! `ResumeData`: the per-request aggregate merged into templates.
//!
//! Field names are the placeholder contract for stored templates, e.g.
//! `{{personal.full_name}}`, `{{#each experience}}{{title}}{{/each}}`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::profile::{
    CertificationRow, EducationRow, EmploymentRow, LanguageRow, PatentRow, PresentationRow,
    ProjectRow, PublicationRow, WorkSampleRow,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResumeData {
    pub personal: PersonalInfo,
    pub contact: ContactInfo,
    pub summary: String,
    pub headline: String,
    pub languages: Vec<LanguageItem>,
    /// Most recent first.
    pub experience: Vec<ExperienceItem>,
    /// Most recent first.
    pub education: Vec<EducationItem>,
    /// Deduplicated, in source order: key skills, IT skills, project technologies.
    pub skills: Vec<SkillItem>,
    pub skill_groups: SkillGroups,
    pub projects: Vec<ProjectItem>,
    pub certifications: Vec<CertificationItem>,
    pub online_profiles: Vec<LinkItem>,
    pub work_samples: Vec<WorkSampleItem>,
    pub publications: Vec<PublicationItem>,
    pub presentations: Vec<PresentationItem>,
    pub patents: Vec<PatentItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersonalInfo {
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: String,
    pub nationality: String,
    pub address: String,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
    pub github: String,
    pub website: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExperienceItem {
    pub title: String,
    pub company: String,
    pub employment_type: String,
    pub location: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub current: bool,
    pub description: String,
    pub highlights: Vec<String>,
}

impl ExperienceItem {
    pub fn from_row(row: &EmploymentRow) -> Self {
        let description = clean(row.description.as_deref());
        Self {
            title: row.designation.trim().to_string(),
            company: row.company.trim().to_string(),
            employment_type: clean(row.employment_type.as_deref()),
            location: clean(row.location.as_deref()),
            start_date: row.start_date,
            end_date: if row.is_current { None } else { row.end_date },
            current: row.is_current,
            highlights: split_highlights(&description),
            description,
        }
    }

    /// True when the role has no end: flagged current or end date never set.
    pub fn is_ongoing(&self) -> bool {
        self.current || self.end_date.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EducationItem {
    pub degree: String,
    pub institution: String,
    pub field_of_study: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub grade: String,
}

impl From<&EducationRow> for EducationItem {
    fn from(row: &EducationRow) -> Self {
        Self {
            degree: row.degree.trim().to_string(),
            institution: row.institution.trim().to_string(),
            field_of_study: clean(row.field_of_study.as_deref()),
            start_date: row.start_date,
            end_date: row.end_date,
            grade: clean(row.grade.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    KeySkill,
    ItSkill,
    Project,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillItem {
    pub name: String,
    pub category: SkillCategory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SkillGroups {
    pub key_skills: Vec<String>,
    pub it_skills: Vec<String>,
    pub project_skills: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectItem {
    pub title: String,
    pub description: String,
    pub role: String,
    pub url: String,
    pub technologies: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<&ProjectRow> for ProjectItem {
    fn from(row: &ProjectRow) -> Self {
        Self {
            title: row.title.trim().to_string(),
            description: clean(row.description.as_deref()),
            role: clean(row.role.as_deref()),
            url: clean(row.url.as_deref()),
            technologies: split_technologies(&row.technologies),
            start_date: row.start_date,
            end_date: row.end_date,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CertificationItem {
    pub name: String,
    pub issuer: String,
    pub issued_on: Option<NaiveDate>,
    pub expires_on: Option<NaiveDate>,
    pub url: String,
}

impl From<&CertificationRow> for CertificationItem {
    fn from(row: &CertificationRow) -> Self {
        Self {
            name: row.name.trim().to_string(),
            issuer: clean(row.issuer.as_deref()),
            issued_on: row.issued_on,
            expires_on: row.expires_on,
            url: clean(row.credential_url.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LanguageItem {
    pub name: String,
    pub proficiency: String,
}

impl From<&LanguageRow> for LanguageItem {
    fn from(row: &LanguageRow) -> Self {
        Self {
            name: row.language.trim().to_string(),
            proficiency: clean(row.proficiency.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LinkItem {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkSampleItem {
    pub title: String,
    pub url: String,
    pub description: String,
}

impl From<&WorkSampleRow> for WorkSampleItem {
    fn from(row: &WorkSampleRow) -> Self {
        Self {
            title: row.title.trim().to_string(),
            url: clean(row.url.as_deref()),
            description: clean(row.description.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PublicationItem {
    pub title: String,
    pub url: String,
    pub published_on: Option<NaiveDate>,
    pub description: String,
}

impl From<&PublicationRow> for PublicationItem {
    fn from(row: &PublicationRow) -> Self {
        Self {
            title: row.title.trim().to_string(),
            url: clean(row.url.as_deref()),
            published_on: row.published_on,
            description: clean(row.description.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PresentationItem {
    pub title: String,
    pub url: String,
    pub description: String,
}

impl From<&PresentationRow> for PresentationItem {
    fn from(row: &PresentationRow) -> Self {
        Self {
            title: row.title.trim().to_string(),
            url: clean(row.url.as_deref()),
            description: clean(row.description.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatentItem {
    pub title: String,
    pub office: String,
    pub application_number: String,
    pub status: String,
    pub issued_on: Option<NaiveDate>,
    pub url: String,
    pub description: String,
}

impl From<&PatentRow> for PatentItem {
    fn from(row: &PatentRow) -> Self {
        Self {
            title: row.title.trim().to_string(),
            office: clean(row.patent_office.as_deref()),
            application_number: clean(row.application_number.as_deref()),
            status: clean(row.status.as_deref()),
            issued_on: row.issued_on,
            url: clean(row.url.as_deref()),
            description: clean(row.description.as_deref()),
        }
    }
}

/// Trims an optional free-text field; absent becomes empty.
pub fn clean(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

/// Splits a description into display lines, dropping bullet glyphs and blanks.
pub fn split_highlights(description: &str) -> Vec<String> {
    description
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(['-', '*', '•', '·'])
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

/// Flattens a technology list whose entries may hold several comma/semicolon separated names.
pub fn split_technologies(raw: &[String]) -> Vec<String> {
    raw.iter()
        .flat_map(|entry| entry.split([',', ';']))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}
