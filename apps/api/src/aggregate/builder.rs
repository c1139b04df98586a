//! Folds a user's raw section records into one `ResumeData`.
//!
//! Pure and infallible: every section defaults to empty on its own, and a
//! missing user produces placeholder contact fields so templates always have
//! something to show.

use std::cmp::Ordering;

use crate::aggregate::contact::{profile_links, resolve_contact, ContactSources};
use crate::aggregate::models::{
    clean, split_highlights, split_technologies, CertificationItem, ContactInfo, EducationItem,
    ExperienceItem, LanguageItem, PatentItem, PersonalInfo, PresentationItem, ProjectItem,
    PublicationItem, ResumeData, WorkSampleItem,
};
use crate::aggregate::skills::merge_skill_sources;
use crate::aggregate::source::UserRecords;

pub const PLACEHOLDER_NAME: &str = "Your Name";
pub const PLACEHOLDER_EMAIL: &str = "your.email@example.com";
pub const PLACEHOLDER_PHONE: &str = "+1 (555) 000-0000";
pub const PLACEHOLDER_LOCATION: &str = "City, Country";
const FALLBACK_EXPERIENCE_TITLE: &str = "Professional Summary";

pub fn build_resume_data(records: &UserRecords) -> ResumeData {
    let Some(user) = records.user.as_ref() else {
        return placeholder_resume();
    };

    let full_name = [
        records.personal.as_ref().and_then(|p| p.full_name.as_deref()),
        user.full_name.as_deref(),
        Some(user.username.as_str()),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|s| !s.is_empty())
    .unwrap_or_default()
    .to_string();

    let personal = match records.personal.as_ref() {
        Some(p) => PersonalInfo {
            date_of_birth: p.date_of_birth,
            gender: clean(p.gender.as_deref()),
            nationality: clean(p.nationality.as_deref()),
            address: clean(p.address.as_deref()),
            profile_picture: p
                .profile_picture
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            ..name_parts(&full_name)
        },
        None => name_parts(&full_name),
    };

    let contact = resolve_contact(&ContactSources {
        user: Some(user),
        personal: records.personal.as_ref(),
        profile: records.profile.as_ref(),
        online_profiles: &records.online_profiles,
    });

    let summary = records
        .summary
        .as_ref()
        .map(|s| s.summary.trim().to_string())
        .unwrap_or_default();
    let headline = records
        .headline
        .as_ref()
        .map(|h| h.headline.trim().to_string())
        .filter(|h| !h.is_empty())
        .or_else(|| {
            records
                .profile
                .as_ref()
                .map(|p| clean(p.current_designation.as_deref()))
        })
        .unwrap_or_default();

    let mut experience: Vec<ExperienceItem> =
        records.employments.iter().map(ExperienceItem::from_row).collect();
    experience.sort_by(|a, b| compare_recency(b, a));
    if experience.is_empty() && !summary.is_empty() {
        experience.push(fallback_experience(&summary, &headline));
    }

    let mut education: Vec<EducationItem> =
        records.educations.iter().map(EducationItem::from).collect();
    education.sort_by(|a, b| {
        (b.end_date.is_none(), b.end_date, b.start_date).cmp(&(
            a.end_date.is_none(),
            a.end_date,
            a.start_date,
        ))
    });

    let key_skills: Vec<String> = records.key_skills.iter().map(|s| s.name.clone()).collect();
    let it_skills: Vec<String> = records.it_skills.iter().map(|s| s.name.clone()).collect();
    let project_skills: Vec<String> = records
        .projects
        .iter()
        .flat_map(|p| split_technologies(&p.technologies))
        .collect();
    let (skills, skill_groups) = merge_skill_sources(&key_skills, &it_skills, &project_skills);

    ResumeData {
        personal,
        contact,
        summary,
        headline,
        languages: records.languages.iter().map(LanguageItem::from).collect(),
        experience,
        education,
        skills,
        skill_groups,
        projects: records.projects.iter().map(ProjectItem::from).collect(),
        certifications: records
            .certifications
            .iter()
            .map(CertificationItem::from)
            .collect(),
        online_profiles: profile_links(&records.online_profiles),
        work_samples: records.work_samples.iter().map(WorkSampleItem::from).collect(),
        publications: records.publications.iter().map(PublicationItem::from).collect(),
        presentations: records
            .presentations
            .iter()
            .map(PresentationItem::from)
            .collect(),
        patents: records.patents.iter().map(PatentItem::from).collect(),
    }
}

/// Aggregate for a user that does not exist.
pub fn placeholder_resume() -> ResumeData {
    ResumeData {
        personal: name_parts(PLACEHOLDER_NAME),
        contact: ContactInfo {
            email: PLACEHOLDER_EMAIL.to_string(),
            phone: PLACEHOLDER_PHONE.to_string(),
            location: PLACEHOLDER_LOCATION.to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Ongoing roles first, then latest end date, then latest start date.
fn compare_recency(a: &ExperienceItem, b: &ExperienceItem) -> Ordering {
    (a.is_ongoing(), a.end_date, a.start_date).cmp(&(b.is_ongoing(), b.end_date, b.start_date))
}

fn fallback_experience(summary: &str, headline: &str) -> ExperienceItem {
    let title = if headline.is_empty() {
        FALLBACK_EXPERIENCE_TITLE
    } else {
        headline
    };
    ExperienceItem {
        title: title.to_string(),
        description: summary.to_string(),
        highlights: split_highlights(summary),
        ..Default::default()
    }
}

fn name_parts(full_name: &str) -> PersonalInfo {
    let full_name = full_name.trim();
    let (first, last) = match full_name.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (full_name, ""),
    };
    PersonalInfo {
        full_name: full_name.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        ..Default::default()
    }
}
