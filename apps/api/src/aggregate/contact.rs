//! Contact resolution across the several places a user can leave contact details.

use crate::aggregate::models::{ContactInfo, LinkItem};
use crate::models::user::{OnlineProfileRow, PersonalDetailsRow, ProfileDetailsRow, UserRow};

const WEBSITE_TYPES: &[&str] = &["portfolio", "website", "blog"];

pub struct ContactSources<'a> {
    pub user: Option<&'a UserRow>,
    pub personal: Option<&'a PersonalDetailsRow>,
    pub profile: Option<&'a ProfileDetailsRow>,
    pub online_profiles: &'a [OnlineProfileRow],
}

pub fn resolve_contact(sources: &ContactSources<'_>) -> ContactInfo {
    ContactInfo {
        email: resolve_email(sources),
        phone: first_non_blank([
            sources.personal.and_then(|p| p.phone.as_deref()),
            sources.profile.and_then(|p| p.phone.as_deref()),
        ]),
        location: resolve_location(sources),
        linkedin: find_profile_url(sources.online_profiles, "linkedin").unwrap_or_default(),
        github: find_profile_url(sources.online_profiles, "github").unwrap_or_default(),
        website: sources
            .online_profiles
            .iter()
            .find(|p| {
                let kind = p.profile_type.to_lowercase();
                WEBSITE_TYPES.iter().any(|w| kind.contains(w))
            })
            .map(|p| p.url.trim().to_string())
            .unwrap_or_default(),
    }
}

/// user record → personal details → profile details → any online profile carrying an address.
fn resolve_email(sources: &ContactSources<'_>) -> String {
    let direct = first_non_blank([
        sources.user.and_then(|u| u.email.as_deref()),
        sources.personal.and_then(|p| p.email.as_deref()),
        sources.profile.and_then(|p| p.email.as_deref()),
    ]);
    if !direct.is_empty() {
        return direct;
    }

    sources
        .online_profiles
        .iter()
        .find_map(|p| as_email(&p.url).or_else(|| as_email(&p.profile_type)))
        .map(String::from)
        .unwrap_or_default()
}

/// The address in `value` when it is an email (optionally `mailto:`), not a
/// URL that happens to contain `@` such as `https://youtube.com/@handle`.
fn as_email(value: &str) -> Option<&str> {
    let value = value.trim();
    let address = value.strip_prefix("mailto:").unwrap_or(value).trim();
    let (local, domain) = address.split_once('@')?;
    let plain = !local.is_empty()
        && domain.contains('.')
        && !address.contains("://")
        && !address.contains('/')
        && !address.contains(char::is_whitespace);
    plain.then_some(address)
}

fn resolve_location(sources: &ContactSources<'_>) -> String {
    if let Some(personal) = sources.personal {
        let parts: Vec<&str> = [personal.city.as_deref(), personal.country.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if !parts.is_empty() {
            return parts.join(", ");
        }
    }
    first_non_blank([sources.profile.and_then(|p| p.location.as_deref())])
}

/// First online profile whose type or URL mentions `needle` (case-insensitive).
pub fn find_profile_url(profiles: &[OnlineProfileRow], needle: &str) -> Option<String> {
    let needle = needle.to_lowercase();
    profiles
        .iter()
        .find(|p| {
            p.profile_type.to_lowercase().contains(&needle) || p.url.to_lowercase().contains(&needle)
        })
        .map(|p| p.url.trim().to_string())
        .filter(|url| !url.is_empty())
}

/// Online profiles as template links; entries that are only an email address are skipped.
pub fn profile_links(profiles: &[OnlineProfileRow]) -> Vec<LinkItem> {
    profiles
        .iter()
        .filter(|p| !p.url.trim().is_empty() && as_email(&p.url).is_none())
        .map(|p| LinkItem {
            label: p.profile_type.trim().to_string(),
            url: p.url.trim().to_string(),
        })
        .collect()
}

fn first_non_blank<'a, I>(candidates: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn user(email: Option<&str>) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            username: "jdoe".into(),
            email: email.map(String::from),
            full_name: None,
            created_at: Utc::now(),
        }
    }

    fn online(profile_type: &str, url: &str) -> OnlineProfileRow {
        OnlineProfileRow {
            profile_type: profile_type.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_user_email_preferred() {
        let u = user(Some("core@example.com"));
        let personal = PersonalDetailsRow {
            email: Some("personal@example.com".into()),
            ..Default::default()
        };
        let contact = resolve_contact(&ContactSources {
            user: Some(&u),
            personal: Some(&personal),
            profile: None,
            online_profiles: &[],
        });
        assert_eq!(contact.email, "core@example.com");
    }

    #[test]
    fn test_email_falls_back_in_order() {
        let u = user(Some("  "));
        let profile = ProfileDetailsRow {
            email: Some("profile@example.com".into()),
            ..Default::default()
        };
        let contact = resolve_contact(&ContactSources {
            user: Some(&u),
            personal: Some(&PersonalDetailsRow::default()),
            profile: Some(&profile),
            online_profiles: &[],
        });
        assert_eq!(contact.email, "profile@example.com");
    }

    #[test]
    fn test_email_from_online_profile() {
        let profiles = vec![
            online("LinkedIn", "https://linkedin.com/in/jdoe"),
            online("Email", "mailto:jdoe@example.com"),
        ];
        let contact = resolve_contact(&ContactSources {
            user: None,
            personal: None,
            profile: None,
            online_profiles: &profiles,
        });
        assert_eq!(contact.email, "jdoe@example.com");
        assert_eq!(contact.linkedin, "https://linkedin.com/in/jdoe");
    }

    #[test]
    fn test_github_matched_by_url_case_insensitive() {
        let profiles = vec![online("Code", "https://GitHub.com/jdoe")];
        assert_eq!(
            find_profile_url(&profiles, "github").as_deref(),
            Some("https://GitHub.com/jdoe")
        );
        assert_eq!(find_profile_url(&profiles, "linkedin"), None);
    }

    #[test]
    fn test_location_prefers_personal_city_country() {
        let personal = PersonalDetailsRow {
            city: Some("Lisbon".into()),
            country: Some("Portugal".into()),
            ..Default::default()
        };
        let profile = ProfileDetailsRow {
            location: Some("Remote".into()),
            ..Default::default()
        };
        let contact = resolve_contact(&ContactSources {
            user: None,
            personal: Some(&personal),
            profile: Some(&profile),
            online_profiles: &[],
        });
        assert_eq!(contact.location, "Lisbon, Portugal");
    }

    #[test]
    fn test_profile_links_skip_email_entries() {
        let profiles = vec![
            online("Email", "jdoe@example.com"),
            online("Portfolio", "https://jdoe.dev"),
        ];
        let links = profile_links(&profiles);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].label, "Portfolio");
    }

    #[test]
    fn test_handle_urls_are_links_not_emails() {
        let profiles = vec![
            online("YouTube", "https://www.youtube.com/@janedoe"),
            online("Blog", "medium.com/@jane"),
        ];
        let contact = resolve_contact(&ContactSources {
            user: None,
            personal: None,
            profile: None,
            online_profiles: &profiles,
        });
        assert_eq!(contact.email, "");
        let links = profile_links(&profiles);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "https://www.youtube.com/@janedoe");
    }

    #[test]
    fn test_as_email_accepts_mailto_only_for_addresses() {
        assert_eq!(as_email(" mailto:jdoe@example.com "), Some("jdoe@example.com"));
        assert_eq!(as_email("https://www.youtube.com/@janedoe"), None);
        assert_eq!(as_email("@handle"), None);
    }
}
