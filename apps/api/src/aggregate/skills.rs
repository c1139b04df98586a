use std::collections::HashSet;

use crate::aggregate::models::{SkillCategory, SkillGroups, SkillItem};

/// Case-insensitive skill accumulator. The first occurrence of a name fixes
/// both its display spelling and its category; later duplicates are dropped.
#[derive(Debug, Default)]
pub struct SkillSet {
    seen: HashSet<String>,
    items: Vec<SkillItem>,
}

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the name is blank or already present.
    pub fn insert(&mut self, name: &str, category: SkillCategory) -> bool {
        let display = name.trim();
        if display.is_empty() {
            return false;
        }
        if !self.seen.insert(display.to_lowercase()) {
            return false;
        }
        self.items.push(SkillItem {
            name: display.to_string(),
            category,
        });
        true
    }

    pub fn extend<'a, I>(&mut self, names: I, category: SkillCategory)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for name in names {
            self.insert(name, category);
        }
    }

    pub fn groups(&self) -> SkillGroups {
        let mut groups = SkillGroups::default();
        for item in &self.items {
            let bucket = match item.category {
                SkillCategory::KeySkill => &mut groups.key_skills,
                SkillCategory::ItSkill => &mut groups.it_skills,
                SkillCategory::Project => &mut groups.project_skills,
            };
            bucket.push(item.name.clone());
        }
        groups
    }

    pub fn into_items(self) -> Vec<SkillItem> {
        self.items
    }
}

/// Dedups the three skill sources in their fixed precedence order:
/// key skills, then IT skills, then project technologies.
pub fn merge_skill_sources(
    key_skills: &[String],
    it_skills: &[String],
    project_skills: &[String],
) -> (Vec<SkillItem>, SkillGroups) {
    let mut set = SkillSet::new();
    set.extend(key_skills.iter().map(String::as_str), SkillCategory::KeySkill);
    set.extend(it_skills.iter().map(String::as_str), SkillCategory::ItSkill);
    set.extend(project_skills.iter().map(String::as_str), SkillCategory::Project);
    let groups = set.groups();
    (set.into_items(), groups)
}
