//! Declarative business-rule tables and the small checks built on them.

use chrono::NaiveDate;
use url::Url;

use crate::errors::AppError;
use crate::models::resume::Theme;
use crate::models::section::SectionName;

/// Allowed theme changes. Re-selecting the current theme is not a transition.
pub const THEME_TRANSITIONS: &[(Theme, &[Theme])] = &[
    (
        Theme::Default,
        &[Theme::Modern, Theme::Classic, Theme::Professional],
    ),
    (Theme::Modern, &[Theme::Default, Theme::Professional]),
    (Theme::Classic, &[Theme::Default, Theme::Professional]),
    (
        Theme::Professional,
        &[Theme::Default, Theme::Modern, Theme::Classic],
    ),
];

/// Canonical skill levels, lowest first.
pub const SKILL_LEVELS: &[&str] = &["Beginner", "Intermediate", "Advanced", "Expert"];

/// Section kinds with their wire name and default display name.
pub const SECTION_NAMES: &[(SectionName, &str, &str)] = &[
    (SectionName::Education, "education", "Education"),
    (SectionName::Experience, "experience", "Work Experience"),
    (SectionName::Projects, "projects", "Projects"),
    (SectionName::Skills, "skills", "Skills"),
    (SectionName::Certifications, "certifications", "Certifications"),
    (SectionName::Summary, "summary", "Summary"),
    (SectionName::Contact, "contact", "Contact Information"),
];

pub const DEFAULT_SKILL_CATEGORY: &str = "Other";

pub const MAX_TECHNOLOGIES: usize = 20;

pub fn theme_transition_allowed(from: Theme, to: Theme) -> bool {
    THEME_TRANSITIONS
        .iter()
        .find(|(source, _)| *source == from)
        .map(|(_, targets)| targets.contains(&to))
        .unwrap_or(false)
}

/// Case-insensitive lookup returning the canonical spelling.
pub fn canonical_skill_level(level: &str) -> Option<&'static str> {
    SKILL_LEVELS
        .iter()
        .copied()
        .find(|known| known.eq_ignore_ascii_case(level.trim()))
}

pub fn max_len(field: &str, value: Option<&str>, max: usize) -> Result<(), AppError> {
    match value {
        Some(v) if v.chars().count() > max => Err(AppError::validation(format!(
            "{field} must be at most {max} characters"
        ))),
        _ => Ok(()),
    }
}

/// Absolute URL with a host. Empty strings count as "not provided".
pub fn check_url(value: Option<&str>, message: &str) -> Result<(), AppError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(());
    };
    match Url::parse(raw) {
        Ok(url) if url.has_host() => Ok(()),
        _ => Err(AppError::validation(message)),
    }
}

/// Equal dates are accepted.
pub fn check_date_order(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    message: &str,
) -> Result<(), AppError> {
    match (start, end) {
        (Some(s), Some(e)) if s > e => Err(AppError::validation(message)),
        _ => Ok(()),
    }
}

pub fn check_order_index(order_index: Option<i32>) -> Result<(), AppError> {
    match order_index {
        Some(i) if i < 0 => Err(AppError::validation(
            "orderIndex must be a non-negative integer",
        )),
        _ => Ok(()),
    }
}
