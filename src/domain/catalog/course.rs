//! Course aggregate and its content tree.
//!
//! Courses are authored outside this service; the fulfillment pipeline only
//! reads them. The content tree is modules containing lessons, and every
//! lesson carries its own free-preview flag.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CourseId, Money};

/// Publication lifecycle of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

/// Position of a lesson inside a course: zero-based module and lesson index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LessonCoordinate {
    pub module_index: usize,
    pub lesson_index: usize,
}

impl LessonCoordinate {
    pub fn new(module_index: usize, lesson_index: usize) -> Self {
        Self {
            module_index,
            lesson_index,
        }
    }

    /// Stable key used in progress records, e.g. `0-3`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.module_index, self.lesson_index)
    }
}

/// A single video lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Video host identifier.
    #[serde(default)]
    pub video_id: Option<String>,
    /// Human-readable duration, e.g. `12:30`.
    #[serde(default)]
    pub duration: Option<String>,
    /// Viewable without owning the course.
    #[serde(default)]
    pub is_free: bool,
}

/// A titled group of lessons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseModule {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// A sellable course.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: CourseId,
    /// Unique, URL-safe identifier used in routes.
    pub slug: String,
    pub title: String,
    pub price: Money,
    /// Price before discount, shown struck through.
    pub original_price: Option<Money>,
    /// Payment-provider price reference. Checkout is impossible without it.
    pub stripe_price_id: Option<String>,
    pub status: CourseStatus,
    pub modules: Vec<CourseModule>,
}

impl Course {
    /// Looks up a lesson by coordinate.
    pub fn lesson(&self, at: LessonCoordinate) -> Option<&Lesson> {
        self.modules
            .get(at.module_index)
            .and_then(|m| m.lessons.get(at.lesson_index))
    }

    /// Returns the configured price reference, treating blank as absent.
    pub fn payment_price_id(&self) -> Option<&str> {
        self.stripe_price_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn is_published(&self) -> bool {
        self.status == CourseStatus::Published
    }

    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }
}

/// Checks that a slug is non-empty lowercase ASCII letters, digits and hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn lesson(title: &str, is_free: bool) -> Lesson {
        Lesson {
            title: title.to_string(),
            description: None,
            video_id: Some(format!("vid-{}", title.to_lowercase().replace(' ', "-"))),
            duration: Some("10:00".to_string()),
            is_free,
        }
    }

    /// Published course with lesson (0,0) free and (0,1), (1,0) gated.
    pub fn sample_course() -> Course {
        Course {
            id: CourseId::new(),
            slug: "zaklady-liceni".to_string(),
            title: "Základy líčenia".to_string(),
            price: Money::eur(4999).unwrap(),
            original_price: Some(Money::eur(7999).unwrap()),
            stripe_price_id: Some("price_123".to_string()),
            status: CourseStatus::Published,
            modules: vec![
                CourseModule {
                    title: "Úvod".to_string(),
                    description: None,
                    lessons: vec![lesson("Vitajte", true), lesson("Pomôcky", false)],
                },
                CourseModule {
                    title: "Technika".to_string(),
                    description: None,
                    lessons: vec![lesson("Podklad", false)],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::sample_course;
    use super::*;

    #[test]
    fn lesson_lookup_by_coordinate() {
        let course = sample_course();

        assert_eq!(course.lesson(LessonCoordinate::new(0, 1)).unwrap().title, "Pomôcky");
        assert_eq!(course.lesson(LessonCoordinate::new(1, 0)).unwrap().title, "Podklad");
    }

    #[test]
    fn lesson_lookup_out_of_bounds_is_none() {
        let course = sample_course();

        assert!(course.lesson(LessonCoordinate::new(0, 2)).is_none());
        assert!(course.lesson(LessonCoordinate::new(5, 0)).is_none());
    }

    #[test]
    fn blank_price_id_counts_as_missing() {
        let mut course = sample_course();
        course.stripe_price_id = Some("  ".to_string());
        assert!(course.payment_price_id().is_none());

        course.stripe_price_id = None;
        assert!(course.payment_price_id().is_none());
    }

    #[test]
    fn lesson_count_sums_modules() {
        assert_eq!(sample_course().lesson_count(), 3);
    }

    #[test]
    fn coordinate_key_format() {
        assert_eq!(LessonCoordinate::new(2, 7).key(), "2-7");
    }

    #[test]
    fn slug_validation() {
        assert!(is_valid_slug("zaklady-liceni"));
        assert!(is_valid_slug("kurz-2024"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Zaklady"));
        assert!(!is_valid_slug("-zaklady"));
        assert!(!is_valid_slug("a b"));
    }

    #[test]
    fn lesson_is_free_defaults_to_false() {
        let lesson: Lesson = serde_json::from_str(r#"{"title":"Intro"}"#).unwrap();
        assert!(!lesson.is_free);
    }

    #[test]
    fn lesson_reads_camel_case_free_flag() {
        let lesson: Lesson =
            serde_json::from_str(r#"{"title":"Intro","videoId":"abc","isFree":true}"#).unwrap();
        assert!(lesson.is_free);
        assert_eq!(lesson.video_id.as_deref(), Some("abc"));
    }
}
