//! Owned-course references as they appear in stored user documents.
//!
//! Older records hold either a bare course id or an embedded course object
//! with an `id` field. Everything past this module works with bare
//! `CourseId`s only.

use serde::{Deserialize, Deserializer};

use crate::domain::foundation::CourseId;

/// One entry of a stored `purchasedCourses` array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OwnedCourseRef {
    Id(CourseId),
    Embedded { id: CourseId },
}

impl OwnedCourseRef {
    pub fn course_id(&self) -> CourseId {
        match self {
            OwnedCourseRef::Id(id) | OwnedCourseRef::Embedded { id } => *id,
        }
    }
}

/// Coerces stored references to bare ids, dropping duplicates and keeping
/// first-seen order.
pub fn normalize_owned_courses<I>(refs: I) -> Vec<CourseId>
where
    I: IntoIterator<Item = OwnedCourseRef>,
{
    let mut ids: Vec<CourseId> = Vec::new();
    for id in refs.into_iter().map(|r| r.course_id()) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Serde hook used by `User` so mixed representations never reach the domain.
pub(crate) fn deserialize_owned_courses<'de, D>(deserializer: D) -> Result<Vec<CourseId>, D::Error>
where
    D: Deserializer<'de>,
{
    let refs = Vec::<OwnedCourseRef>::deserialize(deserializer)?;
    Ok(normalize_owned_courses(refs))
}
