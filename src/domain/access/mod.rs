//! Access module - read-time authorization for lesson content.

mod guard;

pub use guard::{
    evaluate_lesson_access, purchase_redirect_path, AccessDeniedReason, AccessGrant, AccessResult,
};
