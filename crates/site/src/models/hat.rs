//! Hat domain types.

use chrono::{DateTime, Utc};

use lobsters_core::{HatId, UserId};

/// A badge a user may display on their comments.
#[derive(Debug, Clone, PartialEq)]
pub struct Hat {
    /// Unique hat ID.
    pub id: HatId,
    /// User entitled to wear this hat.
    pub user_id: UserId,
    /// Display name (e.g. "Sysop").
    pub hat: String,
    /// Optional link explaining the hat.
    pub link: Option<String>,
    /// When the hat was granted.
    pub created_at: DateTime<Utc>,
}

impl Hat {
    /// Whether `user_id` may wear this hat on a comment.
    #[must_use]
    pub fn wearable_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hat_for(user: i32) -> Hat {
        Hat {
            id: HatId::new(1),
            user_id: UserId::new(user),
            hat: "Sysop".to_string(),
            link: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_wearable_by_owner() {
        assert!(hat_for(5).wearable_by(UserId::new(5)));
    }

    #[test]
    fn test_not_wearable_by_someone_else() {
        assert!(!hat_for(5).wearable_by(UserId::new(6)));
    }
}
