use std::collections::{HashMap, HashSet};
use crate::models::SwipeRecord;

/// Per-user sets of jobs that must not be recommended again
#[derive(Debug, Clone, Default)]
pub struct ExclusionMap {
    by_user: HashMap<String, HashSet<String>>,
}

impl ExclusionMap {
    /// Group swipes by user. Swipe direction does not matter: any swipe
    /// means the job was already shown.
    pub fn from_swipes(swipes: &[SwipeRecord]) -> Self {
        let mut by_user: HashMap<String, HashSet<String>> = HashMap::new();
        for swipe in swipes {
            by_user
                .entry(swipe.user_id.clone())
                .or_default()
                .insert(swipe.job_id.clone());
        }
        Self { by_user }
    }

    /// Excluded jobs for a user; empty when the user never swiped
    pub fn for_user(&self, user_id: &str) -> &HashSet<String> {
        static EMPTY: std::sync::OnceLock<HashSet<String>> = std::sync::OnceLock::new();
        self.by_user
            .get(user_id)
            .unwrap_or_else(|| EMPTY.get_or_init(HashSet::new))
    }

    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }
}
