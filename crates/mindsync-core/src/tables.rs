//! The fixed set of replicated tables.
//!
//! The relay, copier, and verifier all operate over this list. It is known at
//! start-up and never changes at runtime; schema changes on the platform side
//! land here as a code change.

/// Every table replicated from the source project to the target project, in
/// the order the copier and verifier walk them.
pub const REPLICATED_TABLES: [&str; 15] = [
    "profiles",
    "emotion_diaries",
    "assessments",
    "wearable_data",
    "healing_contents",
    "user_healing_records",
    "community_posts",
    "community_comments",
    "post_likes",
    "doctor_patients",
    "risk_alerts",
    "knowledge_base",
    "meditation_sessions",
    "user_favorites",
    "post_categories",
];

/// Whether `table` is part of the replication set.
#[must_use]
pub fn is_replicated(table: &str) -> bool {
    REPLICATED_TABLES.contains(&table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_fifteen_distinct_tables() {
        let mut names = REPLICATED_TABLES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 15);
    }

    #[test]
    fn membership_check() {
        assert!(is_replicated("risk_alerts"));
        assert!(is_replicated("profiles"));
        assert!(!is_replicated("audit_log"));
        assert!(!is_replicated(""));
    }
}
