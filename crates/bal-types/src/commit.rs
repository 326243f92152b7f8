//! Commit-level balance records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::change::ObjectChange;

/// The author of a commit, as reported by the source-control host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    pub avatar_url: String,
    pub profile_link: String,
}

/// All unit changes introduced by one commit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BalanceChange {
    pub sha: String,
    pub date: DateTime<Utc>,
    pub message: String,
    pub url: String,
    pub author: Author,
    /// One entry per unit file with at least one balance-relevant change.
    pub changes: Vec<ObjectChange>,
}

impl BalanceChange {
    /// Returns `true` if no unit changed.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Identifiers of the changed units, in file order.
    pub fn unit_ids(&self) -> impl Iterator<Item = &str> {
        self.changes.iter().map(|c| c.property_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ObjectChangeKind;
    use chrono::TimeZone;

    #[test]
    fn serializes_date_as_rfc3339() {
        let change = BalanceChange {
            sha: "abc123".into(),
            date: Utc.with_ymd_and_hms(2022, 3, 1, 12, 0, 0).unwrap(),
            message: "buff pawns".into(),
            url: "https://example.invalid/commit/abc123".into(),
            author: Author {
                name: "dev".into(),
                ..Default::default()
            },
            changes: vec![ObjectChange {
                property_id: "armpw".into(),
                property_name: "Pawn".into(),
                kind: ObjectChangeKind::Modified,
                changes: vec![],
                variant: false,
            }],
        };
        let v = serde_json::to_value(&change).unwrap();
        assert_eq!(v["date"], "2022-03-01T12:00:00Z");
        assert_eq!(v["author"]["avatarUrl"], "");
        assert_eq!(change.unit_ids().collect::<Vec<_>>(), vec!["armpw"]);
        assert!(!change.is_empty());
    }
}
