//! High-level SDK for balance-log.
//!
//! Ties the decoder, normalizer, and classifier together into per-file and
//! per-commit analysis. This is the main entry point for applications that
//! feed commits in from their own source-control layer.

pub mod analyzer;
pub mod commit;
pub mod config;
pub mod error;
pub mod snapshot;

pub use analyzer::{load_unit_names, BalanceAnalyzer, LoadedDefinition};
pub use commit::{
    CommitAnalysis, CommitInput, CommitSelection, FileFailure, FileRevision, FileStatus,
    FileWarning, LoadWarning,
};
pub use config::AnalyzerConfig;
pub use error::{AnalyzeError, AnalyzeResult, Side};
pub use snapshot::snapshot_commit;

// Re-export key types
pub use bal_diff::{ClassifierConfig, ClassifyMode};
pub use bal_schema::{BuffRule, PropertyDef, PropertySchema, UnitNames, ValueShape};
pub use bal_types::{
    ArrayDelta, Author, BalanceChange, ChangeRecord, ObjectChange, ObjectChangeKind, Table, Value,
    ValueChange, ValueChangeKind,
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Helper: analyzer over the built-in catalog.
    fn analyzer() -> BalanceAnalyzer {
        BalanceAnalyzer::new(
            PropertySchema::builtin(),
            UnitNames::new(),
            AnalyzerConfig::default(),
        )
    }

    /// Helper: a commit touching one unit file.
    fn commit_with(sha: &str, path: &str, previous: &str, current: &str) -> CommitInput {
        let date = chrono::Utc.with_ymd_and_hms(2023, 8, 14, 12, 0, 0).unwrap();
        CommitInput::new(sha, date)
            .with_message("balance pass")
            .with_file(FileRevision::modified(path, previous, current))
    }

    fn value_at<'a>(unit: &'a ObjectChange, key: &str) -> &'a ValueChange {
        match unit.child(key) {
            Some(ChangeRecord::Value(v)) => v,
            other => panic!("expected value change for {key}, got {:?}", other),
        }
    }

    // -----------------------------------------------------------------------
    // 1. Number and split-string changes in one unit
    // -----------------------------------------------------------------------
    #[test]
    fn hp_buff_and_category_swap() {
        let schema = PropertySchema::builtin();
        assert_eq!(schema.rule_of("maxdamage"), Some(BuffRule::HigherIsBetter));
        assert_eq!(schema.shape_of("category"), Some(ValueShape::StringArray));

        let commit = commit_with(
            "c1",
            "units/unitX.lua",
            r#"return { ["unitX"] = { maxdamage = 100, category = "a b" } }"#,
            r#"return { ["unitX"] = { maxdamage = 120, category = "a c" } }"#,
        );
        let analysis = analyzer().analyze_commit(&commit);
        assert!(analysis.failures.is_empty());
        assert_eq!(analysis.change.sha, "c1");
        assert_eq!(analysis.change.message, "balance pass");

        let unit = &analysis.change.changes[0];
        assert_eq!(unit.property_id, "unitX");
        assert_eq!(unit.kind, ObjectChangeKind::Modified);

        let hp = value_at(unit, "maxdamage");
        assert_eq!(hp.kind, ValueChangeKind::Buff);
        assert_eq!(hp.percent_change, Some(0.2));

        let category = value_at(unit, "category");
        assert_eq!(category.kind, ValueChangeKind::Unknown);
        let delta = category.array_change.as_ref().unwrap();
        assert_eq!(delta.added, vec![Value::from("c")]);
        assert_eq!(delta.removed, vec![Value::from("b")]);
    }

    // -----------------------------------------------------------------------
    // 2. A malformed file does not hide its siblings
    // -----------------------------------------------------------------------
    #[test]
    fn malformed_file_is_isolated() {
        let commit = commit_with(
            "c2",
            "units/armpw.lua",
            "return { armpw = { maxdamage = 100 } }",
            "return { armpw = { maxdamage = 90 } }",
        )
        .with_file(FileRevision::modified(
            "units/broken.lua",
            "return { broken = { maxdamage = 1 } }",
            "return { broken = { maxdamage = ",
        ));
        let analysis = analyzer().analyze_commit(&commit);

        assert_eq!(analysis.change.changes.len(), 1);
        assert_eq!(
            value_at(&analysis.change.changes[0], "maxdamage").kind,
            ValueChangeKind::Nerf
        );
        assert_eq!(analysis.failures.len(), 1);
        assert_eq!(analysis.failures[0].path, "units/broken.lua");
        assert!(analysis.failures[0].error.is_malformed_source());
        assert!(!analysis.is_empty());
    }

    // -----------------------------------------------------------------------
    // 3. Weapon lists are compared by weapon name, not position
    // -----------------------------------------------------------------------
    #[test]
    fn weapon_slots_keyed_by_definition() {
        let before = r#"
return { armpw = {
    weapondefs = { emg = { range = 180 } },
    weapons = { { def = "EMG", onlytargetcategory = "NOTSUB" } },
} }"#;
        let after = r#"
return { armpw = {
    weapondefs = { emg = { range = 200 } },
    weapons = { { def = "EMG", onlytargetcategory = "SURFACE" } },
} }"#;
        let analysis = analyzer().analyze_commit(&commit_with("c3", "units/armpw.lua", before, after));
        let unit = &analysis.change.changes[0];
        let weapons = match unit.child("weapons") {
            Some(ChangeRecord::Object(w)) => w,
            other => panic!("expected weapons object change, got {:?}", other),
        };
        assert_eq!(weapons.changes[0].property_id(), "emg");
        assert!(unit.child("weapondefs").is_some());
    }

    // -----------------------------------------------------------------------
    // 4. Selection over a commit history
    // -----------------------------------------------------------------------
    #[test]
    fn history_selection_and_empty_commits() {
        let unit = |hp: u32| format!("return {{ armpw = {{ maxdamage = {hp} }} }}");
        let commits = vec![
            commit_with("c4", "units/armpw.lua", &unit(110), &unit(120)),
            commit_with("c3", "units/armpw.lua", &unit(100), &unit(110)),
            commit_with("c2", "units/armpw.lua", &unit(100), &unit(100)),
            commit_with("c1", "units/armpw.lua", &unit(90), &unit(100)),
        ];
        let a = analyzer();

        let all: Vec<_> = a
            .analyze_commits(&commits, &CommitSelection::default())
            .into_iter()
            .map(|r| r.change.sha)
            .collect();
        assert_eq!(all, vec!["c4", "c3", "c1"]);

        let bounded: Vec<_> = a
            .analyze_commits(
                &commits,
                &CommitSelection {
                    exclude_shas: vec!["c4".into()],
                    up_to_sha: Some("c1".into()),
                    ..Default::default()
                },
            )
            .into_iter()
            .map(|r| r.change.sha)
            .collect();
        assert_eq!(bounded, vec!["c3"]);
    }

    // -----------------------------------------------------------------------
    // 5. Snapshot directories feed the same pipeline
    // -----------------------------------------------------------------------
    #[test]
    fn snapshot_directories_analyze_like_commits() {
        let old = tempfile::tempdir().unwrap();
        let new = tempfile::tempdir().unwrap();
        for (dir, hp) in [(&old, 100), (&new, 150)] {
            let units = dir.path().join("units");
            std::fs::create_dir_all(&units).unwrap();
            std::fs::write(
                units.join("armpw.lua"),
                format!("local unitName = \"Pawn\"\nreturn {{ armpw = {{ maxdamage = {hp} }} }}"),
            )
            .unwrap();
        }

        let commit = snapshot_commit(old.path(), new.path(), "snapshot").unwrap();
        let analysis = analyzer().analyze_commit(&commit);
        let unit = &analysis.change.changes[0];
        assert_eq!(unit.property_name, "Pawn");
        assert_eq!(value_at(unit, "maxdamage").percent_change, Some(0.5));
    }

    // -----------------------------------------------------------------------
    // 6. Change sets serialize for downstream consumers
    // -----------------------------------------------------------------------
    #[test]
    fn balance_change_serializes_to_json() {
        let analysis = analyzer().analyze_commit(&commit_with(
            "c5",
            "units/armpw.lua",
            "return { armpw = { maxdamage = 100 } }",
            "return { armpw = { maxdamage = 120 } }",
        ));
        let json = serde_json::to_value(&analysis.change).unwrap();
        assert_eq!(json["sha"], "c5");
        assert!(json["changes"].is_array());
    }
}
