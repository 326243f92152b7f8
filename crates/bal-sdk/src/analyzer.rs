use std::path::Path;

use bal_diff::Classifier;
use bal_lua::{normalize, parse_unit_names, Decoder};
use bal_schema::{PropertySchema, UnitNames};
use bal_types::{BalanceChange, ObjectChange, Value};
use tracing::{debug, info, warn};

use crate::commit::{
    CommitAnalysis, CommitInput, CommitSelection, FileFailure, FileRevision, FileStatus,
    FileWarning, LoadWarning,
};
use crate::config::AnalyzerConfig;
use crate::error::{AnalyzeError, AnalyzeResult, Side};

/// A decoded, normalized unit definition file.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedDefinition {
    pub value: Value,
    /// Name bound by a `local` in the file, if any.
    pub bound_name: Option<String>,
    /// Data the decoder or normalizer left out, in the order it was met.
    pub warnings: Vec<LoadWarning>,
}

/// Turns raw unit-definition revisions into classified balance changes.
///
/// Holds the read-only reference data shared by every file: the property
/// schema and the unit display-name table.
#[derive(Clone, Debug)]
pub struct BalanceAnalyzer {
    schema: PropertySchema,
    names: UnitNames,
    config: AnalyzerConfig,
}

impl BalanceAnalyzer {
    pub fn new(schema: PropertySchema, names: UnitNames, config: AnalyzerConfig) -> Self {
        Self {
            schema,
            names,
            config,
        }
    }

    /// Analyzer over the built-in catalog, optionally overlaid with a TOML
    /// schema, and an optional language file for unit names.
    pub fn from_files(
        schema_overlay: Option<&Path>,
        names_file: Option<&Path>,
        config: AnalyzerConfig,
    ) -> AnalyzeResult<Self> {
        let mut schema = PropertySchema::builtin();
        if let Some(path) = schema_overlay {
            schema = schema.merge(PropertySchema::from_toml_file(path)?);
        }
        let names = match names_file {
            Some(path) => load_unit_names(path)?,
            None => UnitNames::new(),
        };
        Ok(Self::new(schema, names, config))
    }

    pub fn schema(&self) -> &PropertySchema {
        &self.schema
    }

    pub fn names(&self) -> &UnitNames {
        &self.names
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    fn classifier(&self) -> Classifier<'_> {
        Classifier::new(&self.schema, &self.names).with_config(self.config.classifier.clone())
    }

    /// Returns `true` if `path` names a unit definition that should be
    /// analyzed.
    pub fn is_unit_file(&self, path: &str) -> bool {
        let config = &self.config;
        let has_extension = path
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext == config.extension);
        path.starts_with(&config.unit_path_prefix)
            && has_extension
            && !config.excluded_markers.iter().any(|m| path.contains(m.as_str()))
            && (config.include_variants || !config.is_variant_path(path))
    }

    /// Decode and normalize one unit definition file.
    pub fn load_definition(&self, src: &[u8]) -> AnalyzeResult<Value> {
        Ok(self.load(src)?.value)
    }

    /// Decode and normalize one unit definition file, keeping what was
    /// dropped along the way.
    pub fn load(&self, src: &[u8]) -> AnalyzeResult<LoadedDefinition> {
        let decoded = Decoder::new(&self.schema).decode(src)?;
        let normalized = normalize(decoded.root);
        let warnings: Vec<LoadWarning> = decoded
            .warnings
            .into_iter()
            .map(LoadWarning::Decode)
            .chain(normalized.warnings.into_iter().map(LoadWarning::Normalize))
            .collect();
        if !warnings.is_empty() {
            debug!(warnings = warnings.len(), "definition loaded with dropped data");
        }
        Ok(LoadedDefinition {
            value: normalized.value,
            bound_name: decoded.bound_name,
            warnings,
        })
    }

    /// Classify the change to one file.
    ///
    /// Returns `None` when nothing balance-relevant changed.
    pub fn analyze_file(&self, file: &FileRevision) -> AnalyzeResult<Option<ObjectChange>> {
        Ok(self.analyze_file_with_warnings(file)?.0)
    }

    /// Like [`analyze_file`](Self::analyze_file), also returning the data
    /// dropped from either revision.
    pub fn analyze_file_with_warnings(
        &self,
        file: &FileRevision,
    ) -> AnalyzeResult<(Option<ObjectChange>, Vec<FileWarning>)> {
        let (previous, current) = match file.status {
            FileStatus::Added => (None, Some(self.load(file.content(Side::Current)?)?)),
            FileStatus::Removed => (Some(self.load(file.content(Side::Previous)?)?), None),
            FileStatus::Modified => (
                Some(self.load(file.content(Side::Previous)?)?),
                Some(self.load(file.content(Side::Current)?)?),
            ),
        };
        let bound_name = current
            .as_ref()
            .and_then(|d| d.bound_name.as_deref())
            .or_else(|| previous.as_ref().and_then(|d| d.bound_name.as_deref()));

        let change = self.classifier().classify_unit(
            previous.as_ref().map(|d| &d.value),
            current.as_ref().map(|d| &d.value),
            bound_name,
        );
        let change = change.map(|mut unit| {
            unit.variant = self.config.is_variant_path(&file.path);
            debug!(
                path = %file.path,
                unit = %unit.property_id,
                changes = unit.changes.len(),
                "classified unit change"
            );
            unit
        });

        let sides = [(Side::Previous, &previous), (Side::Current, &current)];
        let warnings = sides
            .into_iter()
            .flat_map(|(side, loaded)| {
                loaded
                    .iter()
                    .flat_map(|d| d.warnings.iter())
                    .map(move |warning| FileWarning {
                        path: file.path.clone(),
                        side,
                        warning: warning.clone(),
                    })
            })
            .collect();
        Ok((change, warnings))
    }

    /// Analyze every unit file of a commit. A file that fails is recorded
    /// and skipped; it never discards its siblings' results.
    pub fn analyze_commit(&self, commit: &CommitInput) -> CommitAnalysis {
        let mut changes = Vec::new();
        let mut failures = Vec::new();
        let mut warnings = Vec::new();

        for file in commit.files.iter().filter(|f| self.is_unit_file(&f.path)) {
            match self.analyze_file_with_warnings(file) {
                Ok((change, file_warnings)) => {
                    for w in &file_warnings {
                        warn!(
                            sha = %commit.sha,
                            path = %w.path,
                            side = %w.side,
                            "{}",
                            w.warning
                        );
                    }
                    warnings.extend(file_warnings);
                    changes.extend(change);
                }
                Err(error) => {
                    warn!(
                        sha = %commit.sha,
                        path = %file.path,
                        error = %error,
                        "failed to analyze unit file"
                    );
                    failures.push(FileFailure {
                        path: file.path.clone(),
                        error,
                    });
                }
            }
        }

        debug!(
            sha = %commit.sha,
            units = changes.len(),
            failures = failures.len(),
            warnings = warnings.len(),
            "analyzed commit"
        );
        CommitAnalysis {
            change: BalanceChange {
                sha: commit.sha.clone(),
                date: commit.date,
                message: commit.message.clone(),
                url: commit.url.clone(),
                author: commit.author.clone(),
                changes,
            },
            failures,
            warnings,
        }
    }

    /// Analyze a newest-first commit list according to `selection`.
    ///
    /// Commits with neither changes nor failures are left out.
    pub fn analyze_commits(
        &self,
        commits: &[CommitInput],
        selection: &CommitSelection,
    ) -> Vec<CommitAnalysis> {
        let pinned = selection
            .sha
            .as_ref()
            .and_then(|sha| commits.iter().find(|c| &c.sha == sha));
        let candidates: Vec<&CommitInput> = match pinned {
            Some(commit) => vec![commit],
            None => commits.iter().collect(),
        };

        let mut processed = 0;
        let mut results = Vec::new();
        for commit in candidates {
            if selection.limit == Some(processed) {
                break;
            }
            if selection.exclude_shas.contains(&commit.sha) {
                debug!(sha = %commit.sha, "skipping excluded commit");
                continue;
            }
            if selection.up_to_sha.as_ref() == Some(&commit.sha) {
                break;
            }

            info!(sha = %commit.sha, "analyzing commit");
            let analysis = self.analyze_commit(commit);
            processed += 1;
            if !analysis.is_empty() {
                results.push(analysis);
            }
        }
        results
    }
}

/// Load the unit display-name table from a language file.
pub fn load_unit_names(path: impl AsRef<Path>) -> AnalyzeResult<UnitNames> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| AnalyzeError::io(path, e))?;
    let names = parse_unit_names(&bytes)?;
    debug!(path = %path.display(), count = names.len(), "loaded unit names");
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bal_types::{ObjectChangeKind, ValueChangeKind};
    use chrono::{TimeZone, Utc};
    use std::io::Write;

    fn analyzer() -> BalanceAnalyzer {
        BalanceAnalyzer::new(
            PropertySchema::builtin(),
            UnitNames::new(),
            AnalyzerConfig::default(),
        )
    }

    fn unit_src(id: &str, hp: i32) -> String {
        format!("return {{ {id} = {{ maxdamage = {hp}, name = \"{id}\" }} }}")
    }

    fn commit(sha: &str, files: Vec<FileRevision>) -> CommitInput {
        let date = Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap();
        files
            .into_iter()
            .fold(CommitInput::new(sha, date), CommitInput::with_file)
    }

    fn hp_change(sha: &str) -> CommitInput {
        commit(
            sha,
            vec![FileRevision::modified(
                "units/armpw.lua",
                unit_src("armpw", 100),
                unit_src("armpw", 120),
            )],
        )
    }

    #[test]
    fn unit_file_filter() {
        let a = analyzer();
        assert!(a.is_unit_file("units/ArmBots/armpw.lua"));
        assert!(!a.is_unit_file("units/ArmBots/armpw.lua.bak"));
        assert!(!a.is_unit_file("gamedata/armpw.lua"));
        assert!(!a.is_unit_file("units/other/critter.lua"));
        assert!(!a.is_unit_file("units/Scavengers/armpw_scav.lua"));

        let mut config = AnalyzerConfig::default();
        config.include_variants = true;
        let a = BalanceAnalyzer::new(PropertySchema::builtin(), UnitNames::new(), config);
        assert!(a.is_unit_file("units/Scavengers/armpw_scav.lua"));
    }

    #[test]
    fn load_definition_normalizes_weapons() {
        let value = analyzer()
            .load_definition(
                br#"return { armpw = {
                    weapondefs = { emg = { range = 180 } },
                    weapons = { { def = "EMG" } },
                } }"#,
            )
            .unwrap();
        let weapons = value
            .as_table()
            .and_then(|t| t.get("armpw"))
            .and_then(Value::as_table)
            .and_then(|u| u.get("weapons"))
            .and_then(Value::as_table);
        assert!(weapons.is_some_and(|w| w.contains_key("emg")));
    }

    #[test]
    fn modified_file_yields_unit_change() {
        let file = FileRevision::modified(
            "units/armpw.lua",
            unit_src("armpw", 100),
            unit_src("armpw", 120),
        );
        let change = analyzer().analyze_file(&file).unwrap().unwrap();
        assert_eq!(change.property_id, "armpw");
        assert_eq!(change.kind, ObjectChangeKind::Modified);
        assert!(!change.variant);
        let hp = change.child("maxdamage").and_then(|c| c.as_value()).unwrap();
        assert_eq!(hp.kind, ValueChangeKind::Buff);
    }

    #[test]
    fn unchanged_file_yields_nothing() {
        let file = FileRevision::modified(
            "units/armpw.lua",
            unit_src("armpw", 100),
            format!("-- reformatted\n{}", unit_src("armpw", 100)),
        );
        assert!(analyzer().analyze_file(&file).unwrap().is_none());
    }

    #[test]
    fn added_and_removed_files() {
        let a = analyzer();
        let added = a
            .analyze_file(&FileRevision::added("units/x.lua", unit_src("x", 1)))
            .unwrap()
            .unwrap();
        assert_eq!(added.kind, ObjectChangeKind::Added);
        let removed = a
            .analyze_file(&FileRevision::removed("units/x.lua", unit_src("x", 1)))
            .unwrap()
            .unwrap();
        assert_eq!(removed.kind, ObjectChangeKind::Removed);
    }

    #[test]
    fn missing_revision_is_an_error() {
        let file = FileRevision {
            path: "units/x.lua".into(),
            status: FileStatus::Modified,
            previous: None,
            current: Some(unit_src("x", 1).into_bytes()),
        };
        assert!(matches!(
            analyzer().analyze_file(&file),
            Err(AnalyzeError::MissingRevision { side: Side::Previous, .. })
        ));
    }

    #[test]
    fn variant_units_are_flagged() {
        let mut config = AnalyzerConfig::default();
        config.include_variants = true;
        let a = BalanceAnalyzer::new(PropertySchema::builtin(), UnitNames::new(), config);
        let file = FileRevision::modified(
            "units/Scavengers/armpw_scav.lua",
            unit_src("armpw_scav", 100),
            unit_src("armpw_scav", 90),
        );
        let change = a.analyze_file(&file).unwrap().unwrap();
        assert!(change.variant);
    }

    #[test]
    fn failures_are_isolated_per_file() {
        let c = commit(
            "abc",
            vec![
                FileRevision::modified("units/bad.lua", "return {", unit_src("bad", 1)),
                FileRevision::modified("units/armpw.lua", unit_src("armpw", 100), unit_src("armpw", 120)),
                FileRevision::modified("docs/readme.lua", "nonsense", "more nonsense"),
            ],
        );
        let analysis = analyzer().analyze_commit(&c);
        assert_eq!(analysis.change.unit_ids().collect::<Vec<_>>(), vec!["armpw"]);
        assert_eq!(analysis.failures.len(), 1);
        assert_eq!(analysis.failures[0].path, "units/bad.lua");
        assert!(analysis.failures[0].error.is_malformed_source());
    }

    #[test]
    fn load_keeps_decode_and_normalize_warnings() {
        let loaded = analyzer()
            .load(
                br#"return { armpw = {
                    tags = { "a", tag = "b" },
                    weapondefs = { emg = { range = 180 } },
                    weapons = { { def = "EMG" }, { def = "GONE" } },
                } }"#,
            )
            .unwrap();
        assert!(matches!(
            loaded.warnings.as_slice(),
            [
                LoadWarning::Decode(bal_lua::DecodeWarning::DroppedPositional { count: 1, .. }),
                LoadWarning::Normalize(bal_lua::NormalizeWarning::UnmatchedWeapons { dropped: 1, .. }),
            ]
        ));
    }

    #[test]
    fn commit_analysis_reports_warnings_per_side() {
        let c = commit(
            "w1",
            vec![FileRevision::modified(
                "units/armpw.lua",
                "return { armpw = { maxdamage = 100 } }",
                "local function f() end\nreturn { armpw = { maxdamage = 120, tags = { 1, x = 2 } } }",
            )],
        );
        let analysis = analyzer().analyze_commit(&c);
        assert_eq!(analysis.change.unit_ids().collect::<Vec<_>>(), vec!["armpw"]);
        assert!(analysis.failures.is_empty());
        assert_eq!(analysis.warnings.len(), 1);
        let w = &analysis.warnings[0];
        assert_eq!(w.path, "units/armpw.lua");
        assert_eq!(w.side, Side::Current);
        match &w.warning {
            LoadWarning::Decode(bal_lua::DecodeWarning::DroppedPositional { count, .. }) => {
                assert_eq!(*count, 1)
            }
            other => panic!("expected dropped positional warning, got {:?}", other),
        }
    }

    #[test]
    fn selection_pins_sha() {
        let commits = vec![hp_change("c3"), hp_change("c2"), hp_change("c1")];
        let selection = CommitSelection {
            sha: Some("c2".into()),
            ..Default::default()
        };
        let shas: Vec<_> = analyzer()
            .analyze_commits(&commits, &selection)
            .into_iter()
            .map(|a| a.change.sha)
            .collect();
        assert_eq!(shas, vec!["c2"]);
    }

    #[test]
    fn selection_unknown_pin_keeps_all() {
        let commits = vec![hp_change("c2"), hp_change("c1")];
        let selection = CommitSelection {
            sha: Some("zzz".into()),
            ..Default::default()
        };
        assert_eq!(analyzer().analyze_commits(&commits, &selection).len(), 2);
    }

    #[test]
    fn selection_limit_excludes_and_stop() {
        let commits = vec![
            hp_change("c5"),
            hp_change("c4"),
            hp_change("c3"),
            hp_change("c2"),
            hp_change("c1"),
        ];
        let a = analyzer();
        let run = |selection: CommitSelection| -> Vec<String> {
            a.analyze_commits(&commits, &selection)
                .into_iter()
                .map(|r| r.change.sha)
                .collect()
        };

        // excluded commits do not count towards the limit
        assert_eq!(
            run(CommitSelection {
                exclude_shas: vec!["c4".into()],
                limit: Some(2),
                ..Default::default()
            }),
            vec!["c5", "c3"]
        );
        assert_eq!(
            run(CommitSelection {
                up_to_sha: Some("c3".into()),
                ..Default::default()
            }),
            vec!["c5", "c4"]
        );
        assert!(run(CommitSelection {
            limit: Some(0),
            ..Default::default()
        })
        .is_empty());
    }

    #[test]
    fn commits_without_changes_are_dropped() {
        let quiet = commit(
            "quiet",
            vec![FileRevision::modified("README.md", "a", "b")],
        );
        let commits = vec![hp_change("c1"), quiet];
        let results = analyzer().analyze_commits(&commits, &CommitSelection::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].change.sha, "c1");
    }

    #[test]
    fn from_files_loads_overlay_and_names() {
        let mut schema = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            schema,
            "[properties.maxdamage]\nfriendly_name = \"Hit Points\"\nbuff = \"higher-is-better\""
        )
        .unwrap();
        let mut names = tempfile::NamedTempFile::new().unwrap();
        writeln!(names, "return {{ en = {{ units = {{ names = {{ armpw = \"Pawn\" }} }} }} }}").unwrap();

        let a = BalanceAnalyzer::from_files(
            Some(schema.path()),
            Some(names.path()),
            AnalyzerConfig::default(),
        )
        .unwrap();
        assert_eq!(a.schema().friendly_name("maxdamage"), Some("Hit Points"));
        assert_eq!(a.names().get("armpw"), Some("Pawn"));
        assert!(a.schema().len() > 1);
    }

    #[test]
    fn missing_names_file_is_io_error() {
        assert!(matches!(
            load_unit_names("/nonexistent/units_en.lua"),
            Err(AnalyzeError::Io { .. })
        ));
    }
}
