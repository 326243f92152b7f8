use std::path::Path;

use anyhow::Context;
use bal_sdk::{
    snapshot_commit, AnalyzerConfig, BalanceAnalyzer, ChangeRecord, CommitAnalysis, FileRevision,
    ObjectChange, ObjectChangeKind, Value, ValueChange, ValueChangeKind,
};
use colored::{ColoredString, Colorize};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let analyzer = build_analyzer(&cli)?;
    match &cli.command {
        Command::Decode(args) => cmd_decode(&analyzer, args),
        Command::Diff(args) => cmd_diff(&analyzer, args, &cli.format),
        Command::Snapshot(args) => cmd_snapshot(&analyzer, args, &cli.format),
    }
}

fn build_analyzer(cli: &Cli) -> anyhow::Result<BalanceAnalyzer> {
    let config = match &cli.config {
        Some(path) => AnalyzerConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };
    let analyzer = BalanceAnalyzer::from_files(cli.schema.as_deref(), cli.names.as_deref(), config)
        .context("loading reference data")?;
    debug!(
        properties = analyzer.schema().len(),
        names = analyzer.names().len(),
        "analyzer ready"
    );
    Ok(analyzer)
}

fn read(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn cmd_decode(analyzer: &BalanceAnalyzer, args: &DecodeArgs) -> anyhow::Result<()> {
    let value = analyzer
        .load_definition(&read(&args.file)?)
        .with_context(|| format!("decoding {}", args.file.display()))?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn cmd_diff(analyzer: &BalanceAnalyzer, args: &DiffArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let path = args
        .path
        .clone()
        .unwrap_or_else(|| args.new.to_string_lossy().replace('\\', "/"));
    let file = FileRevision::modified(path, read(&args.old)?, read(&args.new)?);
    let change = analyzer.analyze_file(&file)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&change)?),
        OutputFormat::Text => match &change {
            Some(unit) => print_unit(unit),
            None => println!("No balance changes."),
        },
    }
    Ok(())
}

fn cmd_snapshot(
    analyzer: &BalanceAnalyzer,
    args: &SnapshotArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let commit = snapshot_commit(&args.old_dir, &args.new_dir, &args.id)?;
    let analysis = analyzer.analyze_commit(&commit);

    match format {
        OutputFormat::Json => {
            let failures: Vec<_> = analysis
                .failures
                .iter()
                .map(|f| serde_json::json!({ "path": f.path, "error": f.error.to_string() }))
                .collect();
            let warnings: Vec<_> = analysis
                .warnings
                .iter()
                .map(|w| {
                    serde_json::json!({
                        "path": w.path,
                        "side": w.side.to_string(),
                        "warning": w.warning.to_string(),
                    })
                })
                .collect();
            let out = serde_json::json!({
                "change": analysis.change,
                "failures": failures,
                "warnings": warnings,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => print_analysis(&analysis),
    }
    Ok(())
}

fn print_analysis(analysis: &CommitAnalysis) {
    let change = &analysis.change;
    println!(
        "{} {} unit(s) changed, {} file(s) failed",
        change.sha.yellow().bold(),
        change.changes.len(),
        analysis.failures.len()
    );
    if analysis.is_empty() {
        println!("No balance changes.");
    }
    for unit in &change.changes {
        print_unit(unit);
    }
    for failure in &analysis.failures {
        println!("{} {}: {}", "✗".red().bold(), failure.path, failure.error);
    }
    for w in &analysis.warnings {
        println!("{} {} ({}): {}", "!".yellow().bold(), w.path, w.side, w.warning);
    }
}

fn print_unit(unit: &ObjectChange) {
    let variant = if unit.variant { " [variant]".dimmed() } else { "".normal() };
    println!(
        "{} ({}) {}{}",
        unit.property_name.bold(),
        unit.property_id.dimmed(),
        object_kind(unit.kind),
        variant
    );
    print_records(&unit.changes, 1);
}

fn print_records(records: &[ChangeRecord], depth: usize) {
    let indent = "  ".repeat(depth);
    for record in records {
        match record {
            ChangeRecord::Object(object) => {
                println!("{indent}{} {}", object.property_name.bold(), object_kind(object.kind));
                print_records(&object.changes, depth + 1);
            }
            ChangeRecord::Value(value) => {
                println!("{indent}{}: {} {}", value.property_name, describe(value), value_kind(value.kind));
            }
        }
    }
}

fn describe(change: &ValueChange) -> String {
    let show = |v: Option<&Value>| v.map_or_else(|| "-".to_string(), ToString::to_string);
    let mut line = format!(
        "{} -> {}",
        show(change.prev_value.as_ref()),
        show(change.new_value.as_ref())
    );
    if let Some(pct) = change.percent_change.filter(|p| p.is_finite()) {
        line.push_str(&format!(" ({})", format_percent(pct)));
    }
    if let Some(delta) = change.array_change.as_ref().filter(|d| !d.is_empty()) {
        let join = |items: &[Value]| {
            items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
        };
        line.push_str(&format!(" [+{} -{}]", join(&delta.added), join(&delta.removed)));
    }
    line
}

/// Signed percentage with one decimal, e.g. `+20.0%`.
fn format_percent(fraction: f64) -> String {
    format!("{:+.1}%", fraction * 100.0)
}

fn value_kind(kind: ValueChangeKind) -> ColoredString {
    let label = kind.to_string();
    match kind {
        ValueChangeKind::Buff => label.green().bold(),
        ValueChangeKind::Nerf => label.red().bold(),
        ValueChangeKind::Added => label.cyan(),
        ValueChangeKind::Removed => label.magenta(),
        ValueChangeKind::Unknown => label.yellow(),
    }
}

fn object_kind(kind: ObjectChangeKind) -> ColoredString {
    let label = kind.to_string();
    match kind {
        ObjectChangeKind::Added => label.cyan(),
        ObjectChangeKind::Removed => label.magenta(),
        ObjectChangeKind::Modified => label.normal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bal_sdk::ArrayDelta;

    fn leaf(prev: f64, new: f64, percent: Option<f64>) -> ValueChange {
        ValueChange {
            property_id: "maxdamage".into(),
            property_name: "Base HP".into(),
            prev_value: Some(prev.into()),
            new_value: Some(new.into()),
            kind: ValueChangeKind::Buff,
            percent_change: percent,
            array_change: None,
        }
    }

    #[test]
    fn percent_has_sign() {
        assert_eq!(format_percent(0.2), "+20.0%");
        assert_eq!(format_percent(-0.125), "-12.5%");
        assert_eq!(format_percent(0.0), "+0.0%");
    }

    #[test]
    fn describe_number_change() {
        assert_eq!(describe(&leaf(100.0, 120.0, Some(0.2))), "100 -> 120 (+20.0%)");
    }

    #[test]
    fn describe_skips_infinite_percent() {
        assert_eq!(describe(&leaf(0.0, 5.0, Some(f64::INFINITY))), "0 -> 5");
    }

    #[test]
    fn describe_array_delta() {
        let mut change = leaf(0.0, 0.0, None);
        change.prev_value = Some(Value::Array(vec!["a".into(), "b".into()]));
        change.new_value = Some(Value::Array(vec!["a".into(), "c".into()]));
        change.array_change = Some(ArrayDelta {
            added: vec!["c".into()],
            removed: vec!["b".into()],
        });
        assert_eq!(
            describe(&change),
            r#"["a", "b"] -> ["a", "c"] [+"c" -"b"]"#
        );
    }

    #[test]
    fn describe_added_value() {
        let mut change = leaf(0.0, 1.0, None);
        change.prev_value = None;
        assert_eq!(describe(&change), "- -> 1");
    }
}
