use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bal",
    about = "balance-log: classify balance changes in Lua unit definitions",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Property schema overlaid on the built-in catalog
    #[arg(long, global = true)]
    pub schema: Option<PathBuf>,

    /// Analyzer configuration
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Language file with unit display names
    #[arg(long, global = true)]
    pub names: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print a decoded, normalized unit definition as JSON
    Decode(DecodeArgs),
    /// Classify the changes between two revisions of one file
    Diff(DiffArgs),
    /// Analyze two directory snapshots as one commit
    Snapshot(SnapshotArgs),
}

#[derive(Args)]
pub struct DecodeArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct DiffArgs {
    pub old: PathBuf,
    pub new: PathBuf,
    /// Repository path of the file, used to flag variant units
    #[arg(long)]
    pub path: Option<String>,
}

#[derive(Args)]
pub struct SnapshotArgs {
    pub old_dir: PathBuf,
    pub new_dir: PathBuf,
    #[arg(long, default_value = "snapshot")]
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_decode() {
        let cli = Cli::try_parse_from(["bal", "decode", "units/armpw.lua"]).unwrap();
        if let Command::Decode(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("units/armpw.lua"));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_diff_with_path() {
        let cli = Cli::try_parse_from(["bal", "diff", "a.lua", "b.lua", "--path", "units/x.lua"]).unwrap();
        if let Command::Diff(args) = cli.command {
            assert_eq!(args.old, PathBuf::from("a.lua"));
            assert_eq!(args.new, PathBuf::from("b.lua"));
            assert_eq!(args.path, Some("units/x.lua".into()));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_snapshot_default_id() {
        let cli = Cli::try_parse_from(["bal", "snapshot", "old", "new"]).unwrap();
        if let Command::Snapshot(args) = cli.command {
            assert_eq!(args.id, "snapshot");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_files() {
        let cli = Cli::try_parse_from([
            "bal", "diff", "a.lua", "b.lua", "--schema", "s.toml", "--names", "en.lua",
        ])
        .unwrap();
        assert_eq!(cli.schema, Some(PathBuf::from("s.toml")));
        assert_eq!(cli.names, Some(PathBuf::from("en.lua")));
        assert_eq!(cli.config, None);
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["bal", "--verbose", "decode", "x.lua"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["bal", "--format", "json", "snapshot", "a", "b"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
