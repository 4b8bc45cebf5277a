//! Command line argument definitions.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use meritbadge_core::FileType;

#[derive(Parser)]
#[command(
    name = "meritbadge",
    version,
    about = "Validate and import Scoutbook roster and merit badge exports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Record database directory (overrides config and MERITBADGE_DATABASE).
    #[arg(long = "database", value_name = "DIR", global = true)]
    pub database: Option<PathBuf>,

    /// Also write logs to a daily rolling file in this directory.
    #[arg(long = "log-dir", value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate export files without importing anything.
    Validate(ValidateArgs),

    /// Validate, then import every file that passes.
    Import(ImportArgs),

    /// Show views over imported records.
    #[command(subcommand)]
    Show(View),

    /// Show or update the saved configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct FileArgs {
    /// Youth roster export (required for a passing run).
    #[arg(long = "roster", value_name = "CSV")]
    pub roster: Option<PathBuf>,

    /// Adult roster export.
    #[arg(long = "adults", value_name = "CSV")]
    pub adults: Option<PathBuf>,

    /// Merit badge progress export.
    #[arg(long = "progress", value_name = "CSV")]
    pub progress: Option<PathBuf>,
}

impl FileArgs {
    pub fn files(&self) -> BTreeMap<FileType, PathBuf> {
        [
            (FileType::YouthRoster, &self.roster),
            (FileType::AdultRoster, &self.adults),
            (FileType::MeritBadgeProgress, &self.progress),
        ]
        .into_iter()
        .filter_map(|(file_type, path)| path.clone().map(|p| (file_type, p)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_none() && self.adults.is_none() && self.progress.is_none()
    }
}

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub files: FileArgs,

    /// Write a full text report into this directory.
    #[arg(long = "report-dir", value_name = "DIR")]
    pub report_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub files: FileArgs,

    /// Write a full text report into this directory.
    #[arg(long = "report-dir", value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Validate and convert, but keep records in memory only.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum View {
    /// Active scouts by rank.
    Scouts,

    /// One scout's merit badges.
    Scout {
        #[arg(value_name = "BSA_NUMBER")]
        bsa_number: String,
    },

    /// Scouts working on and finished with each badge.
    Badges,

    /// Progress rows whose scout is not on the roster.
    Unmatched,

    /// Active scouts holding leadership positions.
    Leaders,

    /// Open badges per counselor, linked to the adult roster.
    Counselors,

    /// Every counselor name with the adults it may refer to.
    CounselorMatches,

    /// When each table was last written.
    Status,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Unit name printed in reports.
    #[arg(long = "unit-name")]
    pub unit_name: Option<String>,

    /// Save the database directory given with --database.
    #[arg(long = "save-database")]
    pub save_database: bool,

    /// Link a counselor name to an adult, e.g. "Coach Bob=130002". Repeatable.
    #[arg(long = "map-counselor", value_name = "NAME=BSA_NUMBER", value_parser = parse_mapping)]
    pub map_counselor: Vec<(String, String)>,
}

fn parse_mapping(s: &str) -> Result<(String, String), String> {
    let (name, bsa) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=BSA_NUMBER, got '{}'", s))?;
    let (name, bsa) = (name.trim(), bsa.trim());
    if name.is_empty() || bsa.is_empty() || !bsa.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("expected NAME=BSA_NUMBER, got '{}'", s));
    }
    Ok((name.to_string(), bsa.to_string()))
}
