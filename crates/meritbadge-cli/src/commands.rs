//! Subcommand implementations.

use std::path::Path;

use anyhow::{bail, Context, Result};
use meritbadge_core::utils::truncate_string;
use meritbadge_core::{
    views, Config, Importer, JsonStore, MemoryStore, RecordStore, ValidationOrchestrator,
    ValidationReport,
};
use tracing::info;

use crate::cli::{ConfigArgs, FileArgs, ImportArgs, ValidateArgs, View};
use crate::report::{render_import, render_summary, write_report};

fn require_files(files: &FileArgs) -> Result<()> {
    if files.is_empty() {
        bail!("No files given. Pass at least one of --roster, --adults, --progress");
    }
    Ok(())
}

fn save_report(report: &ValidationReport, config: &Config, dir: Option<&Path>) -> Result<()> {
    if let Some(dir) = dir {
        let path = write_report(report, dir, config.unit_name.as_deref())?;
        println!("\nFull report written to {}", path.display());
    }
    Ok(())
}

/// Returns whether the run passed.
pub fn run_validate(args: &ValidateArgs, config: &Config) -> Result<bool> {
    require_files(&args.files)?;
    let report = ValidationOrchestrator::new(&config.policy).validate(&args.files.files())?;

    println!("{}", render_summary(&report));
    save_report(&report, config, args.report_dir.as_deref())?;
    Ok(report.overall_valid)
}

/// Returns whether every supplied file was imported.
pub fn run_import(args: &ImportArgs, config: &Config) -> Result<bool> {
    require_files(&args.files)?;
    let importer = Importer::new(&config.policy);
    let files = args.files.files();

    let summary = if args.dry_run {
        importer.run(&files, &mut MemoryStore::new())?
    } else {
        let dir = config.database_dir()?;
        let mut store = JsonStore::open(dir.clone())
            .with_context(|| format!("Failed to open database at {}", dir.display()))?;
        importer.run(&files, &mut store)?
    };

    println!("{}", render_summary(&summary.report));
    println!("{}", render_import(&summary, args.dry_run));
    save_report(&summary.report, config, args.report_dir.as_deref())?;

    info!(written = summary.total_written(), rejected = summary.rejected.len(), "Import finished");
    Ok(summary.rejected.is_empty() && summary.report.messages.is_empty())
}

pub fn run_show(view: &View, config: &Config) -> Result<()> {
    let json = JsonStore::open_existing(config.database_dir()?)?;
    let store: &dyn RecordStore = &json;

    match view {
        View::Scouts => {
            let scouts = views::active_scouts(store)?;
            println!("{:<28} {:<14} {:<16} {:<12}", "Name", "Rank", "Patrol", "BSA #");
            for s in &scouts {
                println!(
                    "{:<28} {:<14} {:<16} {:<12}",
                    truncate_string(&s.display_name(), 28),
                    s.scout_rank().display_name(),
                    truncate_string(s.patrol_name.as_deref().unwrap_or("-"), 16),
                    s.bsa_number
                );
            }
            println!("\n{} active scouts", scouts.len());
        }
        View::Scout { bsa_number } => {
            if let Some(scout) = store.scouts()?.into_iter().find(|s| &s.bsa_number == bsa_number) {
                println!("{} ({})", scout.full_name(), scout.scout_rank().display_name());
                for position in &scout.positions {
                    println!("   {}", position.display());
                }
                println!();
            }
            let progress = views::scout_progress(store, bsa_number)?;
            if progress.is_empty() {
                println!("No merit badge progress for {}", bsa_number);
                return Ok(());
            }
            println!("{:<30} {:<14} {:<12} {:<24}", "Merit Badge", "Status", "Completed", "Counselor");
            for p in &progress {
                println!(
                    "{:<30} {:<14} {:<12} {:<24}",
                    truncate_string(&p.merit_badge, 30),
                    p.status.map(|s| s.display_name()).unwrap_or("-"),
                    p.date_completed
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    truncate_string(p.counselor.as_deref().unwrap_or("-"), 24)
                );
            }
        }
        View::Badges => {
            println!("{:<34} {:>11} {:>10}", "Merit Badge", "In Progress", "Completed");
            for b in views::badge_summary(store)? {
                println!(
                    "{:<34} {:>11} {:>10}",
                    truncate_string(&b.merit_badge, 34),
                    b.in_progress,
                    b.completed
                );
            }
        }
        View::Unmatched => {
            let unmatched = views::unmatched_progress(store)?;
            for p in &unmatched {
                println!("{:<12} {:<28} {}", p.bsa_number, truncate_string(&p.scout_name(), 28), p.merit_badge);
            }
            println!("\n{} progress rows with no matching scout", unmatched.len());
        }
        View::Leaders => {
            for s in views::leaders(store)? {
                let positions: Vec<String> = s.positions.iter().map(|p| p.display()).collect();
                println!(
                    "{:<28} {}",
                    truncate_string(&s.display_name(), 28),
                    positions.join(", ")
                );
            }
        }
        View::Counselors => {
            for load in views::counselor_workload(store, &config.counselor_mappings)? {
                let linked = match &load.adult {
                    Some(adult) => format!(
                        "{} #{}, {} match",
                        adult.name,
                        adult.bsa_number,
                        adult.kind.display_name()
                    ),
                    None => "not linked to adult roster".to_string(),
                };
                println!("{} ({}) [{}]", load.counselor, load.assignments.len(), linked);
                for (scout, badge) in &load.assignments {
                    println!("   {:<28} {}", truncate_string(scout, 28), badge);
                }
            }
        }
        View::CounselorMatches => {
            for entry in views::counselor_matches(store, &config.counselor_mappings)? {
                println!("{}", entry.counselor);
                if entry.candidates.is_empty() {
                    println!("   no candidates");
                }
                for candidate in &entry.candidates {
                    println!(
                        "   {:<28} #{:<10} {:<12} {:.2}",
                        truncate_string(&candidate.name, 28),
                        candidate.bsa_number,
                        candidate.kind.display_name(),
                        candidate.confidence
                    );
                }
            }
        }
        View::Status => {
            let ages = json.table_ages();
            println!("Database: {}", json.dir().display());
            println!("Roster updated:   {}", ages.roster_age());
            println!(
                "Adults updated:   {}",
                ages.adults.as_deref().unwrap_or("never")
            );
            println!("Progress updated: {}", ages.progress_age());
        }
    }
    Ok(())
}

/// Update the saved config. Environment and flag overrides are not saved
/// unless `--save-database` asks for the `--database` value.
pub fn run_config(args: &ConfigArgs, database: Option<&Path>) -> Result<()> {
    let mut saved = Config::load()?;
    let mut changed = false;
    if let Some(ref unit) = args.unit_name {
        saved.unit_name = Some(unit.clone());
        changed = true;
    }
    for (name, bsa_number) in &args.map_counselor {
        saved.counselor_mappings.insert(name.clone(), bsa_number.clone());
        changed = true;
    }
    if args.save_database {
        let Some(dir) = database else {
            bail!("--save-database needs --database DIR");
        };
        saved.database_path = Some(dir.to_path_buf());
        changed = true;
    }
    if changed {
        saved.save()?;
        println!("Saved {}", Config::config_path()?.display());
    }

    println!("Config file: {}", Config::config_path()?.display());
    println!("Database:    {}", saved.database_dir()?.display());
    println!("Unit:        {}", saved.unit_name.as_deref().unwrap_or("-"));
    for (name, bsa_number) in &saved.counselor_mappings {
        println!("Counselor:   {} -> #{}", name, bsa_number);
    }
    println!("Validation policy: {:#?}", saved.policy);
    Ok(())
}
