//! Budget sweep over a TSV response file.
//!
//! Sweeps the `[experiment]` budget range unless a single budget is set
//! through `--budget`, `OPTKG_ALLOCATION_BUDGET` or `[allocation] budget`.
//! Prints one JSON object per budget on stdout.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use optkg_allocation::{budget_sweep, AllocationSettings, Registry, SurvivalCache};
use optkg_core::config::{BudgetPolicy, CliOverrides, DegeneratePolicy, OptKgConfig};
use optkg_core::errors::OptKgErrorCode;

#[derive(Parser, Debug)]
#[command(
    name = "optkg-experiment",
    about = "Opt-KG budget sweep over a crowd response file",
    version
)]
struct Args {
    /// Tab-separated response file with a header row
    dataset: PathBuf,

    /// Run a single budget instead of the configured sweep
    #[arg(long)]
    budget: Option<u64>,

    /// What to do when the budget exceeds the labelable pairs (reject, truncate)
    #[arg(long)]
    budget_policy: Option<BudgetPolicy>,

    /// What to do with candidates whose moments degenerate (skip, abort)
    #[arg(long)]
    degenerate_policy: Option<DegeneratePolicy>,

    /// Survival cache file, loaded before and saved after the sweep
    #[arg(long)]
    cache: Option<String>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            budget: self.budget,
            budget_policy: self.budget_policy,
            degenerate_policy: self.degenerate_policy,
            cache_path: self.cache.clone(),
        }
    }
}

fn run(args: &Args, root: &Path) -> Result<(), String> {
    let config = OptKgConfig::load(root, Some(&args.overrides())).map_err(|e| e.coded_string())?;
    let settings = AllocationSettings::from_config(&config);

    let registry = Registry::from_tsv_path(&args.dataset).map_err(|e| e.coded_string())?;
    let cache_path = config.cache.path.as_deref().map(Path::new);
    let cache = match cache_path {
        Some(path) => SurvivalCache::load(path, config.cache.max_entries),
        None => Ok(SurvivalCache::with_optional_capacity(config.cache.max_entries)),
    }
    .map_err(|e| e.coded_string())?;

    let budgets = match config.allocation.budget {
        Some(_) => vec![config.allocation.effective_budget()],
        None => config.experiment.budgets(),
    };
    let points =
        budget_sweep(&registry, &cache, settings, &budgets).map_err(|e| e.coded_string())?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for point in &points {
        tracing::info!(
            budget = point.budget,
            accuracy = point.accuracy,
            positive = point.positive,
            negative = point.negative,
            truncated = point.truncated,
            "sweep point"
        );
        let line = serde_json::to_string(point).map_err(|e| e.to_string())?;
        writeln!(out, "{line}").map_err(|e| e.to_string())?;
    }

    if let Some(path) = cache_path {
        cache.save(path).map_err(|e| e.coded_string())?;
    }
    Ok(())
}

fn main() -> ExitCode {
    optkg_core::tracing::init_tracing();
    let args = Args::parse();

    let result = std::env::current_dir()
        .map_err(|e| e.to_string())
        .and_then(|root| run(&args, &root));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            tracing::error!(error = %message, "experiment failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_flags_map_onto_overrides() {
        let args = Args::try_parse_from([
            "optkg-experiment",
            "data.tsv",
            "--budget",
            "200",
            "--budget-policy",
            "truncate",
            "--degenerate-policy",
            "abort",
            "--cache",
            "survival.json",
        ])
        .unwrap();
        assert_eq!(args.dataset, PathBuf::from("data.tsv"));

        let overrides = args.overrides();
        assert_eq!(overrides.budget, Some(200));
        assert_eq!(overrides.budget_policy, Some(BudgetPolicy::Truncate));
        assert_eq!(overrides.degenerate_policy, Some(DegeneratePolicy::Abort));
        assert_eq!(overrides.cache_path.as_deref(), Some("survival.json"));
    }

    #[test]
    fn test_omitted_flags_leave_config_alone() {
        let overrides = Args::try_parse_from(["optkg-experiment", "data.tsv"])
            .unwrap()
            .overrides();
        assert!(overrides.budget.is_none());
        assert!(overrides.budget_policy.is_none());
        assert!(overrides.degenerate_policy.is_none());
        assert!(overrides.cache_path.is_none());
    }

    #[test]
    fn test_bad_arguments_rejected() {
        assert!(Args::try_parse_from(["optkg-experiment"]).is_err());
        assert!(
            Args::try_parse_from(["optkg-experiment", "d.tsv", "--budget-policy", "maybe"])
                .is_err()
        );
        assert!(Args::try_parse_from(["optkg-experiment", "d.tsv", "--budget", "-3"]).is_err());
    }

    #[test]
    fn test_missing_dataset_reports_error_code() {
        let dir = TempDir::new().unwrap();
        let args = Args::try_parse_from([
            "optkg-experiment",
            dir.path().join("absent.tsv").to_str().unwrap(),
        ])
        .unwrap();
        let message = run(&args, dir.path()).unwrap_err();
        assert!(message.starts_with("[DATASET_ERROR]"), "got {message}");
        assert!(message.contains("absent.tsv"));
    }
}
