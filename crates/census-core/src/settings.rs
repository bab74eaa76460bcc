use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::dates::parse_input_date;
use crate::models::{default_categories, split_combined, RangeInput, RangeVariant};

/// Public character dataset fetched when neither `--url` nor `--input` is given.
pub const DEFAULT_DATASET_URL: &str = "https://hp-api.onrender.com/api/characters";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Chart Hogwarts students per house, filtered by date of birth
#[derive(Parser, Debug, Clone)]
#[command(
    name = "house-census",
    about = "Chart Hogwarts students per house, filtered by date of birth",
    version
)]
pub struct Settings {
    /// View mode
    #[arg(long, default_value = "interactive", value_parser = ["interactive", "report"])]
    pub view: String,

    /// Date-range input shape
    #[arg(long, default_value = "separate", value_parser = ["separate", "combined"])]
    pub variant: String,

    /// Earliest birth date to count (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Latest birth date to count (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Birth-date range as START..END (either side may be empty)
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub range: Option<String>,

    /// Category to chart; repeat for several (defaults to the four houses)
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Dataset URL
    #[arg(long, default_value = DEFAULT_DATASET_URL)]
    pub url: String,

    /// Read the dataset from a local JSON file instead of the URL
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// HTTP request timeout in seconds (1-300)
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..=300))]
    pub timeout_secs: u64,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.house-census/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    /// Uses `~/.house-census/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".house-census").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation; accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        // A --range is folded into --from/--to so that only one form is kept.
        if let Some(range) = settings.range.take() {
            let (start, end) = split_combined(&range);
            settings.from = non_empty(start);
            settings.to = non_empty(end);
        }

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "variant") {
            if let Some(v) = last.variant {
                settings.variant = v;
            }
        }
        // Bounds are restored together so a single explicit bound never pairs
        // with a stale one from an earlier run.
        let bounds_given = is_arg_explicitly_set(&matches, "from")
            || is_arg_explicitly_set(&matches, "to")
            || is_arg_explicitly_set(&matches, "range");
        if !bounds_given {
            settings.from = last.from.filter(|v| is_valid_bound(v));
            settings.to = last.to.filter(|v| is_valid_bound(v));
        }

        settings = Self::apply_debug(settings);

        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// Requested widget shape.
    pub fn range_variant(&self) -> RangeVariant {
        RangeVariant::from_name(&self.variant)
    }

    /// Initial widget contents built from `--from` / `--to`.
    pub fn range_input(&self) -> RangeInput {
        RangeInput::Separate {
            start: self.from.clone().unwrap_or_default(),
            end: self.to.clone().unwrap_or_default(),
        }
        .into_variant(self.range_variant())
    }

    /// Category labels to chart, falling back to the four houses.
    pub fn category_set(&self) -> Vec<String> {
        if self.categories.is_empty() {
            default_categories()
        } else {
            self.categories.clone()
        }
    }

    /// `--debug` overrides log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            theme: Some(s.theme.clone()),
            variant: Some(s.variant.clone()),
            // A bound that does not parse would fail every later run.
            from: s.from.clone().filter(|v| is_valid_bound(v)),
            to: s.to.clone().filter(|v| is_valid_bound(v)),
        }
    }
}

// ── Helpers ────────────────────────────────────────────────────────────────────

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

fn is_valid_bound(value: &str) -> bool {
    parse_input_date(value).is_ok()
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
