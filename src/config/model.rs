// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::matrix::{Flavor, MatrixConfig};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// debounce = "1s"
///
/// [watch]
/// exclude = [".git"]
///
/// [build]
/// cmd = "mdok lua54 build.lua"
///
/// [test]
/// cmd = "mdok lua{variant} test/test.lua{suffix}"
/// variants = ["jit", "51", "54"]
///
/// [[flavor]]
/// label = "Dev"
///
/// [[flavor]]
/// label = "Dist"
/// suffix = " dist"
/// ```
///
/// All sections are optional. A missing section yields an empty (but valid)
/// value; the matrix simply gets smaller.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// Loop behaviour from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// Watch root and filters from `[watch]`.
    #[serde(default)]
    pub watch: WatchSection,

    /// Optional build step from `[build]`.
    #[serde(default)]
    pub build: BuildSection,

    /// Test template and runtime variants from `[test]`.
    #[serde(default)]
    pub test: TestSection,

    /// Flavors from `[[flavor]]`, in declaration order.
    #[serde(default)]
    pub flavor: Vec<Flavor>,
}

impl RawConfigFile {
    /// The configuration used when no config file exists: one Lua build
    /// followed by the Dev/Dist × jit/5.1/5.4 test matrix.
    pub fn builtin() -> Self {
        Self {
            config: ConfigSection::default(),
            watch: WatchSection::default(),
            build: BuildSection {
                cmd: Some("mdok lua54 build.lua".to_string()),
            },
            test: TestSection {
                cmd: "mdok lua{variant} test/test.lua{suffix}".to_string(),
                variants: vec!["jit".to_string(), "51".to_string(), "54".to_string()],
            },
            flavor: vec![Flavor::new("Dev", ""), Flavor::new("Dist", " dist")],
        }
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Minimum time between two accepted cycle starts (e.g. `"1s"`).
    #[serde(default = "default_debounce")]
    pub debounce: String,

    /// Upper bound on concurrently running test processes.
    ///
    /// `None` means one worker per task with no fixed bound.
    #[serde(default)]
    pub max_workers: Option<usize>,

    /// Optional per-task timeout (e.g. `"5m"`). `None` waits forever.
    #[serde(default)]
    pub task_timeout: Option<String>,

    /// Clear the console before each report.
    #[serde(default = "default_clear_screen")]
    pub clear_screen: bool,

    /// Run one cycle at startup, before any file changes.
    #[serde(default)]
    pub run_on_start: bool,
}

fn default_debounce() -> String {
    "1s".to_string()
}

fn default_clear_screen() -> bool {
    true
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            debounce: default_debounce(),
            max_workers: None,
            task_timeout: None,
            clear_screen: default_clear_screen(),
            run_on_start: false,
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Directory to watch. Relative paths are resolved against the config
    /// file's directory; `None` means that directory itself.
    #[serde(default)]
    pub root: Option<String>,

    /// Subtrees (relative to the root) whose changes never trigger a cycle.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Glob patterns (relative to the root) for files that never trigger a
    /// cycle, e.g. editor swap files.
    #[serde(default)]
    pub ignore: Vec<String>,
}

fn default_exclude() -> Vec<String> {
    vec![".git".to_string()]
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            root: None,
            exclude: default_exclude(),
            ignore: Vec::new(),
        }
    }
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BuildSection {
    /// Command run once per cycle before the test matrix. Its output goes
    /// straight to the console.
    #[serde(default)]
    pub cmd: Option<String>,
}

/// `[test]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TestSection {
    /// Test command template; `{variant}` and `{suffix}` are substituted.
    #[serde(default)]
    pub cmd: String,

    /// Runtime variant labels, in run/report order.
    #[serde(default)]
    pub variants: Vec<String>,
}

/// Loop settings resolved from `[config]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub debounce: Duration,
    pub max_workers: Option<usize>,
    pub task_timeout: Option<Duration>,
    pub clear_screen: bool,
    pub run_on_start: bool,
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see `validate.rs`),
/// so every duration has been parsed and every template checked.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    settings: Settings,
    watch: WatchSection,
    build: BuildSection,
    matrix: MatrixConfig,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        settings: Settings,
        watch: WatchSection,
        build: BuildSection,
        matrix: MatrixConfig,
    ) -> Self {
        Self {
            settings,
            watch,
            build,
            matrix,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn watch_section(&self) -> &WatchSection {
        &self.watch
    }

    /// The build command, if one is configured and non-blank.
    pub fn build_cmd(&self) -> Option<&str> {
        self.build
            .cmd
            .as_deref()
            .filter(|cmd| !cmd.trim().is_empty())
    }

    pub fn matrix(&self) -> &MatrixConfig {
        &self.matrix
    }
}
