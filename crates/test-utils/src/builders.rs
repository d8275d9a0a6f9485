#![allow(dead_code)]

use watchmatrix::config::{ConfigFile, RawConfigFile};
use watchmatrix::matrix::Flavor;

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from an empty matrix (no build, no variants, no flavors) rather
/// than the built-in Lua defaults.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    /// Start from the built-in defaults.
    pub fn builtin() -> Self {
        Self {
            config: RawConfigFile::builtin(),
        }
    }

    pub fn with_template(mut self, template: &str) -> Self {
        self.config.test.cmd = template.to_string();
        self
    }

    pub fn with_variant(mut self, variant: &str) -> Self {
        self.config.test.variants.push(variant.to_string());
        self
    }

    pub fn with_flavor(mut self, label: &str, suffix: &str) -> Self {
        self.config.flavor.push(Flavor::new(label, suffix));
        self
    }

    pub fn with_build(mut self, cmd: &str) -> Self {
        self.config.build.cmd = Some(cmd.to_string());
        self
    }

    pub fn with_debounce(mut self, debounce: &str) -> Self {
        self.config.config.debounce = debounce.to_string();
        self
    }

    pub fn with_max_workers(mut self, n: usize) -> Self {
        self.config.config.max_workers = Some(n);
        self
    }

    pub fn with_task_timeout(mut self, timeout: &str) -> Self {
        self.config.config.task_timeout = Some(timeout.to_string());
        self
    }

    pub fn with_exclude(mut self, dir: &str) -> Self {
        self.config.watch.exclude.push(dir.to_string());
        self
    }

    pub fn with_ignore(mut self, glob: &str) -> Self {
        self.config.watch.ignore.push(glob.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
