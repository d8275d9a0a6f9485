// tests/error_handling.rs

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;
use watchmatrix::config::{load_and_validate, resolve_config};
use watchmatrix::errors::WatchmatrixError;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_config_file_loads() {
    let file = config_file(
        r#"
[config]
debounce = "250ms"
max_workers = 3
task_timeout = "2m"
clear_screen = false

[watch]
exclude = [".git", "target"]
ignore = ["**/*.swp"]

[build]
cmd = "make"

[test]
cmd = "busted --lua=lua{variant}{suffix}"
variants = ["5.1", "5.4"]

[[flavor]]
label = "Dev"

[[flavor]]
label = "Dist"
suffix = " --dist"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    let settings = cfg.settings();

    assert_eq!(settings.debounce, Duration::from_millis(250));
    assert_eq!(settings.max_workers, Some(3));
    assert_eq!(settings.task_timeout, Some(Duration::from_secs(120)));
    assert!(!settings.clear_screen);
    assert!(!settings.run_on_start);
    assert_eq!(cfg.build_cmd(), Some("make"));
    assert_eq!(cfg.watch_section().exclude, vec![".git", "target"]);
    assert_eq!(cfg.matrix().task_count(), 6);
    assert_eq!(cfg.matrix().flavors[0].suffix, "");
}

#[test]
fn empty_file_is_a_valid_sparse_config() {
    let file = config_file("");

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.settings().debounce, Duration::from_secs(1));
    assert_eq!(cfg.settings().max_workers, None);
    assert_eq!(cfg.build_cmd(), None);
    assert_eq!(cfg.matrix().task_count(), 0);
    assert_eq!(cfg.watch_section().exclude, vec![".git"]);
}

#[test]
fn syntax_error_returns_toml_error() {
    let file = config_file("[config\ndebounce = ");

    match load_and_validate(file.path()) {
        Err(WatchmatrixError::TomlError(_)) => {}
        Err(e) => panic!("Expected TomlError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn zero_workers_returns_config_error() {
    let file = config_file("[config]\nmax_workers = 0\n");

    match load_and_validate(file.path()) {
        Err(WatchmatrixError::ConfigError(msg)) => assert!(msg.contains("max_workers")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn bad_duration_returns_config_error() {
    let file = config_file("[config]\ndebounce = \"soon\"\n");

    match load_and_validate(file.path()) {
        Err(WatchmatrixError::ConfigError(msg)) => assert!(msg.contains("debounce")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn unknown_placeholder_returns_config_error() {
    let file = config_file("[test]\ncmd = \"lua{version} test.lua\"\nvariants = [\"54\"]\n");

    match load_and_validate(file.path()) {
        Err(WatchmatrixError::ConfigError(msg)) => assert!(msg.contains("{version}")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn duplicate_flavor_returns_config_error() {
    let file = config_file("[[flavor]]\nlabel = \"Dev\"\n[[flavor]]\nlabel = \"Dev\"\n");

    match load_and_validate(file.path()) {
        Err(WatchmatrixError::ConfigError(msg)) => assert!(msg.contains("Dev")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn invalid_ignore_glob_returns_config_error() {
    let file = config_file("[watch]\nignore = [\"src/[\"]\n");

    match load_and_validate(file.path()) {
        Err(WatchmatrixError::ConfigError(msg)) => assert!(msg.contains("ignore")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn missing_explicit_config_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    match resolve_config(Some(&missing)) {
        Err(WatchmatrixError::IoError(_)) => {}
        Err(e) => panic!("Expected IoError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn explicit_config_path_is_reported_back() {
    let file = config_file("[build]\ncmd = \"make\"\n");

    let (cfg, path) = resolve_config(Some(file.path())).unwrap();

    assert_eq!(path.as_deref(), Some(file.path()));
    assert_eq!(cfg.build_cmd(), Some("make"));
}

#[test]
fn demo_config_matches_builtin_matrix() {
    let manifest = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let cfg = load_and_validate(manifest.join("demos/Watchmatrix.toml")).unwrap();

    assert_eq!(cfg.build_cmd(), Some("mdok lua54 build.lua"));
    assert_eq!(cfg.matrix().task_count(), 8);
    assert!(cfg.settings().run_on_start);
}
