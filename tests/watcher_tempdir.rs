// tests/watcher_tempdir.rs

use std::error::Error;
use std::fs;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

use watchmatrix::config::WatchSection;
use watchmatrix::engine::RuntimeEvent;
use watchmatrix::watch::{canonical_root, spawn_watcher, ChangeFilter};
use watchmatrix_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn modifications_outside_excluded_dirs_reach_the_runtime() -> TestResult {
    with_timeout(async {
        init_tracing();

        let dir = tempfile::tempdir()?;
        let root = canonical_root(dir.path())?;
        fs::create_dir(root.join(".git"))?;
        fs::create_dir(root.join("src"))?;
        fs::write(root.join(".git/HEAD"), "ref: main\n")?;
        fs::write(root.join("src/main.lua"), "print(1)\n")?;
        fs::write(root.join("src/main.lua.swp"), "")?;

        let section = WatchSection {
            ignore: vec!["**/*.swp".to_string()],
            ..WatchSection::default()
        };
        let filter = ChangeFilter::from_section(root.clone(), &section)?;
        let (tx, mut rx) = mpsc::channel(64);
        let handle = spawn_watcher(filter, tx)?;

        // Give the backend a moment to attach.
        sleep(Duration::from_millis(200)).await;

        fs::write(root.join(".git/HEAD"), "ref: other\n")?;
        fs::write(root.join("src/main.lua.swp"), "swap")?;
        sleep(Duration::from_millis(200)).await;
        fs::write(root.join("src/main.lua"), "print(2)\n")?;

        let event = timeout(Duration::from_secs(3), rx.recv())
            .await?
            .ok_or("runtime channel closed")?;

        match event {
            RuntimeEvent::FileChanged(change) => {
                assert_eq!(change.path, root.join("src/main.lua"));
                assert!(!change.is_dir);
            }
            other => panic!("expected FileChanged, got {other:?}"),
        }

        handle.stop();
        Ok(())
    })
    .await
}
