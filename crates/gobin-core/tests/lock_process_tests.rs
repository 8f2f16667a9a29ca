//! Process-level locking tests
//!
//! Concurrent gobin invocations for the same cache entry are separate
//! processes, so thread-level tests alone do not cover them.

use std::fs;
use std::process::Command;
use tempfile::TempDir;
use gobin_testkit::example_bin;

#[test]
fn test_concurrent_processes_build_once() {
    let temp = TempDir::new().unwrap();
    let entry = temp.path().join("binaries/1.21.0/example.org/org/tool/@v/v1.2.3");
    fs::create_dir_all(&entry).unwrap();
    let binary_path = entry.join("tool");
    let marker_path = temp.path().join("marker.txt");

    const NUM_PROCESSES: usize = 3;

    let mut handles = vec![];
    for id in 0..NUM_PROCESSES {
        let binary_path = binary_path.clone();
        let marker_path = marker_path.clone();
        let handle = std::thread::spawn(move || {
            let status = Command::new(example_bin("build_lock_holder"))
                .arg(&binary_path)
                .arg(&marker_path)
                .arg(id.to_string())
                .status()
                .expect("Failed to execute build_lock_holder");

            assert!(status.success(), "build_lock_holder should exit successfully");
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let content = fs::read_to_string(&marker_path).unwrap();
    let built = content.lines().filter(|l| l.starts_with("built ")).count();
    let reused = content.lines().filter(|l| l.starts_with("reused ")).count();
    assert_eq!(built, 1, "exactly one process should build:\n{content}");
    assert_eq!(reused, NUM_PROCESSES - 1, "{content}");
    assert_eq!(fs::read_to_string(&binary_path).unwrap(), "built");
}
