//! Helper binary emulating one gobin invocation racing for a cache entry
//!
//! Usage: build_lock_holder <binary_path> <marker_path> <process_id>
//!
//! Takes the cache-entry lock, re-checks whether the binary exists, "builds"
//! it if not, and records what it did in the marker file. Several of these
//! started together must build exactly once.

use std::env;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use gobin_core::lock::acquire_lock;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        eprintln!("Usage: build_lock_holder <binary_path> <marker_path> <process_id>");
        std::process::exit(1);
    }

    let binary_path = PathBuf::from(&args[1]);
    let marker_path = PathBuf::from(&args[2]);
    let process_id = &args[3];
    let lock_path = binary_path.with_file_name(".tool.lock");

    let _guard = acquire_lock(
        &lock_path,
        Duration::from_secs(30),
        &format!("process {}", process_id),
    )
    .expect("Failed to acquire lock");

    let action = if binary_path.exists() {
        "reused"
    } else {
        // Slow enough that the other processes queue on the lock
        std::thread::sleep(Duration::from_millis(200));
        fs::write(&binary_path, "built").expect("Failed to write binary");
        "built"
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(marker_path)
        .expect("Failed to open marker file");
    writeln!(file, "{} process_{}", action, process_id).expect("Failed to write marker");
}
