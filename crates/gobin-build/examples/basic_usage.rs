//! Basic usage example for gobin-build
//!
//! Resolves a tool reference, builds it if the cache has no binary for the
//! local go toolchain yet, and prints the binary's location.
//!
//! Run with: cargo run --example basic_usage -- github.com/org/tool@v1.2.3

use gobin_build::Runner;
use gobin_build::reference::parse_reference;
use gobin_core::GobinConfig;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> gobin_core::Result<()> {
    let reference = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "golang.org/x/tools/cmd/stringer@v0.24.0".to_string());

    // Step 1: Validate the reference without touching the network
    let (import_path, version) = parse_reference(&reference)?;
    println!("Import path: {import_path}");
    println!("Version:     {version}");

    // Step 2: Build (or reuse) the binary
    let config = GobinConfig::load(None)?;
    println!("Cache root:  {}", config.cache_root.display());

    let runner = Runner::from_config(config)?;
    match runner
        .ensure(&CancellationToken::new(), &reference, "", "")
        .await
    {
        Ok(binary) => println!("✓ Binary: {}", binary.display()),
        Err(e) => println!("✗ {e}"),
    }

    Ok(())
}
