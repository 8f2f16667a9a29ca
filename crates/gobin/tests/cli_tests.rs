//! Integration tests for the gobin binary

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo_bin;
use predicates::prelude::*;
use std::path::Path;
use std::process::Command;
use gobin_testkit::{temp_dir_in_workspace, with_isolated_gobin_env};

/// Writes a config file pointing `go`/`git` at fakes in `bin_dir`
fn write_config(dir: &Path, bin_dir: &Path) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    let content = format!(
        "go = \"{}\"\ngit = \"{}\"\nasdf = \"gobin-test-no-such-asdf\"\n",
        bin_dir.join("go").display(),
        bin_dir.join("git").display()
    );
    std::fs::write(&path, content).expect("Failed to write config");
    path
}

fn gobin() -> Command {
    let mut cmd = Command::new(cargo_bin!(env!("CARGO_PKG_NAME")));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_version_flag() {
    with_isolated_gobin_env(|_cache| {
        // Act
        let assert = gobin().arg("--version").assert();

        // Assert
        assert.success().stdout(predicate::str::contains("gobin"));
    });
}

#[test]
fn test_cli_help_flag() {
    with_isolated_gobin_env(|_cache| {
        // Act
        let assert = gobin().arg("--help").assert();

        // Assert: every documented flag is listed
        assert
            .success()
            .stdout(predicate::str::contains("Usage:"))
            .stdout(predicate::str::contains("--print-path"))
            .stdout(predicate::str::contains("--build-dir"))
            .stdout(predicate::str::contains("--build-path"))
            .stdout(predicate::str::contains("--cache-dir"));
    });
}

#[test]
fn test_cli_requires_reference() {
    with_isolated_gobin_env(|_cache| {
        gobin().assert().failure().code(2);
    });
}

#[test]
fn test_cli_missing_version_fails() {
    with_isolated_gobin_env(|_cache| {
        // Act: reference without @version
        let assert = gobin().arg("github.com/org/tool").assert();

        // Assert: rejected before any work, nothing on stdout
        assert
            .failure()
            .code(1)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("Error: INVALID_REFERENCE"))
            .stderr(predicate::str::contains("github.com/org/tool@vX.X.X"));
    });
}

#[test]
fn test_cli_invalid_config_fails() {
    with_isolated_gobin_env(|_cache| {
        // Arrange
        let temp = temp_dir_in_workspace();
        let config = temp.path().join("config.toml");
        std::fs::write(&config, "fetch_strategy = \"sometimes\"\n").unwrap();

        // Act
        let assert = gobin()
            .env("GOBIN_CONFIG", &config)
            .arg("github.com/org/tool@v1.0.0")
            .assert();

        // Assert
        assert
            .failure()
            .code(1)
            .stderr(predicate::str::contains("CONFIG_PARSE_ERROR"));
    });
}

#[test]
fn test_cli_reference_checked_before_config() {
    with_isolated_gobin_env(|_cache| {
        // Arrange: a broken config that would fail to load
        let temp = temp_dir_in_workspace();
        let config = temp.path().join("config.toml");
        std::fs::write(&config, "fetch_strategy = \"sometimes\"\n").unwrap();

        // Act
        let assert = gobin()
            .env("GOBIN_CONFIG", &config)
            .arg("github.com/org/tool")
            .assert();

        // Assert
        assert
            .failure()
            .code(1)
            .stderr(predicate::str::contains("INVALID_REFERENCE"))
            .stderr(predicate::str::contains("CONFIG_PARSE_ERROR").not());
    });
}

#[cfg(unix)]
mod with_fake_toolchain {
    use super::*;
    use gobin_testkit::{install_fake_git, install_fake_go, invocation_count, isolated_path};

    #[test]
    fn test_cli_print_path() {
        with_isolated_gobin_env(|cache| {
            // Arrange
            let temp = temp_dir_in_workspace();
            let bin = temp.path().join("bin");
            install_fake_go(&bin, "1.21.0", true);
            install_fake_git(&bin);
            let config = write_config(temp.path(), &bin);

            // Act
            let assert = gobin()
                .env("GOBIN_CONFIG", &config)
                .env("GOBIN_CACHE_DIR", cache)
                .env("PATH", isolated_path(&bin))
                .env("TMPDIR", temp.path())
                .args(["-p", "github.com/org/tool@v1.0.0"])
                .assert();

            // Assert: stdout is exactly the path plus newline
            let expected = cache.join("binaries/1.21.0/github.com/org/tool/@v/v1.0.0/tool");
            assert
                .success()
                .stdout(format!("{}\n", expected.display()));
            assert!(expected.is_file());
        });
    }

    #[test]
    fn test_cli_without_print_path_is_silent_on_stdout() {
        with_isolated_gobin_env(|cache| {
            // Arrange
            let temp = temp_dir_in_workspace();
            let bin = temp.path().join("bin");
            install_fake_go(&bin, "1.21.0", true);
            install_fake_git(&bin);
            let config = write_config(temp.path(), &bin);

            // Act: built twice, the second run is a cache hit
            for _ in 0..2 {
                gobin()
                    .env("GOBIN_CONFIG", &config)
                    .env("PATH", isolated_path(&bin))
                    .env("TMPDIR", temp.path())
                    .args(["--cache-dir", &cache.display().to_string()])
                    .arg("github.com/org/tool/v2/cmd/tool@v2.0.0")
                    .assert()
                    .success()
                    .stdout(predicate::str::is_empty());
            }

            // Assert
            assert!(
                cache
                    .join("binaries/1.21.0/github.com/org/tool/@v/v2.0.0/cmd/tool/tool")
                    .is_file()
            );
            assert_eq!(invocation_count(&bin, "git"), 2);
        });
    }

    #[test]
    fn test_cli_build_failure_exit_code() {
        with_isolated_gobin_env(|cache| {
            // Arrange
            let temp = temp_dir_in_workspace();
            let bin = temp.path().join("bin");
            install_fake_go(&bin, "1.21.0", false);
            install_fake_git(&bin);
            let config = write_config(temp.path(), &bin);

            // Act
            let assert = gobin()
                .env("GOBIN_CONFIG", &config)
                .env("GOBIN_CACHE_DIR", cache)
                .env("PATH", isolated_path(&bin))
                .env("TMPDIR", temp.path())
                .arg("github.com/org/tool@v1.0.0")
                .assert();

            // Assert: compiler output is surfaced, workspace location logged
            assert
                .failure()
                .code(1)
                .stdout(predicate::str::is_empty())
                .stderr(predicate::str::contains("BUILD_FAILED"))
                .stderr(predicate::function(|err: &str| {
                    err.matches("syntax error").count() == 1
                }))
                .stderr(predicate::str::contains("workspace kept at"));
        });
    }

    #[test]
    fn test_cli_run_flag_warns() {
        with_isolated_gobin_env(|cache| {
            // Arrange
            let temp = temp_dir_in_workspace();
            let bin = temp.path().join("bin");
            install_fake_go(&bin, "1.21.0", true);
            install_fake_git(&bin);
            let config = write_config(temp.path(), &bin);

            // Act
            let assert = gobin()
                .env("GOBIN_CONFIG", &config)
                .env("GOBIN_CACHE_DIR", cache)
                .env("PATH", isolated_path(&bin))
                .env("TMPDIR", temp.path())
                .args(["--run", "github.com/org/tool@v1.0.0"])
                .assert();

            // Assert
            assert
                .success()
                .stderr(predicate::str::contains("--run is not supported"));
        });
    }
}
