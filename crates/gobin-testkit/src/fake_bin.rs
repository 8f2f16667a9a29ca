//! Fake toolchain executables
//!
//! Each fake appends `<cwd> <args>` to `<bin_dir>/<name>.log`, so a test can
//! count how often the pipeline reached for it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Writes `script` to `<dir>/<name>` and marks it executable
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_fake_executable(dir: &Path, name: &str, script: &str) -> PathBuf {
    std::fs::create_dir_all(dir).expect("Failed to create fake bin dir");
    let path = dir.join(name);
    std::fs::write(&path, script).expect("Failed to write fake executable");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
    }

    path
}

/// Fake `go` reporting `version`; `build -o <out>` writes a stub binary or
/// fails with a compiler-style message when `build_succeeds` is false
pub fn install_fake_go(bin_dir: &Path, version: &str, build_succeeds: bool) -> PathBuf {
    let build = if build_succeeds {
        r#"out="$3"
    mkdir -p "$(dirname "$out")"
    printf '#!/bin/sh\necho built\n' > "$out"
    chmod +x "$out""#
    } else {
        r#"echo "./main.go:3:1: syntax error: non-declaration statement outside function body" >&2
    exit 1"#
    };

    let script = format!(
        r#"#!/bin/sh
echo "$PWD $*" >> '{log}'
case "$1" in
  version)
    echo "go version go{version} linux/amd64"
    ;;
  build)
    {build}
    ;;
  *)
    echo "unexpected go command: $*" >&2
    exit 2
    ;;
esac
"#,
        log = bin_dir.join("go.log").display(),
    );

    write_fake_executable(bin_dir, "go", &script)
}

/// Fake `git` whose `clone -- <repo> <dir>` creates `<dir>/go.mod` and whose
/// `-c ... checkout <rev>` succeeds
pub fn install_fake_git(bin_dir: &Path) -> PathBuf {
    let script = format!(
        r#"#!/bin/sh
echo "$PWD $*" >> '{log}'
case "$1" in
  clone)
    mkdir -p "$4" && printf 'module example\n' > "$4/go.mod"
    ;;
  -c)
    exit 0
    ;;
  *)
    echo "unexpected git command: $*" >&2
    exit 2
    ;;
esac
"#,
        log = bin_dir.join("git.log").display(),
    );

    write_fake_executable(bin_dir, "git", &script)
}

/// Fake `asdf` whose `current` prints `current_output` verbatim
pub fn install_fake_asdf(bin_dir: &Path, current_output: &str) -> PathBuf {
    let script = format!(
        r#"#!/bin/sh
echo "$PWD $*" >> '{log}'
cat <<'GOBIN_EOF'
{current_output}
GOBIN_EOF
"#,
        log = bin_dir.join("asdf.log").display(),
    );

    write_fake_executable(bin_dir, "asdf", &script)
}

/// PATH containing `bin_dir` followed only by the system directories the
/// fake scripts need
pub fn isolated_path(bin_dir: &Path) -> OsString {
    let dirs = [bin_dir.to_path_buf(), PathBuf::from("/usr/bin"), PathBuf::from("/bin")];
    std::env::join_paths(dirs).expect("Failed to join PATH")
}

/// Number of invocations recorded in `<bin_dir>/<name>.log`
pub fn invocation_count(bin_dir: &Path, name: &str) -> usize {
    std::fs::read_to_string(bin_dir.join(format!("{name}.log")))
        .map(|log| log.lines().count())
        .unwrap_or(0)
}
