//! Import path → repository root resolution
//!
//! Well-known hosts and explicit `.git` suffixes are resolved statically.
//! Everything else is discovered from the `go-import` meta tag served at
//! `https://<import path>?go-get=1`.

pub mod client;
pub mod meta;

use std::future::Future;

use gobin_core::{GobinError, Result};
use url::Url;

/// Repository root of an import path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRoot {
    /// Module root import path, a prefix of the requested import path
    pub root: String,
    /// Fetchable repository URL
    pub repo: String,
    /// Version control system, always `git` today
    pub vcs: String,
}

/// Maps an import path to its repository root
pub trait RepoResolver: Sync {
    fn resolve_root(&self, import_path: &str) -> impl Future<Output = Result<RepoRoot>> + Send;
}

/// Hosts whose repositories always live at `<host>/<owner>/<repo>`
const STATIC_HOSTS: &[&str] = &["github.com", "bitbucket.org"];

const SUPPORTED_VCS: &str = "git";

/// Default [`RepoResolver`]: static host rules, then meta-tag discovery
#[derive(Debug, Clone)]
pub struct VcsResolver {
    client: reqwest::Client,
    scheme: String,
}

impl VcsResolver {
    pub fn new() -> Result<Self> {
        let client = client::build_default_client()
            .map_err(|e| GobinError::Generic(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            scheme: "https".to_string(),
        })
    }

    /// Scheme used for meta-tag discovery requests
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    async fn discover(&self, import_path: &str) -> Result<RepoRoot> {
        let failed = |reason: String| GobinError::ResolutionFailed {
            import_path: import_path.to_string(),
            reason,
        };

        let mut url = Url::parse(&format!("{}://{}", self.scheme, import_path))
            .map_err(|e| failed(format!("invalid discovery URL: {e}")))?;
        url.query_pairs_mut().append_pair("go-get", "1");

        tracing::debug!(%url, "fetching go-import meta tags");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| failed(format!("GET {url}: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| failed(format!("reading {url}: {e}")))?;

        let imports = meta::parse_meta_go_imports(&body);
        let matches = meta::matching(&imports, import_path);
        let found = match matches.as_slice() {
            [] if !status.is_success() => {
                return Err(failed(format!("GET {url}: {status}")));
            }
            [] => return Err(failed(format!("no go-import meta tags found at {url}"))),
            [one] => *one,
            _ => {
                return Err(failed(format!(
                    "multiple go-import meta tags match at {url}"
                )));
            }
        };

        if found.vcs != SUPPORTED_VCS {
            return Err(failed(format!(
                "unsupported version control system '{}'",
                found.vcs
            )));
        }

        Ok(RepoRoot {
            root: found.prefix.clone(),
            repo: found.repo.clone(),
            vcs: found.vcs.clone(),
        })
    }
}

impl RepoResolver for VcsResolver {
    async fn resolve_root(&self, import_path: &str) -> Result<RepoRoot> {
        validate_import_path(import_path)?;

        if let Some(root) = static_root(import_path)? {
            return Ok(root);
        }

        self.discover(import_path).await
    }
}

/// Rejects import paths that cannot name a remote module
pub fn validate_import_path(import_path: &str) -> Result<()> {
    let invalid = |reason: &str| GobinError::ResolutionFailed {
        import_path: import_path.to_string(),
        reason: reason.to_string(),
    };

    if import_path.is_empty() {
        return Err(invalid("empty import path"));
    }
    if import_path.contains("://") {
        return Err(invalid("import path must not include a scheme"));
    }
    if import_path
        .chars()
        .any(|c| c == '\\' || c == '?' || c == '#' || c.is_whitespace() || c.is_control())
    {
        return Err(invalid("invalid character in import path"));
    }
    if import_path
        .split('/')
        .any(|element| element.is_empty() || element == "." || element == "..")
    {
        return Err(invalid("empty, '.' or '..' path element"));
    }

    let host = import_path.split('/').next().unwrap_or_default();
    if !host.contains('.') {
        return Err(invalid("missing dot in first path element"));
    }

    Ok(())
}

/// Resolution that needs no network access
fn static_root(import_path: &str) -> Result<Option<RepoRoot>> {
    let elements: Vec<&str> = import_path.split('/').collect();

    if STATIC_HOSTS.contains(&elements[0]) {
        if elements.len() < 3 {
            return Err(GobinError::ResolutionFailed {
                import_path: import_path.to_string(),
                reason: format!("expected {}/<owner>/<repository>", elements[0]),
            });
        }
        return Ok(Some(https_root(elements[..3].join("/"))));
    }

    let explicit = elements
        .iter()
        .skip(1)
        .position(|element| element.len() > ".git".len() && element.ends_with(".git"));
    Ok(explicit.map(|i| https_root(elements[..i + 2].join("/"))))
}

fn https_root(root: String) -> RepoRoot {
    RepoRoot {
        repo: format!("https://{root}"),
        root,
        vcs: SUPPORTED_VCS.to_string(),
    }
}
