//! URL construction helpers for the GitHub REST API.
//!
//! Pure functions, so every endpoint mcpscan calls is spelled out in one
//! place and covered by tests.

use url::Url;

use crate::models::ApiConfig;

/// Open-alert listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    CodeScanning,
    SecretScanning,
    Dependabot,
}

impl AlertKind {
    const fn path(self) -> &'static str {
        match self {
            Self::CodeScanning => "code-scanning/alerts",
            Self::SecretScanning => "secret-scanning/alerts",
            Self::Dependabot => "dependabot/alerts",
        }
    }
}

/// Append `path` (no leading slash) to the configured base URL.
fn endpoint(config: &ApiConfig, path: &str) -> Url {
    let mut url = config.base_url.clone();
    let base_path = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{base_path}/{path}"));
    url
}

fn repo_endpoint(config: &ApiConfig, owner: &str, repo: &str, rest: &str) -> Url {
    let path = if rest.is_empty() {
        format!("repos/{}/{}", encode(owner), encode(repo))
    } else {
        format!("repos/{}/{}/{rest}", encode(owner), encode(repo))
    };
    endpoint(config, &path)
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// `GET /orgs/{org}/repos?type=forks`
pub fn build_org_forks_url(config: &ApiConfig, org: &str) -> Url {
    let mut url = endpoint(config, &format!("orgs/{}/repos", encode(org)));
    url.set_query(Some(&format!("type=forks&per_page={}", config.per_page)));
    url
}

/// `GET /orgs/{org}/properties/values`
pub fn build_org_properties_url(config: &ApiConfig, org: &str) -> Url {
    let mut url = endpoint(config, &format!("orgs/{}/properties/values", encode(org)));
    url.set_query(Some(&format!("per_page={}", config.per_page)));
    url
}

/// `GET`/`PATCH /repos/{owner}/{repo}/properties/values`
pub fn build_repo_properties_url(config: &ApiConfig, owner: &str, repo: &str) -> Url {
    repo_endpoint(config, owner, repo, "properties/values")
}

/// `GET`/`PATCH /repos/{owner}/{repo}`
pub fn build_repo_url(config: &ApiConfig, owner: &str, repo: &str) -> Url {
    repo_endpoint(config, owner, repo, "")
}

/// `GET /rate_limit`
pub fn build_rate_limit_url(config: &ApiConfig) -> Url {
    endpoint(config, "rate_limit")
}

/// `GET /repos/{owner}/{repo}/{kind}?state=open`
pub fn build_alerts_url(config: &ApiConfig, owner: &str, repo: &str, kind: AlertKind) -> Url {
    let mut url = repo_endpoint(config, owner, repo, kind.path());
    url.set_query(Some(&format!("state=open&per_page={}", config.per_page)));
    url
}

/// `GET /search/issues` for open issues in one repository whose title
/// contains `title_query`.
pub fn build_issue_search_url(
    config: &ApiConfig,
    owner: &str,
    repo: &str,
    title_query: &str,
) -> Url {
    let escaped = title_query.replace('"', "\\\"");
    let q = format!("repo:{owner}/{repo} is:issue is:open in:title \"{escaped}\"");
    let mut url = endpoint(config, "search/issues");
    url.set_query(Some(&format!("q={}", urlencoding::encode(&q))));
    url
}

/// `POST /repos/{owner}/{repo}/issues`
pub fn build_issues_url(config: &ApiConfig, owner: &str, repo: &str) -> Url {
    repo_endpoint(config, owner, repo, "issues")
}

/// `POST /repos/{owner}/{repo}/forks`
pub fn build_forks_url(config: &ApiConfig, owner: &str, repo: &str) -> Url {
    repo_endpoint(config, owner, repo, "forks")
}

/// `PUT /repos/{owner}/{repo}/vulnerability-alerts`
pub fn build_vulnerability_alerts_url(config: &ApiConfig, owner: &str, repo: &str) -> Url {
    repo_endpoint(config, owner, repo, "vulnerability-alerts")
}

/// `PATCH /repos/{owner}/{repo}/code-scanning/default-setup`
pub fn build_default_setup_url(config: &ApiConfig, owner: &str, repo: &str) -> Url {
    repo_endpoint(config, owner, repo, "code-scanning/default-setup")
}

/// `GET /repos/{owner}/{repo}/contents/{path}`
pub fn build_contents_url(config: &ApiConfig, owner: &str, repo: &str, path: &str) -> Url {
    repo_endpoint(config, owner, repo, &format!("contents/{path}"))
}

/// `GET /repos/{owner}/{repo}/tarball/{ref}`
pub fn build_tarball_url(config: &ApiConfig, owner: &str, repo: &str, git_ref: &str) -> Url {
    repo_endpoint(config, owner, repo, &format!("tarball/{}", encode(git_ref)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ApiConfig {
        ApiConfig::default()
    }

    #[test]
    fn test_org_urls() {
        assert_eq!(
            build_org_forks_url(&config(), "mcp-research").as_str(),
            "https://api.github.com/orgs/mcp-research/repos?type=forks&per_page=100"
        );
        assert_eq!(
            build_org_properties_url(&config(), "mcp-research").as_str(),
            "https://api.github.com/orgs/mcp-research/properties/values?per_page=100"
        );
    }

    #[test]
    fn test_repo_urls() {
        let c = config();
        assert_eq!(
            build_repo_url(&c, "o", "r").as_str(),
            "https://api.github.com/repos/o/r"
        );
        assert_eq!(
            build_repo_properties_url(&c, "o", "r").as_str(),
            "https://api.github.com/repos/o/r/properties/values"
        );
        assert_eq!(
            build_contents_url(&c, "o", "r", ".github/dependabot.yml").as_str(),
            "https://api.github.com/repos/o/r/contents/.github/dependabot.yml"
        );
        assert_eq!(
            build_tarball_url(&c, "o", "r", "main").as_str(),
            "https://api.github.com/repos/o/r/tarball/main"
        );
        assert_eq!(
            build_default_setup_url(&c, "o", "r").as_str(),
            "https://api.github.com/repos/o/r/code-scanning/default-setup"
        );
    }

    #[test]
    fn test_alert_urls() {
        let url = build_alerts_url(&config(), "o", "r", AlertKind::Dependabot);
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/o/r/dependabot/alerts?state=open&per_page=100"
        );
        assert!(
            build_alerts_url(&config(), "o", "r", AlertKind::SecretScanning)
                .path()
                .ends_with("secret-scanning/alerts")
        );
    }

    #[test]
    fn test_issue_search_url() {
        let url = build_issue_search_url(&config(), "mcp-research", "scans", "Failed analysis: x");
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(query[0].0, "q");
        assert_eq!(
            query[0].1,
            "repo:mcp-research/scans is:issue is:open in:title \"Failed analysis: x\""
        );
    }

    #[test]
    fn test_enterprise_base_url() {
        let c = ApiConfig {
            base_url: Url::parse("https://ghe.example.com/api/v3/").unwrap(),
            ..ApiConfig::default()
        };
        assert_eq!(
            build_rate_limit_url(&c).as_str(),
            "https://ghe.example.com/api/v3/rate_limit"
        );
    }
}
