//! Turns loosely formatted commit references into canonical `.patch` URLs.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

const GITHUB_PREFIX: &str = "https://github.com/";
const PATCH_SUFFIX: &str = ".patch";
const COMMIT_SEGMENT: &str = "/commit/";

static PATCH_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://github\.com/([^/]+)/([^/]+)/commit/([0-9a-f]{40})\.patch$")
        .expect("patch url pattern must compile")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("No input provided")]
    Missing,
    #[error("Invalid input format: {0}")]
    InvalidFormat(String),
}

/// Rewrites `raw` towards `https://github.com/<owner>/<repo>/commit/<sha>.patch`.
///
/// The result is not validated, see [`PatchUrl`] for that. Accepted shapes:
///
/// - `https://github.com/user/repo/commit/<sha>`
/// - `https://github.com/user/repo/commit/<sha>.patch`
/// - `github.com/user/repo/commit/<sha>`
/// - `user/repo/<sha>`
pub fn normalize(raw: &str) -> String {
    let mut url = raw.trim().trim_matches('/').to_owned();

    if let Some(rest) = url.strip_prefix("http://") {
        url = format!("https://{rest}");
    }

    if !url.ends_with(PATCH_SUFFIX) {
        url.push_str(PATCH_SUFFIX);
    }

    if url.starts_with("github.com") {
        url.insert_str(0, "https://");
    }

    if !url.starts_with(GITHUB_PREFIX) {
        url.insert_str(0, GITHUB_PREFIX);
    }

    // the last segment is the sha
    if !url.contains(COMMIT_SEGMENT) {
        if let Some(last_slash) = url.rfind('/') {
            url.replace_range(last_slash..=last_slash, COMMIT_SEGMENT);
        }
    }

    url
}

/// A validated commit patch URL on github.com.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchUrl {
    url: String,
    owner: String,
    repo: String,
    sha: String,
}

impl PatchUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// The full 40 character lowercase commit sha.
    pub fn sha(&self) -> &str {
        &self.sha
    }
}

impl FromStr for PatchUrl {
    type Err = InputError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let url = normalize(raw);
        let Some(caps) = PATCH_URL.captures(&url) else {
            return Err(InputError::InvalidFormat(raw.trim().to_owned()));
        };
        let (owner, repo, sha) = (
            caps[1].to_owned(),
            caps[2].to_owned(),
            caps[3].to_owned(),
        );
        Ok(Self {
            url,
            owner,
            repo,
            sha,
        })
    }
}

impl fmt::Display for PatchUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    const SHA: &str = "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed";
    const CANONICAL: &str =
        "https://github.com/user/repo/commit/2aae6c35c94fcfb415dbe95f408b9ce91ee846ed.patch";

    #[rstest]
    #[case::shorthand("user/repo/2aae6c35c94fcfb415dbe95f408b9ce91ee846ed")]
    #[case::canonical(CANONICAL)]
    #[case::commit_page(
        "https://github.com/user/repo/commit/2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
    )]
    #[case::plain_http(
        "http://github.com/user/repo/commit/2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
    )]
    #[case::no_scheme("github.com/user/repo/commit/2aae6c35c94fcfb415dbe95f408b9ce91ee846ed")]
    #[case::no_scheme_no_commit("github.com/user/repo/2aae6c35c94fcfb415dbe95f408b9ce91ee846ed")]
    #[case::surrounding_noise(
        "  /https://github.com/user/repo/commit/2aae6c35c94fcfb415dbe95f408b9ce91ee846ed/ \n"
    )]
    #[case::shorthand_with_suffix("user/repo/2aae6c35c94fcfb415dbe95f408b9ce91ee846ed.patch")]
    fn normalizes_accepted_shapes(#[case] input: &str) {
        assert_eq!(normalize(input), CANONICAL);

        let url: PatchUrl = input.parse().unwrap();
        assert_eq!(url.as_str(), CANONICAL);
        assert_eq!(url.owner(), "user");
        assert_eq!(url.repo(), "repo");
        assert_eq!(url.sha(), SHA);
    }

    #[test]
    fn owner_and_repo_keep_any_non_slash_characters() {
        let url: PatchUrl = format!("my.org/some-repo_v2.rs/{SHA}").parse().unwrap();
        assert_eq!(url.owner(), "my.org");
        assert_eq!(url.repo(), "some-repo_v2.rs");
        assert_eq!(
            url.to_string(),
            format!("https://github.com/my.org/some-repo_v2.rs/commit/{SHA}.patch")
        );
    }

    #[rstest]
    #[case::short_sha("user/repo/2aae6c3")]
    #[case::uppercase_sha("user/repo/2AAE6C35C94FCFB415DBE95F408B9CE91EE846ED")]
    #[case::non_hex_sha("user/repo/zaae6c35c94fcfb415dbe95f408b9ce91ee846ed")]
    #[case::long_sha("user/repo/2aae6c35c94fcfb415dbe95f408b9ce91ee846ed0")]
    #[case::missing_repo("user/2aae6c35c94fcfb415dbe95f408b9ce91ee846ed")]
    #[case::pull_request(
        "https://github.com/user/repo/pull/12/commits/2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
    )]
    #[case::other_host(
        "https://gitlab.com/user/repo/commit/2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
    )]
    #[case::empty("")]
    #[case::blank("   ")]
    fn rejects_malformed_input(#[case] input: &str) {
        assert_eq!(
            input.parse::<PatchUrl>(),
            Err(InputError::InvalidFormat(input.trim().to_owned()))
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(InputError::Missing.to_string(), "No input provided");
        assert_eq!(
            InputError::InvalidFormat("x/y".into()).to_string(),
            "Invalid input format: x/y"
        );
    }

    fn segment() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_-]{1,16}".prop_filter("reserved segment", |s| s != "commit")
    }

    proptest! {
        #[test]
        fn shorthand_expands_to_canonical(
            owner in segment(),
            repo in segment(),
            sha in "[0-9a-f]{40}"
        ) {
            let url: PatchUrl = format!("{owner}/{repo}/{sha}").parse().unwrap();
            prop_assert_eq!(
                url.as_str(),
                format!("https://github.com/{owner}/{repo}/commit/{sha}.patch")
            );
        }

        #[test]
        fn canonical_passes_through(
            owner in segment(),
            repo in segment(),
            sha in "[0-9a-f]{40}"
        ) {
            let canonical = format!("https://github.com/{owner}/{repo}/commit/{sha}.patch");
            prop_assert_eq!(normalize(&canonical), canonical.clone());
            prop_assert!(canonical.parse::<PatchUrl>().is_ok());
        }

        #[test]
        fn normalize_is_idempotent(raw in concat!(
            "[ /]{0,2}(https?://)?(github\\.com/)?",
            "[a-z]{1,8}/[a-z]{1,8}/(commit/)?[0-9a-f]{1,40}(\\.patch)?[ /]{0,2}",
        )) {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn rejects_short_or_uppercase_sha(
            sha in "([0-9a-f]{1,39}|[0-9a-f]{0,39}[A-F][0-9a-fA-F]{0,39})"
        ) {
            prop_assume!(sha.len() != 40 || sha.chars().any(|c| c.is_ascii_uppercase()));
            let input = format!("user/repo/{sha}");
            prop_assert!(input.parse::<PatchUrl>().is_err());
        }
    }
}
