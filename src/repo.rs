// Repository identifier parsing and validation.
// Accepts bare `owner/name` tokens or full github.com URLs.

use std::fmt;

use crate::error::ProxyError;

const URL_PREFIXES: [&str; 2] = ["https://github.com/", "http://github.com/"];

/// Validated `owner/name` pair identifying a GitHub repository.
///
/// Built only by [`RepoId::parse`] and immutable afterwards; every cache key
/// embeds one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    owner: String,
    name: String,
}

impl RepoId {
    /// Parse raw user input into a repository identifier.
    ///
    /// Accepts `owner/name` or `https://github.com/owner/name`, with an
    /// optional trailing slash and an optional `.git` suffix. Owner and name
    /// may only contain `[A-Za-z0-9_.-]`.
    pub fn parse(raw: &str) -> Result<Self, ProxyError> {
        let mut input = raw.trim();
        for prefix in URL_PREFIXES {
            if let Some(rest) = input.strip_prefix(prefix) {
                input = rest;
                break;
            }
        }
        let input = input.strip_suffix('/').unwrap_or(input);
        let input = input.strip_suffix(".git").unwrap_or(input);

        let (owner, name) = input
            .split_once('/')
            .ok_or_else(|| malformed(raw, "expected `owner/name`"))?;
        if name.contains('/') {
            return Err(malformed(raw, "too many path segments"));
        }
        if !is_valid_segment(owner) || !is_valid_segment(name) {
            return Err(malformed(
                raw,
                "owner and name may only contain letters, digits, `_`, `.` and `-`",
            ));
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

fn malformed(raw: &str, reason: &str) -> ProxyError {
    ProxyError::MalformedRepo(format!("{raw:?}: {reason}"))
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_identifier() {
        let repo = RepoId::parse("octocat/Hello-World").unwrap();
        assert_eq!(repo.owner(), "octocat");
        assert_eq!(repo.name(), "Hello-World");
        assert_eq!(repo.to_string(), "octocat/Hello-World");
    }

    #[test]
    fn test_url_and_bare_forms_are_equivalent() {
        let from_url = RepoId::parse("https://github.com/octocat/Hello-World").unwrap();
        let bare = RepoId::parse("octocat/Hello-World").unwrap();
        assert_eq!(from_url, bare);
    }

    #[test]
    fn test_strips_trailing_slash_and_git_suffix() {
        let expected = RepoId::parse("octocat/Hello-World").unwrap();
        for raw in [
            "https://github.com/octocat/Hello-World/",
            "https://github.com/octocat/Hello-World.git",
            "octocat/Hello-World.git",
        ] {
            assert_eq!(RepoId::parse(raw).unwrap(), expected, "input: {raw}");
        }
    }

    #[test]
    fn test_rejects_missing_separator() {
        assert!(matches!(
            RepoId::parse("just-a-name"),
            Err(ProxyError::MalformedRepo(_))
        ));
    }

    #[test]
    fn test_rejects_extra_path_segments() {
        assert!(RepoId::parse("octocat/Hello-World/issues").is_err());
    }

    #[test]
    fn test_rejects_invalid_characters() {
        for raw in ["octo cat/repo", "octocat/re#po", "octocat/re?po", "öwner/repo"] {
            assert!(RepoId::parse(raw).is_err(), "input: {raw}");
        }
    }

    #[test]
    fn test_rejects_empty_segments() {
        for raw in ["/repo", "owner/", "/"] {
            assert!(RepoId::parse(raw).is_err(), "input: {raw}");
        }
    }
}
