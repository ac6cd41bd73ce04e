// Cache key construction.
// One key per (resource kind, repository, optional item number).

use std::fmt;

use crate::github::ResourceKind;
use crate::repo::RepoId;

/// Key addressing one cached upstream response.
///
/// A total, collision-free function of its inputs: list and item requests
/// for the same repository never share an entry, and neither do issues and
/// pull requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: ResourceKind,
    repo: RepoId,
    number: Option<u64>,
}

impl CacheKey {
    pub fn new(kind: ResourceKind, repo: RepoId, number: Option<u64>) -> Self {
        Self { kind, repo, number }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number {
            Some(n) => write!(f, "{}:{}:{}", self.kind.label(), self.repo, n),
            None => write!(f, "{}:{}", self.kind.label(), self.repo),
        }
    }
}
