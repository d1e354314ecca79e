use std::fmt::{self, Debug, Display};

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub account_id: String,
    pub target_repository: String,
}

// The token must never end up in logs.
impl Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("account_id", &self.account_id)
            .field("target_repository", &self.target_repository)
            .finish()
    }
}

impl Credentials {
    pub fn repository(&self) -> Option<RepoRef> {
        RepoRef::parse(&self.target_repository, &self.account_id)
    }
}

/// A GitHub repository, `owner/name`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Accepts `owner/name` or a bare `name` owned by `default_owner`.
    pub fn parse(target: &str, default_owner: &str) -> Option<RepoRef> {
        let target = target.trim().trim_matches('/');

        let (owner, name) = match target.split_once('/') {
            Some((owner, name)) => (owner.trim(), name.trim()),
            None => (default_owner.trim(), target.trim()),
        };

        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }

        Some(RepoRef {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
