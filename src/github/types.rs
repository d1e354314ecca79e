use serde::{Deserialize, Serialize};

/// The account a token belongs to (`GET /user`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountIdentity {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// An existing file in a repository. Only the digest matters to us.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct FileRef {
    pub sha: String,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PutContents {
    pub message: String,
    /// Base64 of the file bytes.
    pub content: String,
    pub branch: String,
    /// Digest of the file being replaced; absent when creating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PutContentsResponse {
    pub content: ContentInfo,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ContentInfo {
    pub path: String,
    pub sha: String,
    pub html_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub private: bool,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Body of `POST /user/repos`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewRepository {
    pub name: String,
    pub description: String,
    pub private: bool,
    pub auto_init: bool,
}

impl NewRepository {
    pub const DEFAULT_NAME: &'static str = "leetcode-solutions";

    pub fn solutions(name: Option<String>, private: bool) -> NewRepository {
        NewRepository {
            name: name.unwrap_or_else(|| Self::DEFAULT_NAME.to_string()),
            description: "My LeetCode and Codeforces solutions".to_string(),
            private,
            auto_init: true,
        }
    }
}
