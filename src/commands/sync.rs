use std::path::Path;

use tracing::debug;

use crate::{
    commands::{internal_err, user_err, CommandResult},
    facade::{request, FacadeRequest, ResponseBody},
    models::Submission,
    AppState,
};

pub async fn sync_file(state: &AppState, path: &Path) -> CommandResult {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| user_err(format!("Could not read {}: {err}", path.display())))?;

    sync_json(state, &json).await
}

pub async fn sync_json(state: &AppState, json: &str) -> CommandResult {
    let submission: Submission = serde_json::from_str(json)
        .map_err(|err| user_err(format!("Not a valid submission: {err}")))?;

    debug!("Sending {} to the sync service", submission.title);

    let response = request(&state.facade, FacadeRequest::Submission(submission)).await;

    match response.body {
        ResponseBody::Result(result) if response.success => {
            Ok(format!("{} {}: {}", capitalize(&result.action.to_string()), result.path, result.url))
        }
        ResponseBody::Error(message) => Err(user_err(message)),
        other => Err(internal_err(format!("Unexpected response: {other:?}"))),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use test_log::test;

    use super::sync_json;
    use crate::commands::{
        test_support::{logged_in_state, logged_out_state},
        CommandError,
    };

    const TWO_SUM: &str = indoc! {r#"
        {
            "platform": "leetcode",
            "title": "Two Sum",
            "language": "python",
            "code": "class Solution: pass",
            "url": "https://leetcode.com/problems/two-sum/",
            "timestamp": 1704164645678,
            "difficulty": "easy"
        }
    "#};

    #[test(tokio::test)]
    async fn publishes_json_submission() {
        let state = logged_in_state().await;

        let output = sync_json(&state, TWO_SUM).await.unwrap();

        assert_eq!(
            output,
            "Created leetcode/easy/two_sum.py: https://github.com/octocat/solutions/blob/main/leetcode/easy/two_sum.py"
        );
        assert_eq!(state.history.list(10).await.unwrap().len(), 1);
    }

    #[test(tokio::test)]
    async fn second_sync_updates() {
        let state = logged_in_state().await;

        sync_json(&state, TWO_SUM).await.unwrap();
        let output = sync_json(&state, TWO_SUM).await.unwrap();

        assert!(output.starts_with("Updated leetcode/easy/two_sum.py"));
    }

    #[test(tokio::test)]
    async fn rejects_bad_json() {
        let state = logged_in_state().await;

        let err = sync_json(&state, r#"{"platform": "atcoder"}"#).await.unwrap_err();
        assert!(matches!(err, CommandError::User { .. }));
    }

    #[test(tokio::test)]
    async fn reports_missing_configuration() {
        let state = logged_out_state().await;

        let err = sync_json(&state, TWO_SUM).await.unwrap_err();
        assert!(matches!(
            err,
            CommandError::User { message } if message == "GitHub credentials or repository not configured"
        ));
    }
}
