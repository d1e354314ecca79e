use indoc::formatdoc;
use tracing::info;

use crate::{
    commands::{internal_err, user_err, CommandResult},
    facade::{request, FacadeRequest, ResponseBody},
    AppState,
};

pub async fn login(state: &AppState, token: &str, repo: Option<&str>) -> CommandResult {
    let credentials = state.publisher.login(token, repo).await?;

    let repository = credentials
        .repository()
        .ok_or_else(|| internal_err("Stored repository should be valid"))?;

    Ok(formatdoc! {
        r#"
            Logged in as {account}.
            Solutions will be published to {repository}.
        "#,
        account = credentials.account_id,
    })
}

pub async fn logout(state: &AppState) -> CommandResult {
    state
        .credentials
        .logout()
        .await
        .map_err(|err| internal_err(format!("Could not log out: {err}")))?;

    info!("Credentials and history removed");
    Ok("Logged out. Stored token and publish history were removed.".to_string())
}

pub async fn test_credentials(state: &AppState) -> CommandResult {
    let response = request(&state.facade, FacadeRequest::TestCredentials).await;

    match response.body {
        ResponseBody::User(user) if response.success => Ok(match user.name {
            Some(name) => format!("Token is valid for {} ({name})", user.login),
            None => format!("Token is valid for {}", user.login),
        }),
        ResponseBody::Error(message) => Err(user_err(message)),
        other => Err(internal_err(format!("Unexpected response: {other:?}"))),
    }
}
