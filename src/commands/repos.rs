use crate::{
    commands::CommandResult,
    github::{NewRepository, RepositorySummary},
    AppState,
};

fn visibility(repository: &RepositorySummary) -> &'static str {
    if repository.private {
        "private"
    } else {
        "public"
    }
}

pub async fn list(state: &AppState) -> CommandResult {
    let repositories = state.publisher.list_repositories().await?;

    if repositories.is_empty() {
        return Ok("No repositories found".to_string());
    }

    let list = repositories.iter().fold(String::new(), |acc, repository| {
        acc + &format!(" - {} ({})\n", repository.full_name, visibility(repository))
    });

    Ok(format!("Your repositories:\n{list}"))
}

pub async fn create(state: &AppState, name: Option<String>, private: bool) -> CommandResult {
    let repository = state
        .publisher
        .create_repository(&NewRepository::solutions(name, private))
        .await?;

    Ok(match &repository.html_url {
        Some(url) => format!(
            "Created {} repository {}: {url}",
            visibility(&repository),
            repository.full_name
        ),
        None => format!(
            "Created {} repository {}",
            visibility(&repository),
            repository.full_name
        ),
    })
}
