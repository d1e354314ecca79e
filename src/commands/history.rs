use indoc::formatdoc;

use crate::{
    commands::{internal_err, CommandResult},
    models::{types::EpochMillis, PublishRecord},
    utils::formatting::format_utc_iso,
    AppState,
};

fn format_millis(millis: EpochMillis) -> String {
    millis
        .to_offset_date_time()
        .map(|date_time| format_utc_iso(date_time))
        .unwrap_or_else(|_| format!("{} ms", millis.0))
}

fn format_record(record: &PublishRecord) -> String {
    format!(
        " - {} [{}] {}: {}\n",
        format_millis(record.published_at),
        record.submission.platform,
        record.submission.title,
        record.remote_url,
    )
}

pub async fn list(state: &AppState, limit: u32) -> CommandResult {
    let records = state
        .history
        .list(limit)
        .await
        .map_err(|err| internal_err(format!("Could not load history: {err}")))?;

    if records.is_empty() {
        return Ok("Nothing has been published yet".to_string());
    }

    let list = records
        .iter()
        .fold(String::new(), |acc, record| acc + &format_record(record));

    Ok(format!("Recently published:\n{list}"))
}

pub async fn clear(state: &AppState) -> CommandResult {
    let removed = state
        .history
        .clear()
        .await
        .map_err(|err| internal_err(format!("Could not clear history: {err}")))?;

    Ok(format!("Removed {removed} history record(s)"))
}

pub async fn status(state: &AppState) -> CommandResult {
    let credentials = state
        .credentials
        .load()
        .await
        .map_err(|err| internal_err(format!("Could not load credentials: {err}")))?;

    let summary = state
        .history
        .summary(EpochMillis::now())
        .await
        .map_err(|err| internal_err(format!("Could not load history: {err}")))?;

    let account = match &credentials {
        Some(credentials) => format!(
            "{} publishing to {}",
            credentials.account_id, credentials.target_repository
        ),
        None => "not logged in".to_string(),
    };

    let last = summary
        .last_published_at
        .map(format_millis)
        .unwrap_or_else(|| "never".to_string());

    Ok(formatdoc! {
        r#"
            Account: {account}
            Published: {total} total, {today} today
            Last publish: {last}
        "#,
        total = summary.total,
        today = summary.today,
    })
}
