use base64::{engine::general_purpose::STANDARD, Engine};
use time::macros::format_description;
use time::{format_description, OffsetDateTime, UtcOffset};

use crate::models::{Difficulty, Platform, Submission};

use super::slug::sanitize_title;

const GENERATED_AT_FORMAT: &[format_description::FormatItem<'_>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
);

const AUTHOR_TAG: &str = "CodeSync";

pub fn format_utc_iso(date_time: impl Into<OffsetDateTime>) -> String {
    let offset_date_time: OffsetDateTime = date_time.into();
    offset_date_time
        .to_offset(UtcOffset::UTC)
        .format(GENERATED_AT_FORMAT)
        .expect("Hard-coded format should be correct")
}

pub fn file_extension(language: &str) -> &'static str {
    match language.trim().to_lowercase().as_str() {
        "cpp" | "c++" | "c++17" | "c++20" | "gnu c++" => "cpp",
        "python" | "python3" | "pypy" | "pypy3" => "py",
        "java" => "java",
        "javascript" | "node.js" => "js",
        "go" => "go",
        "rust" => "rs",
        "c" => "c",
        "c#" | "csharp" => "cs",
        _ => "txt",
    }
}

/// Repository path for a submission. Depends on nothing but the submission.
pub fn format_path(submission: &Submission) -> String {
    let ext = file_extension(&submission.language);

    match submission.platform {
        Platform::LeetCode => {
            let difficulty = submission.difficulty.unwrap_or(Difficulty::Medium);
            format!(
                "{}/{difficulty}/{}.{ext}",
                submission.platform,
                file_stem(&submission.title)
            )
        }

        Platform::Codeforces => match contest_problem(submission) {
            Some((contest_id, problem_index)) => {
                let division = submission
                    .division
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .unwrap_or("div2");
                format!(
                    "{}/{division}/contest_{contest_id}/{}.{ext}",
                    submission.platform,
                    problem_index.to_lowercase()
                )
            }
            None => fallback_path(submission, ext),
        },
    }
}

fn contest_problem(submission: &Submission) -> Option<(&str, &str)> {
    let contest_id = submission.contest_id.as_deref().map(str::trim)?;
    let problem_index = submission.problem_index.as_deref().map(str::trim)?;

    if contest_id.is_empty() || problem_index.is_empty() {
        None
    } else {
        Some((contest_id, problem_index))
    }
}

fn fallback_path(submission: &Submission, ext: &str) -> String {
    format!(
        "{}/{}.{ext}",
        submission.platform,
        file_stem(&submission.title)
    )
}

fn file_stem(title: &str) -> String {
    let stem = sanitize_title(title);
    if stem.is_empty() {
        "untitled".to_string()
    } else {
        stem
    }
}

/// File content: a comment header describing the submission, then the code.
pub fn format_content(submission: &Submission, generated_at: OffsetDateTime) -> String {
    let mut header = format!("/*\n * {}\n", submission.title);
    header += &format!(
        " * Platform: {}\n",
        submission.platform.to_string().to_uppercase()
    );

    if let Some(difficulty) = submission.difficulty {
        header += &format!(" * Difficulty: {difficulty}\n");
    }
    if let Some(contest_id) = non_empty(&submission.contest_id) {
        header += &format!(" * Contest: {contest_id}\n");
    }
    if let Some(problem_index) = non_empty(&submission.problem_index) {
        header += &format!(" * Problem: {problem_index}\n");
    }
    if !submission.language.is_empty() {
        header += &format!(" * Language: {}\n", submission.language);
    }
    if !submission.url.is_empty() {
        header += &format!(" * Problem URL: {}\n", submission.url);
    }

    header += &format!(" * Date: {}\n", format_utc_iso(generated_at));
    header += &format!(" * Author: {AUTHOR_TAG}\n */\n\n");

    header + &submission.code
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Base64 of the UTF-8 bytes, as the contents API expects.
pub fn encode_content(content: &str) -> String {
    STANDARD.encode(content.as_bytes())
}
