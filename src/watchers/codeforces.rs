use std::time::Duration;

use async_trait::async_trait;
use lazy_regex::{regex_captures, regex_is_match};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::models::{types::EpochMillis, Platform, Submission};

use super::{
    strategy::{body_text, detect_language, detect_language_or, element_text, first_text, selector},
    ExtractionError, PageKind, PageSnapshot, PageSource, Site, Timing,
};

const RECENT_MARKERS: &[&str] = &["just now", "seconds ago", "1 minute ago", "минуту назад"];
const FALLBACK_ROWS: usize = 10;

const HEADING_SELECTORS: &[&str] = &[".problem-statement .title", "div.title"];
const SOURCE_SELECTORS: &[&str] = &["pre#program-source-text", "pre"];

const DEFAULT_LANGUAGE: &str = "cpp";
const NO_SUBMISSION_ID: &str = "// No submission ID";
const UNABLE_TO_EXTRACT: &str = "// Unable to extract code";

pub struct Codeforces {
    timing: Timing,
}

impl Default for Codeforces {
    fn default() -> Self {
        Codeforces::with_timing(Timing {
            poll_interval: Duration::from_secs(3),
            session_duration: Duration::from_secs(120),
            settle_delay: Duration::ZERO,
            dedup_window: Duration::from_secs(10),
        })
    }
}

impl Codeforces {
    pub fn with_timing(timing: Timing) -> Codeforces {
        Codeforces { timing }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ProblemInfo {
    contest_id: String,
    problem_index: Option<String>,
    title: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum CodeSource {
    /// Already on the page.
    Inline(Option<String>),
    Fetch(Url),
    NoSubmissionId,
    Unreachable,
}

#[derive(Debug)]
pub struct CodeforcesDetection {
    /// The unparseable link on failure.
    problem: Result<ProblemInfo, String>,
    language: &'static str,
    code: CodeSource,
    url: String,
}

#[async_trait]
impl Site for Codeforces {
    type Detection = CodeforcesDetection;

    fn platform(&self) -> Platform {
        Platform::Codeforces
    }

    fn timing(&self) -> Timing {
        self.timing
    }

    fn classify(&self, url: &Url) -> PageKind {
        let path = url.path();
        if path.contains("/status") || path.contains("/my") || path.contains("/submissions") {
            PageKind::Monitored
        } else if regex_is_match!(r"/submission/\d+", path) {
            PageKind::SingleSubmission
        } else {
            PageKind::Ignored
        }
    }

    fn detect(&self, kind: PageKind, page: &PageSnapshot) -> Option<CodeforcesDetection> {
        let doc = Html::parse_document(&page.html);

        match kind {
            PageKind::Ignored => None,
            PageKind::Monitored => detect_in_status_table(&doc, &page.url),
            PageKind::SingleSubmission => detect_on_submission_page(&doc, &page.url),
        }
    }

    async fn extract(
        &self,
        page: &dyn PageSource,
        detection: CodeforcesDetection,
        timestamp: EpochMillis,
    ) -> Result<Submission, ExtractionError> {
        let problem = detection.problem.map_err(ExtractionError::ProblemLink)?;

        let code = match detection.code {
            CodeSource::Inline(code) => code,
            CodeSource::Fetch(url) => match page.fetch(&url).await {
                Ok(html) => source_code_in(&html),
                Err(err) => {
                    warn!("Could not fetch the source of {url}: {err}");
                    None
                }
            },
            CodeSource::NoSubmissionId => Some(NO_SUBMISSION_ID.to_string()),
            CodeSource::Unreachable => None,
        }
        .unwrap_or_else(|| UNABLE_TO_EXTRACT.to_string());

        let division = guess_division(&problem.contest_id).map(str::to_string);
        let contest_id = Some(problem.contest_id).filter(|id| !id.is_empty());

        Ok(Submission::new(
            Platform::Codeforces,
            problem.title,
            detection.language,
            code,
            detection.url,
            timestamp,
        )
        .with_contest(contest_id, problem.problem_index, division))
    }
}

fn detect_in_status_table(doc: &Html, page_url: &Url) -> Option<CodeforcesDetection> {
    let cell = selector("td")?;
    let row = find_accepted_row(doc, &cell)?;
    let row = parse_row(row, &cell)?;

    let problem = match row.problem {
        Some(Ok(mut problem)) => {
            if problem.title.is_empty() {
                problem.title = page_heading(doc)
                    .unwrap_or_else(|| fallback_title(problem.problem_index.as_deref()));
            }
            Ok(problem)
        }
        Some(Err(href)) => Err(href),
        None => Ok(problem_from_page(doc, page_url)),
    };

    let language = row.language.unwrap_or(DEFAULT_LANGUAGE);

    let (code, url) = match (&row.submission_id, &problem) {
        (None, _) => (CodeSource::NoSubmissionId, page_url.to_string()),
        (Some(sid), Ok(problem)) if !problem.contest_id.is_empty() => {
            match page_url.join(&format!("/contest/{}/submission/{sid}", problem.contest_id)) {
                Ok(url) => (CodeSource::Fetch(url.clone()), url.to_string()),
                Err(_) => (CodeSource::Unreachable, page_url.to_string()),
            }
        }
        (Some(_), _) => (CodeSource::Unreachable, page_url.to_string()),
    };

    Some(CodeforcesDetection {
        problem,
        language,
        code,
        url,
    })
}

fn detect_on_submission_page(doc: &Html, page_url: &Url) -> Option<CodeforcesDetection> {
    let text = body_text(doc);
    if !text.contains("Accepted") {
        debug!("Submission page does not show an accepted verdict");
        return None;
    }

    Some(CodeforcesDetection {
        problem: Ok(problem_from_page(doc, page_url)),
        language: detect_language_or(Some(text), DEFAULT_LANGUAGE),
        code: CodeSource::Inline(source_code(doc)),
        url: page_url.to_string(),
    })
}

/// The newest row that is both accepted and recent, or else any accepted row
/// near the bottom of the table.
fn find_accepted_row<'a>(doc: &'a Html, cell: &Selector) -> Option<ElementRef<'a>> {
    let row = selector("tr")?;
    let rows = doc.select(&row).collect::<Vec<_>>();

    let recent = rows.iter().copied().find(|row| {
        let cells = row
            .select(cell)
            .map(|cell| element_text(cell).trim().to_string())
            .collect::<Vec<_>>();

        cells.len() >= 4
            && cells.iter().any(|text| text.contains("Accepted"))
            && cells.iter().any(|text| is_recent(text))
    });

    recent.or_else(|| {
        rows.iter()
            .skip(rows.len().saturating_sub(FALLBACK_ROWS))
            .copied()
            .find(|row| element_text(*row).contains("Accepted"))
    })
}

fn is_recent(text: &str) -> bool {
    let text = text.to_lowercase();
    RECENT_MARKERS.iter().any(|marker| text.contains(marker))
}

struct RowInfo {
    submission_id: Option<String>,
    problem: Option<Result<ProblemInfo, String>>,
    language: Option<&'static str>,
}

fn parse_row(row: ElementRef<'_>, cell: &Selector) -> Option<RowInfo> {
    let submission_link = selector(r#"a[href*="/submission/"]"#)?;
    let problem_link = selector(r#"a[href*="/problem/"], a[href*="/contest/"]"#)?;
    let any_link = selector("a")?;

    let mut info = RowInfo {
        submission_id: None,
        problem: None,
        language: None,
    };

    for cell in row.select(cell) {
        if let Some(link) = cell.select(&submission_link).next() {
            let href = link.value().attr("href").unwrap_or_default();
            if let Some((_, sid)) = regex_captures!(r"/submission/(?:\d+/)?(\d+)", href) {
                info.submission_id = Some(sid.to_string());
            }
        }

        if info.problem.is_none() {
            let link = cell.select(&problem_link).find(|link| {
                !link
                    .value()
                    .attr("href")
                    .unwrap_or_default()
                    .contains("/submission/")
            });

            if let Some(link) = link {
                let href = link.value().attr("href").unwrap_or_default();
                info.problem = Some(
                    parse_problem_link(href, element_text(link).trim())
                        .ok_or_else(|| href.to_string()),
                );
            }
        }

        if info.language.is_none() && cell.select(&any_link).next().is_none() {
            info.language = detect_language(&element_text(cell));
        }
    }

    // Only the accepted row is searched; other rows may use other languages.
    if info.language.is_none() {
        info.language = detect_language(&element_text(row));
    }

    Some(info)
}

/// Understands `/contest/{id}/problem/{index}` and `/problemset/problem/{id}/{index}`.
fn parse_problem_link(href: &str, text: &str) -> Option<ProblemInfo> {
    let contest = regex_captures!(r"contest/(\d+)", href);
    let problem = regex_captures!(r"problem/([A-Z]\d?)", href);

    let (contest_id, problem_index) = match (contest, problem) {
        (Some((_, contest_id)), Some((_, problem_index))) => (contest_id, problem_index),
        _ => {
            let (_, contest_id, problem_index) =
                regex_captures!(r"problemset/problem/(\d+)/([A-Z]\d?)", href)?;
            (contest_id, problem_index)
        }
    };

    Some(ProblemInfo {
        contest_id: contest_id.to_string(),
        problem_index: Some(problem_index.to_string()),
        title: text.to_string(),
    })
}

fn page_heading(doc: &Html) -> Option<String> {
    first_text(doc, HEADING_SELECTORS)
}

fn problem_from_page(doc: &Html, page_url: &Url) -> ProblemInfo {
    let contest_id = regex_captures!(r"/contest/(\d+)/submission/\d+", page_url.path())
        .map(|(_, contest_id)| contest_id.to_string())
        .unwrap_or_default();

    let heading = page_heading(doc);
    let problem_index = heading
        .as_deref()
        .and_then(|heading| heading.split_whitespace().next())
        .map(|index| index.trim_end_matches('.').to_string())
        .filter(|index| !index.is_empty());

    let title = heading.unwrap_or_else(|| fallback_title(problem_index.as_deref()));

    ProblemInfo {
        contest_id,
        problem_index,
        title,
    }
}

fn fallback_title(problem_index: Option<&str>) -> String {
    match problem_index {
        Some(index) => format!("Problem {index}"),
        None => "Unknown Problem".to_string(),
    }
}

fn source_code(doc: &Html) -> Option<String> {
    first_text(doc, SOURCE_SELECTORS)
}

fn source_code_in(html: &str) -> Option<String> {
    source_code(&Html::parse_document(html))
}

/// Rough guess: later contests have higher ids.
fn guess_division(contest_id: &str) -> Option<&'static str> {
    let id = contest_id.trim().parse::<u32>().ok()?;

    Some(if id >= 1900 {
        "div1"
    } else if id >= 1200 {
        "div2"
    } else {
        "div3"
    })
}
