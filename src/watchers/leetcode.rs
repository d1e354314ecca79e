use std::time::Duration;

use async_trait::async_trait;
use lazy_regex::regex_captures;
use scraper::{ElementRef, Html};
use url::Url;

use crate::models::{types::EpochMillis, Difficulty, Platform, Submission};

use super::{
    strategy::{
        any_element, detect_language_or, element_text, first_matching, first_present, first_text,
        selector,
    },
    ExtractionError, PageKind, PageSnapshot, PageSource, Site, Timing,
};

const RESULT_SELECTORS: &[&str] = &[
    r#"[data-e2e-locator="submission-result"]"#,
    ".ant-typography",
    r#"[class*="accepted"]"#,
    r#"[class*="success"]"#,
    ".text-green",
    r#"[data-cy="submission-result"]"#,
    ".submission-result",
    r#"[class*="result"]"#,
];

const TITLE_SELECTORS: &[&str] = &[
    r#"[data-cy="question-title"]"#,
    "h1",
    ".css-v3d350",
    r#"[class*="title"]"#,
    ".question-title",
];

const DIFFICULTY_SELECTORS: &[&str] = &[
    "[diff]",
    ".css-10o4wqw",
    r#"[class*="difficulty"]"#,
    "[data-degree]",
];

const LANGUAGE_SELECTORS: &[&str] = &[
    "[data-mode-id]",
    ".language-selector",
    r#"[aria-label*="language"]"#,
    r#"[class*="language"]"#,
    r#"button[class*="lang"]"#,
];

const CODE_SELECTORS: &[&str] = &[
    ".monaco-editor .view-lines",
    "pre code",
    ".language-",
    r#"[class*="code"]"#,
    r#"textarea[class*="code"]"#,
    ".CodeMirror-code",
];

const DEFAULT_LANGUAGE: &str = "cpp";

pub struct LeetCode {
    timing: Timing,
}

impl Default for LeetCode {
    fn default() -> Self {
        LeetCode::with_timing(Timing {
            poll_interval: Duration::from_secs(2),
            session_duration: Duration::from_secs(60),
            settle_delay: Duration::from_secs(3),
            dedup_window: Duration::from_secs(30),
        })
    }
}

impl LeetCode {
    pub fn with_timing(timing: Timing) -> LeetCode {
        LeetCode { timing }
    }
}

#[async_trait]
impl Site for LeetCode {
    type Detection = ();

    fn platform(&self) -> Platform {
        Platform::LeetCode
    }

    fn timing(&self) -> Timing {
        self.timing
    }

    fn classify(&self, url: &Url) -> PageKind {
        let path = url.path();
        if path.contains("/problems/") && !path.contains("/submissions/") {
            PageKind::Monitored
        } else {
            PageKind::Ignored
        }
    }

    fn detect(&self, kind: PageKind, page: &PageSnapshot) -> Option<()> {
        if kind != PageKind::Monitored {
            return None;
        }

        let doc = Html::parse_document(&page.html);
        has_accepted_verdict(&doc).then_some(())
    }

    async fn extract(
        &self,
        page: &dyn PageSource,
        _detection: (),
        timestamp: EpochMillis,
    ) -> Result<Submission, ExtractionError> {
        // The verdict usually renders before the rest of the page.
        let snapshot = page.current().await?;
        Ok(parse_submission(&snapshot, timestamp))
    }
}

fn has_accepted_verdict(doc: &Html) -> bool {
    let mentions_verdict = |element: ElementRef<'_>| {
        let text = element_text(element);
        text.contains("Accepted") || text.contains("Success")
    };

    if any_element(doc, RESULT_SELECTORS, mentions_verdict).is_some() {
        return true;
    }

    let Some(everything) = selector("*") else {
        return false;
    };

    doc.select(&everything)
        .any(|element| element_text(element).trim() == "Accepted" && looks_green(element))
}

fn looks_green(element: ElementRef<'_>) -> bool {
    let class = element.value().attr("class").unwrap_or_default();
    let style = element.value().attr("style").unwrap_or_default();

    class.contains("green") || class.contains("success") || style.contains("green")
}

fn parse_submission(snapshot: &PageSnapshot, timestamp: EpochMillis) -> Submission {
    let doc = Html::parse_document(&snapshot.html);

    let title = first_text(&doc, TITLE_SELECTORS)
        .unwrap_or_else(|| title_from_path(snapshot.url.path()));

    let difficulty = first_matching(&doc, DIFFICULTY_SELECTORS, |element| {
        parse_difficulty(&element_text(element))
    })
    .unwrap_or(Difficulty::Medium);

    let language = detect_language_or(
        first_present(&doc, LANGUAGE_SELECTORS).map(element_text),
        DEFAULT_LANGUAGE,
    );

    let code = extract_code(&doc).unwrap_or_else(|| {
        format!("// Code extraction failed for {language}\n// Please check the submission manually")
    });

    let mut url = snapshot.url.clone();
    url.set_query(None);
    url.set_fragment(None);

    Submission::new(Platform::LeetCode, title, language, code, url, timestamp)
        .with_difficulty(difficulty)
}

fn extract_code(doc: &Html) -> Option<String> {
    first_text(doc, CODE_SELECTORS).or_else(|| {
        let line = selector(".view-line")?;
        let lines = doc.select(&line).map(element_text).collect::<Vec<_>>();
        let code = lines.join("\n");
        (!code.trim().is_empty()).then_some(code)
    })
}

fn parse_difficulty(text: &str) -> Option<Difficulty> {
    let text = text.to_lowercase();
    if text.contains("easy") {
        Some(Difficulty::Easy)
    } else if text.contains("hard") {
        Some(Difficulty::Hard)
    } else if text.contains("medium") {
        Some(Difficulty::Medium)
    } else {
        None
    }
}

/// `/problems/two-sum/` becomes `Two Sum`.
fn title_from_path(path: &str) -> String {
    let Some((_, slug)) = regex_captures!(r"/problems/([^/]+)", path) else {
        return "Unknown Problem".to_string();
    };

    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use map_macro::hash_map;
    use url::Url;

    use super::{parse_submission, title_from_path, LeetCode};
    use crate::{
        models::{types::EpochMillis, Difficulty, Platform},
        watchers::{page::scripted::snapshot, PageKind, Site},
    };

    #[test]
    fn page_kinds() {
        let site = LeetCode::default();
        let cases = hash_map! {
            "https://leetcode.com/problems/two-sum/" => PageKind::Monitored,
            "https://leetcode.com/problems/two-sum/description/?envType=daily" => PageKind::Monitored,
            "https://leetcode.com/problems/two-sum/submissions/1234/" => PageKind::Ignored,
            "https://leetcode.com/contest/weekly-contest-400/" => PageKind::Ignored,
        };

        for (url, kind) in cases {
            assert_eq!(site.classify(&Url::parse(url).unwrap()), kind, "{url}");
        }
    }

    #[test]
    fn detects_verdict_by_selector() {
        let site = LeetCode::default();
        let page = snapshot(
            "https://leetcode.com/problems/two-sum/",
            r#"<div class="result-panel"><span>Accepted</span></div>"#,
        );

        assert_eq!(site.detect(PageKind::Monitored, &page), Some(()));
        assert_eq!(site.detect(PageKind::Ignored, &page), None);
    }

    #[test]
    fn detects_green_verdict_fallback() {
        let site = LeetCode::default();
        let page = snapshot(
            "https://leetcode.com/problems/two-sum/",
            r#"<p><span style="color: green">Accepted</span></p>"#,
        );

        assert_eq!(site.detect(PageKind::Monitored, &page), Some(()));
    }

    #[test]
    fn plain_accepted_text_is_not_a_verdict() {
        let site = LeetCode::default();
        let page = snapshot(
            "https://leetcode.com/problems/two-sum/",
            r#"<p>Acceptance rate 50%</p><span>Wrong Answer</span>"#,
        );

        assert_eq!(site.detect(PageKind::Monitored, &page), None);
    }

    #[test]
    fn extracts_submission() {
        let page = snapshot(
            "https://leetcode.com/problems/two-sum/?envType=daily#top",
            indoc! {r#"
                <html><body>
                    <div data-cy="question-title">1. Two Sum</div>
                    <div diff="hard">Hard</div>
                    <div data-mode-id="rust">Rust</div>
                    <div class="monaco-editor"><div class="view-lines"><div class="view-line">impl Solution {}</div></div></div>
                </body></html>
            "#},
        );

        let submission = parse_submission(&page, EpochMillis(42));

        assert_eq!(submission.platform, Platform::LeetCode);
        assert_eq!(submission.title, "1. Two Sum");
        assert_eq!(submission.difficulty, Some(Difficulty::Hard));
        assert_eq!(submission.language, "rust");
        assert_eq!(submission.code, "impl Solution {}");
        assert_eq!(submission.url, "https://leetcode.com/problems/two-sum/");
        assert_eq!(submission.timestamp, EpochMillis(42));
    }

    #[test]
    fn defaults_when_page_is_bare() {
        let page = snapshot("https://leetcode.com/problems/longest-common-prefix/", "<html></html>");

        let submission = parse_submission(&page, EpochMillis(0));

        assert_eq!(submission.title, "Longest Common Prefix");
        assert_eq!(submission.difficulty, Some(Difficulty::Medium));
        assert_eq!(submission.language, "cpp");
        assert_eq!(
            submission.code,
            "// Code extraction failed for cpp\n// Please check the submission manually"
        );
    }

    #[test]
    fn unknown_language_falls_back_to_cpp() {
        let page = snapshot(
            "https://leetcode.com/problems/two-sum/",
            r#"<button class="lang-btn">Haskell</button><pre><code>main = pure ()</code></pre>"#,
        );

        let submission = parse_submission(&page, EpochMillis(0));
        assert_eq!(submission.language, "cpp");
        assert_eq!(submission.code, "main = pure ()");
    }

    #[test]
    fn titles_from_paths() {
        assert_eq!(title_from_path("/problems/two-sum/"), "Two Sum");
        assert_eq!(title_from_path("/problems/3sum"), "3sum");
        assert_eq!(title_from_path("/explore/"), "Unknown Problem");
    }
}
