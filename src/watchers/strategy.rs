//! Small helpers for reading page snapshots: ordered selector lists where the
//! first usable answer wins.

use lazy_regex::regex_is_match;
use scraper::{ElementRef, Html, Selector};
use tracing::trace;

pub fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(err) => {
            trace!("Skipping selector {css}: {err:?}");
            None
        }
    }
}

/// All text below the element, concatenated.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// First element matched by the first selector that matches anything.
pub fn first_present<'a>(doc: &'a Html, selectors: &[&str]) -> Option<ElementRef<'a>> {
    selectors
        .iter()
        .filter_map(|css| selector(css))
        .find_map(|selector| doc.select(&selector).next())
}

/// Looks only at the first element of every selector, in order, and returns the
/// first one `f` accepts.
pub fn first_matching<'a, T>(
    doc: &'a Html,
    selectors: &[&str],
    mut f: impl FnMut(ElementRef<'a>) -> Option<T>,
) -> Option<T> {
    selectors
        .iter()
        .filter_map(|css| selector(css))
        .find_map(|selector| doc.select(&selector).next().and_then(&mut f))
}

/// First non-empty trimmed text among the first elements of each selector.
pub fn first_text(doc: &Html, selectors: &[&str]) -> Option<String> {
    first_matching(doc, selectors, |element| {
        let text = element_text(element).trim().to_string();
        (!text.is_empty()).then_some(text)
    })
}

/// Scans every element of every selector, in order.
pub fn any_element<'a>(
    doc: &'a Html,
    selectors: &[&str],
    mut f: impl FnMut(ElementRef<'a>) -> bool,
) -> Option<ElementRef<'a>> {
    for selector in selectors.iter().filter_map(|css| selector(css)) {
        if let Some(element) = doc.select(&selector).find(|element| f(*element)) {
            return Some(element);
        }
    }
    None
}

pub fn body_text(doc: &Html) -> String {
    selector("body")
        .and_then(|body| doc.select(&body).next().map(element_text))
        .unwrap_or_default()
}

/// Normalized language identifier mentioned in free text, if any.
pub fn detect_language(text: &str) -> Option<&'static str> {
    let text = text.to_lowercase();

    if text.contains("python") || text.contains("pypy") {
        Some("python")
    } else if text.contains("javascript") || text.contains("node.js") {
        Some("javascript")
    } else if text.contains("java") {
        Some("java")
    } else if text.contains("c++") || text.contains("g++") || text.contains("cpp") {
        Some("cpp")
    } else if text.contains("c#") || text.contains("csharp") {
        Some("csharp")
    } else if regex_is_match!(r"\bgo(lang)?\b", &text) {
        Some("go")
    } else if text.contains("rust") {
        Some("rust")
    } else if regex_is_match!(r"\bgnu c\d*\b", &text) {
        Some("c")
    } else {
        None
    }
}

pub fn detect_language_or(text: Option<String>, default: &'static str) -> &'static str {
    text.as_deref().and_then(detect_language).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use map_macro::hash_map;
    use scraper::Html;

    use super::{any_element, detect_language, element_text, first_present, first_text};

    #[test]
    fn languages() {
        let cases = hash_map! {
            "Python3" => Some("python"),
            "PyPy 3-64" => Some("python"),
            "JavaScript" => Some("javascript"),
            "Node.js 15.8.0" => Some("javascript"),
            "Java 21 64bit" => Some("java"),
            "GNU G++20 13.2 (64 bit, winlibs)" => Some("cpp"),
            "GNU G++17 7.3.0" => Some("cpp"),
            "Clang++20 Diagnostics" => Some("cpp"),
            "C++17 (GCC 7-32)" => Some("cpp"),
            "C# 10, .NET SDK 6.0" => Some("csharp"),
            "Go 1.22.2" => Some("go"),
            "Rust 1.75.0 (2021)" => Some("rust"),
            "GNU C11" => Some("c"),
            "Good morning" => None,
            "Haskell" => None,
        };

        for (text, expected) in cases {
            assert_eq!(detect_language(text), expected, "{text}");
        }
    }

    #[test]
    fn first_text_skips_empty_elements() {
        let doc = Html::parse_document(
            r#"<div class="title">   </div><h1>Two Sum</h1><div class="question-title">Other</div>"#,
        );

        assert_eq!(
            first_text(&doc, &[".title", "h1", ".question-title"]),
            Some("Two Sum".to_string())
        );
        assert_eq!(first_text(&doc, &[".missing"]), None);
    }

    #[test]
    fn first_text_looks_at_first_match_only() {
        let doc = Html::parse_document(r#"<p class="x"></p><p class="x">second</p>"#);
        assert_eq!(first_text(&doc, &[".x"]), None);
    }

    #[test]
    fn any_element_scans_all_matches() {
        let doc = Html::parse_document(
            r#"<span class="result">Wrong Answer</span><span class="result">Accepted</span>"#,
        );

        let found = any_element(&doc, &[".result"], |e| element_text(e).contains("Accepted"));
        assert_eq!(found.map(element_text).as_deref(), Some("Accepted"));
    }

    #[test]
    fn invalid_selectors_are_skipped() {
        let doc = Html::parse_document(r#"<button class="lang-btn">Rust</button>"#);
        let found = first_present(&doc, &["[[[", "button[class*=\"lang\"]"]);
        assert_eq!(found.map(element_text).as_deref(), Some("Rust"));
    }
}
