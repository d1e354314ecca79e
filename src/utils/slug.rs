/// Turns a problem title into a file-name stem: lowercase ASCII letters and
/// digits separated by single underscores.
pub fn sanitize_title(str: &str) -> String {
    let mut slug = String::with_capacity(str.len());

    let mut pending_separator = false;
    for char in str.chars() {
        match char.to_ascii_lowercase() {
            c @ ('a'..='z' | '0'..='9') => {
                if pending_separator && !slug.is_empty() {
                    slug.push('_');
                }
                pending_separator = false;
                slug.push(c);
            }

            c if c.is_whitespace() => pending_separator = true,

            _ => (),
        }
    }

    slug.shrink_to_fit();
    slug
}

#[cfg(test)]
mod tests {
    use crate::utils::slug::sanitize_title;

    #[test]
    fn simple() {
        assert_eq!(sanitize_title("Two Sum"), "two_sum");
    }

    #[test]
    fn punctuation_is_stripped() {
        assert_eq!(sanitize_title("1. Two-Sum (Easy)!"), "1_twosum_easy");
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(
            sanitize_title("  Longest \t Palindromic\n\nSubstring  "),
            "longest_palindromic_substring"
        );
    }

    #[test]
    fn underscores_collapse_and_trim() {
        assert_eq!(sanitize_title("__a__ _ b__"), "a_b");
        assert_eq!(sanitize_title("snake__case"), "snakecase");
    }

    #[test]
    fn non_ascii_is_stripped() {
        assert_eq!(sanitize_title("Задача Sum"), "sum");
        assert_eq!(sanitize_title("Тест"), "");
    }

    #[test]
    fn only_allowed_characters() {
        let titles = [
            "A + B",
            "  ",
            "C++ Templates & Friends",
            "__init__",
            "100% Coverage?",
            "tab\tseparated\twords",
        ];

        for title in titles {
            let slug = sanitize_title(title);
            assert!(slug
                .chars()
                .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_')));
            assert!(!slug.starts_with('_'));
            assert!(!slug.ends_with('_'));
            assert!(!slug.contains("__"));
        }
    }
}
