//! Keyword filter over assembled postings.

use workly_core::Posting;

/// Keeps postings mentioning any of the configured keywords.
///
/// An empty keyword list keeps everything.
#[derive(Debug, Clone, Default)]
pub struct LanguageFilter {
    keywords: Vec<String>,
}

impl LanguageFilter {
    /// Filter over `keywords`; blank keywords are ignored.
    #[must_use]
    pub fn new<I, K>(keywords: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Whether the filter keeps everything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Whether `posting` passes the filter.
    #[must_use]
    pub fn matches(&self, posting: &Posting) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let haystack = format!(
            "{} {} {}",
            posting.title,
            posting.description,
            posting.skills_joined()
        )
        .to_lowercase();
        self.keywords.iter().any(|k| haystack.contains(k.as_str()))
    }

    /// Postings that pass, in order.
    #[must_use]
    pub fn apply(&self, postings: Vec<Posting>) -> Vec<Posting> {
        postings.into_iter().filter(|p| self.matches(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(title: &str, description: &str, skills: &[&str]) -> Posting {
        Posting {
            title: title.to_string(),
            description: description.to_string(),
            skills: skills.iter().map(ToString::to_string).collect(),
            ..Posting::default()
        }
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filter = LanguageFilter::new(Vec::<String>::new());
        assert!(filter.is_empty());
        assert!(filter.matches(&posting("", "", &[])));
    }

    #[test]
    fn test_blank_keywords_are_ignored() {
        assert!(LanguageFilter::new(["  ", ""]).is_empty());
    }

    #[test]
    fn test_matches_any_field_case_insensitively() {
        let filter = LanguageFilter::new(["Python", "rust"]);
        assert!(filter.matches(&posting("Bot em PYTHON", "", &[])));
        assert!(filter.matches(&posting("API", "Serviço escrito em Rust", &[])));
        assert!(filter.matches(&posting("API", "", &["Docker", "Rust"])));
        assert!(!filter.matches(&posting("Landing page", "WordPress", &["PHP"])));
    }

    #[test]
    fn test_apply_preserves_order() {
        let filter = LanguageFilter::new(["java"]);
        let kept = filter.apply(vec![
            posting("Java backend", "", &[]),
            posting("Design", "", &[]),
            posting("App", "JavaScript front", &[]),
        ]);
        let titles: Vec<_> = kept.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Java backend", "App"]);
    }
}
