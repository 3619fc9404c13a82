//! Keyword-based activity tagger.
//!
//! Each tag owns a keyword list. The input is lowercased and stripped of
//! the configured punctuation, then every tag is scored by how many of its
//! keywords appear as substrings.
//!
//! Among tags with at least one hit the one with the **fewest** hits wins,
//! ties going to the earlier tag. This looks inverted next to a "most hits
//! wins" rule but it is the established product behavior; changing it
//! needs a product decision, not a refactor.

/// Maps free text to one of a closed set of tags.
#[derive(Debug, Clone)]
pub struct KeywordTagger {
    tags: Vec<(String, Vec<String>)>,
    fallback: String,
    strip_chars: Vec<char>,
}

impl KeywordTagger {
    pub fn new(tags: Vec<(String, Vec<String>)>, fallback: String, strip_chars: Vec<char>) -> Self {
        let tags = tags
            .into_iter()
            .map(|(name, words)| {
                let words = words.into_iter().map(|w| w.to_lowercase()).collect();
                (name, words)
            })
            .collect();
        Self {
            tags,
            fallback,
            strip_chars,
        }
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    fn normalize(&self, text: &str) -> String {
        text.chars()
            .filter(|c| !self.strip_chars.contains(c))
            .collect::<String>()
            .to_lowercase()
    }

    /// Keyword hit count per tag, in configuration order.
    pub fn scores(&self, text: &str) -> Vec<(&str, usize)> {
        let normalized = self.normalize(text);
        self.tags
            .iter()
            .map(|(name, words)| {
                let hits = words.iter().filter(|w| normalized.contains(w.as_str())).count();
                (name.as_str(), hits)
            })
            .collect()
    }

    pub fn infer_tag(&self, text: &str) -> String {
        let mut best: Option<(&str, usize)> = None;
        for (name, hits) in self.scores(text) {
            if hits == 0 {
                continue;
            }
            match best {
                Some((_, best_hits)) if best_hits <= hits => {}
                _ => best = Some((name, hits)),
            }
        }
        best.map(|(name, _)| name.to_string())
            .unwrap_or_else(|| self.fallback.clone())
    }
}
