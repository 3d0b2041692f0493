use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}+#./\-]*").unwrap());

#[derive(Debug, Clone, Copy, PartialEq)]
struct Token<'a> {
    text: &'a str,
    start: usize,
    end: usize,
}

/// Words that may carry inner `. / + # -`, e.g. `Node.js`, `CI/CD`, `C++`.
fn tokenize(text: &str) -> Vec<Token<'_>> {
    TOKEN
        .find_iter(text)
        .filter_map(|m| {
            let trimmed = m.as_str().trim_end_matches(['.', '/', '-']);
            (!trimmed.is_empty()).then(|| Token {
                text: trimmed,
                start: m.start(),
                end: m.start() + trimmed.len(),
            })
        })
        .collect()
}

/// Matches text against a fixed skill vocabulary.
pub struct SkillMatcher {
    skills: Vec<String>,
    lookup: HashMap<String, usize>,
    max_words: usize,
    case_sensitive: bool,
}

impl SkillMatcher {
    pub fn new(vocabulary: &[String], case_sensitive: bool) -> Self {
        let mut matcher = SkillMatcher {
            skills: Vec::with_capacity(vocabulary.len()),
            lookup: HashMap::with_capacity(vocabulary.len()),
            max_words: 1,
            case_sensitive,
        };

        for skill in vocabulary {
            let key = matcher.normalize(skill);
            if key.is_empty() || matcher.lookup.contains_key(&key) {
                continue;
            }
            matcher.max_words = matcher.max_words.max(key.split(' ').count());
            matcher.lookup.insert(key, matcher.skills.len());
            matcher.skills.push(skill.trim().to_string());
        }

        matcher
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.skills
    }

    fn normalize(&self, phrase: &str) -> String {
        let spaced = phrase.replace('-', " ");
        let joined = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
        if self.case_sensitive {
            joined
        } else {
            joined.to_lowercase()
        }
    }

    /// Vocabulary skills present in `text`, in order of first appearance.
    ///
    /// Multi-word skills only match words separated by whitespace, so
    /// `Machine. Learning` does not yield `Machine Learning`.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let tokens = tokenize(text);
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for i in 0..tokens.len() {
            let mut phrase = String::new();

            for j in i..tokens.len().min(i + self.max_words) {
                if j > i {
                    let gap = &text[tokens[j - 1].end..tokens[j].start];
                    if !gap.chars().all(char::is_whitespace) {
                        break;
                    }
                    phrase.push(' ');
                }
                phrase.push_str(tokens[j].text);

                if let Some(&idx) = self.lookup.get(&self.normalize(&phrase))
                    && seen.insert(idx)
                {
                    found.push(self.skills[idx].clone());
                }
            }
        }

        debug!("matched {} skills from {} tokens", found.len(), tokens.len());
        found
    }
}
