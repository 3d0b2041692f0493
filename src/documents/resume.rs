use std::collections::HashSet;

use log::debug;

use crate::documents::document::{Document, Paragraph};
use crate::tracker::store::split_skills;

const SKILLS_MARKER: &str = "Skills";

/// Locates the paragraph that opens the skills section.
fn skills_anchor(doc: &Document) -> Option<usize> {
    let paragraphs = &doc.paragraphs;
    paragraphs
        .iter()
        .position(|p| p.is_heading() && p.text.contains(SKILLS_MARKER))
        .or_else(|| paragraphs.iter().position(|p| p.text.contains(SKILLS_MARKER)))
}

/// Existing entries first, then keywords not already listed (case-insensitive).
pub fn merge_skills(existing: &str, keywords: &[String]) -> String {
    let mut seen = HashSet::new();
    split_skills(existing)
        .into_iter()
        .chain(keywords.iter().map(|k| k.trim().to_string()))
        .filter(|skill| !skill.is_empty() && seen.insert(skill.to_lowercase()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Returns a copy of `base` with `keywords` merged into its skills section.
pub fn tailor_resume(base: &Document, keywords: &[String]) -> Document {
    let mut doc = base.clone();

    let Some(anchor) = skills_anchor(&doc) else {
        debug!("no skills section in resume, appending one");
        doc.push(Paragraph::heading(1, SKILLS_MARKER));
        doc.push(Paragraph::body(keywords.join(", ")));
        return doc;
    };

    let skills_line = doc.paragraphs[anchor + 1..]
        .iter()
        .position(|p| !p.is_blank())
        .map(|offset| anchor + 1 + offset)
        .filter(|&idx| !doc.paragraphs[idx].is_heading());

    match skills_line {
        Some(idx) => {
            let merged = merge_skills(&doc.paragraphs[idx].text, keywords);
            doc.paragraphs[idx].text = merged;
        }
        None => doc
            .paragraphs
            .insert(anchor + 1, Paragraph::body(keywords.join(", "))),
    }

    doc
}
