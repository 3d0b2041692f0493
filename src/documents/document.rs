use std::fmt;
use std::path::Path;

use eyre::{Result, WrapErr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphKind {
    /// Level 1..=6.
    Heading(u8),
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub kind: ParagraphKind,
    pub text: String,
}

impl Paragraph {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self {
            kind: ParagraphKind::Heading(level.clamp(1, 6)),
            text: text.into(),
        }
    }

    pub fn body(text: impl Into<String>) -> Self {
        Self {
            kind: ParagraphKind::Body,
            text: text.into(),
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.kind, ParagraphKind::Heading(_))
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// An ordered list of paragraphs.
///
/// The text form is one paragraph per line: lines starting with one to six
/// `#` followed by a space are headings, everything else is body text and
/// blank lines are kept as empty paragraphs. Body text starting with `#` or
/// `\` is written with a leading `\`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
}

impl Document {
    pub fn parse(text: &str) -> Self {
        let paragraphs = text.lines().map(parse_line).collect();
        Self { paragraphs }
    }

    /// Every line becomes a body paragraph, `#` included.
    pub fn from_lines(text: &str) -> Self {
        Self {
            paragraphs: text.lines().map(Paragraph::body).collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read document {}", path.display()))?;
        Ok(Self::parse(&raw))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_string())
            .wrap_err_with(|| format!("failed to write document {}", path.display()))
    }

    pub fn push(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }

    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn parse_line(line: &str) -> Paragraph {
    if let Some(escaped) = line.strip_prefix('\\')
        && escaped.starts_with(['#', '\\'])
    {
        return Paragraph::body(escaped.trim_end());
    }

    let hashes = line.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes)
        && let Some(rest) = line[hashes..].strip_prefix(' ')
    {
        return Paragraph::heading(hashes as u8, rest.trim());
    }
    Paragraph::body(line.trim_end())
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for paragraph in &self.paragraphs {
            match paragraph.kind {
                ParagraphKind::Heading(level) => {
                    writeln!(f, "{} {}", "#".repeat(level as usize), paragraph.text)?
                }
                ParagraphKind::Body if paragraph.text.starts_with(['#', '\\']) => {
                    writeln!(f, "\\{}", paragraph.text)?
                }
                ParagraphKind::Body => writeln!(f, "{}", paragraph.text)?,
            }
        }
        Ok(())
    }
}
