use std::path::Path;

use eyre::{Result, eyre};
use log::{debug, info};
use tectonic::latex_to_pdf;

use crate::documents::document::{Document, ParagraphKind};

static TEMPLATE: &str = include_str!("template.tex");

pub struct LatexAssembler<'a> {
    title: &'a str,
    document: &'a Document,
}

impl<'a> LatexAssembler<'a> {
    pub fn new(title: &'a str, document: &'a Document) -> Self {
        Self { title, document }
    }

    pub fn assemble(&self) -> String {
        TEMPLATE
            .replace("<<TITLE>>", &Self::escape_latex(self.title))
            .replace("<<BODY>>", &self.body())
    }

    fn body(&self) -> String {
        let mut out = String::new();

        for paragraph in &self.document.paragraphs {
            let text = Self::escape_latex(paragraph.text.trim());
            match paragraph.kind {
                ParagraphKind::Heading(1) => out.push_str(&format!("\\section*{{{}}}\n", text)),
                ParagraphKind::Heading(2) => {
                    out.push_str(&format!("\\subsection*{{{}}}\n", text))
                }
                ParagraphKind::Heading(_) => {
                    out.push_str(&format!("\\subsubsection*{{{}}}\n", text))
                }
                ParagraphKind::Body if text.is_empty() => out.push_str("\\medskip\n\n"),
                ParagraphKind::Body => {
                    out.push_str(&text);
                    out.push_str("\n\n");
                }
            }
        }

        out
    }

    /// Escapes LaTeX specials; `**bold**` and `` `code` `` spans become
    /// `\textbf` and `\texttt`.
    pub fn escape_latex(text: &str) -> String {
        let mut result = String::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '*' && chars.peek() == Some(&'*') {
                chars.next();
                let mut bold_text = String::new();
                let mut found_end = false;

                while let Some(bc) = chars.next() {
                    if bc == '*' && chars.peek() == Some(&'*') {
                        chars.next();
                        found_end = true;
                        break;
                    }
                    bold_text.push(bc);
                }

                if found_end {
                    result.push_str(&format!("\\textbf{{{}}}", Self::escape_latex(&bold_text)));
                } else {
                    result.push_str("**");
                    result.push_str(&Self::escape_latex(&bold_text));
                }
            } else if c == '`' {
                let mut code_text = String::new();
                let mut found_end = false;

                for bc in chars.by_ref() {
                    if bc == '`' {
                        found_end = true;
                        break;
                    }
                    code_text.push(bc);
                }

                if found_end {
                    result.push_str(&format!("\\texttt{{{}}}", Self::escape_latex(&code_text)));
                } else {
                    result.push_str("\\textasciigrave{}");
                    result.push_str(&Self::escape_latex(&code_text));
                }
            } else {
                result.push_str(&match c {
                    '&' => "\\&".to_string(),
                    '%' => "\\%".to_string(),
                    '$' => "\\$".to_string(),
                    '#' => "\\#".to_string(),
                    '_' => "\\_".to_string(),
                    '{' => "\\{".to_string(),
                    '}' => "\\}".to_string(),
                    '^' => "\\textasciicircum{}".to_string(),
                    '~' => "\\textasciitilde{}".to_string(),
                    '\\' => "\\textbackslash{}".to_string(),
                    _ => c.to_string(),
                });
            }
        }

        result
    }
}

/// Compiles `latex` with tectonic and writes the PDF to `output`.
pub fn compile_pdf(latex: String, output: &Path) -> Result<()> {
    debug!("compiling LaTeX for {}", output.display());

    let pdf = latex_to_pdf(latex).map_err(|e| {
        debug!("tectonic error details: {:#?}", e);
        eyre!(
            "failed to compile LaTeX document {}: {}",
            output.display(),
            e.description()
        )
    })?;

    std::fs::write(output, pdf)?;
    info!("wrote {}", output.display());
    Ok(())
}
