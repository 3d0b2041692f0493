use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use eyre::{Result, WrapErr, eyre};
use log::{debug, info};
use rayon::prelude::*;

use crate::documents::cover_letter::{JobInfo, cover_letter};
use crate::documents::document::Document;
use crate::documents::resume::tailor_resume;
use crate::latex::assembler::{LatexAssembler, compile_pdf};
use crate::nlp::clean::clean_text;
use crate::nlp::keywords::SkillMatcher;
use crate::scraper::job::JobListing;
use crate::tracker::status::Status;
use crate::tracker::store::ApplicationRecord;
use crate::utils::config::Config;
use crate::utils::misc::{ensure_directory, safe_file_component, unique_stem};

/// Output stems for one listing, already unique within the batch.
#[derive(Debug, Clone, PartialEq)]
struct OutputStems {
    resume: String,
    cover_letter: String,
}

/// Everything needed to turn listings into tailored documents.
pub struct Tailor {
    config: Config,
    matcher: SkillMatcher,
    resume: Document,
    cover_template: String,
    date: NaiveDate,
}

impl Tailor {
    pub fn new(config: Config, resume: Document, cover_template: String, date: NaiveDate) -> Self {
        let matcher = SkillMatcher::new(&config.skills.vocabulary, config.skills.case_sensitive);
        Self {
            config,
            matcher,
            resume,
            cover_template,
            date,
        }
    }

    /// Loads both templates. `resume` overrides the configured base resume.
    pub fn from_config(config: Config, resume: Option<&Path>, date: NaiveDate) -> Result<Self> {
        let resume_path = resume.unwrap_or(&config.documents.resume_template);
        if !resume_path.exists() {
            return Err(eyre!(
                "resume template not found at {}; set one with `job-tailor resume set <FILE>`",
                resume_path.display()
            ));
        }
        let resume = Document::load(resume_path)?;

        let cover_path = &config.documents.cover_letter_template;
        let cover_template = std::fs::read_to_string(cover_path).wrap_err_with(|| {
            format!("failed to read cover letter template {}", cover_path.display())
        })?;

        debug!(
            "loaded resume template {} and cover letter template {}",
            resume_path.display(),
            cover_path.display()
        );
        Ok(Self::new(config, resume, cover_template, date))
    }

    /// Stems unique within the batch that also skip files left by earlier
    /// runs, so tracked rows never have their documents overwritten.
    fn stems(&self, listings: &[JobListing]) -> Vec<OutputStems> {
        let mut seen = HashMap::new();
        listings
            .iter()
            .map(|listing| {
                let suffix = format!(
                    "{}_{}",
                    safe_file_component(&listing.company),
                    safe_file_component(&listing.title)
                );
                OutputStems {
                    resume: self.free_stem(&format!("Tailored_Resume_{suffix}"), &mut seen),
                    cover_letter: self.free_stem(&format!("Cover_Letter_{suffix}"), &mut seen),
                }
            })
            .collect()
    }

    fn free_stem(&self, base: &str, seen: &mut HashMap<String, usize>) -> String {
        let dir = &self.config.documents.output_dir;
        loop {
            let stem = unique_stem(base, seen);
            let taken = ["md", "pdf"]
                .iter()
                .any(|ext| dir.join(format!("{stem}.{ext}")).exists());
            if !taken {
                return stem;
            }
            debug!("{} already exists in {}, trying next suffix", stem, dir.display());
        }
    }

    /// Writes the text form and, when enabled, a PDF. Returns the path the
    /// tracker should reference.
    fn write_document(&self, document: &Document, title: &str, stem: &str) -> Result<PathBuf> {
        let dir = &self.config.documents.output_dir;
        let text_path = dir.join(format!("{stem}.md"));
        document.save(&text_path)?;

        if !self.config.documents.pdf {
            return Ok(text_path);
        }

        let pdf_path = dir.join(format!("{stem}.pdf"));
        let latex = LatexAssembler::new(title, document).assemble();
        compile_pdf(latex, &pdf_path)?;
        Ok(pdf_path)
    }

    fn tailor_listing(
        &self,
        listing: &JobListing,
        stems: &OutputStems,
    ) -> Result<ApplicationRecord> {
        let summary = clean_text(&listing.summary);
        let keywords = self.matcher.extract(&summary);
        debug!(
            "{} / {}: matched skills {:?}",
            listing.company, listing.title, keywords
        );

        let job = JobInfo {
            company: listing.company.clone(),
            job_title: listing.title.clone(),
            skills: keywords.clone(),
            ..Default::default()
        };

        let resume = tailor_resume(&self.resume, &keywords);
        let letter = cover_letter(
            &self.cover_template,
            &self.config.applicant,
            &job,
            self.date,
            &self.config.documents.hiring_manager_name,
        )?;

        let resume_path = self.write_document(
            &resume,
            &format!("{} - {}", self.config.applicant.name, listing.title),
            &stems.resume,
        )?;
        let letter_path = self.write_document(
            &letter,
            &format!("Cover Letter - {} - {}", listing.company, listing.title),
            &stems.cover_letter,
        )?;

        Ok(ApplicationRecord {
            company: listing.company.clone(),
            job_title: listing.title.clone(),
            link: listing.link.clone(),
            tailored_resume: resume_path.display().to_string(),
            tailored_cover_letter: letter_path.display().to_string(),
            skills: keywords.join(", "),
            status: Status::NotApplied,
        })
    }

    /// Tailors documents for every listing, in parallel. Records keep the
    /// order of `listings`.
    pub fn prepare(&self, listings: &[JobListing]) -> Result<Vec<ApplicationRecord>> {
        ensure_directory(&self.config.documents.output_dir)?;

        let stems = self.stems(listings);
        let total = listings.len();
        let done = AtomicUsize::new(0);

        let records = listings
            .par_iter()
            .zip(stems.par_iter())
            .map(|(listing, stems)| -> Result<ApplicationRecord> {
                let record = self.tailor_listing(listing, stems)?;
                let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                info!("processing application {}/{}", n, total);
                Ok(record)
            })
            .collect::<Result<Vec<_>>>()?;

        info!("prepared {} applications", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::store::ApplicationStore;
    use crate::utils::config::ConfigInner;
    use std::sync::Arc;

    const COVER: &str = "{your_name}\n{date}\nDear {hiring_manager_name},\n{skills_sentence}\n";

    fn listing(company: &str, title: &str, summary: &str, link: &str) -> JobListing {
        JobListing {
            title: title.to_string(),
            company: company.to_string(),
            location: "Chicago, IL".to_string(),
            summary: summary.to_string(),
            link: link.to_string(),
        }
    }

    fn tailor(output_dir: &Path) -> Tailor {
        let mut inner = ConfigInner::default();
        inner.applicant.name = "Jane Doe".to_string();
        inner.documents.output_dir = output_dir.to_path_buf();
        inner.documents.pdf = false;

        Tailor::new(
            Arc::new(inner),
            Document::parse("# Jane Doe\n## Skills\nPython, SQL"),
            COVER.to_string(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        )
    }

    #[test]
    fn stems_are_safe_and_unique() {
        let listings = vec![
            listing("Acme Corp", "Dev/Ops", "", "a"),
            listing("Acme Corp", "Dev/Ops", "", "b"),
        ];
        let dir = tempfile::tempdir().unwrap();
        let stems = tailor(dir.path()).stems(&listings);

        assert_eq!(stems[0].resume, "Tailored_Resume_Acme_Corp_Dev_Ops");
        assert_eq!(stems[0].cover_letter, "Cover_Letter_Acme_Corp_Dev_Ops");
        assert_eq!(stems[1].resume, "Tailored_Resume_Acme_Corp_Dev_Ops_2");
    }

    #[test]
    fn prepares_records_and_documents() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("tailored_documents");
        let tailor = tailor(&out);

        let records = tailor
            .prepare(&[
                listing(
                    "Acme",
                    "Backend Engineer",
                    "<p>We need <b>Docker</b> &amp; AWS experience.</p>",
                    "https://jobs/1",
                ),
                listing("Globex", "Analyst", "Spreadsheets", "https://jobs/2"),
            ])
            .unwrap();

        assert_eq!(records.len(), 2);
        let acme = &records[0];
        assert_eq!(acme.company, "Acme");
        assert_eq!(acme.skills, "Docker, AWS");
        assert_eq!(acme.status, Status::NotApplied);
        assert!(acme.tailored_resume.ends_with("Tailored_Resume_Acme_Backend_Engineer.md"));

        let resume = std::fs::read_to_string(&acme.tailored_resume).unwrap();
        assert!(resume.contains("Python, SQL, Docker, AWS"));

        let letter = std::fs::read_to_string(&acme.tailored_cover_letter).unwrap();
        assert_eq!(
            letter,
            "Jane Doe\nMarch 05, 2024\nDear Hiring Manager,\n\
             My expertise in Docker and AWS aligns closely with the requirements for the Backend Engineer role.\n"
        );

        assert_eq!(records[1].skills, "");
        assert!(out.is_dir());
    }

    #[test]
    fn later_batches_keep_earlier_documents() {
        let dir = tempfile::tempdir().unwrap();
        let tailor = tailor(dir.path());

        let first = tailor
            .prepare(&[listing("Acme", "Engineer", "Python", "https://jobs/1")])
            .unwrap();
        let second = tailor
            .prepare(&[listing("Acme", "Engineer", "Docker", "https://jobs/2")])
            .unwrap();

        assert!(first[0].tailored_resume.ends_with("Tailored_Resume_Acme_Engineer.md"));
        assert!(second[0].tailored_resume.ends_with("Tailored_Resume_Acme_Engineer_2.md"));
        assert!(second[0].tailored_cover_letter.ends_with("Cover_Letter_Acme_Engineer_2.md"));

        let mut store = ApplicationStore::load(dir.path().join("Applications.csv")).unwrap();
        store.merge(first);
        store.merge(second);
        assert_eq!(store.len(), 2);

        let kept = std::fs::read_to_string(&store.get(0).unwrap().tailored_resume).unwrap();
        assert!(kept.contains("Python, SQL\n"));
        assert!(!kept.contains("Docker"));
        let added = std::fs::read_to_string(&store.get(1).unwrap().tailored_resume).unwrap();
        assert!(added.contains("Python, SQL, Docker"));
    }

    #[test]
    fn missing_resume_template_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut inner = ConfigInner::default();
        inner.documents.resume_template = dir.path().join("nope.md");

        let err = Tailor::from_config(
            Arc::new(inner),
            None,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("resume template not found"));
    }

    #[test]
    fn bad_cover_template_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let mut tailor = tailor(dir.path());
        tailor.cover_template = "{unknown_field}".to_string();

        assert!(tailor.prepare(&[listing("A", "B", "", "l")]).is_err());
    }
}
