use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use eyre::{Result, WrapErr, eyre};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::tracker::status::Status;

/// One tracked application, one CSV row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    #[serde(rename = "Company", default)]
    pub company: String,
    #[serde(rename = "Job Title", default)]
    pub job_title: String,
    #[serde(rename = "Link", default)]
    pub link: String,
    #[serde(rename = "Tailored Resume", default)]
    pub tailored_resume: String,
    #[serde(rename = "Tailored Cover Letter", default)]
    pub tailored_cover_letter: String,
    #[serde(rename = "Skills", default)]
    pub skills: String,
    #[serde(rename = "Status", default)]
    pub status: Status,
}

impl ApplicationRecord {
    pub fn skill_list(&self) -> Vec<String> {
        split_skills(&self.skills)
    }

    /// Sorted union of this job's skills with `base`.
    pub fn combined_skills(&self, base: &[String]) -> Vec<String> {
        self.skill_list()
            .into_iter()
            .chain(base.iter().cloned())
            .filter(|s| !s.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

pub fn split_skills(skills: &str) -> Vec<String> {
    skills
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Company,
    #[value(name = "title")]
    JobTitle,
    Status,
}

/// CSV-backed list of applications. Ids are row positions in the file.
#[derive(Debug)]
pub struct ApplicationStore {
    path: PathBuf,
    records: Vec<ApplicationRecord>,
}

impl ApplicationStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            info!("no tracker at {}, starting empty", path.display());
            return Ok(Self {
                path,
                records: Vec::new(),
            });
        }

        let raw = std::fs::read_to_string(&path)
            .wrap_err_with(|| format!("failed to read tracker {}", path.display()))?;
        if raw.trim().is_empty() {
            return Ok(Self {
                path,
                records: Vec::new(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(raw.as_bytes());
        let records = reader
            .deserialize()
            .collect::<Result<Vec<ApplicationRecord>, csv::Error>>()
            .wrap_err_with(|| format!("failed to parse tracker {}", path.display()))?;

        debug!("loaded {} applications from {}", records.len(), path.display());
        Ok(Self { path, records })
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(&self.path)
            .wrap_err_with(|| format!("failed to open tracker {}", self.path.display()))?;
        if self.records.is_empty() {
            // serde only emits headers alongside the first row
            writer.write_record([
                "Company",
                "Job Title",
                "Link",
                "Tailored Resume",
                "Tailored Cover Letter",
                "Skills",
                "Status",
            ])?;
        }
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        debug!("saved {} applications to {}", self.records.len(), self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: usize) -> Result<&ApplicationRecord> {
        self.records.get(id).ok_or_else(|| {
            eyre!(
                "no application with id {} ({} tracked)",
                id,
                self.records.len()
            )
        })
    }

    /// Records with their ids, ordered by `column`. The sort is stable.
    pub fn sorted(&self, column: SortColumn, ascending: bool) -> Vec<(usize, &ApplicationRecord)> {
        let mut rows: Vec<(usize, &ApplicationRecord)> = self.records.iter().enumerate().collect();

        rows.sort_by(|(_, a), (_, b)| {
            let ordering = match column {
                SortColumn::Company => a.company.cmp(&b.company),
                SortColumn::JobTitle => a.job_title.cmp(&b.job_title),
                SortColumn::Status => a.status.sort_order().cmp(&b.status.sort_order()),
            };
            if ascending { ordering } else { ordering.reverse() }
        });

        rows
    }

    /// Updates one row and persists the whole file.
    pub fn set_status(&mut self, id: usize, status: Status) -> Result<&ApplicationRecord> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| eyre!("no application with id {} ({} tracked)", id, len))?;

        info!(
            "changing status of {} / {} from {} to {}",
            record.company, record.job_title, record.status, status
        );
        record.status = status;

        self.save()?;
        self.get(id)
    }

    /// Appends records whose link is not tracked yet. Returns how many were added.
    pub fn merge(&mut self, incoming: Vec<ApplicationRecord>) -> usize {
        let mut known: HashSet<String> = self
            .records
            .iter()
            .filter(|r| !r.link.is_empty())
            .map(|r| r.link.clone())
            .collect();

        let before = self.records.len();
        for record in incoming {
            if !record.link.is_empty() && !known.insert(record.link.clone()) {
                debug!("already tracking {}, skipping", record.link);
                continue;
            }
            self.records.push(record);
        }

        self.records.len() - before
    }

    pub fn replace(&mut self, records: Vec<ApplicationRecord>) {
        self.records = records;
    }
}
