use std::path::Path;

use eyre::{Result, eyre};
use log::info;
use serde::{Deserialize, Serialize};

/// One job listing as returned by a search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub title: String,
    pub company: String,
    pub location: String,
    /// Raw description, possibly HTML.
    pub summary: String,
    pub link: String,
}

/// Keeps the first listing for every non-empty link.
pub fn dedupe_by_link(listings: Vec<JobListing>) -> Vec<JobListing> {
    let mut seen = std::collections::HashSet::new();
    listings
        .into_iter()
        .filter(|listing| listing.link.is_empty() || seen.insert(listing.link.clone()))
        .collect()
}

pub struct JobScraper;

impl JobScraper {
    pub async fn from_url(url: &str) -> Result<String> {
        info!("fetching job description from: {}", url);

        let client = reqwest::Client::new();
        let response = client
            .get(url)
            .header("User-Agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(eyre!(
                "job posting request failed with status {}",
                response.status()
            ));
        }

        let html = response.text().await?;

        info!("successfully fetched job description html");

        Ok(html)
    }

    pub async fn from_file(path: &Path) -> Result<String> {
        info!("reading job description from file: {}", path.display());

        tokio::fs::read_to_string(path).await.map_err(Into::into)
    }
}
