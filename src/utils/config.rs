use std::path::{Path, PathBuf};
use std::sync::Arc;

use easy_config_store::ConfigStore;
use eyre::{Result, WrapErr};
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub type Config = Arc<ConfigInner>;

pub fn config(path: PathBuf) -> Result<Config> {
    let config_store = ConfigStore::<ConfigInner>::read(path, "config".to_string())?;
    let inner = (*config_store).clone();

    info!("config parsing successful");
    debug!("loaded configuration:\n{}", toml::to_string_pretty(&inner)?);

    Ok(Arc::new(inner))
}

/// Points the base resume at `resume`, rewriting the config file in place.
pub fn set_resume_template(path: &Path, resume: PathBuf) -> Result<ConfigInner> {
    let raw = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
    let mut inner: ConfigInner = toml::from_str(&raw)?;
    inner.documents.resume_template = resume;

    std::fs::write(path, toml::to_string_pretty(&inner)?)
        .wrap_err_with(|| format!("failed to write config file {}", path.display()))?;
    info!(
        "resume template updated to {}",
        inner.documents.resume_template.display()
    );

    Ok(inner)
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct ConfigInner {
    pub applicant: ApplicantConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub skills: SkillsConfig,
    #[serde(default)]
    pub documents: DocumentsConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct ApplicantConfig {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city_state_zip: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub websites: Vec<String>,
    #[serde(default)]
    pub education: String,
    /// `Label: url` entries, e.g. `GitHub: https://github.com/me`.
    #[serde(default)]
    pub social_profiles: Vec<String>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_ip_endpoint")]
    pub ip_endpoint: String,
    #[serde(default = "default_locale_code")]
    pub locale_code: String,
    pub affid: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_keywords")]
    pub keywords: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_start_page")]
    pub start_page: u32,
    #[serde(default = "default_end_page")]
    pub end_page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default)]
    pub use_cache: bool,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct SkillsConfig {
    #[serde(default = "default_vocabulary")]
    pub vocabulary: Vec<String>,
    /// When false, `rest` in a description also matches `REST`.
    #[serde(default = "default_case_sensitive")]
    pub case_sensitive: bool,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct DocumentsConfig {
    #[serde(default = "default_resume_template")]
    pub resume_template: PathBuf,
    #[serde(default = "default_cover_letter_template")]
    pub cover_letter_template: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_pdf")]
    pub pdf: bool,
    #[serde(default = "default_hiring_manager")]
    pub hiring_manager_name: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct TrackerConfig {
    #[serde(default = "default_tracker_path")]
    pub path: PathBuf,
}

fn default_search_endpoint() -> String {
    "http://public.api.careerjet.net/search".to_string()
}

fn default_ip_endpoint() -> String {
    "https://api.ipify.org".to_string()
}

fn default_locale_code() -> String {
    "en_US".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string()
}

fn default_keywords() -> String {
    "Full Stack Developer".to_string()
}

fn default_location() -> String {
    "Chicago, IL".to_string()
}

fn default_start_page() -> u32 {
    1
}

fn default_end_page() -> u32 {
    2
}

fn default_page_size() -> u32 {
    10
}

fn default_min_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    3000
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

pub fn default_vocabulary() -> Vec<String> {
    [
        "Python",
        "JavaScript",
        "TypeScript",
        "Node.js",
        "React",
        "Django",
        "AWS",
        "GCP",
        "Azure",
        "Docker",
        "Kubernetes",
        "Terraform",
        "CI/CD",
        "DevOps",
        "Microservices",
        "PostgreSQL",
        "Redis",
        "AI",
        "Machine Learning",
        "REST",
        "RESTful",
        "APIs",
        "Agile",
        "Scrum",
        "Kanban",
        "Git",
        "Linux",
        "NoSQL",
        "Automation",
        "Cloud",
        "Infrastructure",
        "IaC",
        "Full Stack",
        "Backend",
        "Frontend",
        "Leadership",
        "Mentoring",
        "Team Lead",
        "Software Development",
        "System Architecture",
        "CI/CD Pipelines",
        "SQL",
        "Jenkins",
        "Ansible",
        "Puppet",
        "Chef",
        "Flask",
        "FastAPI",
        "Express.js",
        "MongoDB",
        "GraphQL",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_case_sensitive() -> bool {
    true
}

fn default_resume_template() -> PathBuf {
    PathBuf::from("templates/resume.example.md")
}

fn default_cover_letter_template() -> PathBuf {
    PathBuf::from("templates/Cover_Letter_Template.txt")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("tailored_documents")
}

fn default_pdf() -> bool {
    true
}

fn default_hiring_manager() -> String {
    "Hiring Manager".to_string()
}

fn default_tracker_path() -> PathBuf {
    PathBuf::from("Applications.csv")
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            ip_endpoint: default_ip_endpoint(),
            locale_code: default_locale_code(),
            affid: None,
            user_agent: default_user_agent(),
            keywords: default_keywords(),
            location: default_location(),
            start_page: default_start_page(),
            end_page: default_end_page(),
            page_size: default_page_size(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            use_cache: false,
        }
    }
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            vocabulary: default_vocabulary(),
            case_sensitive: default_case_sensitive(),
        }
    }
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            resume_template: default_resume_template(),
            cover_letter_template: default_cover_letter_template(),
            output_dir: default_output_dir(),
            pdf: default_pdf(),
            hiring_manager_name: default_hiring_manager(),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            path: default_tracker_path(),
        }
    }
}

impl Default for ConfigInner {
    fn default() -> Self {
        let cfg = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.default.toml",));

        toml::from_str(cfg).unwrap() // should be okay
    }
}
