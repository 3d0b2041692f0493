mod documents;
mod latex;
mod models;
mod nlp;
mod pipeline;
mod scraper;
mod tracker;
mod utils;

use std::path::{Path, PathBuf};

use chrono::Local;
use clap::Parser;
use colored::{ColoredString, Colorize};
use eyre::{Result, eyre};
use log::{debug, info, warn};

use crate::documents::document::Document;
use crate::nlp::clean::clean_text;
use crate::nlp::keywords::SkillMatcher;
use crate::pipeline::prepare::Tailor;
use crate::scraper::careerjet::{CareerjetClient, SearchRequest};
use crate::scraper::job::{JobListing, JobScraper};
use crate::tracker::status::Status;
use crate::tracker::store::{ApplicationRecord, ApplicationStore, SortColumn};
use crate::utils::cache::{CACHE_DIR, SearchCache};
use crate::utils::cli::{Args, Command, DocumentKind, ResumeAction, SearchArgs};
use crate::utils::config::{Config, config, set_resume_template};
use crate::utils::log::Logger;
use crate::utils::misc::strip_url;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    Logger::init(args.verbosity);

    info!(
        "starting job-tailor {}",
        format!("v{}", env!("CARGO_PKG_VERSION")).magenta()
    );

    let config: Config = config(args.config.clone())?;

    match args.command {
        Command::Search(search) => search_jobs(&config, &search).await,
        Command::Generate {
            search,
            resume,
            replace,
        } => generate(config, &search, resume, replace).await,
        Command::Tailor {
            job_url,
            job_file,
            title,
            company,
            link,
        } => {
            let raw = match (&job_url, &job_file) {
                (Some(url), _) => JobScraper::from_url(url).await?,
                (None, Some(file)) => JobScraper::from_file(file).await?,
                (None, None) => return Err(eyre!("provide --job-url or --job-file")),
            };
            let listing = JobListing {
                title,
                company,
                location: String::new(),
                summary: raw,
                link: link.or(job_url).unwrap_or_default(),
            };
            let tailor = Tailor::from_config(config.clone(), None, Local::now().date_naive())?;
            record_applications(&config, tailor, vec![listing], false).await
        }
        Command::List { sort, desc } => list(&config, sort, !desc),
        Command::Show { id } => show(&config, id),
        Command::Status { id, status } => update_status(&config, id, status),
        Command::Open { id } => open_link(&config, id),
        Command::Preview { id, document } => preview(&config, id, document),
        Command::Skills { id, base, combined } => skills(&config, id, base, combined),
        Command::Profile => profile(&config),
        Command::Resume { action } => resume(&args.config, &config, action),
    }
}

fn search_request(config: &Config, args: &SearchArgs) -> SearchRequest {
    let search = &config.search;
    SearchRequest {
        keywords: args.keywords.clone().unwrap_or_else(|| search.keywords.clone()),
        location: args.location.clone().unwrap_or_else(|| search.location.clone()),
        start_page: args.start_page.unwrap_or(search.start_page),
        end_page: args.end_page.unwrap_or(search.end_page),
        page_size: args.page_size.unwrap_or(search.page_size),
    }
}

async fn fetch_listings(config: &Config, args: &SearchArgs) -> Result<Vec<JobListing>> {
    let request = search_request(config, args);
    request.validate()?;
    info!(
        "searching for '{}' in '{}' (pages {}-{}, {} per page)",
        request.keywords, request.location, request.start_page, request.end_page, request.page_size
    );

    let mut client = CareerjetClient::new(config.clone())?;
    if args.cache || config.search.use_cache {
        client = client.with_cache(SearchCache::init(CACHE_DIR)?);
    }

    client.search(&request).await
}

async fn search_jobs(config: &Config, args: &SearchArgs) -> Result<()> {
    let listings = fetch_listings(config, args).await?;
    if listings.is_empty() {
        warn!("no jobs were found with the given parameters");
        return Ok(());
    }

    for (n, listing) in listings.iter().enumerate() {
        println!(
            "{}. {} {} {}",
            (n + 1).to_string().bold(),
            listing.title.bold(),
            "@".dimmed(),
            listing.company.cyan()
        );
        if !listing.location.is_empty() {
            println!("   {}", listing.location);
        }
        let summary = clean_text(&listing.summary);
        if !summary.is_empty() {
            let preview: String = summary.chars().take(160).collect();
            println!("   {}", preview.dimmed());
        }
        println!("   {}\n", listing.link.blue());
    }

    info!("total jobs retrieved: {}", listings.len());
    Ok(())
}

async fn generate(
    config: Config,
    args: &SearchArgs,
    resume: Option<PathBuf>,
    replace: bool,
) -> Result<()> {
    // fail on a missing template before spending any requests
    let tailor = Tailor::from_config(config.clone(), resume.as_deref(), Local::now().date_naive())?;

    let listings = fetch_listings(&config, args).await?;
    if listings.is_empty() {
        warn!("no jobs were found with the given parameters");
        return Ok(());
    }

    record_applications(&config, tailor, listings, replace).await
}

async fn record_applications(
    config: &Config,
    tailor: Tailor,
    listings: Vec<JobListing>,
    replace: bool,
) -> Result<()> {
    info!("preparing application materials for {} jobs", listings.len());
    let records = tokio::task::spawn_blocking(move || tailor.prepare(&listings)).await??;
    let prepared = records.len();

    let mut store = ApplicationStore::load(&config.tracker.path)?;
    let added = if replace {
        store.replace(records);
        prepared
    } else {
        store.merge(records)
    };
    store.save()?;

    info!(
        "generated applications for {} jobs, {} new in {}",
        prepared,
        added,
        store.path().display()
    );
    Ok(())
}

fn status_colored(status: Status) -> ColoredString {
    let label = status.label();
    match status {
        Status::NotApplied => label.normal(),
        Status::Applied => label.blue(),
        Status::InterviewScheduled | Status::Interviewed => label.cyan(),
        Status::OfferReceived | Status::AcceptedOffer => label.green(),
        Status::Rejected => label.red(),
        Status::NoResponse => label.dimmed(),
    }
}

fn list(config: &Config, sort: SortColumn, ascending: bool) -> Result<()> {
    let store = ApplicationStore::load(&config.tracker.path)?;
    if store.is_empty() {
        println!("{}", "No applications tracked yet.".yellow());
        return Ok(());
    }

    println!(
        "{:>4}  {:<28}  {:<36}  {}",
        "#".bold(),
        "Company".bold(),
        "Job Title".bold(),
        "Status".bold()
    );
    for (id, app) in store.sorted(sort, ascending) {
        println!(
            "{:>4}  {:<28}  {:<36}  {}",
            id,
            truncate(&app.company, 28),
            truncate(&app.job_title, 36),
            status_colored(app.status)
        );
    }
    println!("\n{} applications in {}", store.len(), store.path().display());

    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn print_field(label: &str, value: &str) {
    let value = if value.is_empty() { "-" } else { value };
    println!("{} {}", format!("{label}:").bold(), value);
}

fn show(config: &Config, id: usize) -> Result<()> {
    let store = ApplicationStore::load(&config.tracker.path)?;
    let app = store.get(id)?;

    print_field("Company", &app.company);
    print_field("Job Title", &app.job_title);
    println!("{} {}", "Status:".bold(), status_colored(app.status));
    print_field("Link", &app.link);
    print_field("Tailored Resume", &app.tailored_resume);
    print_field("Tailored Cover Letter", &app.tailored_cover_letter);
    print_field("Job-Specific Skills", &app.skills);

    Ok(())
}

fn update_status(config: &Config, id: usize, status: Status) -> Result<()> {
    let mut store = ApplicationStore::load(&config.tracker.path)?;
    let app = store.set_status(id, status)?;

    println!(
        "Application status for {} / {} updated to '{}'.",
        app.company.bold(),
        app.job_title.bold(),
        status_colored(app.status)
    );
    Ok(())
}

fn open_link(config: &Config, id: usize) -> Result<()> {
    let store = ApplicationStore::load(&config.tracker.path)?;
    let app = store.get(id)?;

    if app.link.is_empty() {
        warn!("no link available for this application");
        return Ok(());
    }

    info!("opening URL: {}", app.link);
    open_in_browser(&app.link)
}

fn open_in_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    let mut cmd = std::process::Command::new("open");
    #[cfg(target_os = "windows")]
    let mut cmd = {
        let mut cmd = std::process::Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    };
    #[cfg(all(unix, not(target_os = "macos")))]
    let mut cmd = std::process::Command::new("xdg-open");

    cmd.arg(url)
        .spawn()
        .map_err(|e| eyre!("failed to launch browser for {}: {}", url, e))?;
    Ok(())
}

/// PDFs are previewed through their text form written alongside them.
fn preview_source(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some("pdf") => path.with_extension("md"),
        _ => path.to_path_buf(),
    }
}

fn preview(config: &Config, id: usize, kind: DocumentKind) -> Result<()> {
    let store = ApplicationStore::load(&config.tracker.path)?;
    let app = store.get(id)?;

    let (title, path) = match kind {
        DocumentKind::Resume => ("Resume Preview", &app.tailored_resume),
        DocumentKind::CoverLetter => ("Cover Letter Preview", &app.tailored_cover_letter),
    };
    if path.is_empty() {
        return Err(eyre!("no {} recorded for this application", title.to_lowercase()));
    }

    let source = preview_source(Path::new(path));
    if !source.exists() {
        return Err(eyre!("file not found: {}", source.display()));
    }
    debug!("previewing {}", source.display());

    let document = Document::load(&source)?;
    println!("{}\n", format!("=== {title} ===").cyan().bold());
    println!("{}", document.plain_text());
    Ok(())
}

fn skills(config: &Config, id: Option<usize>, base: bool, combined: bool) -> Result<()> {
    let matcher = SkillMatcher::new(&config.skills.vocabulary, config.skills.case_sensitive);
    let vocabulary = matcher.vocabulary();
    if base {
        println!("{}", vocabulary.join(", "));
        return Ok(());
    }

    let id = id.ok_or_else(|| eyre!("an application id is required unless --base is given"))?;
    let store = ApplicationStore::load(&config.tracker.path)?;
    let app: &ApplicationRecord = store.get(id)?;

    if combined {
        println!("{}", app.combined_skills(vocabulary).join(", "));
    } else {
        println!("{}", app.skill_list().join(", "));
    }
    Ok(())
}

fn profile(config: &Config) -> Result<()> {
    let applicant = &config.applicant;

    println!("{}", "Websites:".bold());
    for site in &applicant.websites {
        println!("  {} {}", strip_url(site).cyan(), site.dimmed());
    }

    print_field("Education", &applicant.education);

    println!("{}", "Social Profiles:".bold());
    for entry in &applicant.social_profiles {
        match entry.split_once(": ") {
            Some((label, url)) => println!("  {}: {}", label, url.cyan()),
            None => println!("  {}", entry.cyan()),
        }
    }

    Ok(())
}

fn resume(config_path: &Path, config: &Config, action: ResumeAction) -> Result<()> {
    match action {
        ResumeAction::Set { path } => {
            if !path.exists() {
                return Err(eyre!("resume not found at {}", path.display()));
            }
            set_resume_template(config_path, path)?;
            Ok(())
        }
        ResumeAction::Show => {
            let path = &config.documents.resume_template;
            if !path.exists() {
                return Err(eyre!("resume template not found at {}", path.display()));
            }
            let document = Document::load(path)?;
            println!("{}", document);
            Ok(())
        }
        ResumeAction::Edit => {
            let path = &config.documents.resume_template;
            if !path.exists() {
                return Err(eyre!("resume template not found at {}", path.display()));
            }
            edit_file(path)?;

            let document = Document::load(path)?;
            info!(
                "resume template {} saved with {} paragraphs",
                path.display(),
                document.paragraphs.len()
            );
            Ok(())
        }
    }
}

/// `$VISUAL`, then `$EDITOR`, then the platform's stock editor.
fn editor_command(visual: Option<String>, editor: Option<String>) -> String {
    visual
        .into_iter()
        .chain(editor)
        .map(|e| e.trim().to_string())
        .find(|e| !e.is_empty())
        .unwrap_or_else(|| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "vi".to_string()
            }
        })
}

fn edit_file(path: &Path) -> Result<()> {
    let command = editor_command(std::env::var("VISUAL").ok(), std::env::var("EDITOR").ok());
    // editors such as `code --wait` carry their own flags
    let mut parts = command.split_whitespace();
    let program = parts.next().ok_or_else(|| eyre!("no editor configured"))?;

    info!("opening {} with {}", path.display(), command);
    let status = std::process::Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .map_err(|e| eyre!("failed to launch editor '{}': {}", command, e))?;

    if !status.success() {
        return Err(eyre!("editor '{}' exited with {}", command, status));
    }
    Ok(())
}
