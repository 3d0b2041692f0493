use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use crate::tracker::status::Status;
use crate::tracker::store::SortColumn;

#[derive(Parser, Debug)]
#[command(name = "job-tailor")]
#[command(about = "Search job listings, tailor resumes and cover letters, and track applications", long_about = None)]
pub struct Args {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml", global = true)]
    pub config: PathBuf,

    /// Sets the logger's verbosity level
    #[arg(short, long, value_name = "VERBOSITY", default_value_t = LevelFilter::Info, global = true)]
    pub verbosity: LevelFilter,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SearchArgs {
    /// Job keywords (defaults to the configured search keywords)
    #[arg(short, long)]
    pub keywords: Option<String>,

    /// Job location (defaults to the configured location)
    #[arg(short, long)]
    pub location: Option<String>,

    /// First result page to fetch
    #[arg(long)]
    pub start_page: Option<u32>,

    /// Last result page to fetch (inclusive)
    #[arg(long)]
    pub end_page: Option<u32>,

    /// Listings per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Reuse cached search responses when available
    #[arg(long)]
    pub cache: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search for jobs and print the listings
    Search(SearchArgs),

    /// Search for jobs, tailor documents for each listing and record them
    Generate {
        #[command(flatten)]
        search: SearchArgs,

        /// Base resume to tailor (overrides the configured template)
        #[arg(long, value_name = "FILE")]
        resume: Option<PathBuf>,

        /// Overwrite the tracker instead of merging into it
        #[arg(long)]
        replace: bool,
    },

    /// Tailor documents for a single posting
    Tailor {
        /// URL to the job posting
        #[arg(short, long, value_name = "URL", conflicts_with = "job_file")]
        job_url: Option<String>,

        /// Path to file containing the job description
        #[arg(long, value_name = "FILE")]
        job_file: Option<PathBuf>,

        /// Job title
        #[arg(short, long)]
        title: String,

        /// Hiring company
        #[arg(long)]
        company: String,

        /// Link recorded in the tracker (defaults to --job-url)
        #[arg(long)]
        link: Option<String>,
    },

    /// List tracked applications
    List {
        /// Column to sort by
        #[arg(short, long, value_enum, default_value_t = SortColumn::Status)]
        sort: SortColumn,

        /// Sort in descending order
        #[arg(long)]
        desc: bool,
    },

    /// Show one application in detail
    Show {
        /// Application id, as printed by `list`
        id: usize,
    },

    /// Update the status of an application
    Status {
        /// Application id, as printed by `list`
        id: usize,

        /// New status, e.g. "applied" or "interview-scheduled"
        status: Status,
    },

    /// Open an application's job link in the browser
    Open {
        /// Application id, as printed by `list`
        id: usize,
    },

    /// Print a tailored document
    Preview {
        /// Application id, as printed by `list`
        id: usize,

        #[arg(value_enum)]
        document: DocumentKind,
    },

    /// Print job-specific, base or combined skills
    Skills {
        /// Application id; required unless --base is given
        id: Option<usize>,

        /// Print the base skill vocabulary
        #[arg(long, conflicts_with = "combined")]
        base: bool,

        /// Print the sorted union of job and base skills
        #[arg(long)]
        combined: bool,
    },

    /// Print websites, education and social profiles
    Profile,

    /// Manage the base resume template
    Resume {
        #[command(subcommand)]
        action: ResumeAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ResumeAction {
    /// Use FILE as the base resume for future tailoring
    Set {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
    /// Print the base resume
    Show,
    /// Open the base resume in $VISUAL or $EDITOR
    Edit,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}
