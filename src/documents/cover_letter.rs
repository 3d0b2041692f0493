use std::collections::HashMap;

use chrono::NaiveDate;
use eyre::{Result, eyre};

use crate::documents::document::Document;
use crate::utils::config::ApplicantConfig;

/// Job-side values for a cover letter.
#[derive(Debug, Clone, Default)]
pub struct JobInfo {
    pub company: String,
    pub job_title: String,
    pub skills: Vec<String>,
    pub hiring_manager_name: Option<String>,
    pub company_address: Option<String>,
    pub company_city_state_zip: Option<String>,
}

pub fn skills_sentence(skills: &[String], job_title: &str) -> String {
    let tail = format!("aligns closely with the requirements for the {job_title} role.");

    match skills {
        [] => format!("My expertise {tail}"),
        [only] => format!("My expertise in {only} {tail}"),
        [first, second] => format!("My expertise in {first} and {second} {tail}"),
        [init @ .., last] => format!("My expertise in {}, and {last} {tail}", init.join(", ")),
    }
}

/// Fills `{name}` placeholders. `{{` and `}}` produce literal braces.
pub fn render_template(template: &str, fields: &HashMap<&str, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for nc in chars.by_ref() {
                    if nc == '}' {
                        closed = true;
                        break;
                    }
                    name.push(nc);
                }
                if !closed {
                    return Err(eyre!("unclosed placeholder '{{{}' in template", name));
                }

                let value = fields
                    .get(name.trim())
                    .ok_or_else(|| eyre!("unknown placeholder '{{{}}}' in template", name))?;
                out.push_str(value);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(eyre!("single '}}' encountered in template")),
            c => out.push(c),
        }
    }

    Ok(out)
}

pub fn cover_letter_fields<'a>(
    applicant: &ApplicantConfig,
    job: &JobInfo,
    date: NaiveDate,
    default_hiring_manager: &str,
) -> HashMap<&'a str, String> {
    HashMap::from([
        ("your_name", applicant.name.clone()),
        ("your_address", applicant.address.clone()),
        ("your_city_state_zip", applicant.city_state_zip.clone()),
        ("your_email", applicant.email.clone()),
        ("your_phone", applicant.phone.clone()),
        ("date", date.format("%B %d, %Y").to_string()),
        (
            "hiring_manager_name",
            job.hiring_manager_name
                .clone()
                .unwrap_or_else(|| default_hiring_manager.to_string()),
        ),
        ("company_name", job.company.clone()),
        ("company_address", job.company_address.clone().unwrap_or_default()),
        (
            "company_city_state_zip",
            job.company_city_state_zip.clone().unwrap_or_default(),
        ),
        ("job_title", job.job_title.clone()),
        ("skills_sentence", skills_sentence(&job.skills, &job.job_title)),
        ("skills", job.skills.join(", ")),
    ])
}

/// Renders the template and turns every line into a paragraph.
pub fn cover_letter(
    template: &str,
    applicant: &ApplicantConfig,
    job: &JobInfo,
    date: NaiveDate,
    default_hiring_manager: &str,
) -> Result<Document> {
    let fields = cover_letter_fields(applicant, job, date, default_hiring_manager);
    let content = render_template(template, &fields)?;
    Ok(Document::from_lines(content.trim()))
}
