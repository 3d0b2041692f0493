use serde::Deserialize;

/// Body of a Careerjet `/search` response.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct SearchResponse {
    pub r#type: Option<String>,
    pub error: Option<String>,
    #[serde(default)]
    pub jobs: Vec<CareerjetJob>,
    pub hits: Option<u64>,
    pub pages: Option<u64>,
}

impl SearchResponse {
    pub fn is_error(&self) -> bool {
        self.r#type.as_deref() == Some("ERROR")
    }
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct CareerjetJob {
    pub title: Option<String>,
    pub company: Option<String>,
    pub locations: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub date: Option<String>,
    pub salary: Option<String>,
    pub site: Option<String>,
}
