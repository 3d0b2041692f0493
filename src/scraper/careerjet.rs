use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use eyre::{Result, eyre};
use log::{debug, info, warn};
use rand::Rng;
use reqwest::Url;

use crate::models::careerjet::SearchResponse;
use crate::scraper::job::{JobListing, dedupe_by_link};
use crate::utils::cache::SearchCache;
use crate::utils::config::Config;

const AFFILIATE_BASE: &str = "https://www.careerjet.com/xyz/affid";

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub keywords: String,
    pub location: String,
    pub start_page: u32,
    pub end_page: u32,
    pub page_size: u32,
}

impl SearchRequest {
    pub fn validate(&self) -> Result<()> {
        if self.start_page < 1 {
            return Err(eyre!("start page must be at least 1"));
        }
        if self.end_page < self.start_page {
            return Err(eyre!(
                "end page {} is before start page {}",
                self.end_page,
                self.start_page
            ));
        }
        if self.page_size < 1 {
            return Err(eyre!("page size must be at least 1"));
        }
        Ok(())
    }
}

pub struct CareerjetClient {
    config: Config,
    client: reqwest::Client,
    cache: Option<SearchCache>,
}

impl CareerjetClient {
    pub fn new(config: Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.search.timeout_secs))
            .build()?;

        Ok(CareerjetClient {
            config,
            client,
            cache: None,
        })
    }

    pub fn with_cache(mut self, cache: SearchCache) -> Self {
        self.cache = Some(cache);
        self
    }

    fn affid(&self) -> Result<&str> {
        self.config
            .search
            .affid
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| eyre!("careerjet affiliate id not configured in config.toml"))
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default().with_max_times(self.config.search.max_retries as usize)
    }

    /// The API wants the caller's public address alongside every query.
    pub async fn public_ip(&self) -> Result<String> {
        let endpoint = &self.config.search.ip_endpoint;

        let ip = (|| async {
            let response = self.client.get(endpoint).send().await?;
            if !response.status().is_success() {
                return Err(eyre!(
                    "unable to get public IP address: status {}",
                    response.status()
                ));
            }
            Ok::<_, eyre::Report>(response.text().await?)
        })
        .retry(self.backoff())
        .await?;

        let ip = ip.trim().to_string();
        debug!("public IP address: {}", ip);
        Ok(ip)
    }

    pub fn page_url(&self, request: &SearchRequest, page: u32, user_ip: &str) -> Result<Url> {
        let search = &self.config.search;
        let page = page.to_string();
        let page_size = request.page_size.to_string();

        let url = Url::parse_with_params(
            &search.endpoint,
            &[
                ("locale_code", search.locale_code.as_str()),
                ("keywords", request.keywords.as_str()),
                ("location", request.location.as_str()),
                ("page", page.as_str()),
                ("pagesize", page_size.as_str()),
                ("affid", self.affid()?),
                ("user_ip", user_ip),
                ("user_agent", search.user_agent.as_str()),
            ],
        )?;

        Ok(url)
    }

    pub async fn search_page(
        &self,
        request: &SearchRequest,
        page: u32,
        user_ip: &str,
    ) -> Result<Vec<JobListing>> {
        let cache_key =
            SearchCache::key(&request.keywords, &request.location, page, request.page_size);

        if let Some(body) = self.cache.as_ref().and_then(|cache| cache.get(&cache_key)) {
            let response: SearchResponse = serde_json::from_str(&body)?;
            return Ok(listings_from_response(response, self.affid()?));
        }

        let url = self.page_url(request, page, user_ip)?;
        debug!("requesting {}", url);

        let body = (|| async {
            let response = self.client.get(url.clone()).send().await?;
            if !response.status().is_success() {
                return Err(eyre!(
                    "careerjet search failed with status {}",
                    response.status()
                ));
            }
            Ok::<_, eyre::Report>(response.text().await?)
        })
        .retry(self.backoff())
        .await?;

        let response: SearchResponse = serde_json::from_str(&body)?;
        // never cache error responses
        if let Some(cache) = &self.cache
            && !response.is_error()
        {
            cache.put(&cache_key, &body)?;
        }

        Ok(listings_from_response(response, self.affid()?))
    }

    /// Fetches every page of `request`. Failed pages are logged and skipped.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<JobListing>> {
        request.validate()?;
        self.affid()?;

        let user_ip = self.public_ip().await?;
        let mut listings = Vec::new();

        for page in request.start_page..=request.end_page {
            info!("fetching page {}/{}", page, request.end_page);

            match self.search_page(request, page, &user_ip).await {
                Ok(mut found) => {
                    debug!("page {} returned {} listings", page, found.len());
                    listings.append(&mut found);
                }
                Err(e) => warn!("failed to fetch page {}: {}", page, e),
            }

            if page < request.end_page {
                tokio::time::sleep(self.polite_delay()).await;
            }
        }

        let total = listings.len();
        let listings = dedupe_by_link(listings);
        info!(
            "retrieved {} listings ({} duplicates dropped)",
            listings.len(),
            total - listings.len()
        );

        Ok(listings)
    }

    fn polite_delay(&self) -> Duration {
        let search = &self.config.search;
        let (lo, hi) = (
            search.min_delay_ms.min(search.max_delay_ms),
            search.min_delay_ms.max(search.max_delay_ms),
        );
        Duration::from_millis(rand::thread_rng().gen_range(lo..=hi))
    }
}

pub fn affiliate_link(affid: &str, url: &str) -> Result<String> {
    let link = Url::parse_with_params(&format!("{AFFILIATE_BASE}/{affid}"), &[("dest_url", url)])?;
    Ok(link.to_string())
}

pub fn listings_from_response(response: SearchResponse, affid: &str) -> Vec<JobListing> {
    if response.is_error() {
        warn!(
            "careerjet API error: {}",
            response.error.as_deref().unwrap_or("Unknown error")
        );
        return Vec::new();
    }

    response
        .jobs
        .into_iter()
        .map(|job| {
            let link = match job.url.as_deref() {
                Some(url) if !url.is_empty() => affiliate_link(affid, url).unwrap_or_else(|e| {
                    warn!("could not build affiliate link for {}: {}", url, e);
                    url.to_string()
                }),
                _ => String::new(),
            };

            JobListing {
                title: job.title.unwrap_or_default(),
                company: job.company.unwrap_or_default(),
                location: job.locations.unwrap_or_default(),
                summary: job.description.unwrap_or_default(),
                link,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::ConfigInner;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves `handler(request target)` on a local port until the test ends.
    async fn serve(handler: fn(&str) -> (u16, String)) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = vec![0u8; 8192];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).to_string();
                let target = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                let (status, body) = handler(&target);
                let response = format!(
                    "HTTP/1.1 {status} STATUS\r\ncontent-type: application/json\r\n\
                     content-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{addr}")
    }

    fn local_client(base: &str) -> CareerjetClient {
        let mut inner = ConfigInner::default();
        inner.search.affid = Some("abc".to_string());
        inner.search.endpoint = format!("{base}/search");
        inner.search.ip_endpoint = format!("{base}/ip");
        inner.search.min_delay_ms = 0;
        inner.search.max_delay_ms = 0;
        inner.search.max_retries = 0;
        CareerjetClient::new(Arc::new(inner)).unwrap()
    }

    fn jobs_body(jobs: &[(&str, &str)]) -> String {
        let jobs: Vec<serde_json::Value> = jobs
            .iter()
            .map(|(title, url)| {
                serde_json::json!({ "title": title, "company": "Acme", "url": url })
            })
            .collect();
        serde_json::json!({ "type": "JOBS", "jobs": jobs }).to_string()
    }

    fn client_with_affid(affid: Option<&str>) -> CareerjetClient {
        let mut inner = ConfigInner::default();
        inner.search.affid = affid.map(str::to_string);
        CareerjetClient::new(Arc::new(inner)).unwrap()
    }

    fn request() -> SearchRequest {
        SearchRequest {
            keywords: "Full Stack Developer".to_string(),
            location: "Chicago, IL".to_string(),
            start_page: 1,
            end_page: 2,
            page_size: 10,
        }
    }

    #[test]
    fn validates_page_range() {
        assert!(request().validate().is_ok());
        assert!(SearchRequest { start_page: 0, ..request() }.validate().is_err());
        assert!(SearchRequest { start_page: 3, end_page: 2, ..request() }.validate().is_err());
        assert!(SearchRequest { page_size: 0, ..request() }.validate().is_err());
    }

    #[test]
    fn affiliate_link_form_encodes_destination() {
        assert_eq!(
            affiliate_link("abc123", "https://jobs.example.com/view?id=1 2").unwrap(),
            "https://www.careerjet.com/xyz/affid/abc123?dest_url=https%3A%2F%2Fjobs.example.com%2Fview%3Fid%3D1+2"
        );
    }

    #[test]
    fn page_url_carries_all_parameters() {
        let client = client_with_affid(Some("abc123"));
        let url = client.page_url(&request(), 2, "203.0.113.7").unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("public.api.careerjet.net"));
        assert!(pairs.contains(&("keywords".to_string(), "Full Stack Developer".to_string())));
        assert!(pairs.contains(&("location".to_string(), "Chicago, IL".to_string())));
        assert!(pairs.contains(&("page".to_string(), "2".to_string())));
        assert!(pairs.contains(&("pagesize".to_string(), "10".to_string())));
        assert!(pairs.contains(&("affid".to_string(), "abc123".to_string())));
        assert!(pairs.contains(&("user_ip".to_string(), "203.0.113.7".to_string())));
        assert!(pairs.contains(&("locale_code".to_string(), "en_US".to_string())));
    }

    #[test]
    fn missing_affid_is_an_error() {
        let client = client_with_affid(None);
        assert!(client.page_url(&request(), 1, "203.0.113.7").is_err());
        assert!(client_with_affid(Some("  ")).affid().is_err());
    }

    #[test]
    fn converts_jobs_to_listings() {
        let response: SearchResponse = serde_json::from_str(
            r#"{
                "type": "JOBS",
                "jobs": [
                    {
                        "title": "Full Stack Developer",
                        "company": "Acme",
                        "locations": "Chicago, IL",
                        "description": "<b>React</b> and Node.js",
                        "url": "https://jobs.example.com/1"
                    },
                    { "title": "Mystery", "company": null }
                ]
            }"#,
        )
        .unwrap();

        let listings = listings_from_response(response, "abc");
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].company, "Acme");
        assert_eq!(listings[0].location, "Chicago, IL");
        assert!(listings[0].link.starts_with("https://www.careerjet.com/xyz/affid/abc?dest_url="));
        assert_eq!(listings[1].company, "");
        assert_eq!(listings[1].link, "");
    }

    #[test]
    fn error_response_yields_nothing() {
        let response: SearchResponse =
            serde_json::from_str(r#"{"type":"ERROR","error":"bad ip"}"#).unwrap();
        assert!(listings_from_response(response, "abc").is_empty());
    }

    #[test]
    fn delay_stays_in_configured_range() {
        let client = client_with_affid(Some("abc"));
        for _ in 0..20 {
            let delay = client.polite_delay();
            assert!(delay >= Duration::from_millis(1000) && delay <= Duration::from_millis(3000));
        }
    }

    #[tokio::test]
    async fn cached_page_skips_network() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SearchCache::init(dir.path()).unwrap();
        let key = SearchCache::key("Full Stack Developer", "Chicago, IL", 1, 10);
        cache
            .put(
                &key,
                r#"{"type":"JOBS","jobs":[{"title":"Dev","company":"Acme","url":"https://x/1"}]}"#,
            )
            .unwrap();

        let client = client_with_affid(Some("abc")).with_cache(cache);
        let listings = client.search_page(&request(), 1, "unused").await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title, "Dev");
    }

    #[tokio::test]
    async fn search_skips_failed_pages_and_drops_duplicate_links() {
        let base = serve(|target| {
            if target.starts_with("/ip") {
                (200, "203.0.113.7\n".to_string())
            } else if target.contains("&page=1&") {
                (200, jobs_body(&[("First", "https://x/1"), ("Second", "https://x/2")]))
            } else if target.contains("&page=2&") {
                (500, "oops".to_string())
            } else {
                (200, jobs_body(&[("Second again", "https://x/2"), ("Third", "https://x/3")]))
            }
        })
        .await;

        let client = local_client(&base);
        let listings = client
            .search(&SearchRequest { end_page: 3, ..request() })
            .await
            .unwrap();

        let titles: Vec<&str> = listings.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn failed_ip_lookup_aborts_search() {
        let base = serve(|target| {
            if target.starts_with("/ip") {
                (503, String::new())
            } else {
                (200, jobs_body(&[("First", "https://x/1")]))
            }
        })
        .await;

        assert!(local_client(&base).search(&request()).await.is_err());
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let base = serve(|_| (502, "bad gateway".to_string())).await;
        let client = local_client(&base);
        assert!(client.search_page(&request(), 1, "203.0.113.7").await.is_err());
    }

    #[tokio::test]
    async fn error_responses_are_not_cached() {
        let base = serve(|_| (200, r#"{"type":"ERROR","error":"bad ip"}"#.to_string())).await;
        let dir = tempfile::tempdir().unwrap();
        let key = SearchCache::key("Full Stack Developer", "Chicago, IL", 1, 10);

        let client = local_client(&base).with_cache(SearchCache::init(dir.path()).unwrap());
        let listings = client.search_page(&request(), 1, "203.0.113.7").await.unwrap();

        assert!(listings.is_empty());
        assert!(SearchCache::init(dir.path()).unwrap().get(&key).is_none());
    }

    #[tokio::test]
    async fn successful_pages_are_cached() {
        let base = serve(|_| (200, jobs_body(&[("First", "https://x/1")]))).await;
        let dir = tempfile::tempdir().unwrap();
        let key = SearchCache::key("Full Stack Developer", "Chicago, IL", 1, 10);

        let client = local_client(&base).with_cache(SearchCache::init(dir.path()).unwrap());
        assert_eq!(client.search_page(&request(), 1, "203.0.113.7").await.unwrap().len(), 1);

        let cached = SearchCache::init(dir.path()).unwrap().get(&key).unwrap();
        assert!(cached.contains("\"First\""));
    }
}
