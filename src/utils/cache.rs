use eyre::Result;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

pub const CACHE_DIR: &str = ".search-cache";

/// On-disk cache of raw search API responses.
pub struct SearchCache {
    dir: PathBuf,
}

impl SearchCache {
    /// Initializes the cache directory if it doesn't exist
    pub fn init(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.exists() {
            fs::create_dir_all(dir)?;
            info!("created search cache directory: {}", dir.display());
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Generates a cache key from the parameters of one page request
    pub fn key(keywords: &str, location: &str, page: u32, page_size: u32) -> String {
        let raw = format!("{keywords}-{location}-p{page}-n{page_size}").to_lowercase();
        raw.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect()
    }

    fn file(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Retrieves a response body from cache if it exists
    pub fn get(&self, key: &str) -> Option<String> {
        let cache_file = self.file(key);
        if cache_file.exists() {
            match fs::read_to_string(&cache_file) {
                Ok(content) => {
                    debug!("loaded search response from cache: {}", key);
                    return Some(content);
                }
                Err(e) => {
                    debug!("failed to read cached search response {}: {}", key, e);
                }
            }
        }
        None
    }

    /// Stores a response body in cache
    pub fn put(&self, key: &str, content: &str) -> Result<()> {
        fs::write(self.file(key), content)?;
        debug!("cached search response: {}", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_filename_safe() {
        assert_eq!(
            SearchCache::key("Full Stack Developer", "Chicago, IL", 2, 10),
            "full_stack_developer-chicago__il-p2-n10"
        );
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SearchCache::init(dir.path().join("cache")).unwrap();

        assert!(cache.get("k").is_none());
        cache.put("k", "{\"jobs\":[]}").unwrap();
        assert_eq!(cache.get("k").as_deref(), Some("{\"jobs\":[]}"));
    }
}
