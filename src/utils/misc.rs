use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Removes the scheme, a leading `www.` and any trailing slash from a URL.
pub fn strip_url(url: &str) -> String {
    url.trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.")
        .trim_end_matches('/')
        .to_string()
}

/// Makes `name` usable as one filename component.
pub fn safe_file_component(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Hands out `stem`, `stem_2`, `stem_3`, ... on repeated calls.
pub fn unique_stem(stem: &str, seen: &mut HashMap<String, usize>) -> String {
    let count = seen.entry(stem.to_string()).or_insert(0);
    *count += 1;

    match *count {
        1 => stem.to_string(),
        n => format!("{stem}_{n}"),
    }
}

pub fn ensure_directory(dir: &Path) -> eyre::Result<PathBuf> {
    if dir.exists() && !dir.is_dir() {
        eyre::bail!("path exists but is not a directory: {}", dir.display());
    }
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        log::info!("created directory: {}", dir.display());
    }
    Ok(dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scheme_and_slash() {
        assert_eq!(
            strip_url("https://www.linkedin.com/in/jane-doe/"),
            "linkedin.com/in/jane-doe"
        );
        assert_eq!(strip_url("http://github.com/jdoe"), "github.com/jdoe");
    }

    #[test]
    fn replaces_path_hostile_characters() {
        assert_eq!(
            safe_file_component("Acme Corp/Labs"),
            "Acme_Corp_Labs"
        );
        assert_eq!(
            safe_file_component("Dev: Front|Back?"),
            "Dev__Front_Back_"
        );
    }

    #[test]
    fn unique_stem_suffixes_repeats() {
        let mut seen = HashMap::new();
        assert_eq!(unique_stem("Cover_Letter_Acme_Dev", &mut seen), "Cover_Letter_Acme_Dev");
        assert_eq!(unique_stem("Cover_Letter_Acme_Dev", &mut seen), "Cover_Letter_Acme_Dev_2");
        assert_eq!(unique_stem("Cover_Letter_Other_Dev", &mut seen), "Cover_Letter_Other_Dev");
        assert_eq!(unique_stem("Cover_Letter_Acme_Dev", &mut seen), "Cover_Letter_Acme_Dev_3");
    }

    #[test]
    fn ensure_directory_rejects_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        std::fs::write(&file, "x").unwrap();

        assert!(ensure_directory(&file).is_err());
        let nested = dir.path().join("a/b");
        assert_eq!(ensure_directory(&nested).unwrap(), nested);
        assert!(nested.is_dir());
    }
}
