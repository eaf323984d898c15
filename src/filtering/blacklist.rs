// Tracker blacklist: hostnames of known tracking domains
//
// Built once by the process bootstrap and shared read-only for the
// lifetime of the process. Reloading means building a new value.
use ahash::{HashSet, HashSetExt};
use std::path::Path;

use crate::error::{Result, ZeroError};

/// Immutable set of blacklisted tracker hostnames
#[derive(Debug, Clone, Default)]
pub struct TrackerBlacklist {
    domains: HashSet<String>,
}

impl TrackerBlacklist {
    /// Load a line-delimited hostname list
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ZeroError::Blacklist {
            path: path.to_path_buf(),
            source: e,
        })?;

        let blacklist = Self::from_lines(content.lines());
        tracing::info!(
            "Loaded {} tracker domains from {}",
            blacklist.len(),
            path.display()
        );
        Ok(blacklist)
    }

    /// Build from individual lines; blank lines and `#` comments are skipped
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut domains = HashSet::new();
        for line in lines {
            let line = line.as_ref().trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            domains.insert(line.to_ascii_lowercase());
        }
        Self { domains }
    }

    /// Whether a hostname is blacklisted (exact match, case-insensitive)
    pub fn contains(&self, host: &str) -> bool {
        if host.bytes().any(|b| b.is_ascii_uppercase()) {
            self.domains.contains(&host.to_ascii_lowercase())
        } else {
            self.domains.contains(host)
        }
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_lines_skips_blanks_and_comments() {
        let blacklist = TrackerBlacklist::from_lines([
            "# analytics",
            "google-analytics.com",
            "",
            "  DoubleClick.net  ",
        ]);

        assert_eq!(blacklist.len(), 2);
        assert!(blacklist.contains("google-analytics.com"));
        assert!(blacklist.contains("doubleclick.net"));
        assert!(blacklist.contains("DOUBLECLICK.NET"));
        assert!(!blacklist.contains("example.com"));
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blacklist.txt");
        std::fs::write(&path, "evil-tracker.com\nads.example.net\n").unwrap();

        let blacklist = TrackerBlacklist::from_file(&path).unwrap();
        assert_eq!(blacklist.len(), 2);
        assert!(blacklist.contains("ads.example.net"));
    }

    #[test]
    fn test_from_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = TrackerBlacklist::from_file(&temp_dir.path().join("nope.txt"));
        assert!(matches!(result, Err(ZeroError::Blacklist { .. })));
    }
}
