//! Configuration for verification thresholds and provider access

use crate::error::{Result, VerifyError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration for a verification run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Pass/fail thresholds for individual checks and the overall score
    pub thresholds: Thresholds,
    /// File patterns used by existence checks
    pub patterns: FilePatterns,
    /// Work budget and exclusions for the complexity traversal
    pub traversal: TraversalConfig,
    /// Cutoffs for the authenticity heuristic
    pub authenticity: AuthenticityRules,
    /// Network configuration
    pub network: NetworkConfig,
}

/// Numeric thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum stars for a repository to be considered popular
    pub min_stars: u32,
    pub min_contributors: u32,
    /// Window in which some activity must have happened
    pub activity_window_days: u32,
    pub min_files: u32,
    pub min_directories: u32,
    pub max_size_mb: u32,
    /// Minimum score (0-100) for a report to pass
    pub pass_threshold: f64,
    /// Effective stars that stand in for missing linter configuration
    pub quality_star_fallback: u32,
}

/// File patterns probed by the existence checks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePatterns {
    pub testing: Vec<String>,
    pub build: Vec<String>,
    pub quality_tools: Vec<String>,
    /// README keywords hinting at heavy network usage
    pub network_keywords: Vec<String>,
}

/// Complexity traversal parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Hard cap on processed files
    pub file_budget: u32,
    /// Hard cap on directory listings, the root included
    pub max_listings: u32,
    /// Directory names that are neither counted nor expanded
    pub excluded_dirs: Vec<String>,
}

/// Cutoffs for the authenticity red flags
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticityRules {
    /// Repositories younger than this get their commit cadence sampled
    pub burst_max_age_days: i64,
    pub commit_sample_size: usize,
    pub burst_min_commits: usize,
    pub burst_span_days: i64,
    pub min_description_len: usize,
    /// Effective stars above which a missing release is forgiven
    pub release_star_exemption: u32,
    pub min_readme_bytes: u64,
    pub stale_age_days: i64,
    pub stale_min_stars: u32,
}

/// Network configuration for provider calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Base URL of the GitHub REST API
    pub api_base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Upper bound for a single check, in milliseconds
    pub check_timeout_ms: u64,
    /// Maximum number of retries for failed requests
    pub max_retries: u32,
    /// Base delay between retries (milliseconds)
    pub request_delay_ms: u64,
    /// GitHub API token (optional, for higher rate limits)
    pub github_token: Option<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_stars: 200,
            min_contributors: 3,
            activity_window_days: 180,
            min_files: 30,
            min_directories: 8,
            max_size_mb: 500,
            pass_threshold: 75.0,
            quality_star_fallback: 50,
        }
    }
}

impl Default for FilePatterns {
    fn default() -> Self {
        Self {
            testing: strings(&[
                "test/",
                "tests/",
                "__tests__/",
                "spec/",
                "pytest.ini",
                "jest.config.js",
                "cargo.toml",
            ]),
            build: strings(&[
                "README.md",
                "README",
                "INSTALL.md",
                "Makefile",
                "package.json",
                "setup.py",
                "pyproject.toml",
                "Cargo.toml",
                "build.rs",
                "CMakeLists.txt",
            ]),
            quality_tools: strings(&[
                ".eslintrc",
                ".pylintrc",
                ".flake8",
                "clippy.toml",
                "rustfmt.toml",
                ".prettierrc",
                "tslint.json",
            ]),
            network_keywords: strings(&["server", "port", "host", "api endpoint", "microservice"]),
        }
    }
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            file_budget: 150,
            max_listings: 150,
            excluded_dirs: strings(&[
                ".git",
                ".github",
                "node_modules",
                "__pycache__",
                ".pytest_cache",
                "dist",
                "build",
                ".venv",
                "venv",
                "htmlcov",
            ]),
        }
    }
}

impl Default for AuthenticityRules {
    fn default() -> Self {
        Self {
            burst_max_age_days: 30,
            commit_sample_size: 20,
            burst_min_commits: 10,
            burst_span_days: 7,
            min_description_len: 20,
            release_star_exemption: 100,
            min_readme_bytes: 500,
            stale_age_days: 90,
            stale_min_stars: 5,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            timeout_secs: 30,
            check_timeout_ms: 60_000,
            max_retries: 3,
            request_delay_ms: 100,
            github_token: std::env::var("GITHUB_TOKEN").ok(),
        }
    }
}

impl NetworkConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get per-check timeout as Duration
    pub fn check_timeout(&self) -> Duration {
        Duration::from_millis(self.check_timeout_ms)
    }

    /// Get request delay as Duration
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl VerifyConfig {
    /// Create a new builder for VerifyConfig
    pub fn builder() -> VerifyConfigBuilder {
        VerifyConfigBuilder::default()
    }

    /// Load and validate a TOML configuration file. Missing sections and
    /// fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: VerifyConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would make scoring meaningless
    pub fn validate(&self) -> Result<()> {
        let threshold = self.thresholds.pass_threshold;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(VerifyError::config(format!(
                "pass_threshold must be within 0-100, got {}",
                threshold
            )));
        }
        if self.traversal.file_budget == 0 {
            return Err(VerifyError::config("traversal.file_budget must be positive"));
        }
        if self.traversal.max_listings == 0 {
            return Err(VerifyError::config("traversal.max_listings must be positive"));
        }
        if self.network.check_timeout_ms == 0 {
            return Err(VerifyError::config("network.check_timeout_ms must be positive"));
        }
        Ok(())
    }

    /// Return a copy of this configuration with `overrides` applied
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Self {
        let mut config = self.clone();
        overrides.apply(&mut config.thresholds);
        config
    }
}

/// Per-request threshold overrides, e.g. from a web form or CLI flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigOverrides {
    pub min_stars: Option<u32>,
    pub min_contributors: Option<u32>,
    pub activity_days: Option<u32>,
    pub min_files: Option<u32>,
    pub min_directories: Option<u32>,
    #[serde(rename = "maxSizeMB")]
    pub max_size_mb: Option<u32>,
    pub pass_threshold: Option<f64>,
}

impl ConfigOverrides {
    fn apply(&self, thresholds: &mut Thresholds) {
        if let Some(v) = self.min_stars {
            thresholds.min_stars = v;
        }
        if let Some(v) = self.min_contributors {
            thresholds.min_contributors = v;
        }
        if let Some(v) = self.activity_days {
            thresholds.activity_window_days = v;
        }
        if let Some(v) = self.min_files {
            thresholds.min_files = v;
        }
        if let Some(v) = self.min_directories {
            thresholds.min_directories = v;
        }
        if let Some(v) = self.max_size_mb {
            thresholds.max_size_mb = v;
        }
        if let Some(v) = self.pass_threshold {
            thresholds.pass_threshold = v;
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Builder for VerifyConfig
#[derive(Default)]
pub struct VerifyConfigBuilder {
    thresholds: Option<Thresholds>,
    patterns: Option<FilePatterns>,
    traversal: Option<TraversalConfig>,
    authenticity: Option<AuthenticityRules>,
    network: Option<NetworkConfig>,
}

impl VerifyConfigBuilder {
    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    pub fn patterns(mut self, patterns: FilePatterns) -> Self {
        self.patterns = Some(patterns);
        self
    }

    pub fn traversal(mut self, traversal: TraversalConfig) -> Self {
        self.traversal = Some(traversal);
        self
    }

    pub fn authenticity(mut self, rules: AuthenticityRules) -> Self {
        self.authenticity = Some(rules);
        self
    }

    pub fn network(mut self, network: NetworkConfig) -> Self {
        self.network = Some(network);
        self
    }

    pub fn build(self) -> VerifyConfig {
        VerifyConfig {
            thresholds: self.thresholds.unwrap_or_default(),
            patterns: self.patterns.unwrap_or_default(),
            traversal: self.traversal.unwrap_or_default(),
            authenticity: self.authenticity.unwrap_or_default(),
            network: self.network.unwrap_or_default(),
        }
    }
}
