/// Program configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Destination form URL
    pub form_url: String,
    /// Whether the terminal submit click is performed per record
    pub submit_enabled: bool,
    /// Input table (TOML) path
    pub data_file: String,
    /// Optional team filter applied to the loaded table
    pub team: Option<String>,
    /// Optional mapping override file (TOML)
    pub mapping_overrides_file: Option<String>,
    /// Explicit browser binary, tried before the built-in candidate paths
    pub browser_binary: Option<String>,
    /// Directory scanned for a managed/downloaded browser binary
    pub managed_browser_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            form_url: "https://forms.greatlakesicorps.org/GreatLakesiCorps/form/CourseEvaluation/formperma/hCSRkpmJiZgTyHXyMtXM3kkGPAw5hBCYDhBNDWvtbFQ".to_string(),
            submit_enabled: false,
            data_file: "evaluations.toml".to_string(),
            team: None,
            mapping_overrides_file: None,
            browser_binary: None,
            managed_browser_dir: "drivers".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            form_url: std::env::var("FORM_URL").unwrap_or(default.form_url),
            submit_enabled: std::env::var("SUBMIT_ENABLED").ok().and_then(|v| v.parse().ok()).unwrap_or(default.submit_enabled),
            data_file: std::env::var("DATA_FILE").unwrap_or(default.data_file),
            team: std::env::var("TEAM").ok(),
            mapping_overrides_file: std::env::var("MAPPING_OVERRIDES_FILE").ok(),
            browser_binary: std::env::var("BROWSER_BINARY").ok(),
            managed_browser_dir: std::env::var("MANAGED_BROWSER_DIR").unwrap_or(default.managed_browser_dir),
        }
    }
}
