use crate::config::{parse_formats, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::domain::model::{OutputFormat, VenueSeedQuery};
use crate::domain::ports::ConfigProvider;
use crate::domain::ranking::DEFAULT_TOP_K;
use crate::domain::scope::CollaborationScope;
use crate::domain::sunburst::{SunburstOptions, DEFAULT_BASE_URL};
use crate::domain::traversal::TraversalOptions;
use crate::utils::error::{CoauthorError, Result};
use crate::utils::validation::{self, Validate};
use chrono::Datelike;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub run: RunConfig,
    #[serde(default)]
    pub source: SourceConfig,
    pub seeds: SeedsConfig,
    #[serde(default)]
    pub scope: ScopeConfig,
    #[serde(default)]
    pub traversal: TraversalConfig,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedsConfig {
    #[serde(default)]
    pub authors: Vec<String>,
    pub venue_query: Option<String>,
    pub min_year: Option<i32>,
    pub max_publications: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeConfig {
    pub venue: Option<String>,
    pub since_year: Option<i32>,
    /// 最近 N 年內的作品，以目前年份換算成 since_year
    pub recent_years: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraversalConfig {
    pub depth: Option<usize>,
    pub restrict_to_seeds: Option<bool>,
    /// 0 代表展開所有合著者
    pub expand_top: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub output_path: String,
    pub formats: Vec<String>,
    pub root_label: Option<String>,
    pub top_k: Option<usize>,
    pub tree_depth: Option<usize>,
    pub coauthor_value: Option<u32>,
    pub nested_value: Option<u32>,
    /// 依格式覆寫輸出檔名，例如 `sunburst = "ese.json"`
    pub filenames: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

fn env_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env pattern is valid"))
}

/// `recent_years = N` covers works from `current_year - N` onwards.
pub fn since_year_for(recent_years: i32, current_year: i32) -> i32 {
    current_year - recent_years
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| CoauthorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DBLP_BASE_URL})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        env_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("run.name", &self.run.name)?;
        validation::validate_url("source.base_url", self.base_url())?;
        validation::validate_path("output.output_path", &self.output.output_path)?;

        if self.seeds.authors.is_empty() && self.seeds.venue_query.is_none() {
            return Err(CoauthorError::MissingConfigError {
                field: "seeds.authors or seeds.venue_query".to_string(),
            });
        }
        validation::validate_author_names("seeds.authors", &self.seeds.authors)?;
        // min_year 與 max_publications 只對 venue_query 有意義
        if self.seeds.min_year.is_some() || self.seeds.max_publications.is_some() {
            let query =
                validation::validate_required_field("seeds.venue_query", &self.seeds.venue_query)?;
            validation::validate_non_empty_string("seeds.venue_query", query)?;
        }

        if let Some(page_size) = self.seeds.page_size {
            validation::validate_range("seeds.page_size", page_size, 1, MAX_PAGE_SIZE)?;
        }
        if let Some(years) = self.scope.recent_years {
            validation::validate_positive_number("scope.recent_years", years.max(0) as usize, 1)?;
        }
        if let Some(depth) = self.traversal.depth {
            validation::validate_range("traversal.depth", depth, 0, 10)?;
        }
        if let Some(top_k) = self.output.top_k {
            validation::validate_positive_number("output.top_k", top_k, 1)?;
        }
        if let Some(tree_depth) = self.output.tree_depth {
            validation::validate_range("output.tree_depth", tree_depth, 1, 10)?;
        }

        if parse_formats("output.formats", &self.output.formats)?.is_empty() {
            return Err(CoauthorError::MissingConfigError {
                field: "output.formats".to_string(),
            });
        }
        if let Some(filenames) = &self.output.filenames {
            for (format, filename) in filenames {
                if OutputFormat::parse(format).is_none() {
                    return Err(CoauthorError::InvalidConfigValueError {
                        field: "output.filenames".to_string(),
                        value: format.clone(),
                        reason: "Unknown output format".to_string(),
                    });
                }
                validation::validate_path("output.filenames", filename)?;
            }
        }

        Ok(())
    }

    /// 以指定年份換算 scope，方便測試
    pub fn scope_at(&self, current_year: i32) -> CollaborationScope {
        let since_year = match (self.scope.since_year, self.scope.recent_years) {
            (Some(year), _) => Some(year),
            (None, Some(years)) => Some(since_year_for(years, current_year)),
            (None, None) => None,
        };
        CollaborationScope {
            venue: self.scope.venue.clone(),
            since_year,
        }
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn base_url(&self) -> &str {
        self.source.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    fn output_path(&self) -> &str {
        &self.output.output_path
    }

    fn seed_authors(&self) -> &[String] {
        &self.seeds.authors
    }

    fn seed_query(&self) -> Option<VenueSeedQuery> {
        self.seeds.venue_query.as_ref().map(|query| VenueSeedQuery {
            query: query.clone(),
            min_year: self.seeds.min_year,
            max_publications: self.seeds.max_publications,
            page_size: self.seeds.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        })
    }

    fn scope(&self) -> CollaborationScope {
        self.scope_at(chrono::Utc::now().year())
    }

    fn traversal(&self) -> TraversalOptions {
        let defaults = TraversalOptions::default();
        TraversalOptions {
            depth: self.traversal.depth.unwrap_or(defaults.depth),
            restrict_to_seeds: self
                .traversal
                .restrict_to_seeds
                .unwrap_or(defaults.restrict_to_seeds),
            expand_top: match self.traversal.expand_top {
                Some(0) => None,
                Some(n) => Some(n),
                None => defaults.expand_top,
            },
        }
    }

    fn sunburst(&self) -> SunburstOptions {
        let defaults = SunburstOptions::default();
        SunburstOptions {
            root_label: self
                .output
                .root_label
                .clone()
                .unwrap_or(defaults.root_label),
            top_k: self.output.top_k.unwrap_or(DEFAULT_TOP_K),
            tree_depth: self.output.tree_depth.unwrap_or(defaults.tree_depth),
            coauthor_value: self.output.coauthor_value.unwrap_or(defaults.coauthor_value),
            nested_value: self.output.nested_value.unwrap_or(defaults.nested_value),
            base_url: self.base_url().to_string(),
        }
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        parse_formats("output.formats", &self.output.formats).unwrap_or_default()
    }

    fn output_filename(&self, format: OutputFormat) -> String {
        self.output
            .filenames
            .as_ref()
            .and_then(|names| {
                names
                    .iter()
                    .find(|(key, _)| OutputFormat::parse(key) == Some(format))
                    .map(|(_, name)| name.clone())
            })
            .unwrap_or_else(|| format.default_filename().to_string())
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[run]
name = "ese-top-authors"

[seeds]
authors = ["Ahmed E. Hassan (68)", "Bram Adams (41)"]

[scope]
venue = "Empir. Softw. Eng."
recent_years = 5

[traversal]
restrict_to_seeds = true
expand_top = 0

[output]
output_path = "./output"
formats = ["sunburst", "csv"]
root_label = "ESE Authors"
coauthor_value = 60

[output.filenames]
sunburst = "ese_sunburst.json"
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.run.name, "ese-top-authors");
        assert_eq!(config.base_url(), "https://dblp.org");
        assert_eq!(config.seed_authors().len(), 2);
        assert!(config.seed_query().is_none());
        assert_eq!(
            config.output_formats(),
            vec![OutputFormat::Sunburst, OutputFormat::Csv]
        );
        assert!(config.validate().is_ok());

        let traversal = config.traversal();
        assert_eq!(traversal.depth, 1);
        assert!(traversal.restrict_to_seeds);
        assert_eq!(traversal.expand_top, None);

        let sunburst = config.sunburst();
        assert_eq!(sunburst.root_label, "ESE Authors");
        assert_eq!(sunburst.coauthor_value, 60);
        assert_eq!(sunburst.nested_value, 100);
    }

    #[test]
    fn test_recent_years_resolves_against_current_year() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();
        let scope = config.scope_at(2024);
        assert_eq!(scope.since_year, Some(2019));
        assert_eq!(scope.venue.as_deref(), Some("Empir. Softw. Eng."));
    }

    #[test]
    fn test_filename_overrides() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();
        assert_eq!(config.output_filename(OutputFormat::Sunburst), "ese_sunburst.json");
        assert_eq!(config.output_filename(OutputFormat::Csv), "edges.csv");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("COAUTHOR_TEST_BASE_URL", "https://dblp.uni-trier.de");

        let toml_content = r#"
[run]
name = "test"

[source]
base_url = "${COAUTHOR_TEST_BASE_URL}"

[seeds]
venue_query = "venue:ICSE:"
min_year = 2020

[output]
output_path = "./output"
formats = ["network"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.base_url(), "https://dblp.uni-trier.de");
        let query = config.seed_query().unwrap();
        assert_eq!(query.min_year, Some(2020));
        assert_eq!(query.page_size, DEFAULT_PAGE_SIZE);

        std::env::remove_var("COAUTHOR_TEST_BASE_URL");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[run]
name = "test"

[source]
base_url = "invalid-url"

[seeds]
authors = ["A"]

[output]
output_path = "./output"
formats = ["sunburst"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_seed_source_is_rejected() {
        let toml_content = r#"
[run]
name = "test"

[seeds]

[output]
output_path = "./output"
formats = ["sunburst"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(CoauthorError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_discovery_limits_require_a_venue_query() {
        let toml_content = r#"
[run]
name = "test"

[seeds]
authors = ["Tim Menzies (21)"]
min_year = 2015

[output]
output_path = "./output"
formats = ["sunburst"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        match config.validate() {
            Err(CoauthorError::MissingConfigError { field }) => {
                assert_eq!(field, "seeds.venue_query")
            }
            other => panic!("expected missing venue_query, got {:?}", other),
        }
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.run.name, "ese-top-authors");
    }
}
