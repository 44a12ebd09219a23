pub mod cli;
pub mod toml_config;

use crate::domain::model::OutputFormat;
use crate::utils::error::{CoauthorError, Result};

pub const DEFAULT_PAGE_SIZE: usize = 100;
/// DBLP caps `h` at 1000 hits per request.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Parses format names, rejecting unknown ones.
pub fn parse_formats(field: &str, names: &[String]) -> Result<Vec<OutputFormat>> {
    let mut formats = Vec::new();
    for name in names {
        let format = OutputFormat::parse(name).ok_or_else(|| CoauthorError::InvalidConfigValueError {
            field: field.to_string(),
            value: name.clone(),
            reason: format!(
                "Unsupported format. Valid formats: {}",
                OutputFormat::ALL
                    .iter()
                    .map(|f| f.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        })?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    Ok(formats)
}

#[cfg(feature = "cli")]
pub use self::cli_args::CliConfig;

#[cfg(feature = "cli")]
mod cli_args {
    use super::*;
    use crate::domain::model::VenueSeedQuery;
    use crate::domain::ports::ConfigProvider;
    use crate::domain::scope::CollaborationScope;
    use crate::domain::sunburst::{SunburstOptions, DEFAULT_BASE_URL};
    use crate::domain::traversal::TraversalOptions;
    use crate::utils::validation::{self, Validate};
    use clap::Parser;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "coauthor-etl")]
    #[command(about = "Builds DBLP coauthor graphs and sunburst documents")]
    pub struct CliConfig {
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        pub base_url: String,

        /// Seed author names, `(count)` suffixes allowed
        #[arg(long, value_delimiter = ',')]
        pub authors: Vec<String>,

        /// Publication search query whose authors become the seeds
        #[arg(long)]
        pub venue_query: Option<String>,

        #[arg(long, help = "Stop seed discovery at publications older than this year")]
        pub min_year: Option<i32>,

        #[arg(long)]
        pub max_publications: Option<usize>,

        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        pub page_size: usize,

        /// Count only joint works in this venue
        #[arg(long)]
        pub venue: Option<String>,

        #[arg(long)]
        pub since_year: Option<i32>,

        #[arg(long, default_value = "1")]
        pub depth: usize,

        #[arg(long, help = "Keep only edges between seed authors")]
        pub restrict_to_seeds: bool,

        #[arg(long, default_value = "5", help = "Coauthors expanded per author, 0 for all")]
        pub expand_top: usize,

        #[arg(long, default_value = "5")]
        pub top_k: usize,

        #[arg(long, default_value = "2")]
        pub tree_depth: usize,

        #[arg(long, default_value = "Authors")]
        pub root_label: String,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        #[arg(long, value_delimiter = ',', default_value = "sunburst")]
        pub formats: Vec<String>,

        #[arg(long)]
        pub timeout_seconds: Option<u64>,

        #[arg(long, help = "Log CPU and memory usage per phase")]
        pub monitor: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub json_logs: bool,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    impl ConfigProvider for CliConfig {
        fn base_url(&self) -> &str {
            &self.base_url
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn seed_authors(&self) -> &[String] {
            &self.authors
        }

        fn seed_query(&self) -> Option<VenueSeedQuery> {
            self.venue_query.as_ref().map(|query| VenueSeedQuery {
                query: query.clone(),
                min_year: self.min_year,
                max_publications: self.max_publications,
                page_size: self.page_size,
            })
        }

        fn scope(&self) -> CollaborationScope {
            CollaborationScope {
                venue: self.venue.clone(),
                since_year: self.since_year,
            }
        }

        fn traversal(&self) -> TraversalOptions {
            TraversalOptions {
                depth: self.depth,
                restrict_to_seeds: self.restrict_to_seeds,
                expand_top: (self.expand_top > 0).then_some(self.expand_top),
            }
        }

        fn sunburst(&self) -> SunburstOptions {
            SunburstOptions {
                root_label: self.root_label.clone(),
                top_k: self.top_k,
                tree_depth: self.tree_depth,
                base_url: self.base_url.clone(),
                ..SunburstOptions::default()
            }
        }

        fn output_formats(&self) -> Vec<OutputFormat> {
            self.formats
                .iter()
                .filter_map(|f| OutputFormat::parse(f))
                .collect()
        }

        fn request_timeout(&self) -> Option<Duration> {
            self.timeout_seconds.map(Duration::from_secs)
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_url("base_url", &self.base_url)?;
            validation::validate_path("output_path", &self.output_path)?;

            if self.authors.is_empty() && self.venue_query.is_none() {
                return Err(CoauthorError::MissingConfigError {
                    field: "authors or venue_query".to_string(),
                });
            }
            validation::validate_author_names("authors", &self.authors)?;
            if let Some(query) = &self.venue_query {
                validation::validate_non_empty_string("venue_query", query)?;
            }
            if self.min_year.is_some() || self.max_publications.is_some() {
                validation::validate_required_field("venue_query", &self.venue_query)?;
            }

            validation::validate_range("depth", self.depth, 0, 10)?;
            validation::validate_positive_number("top_k", self.top_k, 1)?;
            validation::validate_range("tree_depth", self.tree_depth, 1, 10)?;
            validation::validate_range("page_size", self.page_size, 1, MAX_PAGE_SIZE)?;

            if parse_formats("formats", &self.formats)?.is_empty() {
                return Err(CoauthorError::MissingConfigError {
                    field: "formats".to_string(),
                });
            }
            Ok(())
        }
    }

}
