//! Publication search API (`/search/publ/api?format=json`) and the venue
//! seed discovery built on it.

use super::DblpClient;
use crate::domain::model::{Seed, VenueSeedQuery};
use crate::domain::names::normalize_name;
use crate::domain::pagination::{Page, PageSource, Paginator, StopReason};
use crate::domain::scope::{Publication, PublicationAuthor};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: SearchResult,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    #[serde(default)]
    hit: Vec<SearchHit>,
    /// 可能是字串也可能是數字
    #[serde(default, rename = "@total", alias = "total")]
    total: Value,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    info: Option<HitInfo>,
}

#[derive(Debug, Deserialize)]
struct HitInfo {
    authors: Option<HitAuthors>,
    year: Option<Value>,
    venue: Option<StringOrSeq>,
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HitAuthors {
    #[serde(default)]
    author: AuthorField,
}

/// A single author comes back as an object, several as an array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AuthorField {
    Single(StringOrStruct),
    Multiple(Vec<StringOrStruct>),
}

impl Default for AuthorField {
    fn default() -> Self {
        AuthorField::Multiple(Vec::new())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrStruct {
    String(String),
    Struct {
        text: String,
        #[serde(default, rename = "@pid")]
        pid: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrSeq {
    String(String),
    Seq(Vec<String>),
}

impl StringOrStruct {
    fn into_author(self) -> PublicationAuthor {
        match self {
            StringOrStruct::String(name) => PublicationAuthor { name, pid: None },
            StringOrStruct::Struct { text, pid } => PublicationAuthor { name: text, pid },
        }
    }
}

fn value_as_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl HitInfo {
    fn into_publication(self) -> Publication {
        let authors = match self.authors.map(|a| a.author) {
            Some(AuthorField::Single(author)) => vec![author.into_author()],
            Some(AuthorField::Multiple(list)) => {
                list.into_iter().map(StringOrStruct::into_author).collect()
            }
            None => Vec::new(),
        };
        let venue = match self.venue {
            Some(StringOrSeq::String(v)) => Some(v),
            Some(StringOrSeq::Seq(list)) => list.into_iter().next(),
            None => None,
        };

        Publication {
            key: self.key,
            authors,
            year: self
                .year
                .as_ref()
                .and_then(value_as_number)
                .and_then(|y| i32::try_from(y).ok()),
            venue,
        }
    }
}

/// Parses one page of the publication search API.
pub fn parse_search_page(body: &str) -> Result<Page<Publication>> {
    let response: SearchResponse = serde_json::from_str(body)?;
    let hits = response.result.hits;
    let total = value_as_number(&hits.total).and_then(|t| usize::try_from(t).ok());

    Ok(Page {
        items: hits
            .hit
            .into_iter()
            .filter_map(|h| h.info)
            .map(HitInfo::into_publication)
            .collect(),
        total,
    })
}

/// The hits of one search query, fetched page by page.
pub struct VenuePublications<'a> {
    client: &'a DblpClient,
    query: String,
}

impl<'a> VenuePublications<'a> {
    pub fn new(client: &'a DblpClient, query: impl Into<String>) -> Self {
        Self {
            client,
            query: query.into(),
        }
    }
}

#[async_trait]
impl<'a> PageSource for VenuePublications<'a> {
    type Item = Publication;

    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Page<Publication>> {
        self.client
            .search_publications(&self.query, offset, limit)
            .await
    }
}

/// Distinct authors of the query's publications, in first-seen order.
///
/// Results arrive newest first; the first publication older than
/// `min_year` ends the scan.
pub async fn discover_authors(client: &DblpClient, query: &VenueSeedQuery) -> Result<Vec<Seed>> {
    let source = VenuePublications::new(client, query.query.clone());
    let paginator = Paginator::new(query.page_size, query.max_publications);
    let min_year = query.min_year;

    let (publications, reason) = paginator
        .collect(&source, |p: &Publication| match (min_year, p.year) {
            (Some(min), Some(year)) => year < min,
            _ => false,
        })
        .await?;

    match reason {
        StopReason::Sentinel => tracing::info!(
            "📅 Reached publications older than {:?}, stopping after {}",
            min_year,
            publications.len()
        ),
        StopReason::MaxItems => tracing::warn!(
            "⚠️ Publication cutoff of {} reached for '{}'",
            paginator.max_items(),
            query.query
        ),
        _ => tracing::debug!("Search for '{}' ended: {:?}", query.query, reason),
    }

    let mut seen = HashSet::new();
    let mut seeds = Vec::new();
    for publication in publications {
        for author in publication.authors {
            let key = match author.pid.as_deref() {
                Some(pid) => format!("pid:{}", pid),
                None => format!("name:{}", normalize_name(&author.name)),
            };
            if seen.insert(key) {
                seeds.push(Seed {
                    name: author.name,
                    pid: author.pid,
                });
            }
        }
    }

    tracing::info!("👥 Discovered {} authors for '{}'", seeds.len(), query.query);
    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_page_mixed_author_shapes() {
        let body = r#"{"result":{"hits":{"@total":"3","@sent":"2","hit":[
            {"info":{"authors":{"author":[{"@pid":"h/1","text":"Ahmed E. Hassan"},{"@pid":"a/2","text":"Bram Adams"}]},
                     "year":"2023","venue":"Empir. Softw. Eng.","key":"journals/ese/X23"}},
            {"info":{"authors":{"author":{"@pid":"s/3","text":"Solo Author"}},"year":"2022","venue":["Empir. Softw. Eng.","Other"]}}
        ]}}}"#;
        let page = parse_search_page(body).unwrap();
        assert_eq!(page.total, Some(3));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].authors[1].pid.as_deref(), Some("a/2"));
        assert_eq!(page.items[0].year, Some(2023));
        assert_eq!(page.items[1].authors[0].name, "Solo Author");
        assert_eq!(page.items[1].venue.as_deref(), Some("Empir. Softw. Eng."));
    }

    #[test]
    fn test_parse_search_page_numeric_total_and_plain_names() {
        let body = r#"{"result":{"hits":{"total":12,"hit":[
            {"info":{"authors":{"author":["Plain Name"]},"year":2020}}
        ]}}}"#;
        let page = parse_search_page(body).unwrap();
        assert_eq!(page.total, Some(12));
        assert_eq!(page.items[0].authors[0].pid, None);
        assert_eq!(page.items[0].year, Some(2020));
    }

    #[test]
    fn test_parse_search_page_without_hits() {
        let body = r#"{"result":{"hits":{"@total":"0"}}}"#;
        let page = parse_search_page(body).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, Some(0));
    }
}
