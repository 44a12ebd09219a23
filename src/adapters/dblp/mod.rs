//! HTTP client for the DBLP bibliography service.

pub mod search;
pub mod xml;

use crate::domain::model::{CoauthorRecord, Seed, VenueSeedQuery};
use crate::domain::names::{pick_exact_match, strip_annotation, AuthorCandidate};
use crate::domain::pagination::Page;
use crate::domain::ports::CoauthorSource;
use crate::domain::scope::{tabulate_joint_works, CollaborationScope, Publication};
use crate::utils::error::{CoauthorError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("coauthor-etl/", env!("CARGO_PKG_VERSION"));

pub struct DblpClient {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl DblpClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Url::parse(base_url).map_err(|e| CoauthorError::InvalidConfigValueError {
            field: "base_url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Body of a successful GET, `None` for any other status.
    async fn get_text(&self, path: &str, query: &[(&str, String)]) -> Result<Option<String>> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        tracing::debug!("Making API request to: {}", url);

        let mut request = self.client.get(&url).query(query);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            tracing::warn!("⚠️ {} returned {}, treating as no data", url, status);
            return Ok(None);
        }
        Ok(Some(response.text().await?))
    }

    pub async fn search_authors(&self, name: &str) -> Result<Vec<AuthorCandidate>> {
        match self
            .get_text("search/author", &[("xauthor", name.to_string())])
            .await?
        {
            Some(body) => xml::parse_author_search(&body),
            None => Ok(Vec::new()),
        }
    }

    pub async fn coauthor_view(&self, pid: &str) -> Result<Vec<CoauthorRecord>> {
        match self
            .get_text(
                &format!("pid/{}.xml", pid),
                &[("view", "coauthor".to_string())],
            )
            .await?
        {
            Some(body) => xml::parse_coauthor_view(&body),
            None => Ok(Vec::new()),
        }
    }

    pub async fn publications(&self, pid: &str) -> Result<Vec<Publication>> {
        match self.get_text(&format!("pid/{}.xml", pid), &[]).await? {
            Some(body) => xml::parse_person_publications(&body),
            None => Ok(Vec::new()),
        }
    }

    pub async fn search_publications(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Page<Publication>> {
        let params = [
            ("q", query.to_string()),
            ("h", limit.to_string()),
            ("f", offset.to_string()),
            ("format", "json".to_string()),
        ];
        match self.get_text("search/publ/api", &params).await? {
            Some(body) => search::parse_search_page(&body),
            None => Ok(Page::empty()),
        }
    }
}

#[async_trait]
impl CoauthorSource for DblpClient {
    async fn resolve_pid(&self, display_name: &str) -> Result<Option<String>> {
        let name = strip_annotation(display_name);
        let candidates = self.search_authors(&name).await?;
        let pid = pick_exact_match(&name, &candidates).map(str::to_string);
        if pid.is_none() {
            tracing::debug!(
                "No exact match for '{}' among {} candidates",
                name,
                candidates.len()
            );
        }
        Ok(pid)
    }

    async fn fetch_coauthors(
        &self,
        pid: &str,
        name: &str,
        scope: &CollaborationScope,
    ) -> Result<Vec<CoauthorRecord>> {
        if scope.is_corpus() {
            return self.coauthor_view(pid).await;
        }
        let publications = self.publications(pid).await?;
        tracing::debug!("{} publications listed for {}", publications.len(), pid);
        Ok(tabulate_joint_works(pid, Some(name), &publications, scope))
    }

    async fn venue_authors(&self, query: &VenueSeedQuery) -> Result<Vec<Seed>> {
        search::discover_authors(self, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_resolve_pid_picks_exact_match() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/search/author")
                .query_param("xauthor", "Ahmed E. Hassan");
            then.status(200).body(
                r#"<authors><author pid="99/x">Ahmed Hassan</author><author pid="h/AEH">Ahmed E. Hassan</author></authors>"#,
            );
        });

        let client = DblpClient::new(&server.base_url()).unwrap();
        let pid = client.resolve_pid("Ahmed E. Hassan (68)").await.unwrap();

        mock.assert();
        assert_eq!(pid.as_deref(), Some("h/AEH"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_no_data() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/pid/x/1.xml");
            then.status(404);
        });

        let client = DblpClient::new(&server.base_url()).unwrap();
        let records = client
            .fetch_coauthors("x/1", "X", &CollaborationScope::corpus())
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_scoped_fetch_reads_person_document() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/pid/o/1.xml");
            then.status(200).body(
                r#"<dblpperson pid="o/1"><r><article key="k1"><author pid="o/1">Owner</author><author pid="b/2">Bram Adams</author><year>2021</year><journal>Empir. Softw. Eng.</journal></article></r>
<r><article key="k2"><author pid="o/1">Owner</author><author pid="b/2">Bram Adams</author><year>2021</year><journal>TSE</journal></article></r></dblpperson>"#,
            );
        });

        let client = DblpClient::new(&server.base_url()).unwrap();
        let records = client
            .fetch_coauthors("o/1", "Owner", &CollaborationScope::venue("Empir. Softw. Eng."))
            .await
            .unwrap();
        assert_eq!(records, vec![CoauthorRecord::new("Bram Adams", Some("b/2"), 1)]);
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(DblpClient::new("not a url").is_err());
    }
}
