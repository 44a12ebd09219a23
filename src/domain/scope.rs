use crate::domain::model::CoauthorRecord;
use crate::domain::names::normalize_name;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which joint works count towards a collaboration.
///
/// With neither field set the whole corpus counts and the service's
/// precomputed coauthor view is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaborationScope {
    /// Journal or proceedings title as printed by the service, e.g. `"Empir. Softw. Eng."`.
    pub venue: Option<String>,
    /// Earliest publication year that counts.
    pub since_year: Option<i32>,
}

impl CollaborationScope {
    pub fn corpus() -> Self {
        Self::default()
    }

    pub fn venue(venue: impl Into<String>) -> Self {
        Self {
            venue: Some(venue.into()),
            since_year: None,
        }
    }

    pub fn is_corpus(&self) -> bool {
        self.venue.is_none() && self.since_year.is_none()
    }

    pub fn admits(&self, publication: &Publication) -> bool {
        if let Some(venue) = &self.venue {
            let matches = publication
                .venue
                .as_deref()
                .map(|v| v.trim().eq_ignore_ascii_case(venue.trim()))
                .unwrap_or(false);
            if !matches {
                return false;
            }
        }
        if let Some(since) = self.since_year {
            if publication.year.map(|y| y < since).unwrap_or(true) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationAuthor {
    pub name: String,
    pub pid: Option<String>,
}

/// A work listed on an author's publication document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Publication {
    pub key: Option<String>,
    pub authors: Vec<PublicationAuthor>,
    pub year: Option<i32>,
    pub venue: Option<String>,
}

/// Counts in-scope joint works per coauthor of `owner_pid`.
///
/// Coauthors are matched by identifier; an author without one is matched by
/// normalized name. Output is in first-seen order, keeps each coauthor's
/// printed spelling, and only lists coauthors with at least one in-scope work.
pub fn tabulate_joint_works(
    owner_pid: &str,
    owner_name: Option<&str>,
    publications: &[Publication],
    scope: &CollaborationScope,
) -> Vec<CoauthorRecord> {
    let owner_name = owner_name.map(normalize_name);
    let mut records: Vec<CoauthorRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for publication in publications.iter().filter(|p| scope.admits(p)) {
        // 同一篇作品同一位作者只算一次
        let mut counted_here: Vec<String> = Vec::new();

        for author in &publication.authors {
            let name = normalize_name(&author.name);
            let is_owner = match author.pid.as_deref() {
                Some(pid) => pid == owner_pid,
                None => owner_name.as_deref() == Some(name.as_str()),
            };
            if is_owner {
                continue;
            }

            let key = match author.pid.as_deref() {
                Some(pid) => format!("pid:{}", pid),
                None => format!("name:{}", name),
            };
            if counted_here.contains(&key) {
                continue;
            }
            counted_here.push(key.clone());

            match index.get(&key) {
                Some(&i) => records[i].count += 1,
                None => {
                    index.insert(key, records.len());
                    records.push(CoauthorRecord::new(
                        author.name.trim(),
                        author.pid.as_deref(),
                        1,
                    ));
                }
            }
        }
    }

    records
}
