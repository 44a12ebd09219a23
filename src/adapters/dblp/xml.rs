//! Readers for the three DBLP XML documents the crate consumes.

use crate::domain::model::CoauthorRecord;
use crate::domain::names::AuthorCandidate;
use crate::domain::scope::{Publication, PublicationAuthor};
use crate::utils::error::Result;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;

const RECORD_ELEMENTS: [&[u8]; 8] = [
    b"article",
    b"inproceedings",
    b"proceedings",
    b"book",
    b"incollection",
    b"phdthesis",
    b"mastersthesis",
    b"data",
];

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes().flatten() {
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn text_of(text: &BytesText<'_>) -> String {
    text.unescape()
        .map(|t| t.into_owned())
        .unwrap_or_else(|_| String::from_utf8_lossy(text).into_owned())
}

fn reader(xml: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    reader
}

/// `<author pid="…">Name</author>` elements at any depth, in document order.
/// `count` is read when present and defaults to 0.
fn author_elements(xml: &str) -> Result<Vec<(String, Option<String>, u32)>> {
    let mut reader = reader(xml);
    let mut authors = Vec::new();
    let mut current: Option<(String, Option<String>, u32)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"author" => {
                let pid = attribute(&e, b"pid")?;
                let count = attribute(&e, b"count")?
                    .and_then(|c| c.trim().parse().ok())
                    .unwrap_or(0);
                current = Some((String::new(), pid, count));
            }
            Event::Text(t) => {
                if let Some((name, _, _)) = current.as_mut() {
                    name.push_str(&text_of(&t));
                }
            }
            Event::End(e) if e.name().as_ref() == b"author" => {
                if let Some((name, pid, count)) = current.take() {
                    let name = name.trim().to_string();
                    if !name.is_empty() {
                        authors.push((name, pid, count));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(authors)
}

/// Author search result (`/search/author?xauthor=`).
pub fn parse_author_search(xml: &str) -> Result<Vec<AuthorCandidate>> {
    Ok(author_elements(xml)?
        .into_iter()
        .map(|(name, pid, _)| AuthorCandidate { name, pid })
        .collect())
}

/// Coauthor view (`/pid/<pid>.xml?view=coauthor`).
pub fn parse_coauthor_view(xml: &str) -> Result<Vec<CoauthorRecord>> {
    let mut records: Vec<CoauthorRecord> = Vec::new();
    for (name, pid, count) in author_elements(xml)? {
        // 同一位合著者只保留第一筆
        let duplicate = records.iter().any(|r| match (&r.pid, &pid) {
            (Some(a), Some(b)) => a == b,
            _ => r.name == name,
        });
        if !duplicate {
            records.push(CoauthorRecord { name, pid, count });
        }
    }
    Ok(records)
}

enum Field {
    Author(Option<String>),
    Year,
    Venue,
}

/// Publication records (`<r>`) of a person document (`/pid/<pid>.xml`).
pub fn parse_person_publications(xml: &str) -> Result<Vec<Publication>> {
    let mut reader = reader(xml);
    let mut publications = Vec::new();
    let mut current: Option<Publication> = None;
    let mut field: Option<Field> = None;
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.name();
                match name.as_ref() {
                    b"r" => current = Some(Publication::default()),
                    tag if current.is_some() && RECORD_ELEMENTS.contains(&tag) => {
                        if let Some(publication) = current.as_mut() {
                            publication.key = attribute(&e, b"key")?;
                        }
                    }
                    b"author" if current.is_some() => {
                        field = Some(Field::Author(attribute(&e, b"pid")?));
                        text.clear();
                    }
                    b"year" if current.is_some() => {
                        field = Some(Field::Year);
                        text.clear();
                    }
                    b"journal" | b"booktitle" if current.is_some() => {
                        field = Some(Field::Venue);
                        text.clear();
                    }
                    _ => {}
                }
            }
            Event::Text(t) => {
                if field.is_some() {
                    text.push_str(&text_of(&t));
                }
            }
            Event::End(e) => {
                let name = e.name();
                match name.as_ref() {
                    b"r" => {
                        if let Some(publication) = current.take() {
                            publications.push(publication);
                        }
                        field = None;
                    }
                    b"author" | b"year" | b"journal" | b"booktitle" => {
                        if let (Some(publication), Some(done)) = (current.as_mut(), field.take()) {
                            let value = text.trim().to_string();
                            match done {
                                Field::Author(pid) => {
                                    if !value.is_empty() {
                                        publication
                                            .authors
                                            .push(PublicationAuthor { name: value, pid });
                                    }
                                }
                                Field::Year => publication.year = value.parse().ok(),
                                Field::Venue => {
                                    if publication.venue.is_none() && !value.is_empty() {
                                        publication.venue = Some(value);
                                    }
                                }
                            }
                        }
                        text.clear();
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(publications)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_author_search() {
        let xml = r#"<?xml version="1.0"?>
<authors>
<author pid="h/AhmedEHassan" urlpt="h/Hassan:Ahmed_E=">Ahmed E. Hassan</author>
<author pid="12/345">Ahmed Hassan</author>
</authors>"#;
        let candidates = parse_author_search(xml).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].name, "Ahmed E. Hassan");
        assert_eq!(candidates[0].pid.as_deref(), Some("h/AhmedEHassan"));
    }

    #[test]
    fn test_parse_empty_author_search() {
        assert!(parse_author_search("<authors></authors>").unwrap().is_empty());
    }

    #[test]
    fn test_parse_coauthor_view() {
        let xml = r#"<coauthors pid="h/AhmedEHassan" n="3">
<author pid="a/BramAdams" count="41">Bram Adams</author>
<author pid="s/WeiyiShang" count="38">Weiyi Shang</author>
<author pid="g/Gu&#233;h">Yann-Ga&#235;l Gu&#233;heneuc</author>
<author pid="a/BramAdams" count="41">Bram Adams</author>
</coauthors>"#;
        let records = parse_coauthor_view(xml).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], CoauthorRecord::new("Bram Adams", Some("a/BramAdams"), 41));
        assert_eq!(records[2].name, "Yann-Gaël Guéheneuc");
        assert_eq!(records[2].count, 0);
    }

    #[test]
    fn test_parse_person_publications() {
        let xml = r#"<dblpperson name="Owner" pid="o/1" n="2">
<person key="homepages/o/1"><author pid="o/1">Owner</author></person>
<r><article key="journals/ese/Owner21" mdate="2021-01-01">
<author pid="o/1">Owner</author><author pid="b/2">Bram Adams</author>
<title>A study of <i>things</i>.</title>
<year>2021</year><journal>Empir. Softw. Eng.</journal>
</article></r>
<r><inproceedings key="conf/icse/Owner20">
<author pid="o/1">Owner</author><author>No Pid</author>
<year>2020</year><booktitle>ICSE</booktitle>
</inproceedings></r>
</dblpperson>"#;
        let pubs = parse_person_publications(xml).unwrap();
        assert_eq!(pubs.len(), 2);
        assert_eq!(pubs[0].key.as_deref(), Some("journals/ese/Owner21"));
        assert_eq!(pubs[0].venue.as_deref(), Some("Empir. Softw. Eng."));
        assert_eq!(pubs[0].year, Some(2021));
        assert_eq!(pubs[0].authors.len(), 2);
        assert_eq!(pubs[1].venue.as_deref(), Some("ICSE"));
        assert_eq!(pubs[1].authors[1].pid, None);
    }
}
