//! Latest posts from the Linkle note.com blog.
//!
//! The feed is decoration: any failure yields an empty list and a `warn`
//! log line, never an error.

use std::sync::OnceLock;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Characters kept from the description for the card excerpt.
const EXCERPT_CHARS: usize = 120;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    /// Post link, or the title when the link is missing.
    pub id: String,
    pub title: String,
    pub url: String,
    pub date: Option<NaiveDate>,
    pub cover_url: Option<String>,
    pub excerpt: String,
    pub tags: Vec<String>,
}

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed returned status {0}")]
    Status(u16),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Fetch and parse the feed at `url`, returning at most `max` entries.
pub async fn fetch_latest(http: &reqwest::Client, url: &str, max: usize) -> Vec<FeedEntry> {
    match try_fetch(http, url, max).await {
        Ok(entries) => {
            tracing::debug!(url, count = entries.len(), "feed fetched");
            entries
        }
        Err(e) => {
            tracing::warn!(url, error = %e, "feed unavailable");
            Vec::new()
        }
    }
}

async fn try_fetch(http: &reqwest::Client, url: &str, max: usize) -> Result<Vec<FeedEntry>, FeedError> {
    let resp = http.get(url).timeout(FETCH_TIMEOUT).send().await?;
    if !resp.status().is_success() {
        return Err(FeedError::Status(resp.status().as_u16()));
    }
    let body = resp.text().await?;
    parse_feed(&body, max)
}

#[derive(Clone, Copy)]
enum Field {
    Title,
    Link,
    PubDate,
    Description,
    Category,
}

#[derive(Default)]
struct RawItem {
    title: String,
    link: String,
    pub_date: String,
    description: String,
    categories: Vec<String>,
}

impl RawItem {
    fn push(&mut self, field: Field, text: &str) {
        match field {
            Field::Title => self.title.push_str(text),
            Field::Link => self.link.push_str(text),
            Field::PubDate => self.pub_date.push_str(text),
            Field::Description => self.description.push_str(text),
            Field::Category => self.categories.push(text.trim().to_string()),
        }
    }

    fn into_entry(self) -> FeedEntry {
        let title = self.title.trim().to_string();
        let url = self.link.trim().to_string();
        let date = DateTime::parse_from_rfc2822(self.pub_date.trim())
            .ok()
            .map(|d| d.with_timezone(&Utc).date_naive());

        FeedEntry {
            id: if url.is_empty() { title.clone() } else { url.clone() },
            cover_url: first_image_url(&self.description),
            excerpt: excerpt(&self.description),
            tags: self.categories.into_iter().filter(|c| !c.is_empty()).collect(),
            title,
            url,
            date,
        }
    }
}

/// Parse RSS `<item>` elements.
pub fn parse_feed(xml: &str, max: usize) -> Result<Vec<FeedEntry>, FeedError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut entries = Vec::new();
    let mut item: Option<RawItem> = None;
    let mut field: Option<Field> = None;

    while entries.len() < max {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"item" => item = Some(RawItem::default()),
                b"title" => field = Some(Field::Title),
                b"link" => field = Some(Field::Link),
                b"pubDate" => field = Some(Field::PubDate),
                b"description" => field = Some(Field::Description),
                b"category" => field = Some(Field::Category),
                _ => field = None,
            },
            Event::Text(t) => {
                if let (Some(item), Some(f)) = (item.as_mut(), field) {
                    item.push(f, &t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let (Some(item), Some(f)) = (item.as_mut(), field) {
                    item.push(f, &String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(e) => {
                field = None;
                if e.local_name().as_ref() == b"item" {
                    if let Some(done) = item.take() {
                        entries.push(done.into_entry());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

fn first_image_url(html: &str) -> Option<String> {
    static IMAGE_URL: OnceLock<Regex> = OnceLock::new();
    let re = IMAGE_URL.get_or_init(|| {
        Regex::new(r#"(?i)https?://[^"' ]+\.(?:png|jpe?g|gif|webp)"#).expect("valid image regex")
    });
    re.find(html).map(|m| m.as_str().to_string())
}

fn excerpt(html: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let re = TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

    let text = re.replace_all(html, " ");
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}…", &collapsed[..cut]),
        None => collapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Linkle note</title>
    <item>
      <title><![CDATA[週末イベントまとめ]]></title>
      <link>https://note.com/linkle/n/n001</link>
      <pubDate>Tue, 10 Sep 2024 12:34:56 +0900</pubDate>
      <description><![CDATA[<p><img src="https://assets.st-note.com/img/cover.JPG" /> 今週の <b>おすすめ</b></p>]]></description>
      <category>events</category>
    </item>
    <item>
      <title>No link &amp; no date</title>
      <description>plain text</description>
    </item>
    <item>
      <title>Third</title>
      <link>https://note.com/linkle/n/n003</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_items() {
        let entries = parse_feed(SAMPLE, 6).unwrap();
        assert_eq!(entries.len(), 3);

        let first = &entries[0];
        assert_eq!(first.title, "週末イベントまとめ");
        assert_eq!(first.id, "https://note.com/linkle/n/n001");
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 9, 10));
        assert_eq!(
            first.cover_url.as_deref(),
            Some("https://assets.st-note.com/img/cover.JPG")
        );
        assert_eq!(first.excerpt, "今週の おすすめ");
        assert_eq!(first.tags, vec!["events".to_string()]);

        let second = &entries[1];
        assert_eq!(second.title, "No link & no date");
        assert_eq!(second.id, "No link & no date");
        assert_eq!(second.date, None);
        assert_eq!(second.cover_url, None);
    }

    #[test]
    fn respects_max() {
        assert_eq!(parse_feed(SAMPLE, 2).unwrap().len(), 2);
    }

    #[test]
    fn excerpt_is_truncated() {
        let long = "あ".repeat(EXCERPT_CHARS + 10);
        let e = excerpt(&long);
        assert_eq!(e.chars().count(), EXCERPT_CHARS + 1);
        assert!(e.ends_with('…'));
    }

    #[tokio::test]
    async fn unreachable_feed_degrades_to_empty() {
        let http = reqwest::Client::new();
        let entries = fetch_latest(&http, "http://127.0.0.1:9/rss", 6).await;
        assert!(entries.is_empty());
    }
}
