use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nd_core::{Article, Error, Result, SourceFeed};
use quick_xml::events::Event;
use quick_xml::Reader;
use scraper::{Html, Selector};
use tracing::debug;

use super::NewsSource;

/// Syndication-feed source: candidates come from RSS/Atom item links, article
/// bodies from plain selector extraction on the linked page.
pub struct RssSource {
    feed: SourceFeed,
    client: reqwest::Client,
}

impl RssSource {
    pub fn new(feed: SourceFeed) -> Self {
        Self {
            feed,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NewsSource for RssSource {
    fn source(&self) -> &str {
        &self.feed.name
    }

    async fn list_candidates(&self) -> Result<Vec<String>> {
        let xml = self
            .client
            .get(&self.feed.url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Fetch(format!("feed {}: {}", self.feed.url, e)))?
            .text()
            .await?;

        let urls = feed_candidate_urls(&xml)?;
        debug!("feed {} listed {} candidates", self.feed.name, urls.len());
        Ok(urls)
    }

    async fn fetch_article(&self, url: &str) -> Result<Article> {
        let html = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Fetch(format!("article {}: {}", url, e)))?
            .text()
            .await?;

        let (title, text, published_at) = extract_article(&html);
        Ok(Article::new(
            url,
            title,
            text,
            &self.feed.name,
            published_at.unwrap_or_else(Utc::now),
        ))
    }
}

/// Pull item/entry links out of an RSS or Atom document.
fn feed_candidate_urls(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut urls = Vec::new();
    let mut in_item = false;
    let mut in_link = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"item" | b"entry" => in_item = true,
                b"link" if in_item => in_link = true,
                _ => {}
            },
            // Atom puts the URL in an href attribute on an empty element.
            Ok(Event::Empty(e)) => {
                if in_item && e.local_name().as_ref() == b"link" {
                    if let Ok(Some(href)) = e.try_get_attribute("href") {
                        urls.push(String::from_utf8_lossy(&href.value).into_owned());
                    }
                }
            }
            Ok(Event::Text(t)) if in_link => {
                let link = t
                    .unescape()
                    .map_err(|e| Error::Fetch(format!("invalid feed XML: {}", e)))?;
                urls.push(link.trim().to_string());
            }
            Ok(Event::CData(t)) if in_link => {
                urls.push(String::from_utf8_lossy(&t.into_inner()).trim().to_string());
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"item" | b"entry" => {
                    in_item = false;
                    in_link = false;
                }
                b"link" => in_link = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Fetch(format!("invalid feed XML: {}", e))),
            _ => {}
        }
    }

    urls.retain(|u| !u.is_empty());
    urls.dedup();
    Ok(urls)
}

/// Best-effort title/body/date extraction from an article page.
fn extract_article(html: &str) -> (String, String, Option<DateTime<Utc>>) {
    let document = Html::parse_document(html);

    let title = document
        .select(&Selector::parse("h1").unwrap())
        .next()
        .or_else(|| document.select(&Selector::parse("title").unwrap()).next())
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let mut paragraphs: Vec<String> = document
        .select(&Selector::parse("article p").unwrap())
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if paragraphs.is_empty() {
        paragraphs = document
            .select(&Selector::parse("p").unwrap())
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
    }
    let text = paragraphs.join("\n\n");

    (title, text, extract_published_at(&document))
}

fn extract_published_at(document: &Html) -> Option<DateTime<Utc>> {
    let meta = Selector::parse("meta[property='article:published_time']").unwrap();
    if let Some(content) = document
        .select(&meta)
        .next()
        .and_then(|el| el.value().attr("content"))
    {
        if let Ok(date) = DateTime::parse_from_rfc3339(content) {
            return Some(date.with_timezone(&Utc));
        }
    }

    // Fall back to JSON-LD article metadata.
    let script = Selector::parse("script[type='application/ld+json']").unwrap();
    for el in document.select(&script) {
        let raw = el.text().collect::<String>();
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(raw.trim()) {
            if let Some(date) = json.get("datePublished").and_then(|d| d.as_str()) {
                if let Ok(date) = DateTime::parse_from_rfc3339(date) {
                    return Some(date.with_timezone(&Utc));
                }
            }
        }
    }

    None
}
