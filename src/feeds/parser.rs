//! Streaming RSS/Atom reader built on the `quick-xml` event API.
//!
//! Elements are matched on their qualified name. Only unprefixed elements of
//! the RSS and Atom vocabularies are read, so extension elements such as
//! `media:title`, `dc:creator` or an item-level `atom:link` are skipped along
//! with everything inside them. Text constructs keep the text of all their
//! descendants, which covers Atom `type="xhtml"` content wrapped in a `<div>`.
//! Dates are kept exactly as written.

use quick_xml::Reader;
use quick_xml::errors::{Error as XmlError, IllFormedError};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use tracing::debug;

use crate::error::NewsError;
use crate::models::{Feed, FeedEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    /// RSS 0.9x / 2.0: `<rss><channel><item>`
    Rss,
    /// RSS 1.0: `<rdf:RDF>` with items next to the channel
    Rdf,
    /// Atom 1.0: `<feed><entry>`
    Atom,
}

impl Format {
    fn from_root(local_name: &str) -> Option<Self> {
        match local_name {
            "rss" => Some(Self::Rss),
            "RDF" => Some(Self::Rdf),
            "feed" => Some(Self::Atom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    FeedTitle,
    Title,
    Summary,
    Link,
    Published,
    Updated,
    Guid { permalink: bool },
}

/// What an opening tag turned out to be.
enum Slot {
    Entry,
    Text(Field),
    AtomLink(AtomLink),
}

#[derive(Debug)]
struct AtomLink {
    href: String,
    rel: Option<String>,
}

/// Text being collected for a field until its element closes.
#[derive(Debug)]
struct Capture {
    field: Field,
    depth: usize,
    text: String,
}

#[derive(Debug, Default)]
struct PartialEntry {
    title: Option<String>,
    summary: Option<String>,
    link: Option<String>,
    published: Option<String>,
    updated: Option<String>,
    permalink: Option<String>,
    links: Vec<AtomLink>,
}

impl PartialEntry {
    /// First occurrence wins.
    fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Summary => &mut self.summary,
            Field::Link => &mut self.link,
            Field::Published => &mut self.published,
            Field::Updated => &mut self.updated,
            Field::Guid { permalink: true } => &mut self.permalink,
            Field::Guid { permalink: false } | Field::FeedTitle => return,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    /// Link precedence: RSS `<link>`, then the Atom alternate link (or the
    /// first link), then a permalink `<guid>`.
    fn finish(self) -> FeedEntry {
        let link = self
            .link
            .or_else(|| {
                self.links
                    .iter()
                    .find(|l| l.rel.as_deref().is_none_or(|rel| rel == "alternate"))
                    .or_else(|| self.links.first())
                    .map(|l| l.href.clone())
            })
            .or(self.permalink);

        FeedEntry {
            title: self.title,
            summary: self.summary,
            link,
            published: self.published.or(self.updated),
        }
    }
}

/// Parser state between events.
#[derive(Debug)]
struct FeedReader {
    format: Format,
    /// Qualified names of the open elements, root first.
    path: Vec<String>,
    title: Option<String>,
    entries: Vec<FeedEntry>,
    entry: Option<(usize, PartialEntry)>,
    capture: Option<Capture>,
}

impl FeedReader {
    fn new(format: Format, root: String) -> Self {
        Self {
            format,
            path: vec![root],
            title: None,
            entries: Vec::new(),
            entry: None,
            capture: None,
        }
    }

    fn open(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<(), XmlError> {
        let depth = self.path.len();
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let slot = if self.capture.is_some() || e.name().prefix().is_some() {
            None
        } else {
            self.classify(&name, depth, e)?
        };
        if !empty {
            self.path.push(name);
        }

        match slot {
            None => {}
            Some(Slot::Entry) if empty => self.entries.push(PartialEntry::default().finish()),
            Some(Slot::Entry) => self.entry = Some((depth, PartialEntry::default())),
            Some(Slot::Text(field)) if empty => self.commit(field, String::new()),
            Some(Slot::Text(field)) => {
                self.capture = Some(Capture {
                    field,
                    depth,
                    text: String::new(),
                })
            }
            Some(Slot::AtomLink(link)) => {
                if let Some((_, entry)) = &mut self.entry {
                    entry.links.push(link);
                }
            }
        }
        Ok(())
    }

    fn classify(
        &self,
        name: &str,
        depth: usize,
        e: &BytesStart<'_>,
    ) -> Result<Option<Slot>, XmlError> {
        if let Some((entry_depth, _)) = &self.entry {
            if depth != entry_depth + 1 {
                return Ok(None);
            }
            let field = match (self.format, name) {
                (_, "title") => Field::Title,
                (Format::Atom, "link") => {
                    let Some(href) = attribute(e, "href")? else {
                        return Ok(None);
                    };
                    let rel = attribute(e, "rel")?;
                    return Ok(Some(Slot::AtomLink(AtomLink { href, rel })));
                }
                (Format::Atom, "summary") => Field::Summary,
                (Format::Atom, "published") => Field::Published,
                (Format::Atom, "updated") => Field::Updated,
                (Format::Rss | Format::Rdf, "description") => Field::Summary,
                (Format::Rss | Format::Rdf, "link") => Field::Link,
                (Format::Rss | Format::Rdf, "pubDate") => Field::Published,
                (Format::Rss | Format::Rdf, "guid") => Field::Guid {
                    permalink: attribute(e, "isPermaLink")?.is_none_or(|v| v != "false"),
                },
                _ => return Ok(None),
            };
            return Ok(Some(Slot::Text(field)));
        }

        let in_channel = depth == 2 && self.path[1] == "channel";
        let slot = match (self.format, depth, name) {
            (Format::Rss, 2, "item") if in_channel => Slot::Entry,
            (Format::Rss | Format::Rdf, 2, "title") if in_channel => Slot::Text(Field::FeedTitle),
            (Format::Rdf, 1, "item") | (Format::Atom, 1, "entry") => Slot::Entry,
            (Format::Atom, 1, "title") => Slot::Text(Field::FeedTitle),
            _ => return Ok(None),
        };
        Ok(Some(slot))
    }

    fn close(&mut self) {
        self.path.pop();
        let depth = self.path.len();

        if self.capture.as_ref().is_some_and(|c| c.depth == depth) {
            if let Some(capture) = self.capture.take() {
                self.commit(capture.field, capture.text);
            }
        } else if self.entry.as_ref().is_some_and(|(d, _)| *d == depth) {
            if let Some((_, entry)) = self.entry.take() {
                self.entries.push(entry.finish());
            }
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(capture) = &mut self.capture {
            capture.text.push_str(text);
        }
    }

    fn reference(&mut self, r: &BytesRef<'_>) -> Result<(), XmlError> {
        if self.capture.is_none() {
            return Ok(());
        }
        if let Some(ch) = r.resolve_char_ref()? {
            self.text(ch.encode_utf8(&mut [0; 4]));
            return Ok(());
        }
        let name = r.decode()?;
        match resolve_predefined_entity(&name) {
            Some(resolved) => self.text(resolved),
            // Undeclared entities are kept as written.
            None => self.text(&format!("&{name};")),
        }
        Ok(())
    }

    fn commit(&mut self, field: Field, text: String) {
        let value = text.trim().to_string();
        match field {
            Field::FeedTitle => {
                if self.title.is_none() {
                    self.title = Some(value);
                }
            }
            field => {
                if let Some((_, entry)) = &mut self.entry {
                    entry.set(field, value);
                }
            }
        }
    }
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, XmlError> {
    match e.try_get_attribute(name)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

/// Parse an RSS 2.0, RSS 1.0 or Atom document.
///
/// `url` is only used for error messages.
pub fn parse_feed(url: &str, xml: &str) -> Result<Feed, NewsError> {
    let xml = xml.trim_start_matches('\u{feff}');
    let xml_err = |source: XmlError| NewsError::Xml {
        url: url.to_string(),
        source,
    };

    let mut reader = Reader::from_str(xml);
    let root = |e: &BytesStart<'_>| {
        let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
        match Format::from_root(&local) {
            Some(format) => Ok(format),
            None => Err(NewsError::UnsupportedFeed {
                url: url.to_string(),
                root: local,
            }),
        }
    };

    let mut doc = loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => {
                let format = root(&e)?;
                break FeedReader::new(format, String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Event::Empty(e) => {
                root(&e)?;
                debug!(url, "Feed document is an empty root element");
                return Ok(Feed::default());
            }
            Event::Eof => {
                return Err(NewsError::EmptyFeed {
                    url: url.to_string(),
                });
            }
            _ => {}
        }
    };

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => doc.open(&e, false).map_err(xml_err)?,
            Event::Empty(e) => doc.open(&e, true).map_err(xml_err)?,
            Event::End(_) => doc.close(),
            Event::Text(t) => doc.text(&t.decode().map_err(|e| xml_err(e.into()))?),
            Event::CData(t) => doc.text(&t.decode().map_err(|e| xml_err(e.into()))?),
            Event::GeneralRef(r) => doc.reference(&r).map_err(xml_err)?,
            Event::Eof => break,
            _ => {}
        }
    }
    if let Some(open) = doc.path.last() {
        return Err(xml_err(IllFormedError::MissingEndTag(open.clone()).into()));
    }

    let feed = Feed {
        title: doc.title,
        entries: doc.entries,
    };
    debug!(url, format = ?doc.format, entries = feed.entries.len(), title = ?feed.title, "Parsed feed");
    Ok(feed)
}
