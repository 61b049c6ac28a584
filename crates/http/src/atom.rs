//! Atom feed decoding for spreadsheet, worksheet and cell feeds.
//!
//! Elements are matched by local name, so the `gs:` prefix on cell elements
//! (or any other prefix the service chooses) does not matter.

use cellfeed_core::{Cell, Entry, FeedError, FeedKind, FeedResult, SpreadsheetRef, WorksheetRef};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// Link relation of a spreadsheet entry's worksheet feed.
pub const WORKSHEETS_REL: &str = "http://schemas.google.com/spreadsheets/2006#worksheetsfeed";

/// Link relation of a worksheet entry's cell feed.
pub const CELLS_REL: &str = "http://schemas.google.com/spreadsheets/2006#cellsfeed";

/// Text-bearing element currently being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    None,
    Title,
    Id,
    Cell,
}

#[derive(Debug, Default)]
struct PartialEntry {
    title: Option<String>,
    id: Option<String>,
    links: Vec<(String, String)>,
    cell: Option<(u32, u32)>,
    value: String,
}

impl PartialEntry {
    fn link(&self, rel: &str) -> Option<&str> {
        self.links
            .iter()
            .find(|(r, _)| r == rel)
            .map(|(_, href)| href.as_str())
    }

    fn finish(self, url: &str, kind: FeedKind, index: usize) -> FeedResult<Entry> {
        let title = self.title.clone().unwrap_or_default();

        match kind {
            FeedKind::Spreadsheet => {
                let worksheets_url = self.link(WORKSHEETS_REL).ok_or_else(|| {
                    FeedError::malformed(
                        url,
                        format!("spreadsheet entry {index} ('{title}') has no worksheets feed link"),
                    )
                })?;
                Ok(Entry::Spreadsheet(SpreadsheetRef {
                    worksheets_url: worksheets_url.to_string(),
                    title,
                    id: self.id,
                }))
            }
            FeedKind::Worksheet => {
                let cells_url = self.link(CELLS_REL).ok_or_else(|| {
                    FeedError::malformed(
                        url,
                        format!("worksheet entry {index} ('{title}') has no cells feed link"),
                    )
                })?;
                Ok(Entry::Worksheet(WorksheetRef {
                    cells_url: cells_url.to_string(),
                    title,
                    id: self.id,
                }))
            }
            FeedKind::Cell => {
                let (row, col) = self.cell.ok_or_else(|| {
                    FeedError::malformed(
                        url,
                        format!("cell entry {index} ('{title}') has no cell element"),
                    )
                })?;
                Ok(Entry::Cell {
                    title,
                    cell: Cell::new(row, col, self.value),
                })
            }
        }
    }
}

/// Decode the entries of one feed document.
///
/// `url` is only used in error messages.
///
/// # Errors
///
/// Returns [`FeedError::MalformedFeed`] for invalid XML, entries missing the
/// link or cell element their kind requires, and unparsable cell coordinates.
pub fn parse_feed(xml: &str, url: &str, kind: FeedKind) -> FeedResult<Vec<Entry>> {
    let mut reader = Reader::from_str(xml);

    let mut entries = Vec::new();
    let mut current: Option<PartialEntry> = None;
    let mut capture = Capture::None;
    let mut text = String::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            FeedError::malformed(
                url,
                format!("XML error at position {}: {e}", reader.buffer_position()),
            )
        })?;

        match event {
            Event::Start(e) => {
                if e.local_name().as_ref() == b"entry" {
                    current = Some(PartialEntry::default());
                } else if let Some(entry) = current.as_mut() {
                    capture = start_element(entry, &e, url)?;
                    text.clear();
                }
            }
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"entry" {
                    entries.push(PartialEntry::default().finish(url, kind, entries.len())?);
                } else if let Some(entry) = current.as_mut() {
                    // Self-closing elements carry no text
                    let empty = start_element(entry, &e, url)?;
                    text.clear();
                    end_element(entry, empty, &mut text);
                }
            }
            Event::Text(t) if capture != Capture::None => {
                let unescaped = t
                    .unescape()
                    .map_err(|e| FeedError::malformed(url, format!("invalid text: {e}")))?;
                text.push_str(&unescaped);
            }
            Event::CData(t) if capture != Capture::None => {
                text.push_str(&String::from_utf8_lossy(&t));
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"entry" {
                    if let Some(entry) = current.take() {
                        entries.push(entry.finish(url, kind, entries.len())?);
                    }
                    capture = Capture::None;
                } else if let Some(entry) = current.as_mut() {
                    if capture != Capture::None {
                        end_element(entry, capture, &mut text);
                        capture = Capture::None;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if current.is_some() {
        return Err(FeedError::malformed(url, "unterminated entry"));
    }

    Ok(entries)
}

/// Record attributes of an element inside an entry and report what text it carries.
fn start_element(entry: &mut PartialEntry, e: &BytesStart<'_>, url: &str) -> FeedResult<Capture> {
    match e.local_name().as_ref() {
        b"title" => Ok(Capture::Title),
        b"id" => Ok(Capture::Id),
        b"link" => {
            let rel = attribute(e, b"rel", url)?;
            let href = attribute(e, b"href", url)?;
            if let (Some(rel), Some(href)) = (rel, href) {
                entry.links.push((rel, href));
            }
            Ok(Capture::None)
        }
        b"cell" => {
            let row = coordinate(e, b"row", url)?;
            let col = coordinate(e, b"col", url)?;
            entry.cell = Some((row, col));
            Ok(Capture::Cell)
        }
        _ => Ok(Capture::None),
    }
}

fn end_element(entry: &mut PartialEntry, capture: Capture, text: &mut String) {
    let value = std::mem::take(text);
    match capture {
        Capture::Title => entry.title = Some(value),
        Capture::Id => entry.id = Some(value),
        Capture::Cell => entry.value = value,
        Capture::None => {}
    }
}

fn attribute(e: &BytesStart<'_>, name: &[u8], url: &str) -> FeedResult<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| FeedError::malformed(url, format!("invalid attribute: {err}")))?;
        if attr.key.local_name().as_ref() == name {
            let value = attr
                .unescape_value()
                .map_err(|err| FeedError::malformed(url, format!("invalid attribute: {err}")))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Read a 1-based cell coordinate attribute.
fn coordinate(e: &BytesStart<'_>, name: &[u8], url: &str) -> FeedResult<u32> {
    let label = String::from_utf8_lossy(name);
    let raw = attribute(e, name, url)?
        .ok_or_else(|| FeedError::malformed(url, format!("cell element without {label}")))?;

    match raw.trim().parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(FeedError::malformed(
            url,
            format!("invalid cell {label} '{raw}'"),
        )),
    }
}
