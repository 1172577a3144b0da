//! Timed-text XML parsing.
//!
//! Track list:
//!
//! ```xml
//! <transcript_list docid="1">
//!   <track id="0" name="" lang_code="ja" kind="asr"/>
//! </transcript_list>
//! ```
//!
//! Transcript:
//!
//! ```xml
//! <transcript>
//!   <text start="0.5" dur="2.1">こんにちは</text>
//! </transcript>
//! ```

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::CaptionError;
use crate::types::{CaptionSegment, CaptionTrack, TrackKind};

/// Parses a track list. An empty document yields an empty list.
///
/// # Errors
///
/// Returns [`CaptionError::Xml`] for malformed XML.
pub fn parse_track_list(xml: &str) -> Result<Vec<CaptionTrack>, CaptionError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut tracks = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) if e.name().as_ref() == b"track" => {
                if let Some(track) = track_from_element(&e) {
                    tracks.push(track);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(CaptionError::Xml(e)),
            _ => {}
        }
    }
    Ok(tracks)
}

/// Parses a transcript document into its segments, in document order.
///
/// # Errors
///
/// Returns [`CaptionError::Xml`] for malformed XML.
pub fn parse_transcript(xml: &str) -> Result<Vec<CaptionSegment>, CaptionError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut segments = Vec::new();
    let mut current: Option<CaptionSegment> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"text" => {
                current = Some(CaptionSegment {
                    start_secs: float_attr(&e, b"start"),
                    duration_secs: float_attr(&e, b"dur"),
                    text: String::new(),
                });
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"text" => {
                segments.push(CaptionSegment {
                    start_secs: float_attr(&e, b"start"),
                    duration_secs: float_attr(&e, b"dur"),
                    text: String::new(),
                });
            }
            Ok(Event::Text(e)) => {
                if let Some(segment) = current.as_mut() {
                    let text = match e.unescape() {
                        Ok(text) => text,
                        // Unknown entity: keep the raw text rather than drop the segment.
                        Err(_) => Cow::Owned(String::from_utf8_lossy(&e).replace("&nbsp;", " ")),
                    };
                    segment.text.push_str(&unescape_twice(&text));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(segment) = current.as_mut() {
                    segment.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"text" => {
                if let Some(segment) = current.take() {
                    segments.push(segment);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(CaptionError::Xml(e)),
            _ => {}
        }
    }
    Ok(segments)
}

fn track_from_element(e: &BytesStart<'_>) -> Option<CaptionTrack> {
    let lang_code = string_attr(e, b"lang_code")?;
    if lang_code.is_empty() {
        return None;
    }
    let name = string_attr(e, b"name").unwrap_or_default();
    let kind = match string_attr(e, b"kind").as_deref() {
        Some("asr") => TrackKind::Generated,
        _ => TrackKind::Manual,
    };
    Some(CaptionTrack {
        lang_code,
        name,
        kind,
    })
}

fn string_attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| {
            let raw = String::from_utf8_lossy(attr.value.as_ref()).into_owned();
            match quick_xml::escape::unescape(&raw) {
                Ok(Cow::Owned(decoded)) => decoded,
                _ => raw,
            }
        })
}

fn float_attr(e: &BytesStart<'_>, key: &[u8]) -> f64 {
    string_attr(e, key)
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Caption bodies are frequently escaped twice (`&amp;#39;`), so entities left
/// after the XML-level unescape are decoded once more.
fn unescape_twice(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    quick_xml::escape::unescape(text)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| text.to_string())
}
