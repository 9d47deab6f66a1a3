use crate::error::{Error, Result};
use crate::text::Analyzer;
use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::borrow::Cow;
use std::fmt;

/// Stands in for an address that cannot be found in a header.
pub const UNKNOWN_ADDRESS: &str = "Me";

static ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\w\.-]+@[\w\.-]+").expect("valid address pattern"));

/// A message as the provider returns it with `format=full`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    pub id: String,
    #[serde(default)]
    pub label_ids: Vec<String>,
    pub payload: Option<RawPart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPart {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub headers: Vec<RawHeader>,
    pub body: Option<RawBody>,
    pub parts: Option<Vec<RawPart>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHeader {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBody {
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub subject: Option<String>,
    pub date: Option<DateTime<FixedOffset>>,
    pub subject_stems: Vec<String>,
    pub body_stems: Vec<String>,
    pub labels: Vec<String>,
}

impl Message {
    pub fn parse(raw: RawMessage, analyzer: &Analyzer) -> Result<Message> {
        let payload = match raw.payload {
            Some(payload) => payload,
            None => {
                return Err(Error::UnparseableMessage {
                    id: raw.id,
                    reason: "no payload".to_string(),
                })
            }
        };

        let mut message = Message {
            id: raw.id,
            sender: None,
            recipient: None,
            subject: None,
            date: None,
            subject_stems: vec![],
            body_stems: vec![],
            labels: raw.label_ids,
        };
        for header in payload.headers.iter() {
            match header.name.as_str() {
                "Subject" => {
                    message.subject_stems = analyzer.analyze(&header.value);
                    message.subject = Some(header.value.clone());
                }
                "From" => message.sender = Some(extract_address(&header.value)),
                "Delivered-To" | "To" => message.recipient = Some(extract_address(&header.value)),
                "Date" => {
                    message.date =
                        DateTime::parse_from_rfc2822(&normalize_datetime(&header.value)).ok()
                }
                _ => {}
            }
        }

        let body = match payload.parts.as_deref() {
            Some(parts) if !parts.is_empty() => find_text_part(parts).and_then(part_data),
            _ => part_data(&payload),
        };
        match body {
            Some(data) => message.body_stems = analyzer.analyze_encoded(data),
            None => log::debug!("Message {} has no readable text body", message.id),
        }
        Ok(message)
    }

    /// Every stem of the subject followed by every stem of the body.
    pub fn stems(&self) -> impl Iterator<Item = &str> {
        self.subject_stems
            .iter()
            .chain(self.body_stems.iter())
            .map(String::as_str)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ID: {}", self.id)?;
        if let Some(date) = &self.date {
            write!(f, ", Date: {}", date.format("%Y-%m-%d %H:%M"))?;
        }
        write!(f, ", From: {}", self.sender.as_deref().unwrap_or(UNKNOWN_ADDRESS))?;
        if let Some(recipient) = &self.recipient {
            write!(f, ", To: {}", recipient)?;
        }
        write!(f, ", Subject: {}", self.subject.as_deref().unwrap_or(""))
    }
}

/// Pulls the bare address out of a header such as `First Last <user@host>`.
pub fn extract_address(raw: &str) -> String {
    ADDRESS
        .find(raw)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string())
}

fn normalize_datetime(mut dt: &str) -> Cow<str> {
    // Trailing commentary timezone info is not recognized.
    if dt.ends_with(')') {
        if let Some(pos) = dt.rfind('(') {
            dt = &dt[..pos];
        }
    }
    dt = dt.trim();
    // -0000 timezone cannot be parsed. Let's just treat it as +0000.
    if dt.ends_with("-0000") {
        Cow::Owned(format!("{}+0000", &dt[..dt.len() - 5]))
    } else {
        Cow::Borrowed(dt)
    }
}

fn find_text_part(parts: &[RawPart]) -> Option<&RawPart> {
    if let Some(first) = parts.first() {
        if first.mime_type == "multipart/alternative" {
            if let Some(nested) = first.parts.as_deref() {
                return find_text_part(nested);
            }
        }
    }
    parts
        .iter()
        .find(|part| part.mime_type == "text/plain")
        .or_else(|| parts.iter().find(|part| part.mime_type == "text/html"))
}

fn part_data(part: &RawPart) -> Option<&str> {
    part.body.as_ref()?.data.as_deref()
}
