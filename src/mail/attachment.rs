//! Attachment naming and RFC 2047 encoded-words.
//!
//! Mail headers are 7-bit text, so a file name such as `报表.xlsx` has to
//! travel as `=?UTF-8?B?5oql6KGoLnhsc3g=?=` to reach the recipient intact.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Content type of `.xlsx` workbooks.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Longest payload (in bytes) per encoded-word: 45 bytes become 60 base64
/// characters, keeping each word under the 75 character limit.
const MAX_WORD_BYTES: usize = 45;

/// Returns the display name for an attachment: the last non-empty path segment.
pub fn name_for(path: &str) -> String {
    path.split(std::path::is_separator)
        .rfind(|segment| !segment.is_empty())
        .unwrap_or(path)
        .to_string()
}

/// Encodes header text as UTF-8 `B` encoded-words when it is not plain
/// printable ASCII. Long values are split into several space-separated words
/// without breaking a character.
pub fn encode_words(text: &str) -> String {
    if !needs_encoding(text) {
        return text.to_string();
    }

    let mut words = Vec::new();
    let mut chunk_start = 0;
    let mut chunk_len = 0;
    for (offset, ch) in text.char_indices() {
        if chunk_len + ch.len_utf8() > MAX_WORD_BYTES {
            words.push(encode_word(&text[chunk_start..offset]));
            chunk_start = offset;
            chunk_len = 0;
        }
        chunk_len += ch.len_utf8();
    }
    words.push(encode_word(&text[chunk_start..]));
    words.join(" ")
}

fn encode_word(chunk: &str) -> String {
    format!("=?UTF-8?B?{}?=", STANDARD.encode(chunk.as_bytes()))
}

fn needs_encoding(text: &str) -> bool {
    text.contains("=?")
        || text
            .chars()
            .any(|c| !(c.is_ascii_graphic() || c == ' ') || c == '"' || c == '\\')
}

/// Decodes a header value containing RFC 2047 encoded-words.
///
/// Whitespace between adjacent encoded-words is dropped, as the standard
/// requires. Returns `None` for malformed words or charsets other than UTF-8
/// and US-ASCII.
pub fn decode_words(value: &str) -> Option<String> {
    static WORD_RE: OnceLock<Regex> = OnceLock::new();
    let re = WORD_RE.get_or_init(|| {
        Regex::new(r"=\?([^?\s]+)\?([BbQq])\?([^?\s]*)\?=").expect("encoded-word pattern is valid")
    });

    let mut bytes = Vec::with_capacity(value.len());
    let mut last_end = 0;
    let mut previous_was_word = false;

    for caps in re.captures_iter(value) {
        let whole = caps.get(0)?;
        let between = &value[last_end..whole.start()];
        if !(previous_was_word && between.trim().is_empty()) {
            bytes.extend_from_slice(between.as_bytes());
        }

        let charset = caps[1].split('*').next().unwrap_or("").to_ascii_uppercase();
        if charset != "UTF-8" && charset != "US-ASCII" {
            return None;
        }

        let payload = &caps[3];
        match &caps[2] {
            "B" | "b" => bytes.extend(STANDARD.decode(payload).ok()?),
            _ => bytes.extend(decode_q(payload)?),
        }

        last_end = whole.end();
        previous_was_word = true;
    }
    bytes.extend_from_slice(value[last_end..].as_bytes());

    String::from_utf8(bytes).ok()
}

/// Decodes the `Q` encoding: `_` is a space, `=XX` a hex byte.
fn decode_q(payload: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(payload.len());
    let mut iter = payload.bytes();
    while let Some(b) = iter.next() {
        match b {
            b'_' => out.push(b' '),
            b'=' => {
                let hi = (iter.next()? as char).to_digit(16)?;
                let lo = (iter.next()? as char).to_digit(16)?;
                out.push((hi * 16 + lo) as u8);
            }
            other => out.push(other),
        }
    }
    Some(out)
}

/// Guesses a content type from the file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("xlsx") => XLSX_CONTENT_TYPE,
        Some("csv") => "text/csv",
        _ => "application/octet-stream",
    }
}

/// A file to attach, with its header-safe name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentDescriptor {
    pub path: PathBuf,
    pub display_name: String,
    pub content_type: &'static str,
}

impl AttachmentDescriptor {
    /// Describes the file at `path`, or returns `None` if it does not exist.
    pub fn for_path(path: &Path) -> Option<Self> {
        if !path.is_file() {
            return None;
        }
        Some(Self {
            path: path.to_path_buf(),
            display_name: name_for(&path.to_string_lossy()),
            content_type: content_type_for(path),
        })
    }

    /// Display name as it appears in headers.
    pub fn encoded_name(&self) -> String {
        encode_words(&self.display_name)
    }

    /// `Content-Type` value carrying the encoded name.
    pub fn content_type_header(&self) -> String {
        format!("{}; name=\"{}\"", self.content_type, self.encoded_name())
    }
}
