//! Archived-page (MHTML/MHT) container decoding.
//!
//! Saved-page containers are MIME `multipart/related` documents: top-level
//! headers declare a `boundary` parameter, and each `--boundary`-delimited
//! part carries its own headers plus an encoded body. Only the `text/html`
//! part matters here; images, stylesheets, and scripts are skipped.

use std::sync::LazyLock;

use base64::Engine as _;
use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use tracing::debug;

use releasewatch_shared::{ReleaseWatchError, Result};

// ---------------------------------------------------------------------------
// Header parameter patterns (compiled once)
// ---------------------------------------------------------------------------

/// Matches the `boundary=...` parameter of a Content-Type value.
static BOUNDARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)boundary\s*=\s*"?([^";]+)"?"#).expect("boundary regex"));

/// Matches the `charset=...` parameter of a Content-Type value.
static CHARSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*"?([^";]+)"?"#).expect("charset regex"));

// ---------------------------------------------------------------------------
// Container walking
// ---------------------------------------------------------------------------

/// Extract the decoded `text/html` part from an archived-page container.
///
/// Returns `Ok(None)` when the container is well-formed but carries no
/// `text/html` part. Structural problems (no Content-Type, no boundary,
/// undecodable part body) are errors; the caller skips the file.
pub fn extract_html(raw: &str) -> Result<Option<String>> {
    let lines: Vec<&str> = raw.lines().collect();

    let header_end = lines
        .iter()
        .position(|l| l.trim().is_empty())
        .unwrap_or(lines.len());
    let top_headers = unfold_headers(&lines[..header_end]);

    let content_type = header_value(&top_headers, "content-type").ok_or_else(|| {
        ReleaseWatchError::decode("container has no top-level Content-Type header")
    })?;

    let boundary = BOUNDARY_RE
        .captures(content_type)
        .map(|caps| caps[1].trim().to_string())
        .ok_or_else(|| {
            ReleaseWatchError::decode("container Content-Type has no boundary parameter")
        })?;

    let delimiter = format!("--{boundary}");
    let terminator = format!("--{boundary}--");

    // Slice the remaining lines into parts at each boundary delimiter.
    // Anything before the first delimiter is MIME preamble and is dropped.
    let mut parts: Vec<Vec<&str>> = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for &line in &lines[header_end..] {
        let trimmed = line.trim_end();
        if trimmed == terminator {
            if let Some(part) = current.take() {
                parts.push(part);
            }
            break;
        }
        if trimmed == delimiter {
            if let Some(part) = current.take() {
                parts.push(part);
            }
            current = Some(Vec::new());
            continue;
        }
        if let Some(ref mut part) = current {
            part.push(line);
        }
    }
    if let Some(part) = current.take() {
        parts.push(part);
    }

    for part in &parts {
        if let Some(html) = decode_part(part)? {
            return Ok(Some(html));
        }
    }

    Ok(None)
}

/// Decode a single container part, returning its markup when the part is
/// `text/html` and `None` otherwise.
fn decode_part(lines: &[&str]) -> Result<Option<String>> {
    let header_end = lines
        .iter()
        .position(|l| l.trim().is_empty())
        .unwrap_or(lines.len());
    let headers = unfold_headers(&lines[..header_end]);

    let content_type = header_value(&headers, "content-type").unwrap_or_default();
    if !content_type.to_lowercase().starts_with("text/html") {
        return Ok(None);
    }

    let body_lines = if header_end < lines.len() {
        &lines[header_end + 1..]
    } else {
        &[][..]
    };

    let transfer = header_value(&headers, "content-transfer-encoding")
        .map(|v| v.trim().to_lowercase())
        .unwrap_or_default();

    let bytes: Vec<u8> = match transfer.as_str() {
        "quoted-printable" => {
            // Rejoin with CRLF so soft line breaks (`=` at end of line) decode.
            let body = body_lines.join("\r\n");
            quoted_printable::decode(body.as_bytes(), quoted_printable::ParseMode::Robust)
                .map_err(|e| ReleaseWatchError::decode(format!("quoted-printable: {e}")))?
        }
        "base64" => {
            let compact: String = body_lines
                .concat()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            base64::engine::general_purpose::STANDARD
                .decode(compact.as_bytes())
                .map_err(|e| ReleaseWatchError::decode(format!("base64: {e}")))?
        }
        "" | "7bit" | "8bit" | "binary" => body_lines.join("\n").into_bytes(),
        other => {
            return Err(ReleaseWatchError::decode(format!(
                "unsupported transfer encoding: {other}"
            )));
        }
    };

    let charset = CHARSET_RE
        .captures(content_type)
        .map(|caps| caps[1].trim().to_string());

    let encoding = charset
        .as_deref()
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (text, _, _) = encoding.decode(&bytes);
    debug!(
        charset = encoding.name(),
        bytes = bytes.len(),
        "decoded text/html part"
    );
    Ok(Some(text.into_owned()))
}

// ---------------------------------------------------------------------------
// Header helpers
// ---------------------------------------------------------------------------

/// Unfold MIME headers (continuation lines start with whitespace) into
/// `(lowercased-name, value)` pairs.
fn unfold_headers(lines: &[&str]) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = Vec::new();
    for &line in lines {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(last) = headers.last_mut() {
                last.1.push(' ');
                last.1.push_str(line.trim());
            }
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_lowercase(), value.trim().to_string()));
        }
    }
    headers
}

/// Look up a header value by lowercased name.
fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}
