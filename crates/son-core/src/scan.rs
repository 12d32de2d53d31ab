//! Nesting-depth pre-scan over raw XML text.
//!
//! Building a tree recurses once per element level, in the parser as well as
//! in the decoder, so text input is measured with a flat walk over tag
//! boundaries before it reaches the parser. The walk tracks nesting only;
//! every other well-formedness check is left to the parser.

use memchr::{memchr, memchr3, memmem};
use tracing::warn;

use crate::error::{Result, SonError};

/// Element levels above the decoder's own depth count: the wrapper root and
/// the document element.
pub(crate) const WRAPPER_LEVELS: usize = 2;

/// Fail with [`SonError::DepthLimitExceeded`] if any element of `xml` sits
/// deeper than a decode under `max_depth` would accept.
pub(crate) fn check_depth(xml: &str, max_depth: usize) -> Result<()> {
    if exceeds_levels(xml.as_bytes(), max_depth.saturating_add(WRAPPER_LEVELS)) {
        warn!(limit = max_depth, "nesting depth limit exceeded before parsing");
        return Err(SonError::DepthLimitExceeded { limit: max_depth });
    }
    Ok(())
}

/// Whether any element opens more than `levels` deep (the outermost element
/// is level 1). Stops at the first offending start tag.
fn exceeds_levels(bytes: &[u8], levels: usize) -> bool {
    let mut depth = 0usize;
    let mut pos = 0usize;
    while let Some(offset) = memchr(b'<', &bytes[pos..]) {
        let start = pos + offset + 1;
        let rest = &bytes[start..];
        pos = if rest.starts_with(b"!--") {
            skip_past(bytes, start + 3, b"-->")
        } else if rest.starts_with(b"![CDATA[") {
            skip_past(bytes, start + 8, b"]]>")
        } else if rest.starts_with(b"?") {
            skip_past(bytes, start + 1, b"?>")
        } else if rest.starts_with(b"!") {
            skip_past(bytes, start + 1, b">")
        } else if rest.starts_with(b"/") {
            depth = depth.saturating_sub(1);
            skip_past(bytes, start + 1, b">")
        } else {
            if depth + 1 > levels {
                return true;
            }
            let (end, self_closing) = start_tag_end(bytes, start);
            if !self_closing {
                depth += 1;
            }
            end
        };
    }
    false
}

/// Position just past the next `needle` at or after `from`, or end of input.
fn skip_past(bytes: &[u8], from: usize, needle: &[u8]) -> usize {
    let from = from.min(bytes.len());
    memmem::find(&bytes[from..], needle).map_or(bytes.len(), |i| from + i + needle.len())
}

/// Position just past the `>` closing a start tag, skipping quoted attribute
/// values, and whether the tag was written `<.../>`.
fn start_tag_end(bytes: &[u8], mut pos: usize) -> (usize, bool) {
    while let Some(offset) = memchr3(b'>', b'"', b'\'', &bytes[pos..]) {
        let at = pos + offset;
        match bytes[at] {
            b'>' => return (at + 1, bytes[at - 1] == b'/'),
            quote => {
                pos = memchr(quote, &bytes[at + 1..]).map_or(bytes.len(), |i| at + 2 + i);
            }
        }
    }
    (bytes.len(), false)
}
