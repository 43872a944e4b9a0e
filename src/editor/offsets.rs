//! Linear offsets of a selection within its host's full text.

use super::document::{Document, HostShape};
use super::tracker::SelectionInfo;

/// Byte offsets into the host's full text, on character boundaries,
/// consistent with the host's native value representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedSelection {
    pub full_text: String,
    pub range: TextRange,
}

/// Compute the selection's [`TextRange`] relative to the host's full text.
///
/// Native controls report their own selection bounds directly. Rich regions
/// have no linear offset API, so the start is measured by probing the length
/// of everything between the host's start and the selection's start; the end
/// is the start plus the selected text's length. The result always satisfies
/// `start <= end <= full_text.len()`.
pub fn resolve_offsets(doc: &Document, info: &SelectionInfo) -> Option<ResolvedSelection> {
    let resolved = match doc.shape(info.host) {
        HostShape::SingleLineControl | HostShape::MultiLineControl => {
            let control = doc.control(info.host)?;
            let full_text = control.value.clone();
            let start = control.selection_start.min(full_text.len());
            let end = control.selection_end.clamp(start, full_text.len());
            ResolvedSelection {
                full_text,
                range: TextRange { start, end },
            }
        }
        HostShape::RichRegion | HostShape::StaticText => {
            let full_text = doc.text_content(info.host);
            let start = doc
                .text_offset_of(info.host, &info.range.start)?
                .min(full_text.len());
            let end = (start + info.text.len()).min(full_text.len());
            ResolvedSelection {
                full_text,
                range: TextRange { start, end },
            }
        }
    };

    debug_assert!(resolved.range.start <= resolved.range.end);
    debug_assert!(resolved.range.end <= resolved.full_text.len());
    Some(resolved)
}
