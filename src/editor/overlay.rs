//! Glue between the selection tracker, the assistant and the patch applier.
//!
//! The overlay remembers the last resolved selection together with its
//! offsets, builds the open parameters for the assistant (selection plus a
//! bounded context window), and routes accepted text back through the patch
//! applier. The remembered selection is cleared after every apply so a stale
//! range cannot be reapplied.

use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::services::assistant::OpenParams;

use super::document::NodeId;
use super::offsets::{resolve_offsets, ResolvedSelection, TextRange};
use super::patch::{PatchApplier, PatchTarget};
use super::tracker::{
    OnClear, OnSelect, SelectionInfo, SelectionTracker, SharedDocument, TrackerOptions,
};

/// How much text on each side of the selection is shipped as context.
pub const CONTEXT_WINDOW_CHARS: usize = 200;

struct Remembered {
    info: SelectionInfo,
    resolved: ResolvedSelection,
}

#[derive(Clone)]
pub struct AssistantOverlay {
    document: SharedDocument,
    patcher: Arc<Mutex<PatchApplier>>,
    remembered: Arc<Mutex<Option<Remembered>>>,
}

impl AssistantOverlay {
    pub fn new(document: SharedDocument, patcher: PatchApplier) -> Self {
        Self {
            document,
            patcher: Arc::new(Mutex::new(patcher)),
            remembered: Arc::new(Mutex::new(None)),
        }
    }

    /// Build the tracker that feeds this overlay.
    pub fn tracker(&self, options: TrackerOptions) -> SelectionTracker {
        let on_select: OnSelect = {
            let overlay = self.clone();
            Arc::new(move |info: SelectionInfo| overlay.remember(info))
        };
        let on_clear: OnClear = {
            let overlay = self.clone();
            Arc::new(move || overlay.forget())
        };
        SelectionTracker::new(self.document.clone(), options, on_select, on_clear)
    }

    /// Store a freshly resolved selection, superseding any previous one.
    pub fn remember(&self, info: SelectionInfo) {
        let resolved = {
            let doc = self.document.lock().unwrap();
            resolve_offsets(&doc, &info)
        };
        *self.remembered.lock().unwrap() =
            resolved.map(|resolved| Remembered { info, resolved });
    }

    pub fn forget(&self) {
        *self.remembered.lock().unwrap() = None;
    }

    pub fn has_selection(&self) -> bool {
        self.remembered.lock().unwrap().is_some()
    }

    pub fn selected_host(&self) -> Option<NodeId> {
        self.remembered.lock().unwrap().as_ref().map(|r| r.info.host)
    }

    /// Parameters for opening the assistant. With no remembered selection the
    /// assistant still opens; apply then goes to the clipboard.
    pub fn open_params(&self, project_id: i64, chapter_id: Option<i64>) -> OpenParams {
        let (selected_text, context_before, context_after) = {
            let remembered = self.remembered.lock().unwrap();
            match remembered.as_ref() {
                Some(r) => {
                    let (before, after) =
                        context_windows(&r.resolved.full_text, r.resolved.range);
                    (r.info.text.clone(), before, after)
                }
                None => (String::new(), String::new(), String::new()),
            }
        };

        let overlay = self.clone();
        OpenParams {
            project_id,
            selected_text,
            context_before,
            context_after,
            chapter_id,
            on_apply: Box::new(move |text| overlay.apply_text(text)),
            // Cancelling keeps the selection, so a new round can reuse it.
            on_cancel: None,
        }
    }

    /// Splice accepted text into the remembered host, or copy it out when
    /// nothing editable was selected.
    pub fn apply_text(&self, accepted: &str) -> Result<()> {
        let remembered = self.remembered.lock().unwrap().take();
        let target = remembered.map(|r| PatchTarget {
            host: r.info.host,
            range: r.resolved.range,
            dom_range: r.info.range,
        });

        let mut doc = self.document.lock().unwrap();
        let mut patcher = self.patcher.lock().unwrap();
        patcher.apply(&mut doc, target.as_ref(), accepted).map(|_| ())
    }
}

/// Up to [`CONTEXT_WINDOW_CHARS`] characters on each side of the range.
fn context_windows(full_text: &str, range: TextRange) -> (String, String) {
    let before = tail_chars(&full_text[..range.start], CONTEXT_WINDOW_CHARS);
    let after = head_chars(&full_text[range.end..], CONTEXT_WINDOW_CHARS);
    (before.to_string(), after.to_string())
}

fn tail_chars(text: &str, count: usize) -> &str {
    match text.char_indices().rev().nth(count.saturating_sub(1)) {
        Some((index, _)) if count > 0 => &text[index..],
        _ if count == 0 => "",
        _ => text,
    }
}

fn head_chars(text: &str, count: usize) -> &str {
    match text.char_indices().nth(count) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_windows_are_bounded() {
        let long = "a".repeat(500);
        let full = format!("{long}SELECTED{long}");
        let range = TextRange {
            start: 500,
            end: 508,
        };
        let (before, after) = context_windows(&full, range);
        assert_eq!(before.chars().count(), CONTEXT_WINDOW_CHARS);
        assert_eq!(after.chars().count(), CONTEXT_WINDOW_CHARS);
    }

    #[test]
    fn short_context_is_taken_whole() {
        let (before, after) = context_windows("abc XY def", TextRange { start: 4, end: 6 });
        assert_eq!(before, "abc ");
        assert_eq!(after, " def");
    }

    #[test]
    fn multibyte_context_respects_char_boundaries() {
        let full = "春眠不觉晓处处闻啼鸟";
        // Select 觉晓 (bytes 9..15).
        let (before, after) = context_windows(full, TextRange { start: 9, end: 15 });
        assert_eq!(before, "春眠不");
        assert_eq!(after, "处处闻啼鸟");
    }

    #[test]
    fn tail_chars_counts_characters_not_bytes() {
        assert_eq!(tail_chars("春眠不觉晓", 2), "觉晓");
        assert_eq!(tail_chars("abc", 0), "");
        assert_eq!(head_chars("春眠不觉晓", 2), "春眠");
        assert_eq!(head_chars("ab", 5), "ab");
    }
}
