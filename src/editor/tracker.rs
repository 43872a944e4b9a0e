//! Debounced conversion of raw selection events into resolved selections.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::debug;
use tokio::task::JoinHandle;

use super::document::{Document, DomRange, NodeId, Rect};

/// Quiet period before a burst of selection events is resolved. Rapid events
/// within the window collapse into a single resolution.
pub const DEFAULT_QUIET_PERIOD_MS: u64 = 100;

pub type SharedDocument = Arc<Mutex<Document>>;

/// A validated selection, handed to the embedder once the quiet period ends.
/// Superseded wholesale by the next resolution.
#[derive(Debug, Clone)]
pub struct SelectionInfo {
    /// Selected text, trimmed.
    pub text: String,
    /// The resolved host element.
    pub host: NodeId,
    /// Position handle into the document.
    pub range: DomRange,
    /// Geometry for anchoring overlay UI.
    pub bounding_rect: Rect,
}

/// Raw signals the tracker listens for. Which one fired does not matter;
/// both reschedule the same timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    SelectionChanged,
    MouseUp,
}

pub struct TrackerOptions {
    pub enabled: bool,
    pub quiet_period: Duration,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            quiet_period: Duration::from_millis(DEFAULT_QUIET_PERIOD_MS),
        }
    }
}

pub type OnSelect = Arc<dyn Fn(SelectionInfo) + Send + Sync>;
pub type OnClear = Arc<dyn Fn() + Send + Sync>;

pub struct SelectionTracker {
    document: SharedDocument,
    enabled: bool,
    quiet_period: Duration,
    // The one shared timer slot: always aborted before being replaced.
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
    on_select: OnSelect,
    on_clear: OnClear,
}

impl SelectionTracker {
    pub fn new(
        document: SharedDocument,
        options: TrackerOptions,
        on_select: OnSelect,
        on_clear: OnClear,
    ) -> Self {
        Self {
            document,
            enabled: options.enabled,
            quiet_period: options.quiet_period,
            pending: Arc::new(Mutex::new(None)),
            on_select,
            on_clear,
        }
    }

    /// Feed a raw event. Must be called from within a tokio runtime; the
    /// resolution fires on a spawned task after the quiet period.
    pub fn notify(&self, _event: SelectionEvent) {
        if !self.enabled {
            return;
        }

        let mut pending = self.pending.lock().unwrap();
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let document = self.document.clone();
        let on_select = self.on_select.clone();
        let on_clear = self.on_clear.clone();
        let quiet_period = self.quiet_period;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            resolve_current(&document, &on_select, &on_clear);
        }));
    }

    /// Resolve the current selection immediately, skipping the quiet period.
    pub fn resolve_now(&self) {
        if !self.enabled {
            return;
        }
        self.cancel_pending();
        resolve_current(&self.document, &self.on_select, &self.on_clear);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.cancel_pending();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn cancel_pending(&self) {
        if let Some(handle) = self.pending.lock().unwrap().take() {
            handle.abort();
        }
    }
}

impl Drop for SelectionTracker {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

fn resolve_current(document: &SharedDocument, on_select: &OnSelect, on_clear: &OnClear) {
    let resolved = {
        let doc = document.lock().unwrap();
        resolve(&doc)
    };
    match resolved {
        Some(info) => {
            debug!(
                "selection resolved: host={} len={}",
                info.host,
                info.text.len()
            );
            on_select(info);
        }
        None => on_clear(),
    }
}

/// Resolve the document's current selection to a host element and text, or
/// `None` when the selection should be treated as cleared.
fn resolve(doc: &Document) -> Option<SelectionInfo> {
    let selection = doc.selection()?;
    // Non-contiguous selections: only the first range is considered.
    let range = selection.first_range()?;
    if range.is_collapsed() {
        return None;
    }

    let text = doc.range_text(range);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Text-node ancestors resolve to their parent element.
    let ancestor = doc.element_of(doc.common_ancestor(range));

    // The focused editable control wins over DOM ancestry: the caret context
    // is the more reliable signal when the two disagree.
    let host = match doc.focused() {
        Some(focused) if doc.is_editable_host(focused) => focused,
        _ => doc.nearest_editable_ancestor(ancestor).unwrap_or(ancestor),
    };

    Some(SelectionInfo {
        text: trimmed.to_string(),
        host,
        range: range.clone(),
        bounding_rect: doc.range_rect(range),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::document::{Endpoint, Tag, ROOT};

    fn callbacks() -> (
        OnSelect,
        OnClear,
        Arc<Mutex<Vec<SelectionInfo>>>,
        Arc<Mutex<usize>>,
    ) {
        let selections = Arc::new(Mutex::new(Vec::new()));
        let clears = Arc::new(Mutex::new(0));
        let selections_sink = selections.clone();
        let clears_sink = clears.clone();
        let on_select: OnSelect = Arc::new(move |info| {
            selections_sink.lock().unwrap().push(info);
        });
        let on_clear: OnClear = Arc::new(move || {
            *clears_sink.lock().unwrap() += 1;
        });
        (on_select, on_clear, selections, clears)
    }

    fn textarea_doc(value: &str) -> (SharedDocument, NodeId) {
        let mut doc = Document::new();
        let textarea = doc.insert_element(ROOT, Tag::TextArea, false);
        doc.control_mut(textarea).unwrap().value = value.to_string();
        (Arc::new(Mutex::new(doc)), textarea)
    }

    #[tokio::test]
    async fn burst_of_events_resolves_once() {
        let (document, textarea) = textarea_doc("Hello world");
        document.lock().unwrap().select_in_control(textarea, 0, 5);

        let (on_select, on_clear, selections, _) = callbacks();
        let tracker = SelectionTracker::new(
            document,
            TrackerOptions {
                enabled: true,
                quiet_period: Duration::from_millis(10),
            },
            on_select,
            on_clear,
        );

        for _ in 0..5 {
            tracker.notify(SelectionEvent::SelectionChanged);
        }
        tracker.notify(SelectionEvent::MouseUp);
        tokio::time::sleep(Duration::from_millis(60)).await;

        let seen = selections.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].text, "Hello");
        assert_eq!(seen[0].host, textarea);
    }

    #[tokio::test]
    async fn whitespace_only_selection_clears() {
        let (document, textarea) = textarea_doc("a   b");
        document.lock().unwrap().select_in_control(textarea, 1, 4);

        let (on_select, on_clear, selections, clears) = callbacks();
        let tracker =
            SelectionTracker::new(document, TrackerOptions::default(), on_select, on_clear);
        tracker.resolve_now();

        assert!(selections.lock().unwrap().is_empty());
        assert_eq!(*clears.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn collapsed_selection_clears() {
        let (document, textarea) = textarea_doc("Hello");
        document.lock().unwrap().select_in_control(textarea, 2, 2);

        let (on_select, on_clear, selections, clears) = callbacks();
        let tracker =
            SelectionTracker::new(document, TrackerOptions::default(), on_select, on_clear);
        tracker.resolve_now();

        assert!(selections.lock().unwrap().is_empty());
        assert_eq!(*clears.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn focused_control_wins_over_ancestry() {
        let mut doc = Document::new();
        let textarea = doc.insert_element(ROOT, Tag::TextArea, false);
        doc.control_mut(textarea).unwrap().value = "draft".to_string();
        let paragraph = doc.insert_element(ROOT, Tag::Block, false);
        let text = doc.insert_text(paragraph, "static prose");

        // The raw range points at static text, but an editable control holds
        // focus.
        doc.select(DomRange {
            start: Endpoint { node: text, offset: 0 },
            end: Endpoint { node: text, offset: 6 },
        });
        doc.control_mut(textarea).unwrap().selection_start = 0;
        doc.control_mut(textarea).unwrap().selection_end = 5;
        doc.set_focus(Some(textarea));
        let document = Arc::new(Mutex::new(doc));

        let (on_select, on_clear, selections, _) = callbacks();
        let tracker =
            SelectionTracker::new(document, TrackerOptions::default(), on_select, on_clear);
        tracker.resolve_now();

        let seen = selections.lock().unwrap();
        assert_eq!(seen[0].host, textarea);
    }

    #[tokio::test]
    async fn read_only_text_still_resolves() {
        let mut doc = Document::new();
        let paragraph = doc.insert_element(ROOT, Tag::Block, false);
        let text = doc.insert_text(paragraph, "copy me");
        doc.select(DomRange {
            start: Endpoint { node: text, offset: 0 },
            end: Endpoint { node: text, offset: 7 },
        });
        let document = Arc::new(Mutex::new(doc));

        let (on_select, on_clear, selections, _) = callbacks();
        let tracker =
            SelectionTracker::new(document, TrackerOptions::default(), on_select, on_clear);
        tracker.resolve_now();

        let seen = selections.lock().unwrap();
        assert_eq!(seen[0].host, paragraph);
        assert_eq!(seen[0].text, "copy me");
    }

    #[tokio::test]
    async fn only_the_first_of_several_ranges_is_considered() {
        let mut doc = Document::new();
        let paragraph = doc.insert_element(ROOT, Tag::Block, false);
        let first = doc.insert_text(paragraph, "alpha");
        let second = doc.insert_text(paragraph, "omega");
        doc.select_ranges(vec![
            DomRange {
                start: Endpoint { node: first, offset: 0 },
                end: Endpoint { node: first, offset: 5 },
            },
            DomRange {
                start: Endpoint { node: second, offset: 0 },
                end: Endpoint { node: second, offset: 5 },
            },
        ]);
        let document = Arc::new(Mutex::new(doc));

        let (on_select, on_clear, selections, _) = callbacks();
        let tracker =
            SelectionTracker::new(document, TrackerOptions::default(), on_select, on_clear);
        tracker.resolve_now();

        let seen = selections.lock().unwrap();
        assert_eq!(seen[0].text, "alpha");
    }

    #[tokio::test]
    async fn disabled_tracker_ignores_events() {
        let (document, textarea) = textarea_doc("Hello");
        document.lock().unwrap().select_in_control(textarea, 0, 5);

        let (on_select, on_clear, selections, clears) = callbacks();
        let tracker = SelectionTracker::new(
            document,
            TrackerOptions {
                enabled: false,
                quiet_period: Duration::from_millis(5),
            },
            on_select,
            on_clear,
        );
        tracker.notify(SelectionEvent::SelectionChanged);
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(selections.lock().unwrap().is_empty());
        assert_eq!(*clears.lock().unwrap(), 0);
    }
}
