//! Splicing accepted assistant text back into the originating host.

use std::sync::Arc;

use log::warn;

use crate::error::{Error, Result};
use crate::services::notify::Notifier;

use super::document::{Document, DomRange, HostShape, NodeId};
use super::offsets::TextRange;

/// Write access to the ambient clipboard.
pub trait Clipboard: Send {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// System clipboard backed by arboard. The handle is opened lazily on first
/// use; platforms without a clipboard surface `Error::Clipboard` instead of
/// failing construction.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        if self.inner.is_none() {
            match arboard::Clipboard::new() {
                Ok(clipboard) => self.inner = Some(clipboard),
                Err(err) => {
                    return Err(Error::Clipboard(format!("clipboard unavailable: {err}")))
                }
            }
        }
        let Some(clipboard) = self.inner.as_mut() else {
            return Err(Error::Clipboard("clipboard unavailable".to_string()));
        };
        clipboard
            .set_text(text.to_string())
            .map_err(|err| Error::Clipboard(err.to_string()))
    }
}

/// Change-notification contract of the embedding UI framework. Controls must
/// be mutated through this so the framework's change detection observes the
/// edit; `value_changed` fires before `value_committed`, matching the
/// input-then-change convention external listeners rely on.
pub trait ChangeNotifier: Send {
    fn value_changed(&mut self, host: NodeId, value: &str);
    fn value_committed(&mut self, host: NodeId, value: &str);
}

/// Everything remembered about the selection the assistant was opened on.
#[derive(Debug, Clone)]
pub struct PatchTarget {
    pub host: NodeId,
    pub range: TextRange,
    pub dom_range: DomRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The host was mutated in place. For native controls `caret` is the new
    /// caret position; rich regions promise only "after the inserted text".
    Applied { caret: Option<usize> },
    /// No mutation; the text went to the clipboard.
    Copied,
}

pub struct PatchApplier {
    clipboard: Box<dyn Clipboard>,
    notifier: Option<Box<dyn ChangeNotifier>>,
    notices: Arc<dyn Notifier>,
}

impl PatchApplier {
    pub fn new(clipboard: Box<dyn Clipboard>, notices: Arc<dyn Notifier>) -> Self {
        Self {
            clipboard,
            notifier: None,
            notices,
        }
    }

    pub fn with_change_notifier(mut self, notifier: Box<dyn ChangeNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Apply accepted text. With no remembered target, or a read-only host,
    /// the text goes to the clipboard; editable hosts are spliced in place.
    pub fn apply(
        &mut self,
        doc: &mut Document,
        target: Option<&PatchTarget>,
        accepted: &str,
    ) -> Result<PatchOutcome> {
        let Some(target) = target else {
            return self.copy_out(accepted);
        };

        match doc.shape(target.host) {
            HostShape::SingleLineControl | HostShape::MultiLineControl => {
                self.splice_control(doc, target, accepted)
            }
            HostShape::RichRegion => {
                let caret = doc.replace_range_with_text(&target.dom_range, accepted);
                doc.select(DomRange {
                    start: caret,
                    end: caret,
                });
                self.notices.success("AI edit applied");
                Ok(PatchOutcome::Applied { caret: None })
            }
            HostShape::StaticText => self.copy_out(accepted),
        }
    }

    fn splice_control(
        &mut self,
        doc: &mut Document,
        target: &PatchTarget,
        accepted: &str,
    ) -> Result<PatchOutcome> {
        let value = doc
            .control(target.host)
            .map(|control| control.value.clone())
            .ok_or_else(|| Error::Validation("host is not a text control".to_string()))?;

        let TextRange { start, end } = target.range;
        if start > end
            || end > value.len()
            || !value.is_char_boundary(start)
            || !value.is_char_boundary(end)
        {
            return Err(Error::Validation(
                "selection range no longer matches the control value".to_string(),
            ));
        }

        let new_value = format!("{}{}{}", &value[..start], accepted, &value[end..]);

        if let Some(control) = doc.control_mut(target.host) {
            control.value = new_value.clone();
        }
        match self.notifier.as_mut() {
            Some(notifier) => {
                notifier.value_changed(target.host, &new_value);
                notifier.value_committed(target.host, &new_value);
            }
            None => {
                // Documented limitation of the fallback path: the embedding
                // framework will not observe this mutation.
                warn!("no change notifier installed; framework listeners not notified");
            }
        }

        let caret = start + accepted.len();
        if let Some(control) = doc.control_mut(target.host) {
            control.selection_start = caret;
            control.selection_end = caret;
        }
        doc.set_focus(Some(target.host));

        self.notices.success("AI edit applied");
        Ok(PatchOutcome::Applied { caret: Some(caret) })
    }

    fn copy_out(&mut self, accepted: &str) -> Result<PatchOutcome> {
        match self.clipboard.write_text(accepted) {
            Ok(()) => {
                self.notices.success("Result copied to clipboard");
                Ok(PatchOutcome::Copied)
            }
            Err(err) => {
                self.notices.error("Copy to clipboard failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::document::{Endpoint, Tag, ROOT};
    use crate::services::notify::Notice;
    use std::sync::Mutex;

    pub(crate) struct MemoryClipboard {
        pub writes: Arc<Mutex<Vec<String>>>,
        pub fail: bool,
    }

    impl Clipboard for MemoryClipboard {
        fn write_text(&mut self, text: &str) -> Result<()> {
            if self.fail {
                return Err(Error::Clipboard("denied".to_string()));
            }
            self.writes.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct RecordingNotifier {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl ChangeNotifier for RecordingNotifier {
        fn value_changed(&mut self, _host: NodeId, value: &str) {
            self.events.lock().unwrap().push(format!("input:{value}"));
        }

        fn value_committed(&mut self, _host: NodeId, value: &str) {
            self.events.lock().unwrap().push(format!("change:{value}"));
        }
    }

    struct MemoryNotices(Arc<Mutex<Vec<Notice>>>);

    impl Notifier for MemoryNotices {
        fn notify(&self, notice: Notice) {
            self.0.lock().unwrap().push(notice);
        }
    }

    fn applier(
        fail_clipboard: bool,
    ) -> (PatchApplier, Arc<Mutex<Vec<String>>>, Arc<Mutex<Vec<String>>>) {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let events = Arc::new(Mutex::new(Vec::new()));
        let applier = PatchApplier::new(
            Box::new(MemoryClipboard {
                writes: writes.clone(),
                fail: fail_clipboard,
            }),
            Arc::new(MemoryNotices(Arc::new(Mutex::new(Vec::new())))),
        )
        .with_change_notifier(Box::new(RecordingNotifier {
            events: events.clone(),
        }));
        (applier, writes, events)
    }

    #[test]
    fn control_splice_replaces_range_and_moves_caret() {
        let mut doc = Document::new();
        let textarea = doc.insert_element(ROOT, Tag::TextArea, false);
        doc.control_mut(textarea).unwrap().value = "Hello world".to_string();
        let target = PatchTarget {
            host: textarea,
            range: TextRange { start: 0, end: 5 },
            dom_range: DomRange {
                start: Endpoint { node: textarea, offset: 0 },
                end: Endpoint { node: textarea, offset: 5 },
            },
        };

        let (mut applier, _, events) = applier(false);
        let outcome = applier.apply(&mut doc, Some(&target), "Hi").unwrap();

        let control = doc.control(textarea).unwrap();
        assert_eq!(control.value, "Hi world");
        assert_eq!(control.selection_start, 2);
        assert_eq!(control.selection_end, 2);
        assert_eq!(outcome, PatchOutcome::Applied { caret: Some(2) });
        assert_eq!(doc.focused(), Some(textarea));

        // Input-style notification precedes the committal one.
        let seen = events.lock().unwrap();
        assert_eq!(
            seen.as_slice(),
            ["input:Hi world", "change:Hi world"]
        );
    }

    #[test]
    fn splice_without_notifier_still_updates_value() {
        let mut doc = Document::new();
        let input = doc.insert_element(ROOT, Tag::Input, false);
        doc.control_mut(input).unwrap().value = "abc".to_string();
        let target = PatchTarget {
            host: input,
            range: TextRange { start: 1, end: 2 },
            dom_range: DomRange {
                start: Endpoint { node: input, offset: 1 },
                end: Endpoint { node: input, offset: 2 },
            },
        };

        let writes = Arc::new(Mutex::new(Vec::new()));
        let mut applier = PatchApplier::new(
            Box::new(MemoryClipboard {
                writes,
                fail: false,
            }),
            Arc::new(MemoryNotices(Arc::new(Mutex::new(Vec::new())))),
        );
        applier.apply(&mut doc, Some(&target), "XY").unwrap();
        assert_eq!(doc.control(input).unwrap().value, "aXYc");
    }

    #[test]
    fn rich_region_replace() {
        let mut doc = Document::new();
        let region = doc.insert_element(ROOT, Tag::Block, true);
        let text = doc.insert_text(region, "ABCDEF");
        let target = PatchTarget {
            host: region,
            range: TextRange { start: 2, end: 4 },
            dom_range: DomRange {
                start: Endpoint { node: text, offset: 2 },
                end: Endpoint { node: text, offset: 4 },
            },
        };

        let (mut applier, writes, _) = applier(false);
        let outcome = applier.apply(&mut doc, Some(&target), "XY").unwrap();

        assert_eq!(doc.text_content(region), "ABXYEF");
        assert_eq!(outcome, PatchOutcome::Applied { caret: None });
        assert!(writes.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_target_copies_to_clipboard_once() {
        let mut doc = Document::new();
        let (mut applier, writes, _) = applier(false);
        let outcome = applier.apply(&mut doc, None, "draft text").unwrap();

        assert_eq!(outcome, PatchOutcome::Copied);
        assert_eq!(writes.lock().unwrap().as_slice(), ["draft text"]);
    }

    #[test]
    fn read_only_host_copies_instead_of_mutating() {
        let mut doc = Document::new();
        let paragraph = doc.insert_element(ROOT, Tag::Block, false);
        let text = doc.insert_text(paragraph, "static prose");
        let target = PatchTarget {
            host: paragraph,
            range: TextRange { start: 0, end: 6 },
            dom_range: DomRange {
                start: Endpoint { node: text, offset: 0 },
                end: Endpoint { node: text, offset: 6 },
            },
        };

        let (mut applier, writes, _) = applier(false);
        let outcome = applier.apply(&mut doc, Some(&target), "rewrite").unwrap();

        assert_eq!(outcome, PatchOutcome::Copied);
        assert_eq!(doc.text_content(paragraph), "static prose");
        assert_eq!(writes.lock().unwrap().as_slice(), ["rewrite"]);
    }

    #[test]
    fn clipboard_failure_is_surfaced() {
        let mut doc = Document::new();
        let (mut applier, writes, _) = applier(true);
        let err = applier.apply(&mut doc, None, "kept text").unwrap_err();

        assert!(matches!(err, Error::Clipboard(_)));
        assert!(writes.lock().unwrap().is_empty());
    }

    #[test]
    fn stale_range_is_rejected() {
        let mut doc = Document::new();
        let input = doc.insert_element(ROOT, Tag::Input, false);
        doc.control_mut(input).unwrap().value = "ab".to_string();
        let target = PatchTarget {
            host: input,
            range: TextRange { start: 0, end: 10 },
            dom_range: DomRange {
                start: Endpoint { node: input, offset: 0 },
                end: Endpoint { node: input, offset: 10 },
            },
        };

        let (mut applier, _, _) = applier(false);
        let err = applier.apply(&mut doc, Some(&target), "X").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(doc.control(input).unwrap().value, "ab");
    }
}
