//! In-process document model the selection subsystem operates on.
//!
//! This is the crate's stand-in for the page DOM: an element/text node tree
//! with focus, a current raw selection, and per-node layout rectangles. Text
//! offsets are byte offsets into UTF-8 strings and must lie on character
//! boundaries.

pub type NodeId = usize;

pub const ROOT: NodeId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// Single-line text control.
    Input,
    /// Multi-line text control.
    TextArea,
    /// Block-level container (div, p, ...).
    Block,
    /// Inline container (span, em, ...).
    Inline,
}

/// Value and selection state of a native text control.
#[derive(Debug, Clone, Default)]
pub struct ControlState {
    pub value: String,
    pub selection_start: usize,
    pub selection_end: usize,
}

#[derive(Debug, Clone)]
pub enum NodeData {
    Element {
        tag: Tag,
        content_editable: bool,
        control: Option<ControlState>,
    },
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn union(self, other: Rect) -> Rect {
        if self.width == 0.0 && self.height == 0.0 {
            return other;
        }
        if other.width == 0.0 && other.height == 0.0 {
            return self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Rect {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub data: NodeData,
    pub rect: Rect,
}

/// One endpoint of a range: a node plus a byte offset into its text. For
/// control nodes the offset indexes the control value; for text nodes it
/// indexes the node's own text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub node: NodeId,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomRange {
    pub start: Endpoint,
    pub end: Endpoint,
}

impl DomRange {
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// The document's current selection. May hold several non-contiguous ranges;
/// consumers only ever look at the first.
#[derive(Debug, Clone, Default)]
pub struct RawSelection {
    pub ranges: Vec<DomRange>,
}

impl RawSelection {
    pub fn first_range(&self) -> Option<&DomRange> {
        self.ranges.first()
    }
}

/// How a host element accepts (or refuses) edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostShape {
    SingleLineControl,
    MultiLineControl,
    RichRegion,
    StaticText,
}

pub struct Document {
    nodes: Vec<Node>,
    focused: Option<NodeId>,
    selection: Option<RawSelection>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Element {
                    tag: Tag::Block,
                    content_editable: false,
                    control: None,
                },
                rect: Rect::default(),
            }],
            focused: None,
            selection: None,
        }
    }

    pub fn insert_element(&mut self, parent: NodeId, tag: Tag, content_editable: bool) -> NodeId {
        let control = match tag {
            Tag::Input | Tag::TextArea => Some(ControlState::default()),
            _ => None,
        };
        self.push_node(
            parent,
            NodeData::Element {
                tag,
                content_editable,
                control,
            },
        )
    }

    pub fn insert_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.push_node(parent, NodeData::Text(text.into()))
    }

    fn push_node(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            data,
            rect: Rect::default(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn set_rect(&mut self, id: NodeId, rect: Rect) {
        self.nodes[id].rect = rect;
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.nodes[id].data, NodeData::Text(_))
    }

    pub fn control(&self, id: NodeId) -> Option<&ControlState> {
        match &self.nodes[id].data {
            NodeData::Element {
                control: Some(state),
                ..
            } => Some(state),
            _ => None,
        }
    }

    pub fn control_mut(&mut self, id: NodeId) -> Option<&mut ControlState> {
        match &mut self.nodes[id].data {
            NodeData::Element {
                control: Some(state),
                ..
            } => Some(state),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Focus and selection
    // ------------------------------------------------------------------

    pub fn set_focus(&mut self, id: Option<NodeId>) {
        self.focused = id;
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn select(&mut self, range: DomRange) {
        self.selection = Some(RawSelection {
            ranges: vec![range],
        });
    }

    pub fn select_ranges(&mut self, ranges: Vec<DomRange>) {
        self.selection = Some(RawSelection { ranges });
    }

    /// Select `[start, end)` inside a native control, mirroring the control's
    /// own selection bounds.
    pub fn select_in_control(&mut self, id: NodeId, start: usize, end: usize) {
        if let Some(state) = self.control_mut(id) {
            state.selection_start = start;
            state.selection_end = end;
        }
        self.select(DomRange {
            start: Endpoint { node: id, offset: start },
            end: Endpoint { node: id, offset: end },
        });
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn selection(&self) -> Option<&RawSelection> {
        self.selection.as_ref()
    }

    // ------------------------------------------------------------------
    // Shape and ancestry
    // ------------------------------------------------------------------

    pub fn shape(&self, id: NodeId) -> HostShape {
        match &self.nodes[id].data {
            NodeData::Text(_) => HostShape::StaticText,
            NodeData::Element { tag: Tag::Input, .. } => HostShape::SingleLineControl,
            NodeData::Element {
                tag: Tag::TextArea, ..
            } => HostShape::MultiLineControl,
            NodeData::Element { .. } => {
                if self.is_content_editable(id) {
                    HostShape::RichRegion
                } else {
                    HostShape::StaticText
                }
            }
        }
    }

    /// Whether `id` sits inside an editable region. The flag inherits from
    /// ancestors, like the platform's own notion of content-editability.
    pub fn is_content_editable(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if let NodeData::Element {
                content_editable: true,
                ..
            } = self.nodes[node].data
            {
                return true;
            }
            current = self.nodes[node].parent;
        }
        false
    }

    pub fn is_editable_host(&self, id: NodeId) -> bool {
        self.shape(id) != HostShape::StaticText
    }

    /// Nearest ancestor (self included) that is a text control or carries the
    /// editable flag itself.
    pub fn nearest_editable_ancestor(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            match &self.nodes[node].data {
                NodeData::Element {
                    control: Some(_), ..
                } => return Some(node),
                NodeData::Element {
                    content_editable: true,
                    ..
                } => return Some(node),
                _ => {}
            }
            current = self.nodes[node].parent;
        }
        None
    }

    /// The element a text node belongs to; elements map to themselves.
    pub fn element_of(&self, id: NodeId) -> NodeId {
        if self.is_text(id) {
            self.nodes[id].parent.unwrap_or(ROOT)
        } else {
            id
        }
    }

    pub fn common_ancestor(&self, range: &DomRange) -> NodeId {
        if range.start.node == range.end.node {
            return range.start.node;
        }
        let mut seen = Vec::new();
        let mut current = Some(range.start.node);
        while let Some(node) = current {
            seen.push(node);
            current = self.nodes[node].parent;
        }
        let mut current = Some(range.end.node);
        while let Some(node) = current {
            if seen.contains(&node) {
                return node;
            }
            current = self.nodes[node].parent;
        }
        ROOT
    }

    // ------------------------------------------------------------------
    // Text access
    // ------------------------------------------------------------------

    /// Flattened text of all descendant text nodes, in document order.
    /// Control values are not part of flattened text.
    pub fn text_content(&self, id: NodeId) -> String {
        match &self.nodes[id].data {
            NodeData::Text(text) => text.clone(),
            NodeData::Element { .. } => {
                let mut out = String::new();
                for text_node in self.text_nodes_in_order(id) {
                    if let NodeData::Text(text) = &self.nodes[text_node].data {
                        out.push_str(text);
                    }
                }
                out
            }
        }
    }

    pub fn text_nodes_in_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if self.is_text(node) {
                out.push(node);
            }
            for &child in self.nodes[node].children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// The text covered by a range. Handles control-node ranges, single
    /// text-node ranges and ranges spanning several text nodes.
    pub fn range_text(&self, range: &DomRange) -> String {
        if range.start.node == range.end.node {
            let text = match &self.nodes[range.start.node].data {
                NodeData::Text(text) => text.as_str(),
                NodeData::Element {
                    control: Some(state),
                    ..
                } => state.value.as_str(),
                NodeData::Element { .. } => return self.text_content(range.start.node),
            };
            return text
                .get(range.start.offset..range.end.offset)
                .unwrap_or_default()
                .to_string();
        }

        let ancestor = self.common_ancestor(range);
        let mut out = String::new();
        let mut in_range = false;
        for text_node in self.text_nodes_in_order(ancestor) {
            let NodeData::Text(text) = &self.nodes[text_node].data else {
                continue;
            };
            if text_node == range.start.node {
                in_range = true;
                out.push_str(text.get(range.start.offset..).unwrap_or_default());
                continue;
            }
            if text_node == range.end.node {
                out.push_str(text.get(..range.end.offset).unwrap_or_default());
                break;
            }
            if in_range {
                out.push_str(text);
            }
        }
        out
    }

    /// Byte offset of an endpoint within the flattened text of `host`.
    /// This is the probe-range measurement: the length of everything between
    /// the start of the host and the endpoint.
    pub fn text_offset_of(&self, host: NodeId, endpoint: &Endpoint) -> Option<usize> {
        if endpoint.node == host {
            return Some(endpoint.offset);
        }
        let mut total = 0;
        for text_node in self.text_nodes_in_order(host) {
            if text_node == endpoint.node {
                return Some(total + endpoint.offset);
            }
            if let NodeData::Text(text) = &self.nodes[text_node].data {
                total += text.len();
            }
        }
        None
    }

    pub fn range_rect(&self, range: &DomRange) -> Rect {
        self.nodes[range.start.node]
            .rect
            .union(self.nodes[range.end.node].rect)
    }

    // ------------------------------------------------------------------
    // Rich-region mutation
    // ------------------------------------------------------------------

    /// Delete the contents of a range whose endpoints are text nodes, then
    /// insert `text` as a single new text node at the deletion point.
    /// Returns an endpoint immediately after the inserted text.
    pub fn replace_range_with_text(&mut self, range: &DomRange, text: &str) -> Endpoint {
        let DomRange { start, end } = range.clone();

        if start.node == end.node {
            let tail = match &mut self.nodes[start.node].data {
                NodeData::Text(existing) => {
                    let tail = existing.get(end.offset..).unwrap_or_default().to_string();
                    existing.truncate(start.offset);
                    Some(tail)
                }
                // Control nodes are spliced through their value, not here.
                _ => None,
            };
            let Some(tail) = tail else { return start };
            let inserted = self.insert_text_after(start.node, text);
            if !tail.is_empty() {
                self.insert_text_after(inserted, &tail);
            }
            return Endpoint {
                node: inserted,
                offset: text.len(),
            };
        }

        let ancestor = self.common_ancestor(range);
        let ordered = self.text_nodes_in_order(ancestor);
        let mut in_range = false;
        let mut detach = Vec::new();
        for text_node in ordered {
            if text_node == start.node {
                in_range = true;
                if let NodeData::Text(existing) = &mut self.nodes[text_node].data {
                    existing.truncate(start.offset);
                }
                continue;
            }
            if text_node == end.node {
                if let NodeData::Text(existing) = &mut self.nodes[text_node].data {
                    *existing = existing.get(end.offset..).unwrap_or_default().to_string();
                }
                break;
            }
            if in_range {
                detach.push(text_node);
            }
        }
        for node in detach {
            self.detach(node);
        }
        let inserted = self.insert_text_after(start.node, text);
        Endpoint {
            node: inserted,
            offset: text.len(),
        }
    }

    fn insert_text_after(&mut self, sibling: NodeId, text: &str) -> NodeId {
        let parent = self.nodes[sibling].parent.unwrap_or(ROOT);
        let id = self.nodes.len();
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            data: NodeData::Text(text.to_string()),
            rect: Rect::default(),
        });
        let position = self.nodes[parent]
            .children
            .iter()
            .position(|&child| child == sibling)
            .map(|index| index + 1)
            .unwrap_or(self.nodes[parent].children.len());
        self.nodes[parent].children.insert(position, id);
        id
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id].parent {
            self.nodes[parent].children.retain(|&child| child != id);
        }
        self.nodes[id].parent = None;
    }
}
