use super::InsnId;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_LABEL: AtomicUsize = AtomicUsize::new(0);

/// Opaque label handed to and received from visitors
///
/// Labels are the external representation of a position in a method body. Inside an instruction
/// list, positions are [`LabelId`]s instead, and the two are connected through the label node:
/// producers resolve a `Label` into a label node the first time they see it and consumers receive
/// the `Label` stored on the node (minting a fresh one if there is none).
///
/// Every call to [`Label::new`] returns a label that has never been handed out before.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Label(usize);

impl Label {
    /// Get a fresh label
    pub fn new() -> Label {
        Label(NEXT_LABEL.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for Label {
    fn default() -> Label {
        Label::new()
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_fmt(format_args!("L{}", self.0))
    }
}

/// Handle to a label node in an [`super::InsnArena`]
///
/// Jumps, switches, frames, line numbers, try/catch blocks, and local variable scopes all refer to
/// positions through these handles, so moving instructions around never invalidates a target.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct LabelId(pub(crate) InsnId);

impl LabelId {
    /// Handle of the label node itself
    pub fn insn(self) -> InsnId {
        self.0
    }
}

impl fmt::Debug for LabelId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_fmt(format_args!("label{:?}", self.0))
    }
}

/// Payload of a label pseudo-instruction
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LabelNode {
    /// External label associated with this node, if one was assigned yet
    label: Option<Label>,
}

impl LabelNode {
    /// Label node that has not been handed out to a visitor
    pub fn new() -> LabelNode {
        LabelNode { label: None }
    }

    /// Label node standing for an external label
    pub fn with_label(label: Label) -> LabelNode {
        LabelNode { label: Some(label) }
    }

    /// External label, if one has been assigned
    pub fn label(&self) -> Option<Label> {
        self.label
    }

    /// External label, assigning a fresh one if needed
    pub(crate) fn get_or_assign(&mut self) -> Label {
        *self.label.get_or_insert_with(Label::new)
    }

    /// Forget the external label so the next replay gets a fresh one
    pub(crate) fn reset(&mut self) {
        self.label = None;
    }
}
