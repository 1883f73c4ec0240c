use super::LabelId;
use crate::jvm::Error;

/// These types are from [this hierarchy][0]
///
/// The `L` parameter is the representation of positions: inside an instruction list that is a
/// [`LabelId`], and visitors see the external [`super::Label`].
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se7/html/jvms-4.html#jvms-4.10.1.2
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum VerificationType<L> {
    Top,
    Integer,
    Float,
    Double,
    Long,
    Null,

    /// In the constructor, the `this` parameter starts with this type then turns into an object
    /// type after `<init>` is called
    UninitializedThis,

    /// Object type, as an internal name or array descriptor
    Object(String),

    /// State of an object after `new` has been called but `<init>` has not been called. The
    /// position is the one of the `new` instruction.
    Uninitialized(L),
}

impl<L> VerificationType<L> {
    /// Is this type is a reference type?
    pub fn is_reference(&self) -> bool {
        match self {
            VerificationType::Top
            | VerificationType::Integer
            | VerificationType::Float
            | VerificationType::Double
            | VerificationType::Long => false,

            VerificationType::Null
            | VerificationType::UninitializedThis
            | VerificationType::Object(_)
            | VerificationType::Uninitialized(_) => true,
        }
    }

    pub fn map_labels<L2>(&self, map_label: impl FnOnce(&L) -> L2) -> VerificationType<L2> {
        match self {
            VerificationType::Top => VerificationType::Top,
            VerificationType::Integer => VerificationType::Integer,
            VerificationType::Float => VerificationType::Float,
            VerificationType::Double => VerificationType::Double,
            VerificationType::Long => VerificationType::Long,
            VerificationType::Null => VerificationType::Null,
            VerificationType::UninitializedThis => VerificationType::UninitializedThis,
            VerificationType::Object(name) => VerificationType::Object(name.clone()),
            VerificationType::Uninitialized(label) => {
                VerificationType::Uninitialized(map_label(label))
            }
        }
    }
}

/// How a stack map frame relates to the previous frame
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.4
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum FrameType {
    /// Uncompressed frame, listing every local and stack entry (not relative to anything)
    Expanded,

    /// Exactly the locals and stack specified
    Full,

    /// Like the previous frame, with one to three extra locals and an empty stack
    Append,

    /// Like the previous frame, without the last one to three locals and with an empty stack
    Chop,

    /// Same locals as the previous frame and an empty stack
    Same,

    /// Same locals as the previous frame and exactly one stack entry
    Same1,
}

/// Stack map frame
///
/// The shape of `locals` and `stack` is always the one dictated by the frame type, which is checked
/// when the frame is built. For [`FrameType::Chop`], the locals are placeholders for the removed
/// entries (one per chopped local).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Frame<L> {
    frame_type: FrameType,
    locals: Vec<VerificationType<L>>,
    stack: Vec<VerificationType<L>>,
}

/// Frame as it lives in an instruction list
pub type FrameNode = Frame<LabelId>;

impl<L> Frame<L> {
    /// Make a frame, checking that the locals and stack fit the frame type
    pub fn new(
        frame_type: FrameType,
        locals: Vec<VerificationType<L>>,
        stack: Vec<VerificationType<L>>,
    ) -> Result<Frame<L>, Error> {
        let well_formed = match frame_type {
            FrameType::Expanded | FrameType::Full => true,
            FrameType::Append | FrameType::Chop => {
                (1..=3).contains(&locals.len()) && stack.is_empty()
            }
            FrameType::Same => locals.is_empty() && stack.is_empty(),
            FrameType::Same1 => locals.is_empty() && stack.len() == 1,
        };
        if !well_formed {
            return Err(Error::InvalidFrame {
                frame_type,
                locals: locals.len(),
                stack: stack.len(),
            });
        }
        Ok(Frame {
            frame_type,
            locals,
            stack,
        })
    }

    /// Uncompressed frame
    pub fn expanded(locals: Vec<VerificationType<L>>, stack: Vec<VerificationType<L>>) -> Self {
        Frame {
            frame_type: FrameType::Expanded,
            locals,
            stack,
        }
    }

    pub fn full(locals: Vec<VerificationType<L>>, stack: Vec<VerificationType<L>>) -> Self {
        Frame {
            frame_type: FrameType::Full,
            locals,
            stack,
        }
    }

    pub fn append(locals: Vec<VerificationType<L>>) -> Result<Self, Error> {
        Frame::new(FrameType::Append, locals, vec![])
    }

    /// Frame dropping the last `count` locals
    pub fn chop(count: usize) -> Result<Self, Error> {
        let locals = (0..count).map(|_| VerificationType::Top).collect();
        Frame::new(FrameType::Chop, locals, vec![])
    }

    pub fn same() -> Self {
        Frame {
            frame_type: FrameType::Same,
            locals: vec![],
            stack: vec![],
        }
    }

    pub fn same1(stack: VerificationType<L>) -> Self {
        Frame {
            frame_type: FrameType::Same1,
            locals: vec![],
            stack: vec![stack],
        }
    }

    pub fn frame_type(&self) -> FrameType {
        self.frame_type
    }

    pub fn locals(&self) -> &[VerificationType<L>] {
        &self.locals
    }

    pub fn stack(&self) -> &[VerificationType<L>] {
        &self.stack
    }

    /// Positions referred to by uninitialized entries
    pub fn labels(&self) -> impl Iterator<Item = &L> + '_ {
        self.locals
            .iter()
            .chain(self.stack.iter())
            .filter_map(|entry| match entry {
                VerificationType::Uninitialized(label) => Some(label),
                _ => None,
            })
    }

    pub fn map_labels<L2>(&self, mut map_label: impl FnMut(&L) -> L2) -> Frame<L2> {
        Frame {
            frame_type: self.frame_type,
            locals: self
                .locals
                .iter()
                .map(|entry| entry.map_labels(&mut map_label))
                .collect(),
            stack: self
                .stack
                .iter()
                .map(|entry| entry.map_labels(&mut map_label))
                .collect(),
        }
    }
}
