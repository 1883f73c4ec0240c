use super::{FrameNode, LabelId, LabelMap, LabelNode};
use crate::jvm::model::TypeAnnotationNode;
use crate::jvm::{Constant, Error, Handle, InsnKind, Opcode};

/// Instruction or pseudo-instruction payload
///
/// There is one variant per [`InsnKind`]. Positions are always [`LabelId`]s (never offsets), so
/// that moving instructions around in a list never silently changes what a jump targets.
#[derive(Clone, Debug, PartialEq)]
pub enum Insn {
    /// Instruction without operands
    Simple(Opcode),

    /// `bipush`, `sipush`, or `newarray` (where the operand is the array type code)
    Int { opcode: Opcode, operand: i32 },

    /// Load, store, or `ret`
    Var { opcode: Opcode, var: u16 },

    /// `new`, `anewarray`, `checkcast`, or `instanceof`
    Type { opcode: Opcode, type_name: String },

    Field {
        opcode: Opcode,
        owner: String,
        name: String,
        descriptor: String,
    },

    Method {
        opcode: Opcode,
        owner: String,
        name: String,
        descriptor: String,
        is_interface: bool,
    },

    InvokeDynamic {
        name: String,
        descriptor: String,
        bootstrap: Handle,
        arguments: Vec<Constant>,
    },

    Jump { opcode: Opcode, target: LabelId },

    Label(LabelNode),

    Ldc(Constant),

    IInc { var: u16, increment: i16 },

    /// Jump table for keys `min..=max` (`targets` has one entry per key)
    TableSwitch {
        min: i32,
        max: i32,
        default: LabelId,
        targets: Vec<LabelId>,
    },

    /// Sorted keys, each with the target in the same position of `targets`
    LookupSwitch {
        default: LabelId,
        keys: Vec<i32>,
        targets: Vec<LabelId>,
    },

    MultiANewArray { descriptor: String, dimensions: u8 },

    Frame(FrameNode),

    /// Source line number for the code starting at `start`
    LineNumber { line: u16, start: LabelId },
}

impl Insn {
    pub fn kind(&self) -> InsnKind {
        match self {
            Insn::Simple(_) => InsnKind::Simple,
            Insn::Int { .. } => InsnKind::Int,
            Insn::Var { .. } => InsnKind::Var,
            Insn::Type { .. } => InsnKind::Type,
            Insn::Field { .. } => InsnKind::Field,
            Insn::Method { .. } => InsnKind::Method,
            Insn::InvokeDynamic { .. } => InsnKind::InvokeDynamic,
            Insn::Jump { .. } => InsnKind::Jump,
            Insn::Label(_) => InsnKind::Label,
            Insn::Ldc(_) => InsnKind::Ldc,
            Insn::IInc { .. } => InsnKind::IInc,
            Insn::TableSwitch { .. } => InsnKind::TableSwitch,
            Insn::LookupSwitch { .. } => InsnKind::LookupSwitch,
            Insn::MultiANewArray { .. } => InsnKind::MultiANewArray,
            Insn::Frame(_) => InsnKind::Frame,
            Insn::LineNumber { .. } => InsnKind::LineNumber,
        }
    }

    /// Opcode of the instruction (`None` for pseudo-instructions)
    pub fn opcode(&self) -> Option<Opcode> {
        match self {
            Insn::Simple(opcode)
            | Insn::Int { opcode, .. }
            | Insn::Var { opcode, .. }
            | Insn::Type { opcode, .. }
            | Insn::Field { opcode, .. }
            | Insn::Method { opcode, .. }
            | Insn::Jump { opcode, .. } => Some(*opcode),
            Insn::InvokeDynamic { .. } => Some(Opcode::INVOKEDYNAMIC),
            Insn::Ldc(_) => Some(Opcode::LDC),
            Insn::IInc { .. } => Some(Opcode::IINC),
            Insn::TableSwitch { .. } => Some(Opcode::TABLESWITCH),
            Insn::LookupSwitch { .. } => Some(Opcode::LOOKUPSWITCH),
            Insn::MultiANewArray { .. } => Some(Opcode::MULTIANEWARRAY),
            Insn::Label(_) | Insn::Frame(_) | Insn::LineNumber { .. } => None,
        }
    }

    /// Labels this instruction refers to (not including itself, if it is a label)
    pub fn label_refs(&self) -> Vec<LabelId> {
        match self {
            Insn::Jump { target, .. } => vec![*target],
            Insn::TableSwitch {
                default, targets, ..
            }
            | Insn::LookupSwitch {
                default, targets, ..
            } => std::iter::once(*default)
                .chain(targets.iter().copied())
                .collect(),
            Insn::Frame(frame) => frame.labels().copied().collect(),
            Insn::LineNumber { start, .. } => vec![*start],
            _ => vec![],
        }
    }

    /// Copy of the payload with every label reference passed through `map_label`
    ///
    /// Panics on a label payload: the copy of a label node is its entry in a [`LabelMap`], which
    /// [`super::InsnArena::duplicate`] and [`super::InsnArena::import`] look up.
    pub fn map_labels(&self, mut map_label: impl FnMut(LabelId) -> LabelId) -> Insn {
        match self {
            Insn::Jump { opcode, target } => Insn::Jump {
                opcode: *opcode,
                target: map_label(*target),
            },
            Insn::Label(_) => {
                panic!("label nodes are copied through their entry in the label map")
            }
            Insn::TableSwitch {
                min,
                max,
                default,
                targets,
            } => Insn::TableSwitch {
                min: *min,
                max: *max,
                default: map_label(*default),
                targets: targets.iter().map(|target| map_label(*target)).collect(),
            },
            Insn::LookupSwitch {
                default,
                keys,
                targets,
            } => Insn::LookupSwitch {
                default: map_label(*default),
                keys: keys.clone(),
                targets: targets.iter().map(|target| map_label(*target)).collect(),
            },
            Insn::Frame(frame) => Insn::Frame(frame.map_labels(|label| map_label(*label))),
            Insn::LineNumber { line, start } => Insn::LineNumber {
                line: *line,
                start: map_label(*start),
            },
            other => other.clone(),
        }
    }
}

/// Node in an instruction list: an instruction along with its type annotations
///
/// Nodes are built detached with the constructors below, which check that the opcode matches the
/// kind of node. They then get moved into an [`super::InsnArena`] to be placed in lists.
#[derive(Debug, PartialEq)]
pub struct InsnNode {
    insn: Insn,
    visible_type_annotations: Vec<TypeAnnotationNode>,
    invisible_type_annotations: Vec<TypeAnnotationNode>,
}

impl InsnNode {
    fn new(insn: Insn) -> InsnNode {
        InsnNode {
            insn,
            visible_type_annotations: vec![],
            invisible_type_annotations: vec![],
        }
    }

    fn assert_kind(opcode: Opcode, kind: InsnKind) {
        assert_eq!(
            opcode.kind(),
            kind,
            "opcode {} cannot be used in a {:?} instruction",
            opcode,
            kind
        );
    }

    pub fn simple(opcode: Opcode) -> InsnNode {
        Self::assert_kind(opcode, InsnKind::Simple);
        InsnNode::new(Insn::Simple(opcode))
    }

    pub fn int(opcode: Opcode, operand: i32) -> InsnNode {
        Self::assert_kind(opcode, InsnKind::Int);
        InsnNode::new(Insn::Int { opcode, operand })
    }

    pub fn var(opcode: Opcode, var: u16) -> InsnNode {
        Self::assert_kind(opcode, InsnKind::Var);
        InsnNode::new(Insn::Var { opcode, var })
    }

    pub fn type_insn(opcode: Opcode, type_name: impl Into<String>) -> InsnNode {
        Self::assert_kind(opcode, InsnKind::Type);
        InsnNode::new(Insn::Type {
            opcode,
            type_name: type_name.into(),
        })
    }

    pub fn field(
        opcode: Opcode,
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> InsnNode {
        Self::assert_kind(opcode, InsnKind::Field);
        InsnNode::new(Insn::Field {
            opcode,
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        })
    }

    pub fn method(
        opcode: Opcode,
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
        is_interface: bool,
    ) -> InsnNode {
        Self::assert_kind(opcode, InsnKind::Method);
        InsnNode::new(Insn::Method {
            opcode,
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
            is_interface,
        })
    }

    pub fn invoke_dynamic(
        name: impl Into<String>,
        descriptor: impl Into<String>,
        bootstrap: Handle,
        arguments: Vec<Constant>,
    ) -> InsnNode {
        InsnNode::new(Insn::InvokeDynamic {
            name: name.into(),
            descriptor: descriptor.into(),
            bootstrap,
            arguments,
        })
    }

    pub fn jump(opcode: Opcode, target: LabelId) -> InsnNode {
        Self::assert_kind(opcode, InsnKind::Jump);
        InsnNode::new(Insn::Jump { opcode, target })
    }

    /// Label node payload (use [`super::InsnArena::new_label`] to get a usable [`LabelId`])
    pub(crate) fn label(label: LabelNode) -> InsnNode {
        InsnNode::new(Insn::Label(label))
    }

    pub fn ldc(constant: Constant) -> InsnNode {
        InsnNode::new(Insn::Ldc(constant))
    }

    pub fn iinc(var: u16, increment: i16) -> InsnNode {
        InsnNode::new(Insn::IInc { var, increment })
    }

    pub fn table_switch(min: i32, max: i32, default: LabelId, targets: Vec<LabelId>) -> InsnNode {
        assert!(min <= max, "tableswitch range {}..={} is empty", min, max);
        assert_eq!(
            targets.len() as i64,
            max as i64 - min as i64 + 1,
            "tableswitch needs exactly one target per key"
        );
        InsnNode::new(Insn::TableSwitch {
            min,
            max,
            default,
            targets,
        })
    }

    pub fn lookup_switch(default: LabelId, keys: Vec<i32>, targets: Vec<LabelId>) -> InsnNode {
        assert_eq!(
            keys.len(),
            targets.len(),
            "lookupswitch needs exactly one target per key"
        );
        InsnNode::new(Insn::LookupSwitch {
            default,
            keys,
            targets,
        })
    }

    pub fn multi_anew_array(descriptor: impl Into<String>, dimensions: u8) -> InsnNode {
        assert!(dimensions >= 1, "multianewarray needs at least one dimension");
        InsnNode::new(Insn::MultiANewArray {
            descriptor: descriptor.into(),
            dimensions,
        })
    }

    pub fn frame(frame: FrameNode) -> InsnNode {
        InsnNode::new(Insn::Frame(frame))
    }

    pub fn line_number(line: u16, start: LabelId) -> InsnNode {
        InsnNode::new(Insn::LineNumber { line, start })
    }

    pub fn insn(&self) -> &Insn {
        &self.insn
    }

    pub fn kind(&self) -> InsnKind {
        self.insn.kind()
    }

    pub fn opcode(&self) -> Option<Opcode> {
        self.insn.opcode()
    }

    pub fn is_pseudo(&self) -> bool {
        self.kind().is_pseudo()
    }

    pub(crate) fn label_node_mut(&mut self) -> Option<&mut LabelNode> {
        match &mut self.insn {
            Insn::Label(label) => Some(label),
            _ => None,
        }
    }

    /// Swap the opcode for another one in the same [`crate::jvm::OpcodeFamily`]
    ///
    /// This never changes the kind of the node.
    pub fn set_opcode(&mut self, new_opcode: Opcode) -> Result<(), Error> {
        let old_opcode = match self.insn.opcode() {
            Some(opcode) if opcode.is_interchangeable_with(new_opcode) => opcode,
            Some(opcode) => {
                return Err(Error::IncompatibleOpcode {
                    from: opcode,
                    to: new_opcode,
                })
            }
            None => return Err(Error::PseudoInsn(self.kind())),
        };
        match &mut self.insn {
            Insn::Var { opcode, .. }
            | Insn::Type { opcode, .. }
            | Insn::Field { opcode, .. }
            | Insn::Method { opcode, .. }
            | Insn::Jump { opcode, .. } => *opcode = new_opcode,
            _ => debug_assert_eq!(old_opcode, new_opcode),
        }
        Ok(())
    }

    /// Target of a jump instruction
    pub fn jump_target_mut(&mut self) -> Option<&mut LabelId> {
        match &mut self.insn {
            Insn::Jump { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Local variable of a load, store, `ret`, or `iinc` instruction
    pub fn var_mut(&mut self) -> Option<&mut u16> {
        match &mut self.insn {
            Insn::Var { var, .. } | Insn::IInc { var, .. } => Some(var),
            _ => None,
        }
    }

    pub fn visible_type_annotations(&self) -> &[TypeAnnotationNode] {
        &self.visible_type_annotations
    }

    pub fn invisible_type_annotations(&self) -> &[TypeAnnotationNode] {
        &self.invisible_type_annotations
    }

    /// Attach a type annotation (only possible on real instructions)
    pub fn add_type_annotation(
        &mut self,
        annotation: TypeAnnotationNode,
        visible: bool,
    ) -> Result<(), Error> {
        if self.is_pseudo() {
            return Err(Error::PseudoInsn(self.kind()));
        }
        if visible {
            self.visible_type_annotations.push(annotation);
        } else {
            self.invisible_type_annotations.push(annotation);
        }
        Ok(())
    }

    /// Detached copy of this node, with labels remapped through `labels`
    ///
    /// Annotations are copied too. Label nodes cannot be copied this way, since their copy has to
    /// be the node that `labels` maps them to: use [`super::InsnArena::duplicate`] instead.
    ///
    /// Panics on label nodes, and if a referenced label has no entry in `labels`.
    pub fn clone_with(&self, labels: &LabelMap) -> InsnNode {
        InsnNode {
            insn: self.insn.map_labels(|label| labels.map(label)),
            visible_type_annotations: self.visible_type_annotations.clone(),
            invisible_type_annotations: self.invisible_type_annotations.clone(),
        }
    }
}
