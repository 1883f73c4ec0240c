use super::code::FrameType;
use super::{InsnKind, Opcode, Version};
use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Random access into an instruction list past its end
    IndexOutOfBounds { index: usize, len: usize },

    /// The locals and stack do not have the shape that the frame type requires
    InvalidFrame {
        frame_type: FrameType,
        locals: usize,
        stack: usize,
    },

    /// Attempt to swap an opcode for one with a different operand shape
    IncompatibleOpcode { from: Opcode, to: Opcode },

    /// Opcodes and type annotations only exist on real instructions
    PseudoInsn(InsnKind),

    /// An instruction annotation arrived before any real instruction
    MissingInsn,

    /// A try/catch annotation names a try/catch block that does not exist
    UnknownTryCatchBlock(usize),

    /// A node uses a feature that the targeted class file version does not support
    IncompatibleFeature { feature: Feature, target: Version },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IndexOutOfBounds { index, len } => {
                write!(f, "index {} is out of bounds for a list of {}", index, len)
            }
            Error::InvalidFrame {
                frame_type,
                locals,
                stack,
            } => write!(
                f,
                "{:?} frame cannot have {} locals and {} stack entries",
                frame_type, locals, stack
            ),
            Error::IncompatibleOpcode { from, to } => {
                write!(f, "cannot change opcode {} into {}", from, to)
            }
            Error::PseudoInsn(kind) => {
                write!(f, "{:?} pseudo-instruction has no opcode or annotations", kind)
            }
            Error::MissingInsn => write!(f, "there is no instruction to annotate"),
            Error::UnknownTryCatchBlock(index) => {
                write!(f, "there is no try/catch block at index {}", index)
            }
            Error::IncompatibleFeature { feature, target } => {
                write!(f, "{:?} is not supported by class file version {}", feature, target)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Class file features that are only available in some versions
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum Feature {
    /// `StackMapTable` frames
    StackMapFrames,

    /// `jsr` and `ret`
    Subroutines,

    /// `invokedynamic`
    InvokeDynamic,

    /// `ldc` of method types and method handles
    ConstantMethodHandles,

    /// Type annotations anywhere in a class
    TypeAnnotations,

    /// `MethodParameters` attribute
    MethodParameters,

    /// `invokestatic` and `invokespecial` on interface methods
    InterfaceMethodCalls,

    /// `Module` attribute
    Modules,

    /// `CONSTANT_Dynamic`
    DynamicConstants,
}

impl Feature {
    /// First class file version supporting the feature
    pub fn introduced_in(self) -> Option<Version> {
        match self {
            Feature::StackMapFrames => Some(Version::JAVA6),
            Feature::Subroutines => None,
            Feature::InvokeDynamic | Feature::ConstantMethodHandles => Some(Version::JAVA7),
            Feature::TypeAnnotations
            | Feature::MethodParameters
            | Feature::InterfaceMethodCalls => Some(Version::JAVA8),
            Feature::Modules => Some(Version::JAVA9),
            Feature::DynamicConstants => Some(Version::JAVA11),
        }
    }

    /// First class file version rejecting the feature
    pub fn removed_in(self) -> Option<Version> {
        match self {
            Feature::Subroutines => Some(Version::JAVA7),
            _ => None,
        }
    }

    /// Check that the feature can be used when targeting the given version
    pub fn check(self, target: Version) -> Result<(), Error> {
        let too_old = self.introduced_in().map_or(false, |since| target < since);
        let too_new = self.removed_in().map_or(false, |until| target >= until);
        if too_old || too_new {
            log::debug!("Rejecting {:?} for class file version {}", self, target);
            Err(Error::IncompatibleFeature {
                feature: self,
                target,
            })
        } else {
            Ok(())
        }
    }
}
