use crate::jvm::{Error, Feature, Version};

/// Loadable constant
///
/// This is what `ldc` pushes, what bootstrap methods receive as static arguments, and what a
/// `ConstantValue` attribute initializes a field to.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.4
#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    String(String),

    /// Class or array type, written as an internal name (eg. `java/lang/Object`) or an array
    /// descriptor (eg. `[I`)
    Class(String),

    /// Method type, written as a method descriptor
    MethodType(String),

    MethodHandle(Handle),

    /// Constant computed by a bootstrap method the first time it is loaded
    Dynamic(ConstantDynamic),
}

impl Constant {
    /// Class file feature needed to load this constant, if any beyond the basics
    pub fn required_feature(&self) -> Option<Feature> {
        match self {
            Constant::Dynamic(_) => Some(Feature::DynamicConstants),
            Constant::MethodType(_) | Constant::MethodHandle(_) => {
                Some(Feature::ConstantMethodHandles)
            }
            _ => None,
        }
    }

    /// Check that the constant, including nested bootstrap arguments, is loadable in `target`
    pub fn check(&self, target: Version) -> Result<(), Error> {
        if let Some(feature) = self.required_feature() {
            feature.check(target)?;
        }
        if let Constant::Dynamic(dynamic) = self {
            for argument in &dynamic.arguments {
                argument.check(target)?;
            }
        }
        Ok(())
    }

    /// Does this constant take two slots on the operand stack?
    pub fn is_wide(&self) -> bool {
        match self {
            Constant::Long(_) | Constant::Double(_) => true,
            Constant::Dynamic(dynamic) => dynamic.descriptor == "J" || dynamic.descriptor == "D",
            _ => false,
        }
    }
}

/// Kind of a method handle
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-5.html#jvms-5.4.3.5
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum HandleKind {
    GetField = 1,
    GetStatic = 2,
    PutField = 3,
    PutStatic = 4,
    InvokeVirtual = 5,
    InvokeStatic = 6,
    InvokeSpecial = 7,
    NewInvokeSpecial = 8,
    InvokeInterface = 9,
}

/// Reference to a field or method, as used in method handle constants and bootstrap methods
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Handle {
    pub kind: HandleKind,

    /// Internal name of the class owning the member
    pub owner: String,
    pub name: String,
    pub descriptor: String,

    /// Is the owner an interface?
    pub is_interface: bool,
}

/// Dynamically computed constant
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.4.10
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantDynamic {
    pub name: String,
    pub descriptor: String,
    pub bootstrap: Handle,
    pub arguments: Vec<Constant>,
}
