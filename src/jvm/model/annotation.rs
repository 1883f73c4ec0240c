use crate::jvm::code::{LabelId, LabelMap};
use std::fmt;

/// Annotation: its type descriptor and its element values, in order
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationNode {
    pub descriptor: String,
    pub values: Vec<(String, AnnotationValue)>,
}

impl AnnotationNode {
    pub fn new(descriptor: impl Into<String>) -> AnnotationNode {
        AnnotationNode {
            descriptor: descriptor.into(),
            values: vec![],
        }
    }

    /// Add an element value (builder style)
    pub fn with_value(mut self, name: impl Into<String>, value: AnnotationValue) -> AnnotationNode {
        self.values.push((name.into(), value));
        self
    }

    pub fn value(&self, name: &str) -> Option<&AnnotationValue> {
        self.values
            .iter()
            .find(|(value_name, _)| value_name == name)
            .map(|(_, value)| value)
    }
}

/// Value of an annotation element
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.16.1
#[derive(Clone, Debug, PartialEq)]
pub enum AnnotationValue {
    Byte(i8),
    Char(u16),
    Short(i16),
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),

    /// Enum constant, by the descriptor of the enum type and the constant name
    Enum { descriptor: String, value: String },

    /// Class literal, as a descriptor
    Class(String),

    Annotation(AnnotationNode),
    Array(Vec<AnnotationValue>),
}

/// What part of a declaration or expression a type annotation applies to
///
/// The sort is in the most significant byte, and the rest depends on the sort.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.20.1
#[derive(Copy, Clone, Hash, Eq, PartialEq)]
pub struct TypeReference(u32);

impl TypeReference {
    pub const CLASS_TYPE_PARAMETER: u8 = 0x00;
    pub const METHOD_TYPE_PARAMETER: u8 = 0x01;
    pub const CLASS_EXTENDS: u8 = 0x10;
    pub const CLASS_TYPE_PARAMETER_BOUND: u8 = 0x11;
    pub const METHOD_TYPE_PARAMETER_BOUND: u8 = 0x12;
    pub const FIELD: u8 = 0x13;
    pub const METHOD_RETURN: u8 = 0x14;
    pub const METHOD_RECEIVER: u8 = 0x15;
    pub const METHOD_FORMAL_PARAMETER: u8 = 0x16;
    pub const THROWS: u8 = 0x17;
    pub const LOCAL_VARIABLE: u8 = 0x40;
    pub const RESOURCE_VARIABLE: u8 = 0x41;
    pub const EXCEPTION_PARAMETER: u8 = 0x42;
    pub const INSTANCEOF: u8 = 0x43;
    pub const NEW: u8 = 0x44;
    pub const CONSTRUCTOR_REFERENCE: u8 = 0x45;
    pub const METHOD_REFERENCE: u8 = 0x46;
    pub const CAST: u8 = 0x47;
    pub const CONSTRUCTOR_INVOCATION_TYPE_ARGUMENT: u8 = 0x48;
    pub const METHOD_INVOCATION_TYPE_ARGUMENT: u8 = 0x49;
    pub const CONSTRUCTOR_REFERENCE_TYPE_ARGUMENT: u8 = 0x4A;
    pub const METHOD_REFERENCE_TYPE_ARGUMENT: u8 = 0x4B;

    /// Reference with just a sort
    pub fn new(sort: u8) -> TypeReference {
        TypeReference((sort as u32) << 24)
    }

    /// Reference to the exception parameter of a try/catch block
    pub fn try_catch(index: u16) -> TypeReference {
        TypeReference(((TypeReference::EXCEPTION_PARAMETER as u32) << 24) | ((index as u32) << 8))
    }

    /// Reference to a formal parameter of a method
    pub fn formal_parameter(index: u8) -> TypeReference {
        let sort = (TypeReference::METHOD_FORMAL_PARAMETER as u32) << 24;
        TypeReference(sort | ((index as u32) << 16))
    }

    pub fn from_value(value: u32) -> TypeReference {
        TypeReference(value)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn sort(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Index of the try/catch block, for exception parameter references
    pub fn try_catch_block_index(self) -> u16 {
        ((self.0 & 0x00FF_FF00) >> 8) as u16
    }
}

impl fmt::Debug for TypeReference {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_fmt(format_args!("TypeReference({:#010x})", self.0))
    }
}

/// One step into a type, from the outside in
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum TypePathStep {
    ArrayElement,
    InnerType,
    WildcardBound,
    TypeArgument(u8),
}

/// Path to the part of a type that a type annotation applies to
#[derive(Clone, Debug, Default, Hash, Eq, PartialEq)]
pub struct TypePath(pub Vec<TypePathStep>);

impl fmt::Display for TypePath {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.0 {
            match step {
                TypePathStep::ArrayElement => formatter.write_str("[")?,
                TypePathStep::InnerType => formatter.write_str(".")?,
                TypePathStep::WildcardBound => formatter.write_str("*")?,
                TypePathStep::TypeArgument(index) => write!(formatter, "{};", index)?,
            }
        }
        Ok(())
    }
}

/// Annotation on a use of a type
#[derive(Clone, Debug, PartialEq)]
pub struct TypeAnnotationNode {
    pub type_ref: TypeReference,

    /// `None` when the annotation applies to the whole type
    pub type_path: Option<TypePath>,

    pub annotation: AnnotationNode,
}

/// Type annotation on a local variable, which may live in several ranges of code
///
/// `start`, `end`, and `index` are parallel: range `i` is from `start[i]` (inclusive) to `end[i]`
/// (exclusive), in local variable `index[i]`.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalVariableAnnotation<L> {
    pub type_ref: TypeReference,
    pub type_path: Option<TypePath>,
    pub annotation: AnnotationNode,
    pub start: Vec<L>,
    pub end: Vec<L>,
    pub index: Vec<u16>,
}

/// Local variable annotation as it lives in a method
pub type LocalVariableAnnotationNode = LocalVariableAnnotation<LabelId>;

impl<L> LocalVariableAnnotation<L> {
    pub fn new(
        type_ref: TypeReference,
        type_path: Option<TypePath>,
        annotation: AnnotationNode,
        ranges: impl IntoIterator<Item = (L, L, u16)>,
    ) -> LocalVariableAnnotation<L> {
        let mut start = vec![];
        let mut end = vec![];
        let mut index = vec![];
        for (range_start, range_end, range_index) in ranges {
            start.push(range_start);
            end.push(range_end);
            index.push(range_index);
        }
        LocalVariableAnnotation {
            type_ref,
            type_path,
            annotation,
            start,
            end,
            index,
        }
    }

    pub fn map_labels<L2>(
        &self,
        mut map_label: impl FnMut(&L) -> L2,
    ) -> LocalVariableAnnotation<L2> {
        LocalVariableAnnotation {
            type_ref: self.type_ref,
            type_path: self.type_path.clone(),
            annotation: self.annotation.clone(),
            start: self.start.iter().map(&mut map_label).collect(),
            end: self.end.iter().map(&mut map_label).collect(),
            index: self.index.clone(),
        }
    }

    /// The annotation as a plain type annotation
    pub fn type_annotation(&self) -> TypeAnnotationNode {
        TypeAnnotationNode {
            type_ref: self.type_ref,
            type_path: self.type_path.clone(),
            annotation: self.annotation.clone(),
        }
    }
}

impl LocalVariableAnnotationNode {
    pub fn clone_with(&self, labels: &LabelMap) -> LocalVariableAnnotationNode {
        self.map_labels(|label| labels.map(*label))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn type_reference_fields() {
        let reference = TypeReference::try_catch(0x1234);
        assert_eq!(reference.sort(), TypeReference::EXCEPTION_PARAMETER);
        assert_eq!(reference.try_catch_block_index(), 0x1234);
        assert_eq!(reference.value(), 0x4212_3400);
        assert_eq!(TypeReference::from_value(0x4212_3400), reference);
        assert_eq!(TypeReference::new(TypeReference::CAST).value(), 0x4700_0000);
        assert_eq!(TypeReference::formal_parameter(2).value(), 0x1602_0000);
    }

    #[test]
    fn type_path_display() {
        let path = TypePath(vec![
            TypePathStep::ArrayElement,
            TypePathStep::TypeArgument(1),
            TypePathStep::WildcardBound,
            TypePathStep::InnerType,
        ]);
        assert_eq!(path.to_string(), "[1;*.");
    }

    #[test]
    fn annotation_values() {
        let annotation = AnnotationNode::new("LRetention;")
            .with_value(
                "value",
                AnnotationValue::Enum {
                    descriptor: String::from("LRetentionPolicy;"),
                    value: String::from("RUNTIME"),
                },
            )
            .with_value("flags", AnnotationValue::Array(vec![AnnotationValue::Int(1)]));
        assert_eq!(
            annotation.value("flags"),
            Some(&AnnotationValue::Array(vec![AnnotationValue::Int(1)]))
        );
        assert_eq!(annotation.value("missing"), None);
    }

    #[test]
    fn local_variable_ranges() {
        let annotation = LocalVariableAnnotation::new(
            TypeReference::new(TypeReference::LOCAL_VARIABLE),
            None,
            AnnotationNode::new("LNonNull;"),
            vec![(0u32, 4u32, 1u16), (6, 9, 2)],
        );
        assert_eq!(annotation.start, vec![0, 6]);
        assert_eq!(annotation.end, vec![4, 9]);
        assert_eq!(annotation.index, vec![1, 2]);

        let shifted = annotation.map_labels(|label| label + 100);
        assert_eq!(shifted.start, vec![100, 106]);
        assert_eq!(shifted.type_annotation().annotation.descriptor, "LNonNull;");
    }
}
