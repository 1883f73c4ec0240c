use super::{AnnotationNode, ClassVisitor, FieldVisitor, TypeAnnotationNode};
use crate::jvm::{Constant, Error, Feature, FieldAccessFlags, Version};

/// Field of a class
#[derive(Clone, Debug, PartialEq)]
pub struct FieldNode {
    pub access_flags: FieldAccessFlags,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,

    /// Initial value of a static field (`ConstantValue` attribute)
    pub value: Option<Constant>,

    pub visible_annotations: Vec<AnnotationNode>,
    pub invisible_annotations: Vec<AnnotationNode>,
    pub visible_type_annotations: Vec<TypeAnnotationNode>,
    pub invisible_type_annotations: Vec<TypeAnnotationNode>,
}

impl FieldNode {
    pub fn new(
        access_flags: FieldAccessFlags,
        name: impl Into<String>,
        descriptor: impl Into<String>,
        signature: Option<String>,
        value: Option<Constant>,
    ) -> FieldNode {
        FieldNode {
            access_flags,
            name: name.into(),
            descriptor: descriptor.into(),
            signature,
            value,
            visible_annotations: vec![],
            invisible_annotations: vec![],
            visible_type_annotations: vec![],
            invisible_type_annotations: vec![],
        }
    }

    /// Declare the field on a class visitor and replay its annotations there
    pub fn accept(&self, visitor: &mut (impl ClassVisitor + ?Sized)) -> Result<(), Error> {
        let field_visitor = visitor.visit_field(
            self.access_flags,
            &self.name,
            &self.descriptor,
            self.signature.as_deref(),
            self.value.as_ref(),
        )?;
        let field_visitor = match field_visitor {
            Some(field_visitor) => field_visitor,
            None => return Ok(()),
        };
        for annotation in &self.visible_annotations {
            field_visitor.visit_annotation(annotation, true)?;
        }
        for annotation in &self.invisible_annotations {
            field_visitor.visit_annotation(annotation, false)?;
        }
        for annotation in &self.visible_type_annotations {
            field_visitor.visit_type_annotation(annotation, true)?;
        }
        for annotation in &self.invisible_type_annotations {
            field_visitor.visit_type_annotation(annotation, false)?;
        }
        field_visitor.visit_end()
    }

    /// Check that the field only uses features available in the `target` class file version
    pub fn check(&self, target: Version) -> Result<(), Error> {
        if !self.visible_type_annotations.is_empty()
            || !self.invisible_type_annotations.is_empty()
        {
            Feature::TypeAnnotations.check(target)?;
        }
        if let Some(value) = &self.value {
            value.check(target)?;
        }
        Ok(())
    }
}

impl FieldVisitor for FieldNode {
    fn visit_annotation(
        &mut self,
        annotation: &AnnotationNode,
        visible: bool,
    ) -> Result<(), Error> {
        if visible {
            self.visible_annotations.push(annotation.clone());
        } else {
            self.invisible_annotations.push(annotation.clone());
        }
        Ok(())
    }

    fn visit_type_annotation(
        &mut self,
        annotation: &TypeAnnotationNode,
        visible: bool,
    ) -> Result<(), Error> {
        if visible {
            self.visible_type_annotations.push(annotation.clone());
        } else {
            self.invisible_type_annotations.push(annotation.clone());
        }
        Ok(())
    }
}
