use super::{AnnotationNode, TypeAnnotationNode};
use crate::jvm::code::MethodVisitor;
use crate::jvm::{
    ClassAccessFlags, Constant, Error, ExportsAccessFlags, FieldAccessFlags, InnerClassAccessFlags,
    MethodAccessFlags, ModuleAccessFlags, RequiresAccessFlags, Version,
};

/// Consumer of the contents of a class
///
/// Callbacks arrive in this order: `visit`, source, module, nest host, outer class, annotations,
/// nest members, permitted subclasses, inner classes, fields, methods, and finally `visit_end`.
/// Visitors for fields, methods, and modules are handed out by the matching callback, and returning
/// `None` skips the contents of that member.
#[allow(unused_variables)]
pub trait ClassVisitor {
    fn visit(
        &mut self,
        version: Version,
        access_flags: ClassAccessFlags,
        name: &str,
        signature: Option<&str>,
        super_name: Option<&str>,
        interfaces: &[String],
    ) -> Result<(), Error> {
        Ok(())
    }

    fn visit_source(&mut self, source: Option<&str>, debug: Option<&str>) -> Result<(), Error> {
        Ok(())
    }

    fn visit_module(
        &mut self,
        name: &str,
        access_flags: ModuleAccessFlags,
        version: Option<&str>,
    ) -> Result<Option<&mut dyn ModuleVisitor>, Error> {
        Ok(None)
    }

    fn visit_nest_host(&mut self, nest_host: &str) -> Result<(), Error> {
        Ok(())
    }

    /// Enclosing class, and enclosing method if the class is local or anonymous
    fn visit_outer_class(
        &mut self,
        owner: &str,
        name: Option<&str>,
        descriptor: Option<&str>,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn visit_annotation(
        &mut self,
        annotation: &AnnotationNode,
        visible: bool,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn visit_type_annotation(
        &mut self,
        annotation: &TypeAnnotationNode,
        visible: bool,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn visit_nest_member(&mut self, nest_member: &str) -> Result<(), Error> {
        Ok(())
    }

    fn visit_permitted_subclass(&mut self, subclass: &str) -> Result<(), Error> {
        Ok(())
    }

    fn visit_inner_class(
        &mut self,
        name: &str,
        outer_name: Option<&str>,
        inner_name: Option<&str>,
        access_flags: InnerClassAccessFlags,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn visit_field(
        &mut self,
        access_flags: FieldAccessFlags,
        name: &str,
        descriptor: &str,
        signature: Option<&str>,
        value: Option<&Constant>,
    ) -> Result<Option<&mut dyn FieldVisitor>, Error> {
        Ok(None)
    }

    fn visit_method(
        &mut self,
        access_flags: MethodAccessFlags,
        name: &str,
        descriptor: &str,
        signature: Option<&str>,
        exceptions: &[String],
    ) -> Result<Option<&mut dyn MethodVisitor>, Error> {
        Ok(None)
    }

    fn visit_end(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

/// Consumer of the contents of a field
#[allow(unused_variables)]
pub trait FieldVisitor {
    fn visit_annotation(
        &mut self,
        annotation: &AnnotationNode,
        visible: bool,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn visit_type_annotation(
        &mut self,
        annotation: &TypeAnnotationNode,
        visible: bool,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn visit_end(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

/// Consumer of the contents of a module declaration
#[allow(unused_variables)]
pub trait ModuleVisitor {
    fn visit_main_class(&mut self, main_class: &str) -> Result<(), Error> {
        Ok(())
    }

    fn visit_package(&mut self, package: &str) -> Result<(), Error> {
        Ok(())
    }

    fn visit_require(
        &mut self,
        module: &str,
        access_flags: RequiresAccessFlags,
        version: Option<&str>,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Exported package (to only the listed modules, if there are any)
    fn visit_export(
        &mut self,
        package: &str,
        access_flags: ExportsAccessFlags,
        modules: &[String],
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Package open to reflection (by only the listed modules, if there are any)
    fn visit_open(
        &mut self,
        package: &str,
        access_flags: ExportsAccessFlags,
        modules: &[String],
    ) -> Result<(), Error> {
        Ok(())
    }

    fn visit_use(&mut self, service: &str) -> Result<(), Error> {
        Ok(())
    }

    fn visit_provide(&mut self, service: &str, providers: &[String]) -> Result<(), Error> {
        Ok(())
    }

    fn visit_end(&mut self) -> Result<(), Error> {
        Ok(())
    }
}
