use super::{
    AnnotationNode, ClassVisitor, FieldNode, FieldVisitor, MethodNode, ModuleNode, ModuleVisitor,
    TypeAnnotationNode,
};
use crate::jvm::code::MethodVisitor;
use crate::jvm::{
    ClassAccessFlags, Constant, Error, Feature, FieldAccessFlags, InnerClassAccessFlags,
    MethodAccessFlags, ModuleAccessFlags, Version,
};

/// Entry of the `InnerClasses` attribute
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InnerClassNode {
    pub name: String,

    /// Enclosing class (`None` for local and anonymous classes)
    pub outer_name: Option<String>,

    /// Simple name (`None` for anonymous classes)
    pub inner_name: Option<String>,

    pub access_flags: InnerClassAccessFlags,
}

/// Class, along with its members
#[derive(Debug)]
pub struct ClassNode {
    pub version: Version,
    pub access_flags: ClassAccessFlags,
    pub name: String,
    pub signature: Option<String>,

    /// Internal name of the superclass (`None` only for `java/lang/Object` and modules)
    pub super_name: Option<String>,

    pub interfaces: Vec<String>,
    pub source_file: Option<String>,

    /// Contents of the `SourceDebugExtension` attribute
    pub source_debug: Option<String>,

    pub module: Option<ModuleNode>,

    /// Enclosing class of a local or anonymous class
    pub outer_class: Option<String>,

    /// Enclosing method of a local or anonymous class
    pub outer_method: Option<String>,
    pub outer_method_descriptor: Option<String>,

    pub visible_annotations: Vec<AnnotationNode>,
    pub invisible_annotations: Vec<AnnotationNode>,
    pub visible_type_annotations: Vec<TypeAnnotationNode>,
    pub invisible_type_annotations: Vec<TypeAnnotationNode>,
    pub inner_classes: Vec<InnerClassNode>,
    pub nest_host_class: Option<String>,
    pub nest_members: Vec<String>,
    pub permitted_subclasses: Vec<String>,
    pub fields: Vec<FieldNode>,
    pub methods: Vec<MethodNode>,
}

impl ClassNode {
    pub fn new(
        version: Version,
        access_flags: ClassAccessFlags,
        name: impl Into<String>,
    ) -> ClassNode {
        ClassNode {
            version,
            access_flags,
            name: name.into(),
            signature: None,
            super_name: None,
            interfaces: vec![],
            source_file: None,
            source_debug: None,
            module: None,
            outer_class: None,
            outer_method: None,
            outer_method_descriptor: None,
            visible_annotations: vec![],
            invisible_annotations: vec![],
            visible_type_annotations: vec![],
            invisible_type_annotations: vec![],
            inner_classes: vec![],
            nest_host_class: None,
            nest_members: vec![],
            permitted_subclasses: vec![],
            fields: vec![],
            methods: vec![],
        }
    }

    /// Replay the class to a visitor
    pub fn accept(&mut self, visitor: &mut (impl ClassVisitor + ?Sized)) -> Result<(), Error> {
        log::debug!("Replaying class {}", self.name);
        visitor.visit(
            self.version,
            self.access_flags,
            &self.name,
            self.signature.as_deref(),
            self.super_name.as_deref(),
            &self.interfaces,
        )?;
        if self.source_file.is_some() || self.source_debug.is_some() {
            visitor.visit_source(self.source_file.as_deref(), self.source_debug.as_deref())?;
        }
        if let Some(module) = &self.module {
            module.accept(visitor)?;
        }
        if let Some(nest_host) = &self.nest_host_class {
            visitor.visit_nest_host(nest_host)?;
        }
        if let Some(outer_class) = &self.outer_class {
            visitor.visit_outer_class(
                outer_class,
                self.outer_method.as_deref(),
                self.outer_method_descriptor.as_deref(),
            )?;
        }
        for annotation in &self.visible_annotations {
            visitor.visit_annotation(annotation, true)?;
        }
        for annotation in &self.invisible_annotations {
            visitor.visit_annotation(annotation, false)?;
        }
        for annotation in &self.visible_type_annotations {
            visitor.visit_type_annotation(annotation, true)?;
        }
        for annotation in &self.invisible_type_annotations {
            visitor.visit_type_annotation(annotation, false)?;
        }
        for nest_member in &self.nest_members {
            visitor.visit_nest_member(nest_member)?;
        }
        for subclass in &self.permitted_subclasses {
            visitor.visit_permitted_subclass(subclass)?;
        }
        for inner_class in &self.inner_classes {
            visitor.visit_inner_class(
                &inner_class.name,
                inner_class.outer_name.as_deref(),
                inner_class.inner_name.as_deref(),
                inner_class.access_flags,
            )?;
        }
        for field in &self.fields {
            field.accept(visitor)?;
        }
        for method in &mut self.methods {
            method.accept_class(visitor)?;
        }
        visitor.visit_end()
    }

    /// Check that the class and all of its members only use features available in the `target`
    /// class file version
    pub fn check(&self, target: Version) -> Result<(), Error> {
        if let Some(module) = &self.module {
            module.check(target)?;
        }
        if !self.visible_type_annotations.is_empty()
            || !self.invisible_type_annotations.is_empty()
        {
            Feature::TypeAnnotations.check(target)?;
        }
        for field in &self.fields {
            field.check(target)?;
        }
        for method in &self.methods {
            method.check(target)?;
        }
        Ok(())
    }
}

impl ClassVisitor for ClassNode {
    fn visit(
        &mut self,
        version: Version,
        access_flags: ClassAccessFlags,
        name: &str,
        signature: Option<&str>,
        super_name: Option<&str>,
        interfaces: &[String],
    ) -> Result<(), Error> {
        self.version = version;
        self.access_flags = access_flags;
        self.name = String::from(name);
        self.signature = signature.map(String::from);
        self.super_name = super_name.map(String::from);
        self.interfaces = interfaces.to_vec();
        Ok(())
    }

    fn visit_source(&mut self, source: Option<&str>, debug: Option<&str>) -> Result<(), Error> {
        self.source_file = source.map(String::from);
        self.source_debug = debug.map(String::from);
        Ok(())
    }

    fn visit_module(
        &mut self,
        name: &str,
        access_flags: ModuleAccessFlags,
        version: Option<&str>,
    ) -> Result<Option<&mut dyn ModuleVisitor>, Error> {
        let module = ModuleNode::new(name, access_flags, version.map(String::from));
        let module: &mut dyn ModuleVisitor = self.module.insert(module);
        Ok(Some(module))
    }

    fn visit_nest_host(&mut self, nest_host: &str) -> Result<(), Error> {
        self.nest_host_class = Some(String::from(nest_host));
        Ok(())
    }

    fn visit_outer_class(
        &mut self,
        owner: &str,
        name: Option<&str>,
        descriptor: Option<&str>,
    ) -> Result<(), Error> {
        self.outer_class = Some(String::from(owner));
        self.outer_method = name.map(String::from);
        self.outer_method_descriptor = descriptor.map(String::from);
        Ok(())
    }

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

    fn visit_nest_member(&mut self, nest_member: &str) -> Result<(), Error> {
        self.nest_members.push(String::from(nest_member));
        Ok(())
    }

    fn visit_permitted_subclass(&mut self, subclass: &str) -> Result<(), Error> {
        self.permitted_subclasses.push(String::from(subclass));
        Ok(())
    }

    fn visit_inner_class(
        &mut self,
        name: &str,
        outer_name: Option<&str>,
        inner_name: Option<&str>,
        access_flags: InnerClassAccessFlags,
    ) -> Result<(), Error> {
        self.inner_classes.push(InnerClassNode {
            name: String::from(name),
            outer_name: outer_name.map(String::from),
            inner_name: inner_name.map(String::from),
            access_flags,
        });
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
        self.fields.push(FieldNode::new(
            access_flags,
            name,
            descriptor,
            signature.map(String::from),
            value.cloned(),
        ));
        Ok(self
            .fields
            .last_mut()
            .map(|field| field as &mut dyn FieldVisitor))
    }

    fn visit_method(
        &mut self,
        access_flags: MethodAccessFlags,
        name: &str,
        descriptor: &str,
        signature: Option<&str>,
        exceptions: &[String],
    ) -> Result<Option<&mut dyn MethodVisitor>, Error> {
        self.methods.push(MethodNode::new(
            access_flags,
            name,
            descriptor,
            signature.map(String::from),
            exceptions.to_vec(),
        ));
        Ok(self
            .methods
            .last_mut()
            .map(|method| method as &mut dyn MethodVisitor))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::model::TypeReference;
    use crate::jvm::Opcode;

    fn hello() -> ClassNode {
        let mut class = ClassNode::new(Version::JAVA8, ClassAccessFlags::PUBLIC, "");
        class
            .visit(
                Version::JAVA8,
                ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
                "Hello",
                None,
                Some("java/lang/Object"),
                &[],
            )
            .unwrap();
        class.visit_source(Some("Hello.java"), None).unwrap();
        if let Some(field) = class
            .visit_field(FieldAccessFlags::STATIC, "COUNT", "I", None, Some(&Constant::Integer(3)))
            .unwrap()
        {
            field.visit_end().unwrap();
        }
        if let Some(method) = class
            .visit_method(MethodAccessFlags::PUBLIC, "<init>", "()V", None, &[])
            .unwrap()
        {
            method.visit_code().unwrap();
            method.visit_var_insn(Opcode::ALOAD, 0).unwrap();
            method
                .visit_method_insn(
                    Opcode::INVOKESPECIAL,
                    "java/lang/Object",
                    "<init>",
                    "()V",
                    false,
                )
                .unwrap();
            method.visit_insn(Opcode::RETURN).unwrap();
            method.visit_maxs(1, 1).unwrap();
            method.visit_end().unwrap();
        }
        class.visit_end().unwrap();
        class
    }

    #[test]
    fn producer_fills_in_members() {
        let class = hello();
        assert_eq!(class.name, "Hello");
        assert_eq!(class.super_name.as_deref(), Some("java/lang/Object"));
        assert_eq!(class.source_file.as_deref(), Some("Hello.java"));
        assert_eq!(class.fields.len(), 1);
        assert_eq!(class.fields[0].value, Some(Constant::Integer(3)));
        assert_eq!(class.methods.len(), 1);
        assert_eq!(class.methods[0].instructions.len(), 3);
        assert_eq!(class.methods[0].max_stack, 1);
    }

    #[test]
    fn replay_into_another_class() {
        let mut class = hello();
        let mut copy = ClassNode::new(Version::JAVA5, ClassAccessFlags::empty(), "");
        class.accept(&mut copy).unwrap();

        assert_eq!(copy.version, Version::JAVA8);
        assert_eq!(copy.access_flags, class.access_flags);
        assert_eq!(copy.fields, class.fields);
        assert_eq!(copy.methods.len(), 1);
        let method = &copy.methods[0];
        let opcodes: Vec<Opcode> = method
            .instructions
            .iter(&method.arena)
            .filter_map(|insn| method.arena[insn].opcode())
            .collect();
        assert_eq!(opcodes, vec![Opcode::ALOAD, Opcode::INVOKESPECIAL, Opcode::RETURN]);
    }

    #[test]
    fn check_walks_members() {
        let mut class = hello();
        assert!(class.check(Version::JAVA5).is_ok());

        class.fields[0].visible_type_annotations.push(TypeAnnotationNode {
            type_ref: TypeReference::new(TypeReference::FIELD),
            type_path: None,
            annotation: AnnotationNode::new("LNonNull;"),
        });
        assert!(class.check(Version::JAVA7).is_err());
        assert!(class.check(Version::JAVA8).is_ok());

        class.module = Some(ModuleNode::new("hello", ModuleAccessFlags::empty(), None));
        match class.check(Version::JAVA8) {
            Err(Error::IncompatibleFeature {
                feature: Feature::Modules,
                ..
            }) => (),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
