use super::{
    AnnotationNode, AnnotationValue, ClassVisitor, LocalVariableAnnotation,
    LocalVariableAnnotationNode, TypeAnnotationNode, TypeReference,
};
use crate::jvm::code::{
    Frame, Insn, InsnArena, InsnId, InsnList, InsnNode, Label, LabelId, LabelMap, MethodVisitor,
};
use crate::jvm::{
    Constant, Error, Feature, Handle, MethodAccessFlags, Opcode, ParameterAccessFlags, Version,
};
use std::collections::HashMap;

/// Entry of the `MethodParameters` attribute
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterNode {
    pub name: Option<String>,
    pub access_flags: ParameterAccessFlags,
}

/// Exception handler covering the code from `start` (inclusive) to `end` (exclusive)
#[derive(Clone, Debug, PartialEq)]
pub struct TryCatchBlockNode {
    pub start: LabelId,
    pub end: LabelId,
    pub handler: LabelId,

    /// Internal name of the caught exception (`None` catches everything)
    pub catch_type: Option<String>,

    pub visible_type_annotations: Vec<TypeAnnotationNode>,
    pub invisible_type_annotations: Vec<TypeAnnotationNode>,
}

impl TryCatchBlockNode {
    pub fn new(
        start: LabelId,
        end: LabelId,
        handler: LabelId,
        catch_type: Option<String>,
    ) -> TryCatchBlockNode {
        TryCatchBlockNode {
            start,
            end,
            handler,
            catch_type,
            visible_type_annotations: vec![],
            invisible_type_annotations: vec![],
        }
    }

    /// Point the type annotations of the block at its position in the method
    pub fn update_index(&mut self, index: u16) {
        let type_ref = TypeReference::try_catch(index);
        for annotation in self
            .visible_type_annotations
            .iter_mut()
            .chain(self.invisible_type_annotations.iter_mut())
        {
            annotation.type_ref = type_ref;
        }
    }

    pub fn clone_with(&self, labels: &LabelMap) -> TryCatchBlockNode {
        TryCatchBlockNode {
            start: labels.map(self.start),
            end: labels.map(self.end),
            handler: labels.map(self.handler),
            catch_type: self.catch_type.clone(),
            visible_type_annotations: self.visible_type_annotations.clone(),
            invisible_type_annotations: self.invisible_type_annotations.clone(),
        }
    }

    fn has_type_annotations(&self) -> bool {
        !self.visible_type_annotations.is_empty() || !self.invisible_type_annotations.is_empty()
    }

    fn accept(
        &self,
        arena: &mut InsnArena,
        visitor: &mut (impl MethodVisitor + ?Sized),
    ) -> Result<(), Error> {
        visitor.visit_try_catch_block(
            arena.label(self.start),
            arena.label(self.end),
            arena.label(self.handler),
            self.catch_type.as_deref(),
        )?;
        for annotation in &self.visible_type_annotations {
            visitor.visit_try_catch_annotation(annotation, true)?;
        }
        for annotation in &self.invisible_type_annotations {
            visitor.visit_try_catch_annotation(annotation, false)?;
        }
        Ok(())
    }
}

/// Entry of the `LocalVariableTable` (and `LocalVariableTypeTable`) attributes
#[derive(Clone, Debug, PartialEq)]
pub struct LocalVariableNode {
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,

    /// First instruction in the scope of the variable
    pub start: LabelId,

    /// First instruction after the scope of the variable
    pub end: LabelId,

    pub index: u16,
}

impl LocalVariableNode {
    pub fn clone_with(&self, labels: &LabelMap) -> LocalVariableNode {
        LocalVariableNode {
            name: self.name.clone(),
            descriptor: self.descriptor.clone(),
            signature: self.signature.clone(),
            start: labels.map(self.start),
            end: labels.map(self.end),
            index: self.index,
        }
    }
}

/// Method, along with its code
///
/// A method gets filled in either directly (through its public fields) or by using it as a
/// [`MethodVisitor`]. When used as a visitor, the external [`Label`]s it receives get resolved to
/// label nodes, creating each label node the first time its label is mentioned.
#[derive(Debug)]
pub struct MethodNode {
    pub access_flags: MethodAccessFlags,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,

    /// Internal names of the checked exceptions
    pub exceptions: Vec<String>,

    pub parameters: Vec<ParameterNode>,
    pub visible_annotations: Vec<AnnotationNode>,
    pub invisible_annotations: Vec<AnnotationNode>,
    pub visible_type_annotations: Vec<TypeAnnotationNode>,
    pub invisible_type_annotations: Vec<TypeAnnotationNode>,

    /// Default value of an annotation interface element
    pub annotation_default: Option<AnnotationValue>,

    /// Number of parameters that can have visible annotations (0 means the descriptor decides)
    pub visible_annotable_parameter_count: u8,

    /// Visible annotations, by parameter index
    pub visible_parameter_annotations: Vec<Vec<AnnotationNode>>,

    /// Number of parameters that can have invisible annotations (0 means the descriptor decides)
    pub invisible_annotable_parameter_count: u8,

    /// Invisible annotations, by parameter index
    pub invisible_parameter_annotations: Vec<Vec<AnnotationNode>>,

    /// Storage for the nodes of `instructions`
    pub arena: InsnArena,

    pub instructions: InsnList,
    pub try_catch_blocks: Vec<TryCatchBlockNode>,
    pub local_variables: Vec<LocalVariableNode>,
    pub visible_local_variable_annotations: Vec<LocalVariableAnnotationNode>,
    pub invisible_local_variable_annotations: Vec<LocalVariableAnnotationNode>,
    pub max_stack: u16,
    pub max_locals: u16,

    /// Label nodes of the external labels seen so far, whether received or handed out
    labels: HashMap<Label, LabelId>,

    /// Has the code been replayed already?
    visited: bool,
}

impl MethodNode {
    pub fn new(
        access_flags: MethodAccessFlags,
        name: impl Into<String>,
        descriptor: impl Into<String>,
        signature: Option<String>,
        exceptions: Vec<String>,
    ) -> MethodNode {
        let mut arena = InsnArena::new();
        let instructions = InsnList::new(&mut arena);
        MethodNode {
            access_flags,
            name: name.into(),
            descriptor: descriptor.into(),
            signature,
            exceptions,
            parameters: vec![],
            visible_annotations: vec![],
            invisible_annotations: vec![],
            visible_type_annotations: vec![],
            invisible_type_annotations: vec![],
            annotation_default: None,
            visible_annotable_parameter_count: 0,
            visible_parameter_annotations: vec![],
            invisible_annotable_parameter_count: 0,
            invisible_parameter_annotations: vec![],
            arena,
            instructions,
            try_catch_blocks: vec![],
            local_variables: vec![],
            visible_local_variable_annotations: vec![],
            invisible_local_variable_annotations: vec![],
            max_stack: 0,
            max_locals: 0,
            labels: HashMap::new(),
            visited: false,
        }
    }

    /// Label node for an external label (created on first use)
    pub fn label_node(&mut self, label: Label) -> LabelId {
        let arena = &mut self.arena;
        *self
            .labels
            .entry(label)
            .or_insert_with(|| arena.new_label_for(label))
    }

    /// Allocate a node and add it at the end of the instructions
    pub fn push(&mut self, node: InsnNode) -> InsnId {
        let insn = self.arena.alloc(node);
        self.instructions.append(&mut self.arena, insn);
        insn
    }

    /// Replay the method to a visitor
    ///
    /// Replaying a second time hands out fresh external labels.
    pub fn accept(&mut self, visitor: &mut (impl MethodVisitor + ?Sized)) -> Result<(), Error> {
        log::debug!("Replaying method {}{}", self.name, self.descriptor);

        for parameter in &self.parameters {
            visitor.visit_parameter(parameter.name.as_deref(), parameter.access_flags)?;
        }
        if let Some(value) = &self.annotation_default {
            visitor.visit_annotation_default(value)?;
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
        for (visible, count, parameters) in [
            (
                true,
                self.visible_annotable_parameter_count,
                &self.visible_parameter_annotations,
            ),
            (
                false,
                self.invisible_annotable_parameter_count,
                &self.invisible_parameter_annotations,
            ),
        ] {
            if count > 0 {
                visitor.visit_annotable_parameter_count(count, visible)?;
            }
            for (parameter, annotations) in parameters.iter().enumerate() {
                for annotation in annotations {
                    visitor.visit_parameter_annotation(parameter as u8, annotation, visible)?;
                }
            }
        }

        if !self.instructions.is_empty() {
            if self.visited {
                self.instructions.reset_labels(&mut self.arena);
                let arena = &self.arena;
                self.labels
                    .retain(|label, node| arena.existing_label(*node) == Some(*label));
            }
            visitor.visit_code()?;

            for (index, block) in self.try_catch_blocks.iter_mut().enumerate() {
                block.update_index(index as u16);
                block.accept(&mut self.arena, visitor)?;
            }

            self.instructions.accept(&mut self.arena, visitor)?;
            for label in self.instructions.labels(&self.arena) {
                if let Some(external) = self.arena.existing_label(label) {
                    self.labels.insert(external, label);
                }
            }

            for local in &self.local_variables {
                visitor.visit_local_variable(
                    &local.name,
                    &local.descriptor,
                    local.signature.as_deref(),
                    self.arena.label(local.start),
                    self.arena.label(local.end),
                    local.index,
                )?;
            }
            for (visible, annotations) in [
                (true, &self.visible_local_variable_annotations),
                (false, &self.invisible_local_variable_annotations),
            ] {
                for annotation in annotations {
                    let annotation = annotation.map_labels(|label| self.arena.label(*label));
                    visitor.visit_local_variable_annotation(&annotation, visible)?;
                }
            }

            visitor.visit_maxs(self.max_stack, self.max_locals)?;
            self.visited = true;
        }
        visitor.visit_end()
    }

    /// Declare the method on a class visitor and replay it there
    pub fn accept_class(
        &mut self,
        visitor: &mut (impl ClassVisitor + ?Sized),
    ) -> Result<(), Error> {
        let method_visitor = visitor.visit_method(
            self.access_flags,
            &self.name,
            &self.descriptor,
            self.signature.as_deref(),
            &self.exceptions,
        )?;
        match method_visitor {
            Some(method_visitor) => self.accept(method_visitor),
            None => Ok(()),
        }
    }

    /// Deep copy of the method
    ///
    /// The copy has its own arena and labels: none of its nodes are shared with this method, and
    /// its labels get fresh external labels when it is replayed.
    pub fn duplicate(&self) -> MethodNode {
        log::trace!("Copying method {}{}", self.name, self.descriptor);
        let mut arena = InsnArena::with_capacity(self.arena.len());
        let labels = LabelMap::fresh(self.instructions.labels(&self.arena), &mut arena);
        let instructions = self
            .instructions
            .clone_into(&self.arena, &mut arena, &labels);

        MethodNode {
            access_flags: self.access_flags,
            name: self.name.clone(),
            descriptor: self.descriptor.clone(),
            signature: self.signature.clone(),
            exceptions: self.exceptions.clone(),
            parameters: self.parameters.clone(),
            visible_annotations: self.visible_annotations.clone(),
            invisible_annotations: self.invisible_annotations.clone(),
            visible_type_annotations: self.visible_type_annotations.clone(),
            invisible_type_annotations: self.invisible_type_annotations.clone(),
            annotation_default: self.annotation_default.clone(),
            visible_annotable_parameter_count: self.visible_annotable_parameter_count,
            visible_parameter_annotations: self.visible_parameter_annotations.clone(),
            invisible_annotable_parameter_count: self.invisible_annotable_parameter_count,
            invisible_parameter_annotations: self.invisible_parameter_annotations.clone(),
            arena,
            instructions,
            try_catch_blocks: self
                .try_catch_blocks
                .iter()
                .map(|block| block.clone_with(&labels))
                .collect(),
            local_variables: self
                .local_variables
                .iter()
                .map(|local| local.clone_with(&labels))
                .collect(),
            visible_local_variable_annotations: self
                .visible_local_variable_annotations
                .iter()
                .map(|annotation| annotation.clone_with(&labels))
                .collect(),
            invisible_local_variable_annotations: self
                .invisible_local_variable_annotations
                .iter()
                .map(|annotation| annotation.clone_with(&labels))
                .collect(),
            max_stack: self.max_stack,
            max_locals: self.max_locals,
            labels: HashMap::new(),
            visited: false,
        }
    }

    /// Check that the method only uses features available in the `target` class file version
    pub fn check(&self, target: Version) -> Result<(), Error> {
        if !self.parameters.is_empty() {
            Feature::MethodParameters.check(target)?;
        }
        let has_type_annotations = !self.visible_type_annotations.is_empty()
            || !self.invisible_type_annotations.is_empty()
            || !self.visible_local_variable_annotations.is_empty()
            || !self.invisible_local_variable_annotations.is_empty()
            || self
                .try_catch_blocks
                .iter()
                .any(TryCatchBlockNode::has_type_annotations);
        if has_type_annotations {
            Feature::TypeAnnotations.check(target)?;
        }

        for insn in self.instructions.iter(&self.arena) {
            let node = &self.arena[insn];
            if !node.visible_type_annotations().is_empty()
                || !node.invisible_type_annotations().is_empty()
            {
                Feature::TypeAnnotations.check(target)?;
            }
            match node.insn() {
                Insn::Frame(_) => Feature::StackMapFrames.check(target)?,
                Insn::Jump { opcode, .. } | Insn::Var { opcode, .. }
                    if *opcode == Opcode::JSR || *opcode == Opcode::RET =>
                {
                    Feature::Subroutines.check(target)?
                }
                Insn::Method {
                    opcode,
                    is_interface: true,
                    ..
                } if *opcode == Opcode::INVOKESTATIC || *opcode == Opcode::INVOKESPECIAL => {
                    Feature::InterfaceMethodCalls.check(target)?
                }
                Insn::InvokeDynamic {
                    bootstrap,
                    arguments,
                    ..
                } => {
                    Feature::InvokeDynamic.check(target)?;
                    Constant::MethodHandle(bootstrap.clone()).check(target)?;
                    for argument in arguments {
                        argument.check(target)?;
                    }
                }
                Insn::Ldc(constant) => constant.check(target)?,
                _ => (),
            }
        }
        Ok(())
    }

    fn parameter_annotations(&mut self, parameter: u8, visible: bool) -> &mut Vec<AnnotationNode> {
        let parameters = if visible {
            &mut self.visible_parameter_annotations
        } else {
            &mut self.invisible_parameter_annotations
        };
        let parameter = parameter as usize;
        if parameters.len() <= parameter {
            parameters.resize_with(parameter + 1, Vec::new);
        }
        &mut parameters[parameter]
    }
}

impl MethodVisitor for MethodNode {
    fn visit_parameter(
        &mut self,
        name: Option<&str>,
        access_flags: ParameterAccessFlags,
    ) -> Result<(), Error> {
        self.parameters.push(ParameterNode {
            name: name.map(String::from),
            access_flags,
        });
        Ok(())
    }

    fn visit_annotation_default(&mut self, value: &AnnotationValue) -> Result<(), Error> {
        self.annotation_default = Some(value.clone());
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

    fn visit_annotable_parameter_count(&mut self, count: u8, visible: bool) -> Result<(), Error> {
        if visible {
            self.visible_annotable_parameter_count = count;
        } else {
            self.invisible_annotable_parameter_count = count;
        }
        Ok(())
    }

    fn visit_parameter_annotation(
        &mut self,
        parameter: u8,
        annotation: &AnnotationNode,
        visible: bool,
    ) -> Result<(), Error> {
        self.parameter_annotations(parameter, visible)
            .push(annotation.clone());
        Ok(())
    }

    fn visit_frame(&mut self, frame: &Frame<Label>) -> Result<(), Error> {
        let frame = frame.map_labels(|label| self.label_node(*label));
        self.push(InsnNode::frame(frame));
        Ok(())
    }

    fn visit_insn(&mut self, opcode: Opcode) -> Result<(), Error> {
        self.push(InsnNode::simple(opcode));
        Ok(())
    }

    fn visit_int_insn(&mut self, opcode: Opcode, operand: i32) -> Result<(), Error> {
        self.push(InsnNode::int(opcode, operand));
        Ok(())
    }

    fn visit_var_insn(&mut self, opcode: Opcode, var: u16) -> Result<(), Error> {
        self.push(InsnNode::var(opcode, var));
        Ok(())
    }

    fn visit_type_insn(&mut self, opcode: Opcode, type_name: &str) -> Result<(), Error> {
        self.push(InsnNode::type_insn(opcode, type_name));
        Ok(())
    }

    fn visit_field_insn(
        &mut self,
        opcode: Opcode,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<(), Error> {
        self.push(InsnNode::field(opcode, owner, name, descriptor));
        Ok(())
    }

    fn visit_method_insn(
        &mut self,
        opcode: Opcode,
        owner: &str,
        name: &str,
        descriptor: &str,
        is_interface: bool,
    ) -> Result<(), Error> {
        self.push(InsnNode::method(opcode, owner, name, descriptor, is_interface));
        Ok(())
    }

    fn visit_invoke_dynamic_insn(
        &mut self,
        name: &str,
        descriptor: &str,
        bootstrap: &Handle,
        arguments: &[Constant],
    ) -> Result<(), Error> {
        self.push(InsnNode::invoke_dynamic(
            name,
            descriptor,
            bootstrap.clone(),
            arguments.to_vec(),
        ));
        Ok(())
    }

    fn visit_jump_insn(&mut self, opcode: Opcode, target: Label) -> Result<(), Error> {
        let target = self.label_node(target);
        self.push(InsnNode::jump(opcode, target));
        Ok(())
    }

    fn visit_label(&mut self, label: Label) -> Result<(), Error> {
        let label = self.label_node(label);
        self.instructions.append(&mut self.arena, label.insn());
        Ok(())
    }

    fn visit_ldc_insn(&mut self, constant: &Constant) -> Result<(), Error> {
        self.push(InsnNode::ldc(constant.clone()));
        Ok(())
    }

    fn visit_iinc_insn(&mut self, var: u16, increment: i16) -> Result<(), Error> {
        self.push(InsnNode::iinc(var, increment));
        Ok(())
    }

    fn visit_table_switch_insn(
        &mut self,
        min: i32,
        max: i32,
        default: Label,
        targets: &[Label],
    ) -> Result<(), Error> {
        let default = self.label_node(default);
        let targets = targets.iter().map(|label| self.label_node(*label)).collect();
        self.push(InsnNode::table_switch(min, max, default, targets));
        Ok(())
    }

    fn visit_lookup_switch_insn(
        &mut self,
        default: Label,
        keys: &[i32],
        targets: &[Label],
    ) -> Result<(), Error> {
        let default = self.label_node(default);
        let targets = targets.iter().map(|label| self.label_node(*label)).collect();
        self.push(InsnNode::lookup_switch(default, keys.to_vec(), targets));
        Ok(())
    }

    fn visit_multi_anew_array_insn(
        &mut self,
        descriptor: &str,
        dimensions: u8,
    ) -> Result<(), Error> {
        self.push(InsnNode::multi_anew_array(descriptor, dimensions));
        Ok(())
    }

    /// Attach the annotation to the last real instruction, skipping over pseudo-instructions
    fn visit_insn_annotation(
        &mut self,
        annotation: &TypeAnnotationNode,
        visible: bool,
    ) -> Result<(), Error> {
        let mut current = self.instructions.last();
        while let Some(insn) = current {
            if !self.arena[insn].is_pseudo() {
                return self.arena[insn].add_type_annotation(annotation.clone(), visible);
            }
            current = self.arena.previous(insn);
        }
        Err(Error::MissingInsn)
    }

    fn visit_try_catch_block(
        &mut self,
        start: Label,
        end: Label,
        handler: Label,
        catch_type: Option<&str>,
    ) -> Result<(), Error> {
        let block = TryCatchBlockNode::new(
            self.label_node(start),
            self.label_node(end),
            self.label_node(handler),
            catch_type.map(String::from),
        );
        self.try_catch_blocks.push(block);
        Ok(())
    }

    fn visit_try_catch_annotation(
        &mut self,
        annotation: &TypeAnnotationNode,
        visible: bool,
    ) -> Result<(), Error> {
        let index = annotation.type_ref.try_catch_block_index() as usize;
        let block = self
            .try_catch_blocks
            .get_mut(index)
            .ok_or(Error::UnknownTryCatchBlock(index))?;
        if visible {
            block.visible_type_annotations.push(annotation.clone());
        } else {
            block.invisible_type_annotations.push(annotation.clone());
        }
        Ok(())
    }

    fn visit_local_variable(
        &mut self,
        name: &str,
        descriptor: &str,
        signature: Option<&str>,
        start: Label,
        end: Label,
        index: u16,
    ) -> Result<(), Error> {
        let local = LocalVariableNode {
            name: String::from(name),
            descriptor: String::from(descriptor),
            signature: signature.map(String::from),
            start: self.label_node(start),
            end: self.label_node(end),
            index,
        };
        self.local_variables.push(local);
        Ok(())
    }

    fn visit_local_variable_annotation(
        &mut self,
        annotation: &LocalVariableAnnotation<Label>,
        visible: bool,
    ) -> Result<(), Error> {
        let annotation = annotation.map_labels(|label| self.label_node(*label));
        if visible {
            self.visible_local_variable_annotations.push(annotation);
        } else {
            self.invisible_local_variable_annotations.push(annotation);
        }
        Ok(())
    }

    fn visit_line_number(&mut self, line: u16, start: Label) -> Result<(), Error> {
        let start = self.label_node(start);
        self.push(InsnNode::line_number(line, start));
        Ok(())
    }

    fn visit_maxs(&mut self, max_stack: u16, max_locals: u16) -> Result<(), Error> {
        self.max_stack = max_stack;
        self.max_locals = max_locals;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::code::VerificationType;

    struct Sink;

    impl MethodVisitor for Sink {}

    fn method() -> MethodNode {
        MethodNode::new(
            MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
            "run",
            "()V",
            None,
            vec![],
        )
    }

    #[test]
    fn labels_resolve_to_one_node() {
        let mut method = method();
        let label = Label::new();
        method.visit_jump_insn(Opcode::GOTO, label).unwrap();
        method.visit_label(label).unwrap();
        method.visit_line_number(3, label).unwrap();

        let insns = method.instructions.to_vec(&method.arena);
        let node = method.label_node(label);
        assert_eq!(insns[1], node.insn());
        assert_eq!(method.arena[insns[0]].insn().label_refs(), vec![node]);
        assert_eq!(method.arena[insns[2]].insn().label_refs(), vec![node]);
        assert_eq!(method.arena.existing_label(node), Some(label));
    }

    #[test]
    fn replay_forgets_stale_labels() {
        let mut method = method();
        let label = Label::new();
        method.visit_label(label).unwrap();
        method.visit_insn(Opcode::RETURN).unwrap();
        let node = method.label_node(label);

        method.accept(&mut Sink).unwrap();
        assert_eq!(method.arena.existing_label(node), Some(label));
        method.accept(&mut Sink).unwrap();
        let rearmed = method.arena.existing_label(node).unwrap();
        assert_ne!(rearmed, label);

        // The old label now names a new node, the re-armed one still names the original
        assert_ne!(method.label_node(label), node);
        assert_eq!(method.label_node(rearmed), node);
    }

    #[test]
    fn insn_annotations_skip_pseudo_instructions() {
        let mut method = method();
        let annotation = TypeAnnotationNode {
            type_ref: TypeReference::new(TypeReference::NEW),
            type_path: None,
            annotation: AnnotationNode::new("LFresh;"),
        };
        assert!(matches!(
            method.visit_insn_annotation(&annotation, true),
            Err(Error::MissingInsn)
        ));

        method
            .visit_type_insn(Opcode::NEW, "java/lang/Object")
            .unwrap();
        method.visit_label(Label::new()).unwrap();
        method.visit_insn_annotation(&annotation, true).unwrap();

        let first = method.instructions.first().unwrap();
        assert_eq!(method.arena[first].visible_type_annotations().len(), 1);
    }

    #[test]
    fn try_catch_annotations_need_a_block() {
        let mut method = method();
        let annotation = TypeAnnotationNode {
            type_ref: TypeReference::try_catch(1),
            type_path: None,
            annotation: AnnotationNode::new("LCaught;"),
        };
        let (start, end, handler) = (Label::new(), Label::new(), Label::new());
        method
            .visit_try_catch_block(start, end, handler, Some("java/lang/Exception"))
            .unwrap();
        assert!(matches!(
            method.visit_try_catch_annotation(&annotation, true),
            Err(Error::UnknownTryCatchBlock(1))
        ));

        method.visit_try_catch_block(start, end, handler, None).unwrap();
        method.visit_try_catch_annotation(&annotation, false).unwrap();
        assert_eq!(method.try_catch_blocks[1].invisible_type_annotations.len(), 1);

        method.try_catch_blocks[1].update_index(7);
        assert_eq!(
            method.try_catch_blocks[1].invisible_type_annotations[0]
                .type_ref
                .try_catch_block_index(),
            7
        );
    }

    #[test]
    fn parameter_annotations_grow_on_demand() {
        let mut method = method();
        method
            .visit_parameter_annotation(2, &AnnotationNode::new("LNamed;"), false)
            .unwrap();
        assert_eq!(method.invisible_parameter_annotations.len(), 3);
        assert!(method.invisible_parameter_annotations[0].is_empty());
        assert_eq!(method.invisible_parameter_annotations[2].len(), 1);
    }

    #[test]
    fn compatibility() {
        let mut method = method();
        method.visit_var_insn(Opcode::ALOAD, 0).unwrap();
        assert!(method.check(Version::JAVA5).is_ok());

        let label = Label::new();
        method.visit_label(label).unwrap();
        method
            .visit_frame(&Frame::same1(VerificationType::Uninitialized(label)))
            .unwrap();
        assert!(method.check(Version::JAVA5).is_err());
        assert!(method.check(Version::JAVA6).is_ok());

        method.visit_var_insn(Opcode::RET, 1).unwrap();
        match method.check(Version::JAVA8) {
            Err(Error::IncompatibleFeature {
                feature: Feature::Subroutines,
                target,
            }) => assert_eq!(target, Version::JAVA8),
            other => panic!("unexpected result {:?}", other),
        }

        let mut method = MethodNode::new(MethodAccessFlags::PUBLIC, "go", "()V", None, vec![]);
        method
            .visit_method_insn(
                Opcode::INVOKESTATIC,
                "java/util/List",
                "of",
                "()Ljava/util/List;",
                true,
            )
            .unwrap();
        assert!(method.check(Version::JAVA7).is_err());
        assert!(method.check(Version::JAVA8).is_ok());
    }
}
