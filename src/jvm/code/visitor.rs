use super::{Frame, Insn, InsnArena, InsnId, InsnList, Label, LabelId};
use crate::jvm::model::{
    AnnotationNode, AnnotationValue, LocalVariableAnnotation, TypeAnnotationNode,
};
use crate::jvm::{Constant, Error, Handle, Opcode, ParameterAccessFlags};

/// Consumer of the contents of a method
///
/// Callbacks arrive in this order: parameters, annotation default, annotations, parameter
/// annotations, then (for methods with code) `visit_code`, try/catch blocks, instructions with
/// their annotations right after each instruction, local variables, `visit_maxs`, and finally
/// `visit_end`. Positions are always [`Label`]s, and a label is passed to `visit_label` exactly
/// once per replay.
///
/// Every callback has a default implementation that ignores its arguments.
#[allow(unused_variables)]
pub trait MethodVisitor {
    fn visit_parameter(
        &mut self,
        name: Option<&str>,
        access_flags: ParameterAccessFlags,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn visit_annotation_default(&mut self, value: &AnnotationValue) -> Result<(), Error> {
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

    /// Number of parameters that can have annotations (which may be fewer than the descriptor says)
    fn visit_annotable_parameter_count(&mut self, count: u8, visible: bool) -> Result<(), Error> {
        Ok(())
    }

    fn visit_parameter_annotation(
        &mut self,
        parameter: u8,
        annotation: &AnnotationNode,
        visible: bool,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Start of the method body
    fn visit_code(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn visit_frame(&mut self, frame: &Frame<Label>) -> Result<(), Error> {
        Ok(())
    }

    /// Instruction without operands
    fn visit_insn(&mut self, opcode: Opcode) -> Result<(), Error> {
        Ok(())
    }

    fn visit_int_insn(&mut self, opcode: Opcode, operand: i32) -> Result<(), Error> {
        Ok(())
    }

    fn visit_var_insn(&mut self, opcode: Opcode, var: u16) -> Result<(), Error> {
        Ok(())
    }

    fn visit_type_insn(&mut self, opcode: Opcode, type_name: &str) -> Result<(), Error> {
        Ok(())
    }

    fn visit_field_insn(
        &mut self,
        opcode: Opcode,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<(), Error> {
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
        Ok(())
    }

    fn visit_invoke_dynamic_insn(
        &mut self,
        name: &str,
        descriptor: &str,
        bootstrap: &Handle,
        arguments: &[Constant],
    ) -> Result<(), Error> {
        Ok(())
    }

    fn visit_jump_insn(&mut self, opcode: Opcode, target: Label) -> Result<(), Error> {
        Ok(())
    }

    fn visit_label(&mut self, label: Label) -> Result<(), Error> {
        Ok(())
    }

    fn visit_ldc_insn(&mut self, constant: &Constant) -> Result<(), Error> {
        Ok(())
    }

    fn visit_iinc_insn(&mut self, var: u16, increment: i16) -> Result<(), Error> {
        Ok(())
    }

    fn visit_table_switch_insn(
        &mut self,
        min: i32,
        max: i32,
        default: Label,
        targets: &[Label],
    ) -> Result<(), Error> {
        Ok(())
    }

    fn visit_lookup_switch_insn(
        &mut self,
        default: Label,
        keys: &[i32],
        targets: &[Label],
    ) -> Result<(), Error> {
        Ok(())
    }

    fn visit_multi_anew_array_insn(
        &mut self,
        descriptor: &str,
        dimensions: u8,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Type annotation on the last instruction visited
    fn visit_insn_annotation(
        &mut self,
        annotation: &TypeAnnotationNode,
        visible: bool,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn visit_try_catch_block(
        &mut self,
        start: Label,
        end: Label,
        handler: Label,
        catch_type: Option<&str>,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Type annotation on an exception handler (the type reference has the try/catch block index)
    fn visit_try_catch_annotation(
        &mut self,
        annotation: &TypeAnnotationNode,
        visible: bool,
    ) -> Result<(), Error> {
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
        Ok(())
    }

    fn visit_local_variable_annotation(
        &mut self,
        annotation: &LocalVariableAnnotation<Label>,
        visible: bool,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn visit_line_number(&mut self, line: u16, start: Label) -> Result<(), Error> {
        Ok(())
    }

    fn visit_maxs(&mut self, max_stack: u16, max_locals: u16) -> Result<(), Error> {
        Ok(())
    }

    fn visit_end(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

impl InsnArena {
    /// External label of a label node, which must already have one
    pub(crate) fn minted_label(&self, label: LabelId) -> Label {
        match self.existing_label(label) {
            Some(label) => label,
            None => unreachable!("label {:?} was never assigned an external label", label),
        }
    }

    /// Replay one node to a visitor
    ///
    /// Type annotations on the node follow right after it, visible ones first.
    pub fn accept_insn(
        &mut self,
        insn: InsnId,
        visitor: &mut (impl MethodVisitor + ?Sized),
    ) -> Result<(), Error> {
        // Assign external labels up front, the rest only needs shared access
        let own_label = self.as_label(insn);
        let refs = self[insn].insn().label_refs();
        for label in own_label.into_iter().chain(refs) {
            self.label(label);
        }

        let arena: &InsnArena = self;
        let label = |label: &LabelId| arena.minted_label(*label);
        let labels = |labels: &[LabelId]| labels.iter().map(label).collect::<Vec<Label>>();

        let node = &arena[insn];
        match node.insn() {
            Insn::Simple(opcode) => visitor.visit_insn(*opcode)?,
            Insn::Int { opcode, operand } => visitor.visit_int_insn(*opcode, *operand)?,
            Insn::Var { opcode, var } => visitor.visit_var_insn(*opcode, *var)?,
            Insn::Type { opcode, type_name } => visitor.visit_type_insn(*opcode, type_name)?,
            Insn::Field {
                opcode,
                owner,
                name,
                descriptor,
            } => visitor.visit_field_insn(*opcode, owner, name, descriptor)?,
            Insn::Method {
                opcode,
                owner,
                name,
                descriptor,
                is_interface,
            } => visitor.visit_method_insn(*opcode, owner, name, descriptor, *is_interface)?,
            Insn::InvokeDynamic {
                name,
                descriptor,
                bootstrap,
                arguments,
            } => visitor.visit_invoke_dynamic_insn(name, descriptor, bootstrap, arguments)?,
            Insn::Jump { opcode, target } => visitor.visit_jump_insn(*opcode, label(target))?,
            Insn::Label(_) => visitor.visit_label(arena.minted_label(LabelId(insn)))?,
            Insn::Ldc(constant) => visitor.visit_ldc_insn(constant)?,
            Insn::IInc { var, increment } => visitor.visit_iinc_insn(*var, *increment)?,
            Insn::TableSwitch {
                min,
                max,
                default,
                targets,
            } => {
                let targets = labels(&targets[..]);
                visitor.visit_table_switch_insn(*min, *max, label(default), &targets)?
            }
            Insn::LookupSwitch {
                default,
                keys,
                targets,
            } => visitor.visit_lookup_switch_insn(label(default), keys, &labels(&targets[..]))?,
            Insn::MultiANewArray {
                descriptor,
                dimensions,
            } => visitor.visit_multi_anew_array_insn(descriptor, *dimensions)?,
            Insn::Frame(frame) => visitor.visit_frame(&frame.map_labels(label))?,
            Insn::LineNumber { line, start } => visitor.visit_line_number(*line, label(start))?,
        }

        for annotation in node.visible_type_annotations() {
            visitor.visit_insn_annotation(annotation, true)?;
        }
        for annotation in node.invisible_type_annotations() {
            visitor.visit_insn_annotation(annotation, false)?;
        }
        Ok(())
    }
}

impl InsnList {
    /// Replay every node in order to a visitor
    pub fn accept(
        &self,
        arena: &mut InsnArena,
        visitor: &mut (impl MethodVisitor + ?Sized),
    ) -> Result<(), Error> {
        for insn in self.to_vec(arena) {
            arena.accept_insn(insn, visitor)?;
        }
        Ok(())
    }
}
