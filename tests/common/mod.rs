#![allow(dead_code)]

use insn_tree::jvm::code::{Frame, Label, MethodVisitor};
use insn_tree::jvm::model::{LocalVariableAnnotation, TypeAnnotationNode};
use insn_tree::jvm::{Error, Opcode};
use std::collections::HashMap;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Method visitor callback, with positions represented as `L`
#[derive(Clone, Debug, PartialEq)]
pub enum Event<L> {
    Code,
    Insn(Opcode),
    Int(Opcode, i32),
    Var(Opcode, u16),
    Type(Opcode, String),
    Method(Opcode, String, String),
    Jump(Opcode, L),
    Label(L),
    Frame(Frame<L>),
    LineNumber(u16, L),
    TableSwitch(i32, i32, L, Vec<L>),
    InsnAnnotation(String, bool),
    TryCatch(L, L, L, Option<String>),
    TryCatchAnnotation(u16, bool),
    LocalVariable(String, L, L, u16),
    LocalVariableAnnotation(Vec<L>, Vec<L>, bool),
    Maxs(u16, u16),
    End,
}

impl<L> Event<L> {
    pub fn map_labels<L2>(&self, mut map_label: impl FnMut(&L) -> L2) -> Event<L2> {
        match self {
            Event::Code => Event::Code,
            Event::Insn(opcode) => Event::Insn(*opcode),
            Event::Int(opcode, operand) => Event::Int(*opcode, *operand),
            Event::Var(opcode, var) => Event::Var(*opcode, *var),
            Event::Type(opcode, name) => Event::Type(*opcode, name.clone()),
            Event::Method(opcode, owner, name) => {
                Event::Method(*opcode, owner.clone(), name.clone())
            }
            Event::Jump(opcode, target) => Event::Jump(*opcode, map_label(target)),
            Event::Label(label) => Event::Label(map_label(label)),
            Event::Frame(frame) => Event::Frame(frame.map_labels(map_label)),
            Event::LineNumber(line, start) => Event::LineNumber(*line, map_label(start)),
            Event::TableSwitch(min, max, default, targets) => Event::TableSwitch(
                *min,
                *max,
                map_label(default),
                targets.iter().map(&mut map_label).collect(),
            ),
            Event::InsnAnnotation(descriptor, visible) => {
                Event::InsnAnnotation(descriptor.clone(), *visible)
            }
            Event::TryCatch(start, end, handler, catch_type) => Event::TryCatch(
                map_label(start),
                map_label(end),
                map_label(handler),
                catch_type.clone(),
            ),
            Event::TryCatchAnnotation(index, visible) => {
                Event::TryCatchAnnotation(*index, *visible)
            }
            Event::LocalVariable(name, start, end, index) => {
                Event::LocalVariable(name.clone(), map_label(start), map_label(end), *index)
            }
            Event::LocalVariableAnnotation(start, end, visible) => Event::LocalVariableAnnotation(
                start.iter().map(&mut map_label).collect(),
                end.iter().map(&mut map_label).collect(),
                *visible,
            ),
            Event::Maxs(stack, locals) => Event::Maxs(*stack, *locals),
            Event::End => Event::End,
        }
    }
}

/// Visitor that records every callback it receives
#[derive(Default)]
pub struct Recorder {
    pub events: Vec<Event<Label>>,
}

impl Recorder {
    /// Events with labels numbered in order of first appearance
    pub fn canonical(&self) -> Vec<Event<usize>> {
        let mut numbering: HashMap<Label, usize> = HashMap::new();
        self.events
            .iter()
            .map(|event| {
                event.map_labels(|label| {
                    let next = numbering.len();
                    *numbering.entry(*label).or_insert(next)
                })
            })
            .collect()
    }

    /// Labels defined through `visit_label`
    pub fn labels(&self) -> Vec<Label> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Label(label) => Some(*label),
                _ => None,
            })
            .collect()
    }
}

impl MethodVisitor for Recorder {
    fn visit_code(&mut self) -> Result<(), Error> {
        self.events.push(Event::Code);
        Ok(())
    }

    fn visit_frame(&mut self, frame: &Frame<Label>) -> Result<(), Error> {
        self.events.push(Event::Frame(frame.clone()));
        Ok(())
    }

    fn visit_insn(&mut self, opcode: Opcode) -> Result<(), Error> {
        self.events.push(Event::Insn(opcode));
        Ok(())
    }

    fn visit_int_insn(&mut self, opcode: Opcode, operand: i32) -> Result<(), Error> {
        self.events.push(Event::Int(opcode, operand));
        Ok(())
    }

    fn visit_var_insn(&mut self, opcode: Opcode, var: u16) -> Result<(), Error> {
        self.events.push(Event::Var(opcode, var));
        Ok(())
    }

    fn visit_type_insn(&mut self, opcode: Opcode, type_name: &str) -> Result<(), Error> {
        self.events.push(Event::Type(opcode, String::from(type_name)));
        Ok(())
    }

    fn visit_method_insn(
        &mut self,
        opcode: Opcode,
        owner: &str,
        name: &str,
        _descriptor: &str,
        _is_interface: bool,
    ) -> Result<(), Error> {
        self.events
            .push(Event::Method(opcode, String::from(owner), String::from(name)));
        Ok(())
    }

    fn visit_jump_insn(&mut self, opcode: Opcode, target: Label) -> Result<(), Error> {
        self.events.push(Event::Jump(opcode, target));
        Ok(())
    }

    fn visit_label(&mut self, label: Label) -> Result<(), Error> {
        self.events.push(Event::Label(label));
        Ok(())
    }

    fn visit_table_switch_insn(
        &mut self,
        min: i32,
        max: i32,
        default: Label,
        targets: &[Label],
    ) -> Result<(), Error> {
        self.events
            .push(Event::TableSwitch(min, max, default, targets.to_vec()));
        Ok(())
    }

    fn visit_insn_annotation(
        &mut self,
        annotation: &TypeAnnotationNode,
        visible: bool,
    ) -> Result<(), Error> {
        self.events.push(Event::InsnAnnotation(
            annotation.annotation.descriptor.clone(),
            visible,
        ));
        Ok(())
    }

    fn visit_try_catch_block(
        &mut self,
        start: Label,
        end: Label,
        handler: Label,
        catch_type: Option<&str>,
    ) -> Result<(), Error> {
        self.events.push(Event::TryCatch(
            start,
            end,
            handler,
            catch_type.map(String::from),
        ));
        Ok(())
    }

    fn visit_try_catch_annotation(
        &mut self,
        annotation: &TypeAnnotationNode,
        visible: bool,
    ) -> Result<(), Error> {
        self.events.push(Event::TryCatchAnnotation(
            annotation.type_ref.try_catch_block_index(),
            visible,
        ));
        Ok(())
    }

    fn visit_local_variable(
        &mut self,
        name: &str,
        _descriptor: &str,
        _signature: Option<&str>,
        start: Label,
        end: Label,
        index: u16,
    ) -> Result<(), Error> {
        self.events
            .push(Event::LocalVariable(String::from(name), start, end, index));
        Ok(())
    }

    fn visit_local_variable_annotation(
        &mut self,
        annotation: &LocalVariableAnnotation<Label>,
        visible: bool,
    ) -> Result<(), Error> {
        self.events.push(Event::LocalVariableAnnotation(
            annotation.start.clone(),
            annotation.end.clone(),
            visible,
        ));
        Ok(())
    }

    fn visit_line_number(&mut self, line: u16, start: Label) -> Result<(), Error> {
        self.events.push(Event::LineNumber(line, start));
        Ok(())
    }

    fn visit_maxs(&mut self, max_stack: u16, max_locals: u16) -> Result<(), Error> {
        self.events.push(Event::Maxs(max_stack, max_locals));
        Ok(())
    }

    fn visit_end(&mut self) -> Result<(), Error> {
        self.events.push(Event::End);
        Ok(())
    }
}
