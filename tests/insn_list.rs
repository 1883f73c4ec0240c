mod common;

use common::{Event, Recorder};
use insn_tree::jvm::code::{
    Frame, FrameType, Insn, InsnArena, InsnId, InsnList, InsnNode, LabelMap,
};
use insn_tree::jvm::Opcode;

/// List of `count` `nop`s
fn nops(arena: &mut InsnArena, count: usize) -> (InsnList, Vec<InsnId>) {
    let mut list = InsnList::new(arena);
    let insns: Vec<InsnId> = (0..count)
        .map(|_| arena.alloc(InsnNode::simple(Opcode::NOP)))
        .collect();
    for insn in &insns {
        list.append(arena, *insn);
    }
    (list, insns)
}

#[test]
fn indices_follow_removal() {
    common::init_logging();
    let mut arena = InsnArena::new();
    let mut list = InsnList::new(&mut arena);
    let label = arena.new_label();
    let load = arena.alloc(InsnNode::var(Opcode::ILOAD, 0));
    let branch = arena.alloc(InsnNode::jump(Opcode::IFEQ, label));
    let ret = arena.alloc(InsnNode::simple(Opcode::IRETURN));
    list.append(&mut arena, load);
    list.append(&mut arena, branch);
    list.append(&mut arena, label.insn());
    list.append(&mut arena, ret);

    assert_eq!(list.get(&arena, 2).unwrap(), label.insn());
    assert_eq!(list.index_of(&arena, ret), 3);

    list.remove(&mut arena, label.insn());
    assert!(arena.is_detached(label.insn()));
    assert_eq!(list.len(), 3);
    assert_eq!(list.index_of(&arena, ret), 2);
    assert_eq!(list.get(&arena, 2).unwrap(), ret);
    assert!(list.get(&arena, 3).is_err());
}

#[test]
fn clone_with_seeded_labels() {
    common::init_logging();
    let mut arena = InsnArena::new();
    let mut list = InsnList::new(&mut arena);
    let label = arena.new_label();
    for insn in [
        label.insn(),
        arena.alloc(InsnNode::var(Opcode::ILOAD, 1)),
        arena.alloc(InsnNode::jump(Opcode::IFNE, label)),
        arena.alloc(InsnNode::simple(Opcode::RETURN)),
    ] {
        list.append(&mut arena, insn);
    }

    let mut target = InsnArena::new();
    let replacement = target.new_label();
    let mut labels = LabelMap::new();
    labels.insert(label, replacement);
    labels.seed(list.labels(&arena).collect::<Vec<_>>(), &mut target);
    assert_eq!(labels.len(), 1);

    let copy = list.clone_into(&arena, &mut target, &labels);
    assert_eq!(copy.len(), 4);
    assert_eq!(copy.first(), Some(replacement.insn()));

    let jump = copy.iter(&target).nth(2).unwrap();
    assert_eq!(target[jump].insn().label_refs(), vec![replacement]);

    // Both sides hand out distinct external labels
    let original = arena.label(label);
    let copied = target.label(replacement);
    assert_ne!(original, copied);
}

#[test]
fn copy_spliced_into_an_empty_list() {
    common::init_logging();
    let mut arena = InsnArena::new();
    let mut list = InsnList::new(&mut arena);
    let label = arena.new_label();
    let load = arena.alloc(InsnNode::var(Opcode::ILOAD, 0));
    let branch = arena.alloc(InsnNode::jump(Opcode::IFEQ, label));
    let ret = arena.alloc(InsnNode::simple(Opcode::IRETURN));
    for insn in [load, branch, label.insn(), ret] {
        list.append(&mut arena, insn);
    }
    assert_eq!(list.get(&arena, 2).unwrap(), label.insn());

    let labels = LabelMap::fresh(list.labels(&arena).collect::<Vec<_>>(), &mut arena);
    let mut copy = list.duplicate(&mut arena, &labels);
    let mut target = InsnList::new(&mut arena);
    target.append_list(&mut arena, &mut copy);
    assert!(copy.is_empty());
    assert_eq!(target.len(), 4);
    assert_eq!(target.get(&arena, 2).unwrap(), labels.map(label).insn());

    let mut original = Recorder::default();
    list.accept(&mut arena, &mut original).unwrap();
    let mut copied = Recorder::default();
    target.accept(&mut arena, &mut copied).unwrap();
    assert_eq!(copied.canonical(), original.canonical());

    let (old_label, new_label) = (original.labels(), copied.labels());
    assert_eq!(old_label.len(), 1);
    assert_eq!(new_label.len(), 1);
    assert_ne!(old_label[0], new_label[0]);
    assert_eq!(copied.events[1], Event::Jump(Opcode::IFEQ, new_label[0]));
}

#[test]
fn chop_frame_shape() {
    let frame: Frame<usize> = Frame::chop(2).unwrap();
    assert_eq!(frame.frame_type(), FrameType::Chop);
    assert_eq!(frame.locals().len(), 2);
    assert!(frame.stack().is_empty());
}

#[test]
fn splicing_drains_the_source() {
    common::init_logging();
    let mut arena = InsnArena::new();
    let (mut list, first) = nops(&mut arena, 3);
    let (mut other, second) = nops(&mut arena, 2);

    list.insert_list_after(&mut arena, first[0], &mut other);
    assert!(other.is_empty());
    assert_eq!(other.first(), None);
    assert_eq!(
        list.to_vec(&arena),
        vec![first[0], second[0], second[1], first[1], first[2]]
    );
    for insn in &second {
        assert!(list.contains(&arena, *insn));
        assert!(!other.contains(&arena, *insn));
    }
    assert_eq!(list.index_of(&arena, first[2]), 4);

    // The drained list is still usable
    let extra = arena.alloc(InsnNode::simple(Opcode::RETURN));
    other.append(&mut arena, extra);
    assert_eq!(other.len(), 1);
    assert!(!list.contains(&arena, extra));
}

#[test]
fn cursor_edits_match_a_vec() {
    common::init_logging();
    let mut arena = InsnArena::new();
    let (mut list, insns) = nops(&mut arena, 6);
    let mut model = insns.clone();

    // Drop every other node and put a `pop` after each survivor
    {
        let mut cursor = list.cursor(&mut arena);
        let mut position = 0;
        let mut keep = true;
        while let Some(insn) = cursor.next() {
            assert_eq!(insn, model[position]);
            if keep {
                let pop = cursor.arena_mut().alloc(InsnNode::simple(Opcode::POP));
                cursor.add(pop);
                model.insert(position + 1, pop);
                position += 2;
            } else {
                cursor.remove();
                model.remove(position);
            }
            keep = !keep;
        }
        assert!(!cursor.has_next());
    }

    assert_eq!(list.to_vec(&arena), model);
    assert_eq!(list.len(), model.len());
    for (index, insn) in model.iter().enumerate() {
        assert_eq!(list.index_of(&arena, *insn), index);
    }
    let reversed: Vec<InsnId> = list.iter(&arena).rev().collect();
    assert_eq!(reversed, model.iter().rev().copied().collect::<Vec<_>>());
}

#[test]
fn duplicate_does_not_alias() {
    common::init_logging();
    let mut arena = InsnArena::new();
    let mut list = InsnList::new(&mut arena);
    let top = arena.new_label();
    let exit = arena.new_label();
    for insn in [
        top.insn(),
        arena.alloc(InsnNode::var(Opcode::ILOAD, 0)),
        arena.alloc(InsnNode::table_switch(0, 1, exit, vec![top, exit])),
        exit.insn(),
        arena.alloc(InsnNode::simple(Opcode::RETURN)),
    ] {
        list.append(&mut arena, insn);
    }

    let labels = LabelMap::fresh(list.labels(&arena).collect::<Vec<_>>(), &mut arena);
    let mut copy = list.duplicate(&mut arena, &labels);
    assert_eq!(copy.len(), list.len());

    for insn in copy.to_vec(&arena) {
        assert!(!list.contains(&arena, insn));
        for target in arena[insn].insn().label_refs() {
            assert!(copy.contains(&arena, target.insn()));
            assert!(!list.contains(&arena, target.insn()));
        }
    }

    let switch = copy.get(&arena, 2).unwrap();
    match arena[switch].insn() {
        Insn::TableSwitch {
            default, targets, ..
        } => {
            assert_eq!(*default, labels.map(exit));
            assert_eq!(targets, &vec![labels.map(top), labels.map(exit)]);
        }
        other => panic!("unexpected instruction {:?}", other),
    }
}

#[test]
fn clearing_releases_nodes() {
    let mut arena = InsnArena::new();
    let (mut list, insns) = nops(&mut arena, 4);
    list.clear(&mut arena);
    assert!(list.is_empty());
    for insn in &insns {
        assert!(!list.contains(&arena, *insn));
    }

    // Cleared nodes can go into another list
    let mut other = InsnList::new(&mut arena);
    for insn in &insns {
        other.append(&mut arena, *insn);
    }
    assert_eq!(other.to_vec(&arena), insns);
}
