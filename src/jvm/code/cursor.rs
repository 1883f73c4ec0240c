use super::{InsnArena, InsnId, InsnList};

/// Cursor into an [`InsnList`] that allows editing the list while walking it
///
/// The cursor sits between two nodes. `next` and `previous` move it over a node and return that
/// node. `remove` and `set` act on the node last moved over, and `add` inserts right before the
/// cursor, so the walk neither skips nor repeats a node after an edit.
pub struct Cursor<'a> {
    list: &'a mut InsnList,
    arena: &'a mut InsnArena,
    next: Option<InsnId>,
    previous: Option<InsnId>,

    /// Node returned by the last `next` or `previous` (cleared by `remove` and `add`)
    last_returned: Option<InsnId>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(
        list: &'a mut InsnList,
        arena: &'a mut InsnArena,
        previous: Option<InsnId>,
        next: Option<InsnId>,
    ) -> Cursor<'a> {
        Cursor {
            list,
            arena,
            next,
            previous,
            last_returned: None,
        }
    }

    pub fn arena(&self) -> &InsnArena {
        self.arena
    }

    /// Mutable access to the arena, for allocating nodes to `add` or `set`
    pub fn arena_mut(&mut self) -> &mut InsnArena {
        self.arena
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    /// Move back over the previous node
    pub fn previous(&mut self) -> Option<InsnId> {
        let insn = self.previous?;
        self.next = Some(insn);
        self.previous = self.arena.previous(insn);
        self.last_returned = Some(insn);
        Some(insn)
    }

    /// Index of the node `next` would return (the length of the list at the end)
    pub fn next_index(&mut self) -> usize {
        match self.next {
            Some(next) => self.list.index_of(self.arena, next),
            None => self.list.len(),
        }
    }

    /// Index of the node `previous` would return (`None` at the start)
    pub fn previous_index(&mut self) -> Option<usize> {
        let previous = self.previous?;
        Some(self.list.index_of(self.arena, previous))
    }

    /// Remove the node last returned by `next` or `previous`
    pub fn remove(&mut self) {
        let insn = match self.last_returned.take() {
            Some(insn) => insn,
            None => panic!("cursor has no current instruction to remove"),
        };
        if self.next == Some(insn) {
            self.next = self.arena.next(insn);
        } else {
            self.previous = self.arena.previous(insn);
        }
        self.list.remove(self.arena, insn);
    }

    /// Replace the node last returned by `next` or `previous` with a detached node
    pub fn set(&mut self, new: InsnId) {
        let old = match self.last_returned {
            Some(insn) => insn,
            None => panic!("cursor has no current instruction to replace"),
        };
        self.list.set(self.arena, old, new);
        if self.previous == Some(old) {
            self.previous = Some(new);
        } else {
            self.next = Some(new);
        }
        self.last_returned = Some(new);
    }

    /// Insert a detached node at the cursor (it is what `previous` would then return)
    pub fn add(&mut self, insn: InsnId) {
        match (self.next, self.previous) {
            (Some(next), _) => self.list.insert_before(self.arena, next, insn),
            (None, Some(previous)) => self.list.insert_after(self.arena, previous, insn),
            (None, None) => self.list.append(self.arena, insn),
        }
        self.previous = Some(insn);
        self.last_returned = None;
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = InsnId;

    /// Move forward over the next node
    fn next(&mut self) -> Option<InsnId> {
        let insn = self.next?;
        self.previous = Some(insn);
        self.next = self.arena.next(insn);
        self.last_returned = Some(insn);
        Some(insn)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::code::InsnNode;
    use crate::jvm::Opcode;

    fn opcodes(list: &InsnList, arena: &InsnArena) -> Vec<Opcode> {
        list.iter(arena)
            .filter_map(|insn| arena[insn].opcode())
            .collect()
    }

    fn list_of(arena: &mut InsnArena, opcodes: &[Opcode]) -> InsnList {
        let mut list = InsnList::new(arena);
        for opcode in opcodes {
            let insn = arena.alloc(InsnNode::simple(*opcode));
            list.append(arena, insn);
        }
        list
    }

    #[test]
    fn edits_while_walking() {
        let mut arena = InsnArena::new();
        let mut list = list_of(
            &mut arena,
            &[Opcode::ICONST_0, Opcode::ICONST_1, Opcode::ICONST_2, Opcode::ICONST_3],
        );

        let mut cursor = list.cursor(&mut arena);
        let mut seen = vec![];
        while let Some(insn) = cursor.next() {
            let opcode = cursor.arena()[insn].opcode();
            seen.push(opcode);
            match opcode {
                Some(Opcode::ICONST_0) => cursor.remove(),
                Some(Opcode::ICONST_1) => {
                    let new = cursor.arena_mut().alloc(InsnNode::simple(Opcode::ICONST_M1));
                    cursor.set(new);
                }
                Some(Opcode::ICONST_2) => {
                    let new = cursor.arena_mut().alloc(InsnNode::simple(Opcode::ICONST_5));
                    cursor.add(new);
                }
                _ => (),
            }
        }
        assert!(!cursor.has_next());
        drop(cursor);

        assert_eq!(
            seen,
            vec![
                Some(Opcode::ICONST_0),
                Some(Opcode::ICONST_1),
                Some(Opcode::ICONST_2),
                Some(Opcode::ICONST_3),
            ]
        );
        assert_eq!(
            opcodes(&list, &arena),
            vec![Opcode::ICONST_M1, Opcode::ICONST_2, Opcode::ICONST_5, Opcode::ICONST_3]
        );
    }

    #[test]
    fn walking_backwards() {
        let mut arena = InsnArena::new();
        let mut list = list_of(&mut arena, &[Opcode::ICONST_0, Opcode::ICONST_1]);

        let mut cursor = list.cursor_at(&mut arena, 2).unwrap();
        assert_eq!(cursor.next_index(), 2);
        let last = cursor.previous().unwrap();
        assert_eq!(cursor.next_index(), 1);
        assert_eq!(cursor.previous_index(), Some(0));

        // Removing after `previous` keeps the cursor in place
        cursor.remove();
        assert!(!cursor.has_next());
        let first = cursor.previous().unwrap();
        assert_eq!(cursor.previous_index(), None);

        let new = cursor.arena_mut().alloc(InsnNode::simple(Opcode::ICONST_4));
        cursor.add(new);
        assert_eq!(cursor.previous(), Some(new));
        assert_eq!(cursor.next(), Some(new));
        assert_eq!(cursor.next(), Some(first));
        drop(cursor);

        assert!(arena.is_detached(last));
        assert_eq!(opcodes(&list, &arena), vec![Opcode::ICONST_4, Opcode::ICONST_0]);
    }

    #[test]
    fn adding_to_an_empty_list() {
        let mut arena = InsnArena::new();
        let mut list = InsnList::new(&mut arena);
        let mut cursor = list.cursor(&mut arena);
        let insn = cursor.arena_mut().alloc(InsnNode::simple(Opcode::RETURN));
        cursor.add(insn);
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.previous(), Some(insn));
        drop(cursor);
        assert_eq!(list.len(), 1);
    }

    #[test]
    #[should_panic(expected = "no current instruction to remove")]
    fn removing_twice() {
        let mut arena = InsnArena::new();
        let mut list = list_of(&mut arena, &[Opcode::NOP, Opcode::NOP]);
        let mut cursor = list.cursor(&mut arena);
        cursor.next();
        cursor.remove();
        cursor.remove();
    }
}
