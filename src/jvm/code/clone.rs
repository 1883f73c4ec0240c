use super::{InsnArena, InsnList, LabelId};
use std::collections::HashMap;

/// Mapping from the labels of some code to the labels of its copy
///
/// Copying requires the map to be total: every label referred to by the nodes being copied needs
/// an entry, and looking up a missing entry panics rather than letting the copy point back into
/// the original code.
#[derive(Clone, Debug, Default)]
pub struct LabelMap {
    labels: HashMap<LabelId, LabelId>,
}

impl LabelMap {
    pub fn new() -> LabelMap {
        LabelMap::default()
    }

    /// Map with a fresh label in `arena` for every label node in `labels`
    pub fn fresh(labels: impl IntoIterator<Item = LabelId>, arena: &mut InsnArena) -> LabelMap {
        let mut map = LabelMap::new();
        map.seed(labels, arena);
        map
    }

    /// Add a fresh label in `arena` for every label not already mapped
    pub fn seed(&mut self, labels: impl IntoIterator<Item = LabelId>, arena: &mut InsnArena) {
        for label in labels {
            self.labels.entry(label).or_insert_with(|| arena.new_label());
        }
    }

    pub fn insert(&mut self, old: LabelId, new: LabelId) -> Option<LabelId> {
        self.labels.insert(old, new)
    }

    pub fn get(&self, old: LabelId) -> Option<LabelId> {
        self.labels.get(&old).copied()
    }

    /// Copy of a label
    ///
    /// Panics if there is no entry for the label.
    pub fn map(&self, old: LabelId) -> LabelId {
        match self.labels.get(&old) {
            Some(new) => *new,
            None => panic!("label {:?} has no entry in the label map", old),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Panic unless every label in or referenced from `list` is mapped
    fn assert_covers(&self, list: &InsnList, arena: &InsnArena) {
        for insn in list.iter(arena) {
            let own = arena.as_label(insn);
            for label in own.into_iter().chain(arena[insn].insn().label_refs()) {
                self.map(label);
            }
        }
    }
}

impl InsnList {
    /// Copy of the list into the same arena
    ///
    /// Label nodes are replaced by their entries in `labels` (which must be detached), all other
    /// nodes are copied with their label references remapped.
    pub fn duplicate(&self, arena: &mut InsnArena, labels: &LabelMap) -> InsnList {
        labels.assert_covers(self, arena);
        log::trace!("Copying {} instructions", self.len());
        let mut copy = InsnList::new(arena);
        for insn in self.to_vec(arena) {
            let new = arena.duplicate(insn, labels);
            copy.append(arena, new);
        }
        copy
    }

    /// Copy of the list into another arena
    ///
    /// The entries of `labels` must be detached label nodes of `target`.
    pub fn clone_into(
        &self,
        source: &InsnArena,
        target: &mut InsnArena,
        labels: &LabelMap,
    ) -> InsnList {
        labels.assert_covers(self, source);
        log::trace!("Copying {} instructions into another arena", self.len());
        let mut copy = InsnList::new(target);
        for insn in self.iter(source) {
            let new = target.import(source, insn, labels);
            copy.append(target, new);
        }
        copy
    }
}
