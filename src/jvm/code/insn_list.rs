use super::{Cursor, InsnArena, InsnId, LabelId, OwnerToken};
use crate::jvm::Error;

/// Doubly linked list of instructions, with random access
///
/// The list only stores handles: the nodes and their links live in an [`InsnArena`], which is
/// passed into every operation. A node is in at most one list at a time. Inserting a node that is
/// already in a list (or using an anchor that is not in this list) panics before anything is
/// modified.
///
/// Random access (`get` and `index_of`) goes through an index cache. Any structural change drops
/// the cache, and the next random access rebuilds it in one pass. Sequential walks never need the
/// cache.
#[derive(Debug)]
pub struct InsnList {
    arena: u32,
    token: OwnerToken,
    len: usize,
    first: Option<InsnId>,
    last: Option<InsnId>,
    cache: Option<Vec<InsnId>>,
}

impl InsnList {
    /// Empty list whose nodes will come from `arena`
    pub fn new(arena: &mut InsnArena) -> InsnList {
        InsnList {
            arena: arena.id(),
            token: arena.new_owner(),
            len: 0,
            first: None,
            last: None,
            cache: None,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn first(&self) -> Option<InsnId> {
        self.first
    }

    pub fn last(&self) -> Option<InsnId> {
        self.last
    }

    /// Node at some position in the list
    pub fn get(&mut self, arena: &InsnArena, index: usize) -> Result<InsnId, Error> {
        if index >= self.len {
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        Ok(self.index_cache(arena)[index])
    }

    /// Position of a node in the list
    ///
    /// Panics if the node is not in this list (use [`Self::contains`] first if unsure).
    pub fn index_of(&mut self, arena: &InsnArena, insn: InsnId) -> usize {
        self.assert_member(arena, insn);
        self.index_cache(arena);
        arena.links(insn).index.get()
    }

    /// Is the node in this list?
    pub fn contains(&self, arena: &InsnArena, insn: InsnId) -> bool {
        self.assert_arena(arena);
        arena.owner(insn) == Some(self.token)
    }

    /// Walk the nodes in order
    pub fn iter<'a>(&self, arena: &'a InsnArena) -> Iter<'a> {
        self.assert_arena(arena);
        Iter {
            arena,
            front: self.first,
            back: self.last,
            remaining: self.len,
        }
    }

    pub fn to_vec(&self, arena: &InsnArena) -> Vec<InsnId> {
        self.iter(arena).collect()
    }

    /// Label nodes of the list, in order
    pub fn labels<'a>(&self, arena: &'a InsnArena) -> impl Iterator<Item = LabelId> + 'a {
        self.iter(arena).filter_map(move |insn| arena.as_label(insn))
    }

    /// Structural cursor positioned before the first node
    pub fn cursor<'a>(&'a mut self, arena: &'a mut InsnArena) -> Cursor<'a> {
        self.assert_arena(arena);
        let next = self.first;
        Cursor::new(self, arena, None, next)
    }

    /// Structural cursor positioned so that the next node is the one at `index`
    ///
    /// `index` may be the length of the list, in which case the cursor starts at the end.
    pub fn cursor_at<'a>(
        &'a mut self,
        arena: &'a mut InsnArena,
        index: usize,
    ) -> Result<Cursor<'a>, Error> {
        if index > self.len {
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        let (previous, next) = if index == self.len {
            (self.last, None)
        } else {
            let next = self.get(arena, index)?;
            (arena.previous(next), Some(next))
        };
        Ok(Cursor::new(self, arena, previous, next))
    }

    /// Add a detached node at the end of the list
    pub fn append(&mut self, arena: &mut InsnArena, insn: InsnId) {
        self.assert_detached(arena, insn);
        let last = self.last;
        self.link(arena, insn, last, None);
    }

    /// Add a detached node at the start of the list
    pub fn prepend(&mut self, arena: &mut InsnArena, insn: InsnId) {
        self.assert_detached(arena, insn);
        let first = self.first;
        self.link(arena, insn, None, first);
    }

    /// Add a detached node right after `anchor`
    pub fn insert_after(&mut self, arena: &mut InsnArena, anchor: InsnId, insn: InsnId) {
        self.assert_member(arena, anchor);
        self.assert_detached(arena, insn);
        let next = arena.links(anchor).next;
        self.link(arena, insn, Some(anchor), next);
    }

    /// Add a detached node right before `anchor`
    pub fn insert_before(&mut self, arena: &mut InsnArena, anchor: InsnId, insn: InsnId) {
        self.assert_member(arena, anchor);
        self.assert_detached(arena, insn);
        let previous = arena.links(anchor).previous;
        self.link(arena, insn, previous, Some(anchor));
    }

    /// Move all of the nodes of `other` to the end of this list, leaving `other` empty
    pub fn append_list(&mut self, arena: &mut InsnArena, other: &mut InsnList) {
        let last = self.last;
        self.splice(arena, other, last, None);
    }

    /// Move all of the nodes of `other` to the start of this list, leaving `other` empty
    pub fn prepend_list(&mut self, arena: &mut InsnArena, other: &mut InsnList) {
        let first = self.first;
        self.splice(arena, other, None, first);
    }

    /// Move all of the nodes of `other` right after `anchor`, leaving `other` empty
    pub fn insert_list_after(
        &mut self,
        arena: &mut InsnArena,
        anchor: InsnId,
        other: &mut InsnList,
    ) {
        self.assert_member(arena, anchor);
        let next = arena.links(anchor).next;
        self.splice(arena, other, Some(anchor), next);
    }

    /// Move all of the nodes of `other` right before `anchor`, leaving `other` empty
    pub fn insert_list_before(
        &mut self,
        arena: &mut InsnArena,
        anchor: InsnId,
        other: &mut InsnList,
    ) {
        self.assert_member(arena, anchor);
        let previous = arena.links(anchor).previous;
        self.splice(arena, other, previous, Some(anchor));
    }

    /// Take a node out of the list, leaving it detached
    pub fn remove(&mut self, arena: &mut InsnArena, insn: InsnId) {
        self.assert_member(arena, insn);
        let links = arena.links(insn);
        let (previous, next) = (links.previous, links.next);
        match previous {
            Some(previous) => arena.links_mut(previous).next = next,
            None => self.first = next,
        }
        match next {
            Some(next) => arena.links_mut(next).previous = previous,
            None => self.last = previous,
        }
        arena.detach(insn);
        self.len -= 1;
        self.cache = None;
    }

    /// Put a detached node in place of `old`, which becomes detached
    ///
    /// The index cache stays valid.
    pub fn set(&mut self, arena: &mut InsnArena, old: InsnId, new: InsnId) {
        self.assert_member(arena, old);
        self.assert_detached(arena, new);
        let links = arena.links(old);
        let (previous, next) = (links.previous, links.next);
        let index = links.index.get();

        let new_links = arena.links_mut(new);
        new_links.owner = Some(self.token);
        new_links.previous = previous;
        new_links.next = next;
        new_links.index.set(index);
        match previous {
            Some(previous) => arena.links_mut(previous).next = Some(new),
            None => self.first = Some(new),
        }
        match next {
            Some(next) => arena.links_mut(next).previous = Some(new),
            None => self.last = Some(new),
        }
        arena.detach(old);

        if let Some(cache) = &mut self.cache {
            cache[index] = new;
        }
    }

    /// Empty the list without touching its nodes
    ///
    /// The former nodes are all detached afterwards, since the token they point to is retired.
    pub fn clear(&mut self, arena: &mut InsnArena) {
        self.assert_arena(arena);
        arena.retire_owner(self.token);
        self.reset(arena);
    }

    /// Empty the list, also erasing the links stored on each of its nodes
    pub fn clear_and_detach(&mut self, arena: &mut InsnArena) {
        for insn in self.to_vec(arena) {
            arena.detach(insn);
        }
        self.clear(arena);
    }

    /// Forget the external labels of every label node so the next replay hands out fresh ones
    pub fn reset_labels(&self, arena: &mut InsnArena) {
        let labels: Vec<LabelId> = self.labels(arena).collect();
        log::trace!("Resetting {} labels", labels.len());
        for label in labels {
            arena.reset_label(label);
        }
    }

    fn index_cache(&mut self, arena: &InsnArena) -> &[InsnId] {
        let cache = match self.cache.take() {
            Some(cache) => cache,
            None => {
                log::trace!("Rebuilding index cache for {} instructions", self.len);
                let mut cache = Vec::with_capacity(self.len);
                for insn in self.iter(arena) {
                    arena.links(insn).index.set(cache.len());
                    cache.push(insn);
                }
                cache
            }
        };
        self.cache.insert(cache)
    }

    fn link(
        &mut self,
        arena: &mut InsnArena,
        insn: InsnId,
        previous: Option<InsnId>,
        next: Option<InsnId>,
    ) {
        let links = arena.links_mut(insn);
        links.owner = Some(self.token);
        links.previous = previous;
        links.next = next;
        match previous {
            Some(previous) => arena.links_mut(previous).next = Some(insn),
            None => self.first = Some(insn),
        }
        match next {
            Some(next) => arena.links_mut(next).previous = Some(insn),
            None => self.last = Some(insn),
        }
        self.len += 1;
        self.cache = None;
    }

    fn splice(
        &mut self,
        arena: &mut InsnArena,
        other: &mut InsnList,
        previous: Option<InsnId>,
        next: Option<InsnId>,
    ) {
        self.assert_arena(arena);
        other.assert_arena(arena);
        let (first, last) = match (other.first, other.last) {
            (Some(first), Some(last)) => (first, last),
            _ => return,
        };
        log::trace!("Splicing {} instructions", other.len);

        arena.forward_owner(other.token, self.token);
        arena.links_mut(first).previous = previous;
        arena.links_mut(last).next = next;
        match previous {
            Some(previous) => arena.links_mut(previous).next = Some(first),
            None => self.first = Some(first),
        }
        match next {
            Some(next) => arena.links_mut(next).previous = Some(last),
            None => self.last = Some(last),
        }
        self.len += other.len;
        self.cache = None;
        other.reset(arena);
    }

    /// Fresh token and no nodes
    fn reset(&mut self, arena: &mut InsnArena) {
        self.token = arena.new_owner();
        self.len = 0;
        self.first = None;
        self.last = None;
        self.cache = None;
    }

    fn assert_arena(&self, arena: &InsnArena) {
        assert_eq!(
            self.arena,
            arena.id(),
            "instruction list used with a different arena"
        );
    }

    fn assert_member(&self, arena: &InsnArena, insn: InsnId) {
        assert!(
            self.contains(arena, insn),
            "instruction {:?} is not in this list",
            insn
        );
    }

    fn assert_detached(&self, arena: &InsnArena, insn: InsnId) {
        self.assert_arena(arena);
        assert!(
            arena.is_detached(insn),
            "instruction {:?} is already in a list",
            insn
        );
    }
}

/// Iterator over the nodes of an [`InsnList`]
#[derive(Clone)]
pub struct Iter<'a> {
    arena: &'a InsnArena,
    front: Option<InsnId>,
    back: Option<InsnId>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = InsnId;

    fn next(&mut self) -> Option<InsnId> {
        if self.remaining == 0 {
            return None;
        }
        let insn = self.front?;
        self.remaining -= 1;
        self.front = self.arena.links(insn).next;
        Some(insn)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a> DoubleEndedIterator for Iter<'a> {
    fn next_back(&mut self) -> Option<InsnId> {
        if self.remaining == 0 {
            return None;
        }
        let insn = self.back?;
        self.remaining -= 1;
        self.back = self.arena.links(insn).previous;
        Some(insn)
    }
}

impl<'a> ExactSizeIterator for Iter<'a> {}
