use super::{InsnNode, Label, LabelId, LabelMap, LabelNode};
use crate::jvm::InsnKind;
use std::cell::Cell;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_ARENA: AtomicU32 = AtomicU32::new(0);

/// Handle to an instruction node stored in an [`InsnArena`]
///
/// Handles are stable: a node keeps its handle when it moves between lists, gets removed, or gets
/// replaced. Handles also remember which arena they came from, so using one with the wrong arena
/// fails loudly.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct InsnId {
    arena: u32,
    slot: u32,
}

impl fmt::Debug for InsnId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_fmt(format_args!("#{}.{}", self.arena, self.slot))
    }
}

/// Identifies which list a node belongs to
///
/// Tokens are never reused. Splicing a list into another forwards the source token to the
/// destination token and clearing a list retires its token, so both operations re-home every node
/// of a list at once.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub(crate) struct OwnerToken(u32);

#[derive(Copy, Clone, Debug)]
enum Owner {
    /// Token currently held by a list
    Live,

    /// Nodes were spliced into the list holding (or once holding) the other token
    Forwarded(OwnerToken),

    /// The list was cleared
    Retired,
}

/// Intrusive links of a node
///
/// These are only meaningful while `owner` resolves to a live token.
#[derive(Clone, Debug, Default)]
pub(crate) struct Links {
    pub owner: Option<OwnerToken>,
    pub previous: Option<InsnId>,
    pub next: Option<InsnId>,

    /// Position in the owning list, valid whenever the owning list has its index cache built
    pub index: Cell<usize>,
}

struct Slot {
    node: InsnNode,
    links: Links,
}

/// Storage for instruction nodes
///
/// Nodes are allocated once and never freed, so their [`InsnId`]s stay valid for as long as the
/// arena is alive. Lists ([`super::InsnList`]) only hold handles: all the lists that nodes move
/// between must share one arena.
///
/// Memory is never reclaimed: removed and replaced nodes keep their slot, and every list created,
/// cleared, or drained by a splice leaves a token behind. An arena that goes through many edits
/// grows accordingly, and copying the code into a fresh arena (see
/// [`crate::jvm::model::MethodNode::duplicate`]) is the way to compact it.
pub struct InsnArena {
    id: u32,
    slots: Vec<Slot>,
    owners: Vec<Cell<Owner>>,
}

impl InsnArena {
    pub fn new() -> InsnArena {
        InsnArena::with_capacity(0)
    }

    /// New arena with room for `capacity` nodes before reallocating
    pub fn with_capacity(capacity: usize) -> InsnArena {
        InsnArena {
            id: NEXT_ARENA.fetch_add(1, Ordering::Relaxed),
            slots: Vec::with_capacity(capacity),
            owners: vec![],
        }
    }

    pub(crate) fn id(&self) -> u32 {
        self.id
    }

    /// Number of nodes allocated in the arena
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Move a detached node into the arena
    pub fn alloc(&mut self, node: InsnNode) -> InsnId {
        let id = InsnId {
            arena: self.id,
            slot: u32::try_from(self.slots.len()).expect("instruction arena overflow"),
        };
        self.slots.push(Slot {
            node,
            links: Links::default(),
        });
        id
    }

    /// Allocate a fresh label node
    pub fn new_label(&mut self) -> LabelId {
        LabelId(self.alloc(InsnNode::label(LabelNode::new())))
    }

    /// Allocate a label node standing for an external label
    pub fn new_label_for(&mut self, label: Label) -> LabelId {
        LabelId(self.alloc(InsnNode::label(LabelNode::with_label(label))))
    }

    /// View a node as a label, if it is one
    pub fn as_label(&self, insn: InsnId) -> Option<LabelId> {
        match self[insn].kind() {
            InsnKind::Label => Some(LabelId(insn)),
            _ => None,
        }
    }

    /// External label for a label node, assigning a fresh one if the node has none
    pub fn label(&mut self, label: LabelId) -> Label {
        self.label_node_mut(label).get_or_assign()
    }

    /// External label for a label node (if it has been assigned one)
    pub fn existing_label(&self, label: LabelId) -> Option<Label> {
        match self[label.0].insn() {
            super::Insn::Label(node) => node.label(),
            _ => unreachable!("label handle {:?} does not point to a label", label),
        }
    }

    /// Forget the external label of a label node
    pub fn reset_label(&mut self, label: LabelId) {
        self.label_node_mut(label).reset();
    }

    fn label_node_mut(&mut self, label: LabelId) -> &mut LabelNode {
        match self[label.0].label_node_mut() {
            Some(node) => node,
            None => unreachable!("label handle {:?} does not point to a label", label),
        }
    }

    /// Is the node outside of every list?
    pub fn is_detached(&self, insn: InsnId) -> bool {
        self.owner(insn).is_none()
    }

    /// Next node in the list containing `insn` (`None` at the end or if detached)
    pub fn next(&self, insn: InsnId) -> Option<InsnId> {
        self.owner(insn).and(self.links(insn).next)
    }

    /// Previous node in the list containing `insn` (`None` at the start or if detached)
    pub fn previous(&self, insn: InsnId) -> Option<InsnId> {
        self.owner(insn).and(self.links(insn).previous)
    }

    /// Make a detached copy of a node in this same arena
    ///
    /// Label nodes are not copied: the copy of a label is its entry in `labels`.
    pub fn duplicate(&mut self, insn: InsnId, labels: &LabelMap) -> InsnId {
        if let Some(label) = self.as_label(insn) {
            return labels.map(label).insn();
        }
        let node = self[insn].clone_with(labels);
        self.alloc(node)
    }

    /// Make a detached copy of a node from another arena into this one
    ///
    /// Label nodes are not copied: the copy of a label is its entry in `labels`.
    pub fn import(&mut self, source: &InsnArena, insn: InsnId, labels: &LabelMap) -> InsnId {
        if let Some(label) = source.as_label(insn) {
            return labels.map(label).insn();
        }
        self.alloc(source[insn].clone_with(labels))
    }

    pub(crate) fn check_id(&self, insn: InsnId) {
        assert_eq!(
            insn.arena, self.id,
            "instruction {:?} belongs to a different arena",
            insn
        );
    }

    fn slot(&self, insn: InsnId) -> &Slot {
        self.check_id(insn);
        &self.slots[insn.slot as usize]
    }

    fn slot_mut(&mut self, insn: InsnId) -> &mut Slot {
        self.check_id(insn);
        &mut self.slots[insn.slot as usize]
    }

    pub(crate) fn links(&self, insn: InsnId) -> &Links {
        &self.slot(insn).links
    }

    pub(crate) fn links_mut(&mut self, insn: InsnId) -> &mut Links {
        &mut self.slot_mut(insn).links
    }

    /// Reset the links of a node so that it is detached
    pub(crate) fn detach(&mut self, insn: InsnId) {
        *self.links_mut(insn) = Links::default();
    }

    /// Mint a new token for a list
    pub(crate) fn new_owner(&mut self) -> OwnerToken {
        let token = OwnerToken(u32::try_from(self.owners.len()).expect("list token overflow"));
        self.owners.push(Cell::new(Owner::Live));
        token
    }

    /// Every node owned by `from` is now owned by `to`
    pub(crate) fn forward_owner(&mut self, from: OwnerToken, to: OwnerToken) {
        debug_assert_ne!(from, to);
        self.owners[from.0 as usize].set(Owner::Forwarded(to));
    }

    /// Every node owned by `token` is now detached
    pub(crate) fn retire_owner(&mut self, token: OwnerToken) {
        self.owners[token.0 as usize].set(Owner::Retired);
    }

    /// Live token of the list containing `insn` (if any)
    ///
    /// Every token visited on the way gets pointed straight at the end of the chain, so that chains
    /// built up by repeated splicing only get walked once.
    pub(crate) fn owner(&self, insn: InsnId) -> Option<OwnerToken> {
        let start = self.links(insn).owner?;
        let mut token = start;
        let root = loop {
            match self.owners[token.0 as usize].get() {
                Owner::Live => break Some(token),
                Owner::Forwarded(next) => token = next,
                Owner::Retired => break None,
            }
        };

        let compressed = match root {
            Some(root) => Owner::Forwarded(root),
            None => Owner::Retired,
        };
        let mut token = start;
        while Some(token) != root {
            let owner = &self.owners[token.0 as usize];
            match owner.get() {
                Owner::Forwarded(next) => {
                    owner.set(compressed);
                    token = next;
                }
                Owner::Live | Owner::Retired => break,
            }
        }
        root
    }

    /// Number of forwarding hops from the token stored on `insn` to its owner
    #[cfg(test)]
    fn owner_hops(&self, insn: InsnId) -> usize {
        let mut hops = 0;
        let mut token = self.links(insn).owner;
        while let Some(current) = token {
            match self.owners[current.0 as usize].get() {
                Owner::Forwarded(next) => {
                    hops += 1;
                    token = Some(next);
                }
                Owner::Live | Owner::Retired => break,
            }
        }
        hops
    }
}

impl Default for InsnArena {
    fn default() -> InsnArena {
        InsnArena::new()
    }
}

impl Index<InsnId> for InsnArena {
    type Output = InsnNode;

    fn index(&self, insn: InsnId) -> &InsnNode {
        &self.slot(insn).node
    }
}

impl IndexMut<InsnId> for InsnArena {
    fn index_mut(&mut self, insn: InsnId) -> &mut InsnNode {
        &mut self.slot_mut(insn).node
    }
}

impl fmt::Debug for InsnArena {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("InsnArena")
            .field("id", &self.id)
            .field("nodes", &self.slots.len())
            .field("lists", &self.owners.len())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::Opcode;

    #[test]
    fn owners_forward_and_retire() {
        let mut arena = InsnArena::new();
        let insn = arena.alloc(InsnNode::simple(Opcode::NOP));
        assert!(arena.is_detached(insn));

        let first = arena.new_owner();
        let second = arena.new_owner();
        arena.links_mut(insn).owner = Some(first);
        assert_eq!(arena.owner(insn), Some(first));

        arena.forward_owner(first, second);
        assert_eq!(arena.owner(insn), Some(second));

        arena.retire_owner(second);
        assert!(arena.is_detached(insn));
        assert_eq!(arena.next(insn), None);
    }

    #[test]
    fn splicing_back_and_forth_keeps_chains_short() {
        use crate::jvm::code::InsnList;

        let mut arena = InsnArena::new();
        let mut left = InsnList::new(&mut arena);
        let mut right = InsnList::new(&mut arena);
        let oldest = arena.alloc(InsnNode::simple(Opcode::NOP));
        left.append(&mut arena, oldest);

        for round in 0..200 {
            let fresh = arena.alloc(InsnNode::simple(Opcode::NOP));
            if round % 2 == 0 {
                right.append(&mut arena, fresh);
                right.append_list(&mut arena, &mut left);
            } else {
                left.append(&mut arena, fresh);
                left.append_list(&mut arena, &mut right);
            }
        }
        assert!(arena.owner_hops(oldest) > 1);

        // One lookup flattens the chain
        assert!(left.contains(&arena, oldest));
        assert_eq!(arena.owner_hops(oldest), 1);
        assert_eq!(left.len(), 201);
        assert!(right.is_empty());

        left.clear(&mut arena);
        assert!(arena.is_detached(oldest));
    }

    #[test]
    #[should_panic(expected = "belongs to a different arena")]
    fn ids_are_tied_to_their_arena() {
        let mut arena1 = InsnArena::new();
        let arena2 = InsnArena::new();
        let insn = arena1.alloc(InsnNode::simple(Opcode::NOP));
        let _ = &arena2[insn];
    }

    #[test]
    fn labels_get_assigned_lazily() {
        let mut arena = InsnArena::new();
        let label = arena.new_label();
        assert_eq!(arena.existing_label(label), None);
        let assigned = arena.label(label);
        assert_eq!(arena.existing_label(label), Some(assigned));
        arena.reset_label(label);
        assert_eq!(arena.existing_label(label), None);

        let external = Label::new();
        let label = arena.new_label_for(external);
        assert_eq!(arena.label(label), external);
        assert_eq!(arena.as_label(label.insn()), Some(label));
    }
}
