//! Sequence reconciliation: diff two ordered item sequences into minimal
//! remove/insert/swap edits and patch a live child list with them.
//!
//! Identity is the caller's `PartialEq`: visuals compare by shared-pointer
//! identity, so an item present in both sequences keeps its existing node
//! (and with it any in-flight animation state).

use crate::scene::{NodeId, SceneHandle};

#[derive(Debug, Clone, PartialEq)]
pub struct Diff<T> {
    /// Old-sequence indices to drop, descending so each stays valid.
    pub removes: Vec<usize>,
    /// `(target index, item)` for items new to the sequence, ascending.
    pub inserts: Vec<(usize, T)>,
    /// Pairwise position swaps bringing the survivors into target order.
    pub swaps: Vec<(usize, usize)>,
}

impl<T> Diff<T> {
    pub fn is_empty(&self) -> bool {
        self.removes.is_empty() && self.inserts.is_empty() && self.swaps.is_empty()
    }
}

pub fn diff<T: Clone + PartialEq>(old: &[T], new: &[T]) -> Diff<T> {
    let mut work: Vec<T> = old.to_vec();

    // Items gone from the new sequence, scanned from the end so earlier
    // indices stay valid while the working copy shrinks.
    let mut removes = Vec::new();
    for index in (0..work.len()).rev() {
        if !new.contains(&work[index]) {
            removes.push(index);
            work.remove(index);
        }
    }

    // Fresh items, spliced into the working copy at their target index.
    let mut inserts = Vec::new();
    for (index, item) in new.iter().enumerate() {
        if !work.contains(item) {
            inserts.push((index, item.clone()));
            work.insert(index, item.clone());
        }
    }

    // Selection-sort the survivors into place: wherever the working copy
    // disagrees with the target, find the wanted item further right and
    // swap it in.
    let mut swaps = Vec::new();
    for index in 0..work.len() {
        if work[index] != new[index] {
            if let Some(found) = (index + 1..work.len()).find(|&j| work[j] == new[index]) {
                swaps.push((index, found));
                work.swap(index, found);
            }
        }
    }

    Diff {
        removes,
        inserts,
        swaps,
    }
}

/// Patch `container`'s children from `old` to `new`, materializing fresh
/// items through `factory`. Removals apply first (descending), then
/// insertions, then swaps against the live positions.
pub fn reconcile<T: Clone + PartialEq>(
    scene: &SceneHandle,
    container: NodeId,
    old: &[T],
    new: &[T],
    mut factory: impl FnMut(&T) -> NodeId,
) {
    let edits = diff(old, new);

    for &index in &edits.removes {
        let removed = scene.borrow_mut().remove_child(container, index);
        if let Some(node) = removed {
            scene.borrow_mut().destroy(node);
        }
    }

    for (index, item) in &edits.inserts {
        let node = factory(item);
        scene.borrow_mut().insert_child(container, *index, node);
    }

    for &(a, b) in &edits.swaps {
        scene.borrow_mut().swap_children(container, a, b);
    }
}
