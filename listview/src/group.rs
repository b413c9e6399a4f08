use std::collections::HashMap;

use crate::animation::AnimationQueue;
use crate::queue::{Pending, TaskQueue};

/// One rendered item.
///
/// A slot with no node renders nothing (failed bind, or a selector that returned no template) but
/// still occupies its index.
#[derive(Clone, Debug)]
pub(crate) struct Slot<N> {
    pub node: Option<N>,
    /// Template key the node was bound with; the group name for top-level slots in grouped mode.
    pub key: Option<String>,
}

impl<N> Slot<N> {
    pub fn empty() -> Self {
        Self {
            node: None,
            key: None,
        }
    }
}

/// Addresses one group record from queued work.
///
/// Queued work that outlives its record finds nothing, even when a new record took over the
/// name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct GroupKey {
    /// `None` addresses the default (top-level) group.
    pub name: Option<String>,
    pub id: u64,
}

impl GroupKey {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.name.is_none()
    }
}

/// A clone of the item container currently shown in place of the live one.
pub(crate) struct DisplayedClone<N> {
    pub entry: u64,
    pub container: N,
}

pub(crate) struct GroupRecord<N> {
    /// Unique per record; a group re-created under the same name gets a new id.
    pub id: u64,
    pub name: Option<String>,
    pub index: usize,
    /// Outer group node; `None` for the default group.
    pub container: Option<N>,
    pub item_container: N,
    /// Number of model items represented, updated eagerly as change records arrive.
    pub item_count: usize,
    pub slots: Vec<Slot<N>>,
    pub add_queue: TaskQueue,
    pub remove_queue: TaskQueue,
    pub animations: AnimationQueue,
    pub clone: Option<DisplayedClone<N>>,
}

impl<N> GroupRecord<N> {
    pub fn key(&self) -> GroupKey {
        GroupKey {
            name: self.name.clone(),
            id: self.id,
        }
    }
}

impl<N: Clone> GroupRecord<N> {
    pub fn new(
        id: u64,
        name: Option<String>,
        index: usize,
        container: Option<N>,
        item_container: N,
    ) -> Self {
        Self {
            id,
            name,
            index,
            container,
            item_container,
            item_count: 0,
            slots: Vec::new(),
            add_queue: TaskQueue::default(),
            remove_queue: TaskQueue::default(),
            animations: AnimationQueue::default(),
            clone: None,
        }
    }

    /// Nodes of the slots in `start..end`, clamped to the rendered range.
    pub fn nodes(&self, start: usize, end: usize) -> Vec<N> {
        let end = end.min(self.slots.len());
        let start = start.min(end);
        self.slots[start..end]
            .iter()
            .filter_map(|slot| slot.node.clone())
            .collect()
    }

    /// Everything a removal or re-render must wait for.
    pub fn structural_work(&self) -> Vec<Pending<()>> {
        let mut out = self.add_queue.snapshot();
        out.extend(self.remove_queue.snapshot());
        out
    }

    pub fn is_live_attached(&self) -> bool {
        self.clone.is_none()
    }
}

/// Group records keyed by name.
pub(crate) struct GroupRegistry<N> {
    groups: HashMap<String, GroupRecord<N>>,
}

impl<N> Default for GroupRegistry<N> {
    fn default() -> Self {
        Self {
            groups: HashMap::new(),
        }
    }
}

impl<N> GroupRegistry<N> {
    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&GroupRecord<N>> {
        self.groups.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut GroupRecord<N>> {
        self.groups.get_mut(name)
    }

    pub fn insert(&mut self, name: String, record: GroupRecord<N>) {
        self.groups.insert(name, record);
    }

    pub fn remove(&mut self, name: &str) -> Option<GroupRecord<N>> {
        self.groups.remove(name)
    }

    pub fn drain(&mut self) -> Vec<GroupRecord<N>> {
        self.groups.drain().map(|(_, record)| record).collect()
    }

    pub fn values(&self) -> impl Iterator<Item = &GroupRecord<N>> {
        self.groups.values()
    }

    /// Names ordered by group index.
    pub fn names(&self) -> Vec<String> {
        let mut named: Vec<(usize, &String)> =
            self.groups.iter().map(|(name, r)| (r.index, name)).collect();
        named.sort();
        named.into_iter().map(|(_, name)| name.clone()).collect()
    }
}
