use std::collections::VecDeque;
use std::rc::Rc;

use futures::future::{AbortHandle, abortable};

use crate::group::{DisplayedClone, GroupKey, GroupRecord};
use crate::listview::Inner;
use crate::queue::{Pending, spawn_shared};
use crate::{AnimationKey, AnimationOp, AnimationOutcome, Host};

pub(crate) struct QueuedAnimation {
    id: u64,
    op: AnimationOp,
    abort: AbortHandle,
    done: Pending<AnimationOutcome>,
}

/// Per-group FIFO of queued and running animations.
///
/// Only the head entry animates; every later entry waits for its predecessor to resolve.
#[derive(Default)]
pub(crate) struct AnimationQueue {
    entries: VecDeque<QueuedAnimation>,
}

impl AnimationQueue {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, op: AnimationOp) -> bool {
        self.entries.iter().any(|e| e.op == op)
    }

    pub fn ops(&self) -> Vec<AnimationOp> {
        self.entries.iter().map(|e| e.op).collect()
    }

    fn last_done(&self) -> Option<Pending<AnimationOutcome>> {
        self.entries.back().map(|e| e.done.clone())
    }

    fn remove(&mut self, id: u64) {
        self.entries.retain(|e| e.id != id);
    }

    pub fn snapshot(&self) -> Vec<Pending<AnimationOutcome>> {
        self.entries.iter().map(|e| e.done.clone()).collect()
    }

    /// Aborts every entry and pops it. Entries that never started never will.
    fn abort_all(&mut self) -> usize {
        let n = self.entries.len();
        for entry in self.entries.drain(..) {
            entry.abort.abort();
        }
        n
    }
}

/// What an animation runs on.
pub(crate) enum AnimationTarget<N> {
    /// Nodes in the live item container.
    Live { nodes: Vec<N>, op: AnimationOp },
    /// Slots `start..end` of a clone of the item container, snapshotted when queued.
    Clone { start: usize, end: usize },
}

impl<H: Host> Inner<H> {
    /// Queues an animation on `record`.
    ///
    /// The host animation is created immediately so it captures the current geometry, but it only
    /// starts once every earlier entry of the queue has resolved. With `cancel_first`, earlier
    /// entries are cancelled instead of waited for.
    ///
    /// `Leave` targets are removed from the live container once the animation resolves, whether it
    /// finished or was cancelled.
    pub(crate) fn animate(
        self: &Rc<Self>,
        group: &GroupKey,
        record: &mut GroupRecord<H::Node>,
        id: u64,
        target: AnimationTarget<H::Node>,
        key: AnimationKey,
        cancel_first: bool,
    ) {
        if cancel_first && !record.animations.is_empty() {
            self.cancel_animations(record);
        }
        let previous = record.animations.last_done();

        let (op, nodes, clone) = match target {
            AnimationTarget::Live { nodes, op } => (op, nodes, None),
            AnimationTarget::Clone { start, end } => {
                let cloned = self.host.clone_container(&record.item_container);
                let end = end.min(cloned.children.len());
                let start = start.min(end);
                let nodes = cloned.children[start..end].to_vec();
                (AnimationOp::Clone, nodes, Some(cloned.container))
            }
        };
        let leaving = (op == AnimationOp::Leave).then(|| (record.item_container.clone(), nodes.clone()));

        let animation = self.host.animate(&nodes, key);
        ltrace!(id, ?op, ?key, queued = record.animations.len(), "animation queued");

        let this = Rc::clone(self);
        let group_key = group.clone();
        let (run, abort) = abortable(async move {
            if let Some(previous) = previous {
                previous.await;
            }
            if let Some(clone) = clone {
                this.show_clone(&group_key, id, clone);
            }
            animation.await;
        });

        let this = Rc::clone(self);
        let group_key = group.clone();
        let done = spawn_shared(&*self.spawner, async move {
            let outcome = match run.await {
                Ok(()) => AnimationOutcome::Finished,
                Err(_) => AnimationOutcome::Cancelled,
            };
            this.finish_animation(&group_key, id);
            if let Some((container, nodes)) = leaving {
                this.host.remove(&container, &nodes);
                for node in &nodes {
                    this.host.dispose(node);
                }
            }
            ltrace!(id, ?outcome, "animation resolved");
            outcome
        });

        record.animations.entries.push_back(QueuedAnimation {
            id,
            op,
            abort,
            done,
        });
    }

    /// Cancels every queued or running animation of `record`, putting the live container back in
    /// the document if a clone was showing.
    pub(crate) fn cancel_animations(&self, record: &mut GroupRecord<H::Node>) {
        let cancelled = record.animations.abort_all();
        if let Some(clone) = record.clone.take() {
            self.host.swap(&clone.container, &record.item_container);
        }
        if cancelled > 0 {
            ltrace!(cancelled, group = ?record.name, "animations cancelled");
        }
    }

    fn show_clone(&self, group: &GroupKey, id: u64, container: H::Node) {
        let mut state = self.state.borrow_mut();
        let Some(record) = state.group_mut(group) else {
            return;
        };
        let outgoing = match &record.clone {
            Some(previous) => previous.container.clone(),
            None => record.item_container.clone(),
        };
        self.host.swap(&outgoing, &container);
        record.clone = Some(DisplayedClone {
            entry: id,
            container,
        });
    }

    fn finish_animation(&self, group: &GroupKey, id: u64) {
        let mut state = self.state.borrow_mut();
        let Some(record) = state.group_mut(group) else {
            return;
        };
        if record.clone.as_ref().is_some_and(|c| c.entry == id) {
            if let Some(clone) = record.clone.take() {
                self.host.swap(&clone.container, &record.item_container);
            }
        }
        record.animations.remove(id);
    }
}
