use std::rc::Rc;

use crate::group::GroupKey;
use crate::listview::Inner;
use crate::{AnimationKey, AnimationOp, ChangeKind, ChangeRecord, Host};

impl<H: Host> Inner<H> {
    /// Routes a batch of change records to the handler for the first record's kind.
    pub(crate) fn dispatch(self: &Rc<Self>, group: Option<&str>, records: &[ChangeRecord]) {
        let Some(record) = records.first() else {
            return;
        };
        let key = {
            let state = self.state.borrow();
            if state.disposed {
                ldebug!(group = ?group, "change ignored after dispose");
                return;
            }
            match state.key(group) {
                Some(key) => key,
                None => {
                    lwarn!(group = ?group, "change for an unknown group ignored");
                    return;
                }
            }
        };
        if records.len() > 1 {
            ltrace!(count = records.len(), "batched change records; only the first is dispatched");
        }
        ldebug!(group = ?group, kind = ?record.kind, index = record.index, "dispatch");

        if key.is_root() && self.is_grouped() {
            self.dispatch_groups(&key, record);
            return;
        }
        match record.kind {
            ChangeKind::Append => self.on_append(&key, record),
            ChangeKind::RemoveLast => self.on_remove_last(&key, record),
            ChangeKind::RemoveFirst => self.on_remove_first(&key, record),
            ChangeKind::Prepend => self.on_prepend(&key, record),
            ChangeKind::Splice => self.on_splice(&key, record),
        }
    }

    /// Top-level changes in grouped mode. Only tail growth and tail removal are diffed; anything
    /// else rebuilds every group.
    fn dispatch_groups(self: &Rc<Self>, root: &GroupKey, record: &ChangeRecord) {
        match record.kind {
            ChangeKind::Append => {
                let added = record.added_count.unwrap_or(0);
                if added == 0 {
                    return;
                }
                let previous = self.grow(root, added, record.new_length);
                self.create_items(root, previous, added, 0);
            }
            ChangeKind::RemoveLast if record.removed_count > 0 => {
                self.shrink(root, 1);
                self.remove_tail(root, record.new_length, 1, false);
            }
            ChangeKind::RemoveLast => {}
            _ => {
                self.rerender(root, record.new_length);
            }
        }
    }

    fn on_append(self: &Rc<Self>, group: &GroupKey, record: &ChangeRecord) {
        let added = record.added_count.unwrap_or(0);
        if added == 0 {
            return;
        }
        let previous = self.grow(group, added, record.new_length);
        let animate_count = if self.options.animate { added } else { 0 };
        self.create_items(group, previous, added, animate_count);
    }

    fn on_remove_last(self: &Rc<Self>, group: &GroupKey, record: &ChangeRecord) {
        if record.removed_count == 0 {
            return;
        }
        self.shrink(group, 1);
        self.remove_tail(group, record.new_length, 1, self.options.animate);
    }

    /// Slots hold positions, not identities: removing the first item drops the trailing slot and
    /// lets the remaining slots rebind. The visible leave runs on a clone showing the old first
    /// item.
    fn on_remove_first(self: &Rc<Self>, group: &GroupKey, record: &ChangeRecord) {
        if record.removed_count == 0 {
            return;
        }
        self.shrink(group, 1);
        if self.options.animate {
            self.animate_clone_leave(group, 0, 1);
        }
        self.remove_tail(group, record.new_length, 1, false);
    }

    fn on_prepend(self: &Rc<Self>, group: &GroupKey, record: &ChangeRecord) {
        let added = record.added_count.unwrap_or(0);
        if added == 0 {
            return;
        }
        let previous = self.grow(group, added, record.new_length);

        if self.state.borrow().templates.uses_selector() {
            self.rerender(group, previous + added);
            return;
        }

        let mut animate_count = 0;
        if self.options.animate {
            let (rendered, cancel_first) = self.animation_context(group);
            let existing = rendered.min(added);
            if existing > 0 {
                self.animate_slots(group, 0, existing, AnimationKey::Enter, cancel_first);
            }
            animate_count = added - existing;
        }
        self.create_items(group, previous, added, animate_count);
    }

    fn on_splice(self: &Rc<Self>, group: &GroupKey, record: &ChangeRecord) {
        let selector = self.state.borrow().templates.uses_selector();

        let Some(added) = record.added_count else {
            self.on_replace(group, record.new_length, selector);
            return;
        };
        let removed = record.removed_count;

        if added > removed {
            let delta = added - removed;
            let previous = self.grow(group, delta, record.new_length);
            if selector {
                let len = previous + delta;
                let count = len.saturating_sub(record.index);
                self.render_range(group, record.index, Some(count), len);
                return;
            }
            let mut animate_count = 0;
            if self.options.animate {
                let (rendered, cancel_first) = self.animation_context(group);
                let existing = delta.min(previous.min(rendered).saturating_sub(record.index));
                if existing > 0 {
                    self.animate_slots(
                        group,
                        record.index,
                        record.index + existing,
                        AnimationKey::Enter,
                        cancel_first,
                    );
                }
                animate_count = delta - existing;
            }
            self.create_items(group, previous, delta, animate_count);
        } else if removed > added {
            let delta = removed - added;
            self.shrink(group, delta);
            let animate = self.options.animate;
            let adding = self
                .state
                .borrow()
                .group(group)
                .is_some_and(|r| !r.add_queue.is_empty());
            if animate && !adding {
                self.animate_clone_leave(group, record.index, record.index + removed);
            }

            let start = record.index;
            let tail = record.new_length;
            let len = self.item_count(group);
            self.after_structural(group, move |this, key| {
                if animate && added > 0 {
                    this.animate_slots(key, start, start + added, AnimationKey::Enter, false);
                }
                this.remove_slots(key, tail, delta, false);
            });
            if selector && added > 0 {
                self.render_range(group, record.index, Some(added), len);
            }
        } else if selector && added > 0 {
            let len = self.item_count(group);
            self.render_range(group, record.index, Some(added), len);
        }
    }

    /// The whole collection was replaced: only the length is known.
    fn on_replace(self: &Rc<Self>, group: &GroupKey, new_length: usize, selector: bool) {
        let previous = {
            let mut state = self.state.borrow_mut();
            let Some(record) = state.group_mut(group) else {
                return;
            };
            std::mem::replace(&mut record.item_count, new_length)
        };

        if selector {
            if new_length < previous {
                self.remove_tail(group, new_length, previous - new_length, false);
            }
            self.render_range(group, 0, None, new_length);
            return;
        }
        if new_length > previous {
            let delta = new_length - previous;
            let animate_count = if self.options.animate { delta } else { 0 };
            self.create_items(group, previous, delta, animate_count);
        } else if new_length < previous {
            self.remove_tail(group, new_length, previous - new_length, self.options.animate);
        }
    }

    /// Adds `by` to the item count and returns the previous count.
    fn grow(&self, group: &GroupKey, by: usize, new_length: usize) -> usize {
        let mut state = self.state.borrow_mut();
        let Some(record) = state.group_mut(group) else {
            return 0;
        };
        let previous = record.item_count;
        record.item_count = previous + by;
        if record.item_count != new_length {
            lwarn!(
                group = ?group,
                item_count = record.item_count,
                new_length,
                "change record does not match the tracked item count"
            );
        }
        previous
    }

    /// Subtracts `by` from the item count, flooring at zero.
    fn shrink(&self, group: &GroupKey, by: usize) {
        let mut state = self.state.borrow_mut();
        let Some(record) = state.group_mut(group) else {
            return;
        };
        if record.item_count < by {
            lwarn!(group = ?group, item_count = record.item_count, by, "removal exceeds the tracked item count");
        }
        record.item_count = record.item_count.saturating_sub(by);
    }

    fn item_count(&self, group: &GroupKey) -> usize {
        self.state
            .borrow()
            .group(group)
            .map_or(0, |r| r.item_count)
    }

    /// Rendered slot count, and whether a clone-based animation is queued.
    fn animation_context(&self, group: &GroupKey) -> (usize, bool) {
        self.state
            .borrow()
            .group(group)
            .map_or((0, false), |r| {
                (r.slots.len(), r.animations.contains(AnimationOp::Clone))
            })
    }
}
