use std::rc::Rc;

use futures::future::{FutureExt, join_all};

use crate::animation::AnimationTarget;
use crate::group::{GroupKey, GroupRecord, Slot};
use crate::listview::{Inner, State};
use crate::queue::{Pending, drain, ready, spawn_shared};
use crate::{AnimationKey, AnimationOp, Aliases, BindError, GroupNodes, Host, Task};

/// What a queued render waits for before touching the container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Gate {
    /// The previous render of the group.
    PreviousRender,
    /// Every pending render and removal of the group.
    AllStructural,
}

impl<H: Host> Inner<H> {
    /// Queues a render of `count` new slots bound at `index..index + count`.
    ///
    /// Binds start right away; the slots are appended once every earlier render of the group has
    /// been inserted. The first `animate_count` of them enter with an animation.
    ///
    /// Selector renders and top-level group renders depend on slot positions, so they also wait
    /// for earlier removals.
    pub(crate) fn create_items(
        self: &Rc<Self>,
        group: &GroupKey,
        index: usize,
        count: usize,
        animate_count: usize,
    ) {
        if count == 0 {
            return;
        }
        let positional = {
            let state = self.state.borrow();
            state.templates.uses_selector()
                || (group.is_root() && state.templates.group_header.is_some())
        };
        let gate = if positional {
            Gate::AllStructural
        } else {
            Gate::PreviousRender
        };
        self.enqueue_add(group, gate, |gate| {
            self.render_job(group, index, count, animate_count, gate)
        });
    }

    /// Throws away every slot of `group` and renders `len` items again.
    ///
    /// The item count becomes `len` immediately; changes dispatched before the job runs are
    /// applied on top of it.
    pub(crate) fn rerender(self: &Rc<Self>, group: &GroupKey, len: usize) {
        if !self.set_item_count(group, len) {
            return;
        }
        let this = Rc::clone(self);
        let key = group.clone();
        self.enqueue_add(group, Gate::AllStructural, move |gate| {
            async move {
                if let Some(gate) = gate {
                    gate.await;
                }
                this.clear_slots(&key);
                this.render_job(&key, 0, len, 0, None).await;
            }
            .boxed_local()
        });
    }

    /// Resynchronizes `index..index + count` (or `index..` when `count` is `None`) with a
    /// collection of `len` items: trims or extends the tail, re-selects templates and refreshes
    /// aliases.
    ///
    /// Like [`Inner::rerender`], the item count becomes `len` immediately.
    pub(crate) fn render_range(
        self: &Rc<Self>,
        group: &GroupKey,
        index: usize,
        count: Option<usize>,
        len: usize,
    ) {
        if !self.set_item_count(group, len) {
            return;
        }
        let this = Rc::clone(self);
        let key = group.clone();
        self.enqueue_add(group, Gate::AllStructural, move |gate| {
            async move {
                if let Some(gate) = gate {
                    gate.await;
                }
                let rendered = this.trim_to(&key, len);
                let end = count.map_or(len, |c| index.saturating_add(c).min(len));
                let selector = {
                    let state = this.state.borrow();
                    state.templates.uses_selector()
                        && !(key.is_root() && state.templates.group_header.is_some())
                };

                if selector {
                    let start = index.min(rendered);
                    let stop = if rendered < len { len } else { end };
                    if start < stop {
                        this.render_job(&key, start, stop - start, 0, None).await;
                    }
                } else {
                    if rendered < len {
                        this.render_job(&key, rendered, len - rendered, 0, None).await;
                    }
                    this.refresh_range(&key, index, end);
                }
            }
            .boxed_local()
        });
    }

    /// Queues removal of `count` slots at `start` once every pending render and removal of the
    /// group has completed. The position is clamped so that the trailing slots are removed.
    pub(crate) fn remove_tail(
        self: &Rc<Self>,
        group: &GroupKey,
        start: usize,
        count: usize,
        leave: bool,
    ) {
        if count == 0 {
            return;
        }
        self.after_structural(group, move |this, key| {
            this.remove_slots(key, start, count, leave);
        });
    }

    /// Runs `f` once every pending render and removal of `group` has completed, as a removal.
    pub(crate) fn after_structural(
        self: &Rc<Self>,
        group: &GroupKey,
        f: impl FnOnce(&Rc<Self>, &GroupKey) + 'static,
    ) {
        let (id, work) = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id();
            let Some(record) = state.group_mut(group) else {
                return;
            };
            (id, record.structural_work())
        };

        let this = Rc::clone(self);
        let key = group.clone();
        let pending = spawn_shared(&*self.spawner, async move {
            drain(work).await;
            f(&this, &key);
            if let Some(record) = this.state.borrow_mut().group_mut(&key) {
                record.remove_queue.complete(id);
            }
        });
        if let Some(record) = self.state.borrow_mut().group_mut(group) {
            record.remove_queue.push(id, pending);
        }
    }

    /// Queues an animation of the live slots `start..end`.
    pub(crate) fn animate_slots(
        self: &Rc<Self>,
        group: &GroupKey,
        start: usize,
        end: usize,
        key: AnimationKey,
        cancel_first: bool,
    ) {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        let Some(record) = state.group_mut(group) else {
            return;
        };
        let nodes = record.nodes(start, end);
        if nodes.is_empty() {
            return;
        }
        self.animate(
            group,
            record,
            id,
            AnimationTarget::Live {
                nodes,
                op: AnimationOp::Plain,
            },
            key,
            cancel_first,
        );
    }

    /// Queues a leave animation of slots `start..end` on a clone of the item container.
    pub(crate) fn animate_clone_leave(self: &Rc<Self>, group: &GroupKey, start: usize, end: usize) {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        let Some(record) = state.group_mut(group) else {
            return;
        };
        if record.slots.is_empty() {
            return;
        }
        self.animate(
            group,
            record,
            id,
            AnimationTarget::Clone { start, end },
            AnimationKey::Leave,
            false,
        );
    }

    fn enqueue_add(
        self: &Rc<Self>,
        group: &GroupKey,
        gate: Gate,
        build: impl FnOnce(Option<Task<()>>) -> Task<()>,
    ) {
        let (id, gate) = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id();
            let Some(record) = state.group_mut(group) else {
                lwarn!(group = ?group, "render requested for an unknown group");
                return;
            };
            let gate = match gate {
                Gate::PreviousRender => record.add_queue.last().map(|p| p.boxed_local()),
                Gate::AllStructural => Some(drain(record.structural_work()).boxed_local()),
            };
            (id, gate)
        };

        let job = build(gate);
        let this = Rc::clone(self);
        let key = group.clone();
        let pending = spawn_shared(&*self.spawner, async move {
            job.await;
            if let Some(record) = this.state.borrow_mut().group_mut(&key) {
                record.add_queue.complete(id);
            }
        });
        if let Some(record) = self.state.borrow_mut().group_mut(group) {
            record.add_queue.push(id, pending);
        }
    }

    fn render_job(
        self: &Rc<Self>,
        group: &GroupKey,
        index: usize,
        count: usize,
        animate_count: usize,
        gate: Option<Task<()>>,
    ) -> Task<()> {
        let (grouped, selector) = {
            let state = self.state.borrow();
            (
                state.templates.group_header.is_some(),
                state.templates.uses_selector(),
            )
        };
        if group.is_root() && grouped {
            self.groups_job(index, count, gate)
        } else if selector {
            self.selector_job(group, index, count, animate_count, gate)
        } else {
            self.static_job(group, index, count, animate_count, gate)
        }
    }

    fn static_job(
        self: &Rc<Self>,
        group: &GroupKey,
        index: usize,
        count: usize,
        animate_count: usize,
        gate: Option<Task<()>>,
    ) -> Task<()> {
        let (template, len) = {
            let state = self.state.borrow();
            (
                state.templates.named().map(str::to_owned),
                state.group(group).map_or(0, |r| r.item_count),
            )
        };
        let Some(template) = template else {
            lwarn!(group = ?group, "no item template; nothing rendered");
            return async move {
                if let Some(gate) = gate {
                    gate.await;
                }
            }
            .boxed_local();
        };

        let binds: Vec<_> = (index..index + count)
            .map(|i| {
                let aliases = Aliases::new(i, len, group.name());
                self.host.bind(&template, i, group.name(), &aliases)
            })
            .collect();

        let this = Rc::clone(self);
        let group = group.clone();
        async move {
            let results = join_all(binds).await;
            if let Some(gate) = gate {
                gate.await;
            }
            let slots = results
                .into_iter()
                .map(|result| match result {
                    Ok(node) => Slot {
                        node: Some(node),
                        key: Some(template.clone()),
                    },
                    Err(err) => {
                        lwarn!(error = %err, group = ?group, "bind failed; slot renders nothing");
                        Slot::empty()
                    }
                })
                .collect();
            this.insert_slots(&group, slots, animate_count);
        }
        .boxed_local()
    }

    fn insert_slots(
        self: &Rc<Self>,
        group: &GroupKey,
        slots: Vec<Slot<H::Node>>,
        animate_count: usize,
    ) {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        let disposed = state.disposed;
        let record = state.group_mut(group).filter(|_| !disposed);
        let Some(record) = record else {
            for node in slots.iter().filter_map(|s| s.node.as_ref()) {
                self.host.dispose(node);
            }
            return;
        };

        let start = record.slots.len();
        let nodes: Vec<H::Node> = slots.iter().filter_map(|s| s.node.clone()).collect();
        if !nodes.is_empty() {
            self.host.append(&record.item_container, &nodes);
        }
        let entering: Vec<H::Node> = slots
            .iter()
            .take(animate_count)
            .filter_map(|s| s.node.clone())
            .collect();
        record.slots.extend(slots);

        if self.options.animate && !entering.is_empty() {
            self.animate(
                group,
                record,
                id,
                AnimationTarget::Live {
                    nodes: entering,
                    op: AnimationOp::Plain,
                },
                AnimationKey::Enter,
                false,
            );
        }
        if start > 0 {
            self.refresh_aliases(record, start - 1);
        }
    }

    fn selector_job(
        self: &Rc<Self>,
        group: &GroupKey,
        index: usize,
        count: usize,
        animate_count: usize,
        gate: Option<Task<()>>,
    ) -> Task<()> {
        let this = Rc::clone(self);
        let group = group.clone();
        async move {
            if let Some(gate) = gate {
                gate.await;
            }
            let Some(selector) = this.state.borrow().templates.selector() else {
                return;
            };
            let first_new = this.rendered_len(&group);
            let mut entering = Vec::new();

            // Selections run one at a time so each sees the previous one applied.
            for i in index..index + count {
                let key = selector(group.name(), i).await;
                let appended = this.apply_selection(&group, i, key).await;
                if let Some(node) = appended {
                    if i < first_new + animate_count {
                        entering.push(node);
                    }
                }
            }

            if this.options.animate && !entering.is_empty() {
                let mut state = this.state.borrow_mut();
                let id = state.next_id();
                if let Some(record) = state.group_mut(&group) {
                    this.animate(
                        &group,
                        record,
                        id,
                        AnimationTarget::Live {
                            nodes: entering,
                            op: AnimationOp::Plain,
                        },
                        AnimationKey::Enter,
                        false,
                    );
                }
            }
            if first_new > 0 && this.rendered_len(&group) > first_new {
                if let Some(record) = this.state.borrow().group(&group) {
                    this.refresh_aliases(record, first_new - 1);
                }
            }
        }
        .boxed_local()
    }

    /// Applies one selector result at `index`. Returns the node when a new slot was appended.
    async fn apply_selection(
        self: &Rc<Self>,
        group: &GroupKey,
        index: usize,
        key: Option<String>,
    ) -> Option<H::Node> {
        let (current, len) = {
            let state = self.state.borrow();
            let record = state.group(group)?;
            (
                record.slots.get(index).map(|s| s.key.clone()),
                record.item_count,
            )
        };

        match current {
            Some(current) if current == key => None,
            Some(_) => {
                let Some(key) = key else {
                    self.clear_slot(group, index);
                    return None;
                };
                match self.bind_selected(group, index, len, &key).await {
                    Ok(node) => self.replace_slot(group, index, node, key),
                    Err(err) => {
                        lwarn!(error = %err, index, "bind failed; slot renders nothing");
                        self.clear_slot(group, index);
                    }
                }
                None
            }
            None => {
                let node = match &key {
                    Some(key) => match self.bind_selected(group, index, len, key).await {
                        Ok(node) => Some(node),
                        Err(err) => {
                            lwarn!(error = %err, index, "bind failed; slot renders nothing");
                            None
                        }
                    },
                    None => None,
                };
                let key = key.filter(|_| node.is_some());
                self.append_slot(group, index, node, key)
            }
        }
    }

    fn bind_selected(
        &self,
        group: &GroupKey,
        index: usize,
        len: usize,
        key: &str,
    ) -> Task<Result<H::Node, BindError>> {
        let aliases = Aliases::new(index, len, group.name());
        self.host.bind(key, index, group.name(), &aliases)
    }

    fn replace_slot(&self, group: &GroupKey, index: usize, node: H::Node, key: String) {
        let mut state = self.state.borrow_mut();
        let Some(record) = state.group_mut(group) else {
            self.host.dispose(&node);
            return;
        };
        if index >= record.slots.len() {
            self.host.dispose(&node);
            return;
        }
        match record.slots[index].node.take() {
            Some(old) => {
                self.host.replace(&record.item_container, &old, &node);
                self.host.dispose(&old);
            }
            None => {
                let before = record.slots[index + 1..]
                    .iter()
                    .find_map(|s| s.node.as_ref());
                self.host
                    .insert_before(&record.item_container, &node, before);
            }
        }
        record.slots[index] = Slot {
            node: Some(node),
            key: Some(key),
        };
    }

    fn append_slot(
        &self,
        group: &GroupKey,
        index: usize,
        node: Option<H::Node>,
        key: Option<String>,
    ) -> Option<H::Node> {
        let mut state = self.state.borrow_mut();
        let Some(record) = state.group_mut(group) else {
            if let Some(node) = &node {
                self.host.dispose(node);
            }
            return None;
        };
        while record.slots.len() < index {
            record.slots.push(Slot::empty());
        }
        if record.slots.len() > index {
            drop(state);
            match (node, key) {
                (Some(node), Some(key)) => self.replace_slot(group, index, node, key),
                _ => self.clear_slot(group, index),
            }
            return None;
        }
        if let Some(node) = &node {
            self.host.append(&record.item_container, std::slice::from_ref(node));
        }
        record.slots.push(Slot {
            node: node.clone(),
            key,
        });
        node
    }

    fn clear_slot(&self, group: &GroupKey, index: usize) {
        let mut state = self.state.borrow_mut();
        let Some(record) = state.group_mut(group) else {
            return;
        };
        let Some(slot) = record.slots.get_mut(index) else {
            return;
        };
        slot.key = None;
        if let Some(node) = slot.node.take() {
            self.host
                .remove(&record.item_container, std::slice::from_ref(&node));
            self.host.dispose(&node);
        }
    }

    fn groups_job(self: &Rc<Self>, index: usize, count: usize, gate: Option<Task<()>>) -> Task<()> {
        let header = self.state.borrow().templates.group_header.clone();
        let Some(header) = header else {
            return async move {
                if let Some(gate) = gate {
                    gate.await;
                }
            }
            .boxed_local();
        };

        let names: Vec<Option<String>> = (index..index + count)
            .map(|i| self.host.group_name(i))
            .collect();
        let binds: Vec<Task<Result<GroupNodes<H::Node>, BindError>>> = names
            .iter()
            .enumerate()
            .map(|(offset, name)| match name {
                Some(name) => self.host.bind_group(&header, index + offset, name),
                None => {
                    let err = BindError::Rejected(format!("group {} has no name", index + offset));
                    futures::future::ready(Err(err)).boxed_local()
                }
            })
            .collect();

        let this = Rc::clone(self);
        async move {
            let results = join_all(binds).await;
            if let Some(gate) = gate {
                gate.await;
            }
            let created = this.insert_groups(names, results);
            for (key, len) in created {
                if len > 0 {
                    this.create_items(&key, 0, len, 0);
                }
            }
        }
        .boxed_local()
    }

    /// Appends bound groups to the top-level container and registers their records.
    ///
    /// Returns the created groups with their item counts.
    fn insert_groups(
        &self,
        names: Vec<Option<String>>,
        results: Vec<Result<GroupNodes<H::Node>, BindError>>,
    ) -> Vec<(GroupKey, usize)> {
        let mut state = self.state.borrow_mut();
        if state.disposed {
            for nodes in results.iter().flatten() {
                self.host.dispose(&nodes.container);
            }
            return Vec::new();
        }

        let start = state.root.slots.len();
        let mut created = Vec::new();
        for (name, result) in names.into_iter().zip(results) {
            let position = state.root.slots.len();
            match (name, result) {
                (Some(name), Ok(nodes)) if !state.groups.contains(&name) => {
                    self.host.append(
                        &state.root.item_container,
                        std::slice::from_ref(&nodes.container),
                    );
                    state.root.slots.push(Slot {
                        node: Some(nodes.container.clone()),
                        key: Some(name.clone()),
                    });
                    let id = state.next_id();
                    let mut record = GroupRecord::new(
                        id,
                        Some(name.clone()),
                        position,
                        Some(nodes.container),
                        nodes.item_container,
                    );
                    record.item_count = self.context_len(Some(&name));
                    ldebug!(group = %name, index = position, items = record.item_count, "group created");
                    created.push((record.key(), record.item_count));
                    state.groups.insert(name, record);
                }
                (name, Ok(nodes)) => {
                    lwarn!(group = ?name, "duplicate group name; group not rendered");
                    self.host.dispose(&nodes.container);
                    state.root.slots.push(Slot::empty());
                }
                (name, Err(err)) => {
                    lwarn!(error = %err, group = ?name, "group bind failed");
                    state.root.slots.push(Slot::empty());
                }
            }
        }
        if start > 0 {
            self.refresh_aliases(&state.root, start - 1);
        }
        created
    }

    /// Removes up to `count` slots at `start`, clamped so the trailing slots go.
    pub(crate) fn remove_slots(
        self: &Rc<Self>,
        group: &GroupKey,
        start: usize,
        count: usize,
        leave: bool,
    ) {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        let grouped_root = group.is_root() && state.templates.group_header.is_some();
        let Some(record) = state.group_mut(group) else {
            return;
        };
        let len = record.slots.len();
        if len == 0 {
            lwarn!(group = ?group, "removal on a group with no rendered slots");
            return;
        }
        let count = count.min(len);
        let start = start.min(len - count);
        let removed: Vec<Slot<H::Node>> = record.slots.drain(start..start + count).collect();
        let nodes: Vec<H::Node> = removed.iter().filter_map(|s| s.node.clone()).collect();

        if leave && self.options.animate && !nodes.is_empty() {
            self.animate(
                group,
                record,
                id,
                AnimationTarget::Live {
                    nodes,
                    op: AnimationOp::Leave,
                },
                AnimationKey::Leave,
                false,
            );
        } else if !nodes.is_empty() {
            self.host.remove(&record.item_container, &nodes);
            for node in &nodes {
                self.host.dispose(node);
            }
        }
        if let Some(last) = record.slots.len().checked_sub(1) {
            self.refresh_aliases(record, last);
        }

        if grouped_root {
            for name in removed.into_iter().filter_map(|s| s.key) {
                if let Some(mut record) = state.groups.remove(&name) {
                    ldebug!(group = %name, "group removed");
                    self.teardown(&mut record);
                }
            }
            reindex_groups(&mut state);
        }
    }

    /// Disposes every slot of `group`. In grouped mode clearing the top level drops every group.
    fn clear_slots(&self, group: &GroupKey) {
        let mut state = self.state.borrow_mut();
        let grouped_root = group.is_root() && state.templates.group_header.is_some();
        let Some(record) = state.group_mut(group) else {
            return;
        };
        self.cancel_animations(record);
        let nodes: Vec<H::Node> = record.slots.drain(..).filter_map(|s| s.node).collect();
        if !nodes.is_empty() {
            self.host.remove(&record.item_container, &nodes);
            for node in &nodes {
                self.host.dispose(node);
            }
        }

        if grouped_root {
            for mut record in state.groups.drain() {
                self.teardown(&mut record);
            }
        }
    }

    /// Drops slots past `len` and returns the rendered length.
    fn trim_to(self: &Rc<Self>, group: &GroupKey, len: usize) -> usize {
        let rendered = self.rendered_len(group);
        if rendered > len {
            self.remove_slots(group, len, rendered - len, false);
        }
        self.rendered_len(group)
    }

    fn set_item_count(&self, group: &GroupKey, len: usize) -> bool {
        match self.state.borrow_mut().group_mut(group) {
            Some(record) => {
                record.item_count = len;
                true
            }
            None => false,
        }
    }

    /// Completion of the most recently queued render of `group`.
    pub(crate) fn last_render(&self, group: &GroupKey) -> Pending<()> {
        self.state
            .borrow()
            .group(group)
            .and_then(|r| r.add_queue.last())
            .unwrap_or_else(ready)
    }

    fn rendered_len(&self, group: &GroupKey) -> usize {
        self.state
            .borrow()
            .group(group)
            .map_or(0, |r| r.slots.len())
    }

    fn refresh_range(&self, group: &GroupKey, start: usize, end: usize) {
        let state = self.state.borrow();
        let Some(record) = state.group(group) else {
            return;
        };
        for position in start..end.min(record.slots.len()) {
            self.refresh_aliases(record, position);
        }
    }

    /// Pushes freshly derived aliases into the slot at `position`.
    pub(crate) fn refresh_aliases(&self, record: &GroupRecord<H::Node>, position: usize) {
        if let Some(node) = record.slots.get(position).and_then(|s| s.node.as_ref()) {
            let aliases = Aliases::new(position, record.item_count, record.name.as_deref());
            self.host.update_aliases(node, &aliases);
        }
    }
}

fn reindex_groups<N: Clone>(state: &mut State<N>) {
    let names: Vec<(usize, String)> = state
        .root
        .slots
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.key.clone().map(|k| (i, k)))
        .collect();
    for (index, name) in names {
        if let Some(record) = state.groups.get_mut(&name) {
            record.index = index;
        }
    }
}
