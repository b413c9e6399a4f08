use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{FutureExt, join_all};
use futures::task::LocalSpawn;

use crate::group::{GroupKey, GroupRecord, GroupRegistry};
use crate::queue::{Pending, ready};
use crate::template::Templates;
use crate::{AnimationOp, ChangeRecord, ConfigError, Host, ItemTemplate, ListviewOptions, Task};

pub(crate) struct State<N> {
    pub root: GroupRecord<N>,
    pub groups: GroupRegistry<N>,
    pub templates: Templates,
    pub next_id: u64,
    pub disposed: bool,
}

impl<N> State<N> {
    pub fn next_id(&mut self) -> u64 {
        self.next_id = self.next_id.wrapping_add(1);
        self.next_id
    }

    /// The current record named `name`, whichever record that is.
    pub fn named(&self, name: Option<&str>) -> Option<&GroupRecord<N>> {
        match name {
            None => Some(&self.root),
            Some(name) => self.groups.get(name),
        }
    }

    pub fn named_mut(&mut self, name: Option<&str>) -> Option<&mut GroupRecord<N>> {
        match name {
            None => Some(&mut self.root),
            Some(name) => self.groups.get_mut(name),
        }
    }

    /// The record `key` was taken from, if it is still registered.
    pub fn group(&self, key: &GroupKey) -> Option<&GroupRecord<N>> {
        self.named(key.name()).filter(|r| r.id == key.id)
    }

    pub fn group_mut(&mut self, key: &GroupKey) -> Option<&mut GroupRecord<N>> {
        self.named_mut(key.name()).filter(|r| r.id == key.id)
    }

    pub fn key(&self, name: Option<&str>) -> Option<GroupKey> {
        self.named(name).map(GroupRecord::key)
    }
}

pub(crate) struct Inner<H: Host> {
    pub host: H,
    pub spawner: Box<dyn LocalSpawn>,
    pub options: ListviewOptions,
    pub state: RefCell<State<H::Node>>,
}

impl<H: Host> Inner<H> {
    pub(crate) fn is_grouped(&self) -> bool {
        self.state.borrow().templates.group_header.is_some()
    }

    /// Current length of a group's context, treating a non-array context as empty.
    pub(crate) fn context_len(&self, group: Option<&str>) -> usize {
        match self.host.len(group) {
            Some(len) => len,
            None => {
                let err = ConfigError::ContextNotArray {
                    group: group.map(str::to_owned),
                };
                lwarn!(error = %err, "context_len");
                0
            }
        }
    }
}

/// A headless listview: keeps one rendered slot per model item of an externally mutated
/// collection, optionally grouped and animated.
///
/// The host delivers change records through [`Listview::apply`]. Each call performs its
/// bookkeeping synchronously and spawns the asynchronous rendering/animation work on the spawner
/// given to [`Listview::new`]. Host callbacks must not call back into the listview.
pub struct Listview<H: Host> {
    inner: Rc<Inner<H>>,
}

impl<H: Host> Clone for Listview<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<H: Host> Listview<H> {
    /// Creates a listview rendering into `item_container` and performs the initial render.
    ///
    /// Configuration problems are logged and returned; the affected features are skipped.
    pub fn new(
        host: H,
        options: ListviewOptions,
        item_container: H::Node,
        spawner: impl LocalSpawn + 'static,
    ) -> (Self, Vec<ConfigError>) {
        let mut errors = Vec::new();
        let templates = Templates::resolve(&host, &options, &mut errors);
        for err in &errors {
            lwarn!(error = %err, "Listview::new");
        }
        ldebug!(
            animate = options.animate,
            grouped = templates.group_header.is_some(),
            selector = templates.uses_selector(),
            "Listview::new"
        );

        let inner = Rc::new(Inner {
            host,
            spawner: Box::new(spawner),
            options,
            state: RefCell::new(State {
                root: GroupRecord::new(0, None, 0, None, item_container),
                groups: GroupRegistry::default(),
                templates,
                next_id: 0,
                disposed: false,
            }),
        });

        let len = inner.context_len(None);
        let root = {
            let mut state = inner.state.borrow_mut();
            state.root.item_count = len;
            state.root.key()
        };
        if len > 0 {
            inner.create_items(&root, 0, len, 0);
        }
        (Self { inner }, errors)
    }

    pub fn options(&self) -> &ListviewOptions {
        &self.inner.options
    }

    pub fn host(&self) -> &H {
        &self.inner.host
    }

    /// Resolved item template, if any.
    pub fn item_template(&self) -> Option<ItemTemplate> {
        self.inner.state.borrow().templates.item.clone()
    }

    /// Applies a batch of change records observed on `group` (`None` for the top level).
    ///
    /// Only the first record's kind is dispatched; it must describe the cumulative effect of the
    /// batch.
    pub fn apply(&self, group: Option<&str>, records: &[ChangeRecord]) {
        self.inner.dispatch(group, records);
    }

    /// Resynchronizes `count` slots starting at `index` (defaulting to the whole group) with the
    /// current collection.
    ///
    /// The collection length is read now; changes applied afterwards are rendered on top of it.
    pub fn render(
        &self,
        index: Option<usize>,
        count: Option<usize>,
        group: Option<&str>,
    ) -> Pending<()> {
        if self.inner.state.borrow().disposed {
            return ready();
        }
        let Some(key) = self.inner.state.borrow().key(group) else {
            lwarn!(group = ?group, "render: unknown group");
            return ready();
        };
        let len = self.inner.context_len(group);
        self.inner.render_range(&key, index.unwrap_or(0), count, len);
        self.inner.last_render(&key)
    }

    /// Throws away every slot of `group` and renders it again from the current collection.
    ///
    /// Like [`Listview::render`], the collection length is read now.
    pub fn rerender(&self, group: Option<&str>) -> Pending<()> {
        if self.inner.state.borrow().disposed {
            return ready();
        }
        let Some(key) = self.inner.state.borrow().key(group) else {
            lwarn!(group = ?group, "rerender: unknown group");
            return ready();
        };
        let len = self.inner.context_len(group);
        self.inner.rerender(&key, len);
        self.inner.last_render(&key)
    }

    /// Teardown hook for the bound control of group `name`.
    pub fn dispose_group(&self, name: &str) {
        let record = self.inner.state.borrow_mut().groups.remove(name);
        if let Some(mut record) = record {
            ldebug!(group = name, "group disposed");
            self.inner.teardown(&mut record);
        }
    }

    /// Disposes every slot and cancels all pending work. Later calls are ignored.
    pub fn dispose(&self) {
        let (mut root, groups) = {
            let mut state = self.inner.state.borrow_mut();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.templates = Templates::default();
            let container = state.root.item_container.clone();
            let id = state.next_id();
            let root = std::mem::replace(
                &mut state.root,
                GroupRecord::new(id, None, 0, None, container),
            );
            (root, state.groups.drain())
        };
        for mut record in groups {
            self.inner.teardown(&mut record);
        }
        self.inner.teardown(&mut root);
        ldebug!("Listview::dispose");
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.state.borrow().disposed
    }

    /// Resolves once no render, removal or animation is pending in any group.
    pub fn settled(&self) -> Task<()> {
        let inner = Rc::clone(&self.inner);
        async move {
            loop {
                let pending = inner.all_pending();
                if pending.is_empty() {
                    break;
                }
                join_all(pending).await;
            }
        }
        .boxed_local()
    }

    /// Number of model items `group` currently represents.
    pub fn item_count(&self, group: Option<&str>) -> Option<usize> {
        self.inner.state.borrow().named(group).map(|r| r.item_count)
    }

    /// Number of rendered slots in `group`.
    pub fn rendered_count(&self, group: Option<&str>) -> Option<usize> {
        self.inner.state.borrow().named(group).map(|r| r.slots.len())
    }

    /// Rendered nodes of `group`, in index order. Empty slots yield `None`.
    pub fn slots(&self, group: Option<&str>) -> Vec<Option<H::Node>> {
        self.inner
            .state
            .borrow()
            .named(group)
            .map(|r| r.slots.iter().map(|s| s.node.clone()).collect())
            .unwrap_or_default()
    }

    /// Tags of the queued animations of `group`, head first.
    pub fn pending_animations(&self, group: Option<&str>) -> Vec<AnimationOp> {
        self.inner
            .state
            .borrow()
            .named(group)
            .map(|r| r.animations.ops())
            .unwrap_or_default()
    }

    /// Number of renders still queued for `group`.
    pub fn pending_renders(&self, group: Option<&str>) -> usize {
        self.inner
            .state
            .borrow()
            .named(group)
            .map_or(0, |r| r.add_queue.len())
    }

    /// `false` while a clone of the item container is shown in its place.
    pub fn is_live_attached(&self, group: Option<&str>) -> bool {
        self.inner
            .state
            .borrow()
            .named(group)
            .is_none_or(|r| r.is_live_attached())
    }

    /// Outer node of group `name`, as produced by the group header bind.
    pub fn group_container(&self, name: &str) -> Option<H::Node> {
        self.inner
            .state
            .borrow()
            .groups
            .get(name)
            .and_then(|r| r.container.clone())
    }

    /// Names of the registered groups, in group order.
    pub fn groups(&self) -> Vec<String> {
        self.inner.state.borrow().groups.names()
    }
}

impl<H: Host> Inner<H> {
    fn all_pending(&self) -> Vec<Task<()>> {
        let state = self.state.borrow();
        let mut out: Vec<Task<()>> = Vec::new();
        for record in std::iter::once(&state.root).chain(state.groups.values()) {
            out.extend(record.structural_work().into_iter().map(|p| p.boxed_local()));
            out.extend(
                record
                    .animations
                    .snapshot()
                    .into_iter()
                    .map(|p| p.map(|_| ()).boxed_local()),
            );
        }
        out
    }

    /// Cancels a record's animations and disposes its slots.
    pub(crate) fn teardown(&self, record: &mut GroupRecord<H::Node>) {
        self.cancel_animations(record);
        record.add_queue.clear();
        record.remove_queue.clear();
        for slot in record.slots.drain(..) {
            if let Some(node) = slot.node {
                self.host.dispose(&node);
            }
        }
        record.item_count = 0;
    }
}
