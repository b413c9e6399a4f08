use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::{AnimationKey, Aliases, BindError};

/// An asynchronous host operation.
pub type Task<T> = LocalBoxFuture<'static, T>;

/// Maps `(group, index)` to the template key to render, or `None` to render nothing.
pub type TemplateSelector = Rc<dyn Fn(Option<&str>, usize) -> Task<Option<String>>>;

/// The nodes produced by binding a group header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupNodes<N> {
    /// The outer group node (header + item container), appended to the listview container.
    pub container: N,
    /// The node that receives the group's item slots.
    pub item_container: N,
}

/// A deep copy of an item container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClonedContainer<N> {
    pub container: N,
    /// The clone's children, in the same order as the original's.
    pub children: Vec<N>,
}

/// Everything the engine needs from the host application framework.
///
/// The engine holds no UI objects itself: it tracks one `Node` per item slot and asks the host to
/// bind, move, animate and dispose them. Methods returning [`Task`] may suspend for arbitrarily
/// long; the engine never imposes timeouts.
pub trait Host: 'static {
    type Node: Clone + 'static;

    // Observed collection (read-only).

    /// Length of the items sequence of `group` (or of the top-level sequence for `None`).
    ///
    /// Returns `None` when the bound context is not an array.
    fn len(&self, group: Option<&str>) -> Option<usize>;

    /// Name of the group at `index` of the top-level sequence (grouped mode only).
    fn group_name(&self, index: usize) -> Option<String>;

    // Binder.

    fn has_template(&self, name: &str) -> bool;

    /// Looks up a template selector callback by name.
    fn template_selector(&self, name: &str) -> Option<TemplateSelector>;

    /// Binds `template` for the item at `index`.
    fn bind(
        &self,
        template: &str,
        index: usize,
        group: Option<&str>,
        aliases: &Aliases,
    ) -> Task<Result<Self::Node, BindError>>;

    /// Binds the header template for the group at `index`.
    fn bind_group(
        &self,
        header_template: &str,
        index: usize,
        name: &str,
    ) -> Task<Result<GroupNodes<Self::Node>, BindError>>;

    /// Pushes refreshed alias values into an already bound node.
    fn update_aliases(&self, node: &Self::Node, aliases: &Aliases);

    /// Releases the bound control behind `node`.
    fn dispose(&self, node: &Self::Node);

    // Surface.

    fn append(&self, container: &Self::Node, nodes: &[Self::Node]);

    /// Inserts `node` before `before`, or at the end when `before` is `None`.
    fn insert_before(&self, container: &Self::Node, node: &Self::Node, before: Option<&Self::Node>);

    fn remove(&self, container: &Self::Node, nodes: &[Self::Node]);

    fn replace(&self, container: &Self::Node, old: &Self::Node, new: &Self::Node);

    fn clone_container(&self, container: &Self::Node) -> ClonedContainer<Self::Node>;

    /// Puts `incoming` in place of `outgoing` in the document.
    fn swap(&self, outgoing: &Self::Node, incoming: &Self::Node);

    // Animator.

    /// Creates an animation of `nodes`.
    ///
    /// The animation captures its starting state when created; it runs while the returned future is
    /// polled and stops when the future is dropped.
    fn animate(&self, nodes: &[Self::Node], key: AnimationKey) -> Task<()>;
}
