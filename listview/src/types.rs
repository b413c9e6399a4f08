/// The operation an observed collection reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ChangeKind {
    Append,
    RemoveLast,
    RemoveFirst,
    Prepend,
    Splice,
}

/// One change record delivered by the observed collection.
///
/// `added_count = None` on a [`ChangeKind::Splice`] means the whole collection was replaced and only
/// `new_length` is meaningful.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChangeRecord {
    pub kind: ChangeKind,
    pub index: usize,
    pub added_count: Option<usize>,
    pub removed_count: usize,
    /// Length of the collection after the mutation.
    pub new_length: usize,
}

impl ChangeRecord {
    pub fn append(index: usize, added: usize) -> Self {
        Self {
            kind: ChangeKind::Append,
            index,
            added_count: Some(added),
            removed_count: 0,
            new_length: index + added,
        }
    }

    pub fn remove_last(new_length: usize) -> Self {
        Self {
            kind: ChangeKind::RemoveLast,
            index: new_length,
            added_count: Some(0),
            removed_count: 1,
            new_length,
        }
    }

    pub fn remove_first(new_length: usize) -> Self {
        Self {
            kind: ChangeKind::RemoveFirst,
            index: 0,
            added_count: Some(0),
            removed_count: 1,
            new_length,
        }
    }

    pub fn prepend(added: usize, new_length: usize) -> Self {
        Self {
            kind: ChangeKind::Prepend,
            index: 0,
            added_count: Some(added),
            removed_count: 0,
            new_length,
        }
    }

    pub fn splice(index: usize, added: usize, removed: usize, new_length: usize) -> Self {
        Self {
            kind: ChangeKind::Splice,
            index,
            added_count: Some(added),
            removed_count: removed,
            new_length,
        }
    }

    /// A wholesale replacement of the collection.
    pub fn replace(new_length: usize) -> Self {
        Self {
            kind: ChangeKind::Splice,
            index: 0,
            added_count: None,
            removed_count: 0,
            new_length,
        }
    }
}

/// The animation the host animator should run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnimationKey {
    Enter,
    Leave,
}

/// Tag of an animation queue entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationOp {
    /// A plain enter animation on live nodes.
    Plain,
    /// A leave animation on live nodes that are removed once it resolves.
    Leave,
    /// A leave animation running on a detached clone of the item container.
    Clone,
}

/// How a queued animation resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationOutcome {
    Finished,
    Cancelled,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// Which "more data" strategy a listview uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LoadingMode {
    #[default]
    None,
    /// Request more items when the scroll position nears the end.
    Infinite,
    /// Request more items with a drag past the trailing edge.
    Incremental,
}
