//! A headless list-to-view synchronization engine.
//!
//! A [`Listview`] keeps one rendered *slot* per item of an externally owned, externally mutated
//! collection. The host reports mutations as [`ChangeRecord`]s; the engine turns them into binds,
//! container edits and enter/leave animations, all delegated to a [`Host`] implementation.
//!
//! Key properties:
//! - Renders of a group are queued and inserted in order, even when binds resolve out of order.
//! - Removals and re-renders wait for every earlier render of their group.
//! - Animations of a group run one after another and can be cancelled; a removal that must animate
//!   while the list keeps changing runs on a detached clone of the item container.
//! - Grouping, template selectors and failed binds never break the slot/index correspondence.
//!
//! The engine is single-threaded and cooperative: asynchronous work runs on the
//! [`futures::task::LocalSpawn`] given to [`Listview::new`].
//!
//! For gesture-driven data loading (pull-to-refresh, infinite scrolling), see the
//! `listview-gesture` crate.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod alias;
mod animation;
mod dispatch;
mod error;
mod group;
mod host;
mod listview;
mod options;
mod queue;
mod render;
mod template;
mod types;


pub use alias::{AliasValue, Aliases};
pub use error::{BindError, ConfigError};
pub use host::{ClonedContainer, GroupNodes, Host, Task, TemplateSelector};
pub use listview::Listview;
pub use options::{ListviewConfig, ListviewOptions};
pub use queue::Pending;
pub use template::ItemTemplate;
pub use types::{
    AnimationKey, AnimationOp, AnimationOutcome, ChangeKind, ChangeRecord, LoadingMode,
    Orientation,
};
