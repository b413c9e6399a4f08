use std::collections::VecDeque;

use core::future::Future;

use futures::future::{FutureExt, Shared, join_all};
use futures::task::{LocalSpawn, LocalSpawnExt};

use crate::Task;

/// A spawned operation that any number of continuations can await.
pub type Pending<T> = Shared<Task<T>>;

/// Spawns `fut` on `spawner` and returns a shareable handle to its completion.
///
/// If the executor refuses the task it is still returned, so awaiting it drives it inline.
pub(crate) fn spawn_shared<T: Clone + 'static>(
    spawner: &dyn LocalSpawn,
    fut: impl Future<Output = T> + 'static,
) -> Pending<T> {
    let shared = fut.boxed_local().shared();
    if let Err(err) = spawner.spawn_local(shared.clone().map(|_| ())) {
        lwarn!(error = %err, "listview task could not be spawned");
    }
    shared
}

pub(crate) fn ready() -> Pending<()> {
    futures::future::ready(()).boxed_local().shared()
}

/// Per-group FIFO of in-flight operations.
///
/// Entries remove themselves through [`TaskQueue::complete`] once their work is done.
#[derive(Default)]
pub(crate) struct TaskQueue {
    entries: VecDeque<(u64, Pending<()>)>,
}

impl TaskQueue {
    pub fn push(&mut self, id: u64, pending: Pending<()>) {
        self.entries.push_back((id, pending));
    }

    pub fn last(&self) -> Option<Pending<()>> {
        self.entries.back().map(|(_, p)| p.clone())
    }

    pub fn complete(&mut self, id: u64) {
        self.entries.retain(|(entry, _)| *entry != id);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn snapshot(&self) -> Vec<Pending<()>> {
        self.entries.iter().map(|(_, p)| p.clone()).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Resolves once every entry of the snapshot has completed.
pub(crate) async fn drain(entries: Vec<Pending<()>>) {
    if !entries.is_empty() {
        join_all(entries).await;
    }
}
