// Example: a printing host driven by a LocalPool.
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::executor::LocalPool;
use futures::future::{FutureExt, ready};
use listview::{
    Aliases, AnimationKey, BindError, ChangeRecord, ClonedContainer, GroupNodes, Host, Listview,
    ListviewOptions, Task, TemplateSelector,
};

#[derive(Clone, Default)]
struct PrintHost {
    items: Rc<RefCell<Vec<&'static str>>>,
    next: Rc<Cell<u32>>,
}

impl PrintHost {
    fn node(&self) -> u32 {
        self.next.set(self.next.get() + 1);
        self.next.get()
    }
}

impl Host for PrintHost {
    type Node = u32;

    fn len(&self, _group: Option<&str>) -> Option<usize> {
        Some(self.items.borrow().len())
    }

    fn group_name(&self, _index: usize) -> Option<String> {
        None
    }

    fn has_template(&self, name: &str) -> bool {
        name == "row"
    }

    fn template_selector(&self, _name: &str) -> Option<TemplateSelector> {
        None
    }

    fn bind(
        &self,
        template: &str,
        index: usize,
        _group: Option<&str>,
        aliases: &Aliases,
    ) -> Task<Result<u32, BindError>> {
        let node = self.node();
        let item = self.items.borrow().get(index).copied().unwrap_or("?");
        println!("bind {template}#{node} index={index} item={item} last={}", aliases.last);
        ready(Ok(node)).boxed_local()
    }

    fn bind_group(
        &self,
        header_template: &str,
        _index: usize,
        _name: &str,
    ) -> Task<Result<GroupNodes<u32>, BindError>> {
        ready(Err(BindError::TemplateNotFound(header_template.to_owned()))).boxed_local()
    }

    fn update_aliases(&self, node: &u32, aliases: &Aliases) {
        println!("aliases #{node} index={} last={}", aliases.index, aliases.last);
    }

    fn dispose(&self, node: &u32) {
        println!("dispose #{node}");
    }

    fn append(&self, container: &u32, nodes: &[u32]) {
        println!("append {nodes:?} to #{container}");
    }

    fn insert_before(&self, container: &u32, node: &u32, before: Option<&u32>) {
        println!("insert #{node} before {before:?} in #{container}");
    }

    fn remove(&self, container: &u32, nodes: &[u32]) {
        println!("remove {nodes:?} from #{container}");
    }

    fn replace(&self, container: &u32, old: &u32, new: &u32) {
        println!("replace #{old} with #{new} in #{container}");
    }

    fn clone_container(&self, container: &u32) -> ClonedContainer<u32> {
        let children = (0..self.items.borrow().len() + 1).map(|_| self.node()).collect();
        let clone = self.node();
        println!("clone #{container} as #{clone}");
        ClonedContainer {
            container: clone,
            children,
        }
    }

    fn swap(&self, outgoing: &u32, incoming: &u32) {
        println!("swap #{outgoing} -> #{incoming}");
    }

    fn animate(&self, nodes: &[u32], key: AnimationKey) -> Task<()> {
        println!("animate {key:?} {nodes:?}");
        ready(()).boxed_local()
    }
}

fn main() {
    let mut pool = LocalPool::new();
    let host = PrintHost::default();
    host.items.borrow_mut().extend(["a", "b"]);

    let (list, errors) = Listview::new(
        host.clone(),
        ListviewOptions::new("row").with_animate(true),
        0,
        pool.spawner(),
    );
    assert!(errors.is_empty());
    pool.run_until_stalled();

    host.items.borrow_mut().push("c");
    list.apply(None, &[ChangeRecord::append(2, 1)]);

    host.items.borrow_mut().remove(0);
    list.apply(None, &[ChangeRecord::remove_first(2)]);

    pool.run_until(list.settled());
    println!(
        "items={} slots={:?}",
        list.item_count(None).unwrap_or(0),
        list.slots(None)
    );
}
