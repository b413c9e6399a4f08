/// Contextual values bound alongside each item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Aliases {
    pub index: usize,
    pub even: bool,
    pub odd: bool,
    pub first: bool,
    pub last: bool,
    /// The owning group's name, when grouping is enabled.
    pub group: Option<String>,
}

/// A single alias value, for hosts that keep string-keyed resource maps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AliasValue {
    Index(usize),
    Flag(bool),
    Group(String),
}

impl Aliases {
    /// Derives the aliases of the item at `index` in a collection of `len` items.
    pub fn new(index: usize, len: usize, group: Option<&str>) -> Self {
        let even = index % 2 == 0;
        Self {
            index,
            even,
            odd: !even,
            first: index == 0,
            last: index + 1 == len,
            group: group.map(str::to_owned),
        }
    }

    /// Resource names and values, in a stable order.
    pub fn entries(&self) -> Vec<(&'static str, AliasValue)> {
        let mut out = vec![
            ("index", AliasValue::Index(self.index)),
            ("even", AliasValue::Flag(self.even)),
            ("odd", AliasValue::Flag(self.odd)),
            ("first", AliasValue::Flag(self.first)),
            ("last", AliasValue::Flag(self.last)),
        ];
        if let Some(group) = &self.group {
            out.push(("group", AliasValue::Group(group.clone())));
        }
        out
    }
}
