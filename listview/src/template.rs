use core::fmt;

use crate::{ConfigError, Host, ListviewOptions, TemplateSelector};

/// How items are rendered, decided once when the listview is created.
#[derive(Clone)]
pub enum ItemTemplate {
    Named(String),
    Selector(TemplateSelector),
}

impl fmt::Debug for ItemTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Selector(_) => f.write_str("Selector(..)"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Templates {
    pub item: Option<ItemTemplate>,
    pub group_header: Option<String>,
}

impl Templates {
    /// A selector callback with the configured name wins over a template of the same name.
    pub fn resolve<H: Host>(
        host: &H,
        options: &ListviewOptions,
        errors: &mut Vec<ConfigError>,
    ) -> Self {
        let item = match options.item_template.as_deref() {
            None => {
                errors.push(ConfigError::MissingItemTemplate);
                None
            }
            Some(name) => {
                if let Some(selector) = host.template_selector(name) {
                    Some(ItemTemplate::Selector(selector))
                } else if host.has_template(name) {
                    Some(ItemTemplate::Named(name.to_owned()))
                } else {
                    errors.push(ConfigError::UnknownTemplate(name.to_owned()));
                    None
                }
            }
        };

        let group_header = options.group_header_template.as_deref().and_then(|name| {
            if host.has_template(name) {
                Some(name.to_owned())
            } else {
                errors.push(ConfigError::UnknownTemplate(name.to_owned()));
                None
            }
        });

        Self { item, group_header }
    }

    pub fn uses_selector(&self) -> bool {
        matches!(self.item, Some(ItemTemplate::Selector(_)))
    }

    pub fn selector(&self) -> Option<TemplateSelector> {
        match &self.item {
            Some(ItemTemplate::Selector(selector)) => Some(selector.clone()),
            _ => None,
        }
    }

    pub fn named(&self) -> Option<&str> {
        match &self.item {
            Some(ItemTemplate::Named(name)) => Some(name),
            _ => None,
        }
    }
}
