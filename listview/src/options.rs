use crate::{ConfigError, LoadingMode, Orientation};

/// The raw, string-typed options a listview is declared with.
///
/// Hosts typically deserialize this from markup attributes or a JSON blob (with the `serde`
/// feature). Use [`ListviewOptions::from_config`] to turn it into typed options.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct ListviewConfig {
    pub orientation: Option<String>,
    pub animate: bool,
    /// A template name, or the name of a template selector callback.
    pub item_template: Option<String>,
    /// Enables grouping when set.
    pub group_header_template: Option<String>,
    pub loading: Option<String>,
    pub on_items_requested: Option<String>,
    pub on_refresh: Option<String>,
    pub infinite_progress: bool,
}

impl Default for ListviewConfig {
    fn default() -> Self {
        Self {
            orientation: None,
            animate: false,
            item_template: None,
            group_header_template: None,
            loading: None,
            on_items_requested: None,
            on_refresh: None,
            infinite_progress: true,
        }
    }
}

/// Typed listview options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListviewOptions {
    pub orientation: Orientation,
    pub animate: bool,
    pub item_template: Option<String>,
    pub group_header_template: Option<String>,
    pub loading: LoadingMode,
    pub on_items_requested: Option<String>,
    pub on_refresh: Option<String>,
    /// Whether to show a waiting indicator while an infinite-load request is pending.
    pub infinite_progress: bool,
}

impl ListviewOptions {
    pub fn new(item_template: impl Into<String>) -> Self {
        Self {
            item_template: Some(item_template.into()),
            infinite_progress: true,
            ..Self::default()
        }
    }

    /// Parses a raw config, replacing invalid values by their defaults.
    ///
    /// Every problem found is logged as a warning and returned.
    pub fn from_config(config: &ListviewConfig) -> (Self, Vec<ConfigError>) {
        let mut errors = Vec::new();

        let orientation = match config.orientation.as_deref() {
            None | Some("vertical") => Orientation::Vertical,
            Some("horizontal") => Orientation::Horizontal,
            Some(other) => {
                errors.push(ConfigError::InvalidOrientation(other.to_owned()));
                Orientation::Vertical
            }
        };

        let mut loading = match config.loading.as_deref() {
            None | Some("") | Some("none") => LoadingMode::None,
            Some("infinite") => LoadingMode::Infinite,
            Some("incremental") => LoadingMode::Incremental,
            Some(other) => {
                errors.push(ConfigError::InvalidLoading(other.to_owned()));
                LoadingMode::None
            }
        };
        if loading != LoadingMode::None && config.on_items_requested.is_none() {
            errors.push(ConfigError::MissingCallback { option: "loading" });
            loading = LoadingMode::None;
        }

        // Presence is checked when the listview resolves its templates.
        let item_template = config.item_template.clone().filter(|t| !t.is_empty());

        for err in &errors {
            lwarn!(error = %err, "ListviewOptions::from_config");
        }

        let options = Self {
            orientation,
            animate: config.animate,
            item_template,
            group_header_template: config
                .group_header_template
                .clone()
                .filter(|t| !t.is_empty()),
            loading,
            on_items_requested: config.on_items_requested.clone(),
            on_refresh: config.on_refresh.clone(),
            infinite_progress: config.infinite_progress,
        };
        (options, errors)
    }

    pub fn is_grouped(&self) -> bool {
        self.group_header_template.is_some()
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_animate(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    pub fn with_group_header_template(mut self, template: impl Into<String>) -> Self {
        self.group_header_template = Some(template.into());
        self
    }

    pub fn with_loading(mut self, loading: LoadingMode, on_items_requested: impl Into<String>) -> Self {
        self.loading = loading;
        self.on_items_requested = Some(on_items_requested.into());
        self
    }

    pub fn with_refresh(mut self, on_refresh: impl Into<String>) -> Self {
        self.on_refresh = Some(on_refresh.into());
        self
    }

    pub fn with_infinite_progress(mut self, infinite_progress: bool) -> Self {
        self.infinite_progress = infinite_progress;
        self
    }
}
