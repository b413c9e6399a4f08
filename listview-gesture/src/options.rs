use core::fmt;

use futures::future::LocalBoxFuture;
use listview::{ConfigError, ListviewOptions, LoadingMode, Orientation};

use crate::{Easing, LoadError};

/// A "request more items" or "refresh" callback.
///
/// For item requests, resolving to `Ok(false)` means the collection is exhausted: the infinite
/// scroll listener is not re-attached. The value is ignored for refreshes.
pub type LoadCallback = Box<dyn FnMut() -> LocalBoxFuture<'static, Result<bool, LoadError>>>;

pub struct LoaderOptions {
    pub orientation: Orientation,
    pub loading: LoadingMode,
    pub on_items_requested: Option<LoadCallback>,
    pub on_refresh: Option<LoadCallback>,
    /// Show a waiting indicator while an infinite-scroll request is outstanding.
    pub infinite_progress: bool,
    /// Scrolled fraction past which infinite scrolling requests more items.
    pub infinite_threshold: f32,
    pub settle_duration_ms: u64,
    pub easing: Easing,
}

impl fmt::Debug for LoaderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderOptions")
            .field("orientation", &self.orientation)
            .field("loading", &self.loading)
            .field("on_items_requested", &self.on_items_requested.is_some())
            .field("on_refresh", &self.on_refresh.is_some())
            .field("infinite_progress", &self.infinite_progress)
            .field("infinite_threshold", &self.infinite_threshold)
            .field("settle_duration_ms", &self.settle_duration_ms)
            .field("easing", &self.easing)
            .finish()
    }
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            loading: LoadingMode::None,
            on_items_requested: None,
            on_refresh: None,
            infinite_progress: true,
            infinite_threshold: 0.8,
            settle_duration_ms: 250,
            easing: Easing::default(),
        }
    }
}

impl LoaderOptions {
    /// Resolves the callback names of `options` through `lookup`.
    ///
    /// A strategy whose callback is missing or unknown is disabled; the problem is logged and
    /// returned.
    pub fn from_options(
        options: &ListviewOptions,
        mut lookup: impl FnMut(&str) -> Option<LoadCallback>,
    ) -> (Self, Vec<ConfigError>) {
        let mut errors = Vec::new();

        let mut loading = options.loading;
        let mut on_items_requested = None;
        if loading != LoadingMode::None {
            match options.on_items_requested.as_deref() {
                None => errors.push(ConfigError::MissingCallback { option: "loading" }),
                Some(name) => match lookup(name) {
                    Some(cb) => on_items_requested = Some(cb),
                    None => errors.push(ConfigError::UnknownCallback(name.to_owned())),
                },
            }
            if on_items_requested.is_none() {
                loading = LoadingMode::None;
            }
        }

        let on_refresh = options.on_refresh.as_deref().and_then(|name| {
            let cb = lookup(name);
            if cb.is_none() {
                errors.push(ConfigError::UnknownCallback(name.to_owned()));
            }
            cb
        });

        for err in &errors {
            gwarn!(error = %err, "LoaderOptions::from_options");
        }

        let options = Self {
            orientation: options.orientation,
            loading,
            on_items_requested,
            on_refresh,
            infinite_progress: options.infinite_progress,
            ..Self::default()
        };
        (options, errors)
    }

    pub fn can_refresh(&self) -> bool {
        self.on_refresh.is_some()
    }

    pub fn can_load(&self, mode: LoadingMode) -> bool {
        self.loading == mode && self.on_items_requested.is_some()
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_loading(mut self, loading: LoadingMode, on_items_requested: LoadCallback) -> Self {
        self.loading = loading;
        self.on_items_requested = Some(on_items_requested);
        self
    }

    pub fn with_refresh(mut self, on_refresh: LoadCallback) -> Self {
        self.on_refresh = Some(on_refresh);
        self
    }

    pub fn with_infinite_progress(mut self, infinite_progress: bool) -> Self {
        self.infinite_progress = infinite_progress;
        self
    }

    pub fn with_infinite_threshold(mut self, ratio: f32) -> Self {
        self.infinite_threshold = ratio.clamp(0.0, 1.0);
        self
    }

    pub fn with_settle(mut self, duration_ms: u64, easing: Easing) -> Self {
        self.settle_duration_ms = duration_ms;
        self.easing = easing;
        self
    }
}
