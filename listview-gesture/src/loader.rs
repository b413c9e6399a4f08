use core::task::{Context, Poll};

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use futures::task::noop_waker_ref;
use listview::LoadingMode;

use crate::{GestureKind, LoadError, LoaderOptions, Point, ScrollMetrics, TouchState, Tween, Viewport};

type Request = LocalBoxFuture<'static, Result<bool, LoadError>>;

#[derive(Clone, Copy, Debug)]
struct Gesture {
    kind: GestureKind,
    anchor: f32,
    ready: bool,
}

/// Touch- and scroll-driven data loading on top of a [`Viewport`].
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `on_touch_start` / `on_track` / `on_release` when touch events occur
/// - `on_scroll` when the scroll container scrolls
/// - `tick(now_ms)` each frame (settle tweens, debounced scroll checks, callback completion)
///
/// Outstanding callbacks are polled from `tick`; they must not rely on being woken.
pub struct DataLoader<V> {
    viewport: V,
    options: LoaderOptions,
    state: TouchState,
    gesture: Option<Gesture>,
    offset: f32,
    tween: Option<Tween>,
    gesture_request: Option<Request>,
    infinite_request: Option<Request>,
    listening: bool,
    progress_shown: bool,
    pending_scroll: Option<ScrollMetrics>,
}

impl<V: Viewport> DataLoader<V> {
    pub fn new(viewport: V, options: LoaderOptions) -> Self {
        let listening = options.can_load(LoadingMode::Infinite);
        gdebug!(
            loading = ?options.loading,
            refresh = options.can_refresh(),
            "DataLoader::new"
        );
        Self {
            viewport,
            options,
            state: TouchState::Idle,
            gesture: None,
            offset: 0.0,
            tween: None,
            gesture_request: None,
            infinite_request: None,
            listening,
            progress_shown: false,
            pending_scroll: None,
        }
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    pub fn state(&self) -> TouchState {
        self.state
    }

    /// The strategy the current gesture drives, if any.
    pub fn active_gesture(&self) -> Option<GestureKind> {
        self.gesture.map(|g| g.kind)
    }

    /// Current viewport translation.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Whether the infinite scroll listener is attached.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn is_request_pending(&self) -> bool {
        self.gesture_request.is_some() || self.infinite_request.is_some()
    }

    /// Records the anchor of a touch at a scroll edge.
    ///
    /// Refreshing wins when both edges are reached. Touches are ignored while a gesture or an
    /// infinite-scroll request is in progress.
    pub fn on_touch_start(&mut self, point: Point, metrics: ScrollMetrics) {
        if self.state != TouchState::Idle || self.infinite_request.is_some() {
            return;
        }
        let kind = if self.options.can_refresh() && metrics.at_start() {
            GestureKind::Refreshing
        } else if self.options.can_load(LoadingMode::Incremental) && metrics.at_end() {
            GestureKind::Loading
        } else {
            return;
        };
        self.gesture = Some(Gesture {
            kind,
            anchor: point.main_axis(self.options.orientation),
            ready: false,
        });
        self.state = TouchState::Armed;
    }

    /// Follows a drag sample. Returns `true` when the adapter should prevent the default scroll.
    pub fn on_track(&mut self, point: Point) -> bool {
        if !matches!(self.state, TouchState::Armed | TouchState::Tracking) {
            return false;
        }
        let Some(gesture) = self.gesture else {
            return false;
        };

        let position = point.main_axis(self.options.orientation);
        let distance = (gesture.kind.sign() * (position - gesture.anchor)).max(0.0);

        if self.state == TouchState::Armed {
            self.state = TouchState::Tracking;
            self.viewport.set_indicator(gesture.kind, true);
        }
        let ready = distance >= self.viewport.indicator_extent(gesture.kind);
        if ready != gesture.ready {
            self.viewport.set_ready(gesture.kind, ready);
            self.gesture = Some(Gesture { ready, ..gesture });
        }
        self.set_offset(gesture.kind.sign() * distance);
        true
    }

    /// Ends the drag (touch end, track end or touch cancel).
    pub fn on_release(&mut self, now_ms: u64) {
        match self.state {
            TouchState::Armed => {
                self.gesture = None;
                self.state = TouchState::Idle;
            }
            TouchState::Tracking => {
                let Some(gesture) = self.gesture else {
                    self.state = TouchState::Idle;
                    return;
                };
                if !gesture.ready {
                    self.settle(now_ms);
                    return;
                }

                let revealed = gesture.kind.sign() * self.viewport.indicator_extent(gesture.kind);
                self.start_tween(revealed, now_ms);
                let callback = match gesture.kind {
                    GestureKind::Refreshing => self.options.on_refresh.as_mut(),
                    GestureKind::Loading => self.options.on_items_requested.as_mut(),
                };
                match callback {
                    Some(callback) => {
                        gdebug!(kind = ?gesture.kind, "gesture triggered");
                        self.gesture_request = Some(callback());
                        self.state = TouchState::Triggered;
                    }
                    None => self.settle(now_ms),
                }
            }
            _ => {}
        }
    }

    /// Records a scroll position; it is checked against the infinite-scroll threshold on the next
    /// tick.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) {
        if self.listening {
            self.pending_scroll = Some(metrics);
        }
    }

    /// Advances the loader.
    ///
    /// Returns the viewport offset while a settle tween runs, `None` otherwise.
    pub fn tick(&mut self, now_ms: u64) -> Option<f32> {
        self.poll_infinite();
        if let Some(metrics) = self.pending_scroll.take() {
            self.check_infinite(metrics);
        }

        if self.state == TouchState::Triggered {
            match poll_request(&mut self.gesture_request) {
                Some(Ok(_)) => self.settle(now_ms),
                Some(Err(err)) => {
                    gwarn!(error = %err, kind = ?self.active_gesture(), "gesture callback failed");
                    self.reset();
                }
                None => {}
            }
        }

        let tween = self.tween?;
        let offset = tween.sample(now_ms);
        self.set_offset(offset);
        if tween.is_done(now_ms) {
            self.tween = None;
            if self.state == TouchState::Settling {
                self.finish();
            }
        }
        Some(offset)
    }

    fn check_infinite(&mut self, metrics: ScrollMetrics) {
        if !self.listening || self.gesture.is_some() {
            return;
        }
        if metrics.progress() < self.options.infinite_threshold {
            return;
        }
        let Some(callback) = self.options.on_items_requested.as_mut() else {
            return;
        };
        self.listening = false;
        self.infinite_request = Some(callback());
        if self.options.infinite_progress {
            self.viewport.set_infinite_progress(true);
            self.progress_shown = true;
        }
        gdebug!(progress = metrics.progress(), "infinite scroll requested more items");
    }

    fn poll_infinite(&mut self) {
        let Some(result) = poll_request(&mut self.infinite_request) else {
            return;
        };
        if self.progress_shown {
            self.viewport.set_infinite_progress(false);
            self.progress_shown = false;
        }
        match result {
            Ok(true) => self.listening = true,
            Ok(false) => gdebug!("no more items; infinite scroll stopped"),
            Err(err) => {
                gwarn!(error = %err, "infinite scroll request failed");
                self.listening = true;
            }
        }
    }

    fn settle(&mut self, now_ms: u64) {
        self.state = TouchState::Settling;
        self.start_tween(0.0, now_ms);
    }

    fn start_tween(&mut self, to: f32, now_ms: u64) {
        let duration = self.options.settle_duration_ms;
        match &mut self.tween {
            Some(tween) => tween.retarget(now_ms, to, duration),
            None => {
                self.tween = Some(Tween::new(
                    self.offset,
                    to,
                    now_ms,
                    duration,
                    self.options.easing,
                ));
            }
        }
    }

    /// Drops the gesture immediately, without animating.
    fn reset(&mut self) {
        self.tween = None;
        self.gesture_request = None;
        self.set_offset(0.0);
        self.finish();
    }

    fn finish(&mut self) {
        if let Some(gesture) = self.gesture.take() {
            if gesture.ready {
                self.viewport.set_ready(gesture.kind, false);
            }
            self.viewport.set_indicator(gesture.kind, false);
        }
        self.state = TouchState::Idle;
    }

    fn set_offset(&mut self, offset: f32) {
        self.offset = offset;
        self.viewport.set_offset(offset);
    }
}

fn poll_request(request: &mut Option<Request>) -> Option<Result<bool, LoadError>> {
    let fut = request.as_mut()?;
    let mut cx = Context::from_waker(noop_waker_ref());
    match fut.poll_unpin(&mut cx) {
        Poll::Ready(result) => {
            *request = None;
            Some(result)
        }
        Poll::Pending => None,
    }
}
