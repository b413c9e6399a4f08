use crate::*;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use listview::{ConfigError, ListviewOptions, LoadingMode, Orientation};

#[derive(Debug, Default)]
struct FakeViewport {
    extent: f32,
    offset: f32,
    indicator: Option<GestureKind>,
    ready: Option<GestureKind>,
    progress: bool,
}

impl FakeViewport {
    fn new(extent: f32) -> Self {
        Self {
            extent,
            ..Self::default()
        }
    }
}

impl Viewport for FakeViewport {
    fn indicator_extent(&self, _kind: GestureKind) -> f32 {
        self.extent
    }

    fn set_offset(&mut self, offset: f32) {
        self.offset = offset;
    }

    fn set_indicator(&mut self, kind: GestureKind, visible: bool) {
        self.indicator = visible.then_some(kind);
    }

    fn set_ready(&mut self, kind: GestureKind, ready: bool) {
        self.ready = ready.then_some(kind);
    }

    fn set_infinite_progress(&mut self, visible: bool) {
        self.progress = visible;
    }
}

/// Counts callback invocations and answers them on demand.
#[derive(Clone, Default)]
struct Calls {
    count: Rc<Cell<usize>>,
    replies: Rc<RefCell<Vec<oneshot::Sender<Result<bool, LoadError>>>>>,
}

impl Calls {
    fn callback(&self) -> LoadCallback {
        let calls = self.clone();
        Box::new(move || {
            calls.count.set(calls.count.get() + 1);
            let (tx, rx) = oneshot::channel();
            calls.replies.borrow_mut().push(tx);
            async move {
                rx.await
                    .unwrap_or_else(|_| Err(LoadError::Rejected("dropped".to_owned())))
            }
            .boxed_local()
        })
    }

    fn reply(&self, result: Result<bool, LoadError>) {
        let tx = self.replies.borrow_mut().remove(0);
        let _ = tx.send(result);
    }

    fn count(&self) -> usize {
        self.count.get()
    }
}

fn top() -> ScrollMetrics {
    ScrollMetrics::new(0.0, 1000.0, 100.0)
}

fn bottom() -> ScrollMetrics {
    ScrollMetrics::new(900.0, 1000.0, 100.0)
}

fn infinite_loader(calls: &Calls) -> DataLoader<FakeViewport> {
    let options = LoaderOptions::default().with_loading(LoadingMode::Infinite, calls.callback());
    DataLoader::new(FakeViewport::new(60.0), options)
}

fn refresh_loader(calls: &Calls) -> DataLoader<FakeViewport> {
    let options = LoaderOptions::default().with_refresh(calls.callback());
    DataLoader::new(FakeViewport::new(60.0), options)
}

#[test]
fn rejected_infinite_request_reattaches_listener() {
    let calls = Calls::default();
    let mut loader = infinite_loader(&calls);
    assert!(loader.is_listening());

    loader.on_scroll(ScrollMetrics::new(800.0, 1000.0, 100.0));
    assert_eq!(loader.tick(0), None);
    assert_eq!(calls.count(), 1);
    assert!(!loader.is_listening());
    assert!(loader.viewport().progress);

    // Detached while the request is outstanding.
    loader.on_scroll(bottom());
    loader.tick(16);
    assert_eq!(calls.count(), 1);

    calls.reply(Err(LoadError::Rejected("offline".to_owned())));
    loader.tick(32);
    assert!(loader.is_listening());
    assert!(!loader.viewport().progress);
    assert!(!loader.is_request_pending());
    assert_eq!(loader.state(), TouchState::Idle);
    assert_eq!(loader.offset(), 0.0);
}

#[test]
fn exhausted_infinite_request_stops_listening() {
    let calls = Calls::default();
    let mut loader = infinite_loader(&calls);

    loader.on_scroll(bottom());
    loader.tick(0);
    calls.reply(Ok(false));
    loader.tick(16);
    assert!(!loader.is_listening());

    loader.on_scroll(bottom());
    loader.tick(32);
    assert_eq!(calls.count(), 1);
}

#[test]
fn successful_infinite_request_listens_again() {
    let calls = Calls::default();
    let mut loader = infinite_loader(&calls);

    loader.on_scroll(bottom());
    loader.tick(0);
    calls.reply(Ok(true));
    loader.tick(16);
    assert!(loader.is_listening());

    loader.on_scroll(bottom());
    loader.tick(32);
    assert_eq!(calls.count(), 2);
}

#[test]
fn infinite_scroll_waits_for_threshold() {
    let calls = Calls::default();
    let mut loader = infinite_loader(&calls);

    loader.on_scroll(ScrollMetrics::new(500.0, 1000.0, 100.0));
    loader.tick(0);
    assert_eq!(calls.count(), 0);

    // Only the latest position of a frame is checked.
    loader.on_scroll(bottom());
    loader.on_scroll(top());
    loader.tick(16);
    assert_eq!(calls.count(), 0);
    assert!(loader.is_listening());
}

#[test]
fn infinite_progress_can_be_disabled() {
    let calls = Calls::default();
    let options = LoaderOptions::default()
        .with_loading(LoadingMode::Infinite, calls.callback())
        .with_infinite_progress(false);
    let mut loader = DataLoader::new(FakeViewport::new(60.0), options);

    loader.on_scroll(bottom());
    loader.tick(0);
    assert_eq!(calls.count(), 1);
    assert!(!loader.viewport().progress);
}

#[test]
fn short_pull_settles_back_without_refreshing() {
    let calls = Calls::default();
    let mut loader = refresh_loader(&calls);

    loader.on_touch_start(Point::new(0.0, 10.0), top());
    assert_eq!(loader.state(), TouchState::Armed);
    assert_eq!(loader.viewport().indicator, None);

    assert!(loader.on_track(Point::new(0.0, 40.0)));
    assert_eq!(loader.state(), TouchState::Tracking);
    assert_eq!(loader.viewport().indicator, Some(GestureKind::Refreshing));
    assert_eq!(loader.viewport().ready, None);
    assert_eq!(loader.offset(), 30.0);

    loader.on_release(100);
    assert_eq!(loader.state(), TouchState::Settling);
    assert_eq!(loader.tick(100), Some(30.0));
    assert_eq!(loader.tick(350), Some(0.0));

    assert_eq!(loader.state(), TouchState::Idle);
    assert_eq!(loader.viewport().offset, 0.0);
    assert_eq!(loader.viewport().indicator, None);
    assert_eq!(calls.count(), 0);
    assert_eq!(loader.tick(400), None);
}

#[test]
fn long_pull_refreshes_then_settles() {
    let calls = Calls::default();
    let mut loader = refresh_loader(&calls);

    loader.on_touch_start(Point::new(0.0, 10.0), top());
    loader.on_track(Point::new(0.0, 80.0));
    assert_eq!(loader.viewport().ready, Some(GestureKind::Refreshing));

    // Crossing back below the threshold disarms the trigger.
    loader.on_track(Point::new(0.0, 50.0));
    assert_eq!(loader.viewport().ready, None);

    loader.on_track(Point::new(0.0, 90.0));
    assert_eq!(loader.viewport().ready, Some(GestureKind::Refreshing));
    assert_eq!(loader.offset(), 80.0);

    loader.on_release(0);
    assert_eq!(loader.state(), TouchState::Triggered);
    assert_eq!(calls.count(), 1);

    // Held at the revealed position while the callback runs.
    assert_eq!(loader.tick(250), Some(60.0));
    assert_eq!(loader.tick(260), None);
    assert_eq!(loader.state(), TouchState::Triggered);

    calls.reply(Ok(true));
    assert_eq!(loader.tick(300), Some(60.0));
    assert_eq!(loader.state(), TouchState::Settling);
    assert_eq!(loader.tick(550), Some(0.0));
    assert_eq!(loader.state(), TouchState::Idle);
    assert_eq!(loader.viewport().ready, None);
    assert_eq!(loader.viewport().indicator, None);
    assert_eq!(calls.count(), 1);
}

#[test]
fn rejected_refresh_returns_to_rest_immediately() {
    let calls = Calls::default();
    let mut loader = refresh_loader(&calls);

    loader.on_touch_start(Point::new(0.0, 0.0), top());
    loader.on_track(Point::new(0.0, 100.0));
    loader.on_release(0);
    loader.tick(100);

    calls.reply(Err(LoadError::Rejected("server error".to_owned())));
    assert_eq!(loader.tick(116), None);
    assert_eq!(loader.state(), TouchState::Idle);
    assert_eq!(loader.offset(), 0.0);
    assert_eq!(loader.viewport().offset, 0.0);
    assert_eq!(loader.viewport().indicator, None);
    assert_eq!(loader.active_gesture(), None);
}

#[test]
fn refresh_wins_when_both_edges_apply() {
    let refresh = Calls::default();
    let more = Calls::default();
    let options = LoaderOptions::default()
        .with_refresh(refresh.callback())
        .with_loading(LoadingMode::Incremental, more.callback());
    let mut loader = DataLoader::new(FakeViewport::new(60.0), options);

    // Content shorter than the viewport: both edges are reached.
    loader.on_touch_start(Point::new(0.0, 0.0), ScrollMetrics::new(0.0, 50.0, 100.0));
    assert_eq!(loader.active_gesture(), Some(GestureKind::Refreshing));
}

#[test]
fn drag_at_trailing_edge_requests_more_items() {
    let more = Calls::default();
    let options = LoaderOptions::default().with_loading(LoadingMode::Incremental, more.callback());
    let mut loader = DataLoader::new(FakeViewport::new(60.0), options);
    assert!(!loader.is_listening());

    loader.on_touch_start(Point::new(0.0, 500.0), bottom());
    assert_eq!(loader.active_gesture(), Some(GestureKind::Loading));
    loader.on_track(Point::new(0.0, 420.0));
    assert_eq!(loader.offset(), -80.0);
    assert_eq!(loader.viewport().ready, Some(GestureKind::Loading));

    loader.on_release(0);
    assert_eq!(more.count(), 1);
    assert_eq!(loader.tick(250), Some(-60.0));
}

#[test]
fn drag_away_from_the_edge_is_not_tracked() {
    let calls = Calls::default();
    let mut loader = refresh_loader(&calls);

    loader.on_touch_start(Point::new(0.0, 0.0), ScrollMetrics::new(400.0, 1000.0, 100.0));
    assert_eq!(loader.state(), TouchState::Idle);
    assert!(!loader.on_track(Point::new(0.0, 200.0)));
    loader.on_release(0);
    assert_eq!(calls.count(), 0);
}

#[test]
fn pushing_against_the_pull_direction_reveals_nothing() {
    let calls = Calls::default();
    let mut loader = refresh_loader(&calls);

    loader.on_touch_start(Point::new(0.0, 100.0), top());
    assert!(loader.on_track(Point::new(0.0, 20.0)));
    assert_eq!(loader.offset(), 0.0);
    assert_eq!(loader.viewport().ready, None);
}

#[test]
fn release_at_rest_settles_on_next_tick() {
    let calls = Calls::default();
    let mut loader = refresh_loader(&calls);

    loader.on_touch_start(Point::new(0.0, 100.0), top());
    loader.on_track(Point::new(0.0, 20.0));
    loader.on_release(0);
    assert_eq!(loader.state(), TouchState::Settling);

    assert_eq!(loader.tick(0), Some(0.0));
    assert_eq!(loader.state(), TouchState::Idle);
    assert_eq!(loader.viewport().indicator, None);
    assert_eq!(loader.tick(16), None);
}

#[test]
fn release_without_drag_returns_to_idle() {
    let calls = Calls::default();
    let mut loader = refresh_loader(&calls);

    loader.on_touch_start(Point::new(0.0, 0.0), top());
    loader.on_release(0);
    assert_eq!(loader.state(), TouchState::Idle);
    assert_eq!(loader.tick(10), None);
}

#[test]
fn infinite_scroll_is_ignored_mid_refresh() {
    let refresh = Calls::default();
    let more = Calls::default();
    let options = LoaderOptions::default()
        .with_refresh(refresh.callback())
        .with_loading(LoadingMode::Infinite, more.callback());
    let mut loader = DataLoader::new(FakeViewport::new(60.0), options);

    loader.on_touch_start(Point::new(0.0, 0.0), top());
    loader.on_track(Point::new(0.0, 100.0));
    loader.on_scroll(bottom());
    loader.tick(0);
    assert_eq!(more.count(), 0);
    assert!(loader.is_listening());
}

#[test]
fn refresh_is_ignored_while_loading_more() {
    let refresh = Calls::default();
    let more = Calls::default();
    let options = LoaderOptions::default()
        .with_refresh(refresh.callback())
        .with_loading(LoadingMode::Infinite, more.callback());
    let mut loader = DataLoader::new(FakeViewport::new(60.0), options);

    loader.on_scroll(bottom());
    loader.tick(0);
    assert_eq!(more.count(), 1);

    loader.on_touch_start(Point::new(0.0, 0.0), top());
    assert_eq!(loader.state(), TouchState::Idle);
}

#[test]
fn horizontal_loader_tracks_x() {
    let calls = Calls::default();
    let options = LoaderOptions::default()
        .with_refresh(calls.callback())
        .with_orientation(Orientation::Horizontal);
    let mut loader = DataLoader::new(FakeViewport::new(60.0), options);

    loader.on_touch_start(Point::new(0.0, 0.0), top());
    loader.on_track(Point::new(70.0, 500.0));
    assert_eq!(loader.offset(), 70.0);
    assert_eq!(loader.viewport().ready, Some(GestureKind::Refreshing));
}

#[test]
fn options_resolve_callbacks_by_name() {
    let more = Calls::default();
    let options = ListviewOptions::new("item")
        .with_loading(LoadingMode::Infinite, "more")
        .with_refresh("reload")
        .with_infinite_progress(false);

    let (loader_options, errors) = LoaderOptions::from_options(&options, |name| {
        (name == "more").then(|| more.callback())
    });
    assert_eq!(errors, vec![ConfigError::UnknownCallback("reload".to_owned())]);
    assert_eq!(loader_options.loading, LoadingMode::Infinite);
    assert!(loader_options.can_load(LoadingMode::Infinite));
    assert!(!loader_options.can_refresh());
    assert!(!loader_options.infinite_progress);
    assert_eq!(loader_options.settle_duration_ms, 250);
    assert_eq!(loader_options.infinite_threshold, 0.8);

    let (loader_options, errors) = LoaderOptions::from_options(&options, |_| None);
    assert_eq!(loader_options.loading, LoadingMode::None);
    assert_eq!(
        errors,
        vec![
            ConfigError::UnknownCallback("more".to_owned()),
            ConfigError::UnknownCallback("reload".to_owned()),
        ]
    );

    let mut options = ListviewOptions::new("item");
    options.loading = LoadingMode::Incremental;
    let (_, errors) = LoaderOptions::from_options(&options, |_| None);
    assert_eq!(errors, vec![ConfigError::MissingCallback { option: "loading" }]);
}

#[test]
fn settle_tween_returns_to_rest_from_either_edge() {
    for revealed in [80.0f32, -80.0] {
        let tween = Tween::new(revealed, 0.0, 0, 100, Easing::SmoothStep);
        let mut distance = f32::MAX;
        for now_ms in [0u64, 10, 20, 40, 80, 100, 120] {
            let offset = tween.sample(now_ms);
            assert!(offset * revealed >= 0.0, "{offset}");
            assert!(offset.abs() <= distance);
            distance = offset.abs();
        }
        assert!(tween.is_done(100));
        assert_eq!(tween.sample(120), 0.0);
    }
}

#[test]
fn settle_during_reveal_starts_from_current_offset() {
    // The callback resolved halfway through revealing the indicator.
    let mut tween = Tween::new(0.0, 100.0, 0, 100, Easing::Linear);
    tween.retarget(50, 0.0, 200);
    assert_eq!(tween.from, 50.0);
    assert_eq!(tween.to, 0.0);
    assert_eq!(tween.start_ms, 50);
    assert_eq!(tween.sample(150), 25.0);
}

#[test]
fn retarget_to_the_same_rest_keeps_progress() {
    let mut tween = Tween::new(60.0, 0.0, 0, 100, Easing::Linear);
    tween.retarget(50, 0.0, 100);
    assert_eq!(tween.start_ms, 0);
    assert_eq!(tween.sample(50), 30.0);
    assert!(tween.is_done(100));
}

#[test]
fn settle_at_rest_is_done_immediately() {
    let tween = Tween::new(0.0, 0.0, 40, 250, Easing::default());
    assert!(tween.is_done(40));
    assert_eq!(tween.sample(40), 0.0);
}

#[test]
fn easing_endpoints() {
    for easing in [Easing::Linear, Easing::SmoothStep, Easing::EaseInOutCubic] {
        assert_eq!(easing.sample(0.0), 0.0);
        assert_eq!(easing.sample(1.0), 1.0);
    }
    assert_eq!(Easing::EaseInOutCubic.sample(0.5), 0.5);
}
