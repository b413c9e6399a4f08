use futures::FutureExt;
use futures::future::ready;
use listview_gesture::{
    DataLoader, Easing, GestureKind, LoaderOptions, Point, ScrollMetrics, Viewport,
};

struct PrintViewport;

impl Viewport for PrintViewport {
    fn indicator_extent(&self, _kind: GestureKind) -> f32 {
        48.0
    }

    fn set_offset(&mut self, offset: f32) {
        println!("translate {offset:.1}");
    }

    fn set_indicator(&mut self, kind: GestureKind, visible: bool) {
        println!("indicator {kind:?} visible={visible}");
    }

    fn set_ready(&mut self, kind: GestureKind, ready: bool) {
        println!("indicator {kind:?} ready={ready}");
    }

    fn set_infinite_progress(&mut self, visible: bool) {
        println!("progress visible={visible}");
    }
}

fn main() {
    // Example: a pull-to-refresh gesture whose callback resolves immediately.
    //
    // An adapter would forward touch events, then call tick(now_ms) every frame until it returns
    // None.
    let options = LoaderOptions::default()
        .with_refresh(Box::new(|| {
            println!("refreshing");
            ready(Ok(true)).boxed_local()
        }))
        .with_settle(160, Easing::SmoothStep);
    let mut loader = DataLoader::new(PrintViewport, options);

    let at_top = ScrollMetrics::new(0.0, 2_000.0, 600.0);
    loader.on_touch_start(Point::new(0.0, 100.0), at_top);
    for y in [110.0, 130.0, 160.0] {
        loader.on_track(Point::new(0.0, y));
    }
    loader.on_release(0);

    let mut now_ms = 0u64;
    while loader.tick(now_ms).is_some() || loader.is_request_pending() {
        now_ms += 16;
    }
    println!("done: state={:?} t={now_ms}", loader.state());
}
