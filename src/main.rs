//! Hz Bounce entry point
//!
//! On web, wires the canvas, mouse and resize events to the controller and
//! drives it from animation frames. On native, runs a headless session with
//! a simulated viewer and prints the export JSON.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use serde::Serialize;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent};

    use hz_bounce::platform::Surface;
    use hz_bounce::platform::web::CanvasSurface;
    use hz_bounce::refresh::RefreshEstimator;
    use hz_bounce::report::{self, ExportPayload, TimelineRange};
    use hz_bounce::{
        EventKind, EventLog, RunOptions, TestConfig, TestController, TestPhase, TestRunState,
    };

    /// Everything the event handlers share
    struct App {
        controller: TestController,
        surface: CanvasSurface,
        refresh: RefreshEstimator,
    }

    /// Series handed to the charting front end
    #[derive(Serialize)]
    struct ChartData {
        steps: Vec<(f64, u32)>,
        clicks: Vec<f64>,
        display_timeline: Vec<TimelineRange>,
        user_timeline: Vec<TimelineRange>,
    }

    pub fn run() -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("mainTest")
            .ok_or("missing #mainTest canvas")?
            .dyn_into()?;

        let width = window.inner_width()?.as_f64().unwrap_or(800.0);
        let height = window.inner_height()?.as_f64().unwrap_or(600.0);
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);
        let surface = CanvasSurface::new(canvas.clone())?;

        let config = TestConfig::load();
        let seed = js_sys::Date::now() as u64;
        let mut controller = TestController::new(config.clone(), RunOptions::seeded(seed))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        controller.register_on_complete(Box::new(move |_state: &TestRunState, events: &EventLog| {
            if let Err(e) = publish_results(&config, events) {
                log::warn!("Failed to publish results: {:?}", e);
            }
        }));

        let app = Rc::new(RefCell::new(App {
            controller,
            surface,
            refresh: RefreshEstimator::new(),
        }));
        setup_start(&document, app.clone())?;
        setup_mouse(&canvas, app.clone())?;
        setup_resize(&window, app.clone())?;
        start_frame_loop(app);

        log::info!("Hz Bounce ready with seed {}", seed);
        Ok(())
    }

    /// The test stays Idle until the start button is clicked
    fn setup_start(document: &web_sys::Document, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let menu = document
            .get_element_by_id("startMenu")
            .ok_or("missing #startMenu button")?;
        let target = menu.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let mut a = app.borrow_mut();
            let size = a.surface.size();
            if a.controller.start(js_sys::Date::now(), size) {
                log::info!("Test started");
                if let Err(e) = target.set_attribute("hidden", "") {
                    log::warn!("Failed to hide start menu: {:?}", e);
                }
            }
        });
        menu.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_mouse(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut a = app.borrow_mut();
                let App {
                    controller,
                    surface,
                    ..
                } = &mut *a;
                controller.press(js_sys::Date::now(), surface);
            });
            canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let mut a = app.borrow_mut();
            let App {
                controller,
                surface,
                ..
            } = &mut *a;
            controller.release(js_sys::Date::now(), surface);
        });
        canvas.add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_resize(window: &web_sys::Window, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let width = window
                .inner_width()
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or_default();
            let height = window
                .inner_height()
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or_default();
            let result = app
                .borrow_mut()
                .controller
                .resize(Vec2::new(width as f32, height as f32));
            if let Err(e) = result {
                log::warn!("{}", e);
                let _ = window.alert_with_message("Please don't resize the screen");
                let _ = window.location().reload();
            }
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn start_frame_loop(app: Rc<RefCell<App>>) {
        let frame: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let next = frame.clone();

        *frame.borrow_mut() = Some(Closure::new(move |stamp: f64| {
            let keep_going = {
                let mut a = app.borrow_mut();
                let App {
                    controller,
                    surface,
                    refresh,
                } = &mut *a;
                refresh.push(stamp);
                controller.advance_to(js_sys::Date::now(), surface);
                match controller.phase() {
                    TestPhase::Complete => {
                        show_refresh_estimate(refresh.estimate());
                        false
                    }
                    TestPhase::Aborted => false,
                    _ => true,
                }
            };
            if keep_going {
                if let Some(cb) = next.borrow().as_ref() {
                    request_frame(cb);
                }
            }
        }));

        if let Some(cb) = frame.borrow().as_ref() {
            request_frame(cb);
        }
    }

    fn request_frame(cb: &Closure<dyn FnMut(f64)>) {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                log::warn!("requestAnimationFrame failed: {:?}", e);
            }
        }
    }

    fn show_refresh_estimate(hz: Option<u32>) {
        let document = web_sys::window().and_then(|w| w.document());
        if let Some(el) = document.and_then(|d| d.get_element_by_id("detected-hz")) {
            let text = hz.map_or_else(|| "Unknown".to_string(), |hz| format!("{}hz", hz));
            el.set_text_content(Some(&text));
        }
    }

    fn publish_results(config: &TestConfig, events: &EventLog) -> Result<(), JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("no document")?;
        let to_js = |e: serde_json::Error| JsValue::from_str(&e.to_string());

        let payload = ExportPayload::new(config, events);
        let json = payload.to_json().map_err(to_js)?;

        if let Some(el) = document.get_element_by_id("json-renderer") {
            let settings = serde_json::to_string_pretty(&payload.settings).map_err(to_js)?;
            el.set_text_content(Some(&settings));
        }

        if let Some(el) = document.get_element_by_id("export-results") {
            let encoded = String::from(js_sys::encode_uri_component(&json));
            el.set_attribute("href", &format!("data:text/json;charset=utf-8,{}", encoded))?;
        }

        if let Some(el) = document.get_element_by_id("chart-data") {
            let charts = ChartData {
                steps: report::rate_steps(events),
                clicks: report::click_marks(events),
                display_timeline: report::timeline(events, EventKind::RateChange),
                user_timeline: report::timeline(events, EventKind::UserClick),
            };
            el.set_text_content(Some(&serde_json::to_string(&charts).map_err(to_js)?));
        }

        if let Some(el) = document.get_element_by_id("testComplete") {
            el.set_attribute("class", "")?;
        }

        log::info!("Results published ({} events)", events.len());
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    web_app::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Hz Bounce (native) starting...");
    log::info!("Native mode runs a simulated viewer - serve the wasm build for a real test");

    if let Err(e) = headless::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::error::Error;
    use std::rc::Rc;

    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use hz_bounce::platform::{RecordingSurface, Surface};
    use hz_bounce::report::{self, ExportPayload, RunSummary};
    use hz_bounce::{
        Event, EventKind, EventLog, RunOptions, TestConfig, TestController, TestRunState,
    };

    /// Simulated animation frame period
    const FRAME_MS: f64 = 1000.0 / 60.0;
    const SURFACE_WIDTH: f32 = 1280.0;
    const SURFACE_HEIGHT: f32 = 720.0;

    /// Scripted viewer: sometimes notices a rate change and clicks
    struct Observer {
        rng: Pcg32,
        seen: usize,
        press_at: Option<f64>,
        release_at: Option<f64>,
    }

    impl Observer {
        /// Chance of noticing a change
        const NOTICE_CHANCE: f64 = 0.7;

        fn new(seed: u64) -> Self {
            Self {
                rng: Pcg32::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15),
                seen: 0,
                press_at: None,
                release_at: None,
            }
        }

        fn react(&mut self, controller: &mut TestController, surface: &mut dyn Surface, now: f64) {
            let events = controller.events().events();
            for event in &events[self.seen..] {
                if let Event::RateChange { ts, previous, current, .. } = *event {
                    if previous != current && self.rng.random_bool(Self::NOTICE_CHANCE) {
                        self.press_at = Some(ts + self.rng.random_range(250.0..900.0));
                    }
                }
            }
            self.seen = events.len();

            if self.press_at.is_some_and(|t| now >= t) {
                self.press_at = None;
                if controller.press(now, surface) {
                    self.release_at = Some(now + self.rng.random_range(80.0..200.0));
                }
            }
            if self.release_at.is_some_and(|t| now >= t) {
                self.release_at = None;
                controller.release(now, surface);
            }
        }
    }

    fn epoch_ms() -> f64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or_default()
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        let config = match std::env::args().nth(1) {
            Some(path) => {
                log::info!("Loading config from {}", path);
                TestConfig::from_json_file(&path)?
            }
            None => TestConfig::load(),
        };
        let seed = std::env::var("HZ_BOUNCE_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| epoch_ms() as u64);

        let mut controller = TestController::new(config.clone(), RunOptions::seeded(seed))?;
        let mut surface = RecordingSurface::new(SURFACE_WIDTH, SURFACE_HEIGHT);

        let result: Rc<RefCell<Option<ExportPayload>>> = Rc::new(RefCell::new(None));
        let sink = result.clone();
        controller.register_on_complete(Box::new(move |state: &TestRunState, events: &EventLog| {
            log::info!("Run finished at {} Hz", state.current_rate_hz);
            *sink.borrow_mut() = Some(ExportPayload::new(&config, events));
        }));

        let mut observer = Observer::new(seed);
        let mut now = epoch_ms();
        controller.start(now, surface.size());
        while !controller.phase().is_terminal() {
            now += FRAME_MS;
            controller.advance_to(now, &mut surface);
            observer.react(&mut controller, &mut surface, now);
        }

        let payload = result.borrow_mut().take().ok_or("test did not complete")?;
        let summary = RunSummary::from_log(&payload.data);
        log::info!(
            "{} frames drawn, {} rate events, {} clicks over {:.1}s",
            surface.frames.len(),
            summary.rate_changes,
            summary.clicks,
            summary.duration_ms / 1000.0
        );
        for (hz, clicks) in &summary.clicks_by_rate {
            log::info!("  {} Hz: {} clicks", hz, clicks);
        }
        for bar in report::timeline(&payload.data, EventKind::RateChange) {
            log::debug!("  {} from {:.0} to {:.0}", bar.label, bar.start_ms, bar.end_ms);
        }

        println!("{}", payload.to_json_pretty()?);
        Ok(())
    }
}
