//! Island Hopper entry point
//!
//! Wires the simulation and the reveal scheduler to the page: DOM rendering,
//! input listeners, visibility observers, and the frame loop. Rendering is a
//! pure projection from the per-tick snapshot onto absolutely positioned
//! nodes; nothing in here feeds back into the simulation except input and
//! visibility events.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_shell {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
        IntersectionObserverInit,
    };

    use island_hopper::consts::*;
    use island_hopper::reveal::SETUP_DEBOUNCE_MS;
    use island_hopper::sim::{self, GamePhase, GameState};
    use island_hopper::{HighScore, RevealScheduler};

    /// Game instance holding sim state and its DOM projection targets
    struct Game {
        state: GameState,
        best: HighScore,
        /// Track phase transitions for logging and persistence
        last_phase: GamePhase,
        /// Whether the game region is currently in the viewport
        visible: bool,
        /// Pending animation frame, if one is scheduled
        frame_id: Option<i32>,
        view: View,
    }

    /// Long-lived DOM handles plus node pools for the entity layers
    struct View {
        document: Document,
        character: HtmlElement,
        platform_layer: Element,
        cloud_layer: Element,
        platform_nodes: Vec<HtmlElement>,
        cloud_nodes: Vec<HtmlElement>,
    }

    impl Game {
        /// Handle phase transitions after a tick or input
        fn sync_phase(&mut self) {
            let phase = self.state.phase;
            if phase == self.last_phase {
                return;
            }
            match phase {
                GamePhase::Running => log::info!("Session running"),
                GamePhase::Idle => log::info!("Session suspended"),
                GamePhase::GameOver => {
                    log::info!("Game over at score {}", self.state.score_display());
                    if self.best.record(self.state.score_display()) {
                        self.best.save();
                        log::info!("New best score: {}", self.best.value);
                    }
                }
            }
            self.last_phase = phase;
        }

        /// Project the current snapshot onto the DOM
        fn render(&mut self) {
            let state = &self.state;
            let view = &mut self.view;

            // Character: y from the sim, x arcs forward during a jump
            let x_offset = if state.player.is_jumping {
                (state.jump_progress() * std::f32::consts::PI).sin() * 12.0
            } else {
                0.0
            };
            let _ = view.character.style().set_property(
                "transform",
                &format!(
                    "translateY({}px) translateX({}px)",
                    state.player.pos.y, x_offset
                ),
            );
            let mut class = format!("game-character {}", state.player.anim.as_class());
            if state.player.flash_active() {
                class.push_str(" jump-flash");
            }
            view.character.set_class_name(&class);

            // Entity layers: reconcile pool sizes, then write positions
            sync_pool(
                &view.document,
                &view.platform_layer,
                &mut view.platform_nodes,
                state.platforms.len(),
                "game-platform",
            );
            for (node, p) in view.platform_nodes.iter().zip(&state.platforms) {
                let style = node.style();
                let _ = style.set_property("left", &format!("{}px", p.pos.x));
                let _ = style.set_property("top", &format!("{}px", p.pos.y));
                let _ = style.set_property("width", &format!("{}px", p.width));
                let _ = style.set_property("height", &format!("{PLATFORM_HEIGHT}px"));
            }

            sync_pool(
                &view.document,
                &view.cloud_layer,
                &mut view.cloud_nodes,
                state.clouds.len(),
                "game-cloud",
            );
            for (node, c) in view.cloud_nodes.iter().zip(&state.clouds) {
                let style = node.style();
                let _ = style.set_property("left", &format!("{}px", c.pos.x));
                let _ = style.set_property("top", &format!("{}px", c.pos.y));
                let _ = style.set_property("width", &format!("{}px", c.size));
                let _ = style.set_property("height", &format!("{}px", c.size * 0.6));
                let _ = style.set_property("opacity", &format!("{}", c.opacity));
            }

            // HUD
            let document = &view.document;
            if let Some(el) = document.get_element_by_id("score") {
                el.set_text_content(Some(&format!("Score: {}", state.score_display())));
            }
            if let Some(el) = document.get_element_by_id("high-score") {
                el.set_text_content(Some(&format!("High Score: {}", state.high_score)));
            }

            // Overlays
            if let Some(el) = document.get_element_by_id("start-overlay") {
                let shown = state.phase == GamePhase::Idle && !state.session_started;
                let _ = el.set_attribute("class", if shown { "overlay" } else { "overlay hidden" });
            }
            if let Some(el) = document.get_element_by_id("game-over-overlay") {
                if state.phase == GamePhase::GameOver {
                    let _ = el.set_attribute("class", "overlay");
                    if let Some(score_el) = document.get_element_by_id("final-score") {
                        score_el.set_text_content(Some(&state.score_display().to_string()));
                    }
                    if let Some(note) = document.get_element_by_id("new-best") {
                        let _ = note.set_attribute(
                            "class",
                            if state.high_score_improved { "" } else { "hidden" },
                        );
                    }
                } else {
                    let _ = el.set_attribute("class", "overlay hidden");
                }
            }
        }
    }

    /// Grow or shrink a node pool to match the entity count
    fn sync_pool(
        document: &Document,
        parent: &Element,
        nodes: &mut Vec<HtmlElement>,
        target: usize,
        class: &str,
    ) {
        while nodes.len() < target {
            let Ok(el) = document.create_element("div") else {
                return;
            };
            el.set_class_name(class);
            if parent.append_child(&el).is_err() {
                return;
            }
            if let Ok(el) = el.dyn_into::<HtmlElement>() {
                nodes.push(el);
            }
        }
        while nodes.len() > target {
            if let Some(el) = nodes.pop() {
                el.remove();
            }
        }
    }

    fn now_ms() -> f64 {
        js_sys::Date::now()
    }

    /// One-shot timeout helper; the closure leaks, which is fine for the
    /// page-lifetime wiring in this shell
    fn set_timeout<F: FnOnce() + 'static>(ms: i32, f: F) {
        let closure = Closure::once(f);
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                ms,
            );
        }
        closure.forget();
    }

    fn schedule_frame(game: &Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let g = game.clone();
        let closure = Closure::once(move |_time: f64| frame(g));
        if let Ok(id) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            game.borrow_mut().frame_id = Some(id);
        }
        closure.forget();
    }

    fn frame(game: Rc<RefCell<Game>>) {
        let keep_running = {
            let mut g = game.borrow_mut();
            g.frame_id = None;
            sim::tick(&mut g.state);
            g.sync_phase();
            g.render();
            g.state.phase == GamePhase::Running && g.visible
        };
        if keep_running {
            schedule_frame(&game);
        }
    }

    /// Single dispatch for every input surface: jump while running,
    /// start/restart otherwise
    fn dispatch_primary(game: &Rc<RefCell<Game>>) {
        let need_schedule = {
            let mut g = game.borrow_mut();
            sim::primary_action(&mut g.state);
            g.sync_phase();
            g.render();
            g.state.phase == GamePhase::Running && g.frame_id.is_none()
        };
        if need_schedule {
            schedule_frame(game);
        }
    }

    fn setup_input_handlers(region: &Element, document: &Document, game: Rc<RefCell<Game>>) {
        // Pointer down on the game region (covers mouse and touch)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::PointerEvent| {
                event.prevent_default();
                dispatch_primary(&game);
            });
            let _ = region
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Dedicated jump button; stop propagation so the region handler
        // doesn't fire a second dispatch
        if let Some(btn) = document.get_element_by_id("jump-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::PointerEvent| {
                event.prevent_default();
                event.stop_propagation();
                dispatch_primary(&game);
            });
            let _ = btn
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Space bar
        {
            let window = web_sys::window().expect("no window");
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if event.code() == "Space" {
                    event.prevent_default();
                    dispatch_primary(&game);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Observe the game region: entering view starts or resumes the session,
    /// leaving cancels the pending frame without clearing state.
    fn setup_game_observer(region: &Element, game: Rc<RefCell<Game>>) {
        let handler = {
            let game = game.clone();
            Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
                move |entries: js_sys::Array, _observer: IntersectionObserver| {
                    let entry: IntersectionObserverEntry = entries.get(0).unchecked_into();
                    if entry.is_intersecting() {
                        let need_schedule = {
                            let mut g = game.borrow_mut();
                            g.visible = true;
                            sim::enter_view(&mut g.state);
                            g.sync_phase();
                            g.state.phase == GamePhase::Running && g.frame_id.is_none()
                        };
                        if need_schedule {
                            schedule_frame(&game);
                        }
                    } else {
                        let mut g = game.borrow_mut();
                        g.visible = false;
                        sim::leave_view(&mut g.state);
                        g.sync_phase();
                        if let Some(id) = g.frame_id.take() {
                            if let Some(window) = web_sys::window() {
                                let _ = window.cancel_animation_frame(id);
                            }
                        }
                    }
                },
            )
        };

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(0.5));

        match IntersectionObserver::new_with_options(handler.as_ref().unchecked_ref(), &options) {
            Ok(observer) => {
                observer.observe(region);
                handler.forget();
            }
            Err(_) => {
                // No visibility signal: treat as always visible, never pause
                log::warn!("IntersectionObserver unavailable, game stays active");
                let need_schedule = {
                    let mut g = game.borrow_mut();
                    g.visible = true;
                    sim::enter_view(&mut g.state);
                    g.sync_phase();
                    g.state.phase == GamePhase::Running
                };
                if need_schedule {
                    schedule_frame(&game);
                }
            }
        }
    }

    /// Reveal scheduler wiring: one lazily created observer over all
    /// `.fade-in-up` elements, disposed once every reveal has fired.
    struct RevealDom {
        scheduler: RevealScheduler,
        /// Handle = index into this list; elements also carry the handle in
        /// a `data-reveal` attribute for the callback path
        elements: Vec<Element>,
        observer: Option<IntersectionObserver>,
    }

    impl RevealDom {
        fn reveal(&mut self, handle: u64) {
            if let Some(el) = self.elements.get(handle as usize) {
                let _ = el.class_list().add_1("appear");
                if let Some(observer) = &self.observer {
                    observer.unobserve(el);
                }
            }
        }

        /// Tear down the observer once nothing is watched or in flight
        fn dispose_if_idle(&mut self) {
            if self.scheduler.is_idle() {
                if let Some(observer) = self.observer.take() {
                    observer.disconnect();
                    log::info!("Reveal scheduler disposed");
                }
            }
        }
    }

    fn setup_reveal(document: &Document) {
        let Ok(node_list) = document.query_selector_all(".fade-in-up") else {
            return;
        };
        let mut elements = Vec::new();
        for i in 0..node_list.length() {
            if let Some(node) = node_list.item(i) {
                if let Ok(el) = node.dyn_into::<Element>() {
                    let _ = el.set_attribute("data-reveal", &elements.len().to_string());
                    elements.push(el);
                }
            }
        }
        if elements.is_empty() {
            return;
        }

        let mut scheduler = RevealScheduler::new();
        scheduler.register(0..elements.len() as u64, now_ms());
        log::info!("Reveal scheduler watching {} elements", elements.len());

        let reveal = Rc::new(RefCell::new(RevealDom {
            scheduler,
            elements,
            observer: None,
        }));

        // Commit the registration batch after the debounce window
        let reveal_for_flush = reveal.clone();
        set_timeout(SETUP_DEBOUNCE_MS as i32 + 1, move || {
            flush_registrations(&reveal_for_flush);
        });
    }

    fn flush_registrations(reveal: &Rc<RefCell<RevealDom>>) {
        let batch = reveal.borrow_mut().scheduler.flush(now_ms());
        if batch.is_empty() {
            return;
        }

        ensure_observer(reveal);

        let r = reveal.borrow();
        if let Some(observer) = &r.observer {
            for handle in batch {
                if let Some(el) = r.elements.get(handle as usize) {
                    observer.observe(el);
                }
            }
        }
    }

    fn ensure_observer(reveal: &Rc<RefCell<RevealDom>>) {
        if reveal.borrow().observer.is_some() {
            return;
        }

        let handler = {
            let reveal = reveal.clone();
            Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
                move |entries: js_sys::Array, _observer: IntersectionObserver| {
                    let mut visible = Vec::new();
                    for entry in entries.iter() {
                        let entry: IntersectionObserverEntry = entry.unchecked_into();
                        if !entry.is_intersecting() {
                            continue;
                        }
                        if let Some(handle) = entry
                            .target()
                            .get_attribute("data-reveal")
                            .and_then(|v| v.parse::<u64>().ok())
                        {
                            visible.push(handle);
                        }
                    }
                    if visible.is_empty() {
                        return;
                    }

                    let now = now_ms();
                    let taken = {
                        let mut r = reveal.borrow_mut();
                        let taken = r.scheduler.on_intersection(&visible, now);
                        for &handle in &taken {
                            r.reveal(handle);
                        }
                        taken
                    };

                    // Once the watch set drains, wake up after the last hold
                    // expires and tear the observer down
                    if !taken.is_empty() && reveal.borrow().scheduler.watched_len() == 0 {
                        if let Some(wakeup) = reveal.borrow().scheduler.next_wakeup() {
                            let reveal = reveal.clone();
                            let delay = (wakeup - now).max(0.0) as i32 + 1;
                            set_timeout(delay, move || {
                                let mut r = reveal.borrow_mut();
                                r.scheduler.in_flight(now_ms());
                                r.dispose_if_idle();
                            });
                        }
                    }
                },
            )
        };

        let options = IntersectionObserverInit::new();
        // Pre-trigger margin and a minimal threshold so reveals start just
        // before elements scroll in
        options.set_root_margin("50px 0px");
        options.set_threshold(&JsValue::from_f64(0.05));

        match IntersectionObserver::new_with_options(handler.as_ref().unchecked_ref(), &options) {
            Ok(observer) => {
                reveal.borrow_mut().observer = Some(observer);
                handler.forget();
            }
            Err(_) => {
                // No visibility signal: reveal everything immediately
                log::warn!("IntersectionObserver unavailable, revealing all elements");
                let mut r = reveal.borrow_mut();
                for el in &r.elements {
                    let _ = el.class_list().add_1("appear");
                }
                r.scheduler = RevealScheduler::new();
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Island Hopper starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let region = document.get_element_by_id("game").expect("no #game region");
        let character: HtmlElement = document
            .get_element_by_id("character")
            .expect("no #character")
            .dyn_into()
            .expect("#character is not an HtmlElement");
        let platform_layer = document
            .get_element_by_id("platforms")
            .expect("no #platforms layer");
        let cloud_layer = document
            .get_element_by_id("clouds")
            .expect("no #clouds layer");

        let best = HighScore::load();
        let seed = js_sys::Date::now() as u64;
        let state = GameState::new(seed, best.value);
        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            state,
            best,
            last_phase: GamePhase::Idle,
            visible: false,
            frame_id: None,
            view: View {
                document: document.clone(),
                character,
                platform_layer,
                cloud_layer,
                platform_nodes: Vec::new(),
                cloud_nodes: Vec::new(),
            },
        }));

        game.borrow_mut().render();

        setup_input_handlers(&region, &document, game.clone());
        setup_game_observer(&region, game);
        setup_reveal(&document);

        log::info!("Island Hopper running!");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_shell::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Island Hopper (native) starting...");
    log::info!("Native mode runs a headless demo - serve the wasm build for the real thing");

    demo_session();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Drive a scripted session through the sim and print how it went
#[cfg(not(target_arch = "wasm32"))]
fn demo_session() {
    use island_hopper::sim::{self, GamePhase, GameState};

    let mut state = GameState::new(42, 0);
    sim::start_session(&mut state);

    let mut ticks = 0u32;
    while state.phase == GamePhase::Running && ticks < 36_000 {
        if ticks % 45 == 0 {
            sim::try_jump(&mut state);
        }
        sim::tick(&mut state);
        ticks += 1;
    }

    println!(
        "Demo run ended after {} ticks with score {} (speed {:.2})",
        ticks,
        state.score_display(),
        state.game_speed
    );
    if let Ok(json) = serde_json::to_string(&state.player) {
        println!("Final player state: {json}");
    }
}
