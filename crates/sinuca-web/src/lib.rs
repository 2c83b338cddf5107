//! WASM exports for the pool table. The page calls `game_init` once, then
//! `game_tick` from its animation frame, forwards pointer and power input, and
//! reads the snapshot through the pointer accessors after each tick.

pub mod runner;

pub use runner::MatchRunner;

use std::cell::RefCell;

use sinuca_engine::InputEvent;
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<MatchRunner>> = RefCell::new(None);
}

/// Run `f` against the live runner. Before `game_init` or after
/// `game_teardown` there is none and calls are no-ops.
fn with_runner<R>(f: impl FnOnce(&mut MatchRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| cell.borrow_mut().as_mut().map(f))
}

fn push(event: InputEvent) {
    if with_runner(|r| r.push_input(event)).is_none() {
        log::debug!("{:?} dropped: no match running", event);
    }
}

/// Start a match. `config_json` is a table config (`{"preset": "arcade"}`,
/// overrides allowed) or an empty string for the classic table.
#[wasm_bindgen]
pub fn game_init(config_json: &str) {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let runner = MatchRunner::from_json(config_json);
    let table = runner.session().table();
    log::info!("sinuca: initialized {}x{} table", table.width, table.height);

    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });
}

#[wasm_bindgen]
pub fn game_tick(dt: f32) {
    with_runner(|r| r.tick(dt));
}

/// Cancel the loop and drop the match. Safe to call twice.
#[wasm_bindgen]
pub fn game_teardown() {
    let runner = RUNNER.with(|cell| cell.borrow_mut().take());
    if let Some(mut runner) = runner {
        runner.teardown();
    }
}

// ---- Input ----

#[wasm_bindgen]
pub fn game_pointer_move(x: f32, y: f32) {
    push(InputEvent::PointerMove { x, y });
}

#[wasm_bindgen]
pub fn game_pointer_down(x: f32, y: f32) {
    push(InputEvent::PointerDown { x, y });
}

#[wasm_bindgen]
pub fn game_pointer_up(x: f32, y: f32) {
    push(InputEvent::PointerUp { x, y });
}

#[wasm_bindgen]
pub fn game_set_power(value: f32) {
    push(InputEvent::SetPower { value });
}

#[wasm_bindgen]
pub fn game_adjust_power(delta: f32) {
    push(InputEvent::AdjustPower { delta });
}

#[wasm_bindgen]
pub fn game_shoot() {
    push(InputEvent::Shoot);
}

#[wasm_bindgen]
pub fn game_rack() {
    push(InputEvent::Rack);
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_header_ptr() -> *const f32 {
    with_runner(|r| r.header_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_balls_ptr() -> *const f32 {
    with_runner(|r| r.balls_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_ball_count() -> u32 {
    with_runner(|r| r.ball_count()).unwrap_or_default()
}

#[wasm_bindgen]
pub fn get_game_events_ptr() -> *const f32 {
    with_runner(|r| r.events_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_game_events_len() -> u32 {
    with_runner(|r| r.event_count()).unwrap_or_default()
}

#[wasm_bindgen]
pub fn get_buffer_total_floats() -> u32 {
    with_runner(|r| r.buffer_total_floats()).unwrap_or_default()
}

#[wasm_bindgen]
pub fn get_table_width() -> f32 {
    with_runner(|r| r.table_width()).unwrap_or_default()
}

#[wasm_bindgen]
pub fn get_table_height() -> f32 {
    with_runner(|r| r.table_height()).unwrap_or_default()
}

/// Copy of the whole snapshot in protocol layout, for hosts that cannot
/// read wasm memory directly (workers without a shared buffer).
#[wasm_bindgen]
pub fn get_snapshot() -> js_sys::Float32Array {
    let floats = with_runner(|r| r.snapshot().to_floats()).unwrap_or_default();
    js_sys::Float32Array::from(&floats[..])
}

/// Aim guide segment `[x0, y0, x1, y1]`; empty while no shot can be taken.
#[wasm_bindgen]
pub fn get_aim_guide(length: f32) -> js_sys::Float32Array {
    let guide = with_runner(|r| r.aim_guide(length)).unwrap_or_default();
    js_sys::Float32Array::from(&guide[..])
}
