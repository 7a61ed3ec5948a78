use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, info, warn};
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

use super::config::{Dimension, OrbitConfig, Theme};
use super::expansion::{CLOSE_MS, EXPAND_MS};
use super::interaction::{CLICK_COOLDOWN_MS, GraphEvent};
use super::render;
use super::state::SimulationContext;
use super::stats::NetworkStats;
use super::surface::backing_size;
use super::types::GraphData;
use crate::util::{Debounce, FrameScheduler, Vec2};

type SharedState = Rc<RefCell<Option<SimulationContext>>>;
type Slot<T> = Rc<RefCell<Option<T>>>;

const STATS_EVERY_FRAMES: u64 = 30;
const RESIZE_QUIET_MS: f64 = 100.0;
const FALLBACK_SIZE: (f64, f64) = (800.0, 600.0);

fn now_ms() -> f64 {
	web_sys::window()
		.and_then(|w| w.performance())
		.map(|p| p.now())
		.unwrap_or_else(js_sys::Date::now)
}

fn device_pixel_ratio() -> f64 {
	web_sys::window()
		.map(|w| w.device_pixel_ratio())
		.filter(|r| r.is_finite() && *r > 0.0)
		.unwrap_or(1.0)
}

/// Pointer position in display pixels, measured against the canvas' current
/// bounding box on every event.
fn pointer_pos(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> Vec2 {
	let rect = canvas.get_bounding_client_rect();
	Vec2::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

fn display_size(canvas: &HtmlCanvasElement, config: &OrbitConfig) -> (f64, f64) {
	let (pw, ph) = canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|(w, h)| *w > 0.0 && *h > 0.0)
		.unwrap_or(FALLBACK_SIZE);
	(
		config.width.resolve(pw).max(1.0),
		config.height.resolve(ph).max(1.0),
	)
}

/// Sizes the backing buffer for the device pixel ratio and scales the
/// context once so drawing stays in display pixels.
fn fit_canvas(canvas: &HtmlCanvasElement, ctx: &CanvasRenderingContext2d, width: f64, height: f64) {
	let dpr = device_pixel_ratio();
	let (bw, bh) = backing_size(width, height, dpr);
	canvas.set_width(bw);
	canvas.set_height(bh);
	let style = web_sys::HtmlElement::style(canvas);
	let _ = style.set_property("width", &format!("{width}px"));
	let _ = style.set_property("height", &format!("{height}px"));
	let _ = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
}

fn emit(on_event: Option<Callback<GraphEvent>>, events: Vec<GraphEvent>) {
	for event in events {
		debug!("graph event: {event:?}");
		if let Some(cb) = on_event {
			cb.run(event);
		}
	}
}

/// One-shot timer that advances gesture timers. It holds only a weak handle,
/// so it does nothing once the component is gone.
fn schedule_advance(state: &SharedState, delay_ms: f64, on_event: Option<Callback<GraphEvent>>) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let weak = Rc::downgrade(state);
	let cb = Closure::once_into_js(move || {
		let Some(state) = weak.upgrade() else {
			return;
		};
		let events = match state.try_borrow_mut() {
			Ok(mut guard) => match guard.as_mut() {
				Some(s) => s.gesture.advance(now_ms()),
				None => return,
			},
			Err(_) => return,
		};
		emit(on_event, events);
	});
	let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
		cb.unchecked_ref(),
		delay_ms.ceil() as i32,
	);
}

#[component]
pub fn OrbitGraphCanvas(
	data: GraphData,
	#[prop(optional)] config: Option<OrbitConfig>,
	#[prop(optional, into)] on_event: Option<Callback<GraphEvent>>,
) -> impl IntoView {
	let config = config.unwrap_or_default();
	let show_stats = config.show_stats;
	let theme = match config.theme {
		Theme::Dark => "dark",
		Theme::Light => "light",
	};
	let fluid = matches!(config.width, Dimension::Percent(_))
		|| matches!(config.height, Dimension::Percent(_));

	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let stats = RwSignal::new((NetworkStats::default(), 0.0_f64));
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: Slot<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let resize_cb: Slot<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let click_capture: Slot<Closure<dyn FnMut(MouseEvent)>> = Rc::new(RefCell::new(None));
	let mounted_canvas: Slot<HtmlCanvasElement> = Rc::new(RefCell::new(None));
	let frame_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
	let resize_pending = Rc::new(RefCell::new(Debounce::new(RESIZE_QUIET_MS)));

	let (state_init, animate_init, resize_cb_init, capture_init, mounted_init, frame_init, pending_init) = (
		state.clone(),
		animate.clone(),
		resize_cb.clone(),
		click_capture.clone(),
		mounted_canvas.clone(),
		frame_id.clone(),
		resize_pending.clone(),
	);

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if state_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("2d canvas context unavailable, orbit graph disabled");
			return;
		};

		let (w, h) = display_size(&canvas, &config);
		fit_canvas(&canvas, &ctx, w, h);
		*state_init.borrow_mut() = Some(SimulationContext::new(&data, config.clone(), w, h));
		*mounted_init.borrow_mut() = Some(canvas.clone());

		// Capture phase runs before the bubbling handler below and before
		// Leptos' delegated listener, so a trailing post-drag click never
		// reaches either.
		let state_cap = state_init.clone();
		let capture = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
			let swallow = state_cap
				.borrow_mut()
				.as_mut()
				.is_some_and(|s| s.gesture.intercept_click(now_ms()));
			if swallow {
				ev.prevent_default();
				ev.stop_immediate_propagation();
				debug!("suppressed click after drag");
			}
		});
		let _ = canvas.add_event_listener_with_callback_and_bool(
			"click",
			capture.as_ref().unchecked_ref(),
			true,
		);
		*capture_init.borrow_mut() = Some(capture);

		if fluid {
			let pending = pending_init.clone();
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				pending.borrow_mut().trigger(now_ms());
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner, frame_anim, pending_anim) = (
			state_init.clone(),
			animate_init.clone(),
			frame_init.clone(),
			pending_init.clone(),
		);
		let config_anim = config.clone();
		let mut scheduler = FrameScheduler::default();
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let now = now_ms();
			let timing = scheduler.begin_frame(now);
			let events = {
				let mut guard = state_anim.borrow_mut();
				let Some(s) = guard.as_mut() else {
					return;
				};
				if pending_anim.borrow_mut().poll(now) {
					let (w, h) = display_size(&canvas, &config_anim);
					fit_canvas(&canvas, &ctx, w, h);
					s.resize(w, h);
				}
				let events = s.tick(now);
				render::render(s, &ctx, now);
				if show_stats && scheduler.frames() % STATS_EVERY_FRAMES == 0 {
					stats.set((NetworkStats::collect(&s.nodes), timing.fps));
					if timing.over_budget {
						debug!("slow frame: {:.1} ms", timing.dt_ms);
					}
				}
				events
			};
			emit(on_event, events);

			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				frame_anim.set(win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			frame_init.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let pos = pointer_pos(&canvas, &ev);
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(pos);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let pos = pointer_pos(&canvas, &ev);
		let hint = match *state_mm.borrow_mut() {
			Some(ref mut s) => s.pointer_move(pos, now_ms()),
			None => return,
		};
		let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", hint.css());
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		let dragged = match *state_mu.borrow_mut() {
			Some(ref mut s) => {
				let dragged = s.gesture.drag.has_dragged_distance;
				s.pointer_up(now_ms());
				dragged
			}
			None => return,
		};
		if dragged {
			schedule_advance(&state_mu, CLICK_COOLDOWN_MS + 1.0, on_event);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_leave(now_ms());
		}
	};

	let state_cl = state.clone();
	let on_click = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let pos = pointer_pos(&canvas, &ev);
		let events = match *state_cl.borrow_mut() {
			Some(ref mut s) => s.click(pos, now_ms()),
			None => return,
		};
		schedule_advance(&state_cl, EXPAND_MS + 1.0, on_event);
		schedule_advance(&state_cl, EXPAND_MS + CLOSE_MS + 1.0, on_event);
		emit(on_event, events);
	};

	let state_dbl = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let pos = pointer_pos(&canvas, &ev);
		let event = match *state_dbl.borrow_mut() {
			Some(ref mut s) if s.hit(pos).is_none() => s.recenter(),
			_ => return,
		};
		emit(on_event, vec![event]);
	};

	let state_rc = state.clone();
	let on_recenter = move |_: MouseEvent| {
		let event = match *state_rc.borrow_mut() {
			Some(ref mut s) => s.recenter(),
			None => return,
		};
		emit(on_event, vec![event]);
	};

	let teardown = SendWrapper::new((
		state,
		animate,
		frame_id,
		resize_cb,
		click_capture,
		mounted_canvas,
	));
	on_cleanup(move || {
		let (state, animate, frame_id, resize_cb, click_capture, mounted_canvas) = teardown.take();
		if let Some(window) = web_sys::window() {
			if let Some(id) = frame_id.take() {
				let _ = window.cancel_animation_frame(id);
			}
			if let Some(cb) = resize_cb.borrow_mut().take() {
				let _ = window
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		if let (Some(canvas), Some(cb)) =
			(mounted_canvas.borrow_mut().take(), click_capture.borrow_mut().take())
		{
			let _ = canvas.remove_event_listener_with_callback_and_bool(
				"click",
				cb.as_ref().unchecked_ref(),
				true,
			);
		}
		animate.borrow_mut().take();
		state.borrow_mut().take();
		info!("orbit graph unmounted");
	});

	view! {
		<div class="orbit-graph" data-theme=theme>
			<canvas
				node_ref=canvas_ref
				class="orbit-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:click=on_click
				on:dblclick=on_dblclick
				style="display: block; cursor: default;"
			/>
			<button class="orbit-recenter" on:click=on_recenter>
				"Recenter"
			</button>
			{show_stats.then(|| view! { <StatsPanel stats=stats /> })}
		</div>
	}
}

#[component]
fn StatsPanel(stats: RwSignal<(NetworkStats, f64)>) -> impl IntoView {
	view! {
		<div class="orbit-stats">
			<div>
				"Peers: "
				{move || stats.with(|(s, _)| format!("{}/{}", s.active_peers, s.total_peers))}
			</div>
			<div>
				"Bandwidth: "
				{move || stats.with(|(s, _)| format!("{:.1} MB/s", s.total_bandwidth))}
			</div>
			<div>
				"Latency: "
				{move || stats.with(|(s, _)| format!("{:.0} ms", s.average_latency))}
			</div>
			<div>
				"Health: " {move || stats.with(|(s, _)| format!("{:.0}%", s.health))}
			</div>
			<div class="orbit-fps">{move || stats.with(|(_, fps)| format!("{fps:.0} fps"))}</div>
		</div>
	}
}
