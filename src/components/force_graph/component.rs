use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::state::ForceGraphState;
use super::types::Hovered;
use crate::api::NodeId;
use crate::graph::GraphView;

type SharedState = Rc<RefCell<Option<ForceGraphState>>>;

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

// Window size when fullscreen, otherwise the size of the parent element.
fn canvas_size(window: &Window, canvas: &HtmlCanvasElement, fullscreen: bool) -> (f64, f64) {
	let size = if fullscreen {
		window_size(window)
	} else {
		canvas
			.parent_element()
			.map(|p| (p.client_width() as f64, p.client_height() as f64))
	};
	size.unwrap_or((800.0, 600.0))
}

// The second press of a double click is left to the dblclick handler.
fn is_single_click(detail: i32) -> bool {
	detail <= 1
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Canvas rendering a [`GraphView`] with a force-directed layout.
///
/// A click on a node (without dragging) calls `on_expand`; a double click or
/// context-menu click calls `on_focus` without expanding a second time.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] view: Signal<GraphView>,
	on_expand: Callback<NodeId>,
	on_focus: Callback<NodeId>,
	hovered: RwSignal<Option<Hovered>>,
	#[prop(default = false)] fullscreen: bool,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = canvas_size(&window, &canvas, fullscreen);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("Canvas 2d context unavailable");
			return;
		};
		*state_init.borrow_mut() = Some(view.with_untracked(|v| ForceGraphState::new(v, w, h)));

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if s.animation_running {
					s.tick(0.016);
				}
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// Follow the view through merges, removals and refocus.
	let state_sync = state.clone();
	Effect::new(move |_| {
		view.with(|v| {
			if let Some(ref mut s) = *state_sync.borrow_mut() {
				s.sync(v);
			}
		});
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let (Some((x, y)), Some(s)) = (pointer(canvas_ref, &ev), &mut *state_md.borrow_mut()) {
			s.press(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		let Some(id) = state_mm.borrow_mut().as_mut().map(|s| s.pointer_move(x, y)) else {
			return;
		};
		let next = id.map(|id| Hovered { id, x, y });
		if hovered.with_untracked(|h| h.as_ref().map(|h| &h.id) != next.as_ref().map(|n| &n.id)) {
			hovered.set(next);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let clicked = state_mu.borrow_mut().as_mut().and_then(ForceGraphState::release);
		// Run after the borrow ends: the callback may resync this state.
		if let Some(id) = clicked.filter(|_| is_single_click(ev.detail())) {
			on_expand.run(id);
		}
	};

	let state_dc = state.clone();
	let focus_at = move |ev: MouseEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		let target = state_dc
			.borrow()
			.as_ref()
			.and_then(|s| s.node_at_position(x, y).and_then(|idx| s.node_id(idx)));
		if let Some(id) = target {
			on_focus.run(id);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(s) = state_ml.borrow_mut().as_mut() {
			s.leave();
		}
		hovered.set(None);
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let (Some((x, y)), Some(s)) = (pointer(canvas_ref, &ev), &mut *state_wh.borrow_mut()) {
			s.zoom_at(x, y, ev.delta_y() < 0.0);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=focus_at.clone()
			on:contextmenu=focus_at
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn only_the_first_press_of_a_double_click_expands() {
		assert!(is_single_click(0));
		assert!(is_single_click(1));
		assert!(!is_single_click(2));
		assert!(!is_single_click(3));
	}
}
