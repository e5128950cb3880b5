use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::DefaultNodeIdx;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{ForceGraphState, LayoutEdge, NODE_RADIUS};
use crate::config::Shape;
use crate::graph::Arrow;

const EDGE_RGB: &str = "100, 180, 255";
const BROKEN_RGB: &str = "255, 110, 110";

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	let positions = state.positions();
	draw_edges(state, &positions, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(
	state: &ForceGraphState,
	positions: &HashMap<DefaultNodeIdx, (f64, f64)>,
	ctx: &CanvasRenderingContext2d,
) {
	let k = state.transform.k;
	let (line_width, dash, gap, arrow_size) = (1.5 / k, 8.0 / k, 4.0 / k, 8.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.highlight_t);

	for edge in &state.edges {
		let (Some(&(x1, y1)), Some(&(x2, y2))) =
			(positions.get(&edge.source), positions.get(&edge.target))
		else {
			continue;
		};
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		let is_highlighted =
			state.is_highlighted(edge.source) && state.is_highlighted(edge.target);

		// t=0: all edges at base (0.6), t=1: highlighted at 0.9, others at 0.15
		let (edge_alpha, arrow_alpha, width) = if is_highlighted {
			(0.6 + 0.3 * t, 0.8 + 0.1 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, 0.8 - 0.45 * t, line_width * (1.0 - 0.3 * t))
		};
		let rgb = if edge.dashed { BROKEN_RGB } else { EDGE_RGB };

		ctx.set_stroke_style_str(&format!("rgba({rgb}, {edge_alpha})"));
		ctx.set_line_width(width);
		if edge.dashed {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(dash_offset);
		}

		let (ux, uy) = (dx / dist, dy / dist);
		let head = |arrow: Arrow| if edge.arrow == arrow { arrow_size } else { 0.0 };
		ctx.begin_path();
		ctx.move_to(
			x1 + ux * (NODE_RADIUS + head(Arrow::From)),
			y1 + uy * (NODE_RADIUS + head(Arrow::From)),
		);
		ctx.line_to(
			x2 - ux * (NODE_RADIUS + head(Arrow::To)),
			y2 - uy * (NODE_RADIUS + head(Arrow::To)),
		);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		ctx.set_fill_style_str(&format!("rgba({rgb}, {arrow_alpha})"));
		match edge.arrow {
			Arrow::To => draw_arrow_head(ctx, (x2, y2), (ux, uy), arrow_size),
			Arrow::From => draw_arrow_head(ctx, (x1, y1), (-ux, -uy), arrow_size),
			Arrow::None => {}
		}

		if k > 0.6 || is_highlighted {
			draw_edge_label(ctx, edge, ((x1 + x2) / 2.0, (y1 + y2) / 2.0), edge_alpha, k);
		}
	}
}

// `tip` is the node centre the arrow points into, `(ux, uy)` the unit
// direction of travel.
fn draw_arrow_head(
	ctx: &CanvasRenderingContext2d,
	tip: (f64, f64),
	(ux, uy): (f64, f64),
	arrow_size: f64,
) {
	let (tip_x, tip_y) = (tip.0 - ux * NODE_RADIUS, tip.1 - uy * NODE_RADIUS);
	let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
	let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
	ctx.begin_path();
	ctx.move_to(tip_x, tip_y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_edge_label(
	ctx: &CanvasRenderingContext2d,
	edge: &LayoutEdge,
	(x, y): (f64, f64),
	alpha: f64,
	k: f64,
) {
	if edge.label.is_empty() {
		return;
	}
	ctx.set_fill_style_str(&format!("rgba(200, 210, 230, {})", alpha));
	ctx.set_font(&format!("{}px sans-serif", 8.0 / k.max(0.5)));
	ctx.set_text_align("center");
	let _ = ctx.fill_text(&edge.label, x, y - 2.0 / k);
	ctx.set_text_align("start");
}

fn polygon(ctx: &CanvasRenderingContext2d, (x, y): (f64, f64), r: f64, sides: u32, rotation: f64) {
	for i in 0..sides {
		let angle = rotation + (i as f64) * 2.0 * PI / sides as f64;
		let (px, py) = (x + r * angle.cos(), y + r * angle.sin());
		if i == 0 {
			ctx.move_to(px, py);
		} else {
			ctx.line_to(px, py);
		}
	}
	ctx.close_path();
}

/// Traces the outline of `shape` centred on `(x, y)`; the caller fills.
fn trace_shape(ctx: &CanvasRenderingContext2d, shape: Shape, (x, y): (f64, f64), r: f64) {
	ctx.begin_path();
	match shape {
		Shape::Dot => {
			let _ = ctx.arc(x, y, r, 0.0, 2.0 * PI);
		}
		Shape::Ellipse => {
			let _ = ctx.ellipse(x, y, r * 1.5, r * 0.9, 0.0, 0.0, 2.0 * PI);
		}
		Shape::Box => ctx.rect(x - r * 1.4, y - r * 0.9, r * 2.8, r * 1.8),
		Shape::Square | Shape::Image => ctx.rect(x - r, y - r, r * 2.0, r * 2.0),
		Shape::Triangle => polygon(ctx, (x, y), r * 1.2, 3, -PI / 2.0),
		Shape::TriangleDown => polygon(ctx, (x, y), r * 1.2, 3, PI / 2.0),
		Shape::Diamond => polygon(ctx, (x, y), r * 1.25, 4, 0.0),
		Shape::Hexagon => polygon(ctx, (x, y), r * 1.1, 6, 0.0),
		Shape::Star => {
			for i in 0..10 {
				let angle = -PI / 2.0 + (i as f64) * PI / 5.0;
				let radius = if i % 2 == 0 { r * 1.5 } else { r * 0.65 };
				let (px, py) = (x + radius * angle.cos(), y + radius * angle.sin());
				if i == 0 {
					ctx.move_to(px, py);
				} else {
					ctx.line_to(px, py);
				}
			}
			ctx.close_path();
		}
	}
}

fn draw_label(ctx: &CanvasRenderingContext2d, label: &str, (x, y): (f64, f64), radius: f64, k: f64) {
	ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
	let _ = ctx.fill_text(label, x + radius + 4.0, y + 3.0);
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if has_highlight && state.is_highlighted(idx) {
			return;
		}
		let (x, y) = (node.x() as f64, node.y() as f64);
		let (alpha, radius) = (1.0 - 0.7 * t, NODE_RADIUS * (1.0 - 0.15 * t));
		let info = &node.data.user_data;

		ctx.set_global_alpha(alpha);
		trace_shape(ctx, info.shape, (x, y), radius);
		ctx.set_fill_style_str(&info.color);
		ctx.fill();
		ctx.set_global_alpha(1.0);

		ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", alpha * 0.8));
		draw_label(ctx, &info.label, (x, y), radius, k);
	});

	if !has_highlight {
		return;
	}

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if !state.is_highlighted(idx) {
			return;
		}
		let (x, y) = (node.x() as f64, node.y() as f64);
		let info = &node.data.user_data;
		let is_hovered = state.is_hovered(idx);
		let is_neighbor =
			state.hover.neighbors.contains(&idx) || state.hover.prev_neighbors.contains(&idx);

		let (radius, glow_radius) = if is_hovered {
			(
				NODE_RADIUS * (1.0 + 0.35 * t),
				NODE_RADIUS * (1.8 + 1.2 * t),
			)
		} else if is_neighbor {
			(NODE_RADIUS * (1.0 + 0.2 * t), NODE_RADIUS * (1.4 + 0.6 * t))
		} else {
			(NODE_RADIUS, 0.0)
		};

		if glow_radius > 0.0 && t > 0.01 {
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius)
			{
				let alpha = if is_hovered { 0.35 * t } else { 0.2 * t };
				let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {})", alpha));
				let _ = gradient
					.add_color_stop(0.6, &format!("rgba(200, 220, 255, {})", alpha * 0.3));
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		trace_shape(ctx, info.shape, (x, y), radius);
		ctx.set_fill_style_str(&info.color);
		ctx.fill();

		if is_hovered && t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius * 1.5 + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		ctx.set_fill_style_str(if info.is_ghost { "#ff9a9a" } else { "white" });
		draw_label(ctx, &info.label, (x, y), radius, k);
	});
}
