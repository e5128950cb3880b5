use leptos::prelude::*;

use crate::api::NodeId;
use crate::components::force_graph::{ForceGraphCanvas, Hovered};
use crate::components::popup::NodePopup;
use crate::components::sidebar::Sidebar;
use crate::components::toast::{ToastStack, Toasts};
use crate::components::toolbar::Toolbar;
use crate::config::AppConfig;
use crate::session::Session;

/// The explorer: dataset side panel, toolbar and the graph canvas.
#[component]
pub fn Home() -> impl IntoView {
	let config = use_context::<AppConfig>().unwrap_or_else(AppConfig::load);
	let toasts = Toasts::new();
	let session = Session::new(config, toasts);
	session.load_datasets();

	let hovered = RwSignal::new(Option::<Hovered>::None);
	let graph_view = Signal::derive(move || session.explorer.with(|e| e.view().clone()));
	let on_expand = Callback::new(move |id: NodeId| session.expand_feature(id));
	let on_focus = Callback::new(move |id: NodeId| {
		hovered.set(None);
		session.focus_feature(id);
	});

	view! {
		<div class="fullscreen-graph">
			<ForceGraphCanvas
				view=graph_view
				on_expand=on_expand
				on_focus=on_focus
				hovered=hovered
				fullscreen=true
			/>
			<Sidebar session=session />
			<div class="graph-overlay">
				<Toolbar session=session />
				<Show when=move || session.explorer.with(|e| e.view().is_empty())>
					<p class="subtitle">
						"Pick a feature group. Click a node to expand it, double-click or right-click to focus it."
					</p>
				</Show>
			</div>
			<NodePopup session=session hovered=hovered />
			<ToastStack toasts=toasts />
		</div>
	}
}
