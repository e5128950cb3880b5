use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen_futures::JsFuture;

use super::force_graph::Hovered;
use crate::graph::ViewNode;
use crate::session::Session;

fn is_copy_shortcut(key: &str, ctrl: bool, alt: bool) -> bool {
	ctrl && !alt && key.eq_ignore_ascii_case("c")
}

fn copy_to_clipboard(text: String) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let pending = JsFuture::from(window.navigator().clipboard().write_text(&text));
	spawn_local(async move {
		match pending.await {
			Ok(_) => log::info!("Copied {text} to the clipboard"),
			Err(e) => log::warn!("Clipboard write failed: {e:?}"),
		}
	});
}

/// Details table for the node under the pointer. Ctrl-C copies its id.
#[component]
pub fn NodePopup(session: Session, hovered: RwSignal<Option<Hovered>>) -> impl IntoView {
	let keys = window_event_listener(ev::keydown, move |ev| {
		if !is_copy_shortcut(&ev.key(), ev.ctrl_key(), ev.alt_key()) {
			return;
		}
		if let Some(id) = hovered.with_untracked(|h| h.as_ref().map(|h| h.id.clone())) {
			copy_to_clipboard(id);
		}
	});
	on_cleanup(move || keys.remove());

	let rows = Memo::new(move |_| {
		let id = hovered.with(|h| h.as_ref().map(|h| h.id.clone()))?;
		session
			.explorer
			.with(|e| e.view().node(&id).map(ViewNode::popup_rows))
	});
	let position = move || {
		hovered.with(|h| {
			h.as_ref()
				.map(|h| format!("left: {}px; top: {}px;", h.x + 16.0, h.y + 16.0))
				.unwrap_or_default()
		})
	};

	view! {
		<Show when=move || rows.with(Option::is_some)>
			<table class="node-popup" style=position>
				{move || {
					rows.get()
						.unwrap_or_default()
						.into_iter()
						.enumerate()
						.map(|(i, (name, value))| {
							if i == 0 {
								view! {
									<tr>
										<th colspan="2">{name}</th>
									</tr>
								}
									.into_any()
							} else {
								view! {
									<tr>
										<td>
											<strong>{name}</strong>
										</td>
										<td>{value}</td>
									</tr>
								}
									.into_any()
							}
						})
						.collect_view()
				}}
			</table>
		</Show>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ctrl_c_is_the_copy_shortcut() {
		assert!(is_copy_shortcut("c", true, false));
		assert!(is_copy_shortcut("C", true, false));
		assert!(!is_copy_shortcut("c", false, false));
		assert!(!is_copy_shortcut("c", true, true));
		assert!(!is_copy_shortcut("v", true, false));
	}
}
