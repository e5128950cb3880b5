use leptos::ev::{Event, KeyboardEvent};
use leptos::prelude::*;

use super::associations::AssociationsDropdown;
use crate::explorer::{Explorer, Focus};
use crate::session::Session;

/// Header above the graph: description, key filter, page size and paging.
#[component]
pub fn Toolbar(session: Session) -> impl IntoView {
	let description = Memo::new(move |_| session.explorer.with(Explorer::description));
	let page = Memo::new(move |_| session.explorer.with(|e| e.page().cloned()));
	let group_focus = Memo::new(move |_| {
		session
			.explorer
			.with(|e| matches!(e.focus(), Some(Focus::FeatureGroup { .. })))
	});
	let busy = move || session.loading.with(Option::is_some);

	// Pagination and the key filter only apply to a feature group page.
	let filter_disabled = move || !group_focus.get() || busy();
	let prev = move || page.with(|p| p.as_ref().and_then(|p| p.prev_offset));
	let next = move || page.with(|p| p.as_ref().and_then(|p| p.next_offset));

	let on_key = move |ev: KeyboardEvent| {
		if ev.key() == "Enter" {
			session.reload_group(0);
		}
	};
	let on_page_size = move |ev: Event| match event_target_value(&ev).parse::<usize>() {
		Ok(size) => {
			session.page_size.set(size);
			session.reload_group(0);
		}
		Err(e) => log::warn!("Ignoring page size: {e}"),
	};

	view! {
		<header class="toolbar">
			<h2 class="description">{move || description.get()}</h2>
			<input
				class="key-filter"
				type="text"
				placeholder="Filter by key, press Enter"
				prop:value=move || session.filter_key.get()
				prop:disabled=filter_disabled
				on:input=move |ev| session.filter_key.set(event_target_value(&ev))
				on:keydown=on_key
			/>
			<select
				class="page-size"
				prop:value=move || session.page_size.get().to_string()
				on:change=on_page_size
			>
				{session
					.page_sizes()
					.into_iter()
					.map(|size| view! { <option value=size.to_string()>{size}</option> })
					.collect_view()}
			</select>
			<div class="pagination">
				<button
					prop:disabled=move || busy() || prev().is_none()
					on:click=move |_| {
						if let Some(offset) = prev() {
							session.reload_group(offset);
						}
					}
				>
					"‹"
				</button>
				<span class="pagination-text">
					{move || page.with(|p| p.as_ref().map(|p| p.text()).unwrap_or_default())}
				</span>
				<button
					prop:disabled=move || busy() || next().is_none()
					on:click=move |_| {
						if let Some(offset) = next() {
							session.reload_group(offset);
						}
					}
				>
					"›"
				</button>
			</div>
			<AssociationsDropdown session=session />
		</header>
	}
}
