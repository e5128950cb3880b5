use leptos::ev::Event;
use leptos::prelude::*;
use web_sys::HtmlInputElement;

use crate::session::{Session, total_features, visible_groups};

/// Dataset picker, upload, progress and the feature group list.
#[component]
pub fn Sidebar(session: Session) -> impl IntoView {
	let groups = Memo::new(move |_| {
		let only_broken = session.only_broken.get();
		session
			.feature_groups
			.with(|groups| visible_groups(groups, only_broken))
	});
	let title = move || {
		session.feature_groups.with(|groups| {
			if groups.is_empty() {
				"No features yet".to_owned()
			} else {
				format!("Features ({})", total_features(groups))
			}
		})
	};
	// Only offered once the dataset has been processed.
	let skeleton = move || {
		if session.feature_groups.with(Vec::is_empty) {
			return None;
		}
		session.skeleton_url()
	};

	let on_upload = move |ev: Event| {
		let input: HtmlInputElement = event_target(&ev);
		let Some(file) = input.files().and_then(|files| files.get(0)) else {
			return;
		};
		input.set_value("");
		session.upload(file);
	};

	view! {
		<aside class="sidebar">
			<section class="datasets">
				<h3>"Datasets"</h3>
				<ul>
					<For
						each=move || session.datasets.get()
						key=|dataset| dataset.dataset_id.clone()
						children=move |dataset| {
							let (id, label) = (dataset.dataset_id.clone(), dataset.dataset_name.clone());
							let is_active = move || {
								session
									.dataset
									.with(|d| d.as_ref().is_some_and(|d| d.dataset_id == id))
							};
							view! {
								<li class="dataset" class:active=is_active on:click=move |_| session.open_dataset(dataset.clone())>
									{label}
								</li>
							}
						}
					/>
				</ul>
				<label class="upload">
					"Upload AIXM"
					<input type="file" accept=".xml" on:change=on_upload />
				</label>
			</section>

			<Show when=move || session.loading.with(Option::is_some)>
				<div class="progress">
					<div class="progress-bar" />
					<span>{move || session.loading.get().unwrap_or_default()}</span>
				</div>
			</Show>

			<section class="feature-groups">
				<h3>{title}</h3>
				<label class="only-broken">
					<input
						type="checkbox"
						prop:checked=move || session.only_broken.get()
						on:change=move |ev| session.only_broken.set(event_target_checked(&ev))
					/>
					"Only with broken xlinks"
				</label>
				<ul>
					<For
						each=move || groups.get()
						key=|group| (group.name.clone(), group.size)
						children=move |group| {
							let name = group.name.clone();
							let is_selected = {
								let name = name.clone();
								move || session.selected_group.with(|s| s.as_deref() == Some(name.as_str()))
							};
							let (status, icon) = if group.has_broken_xlinks() {
								("status broken", "⚠")
							} else {
								("status ok", "✓")
							};
							view! {
								<li class="feature-group" class:active=is_selected on:click=move |_| session.select_group(name.clone())>
									{format!("({}) {}", group.size, group.name)}
									<span class=status>{icon}</span>
								</li>
							}
						}
					/>
				</ul>
			</section>

			<footer class="skeleton">
				{move || match skeleton() {
					Some(url) => view! { <a href=url download="">"Download skeleton"</a> }.into_any(),
					None => view! { <span class="disabled">"Skeleton not available"</span> }.into_any(),
				}}
			</footer>
		</aside>
	}
}
