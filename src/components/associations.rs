use leptos::prelude::*;

use crate::session::Session;

/// Checkbox menu showing or hiding each association group of the focused
/// graph, with a master toggle on top.
#[component]
pub fn AssociationsDropdown(session: Session) -> impl IntoView {
	let open = RwSignal::new(false);
	let groups = Memo::new(move |_| {
		session.explorer.with(|e| {
			e.filter()
				.groups()
				.iter()
				.map(|g| (g.name.clone(), g.selected))
				.collect::<Vec<_>>()
		})
	});
	let all_selected = Memo::new(move |_| session.explorer.with(|e| e.filter().all_selected()));

	view! {
		<Show when=move || !groups.with(Vec::is_empty)>
			<div class="associations">
				<button class="associations-toggle" on:click=move |_| open.update(|o| *o = !*o)>
					{move || format!("Associations ({})", groups.with(Vec::len))}
				</button>
				<Show when=move || open.get()>
					<ul class="associations-menu">
						<li class="associations-all">
							<label>
								<input
									type="checkbox"
									prop:checked=move || all_selected.get()
									on:change=move |_| session.toggle_all_groups()
								/>
								"All associations"
							</label>
						</li>
						<For
							each=move || groups.get()
							key=|group| group.clone()
							children=move |(name, selected)| {
								let toggled = name.clone();
								view! {
									<li>
										<label>
											<input
												type="checkbox"
												prop:checked=selected
												on:change=move |_| session.toggle_group(&toggled)
											/>
											{name}
										</label>
									</li>
								}
							}
						/>
					</ul>
				</Show>
			</div>
		</Show>
	}
}
