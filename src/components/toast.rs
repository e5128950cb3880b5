use std::time::Duration;

use leptos::prelude::*;

const DISPLAY_FOR: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
	Error,
	Warning,
}

impl ToastKind {
	fn class(self) -> &'static str {
		match self {
			Self::Error => "toast toast-error",
			Self::Warning => "toast toast-warning",
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
	pub id: u64,
	pub kind: ToastKind,
	pub message: String,
}

/// Handle for raising notifications from anywhere in the app.
#[derive(Clone, Copy)]
pub struct Toasts {
	items: RwSignal<Vec<Toast>>,
	next_id: StoredValue<u64>,
}

impl Toasts {
	pub fn new() -> Self {
		Self {
			items: RwSignal::new(Vec::new()),
			next_id: StoredValue::new(0),
		}
	}

	pub fn error(&self, message: impl Into<String>) {
		self.push(ToastKind::Error, message.into());
	}

	pub fn warning(&self, message: impl Into<String>) {
		self.push(ToastKind::Warning, message.into());
	}

	pub fn dismiss(&self, id: u64) {
		self.items.update(|items| items.retain(|t| t.id != id));
	}

	fn push(&self, kind: ToastKind, message: String) {
		match kind {
			ToastKind::Error => log::error!("{message}"),
			ToastKind::Warning => log::warn!("{message}"),
		}
		let id = self.next_id.get_value();
		self.next_id.set_value(id + 1);
		self.items.update(|items| items.push(Toast { id, kind, message }));

		let toasts = *self;
		set_timeout(move || toasts.dismiss(id), DISPLAY_FOR);
	}
}

impl Default for Toasts {
	fn default() -> Self {
		Self::new()
	}
}

/// Stack of active notifications, newest last. Click one to dismiss it.
#[component]
pub fn ToastStack(toasts: Toasts) -> impl IntoView {
	view! {
		<div class="toast-stack">
			<For
				each=move || toasts.items.get()
				key=|toast| toast.id
				children=move |toast| {
					let id = toast.id;
					view! {
						<div class=toast.kind.class() on:click=move |_| toasts.dismiss(id)>
							{toast.message}
						</div>
					}
				}
			/>
		</div>
	}
}
