/// Handle identifying one in-flight request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

impl Ticket {
	pub fn generation(self) -> u64 {
		self.0
	}
}

/// Supersedes in-flight requests: only the most recent ticket may apply its
/// response, so a slow earlier reply can't overwrite a newer view.
#[derive(Debug, Default)]
pub struct RequestTracker {
	latest: u64,
}

impl RequestTracker {
	pub fn begin(&mut self) -> Ticket {
		self.latest += 1;
		Ticket(self.latest)
	}

	pub fn is_current(&self, ticket: Ticket) -> bool {
		ticket.0 == self.latest
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn newer_ticket_supersedes_older() {
		let mut tracker = RequestTracker::default();
		let first = tracker.begin();
		assert!(tracker.is_current(first));

		let second = tracker.begin();
		assert!(!tracker.is_current(first));
		assert!(tracker.is_current(second));
		assert!(second.generation() > first.generation());
	}
}
