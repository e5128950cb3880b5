/// Position of the current feature group page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageInfo {
	pub offset: usize,
	pub limit: usize,
	pub total: usize,
	pub prev_offset: Option<usize>,
	pub next_offset: Option<usize>,
}

impl PageInfo {
	pub fn new(offset: usize, limit: usize, total: usize) -> Self {
		let mut page = Self {
			offset,
			limit,
			total,
			prev_offset: None,
			next_offset: None,
		};
		if total > limit {
			if offset > 0 {
				page.prev_offset = Some(offset.saturating_sub(limit));
			}
			if page.last() < total {
				page.next_offset = Some(offset + limit);
			}
		}
		page
	}

	fn last(&self) -> usize {
		(self.offset + self.limit).min(self.total)
	}

	/// `"6-10 of 12"`, or `"3 of 3"` when everything fits on one page.
	pub fn text(&self) -> String {
		if self.total <= self.limit {
			format!("{} of {}", self.total, self.total)
		} else {
			format!("{}-{} of {}", self.offset + 1, self.last(), self.total)
		}
	}
}
