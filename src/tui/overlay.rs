/// Popups that can sit on top of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    Details,
    Help,
    Stats,
}

impl OverlayKind {
    pub fn title(self) -> &'static str {
        match self {
            OverlayKind::Details => "Task Details",
            OverlayKind::Help => "Help",
            OverlayKind::Stats => "Statistics",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub kind: OverlayKind,
    pub scroll: usize,
}

/// Open popups, bottom to top. Each kind appears at most once and keeps its
/// own scroll offset; only the topmost one takes input.
#[derive(Debug, Clone, Default)]
pub struct OverlayStack {
    items: Vec<Overlay>,
}

impl OverlayStack {
    /// Open `kind` on top. An already open popup is raised with its scroll
    /// offset intact.
    pub fn open(&mut self, kind: OverlayKind) {
        let overlay = match self.items.iter().position(|o| o.kind == kind) {
            Some(i) => self.items.remove(i),
            None => Overlay { kind, scroll: 0 },
        };
        self.items.push(overlay);
    }

    pub fn close(&mut self, kind: OverlayKind) -> bool {
        let before = self.items.len();
        self.items.retain(|o| o.kind != kind);
        self.items.len() != before
    }

    pub fn close_top(&mut self) -> Option<OverlayKind> {
        self.items.pop().map(|o| o.kind)
    }

    /// Open `kind`, or close it if it is already the topmost popup
    pub fn toggle(&mut self, kind: OverlayKind) {
        if self.top() == Some(kind) {
            self.close_top();
        } else {
            self.open(kind);
        }
    }

    pub fn top(&self) -> Option<OverlayKind> {
        self.items.last().map(|o| o.kind)
    }

    pub fn is_open(&self, kind: OverlayKind) -> bool {
        self.items.iter().any(|o| o.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn scroll_of(&self, kind: OverlayKind) -> usize {
        self.items
            .iter()
            .find(|o| o.kind == kind)
            .map_or(0, |o| o.scroll)
    }

    /// Scroll the topmost popup by `delta` lines, clamped to `[0, max]`
    pub fn scroll_top(&mut self, delta: isize, max: usize) -> bool {
        let Some(top) = self.items.last_mut() else {
            return false;
        };
        let next = top.scroll.saturating_add_signed(delta).min(max);
        let changed = next != top.scroll;
        top.scroll = next;
        changed
    }

    /// Bottom to top, the order they are drawn in
    pub fn iter(&self) -> impl Iterator<Item = &Overlay> {
        self.items.iter()
    }
}
