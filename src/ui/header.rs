/// Scroll position below which the header counts as "at the top".
pub const TOP_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollPhase {
    #[default]
    Top,
    ScrolledUp,
    ScrolledDown,
}

/// Header interaction state: scroll-driven visibility, mobile menu, the
/// single open dropdown and the search panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderState {
    phase: ScrollPhase,
    last_y: f64,
    mobile_menu_open: bool,
    open_dropdown: Option<String>,
    search_open: bool,
}

impl HeaderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_scroll(&mut self, y: f64) {
        if y < TOP_THRESHOLD {
            self.phase = ScrollPhase::Top;
        } else if y < self.last_y {
            self.phase = ScrollPhase::ScrolledUp;
        } else if y > self.last_y {
            self.phase = ScrollPhase::ScrolledDown;
            self.open_dropdown = None;
        }
        self.last_y = y;
    }

    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    pub fn is_visible(&self) -> bool {
        self.phase != ScrollPhase::ScrolledDown
    }

    /// "Scrolled" styling applies once the page left the top.
    pub fn is_scrolled(&self) -> bool {
        self.phase != ScrollPhase::Top
    }

    pub fn open_dropdown(&self) -> Option<&str> {
        self.open_dropdown.as_deref()
    }

    pub fn is_search_open(&self) -> bool {
        self.search_open
    }

    pub fn is_mobile_menu_open(&self) -> bool {
        self.mobile_menu_open
    }

    pub fn toggle_dropdown(&mut self, title: &str) {
        if self.open_dropdown.as_deref() == Some(title) {
            self.open_dropdown = None;
        } else {
            self.open_dropdown = Some(title.to_owned());
            self.search_open = false;
        }
    }

    pub fn toggle_search(&mut self) {
        self.search_open = !self.search_open;
        if self.search_open {
            self.open_dropdown = None;
        }
    }

    pub fn toggle_mobile_menu(&mut self) {
        self.mobile_menu_open = !self.mobile_menu_open;
    }

    pub fn route_changed(&mut self) {
        self.mobile_menu_open = false;
        self.open_dropdown = None;
        self.search_open = false;
    }

    /// A click outside the navigation closes the dropdown; outside the search
    /// panel closes search.
    pub fn on_document_click(&mut self, inside_nav: bool, inside_search: bool) {
        if !inside_nav {
            self.open_dropdown = None;
        }
        if !inside_search {
            self.search_open = false;
        }
    }

    /// CSS classes for the `<header>` element.
    pub fn classes(&self) -> String {
        let mut classes = vec!["header"];
        if self.is_scrolled() {
            classes.push("scrolled");
        }
        if !self.is_visible() {
            classes.push("hidden");
        }
        if self.mobile_menu_open {
            classes.push("menu-open");
        }
        classes.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_sequence_drives_visibility() {
        let mut header = HeaderState::new();
        let observed: Vec<(bool, bool)> = [0.0, 50.0, 120.0, 80.0]
            .into_iter()
            .map(|y| {
                header.on_scroll(y);
                (header.is_visible(), header.is_scrolled())
            })
            .collect();
        assert_eq!(
            observed,
            vec![(true, false), (false, true), (false, true), (true, true)]
        );
        assert_eq!(header.phase(), ScrollPhase::ScrolledUp);
    }

    #[test]
    fn scrolling_down_closes_dropdown() {
        let mut header = HeaderState::new();
        header.on_scroll(200.0);
        header.on_scroll(150.0);
        header.toggle_dropdown("Académica");
        header.on_scroll(150.0);
        assert_eq!(header.open_dropdown(), Some("Académica"));
        header.on_scroll(300.0);
        assert_eq!(header.open_dropdown(), None);
    }

    #[test]
    fn dropdown_and_search_are_exclusive() {
        let mut header = HeaderState::new();
        header.toggle_search();
        assert!(header.is_search_open());

        header.toggle_dropdown("Institucional");
        assert!(!header.is_search_open());
        assert_eq!(header.open_dropdown(), Some("Institucional"));

        header.toggle_dropdown("Académica");
        assert_eq!(header.open_dropdown(), Some("Académica"));
        header.toggle_dropdown("Académica");
        assert_eq!(header.open_dropdown(), None);

        header.toggle_dropdown("Académica");
        header.toggle_search();
        assert_eq!(header.open_dropdown(), None);
    }

    #[test]
    fn route_change_and_outside_clicks_close_panels() {
        let mut header = HeaderState::new();
        header.toggle_mobile_menu();
        header.toggle_dropdown("Académica");
        header.route_changed();
        assert!(!header.is_mobile_menu_open());
        assert_eq!(header.open_dropdown(), None);

        header.toggle_dropdown("Académica");
        header.on_document_click(true, false);
        assert_eq!(header.open_dropdown(), Some("Académica"));
        header.on_document_click(false, false);
        assert_eq!(header.open_dropdown(), None);

        header.toggle_search();
        header.on_document_click(false, true);
        assert!(header.is_search_open());
        header.on_document_click(false, false);
        assert!(!header.is_search_open());
    }

    #[test]
    fn classes_reflect_state() {
        let mut header = HeaderState::new();
        assert_eq!(header.classes(), "header");
        header.on_scroll(40.0);
        assert_eq!(header.classes(), "header scrolled hidden");
    }
}
