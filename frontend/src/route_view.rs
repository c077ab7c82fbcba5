//! Display-mode state for the current search result set.
//!
//! The planner is always in one of two modes: the overview, where every
//! candidate route is drawn color-coded and clickable, or the detail view,
//! where a single selected route is drawn step by step next to its
//! turn-by-turn panel.

use shared::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteView {
    #[default]
    Overview,
    Detail(usize),
}

/// The current route list together with the active display mode.
///
/// The selection index is only ever set through [`RouteSet::select`], which
/// validates it against the list, and is discarded whenever a new result
/// set arrives. A `Detail` index therefore always points into the current
/// list.
#[derive(Debug, Default)]
pub struct RouteSet {
    routes: Vec<Route>,
    view: RouteView,
}

impl RouteSet {
    /// Installs a fresh search result, dropping any previous selection.
    pub fn replace(&mut self, routes: Vec<Route>) {
        self.routes = routes;
        self.view = RouteView::Overview;
    }

    /// Switches to the detail view for `index`. Out-of-range indices are
    /// rejected without changing state.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.routes.len() {
            return false;
        }
        self.view = RouteView::Detail(index);
        true
    }

    /// Returns to the overview.
    pub fn expand(&mut self) {
        self.view = RouteView::Overview;
    }

    pub fn view(&self) -> RouteView {
        self.view
    }

    pub fn selected(&self) -> Option<(usize, &Route)> {
        match self.view {
            RouteView::Overview => None,
            RouteView::Detail(index) => self.routes.get(index).map(|route| (index, route)),
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }
}
