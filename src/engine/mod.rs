use std::time::{Duration, Instant};

use log::debug;

use crate::graph::{ClusterAssignment, ClusterId, GraphIndex, GraphSnapshot, NodeKind};

mod cluster;
mod color;
mod debounce;
mod filter;
mod highlight;
mod panel;
mod style;
mod visibility;

pub use cluster::{ClusterOverlay, LayoutConfig, is_container_id};
pub use color::Rgb;
pub use filter::{FilterCatalog, FilterGroup, FilterGroupKey, FilterState, FilterToggle};
pub use highlight::HoverHighlight;
pub use panel::{PanelState, PanelTrigger, PanelViewModel};
pub use style::{NodeStyle, SELECTED_BORDER_COLOR, SELECTED_BORDER_WIDTH};
pub use visibility::{DisplayOptions, Visibility};

use cluster::{CLUSTER_PALETTE, palette_color};
use highlight::hover_neighborhood;
use panel::DetailPanelSync;
use style::{CLUSTERED_BORDER_COLOR, CLUSTERED_BORDER_WIDTH, default_style};
use visibility::resolve_visibility;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

#[derive(Clone, Debug, PartialEq)]
pub struct EngineSettings {
    pub debounce_window: Duration,
    pub palette: Vec<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            debounce_window: DEFAULT_DEBOUNCE,
            palette: CLUSTER_PALETTE.iter().map(|color| color.to_string()).collect(),
        }
    }
}

/// Command facade over one loaded snapshot. The viewer reads resolved
/// output from here and dispatches every change through these methods.
pub struct Engine {
    settings: EngineSettings,
    snapshot: GraphSnapshot,
    index: GraphIndex,
    catalog: FilterCatalog,
    filters: FilterState,
    display: DisplayOptions,
    visibility: Visibility,
    overlay: ClusterOverlay,
    panel: DetailPanelSync,
    hover: Option<HoverHighlight>,
}

impl Engine {
    pub fn new(snapshot: GraphSnapshot, settings: EngineSettings) -> Self {
        let index = GraphIndex::build(&snapshot);
        let catalog = FilterCatalog::build(&snapshot, &index);
        let filters = FilterState::new(&catalog);
        let display = DisplayOptions::default();
        let visibility = resolve_visibility(&snapshot, &index, &filters, &display);
        let panel = DetailPanelSync::new(settings.debounce_window);

        debug!(
            "engine ready: {} nodes, {} controlled ids",
            snapshot.node_count(),
            catalog.controlled_ids().len()
        );

        Self {
            settings,
            snapshot,
            index,
            catalog,
            filters,
            display,
            visibility,
            overlay: ClusterOverlay::default(),
            panel,
            hover: None,
        }
    }

    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn display(&self) -> DisplayOptions {
        self.display
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    pub fn overlay(&self) -> &ClusterOverlay {
        &self.overlay
    }

    pub fn filter_groups(&self) -> Vec<FilterGroup> {
        self.catalog.project(&self.filters)
    }

    pub fn panel_state(&self) -> &PanelState {
        self.panel.state()
    }

    pub fn panel(&self) -> Option<&PanelViewModel> {
        self.panel.view()
    }

    pub fn hovered(&self) -> Option<&HoverHighlight> {
        self.hover.as_ref()
    }

    pub fn toggle(&mut self, toggle: FilterToggle, now: Instant) -> bool {
        match toggle {
            FilterToggle::NodeKind(kind, enabled) => {
                self.filters.set_node_type_enabled(kind, enabled);
            }
            FilterToggle::Id(id, on) => {
                self.filters.set_id(&id, on, &self.snapshot, &self.index);
            }
            FilterToggle::Group(key, on) => {
                let changed = self.filters.set_group(&self.catalog, &key, on);
                debug!("group {key:?} -> {on}: {changed} ids changed");
            }
        }
        self.commit_visibility(now)
    }

    pub fn set_kind_enabled(&mut self, kind: NodeKind, enabled: bool, now: Instant) -> bool {
        self.toggle(FilterToggle::NodeKind(kind, enabled), now)
    }

    pub fn set_display(&mut self, display: DisplayOptions, now: Instant) -> bool {
        if self.display == display {
            return false;
        }
        self.display = display;
        self.commit_visibility(now)
    }

    /// Full resolution from the current state. Nothing reads a partial result.
    pub fn resolve_visibility(&self) -> Visibility {
        resolve_visibility(&self.snapshot, &self.index, &self.filters, &self.display)
    }

    fn commit_visibility(&mut self, now: Instant) -> bool {
        let next = self.resolve_visibility();
        if next == self.visibility {
            return false;
        }

        self.visibility = next;
        self.refresh_hover();
        self.panel.notify(PanelTrigger::Visibility, now);
        true
    }

    pub fn apply_cluster(&mut self, assignment: &ClusterAssignment, now: Instant) -> usize {
        let created = self
            .overlay
            .apply(&self.snapshot, assignment, &self.settings.palette);
        self.panel.notify(PanelTrigger::Structure, now);
        created
    }

    pub fn reset_cluster(&mut self, now: Instant) {
        if !self.overlay.is_active() {
            return;
        }
        self.overlay.reset();
        self.panel.notify(PanelTrigger::Structure, now);
    }

    pub fn cluster_color(&self, cluster_id: ClusterId) -> &str {
        palette_color(cluster_id, &self.settings.palette)
    }

    pub fn layout_finished(&mut self, now: Instant) {
        self.notify(PanelTrigger::LayoutStop, now);
    }

    pub fn focus(&mut self, node_id: &str) -> Option<&PanelViewModel> {
        if is_container_id(node_id) {
            return None;
        }
        self.panel
            .focus(node_id, &self.snapshot, &self.index, &self.visibility)
    }

    pub fn unfocus(&mut self) {
        self.panel.unfocus();
    }

    pub fn focused_id(&self) -> Option<&str> {
        match self.panel.state() {
            PanelState::Focused(id) => Some(id),
            PanelState::Idle => None,
        }
    }

    pub fn select_provider(&mut self, bot_id: &str) -> bool {
        self.panel
            .select_provider(bot_id, &self.snapshot, &self.index, &self.visibility)
    }

    pub fn next_screenshot(&mut self) {
        self.panel.next_screenshot();
    }

    pub fn previous_screenshot(&mut self) {
        self.panel.previous_screenshot();
    }

    pub fn hover(&mut self, node_id: Option<&str>) {
        self.hover = node_id.and_then(|id| {
            hover_neighborhood(
                id,
                &self.snapshot,
                &self.index,
                &self.visibility,
                &self.display,
            )
        });
    }

    fn refresh_hover(&mut self) {
        let focus = self.hover.as_ref().map(|hover| hover.focus.clone());
        self.hover(focus.as_deref());
    }

    pub fn notify(&mut self, trigger: PanelTrigger, now: Instant) {
        self.panel.notify(trigger, now);
    }

    /// Returns true when a deferred panel refresh ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        self.panel
            .poll(now, &self.snapshot, &self.index, &self.visibility)
    }

    pub fn next_refresh_in(&self, now: Instant) -> Option<Duration> {
        self.panel.pending_for(now)
    }

    /// Cluster style while an overlay covers the node, default style otherwise.
    pub fn node_style(&self, node_id: &str) -> Option<NodeStyle> {
        let node = self.snapshot.node(node_id)?;
        let Some(cluster) = self.overlay.style_override(node_id) else {
            return Some(default_style(node));
        };

        let (border_color, border_width) = if cluster.clustered_border {
            (CLUSTERED_BORDER_COLOR.to_owned(), CLUSTERED_BORDER_WIDTH)
        } else {
            (cluster.border_color.clone(), cluster.border_width)
        };

        Some(NodeStyle {
            gradient: cluster.gradient.clone(),
            border_color,
            border_width,
        })
    }
}
