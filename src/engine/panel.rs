use std::time::{Duration, Instant};

use log::debug;
use serde_json::Value;

use crate::graph::{GraphIndex, GraphSnapshot, Node, NodeId, NodeKind};
use crate::util::{format_detail_value, humanize_key, screenshot_path};

use super::debounce::Debouncer;
use super::visibility::Visibility;

/// Events after which the focused node's provider list may be stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelTrigger {
    Structure,
    Visibility,
    LayoutStop,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PanelState {
    #[default]
    Idle,
    Focused(NodeId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderOption {
    pub id: NodeId,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailField {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelViewModel {
    pub node_id: NodeId,
    pub title: String,
    /// `Some("")` when the node has an empty description attribute.
    pub description: Option<String>,
    pub fields: Vec<DetailField>,
    pub providers: Vec<ProviderOption>,
    pub selected_provider: Option<NodeId>,
    pub screenshots: Vec<String>,
    pub screenshot_index: usize,
}

impl PanelViewModel {
    pub fn current_screenshot(&self) -> Option<&str> {
        self.screenshots
            .get(self.screenshot_index)
            .map(String::as_str)
    }

    pub fn can_cycle(&self) -> bool {
        self.screenshots.len() > 1
    }
}

fn detail_fields(node: &Node) -> Vec<DetailField> {
    let mut fields = Vec::new();
    let mut push = |name: &str, value: &str| {
        if !value.trim().is_empty() {
            fields.push(DetailField {
                name: humanize_key(name),
                value: format_detail_value(value),
            });
        }
    };

    push("label", &node.label);
    push("nodeType", node.kind.as_str());
    if let Some(group_id) = &node.group_id {
        push("groupId", group_id);
    }

    for (key, value) in &node.extra {
        if key.trim().eq_ignore_ascii_case("class") {
            continue;
        }
        match value {
            Value::Null => {}
            Value::String(text) => push(key, text),
            other => push(key, &other.to_string()),
        }
    }

    fields
}

fn eligible_providers(
    node: &Node,
    snapshot: &GraphSnapshot,
    index: &GraphIndex,
    visibility: &Visibility,
) -> Vec<ProviderOption> {
    let mut providers = index
        .incoming(&node.id)
        .iter()
        .filter_map(|source_id| snapshot.node(source_id))
        .filter(|source| source.kind == NodeKind::Bot)
        .filter(|bot| visibility.is_node_visible(&bot.id))
        .filter(|bot| node.screenshots.contains_key(&bot.id))
        .map(|bot| ProviderOption {
            id: bot.id.clone(),
            label: bot.display_label().to_owned(),
        })
        .collect::<Vec<_>>();

    providers.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));
    providers
}

/// Detail panel state machine. Refreshes after graph, visibility or layout
/// events are coalesced by a debounce window.
#[derive(Clone, Debug)]
pub struct DetailPanelSync {
    state: PanelState,
    selected_provider: Option<NodeId>,
    screenshot_index: usize,
    view: Option<PanelViewModel>,
    debouncer: Debouncer,
}

impl DetailPanelSync {
    pub fn new(window: Duration) -> Self {
        Self {
            state: PanelState::Idle,
            selected_provider: None,
            screenshot_index: 0,
            view: None,
            debouncer: Debouncer::new(window),
        }
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn view(&self) -> Option<&PanelViewModel> {
        self.view.as_ref()
    }

    pub fn focus(
        &mut self,
        node_id: &str,
        snapshot: &GraphSnapshot,
        index: &GraphIndex,
        visibility: &Visibility,
    ) -> Option<&PanelViewModel> {
        if self.state != PanelState::Focused(node_id.to_owned()) {
            self.selected_provider = None;
            self.screenshot_index = 0;
        }
        self.state = PanelState::Focused(node_id.to_owned());
        self.debouncer.cancel();
        self.refresh(snapshot, index, visibility);
        self.view.as_ref()
    }

    pub fn unfocus(&mut self) {
        if self.state != PanelState::Idle {
            debug!("detail panel closed");
        }
        self.state = PanelState::Idle;
        self.selected_provider = None;
        self.screenshot_index = 0;
        self.view = None;
        self.debouncer.cancel();
    }

    pub fn notify(&mut self, trigger: PanelTrigger, now: Instant) {
        if matches!(self.state, PanelState::Focused(_)) {
            debug!("detail panel refresh scheduled after {trigger:?}");
            self.debouncer.schedule(now);
        }
    }

    pub fn pending_for(&self, now: Instant) -> Option<Duration> {
        self.debouncer.remaining(now)
    }

    /// Runs the scheduled refresh once its window has elapsed.
    pub fn poll(
        &mut self,
        now: Instant,
        snapshot: &GraphSnapshot,
        index: &GraphIndex,
        visibility: &Visibility,
    ) -> bool {
        if !self.debouncer.fire_if_due(now) {
            return false;
        }
        self.refresh(snapshot, index, visibility);
        true
    }

    pub fn refresh(&mut self, snapshot: &GraphSnapshot, index: &GraphIndex, visibility: &Visibility) {
        let PanelState::Focused(node_id) = &self.state else {
            self.view = None;
            return;
        };

        let Some(node) = snapshot
            .node(node_id)
            .filter(|node| visibility.is_node_visible(&node.id))
        else {
            debug!("focused node {node_id} is gone or hidden, closing panel");
            self.unfocus();
            return;
        };

        let providers = eligible_providers(node, snapshot, index, visibility);
        let selected = self
            .selected_provider
            .as_ref()
            .filter(|previous| providers.iter().any(|provider| &provider.id == *previous))
            .cloned()
            .or_else(|| providers.first().map(|provider| provider.id.clone()));

        if selected != self.selected_provider {
            self.screenshot_index = 0;
        }
        self.selected_provider = selected;

        let screenshots = self
            .selected_provider
            .as_ref()
            .and_then(|bot_id| node.screenshots.get(bot_id))
            .map(|refs| refs.iter().map(|path| screenshot_path(path)).collect::<Vec<_>>())
            .unwrap_or_default();
        if self.screenshot_index >= screenshots.len() {
            self.screenshot_index = 0;
        }

        self.view = Some(PanelViewModel {
            node_id: node.id.clone(),
            title: if node.label.trim().is_empty() {
                "Node Details".to_owned()
            } else {
                node.label.clone()
            },
            description: node.description.clone(),
            fields: detail_fields(node),
            providers,
            selected_provider: self.selected_provider.clone(),
            screenshots,
            screenshot_index: self.screenshot_index,
        });
    }

    pub fn select_provider(
        &mut self,
        bot_id: &str,
        snapshot: &GraphSnapshot,
        index: &GraphIndex,
        visibility: &Visibility,
    ) -> bool {
        let eligible = self
            .view
            .as_ref()
            .is_some_and(|view| view.providers.iter().any(|provider| provider.id == bot_id));
        if !eligible {
            return false;
        }

        if self.selected_provider.as_deref() != Some(bot_id) {
            self.selected_provider = Some(bot_id.to_owned());
            self.screenshot_index = 0;
        }
        self.refresh(snapshot, index, visibility);
        true
    }

    fn step_screenshot(&mut self, forward: bool) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        let count = view.screenshots.len();
        if count <= 1 {
            return;
        }

        self.screenshot_index = if forward {
            (self.screenshot_index + 1) % count
        } else {
            (self.screenshot_index + count - 1) % count
        };
        view.screenshot_index = self.screenshot_index;
    }

    pub fn next_screenshot(&mut self) {
        self.step_screenshot(true);
    }

    pub fn previous_screenshot(&mut self) {
        self.step_screenshot(false);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::engine::filter::{FilterCatalog, FilterState};
    use crate::engine::visibility::{DisplayOptions, resolve_visibility};
    use crate::graph::fixtures::{node, sample_snapshot};

    const WINDOW: Duration = Duration::from_millis(50);

    struct Fixture {
        snapshot: GraphSnapshot,
        index: GraphIndex,
        filters: FilterState,
        visibility: Visibility,
        panel: DetailPanelSync,
    }

    impl Fixture {
        fn new() -> Self {
            let snapshot = sample_snapshot();
            let index = GraphIndex::build(&snapshot);
            let filters = FilterState::new(&FilterCatalog::build(&snapshot, &index));
            let visibility =
                resolve_visibility(&snapshot, &index, &filters, &DisplayOptions::default());
            Self {
                snapshot,
                index,
                filters,
                visibility,
                panel: DetailPanelSync::new(WINDOW),
            }
        }

        fn set(&mut self, id: &str, on: bool) {
            self.filters.set_id(id, on, &self.snapshot, &self.index);
            self.visibility = resolve_visibility(
                &self.snapshot,
                &self.index,
                &self.filters,
                &DisplayOptions::default(),
            );
        }

        fn focus(&mut self, id: &str) -> Option<PanelViewModel> {
            self.panel
                .focus(id, &self.snapshot, &self.index, &self.visibility)
                .cloned()
        }

        fn poll(&mut self, now: Instant) -> bool {
            self.panel
                .poll(now, &self.snapshot, &self.index, &self.visibility)
        }
    }

    fn provider_ids(view: &PanelViewModel) -> Vec<&str> {
        view.providers.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn providers_sorted_by_label_first_selected() {
        let mut fixture = Fixture::new();
        let view = fixture.focus("n").unwrap();

        assert_eq!(view.title, "Canvas");
        assert_eq!(provider_ids(&view), vec!["b2", "b1"]);
        assert_eq!(view.selected_provider.as_deref(), Some("b2"));
        assert_eq!(
            view.screenshots,
            vec![
                "assets/screenshots/y.png".to_owned(),
                "assets/screenshots/z.png".to_owned()
            ]
        );
    }

    #[test]
    fn scenario_filtered_provider_and_wrapping_carousel() {
        let mut fixture = Fixture::new();
        fixture.set("b1", false);
        fixture.focus("n").unwrap();

        let view = fixture.panel.view().unwrap();
        assert_eq!(provider_ids(view), vec!["b2"]);
        assert_eq!(view.screenshots.len(), 2);
        assert_eq!(view.screenshot_index, 0);

        fixture.panel.next_screenshot();
        assert_eq!(fixture.panel.view().unwrap().screenshot_index, 1);
        fixture.panel.next_screenshot();
        assert_eq!(fixture.panel.view().unwrap().screenshot_index, 0);
        fixture.panel.previous_screenshot();
        assert_eq!(
            fixture.panel.view().unwrap().current_screenshot(),
            Some("assets/screenshots/z.png")
        );
    }

    #[test]
    fn previous_choice_survives_refresh_while_eligible() {
        let mut fixture = Fixture::new();
        fixture.focus("n");
        assert!(fixture.panel.select_provider(
            "b1",
            &fixture.snapshot,
            &fixture.index,
            &fixture.visibility
        ));

        fixture.set("b3", false);
        fixture
            .panel
            .refresh(&fixture.snapshot, &fixture.index, &fixture.visibility);
        assert_eq!(
            fixture.panel.view().unwrap().selected_provider.as_deref(),
            Some("b1")
        );

        fixture.set("b1", false);
        fixture
            .panel
            .refresh(&fixture.snapshot, &fixture.index, &fixture.visibility);
        assert_eq!(
            fixture.panel.view().unwrap().selected_provider.as_deref(),
            Some("b2")
        );
    }

    #[test]
    fn no_eligible_providers_keeps_panel_open_but_empty() {
        let mut fixture = Fixture::new();
        let view = fixture.focus("f2").unwrap();

        assert_eq!(fixture.panel.state(), &PanelState::Focused("f2".to_owned()));
        assert!(view.providers.is_empty());
        assert!(view.selected_provider.is_none());
        assert!(view.current_screenshot().is_none());
    }

    #[test]
    fn hidden_focus_returns_to_idle_after_debounce() {
        let mut fixture = Fixture::new();
        fixture.focus("n");
        let start = Instant::now();

        fixture.set("b1", false);
        fixture.panel.notify(PanelTrigger::Visibility, start);
        fixture.set("b2", false);
        fixture
            .panel
            .notify(PanelTrigger::Visibility, start + Duration::from_millis(20));

        assert!(!fixture.poll(start + Duration::from_millis(40)));
        assert!(fixture.panel.view().is_some());

        assert!(fixture.poll(start + Duration::from_millis(80)));
        assert_eq!(fixture.panel.state(), &PanelState::Idle);
        assert!(fixture.panel.view().is_none());
    }

    #[test]
    fn focusing_a_missing_node_stays_idle() {
        let mut fixture = Fixture::new();
        assert!(fixture.focus("ghost").is_none());
        assert_eq!(fixture.panel.state(), &PanelState::Idle);

        fixture.panel.notify(PanelTrigger::Structure, Instant::now());
        assert_eq!(fixture.panel.pending_for(Instant::now()), None);
    }

    #[test]
    fn fields_skip_hidden_attributes_and_format_values() {
        let mut feature = node("chat_export", NodeKind::Feature);
        feature.label = "Chat export".to_owned();
        feature.description = Some(String::new());
        feature.extra = BTreeMap::from([
            ("class".to_owned(), json!("chat_export")),
            ("release_stage".to_owned(), json!("general__availability")),
            ("docs".to_owned(), json!("https://example.org/chat_export")),
            ("bots".to_owned(), json!(3)),
            ("note".to_owned(), json!("")),
        ]);

        let fields = detail_fields(&feature);
        let rendered = fields
            .iter()
            .map(|field| (field.name.as_str(), field.value.as_str()))
            .collect::<Vec<_>>();

        assert_eq!(
            rendered,
            vec![
                ("label", "Chat Export"),
                ("nodeType", "Feature"),
                ("bots", "3"),
                ("docs", "https://example.org/chat_export"),
                ("release stage", "General Availability"),
            ]
        );
    }
}
