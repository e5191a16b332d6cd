// THEORY:
// The `wireframe_analyzer` is Strategy A of the engine: a pattern-oriented
// reading of the screen. Where the classifier looks at one element at a time,
// this layer looks at the whole set and asks what kind of page it is.
//
// Key architectural principles:
// 1.  **Classification First**: Every raw element goes through the classifier;
//     unclassified ones are dropped before any grouping happens.
// 2.  **Layout by Precedence**: The page layout is picked by walking a fixed
//     precedence list (dashboard, card grid, content, sidebar, column, simple).
//     The first matching pattern wins.
// 3.  **Grouping as a Fold**: Content blocks are built by an explicit fold over
//     a `(remaining, blocks)` pair. Each step takes the first remaining element
//     as a seed, pulls in everything within reach of it, and hands the rest to
//     the next step. Every element ends up in exactly one block.
// 4.  **Pure Function**: The analyzer holds no state and never mutates its
//     inputs, so it can run in parallel with the spatial strategy.

use crate::core_modules::element_classifier::{
    InteractionKind, WireframeElement, WireframeType, classify_all,
};
use crate::core_modules::geometry::{Bounds, cluster_positions};
use crate::core_modules::raw_element::{GridEstimate, RawElement, TextBlock};
use log::debug;
use serde::Serialize;

const TOP_HEADING_MAX_Y: f64 = 100.0;
const SIDEBAR_REGION_MAX_X: f64 = 100.0;
const TOP_NAVIGATION_MAX_Y: f64 = 80.0;
const TOP_NAVIGATION_MIN_COUNT: usize = 3;
const SIDE_NAVIGATION_MAX_X: f64 = 150.0;
const CONTENT_BLOCK_REACH: f64 = 1.5;
/// Positions closer than this are treated as the same grid line.
pub const GRID_CLUSTER_TOLERANCE: f64 = 10.0;

/// The overall page pattern recognized by the wireframe strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutStructure {
    DashboardLayout,
    CardGridLayout,
    ContentLayout,
    SidebarLayout,
    ColumnLayout,
    SimpleLayout,
    /// No classified elements to reason about.
    Empty,
    /// Analysis did not run (failed image).
    Unknown,
}

impl LayoutStructure {
    pub fn is_recognized(self) -> bool {
        !matches!(self, LayoutStructure::Empty | LayoutStructure::Unknown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavigationKind {
    TopNavigation,
    SideNavigation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationGroup {
    pub kind: NavigationKind,
    pub elements: Vec<WireframeElement>,
}

/// A cluster of nearby content elements. The seed element comes first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentBlock {
    pub bounds: Bounds,
    pub elements: Vec<WireframeElement>,
}

impl ContentBlock {
    fn from_members(seed: &WireframeElement, members: Vec<&WireframeElement>) -> Self {
        let bounds = members
            .iter()
            .fold(seed.bounds, |acc, member| acc.union(&member.bounds));
        let elements = std::iter::once(seed)
            .chain(members)
            .cloned()
            .collect();
        Self { bounds, elements }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveElement {
    pub element: WireframeElement,
    pub interaction: InteractionKind,
    pub event_handlers: Vec<&'static str>,
}

/// The output of the wireframe strategy for one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireframeAnalysis {
    pub wireframe_elements: Vec<WireframeElement>,
    pub layout_structure: LayoutStructure,
    pub grid: GridEstimate,
    pub navigation_elements: Vec<NavigationGroup>,
    pub content_blocks: Vec<ContentBlock>,
    pub interactive_elements: Vec<InteractiveElement>,
    pub confidence: f64,
}

/// Runs the wireframe strategy. `grid` is the preprocessor's grid reading;
/// when absent it is estimated from the classified elements.
pub fn analyze_wireframe(
    elements: &[RawElement],
    text_blocks: &[TextBlock],
    grid: Option<GridEstimate>,
) -> WireframeAnalysis {
    let wireframe_elements = classify_all(elements, text_blocks);
    let grid = grid.unwrap_or_else(|| estimate_grid(&wireframe_elements));

    let layout_structure = detect_layout_structure(&wireframe_elements, grid);
    let navigation_elements = detect_navigation(&wireframe_elements);
    let content_blocks = group_content_blocks(&wireframe_elements);
    let interactive_elements = collect_interactive(&wireframe_elements);
    let confidence = wireframe_confidence(
        wireframe_elements.len(),
        layout_structure,
        interactive_elements.len(),
    );

    debug!(
        elements = wireframe_elements.len(),
        blocks = content_blocks.len(),
        interactive = interactive_elements.len(),
        confidence = confidence;
        "Wireframe analysis complete"
    );

    WireframeAnalysis {
        wireframe_elements,
        layout_structure,
        grid,
        navigation_elements,
        content_blocks,
        interactive_elements,
        confidence,
    }
}

/// Columns and rows as the number of distinct x-start and y-start lines.
pub fn estimate_grid(elements: &[WireframeElement]) -> GridEstimate {
    let columns = cluster_positions(elements.iter().map(|e| e.bounds.x), GRID_CLUSTER_TOLERANCE);
    let rows = cluster_positions(elements.iter().map(|e| e.bounds.y), GRID_CLUSTER_TOLERANCE);
    GridEstimate {
        columns: columns.len() as u32,
        rows: rows.len() as u32,
    }
}

pub fn detect_layout_structure(elements: &[WireframeElement], grid: GridEstimate) -> LayoutStructure {
    if elements.is_empty() {
        return LayoutStructure::Empty;
    }

    let has_top_heading = elements
        .iter()
        .any(|e| e.bounds.y < TOP_HEADING_MAX_Y && e.wireframe_type.is_heading());
    let has_sidebar_region = elements
        .iter()
        .any(|e| e.wireframe_type == WireframeType::Sidebar || e.bounds.x < SIDEBAR_REGION_MAX_X);
    let card_count = elements
        .iter()
        .filter(|e| e.wireframe_type == WireframeType::CardContainer)
        .count();

    if has_sidebar_region && has_top_heading {
        LayoutStructure::DashboardLayout
    } else if card_count > 2 && grid.columns > 2 {
        LayoutStructure::CardGridLayout
    } else if has_top_heading && grid.rows > 2 {
        LayoutStructure::ContentLayout
    } else if has_sidebar_region {
        LayoutStructure::SidebarLayout
    } else if grid.columns > 2 {
        LayoutStructure::ColumnLayout
    } else {
        LayoutStructure::SimpleLayout
    }
}

pub fn detect_navigation(elements: &[WireframeElement]) -> Vec<NavigationGroup> {
    let mut groups = Vec::new();

    let top: Vec<WireframeElement> = elements
        .iter()
        .filter(|e| {
            e.bounds.y < TOP_NAVIGATION_MAX_Y
                && (e.wireframe_type.is_button_like() || e.wireframe_type.is_text())
        })
        .cloned()
        .collect();
    if top.len() >= TOP_NAVIGATION_MIN_COUNT {
        groups.push(NavigationGroup {
            kind: NavigationKind::TopNavigation,
            elements: top,
        });
    }

    let side: Vec<WireframeElement> = elements
        .iter()
        .filter(|e| e.wireframe_type == WireframeType::Sidebar && e.bounds.x < SIDE_NAVIGATION_MAX_X)
        .cloned()
        .collect();
    if !side.is_empty() {
        groups.push(NavigationGroup {
            kind: NavigationKind::SideNavigation,
            elements: side,
        });
    }

    groups
}

fn within_block_reach(seed: &WireframeElement, other: &WireframeElement) -> bool {
    let reach = CONTENT_BLOCK_REACH
        * seed
            .bounds
            .width
            .max(seed.bounds.height)
            .max(other.bounds.width)
            .max(other.bounds.height);
    seed.bounds.center_distance(&other.bounds) <= reach
}

/// One fold step: the first remaining element seeds a block and absorbs
/// everything within reach; the rest is carried to the next step.
fn take_block<'a>(
    remaining: Vec<&'a WireframeElement>,
    mut blocks: Vec<ContentBlock>,
) -> (Vec<&'a WireframeElement>, Vec<ContentBlock>) {
    if remaining.is_empty() {
        return (remaining, blocks);
    }
    let seed = remaining[0];
    let (members, rest): (Vec<&WireframeElement>, Vec<&WireframeElement>) = remaining[1..]
        .iter()
        .copied()
        .partition(|other| within_block_reach(seed, other));
    blocks.push(ContentBlock::from_members(seed, members));
    (rest, blocks)
}

pub fn group_content_blocks(elements: &[WireframeElement]) -> Vec<ContentBlock> {
    let content: Vec<&WireframeElement> = elements
        .iter()
        .filter(|e| e.wireframe_type.profile().is_content)
        .collect();

    let mut state = (content, Vec::new());
    while !state.0.is_empty() {
        state = take_block(state.0, state.1);
    }

    let mut blocks = state.1;
    blocks.sort_by(|a, b| a.bounds.y.total_cmp(&b.bounds.y));
    blocks
}

pub fn collect_interactive(elements: &[WireframeElement]) -> Vec<InteractiveElement> {
    elements
        .iter()
        .filter(|e| e.wireframe_type.is_interactive())
        .map(|e| {
            let interaction = e
                .wireframe_type
                .profile()
                .interaction
                .unwrap_or(InteractionKind::Hover);
            InteractiveElement {
                element: e.clone(),
                interaction,
                event_handlers: interaction.event_handlers().to_vec(),
            }
        })
        .collect()
}

pub fn wireframe_confidence(
    element_count: usize,
    layout_structure: LayoutStructure,
    interactive_count: usize,
) -> f64 {
    let element_score = (element_count as f64 / 10.0).min(1.0);
    let layout_score = if layout_structure.is_recognized() { 1.0 } else { 0.0 };
    let interactive_score = (interactive_count as f64 / 5.0).min(1.0);
    (0.4 * element_score + 0.3 * layout_score + 0.3 * interactive_score).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::raw_element::ElementKind;
    use float_cmp::assert_approx_eq;

    fn raw(kind: ElementKind, x: f64, y: f64, w: f64, h: f64) -> RawElement {
        RawElement::new(kind, Bounds::new(x, y, w, h))
    }

    fn grid(columns: u32, rows: u32) -> Option<GridEstimate> {
        Some(GridEstimate { columns, rows })
    }

    #[test]
    fn test_empty_input_has_zero_confidence() {
        let analysis = analyze_wireframe(&[], &[], None);
        assert_eq!(analysis.layout_structure, LayoutStructure::Empty);
        assert!(analysis.wireframe_elements.is_empty());
        assert!(analysis.content_blocks.is_empty());
        assert_approx_eq!(f64, analysis.confidence, 0.0);
    }

    #[test]
    fn test_dashboard_layout() {
        let elements = vec![
            raw(ElementKind::VerticalSeparator, 0.0, 0.0, 2.0, 700.0),
            raw(ElementKind::TextBlock, 300.0, 20.0, 300.0, 60.0),
        ];
        let analysis = analyze_wireframe(&elements, &[], grid(1, 1));
        assert_eq!(analysis.layout_structure, LayoutStructure::DashboardLayout);
    }

    #[test]
    fn test_card_grid_layout() {
        let elements: Vec<RawElement> = (0..3)
            .map(|i| raw(ElementKind::Container, 200.0 + 250.0 * i as f64, 300.0, 200.0, 200.0))
            .collect();
        let analysis = analyze_wireframe(&elements, &[], grid(3, 1));
        assert_eq!(analysis.layout_structure, LayoutStructure::CardGridLayout);
    }

    #[test]
    fn test_content_layout_needs_rows() {
        let elements = vec![raw(ElementKind::TextBlock, 300.0, 20.0, 300.0, 60.0)];
        let with_rows = analyze_wireframe(&elements, &[], grid(1, 3));
        assert_eq!(with_rows.layout_structure, LayoutStructure::ContentLayout);
        let without_rows = analyze_wireframe(&elements, &[], grid(1, 1));
        assert_eq!(without_rows.layout_structure, LayoutStructure::SimpleLayout);
    }

    #[test]
    fn test_sidebar_and_column_layouts() {
        let left = vec![raw(ElementKind::Container, 20.0, 300.0, 200.0, 200.0)];
        assert_eq!(
            analyze_wireframe(&left, &[], grid(1, 1)).layout_structure,
            LayoutStructure::SidebarLayout
        );
        let right = vec![raw(ElementKind::Container, 400.0, 300.0, 200.0, 200.0)];
        assert_eq!(
            analyze_wireframe(&right, &[], grid(4, 1)).layout_structure,
            LayoutStructure::ColumnLayout
        );
    }

    #[test]
    fn test_grid_is_estimated_when_missing() {
        let elements: Vec<RawElement> = (0..4)
            .map(|i| raw(ElementKind::Container, 200.0 + 250.0 * i as f64, 300.0, 200.0, 200.0))
            .collect();
        let analysis = analyze_wireframe(&elements, &[], None);
        assert_eq!(analysis.grid, GridEstimate { columns: 4, rows: 1 });
        assert_eq!(analysis.layout_structure, LayoutStructure::CardGridLayout);
    }

    #[test]
    fn test_top_navigation_needs_three_items() {
        let items: Vec<RawElement> = (0..3)
            .map(|i| raw(ElementKind::TextRegion, 200.0 + 120.0 * i as f64, 20.0, 80.0, 20.0))
            .collect();
        let analysis = analyze_wireframe(&items, &[], grid(1, 1));
        assert_eq!(analysis.navigation_elements.len(), 1);
        assert_eq!(analysis.navigation_elements[0].kind, NavigationKind::TopNavigation);
        assert_eq!(analysis.navigation_elements[0].elements.len(), 3);

        let two = analyze_wireframe(&items[..2], &[], grid(1, 1));
        assert!(two.navigation_elements.is_empty());
    }

    #[test]
    fn test_side_navigation() {
        let elements = vec![raw(ElementKind::VerticalSeparator, 120.0, 0.0, 2.0, 700.0)];
        let analysis = analyze_wireframe(&elements, &[], grid(1, 1));
        assert_eq!(analysis.navigation_elements.len(), 1);
        assert_eq!(analysis.navigation_elements[0].kind, NavigationKind::SideNavigation);
    }

    #[test]
    fn test_content_blocks_partition_content_elements() {
        let elements = vec![
            raw(ElementKind::TextBlock, 500.0, 600.0, 200.0, 60.0),
            raw(ElementKind::TextBlock, 500.0, 680.0, 200.0, 60.0),
            raw(ElementKind::TextBlock, 100.0, 100.0, 200.0, 60.0),
            raw(ElementKind::CircularElement, 100.0, 180.0, 30.0, 30.0),
        ];
        let blocks = group_content_blocks(&classify_all(&elements, &[]));
        assert_eq!(blocks.len(), 2);
        // Sorted by top edge.
        assert_approx_eq!(f64, blocks[0].bounds.y, 100.0);
        assert_eq!(blocks[0].elements.len(), 1);
        assert_eq!(blocks[1].elements.len(), 2);
        assert_eq!(blocks[1].elements[0].source_index, 0);
        let total: usize = blocks.iter().map(|b| b.elements.len()).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_interactive_elements_get_handlers() {
        let elements = vec![
            raw(ElementKind::Button, 10.0, 10.0, 100.0, 40.0),
            raw(ElementKind::InputField, 10.0, 100.0, 300.0, 40.0),
            raw(ElementKind::TextBlock, 10.0, 200.0, 300.0, 60.0),
        ];
        let interactive = collect_interactive(&classify_all(&elements, &[]));
        assert_eq!(interactive.len(), 2);
        assert_eq!(interactive[0].interaction, InteractionKind::Click);
        assert_eq!(interactive[0].event_handlers, vec!["onClick"]);
        assert_eq!(interactive[1].interaction, InteractionKind::Input);
        assert_eq!(interactive[1].event_handlers, vec!["onChange", "onFocus", "onBlur"]);
    }

    #[test]
    fn test_confidence_weights() {
        assert_approx_eq!(
            f64,
            wireframe_confidence(5, LayoutStructure::SimpleLayout, 1),
            0.56,
            epsilon = 1e-9
        );
        assert_approx_eq!(f64, wireframe_confidence(50, LayoutStructure::DashboardLayout, 50), 1.0);
        assert_approx_eq!(f64, wireframe_confidence(0, LayoutStructure::Unknown, 0), 0.0);
    }
}
