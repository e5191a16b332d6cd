// THEORY:
// The `wireframe_document` is the hand-off format for downstream code
// generation. It flattens one image's final classification into a list of
// components (an id, a type, a position and a few type-specific defaults a
// generator can render straight away) plus the strong relationships between
// them.
//
// Key architectural principles:
// 1.  **Family Dispatch**: Default properties are chosen by the component
//     family in the type profile table, never by ad hoc checks on type names.
// 2.  **Stable Identifiers**: Ids are built from the image index, the type and
//     a per-image sequence number, so re-running an analysis yields the same
//     document and ids from different images never collide after merging.
// 3.  **Closed Relationship Set**: A relationship is only kept when both of
//     its endpoints became components.

use crate::core_modules::element_classifier::{ComponentFamily, WireframeElement, WireframeType};
use crate::core_modules::geometry::Bounds;
use crate::core_modules::spatial_analyzer::{RelationshipKind, SpatialRelationship};
use serde::Serialize;
use std::collections::HashMap;

/// Type-specific defaults attached to a component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ComponentProperties {
    Button {
        variant: &'static str,
        size: &'static str,
    },
    Input {
        #[serde(rename = "type")]
        input_type: &'static str,
        placeholder: &'static str,
    },
    Text {
        content: &'static str,
    },
    /// Structural components carry no defaults.
    None,
}

impl ComponentProperties {
    pub fn for_element(element: &WireframeElement) -> Self {
        let wireframe_type = element.wireframe_type;
        match wireframe_type.profile().family {
            ComponentFamily::Button => ComponentProperties::Button {
                variant: if wireframe_type == WireframeType::Button {
                    "primary"
                } else {
                    "secondary"
                },
                size: button_size(element.bounds.height),
            },
            ComponentFamily::Input => ComponentProperties::Input {
                input_type: "text",
                placeholder: "Enter text...",
            },
            ComponentFamily::Text => ComponentProperties::Text {
                content: placeholder_text(wireframe_type),
            },
            ComponentFamily::Structural => ComponentProperties::None,
        }
    }
}

fn button_size(height: f64) -> &'static str {
    if height < 32.0 {
        "small"
    } else if height < 48.0 {
        "medium"
    } else {
        "large"
    }
}

fn placeholder_text(wireframe_type: WireframeType) -> &'static str {
    match wireframe_type {
        WireframeType::TextHeading => "Heading",
        WireframeType::TextLabel => "Label",
        _ => "Lorem ipsum dolor sit amet, consectetur adipiscing elit.",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireframeComponent {
    pub id: String,
    #[serde(rename = "type")]
    pub wireframe_type: WireframeType,
    pub bounds: Bounds,
    pub properties: ComponentProperties,
}

/// A relationship between two components, referenced by component id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentRelationship {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
    pub strength: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WireframeDocument {
    pub components: Vec<WireframeComponent>,
    pub relationships: Vec<ComponentRelationship>,
}

impl WireframeDocument {
    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.relationships.is_empty()
    }

    /// Appends another document's components and relationships.
    pub fn extend(&mut self, other: WireframeDocument) {
        self.components.extend(other.components);
        self.relationships.extend(other.relationships);
    }
}

pub fn component_id(image_index: usize, wireframe_type: WireframeType, sequence: usize) -> String {
    format!("img{image_index}-{wireframe_type}-{sequence}")
}

/// Builds the document for one image. Relationships at or below
/// `relationship_threshold` are left out.
pub fn build_document(
    image_index: usize,
    elements: &[WireframeElement],
    relationships: &[SpatialRelationship],
    relationship_threshold: f64,
) -> WireframeDocument {
    let components: Vec<WireframeComponent> = elements
        .iter()
        .enumerate()
        .map(|(sequence, element)| WireframeComponent {
            id: component_id(image_index, element.wireframe_type, sequence),
            wireframe_type: element.wireframe_type,
            bounds: element.bounds,
            properties: ComponentProperties::for_element(element),
        })
        .collect();

    let relationships = {
        let ids: HashMap<usize, &str> = elements
            .iter()
            .zip(&components)
            .map(|(element, component)| (element.source_index, component.id.as_str()))
            .collect();

        relationships
            .iter()
            .filter(|r| r.strength > relationship_threshold)
            .filter_map(|r| {
                let source = ids.get(&r.source)?;
                let target = ids.get(&r.target)?;
                Some(ComponentRelationship {
                    source: source.to_string(),
                    target: target.to_string(),
                    kind: r.kind,
                    strength: r.strength,
                })
            })
            .collect()
    };

    WireframeDocument {
        components,
        relationships,
    }
}
