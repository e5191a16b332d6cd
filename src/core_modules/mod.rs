pub mod element_classifier;
pub mod empty_results;
pub mod geometry;
pub mod layout_enhancer;
pub mod merger;
pub mod raw_element;
pub mod spatial_analyzer;
pub mod wireframe_analyzer;
pub mod wireframe_document;
