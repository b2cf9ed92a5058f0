pub mod analysis;
pub mod api_router;
pub mod charts;
pub mod comparisons;
pub mod core;
pub mod decision_matrix;
pub mod documents;
pub mod llm;
pub mod main_module;
pub mod qa;
pub mod workspaces;

#[cfg(test)]
pub mod tests;
