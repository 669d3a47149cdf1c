use serde::Deserialize;

/// One page of the paged vacancy search.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub found: u64,
    pub pages: u32,
    pub per_page: u32,
    pub page: u32,
    pub items: Vec<SearchItem>,
}

/// A single search hit. Only the id is used; the full record comes from the
/// detail endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    pub id: String,
}

/// Fixed query scope for the vacancy search endpoint.
#[derive(Debug, Clone)]
pub struct SearchFilters {
    /// Region code passed as the `area` query parameter.
    pub area: String,
    /// Role code passed as the `professional_role` query parameter.
    pub professional_role: String,
}

impl Default for SearchFilters {
    fn default() -> Self {
        // The scope the harvester runs with: area 113, programmer/developer roles.
        Self {
            area: "113".to_string(),
            professional_role: "96".to_string(),
        }
    }
}
