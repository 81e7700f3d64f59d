//! Shaping canonical rows into edges

use crate::types::{AdaptedTable, CanonicalRow, CaseId, Edge, RelationType};

/// Turn canonical rows of one relationship type into edges, one per row.
///
/// Row order is preserved and no row is filtered here; adapters have already
/// guaranteed both endpoints.
pub fn extract(rows: Vec<CanonicalRow>, relation_type: RelationType, case_id: CaseId) -> Vec<Edge> {
    rows.into_iter()
        .map(|row| Edge {
            source_entity_id: row.source,
            target_entity_id: row.target,
            relation_type,
            attributes: row.attributes,
            case_id,
        })
        .collect()
}

/// Extract an adapted table, keeping its emission order
pub fn extract_all(adapted: AdaptedTable, case_id: CaseId) -> Vec<Edge> {
    adapted
        .groups
        .into_iter()
        .flat_map(|group| extract(group.rows, group.relation, case_id))
        .collect()
}
