use std::collections::HashSet;

use crate::matching::{max_weight_matching, Edge};
use crate::model::{Table, TableId, TeamId};
use crate::Result;

/// Subtracted from a table's priority when either team has already played there.
pub const REPEAT_PENALTY: i64 = 1000;

/// Assigns distinct tables to pairs, preferring high priority tables and
/// tables neither team has played at. Returns one entry per pair; pairs beyond
/// the number of tables get None.
pub fn assign_tables(
    pairs: &[(TeamId, TeamId)],
    tables: &[Table],
    usage: &HashSet<(TeamId, TableId)>,
) -> Result<Vec<Option<TableId>>> {
    let offset = pairs.len();
    let mut edges = Vec::with_capacity(pairs.len() * tables.len());
    for (i, &(a, b)) in pairs.iter().enumerate() {
        for (j, table) in tables.iter().enumerate() {
            let mut weight = i64::from(table.priority);
            if usage.contains(&(a, table.id)) || usage.contains(&(b, table.id)) {
                weight -= REPEAT_PENALTY;
            }
            edges.push(Edge::new(i, offset + j, weight));
        }
    }
    let matching = max_weight_matching(offset + tables.len(), &edges)?;
    Ok((0..pairs.len())
        .map(|i| matching.mate(i).map(|j| tables[j - offset].id))
        .collect())
}
