// ABOUTME: Relocates selected table rows into their table's thead.
// ABOUTME: Generators often emit header rows inside tbody; this moves them where they belong.

use std::collections::HashMap;

use ego_tree::NodeId;
use scraper::ElementRef;

use super::each_match;
use crate::dom::render::Edit;
use crate::dom::selectors::compile;
use crate::error::Result;

/// Moves every matched `<tr>` into the `<thead>` of its nearest `<table>`.
///
/// Rows are appended to an existing thead; otherwise a thead is created
/// before the table's first `tbody`, `tr` or `tfoot`. Rows already inside a
/// thead, rows outside any table and non-row matches are left alone.
pub fn move_rows_to_head(content: Option<&str>, selector: &str) -> Result<Option<String>> {
    const OP: &str = "move_rows_to_head";
    let selector = compile(OP, selector)?;
    // Target section (existing thead or the table) for each table seen so far.
    let mut targets: HashMap<NodeId, NodeId> = HashMap::new();

    each_match(OP, content, &selector, |row, plan| {
        if row.value().name() != "tr" {
            return Ok(());
        }
        let in_head = row
            .parent()
            .and_then(ElementRef::wrap)
            .map(|p| p.value().name() == "thead")
            .unwrap_or(false);
        if in_head {
            return Ok(());
        }
        let Some(table) = row
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|a| a.value().name() == "table")
        else {
            return Ok(());
        };

        let target = *targets.entry(table.id()).or_insert_with(|| {
            table
                .children()
                .filter_map(ElementRef::wrap)
                .find(|c| c.value().name() == "thead")
                .map(|head| head.id())
                .unwrap_or_else(|| table.id())
        });

        plan.insert(row.id(), Edit::Remove);
        let moved = *row;
        match plan.get_mut(&target) {
            Some(Edit::AppendRows(rows)) | Some(Edit::InsertHead(rows)) => rows.push(moved),
            _ if target == table.id() => {
                plan.insert(target, Edit::InsertHead(vec![moved]));
            }
            _ => {
                plan.insert(target, Edit::AppendRows(vec![moved]));
            }
        }
        Ok(())
    })
}
