//! Inventory arithmetic
//!
//! Equipment rows are stored individually but presented as inventory lines
//! keyed by (name, site, rental flag). This module groups rows into lines,
//! spreads an edited line total back over its rows, and plans the stock
//! movements performed when requests and transfers are approved. Everything
//! here is pure so the repository can apply the result inside a single
//! transaction.

use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::equipment::{Equipment, EquipmentWithSite},
};

/// Site label for rows that are not attached to any site
pub const UNASSIGNED_SITE: &str = "Not Assigned";

/// One inventory line: all rows sharing name, site and rental flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct InventoryLine {
    pub name: String,
    pub site_id: Option<i32>,
    pub site_name: String,
    pub is_rental: bool,
    pub total_quantity: i64,
    /// Row ids making up the line, in query order
    pub ids: Vec<i32>,
}

/// Quantity per equipment name within one site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NamedCount {
    pub name: String,
    pub quantity: i64,
}

/// Group rows into inventory lines, keeping the order in which each line
/// first appears.
pub fn group_lines(rows: &[EquipmentWithSite]) -> Vec<InventoryLine> {
    let mut index: HashMap<(&str, Option<i32>, bool), usize> = HashMap::new();
    let mut lines: Vec<InventoryLine> = Vec::new();

    for row in rows {
        let key = (row.name.as_str(), row.site_id, row.is_rental);
        match index.get(&key) {
            Some(&i) => {
                lines[i].total_quantity += i64::from(row.quantity);
                lines[i].ids.push(row.id);
            }
            None => {
                index.insert(key, lines.len());
                lines.push(InventoryLine {
                    name: row.name.clone(),
                    site_id: row.site_id,
                    site_name: row
                        .site_name
                        .clone()
                        .unwrap_or_else(|| UNASSIGNED_SITE.to_string()),
                    is_rental: row.is_rental,
                    total_quantity: i64::from(row.quantity),
                    ids: vec![row.id],
                });
            }
        }
    }

    lines
}

/// Sum quantities by name over the owned (`rental == false`) or rented rows
pub fn count_by_name(rows: &[Equipment], rental: bool) -> Vec<NamedCount> {
    let mut counts: Vec<NamedCount> = Vec::new();
    for row in rows.iter().filter(|r| r.is_rental == rental) {
        match counts.iter_mut().find(|c| c.name == row.name) {
            Some(count) => count.quantity += i64::from(row.quantity),
            None => counts.push(NamedCount {
                name: row.name.clone(),
                quantity: i64::from(row.quantity),
            }),
        }
    }
    counts
}

/// Split `total` over `rows` rows: every row gets `total / rows`, the first
/// row also takes the remainder.
pub fn distribute_quantity(total: i32, rows: usize) -> AppResult<Vec<i32>> {
    if rows == 0 {
        return Err(AppError::Validation(
            "At least one equipment row is required".to_string(),
        ));
    }
    if total < 0 {
        return Err(AppError::Validation(
            "Quantity cannot be negative".to_string(),
        ));
    }

    let n = i32::try_from(rows)
        .map_err(|_| AppError::Validation("Too many equipment rows".to_string()))?;
    let per_row = total / n;
    let remainder = total % n;

    Ok((0..rows)
        .map(|i| if i == 0 { per_row + remainder } else { per_row })
        .collect())
}

/// What happens to a row after stock is taken out of it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockRemoval {
    /// Nothing left; the row is deleted
    Delete,
    /// Row keeps this quantity
    Keep(i32),
}

/// Take `quantity` out of a row holding `current`
pub fn remove_stock(current: i32, quantity: i32) -> AppResult<StockRemoval> {
    if quantity <= 0 {
        return Err(AppError::Validation(
            "Quantity must be at least 1".to_string(),
        ));
    }
    if quantity > current {
        return Err(AppError::InsufficientStock(format!(
            "Requested {} but only {} available",
            quantity, current
        )));
    }

    Ok(match current - quantity {
        0 => StockRemoval::Delete,
        left => StockRemoval::Keep(left),
    })
}

/// Stock movement for an approved transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPlan {
    pub source: StockRemoval,
    /// Quantity the destination line holds afterwards
    pub destination_quantity: i32,
    /// No matching row exists at the destination; one must be inserted
    pub insert_destination: bool,
}

/// Plan moving `moved` units from a source row holding `source_quantity` to
/// the destination row holding `destination_quantity` (None when the
/// destination has no matching line yet).
pub fn plan_transfer(
    source_quantity: i32,
    destination_quantity: Option<i32>,
    moved: i32,
) -> AppResult<TransferPlan> {
    let source = remove_stock(source_quantity, moved)?;
    let current = destination_quantity.unwrap_or(0);
    let after = current
        .checked_add(moved)
        .ok_or_else(|| AppError::Validation("Quantity overflow at destination".to_string()))?;

    Ok(TransferPlan {
        source,
        destination_quantity: after,
        insert_destination: destination_quantity.is_none(),
    })
}

/// Equipment ids touched by a transfer approval, in the order their row
/// locks must be taken
pub fn lock_order(source_id: i32, destination_id: Option<i32>) -> Vec<i32> {
    let mut ids: Vec<i32> = std::iter::once(source_id).chain(destination_id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Render inventory lines as an HTML table for the email export
pub fn render_html_table(title: &str, lines: &[InventoryLine]) -> String {
    let mut html = String::new();
    html.push_str("<html><body>");
    html.push_str(&format!("<h2>{}</h2>", escape_html(title)));
    html.push_str(
        "<table border=\"1\" cellpadding=\"4\" cellspacing=\"0\">\
         <thead><tr><th>Equipment</th><th>Site</th><th>Rental</th><th>Quantity</th></tr></thead><tbody>",
    );
    for line in lines {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&line.name),
            escape_html(&line.site_name),
            if line.is_rental { "Yes" } else { "No" },
            line.total_quantity
        ));
    }
    html.push_str("</tbody></table></body></html>");
    html
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::enums::EquipmentStatus;

    fn row(id: i32, name: &str, site_id: Option<i32>, quantity: i32, is_rental: bool) -> EquipmentWithSite {
        EquipmentWithSite {
            id,
            name: name.to_string(),
            site_id,
            site_name: site_id.map(|s| format!("Site {}", s)),
            quantity,
            is_rental,
        }
    }

    fn equipment(id: i32, name: &str, quantity: i32, is_rental: bool) -> Equipment {
        let now = Utc::now();
        Equipment {
            id,
            name: name.to_string(),
            site_id: Some(1),
            quantity,
            is_rental,
            status: EquipmentStatus::Available,
            date_bought: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_group_lines_by_name_site_and_rental() {
        let rows = vec![
            row(1, "Drill", Some(1), 2, false),
            row(2, "Drill", Some(1), 3, false),
            row(3, "Drill", Some(1), 1, true),
            row(4, "Drill", Some(2), 4, false),
            row(5, "Ladder", None, 6, false),
        ];

        let lines = group_lines(&rows);

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].ids, vec![1, 2]);
        assert_eq!(lines[0].total_quantity, 5);
        assert_eq!(lines[1].ids, vec![3]);
        assert!(lines[1].is_rental);
        assert_eq!(lines[2].site_name, "Site 2");
        assert_eq!(lines[3].site_name, UNASSIGNED_SITE);
    }

    #[test]
    fn test_count_by_name_splits_owned_and_rental() {
        let rows = vec![
            equipment(1, "Drill", 2, false),
            equipment(2, "Drill", 5, false),
            equipment(3, "Drill", 1, true),
            equipment(4, "Mixer", 1, false),
        ];

        let owned = count_by_name(&rows, false);
        assert_eq!(
            owned,
            vec![
                NamedCount { name: "Drill".to_string(), quantity: 7 },
                NamedCount { name: "Mixer".to_string(), quantity: 1 },
            ]
        );

        let rental = count_by_name(&rows, true);
        assert_eq!(rental, vec![NamedCount { name: "Drill".to_string(), quantity: 1 }]);
    }

    #[test]
    fn test_distribute_quantity_pads_first_row() {
        assert_eq!(distribute_quantity(10, 3).unwrap(), vec![4, 3, 3]);
        assert_eq!(distribute_quantity(9, 3).unwrap(), vec![3, 3, 3]);
        assert_eq!(distribute_quantity(2, 4).unwrap(), vec![2, 0, 0, 0]);
        assert_eq!(distribute_quantity(5, 1).unwrap(), vec![5]);
    }

    #[test]
    fn test_distribute_quantity_preserves_total() {
        for total in 0..50 {
            for rows in 1..7 {
                let parts = distribute_quantity(total, rows).unwrap();
                assert_eq!(parts.len(), rows);
                assert_eq!(parts.iter().sum::<i32>(), total);
            }
        }
    }

    #[test]
    fn test_distribute_quantity_rejects_empty_group() {
        assert!(matches!(distribute_quantity(3, 0), Err(AppError::Validation(_))));
        assert!(matches!(distribute_quantity(-1, 2), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_remove_stock() {
        assert_eq!(remove_stock(5, 2).unwrap(), StockRemoval::Keep(3));
        assert_eq!(remove_stock(5, 5).unwrap(), StockRemoval::Delete);
        assert!(matches!(remove_stock(5, 6), Err(AppError::InsufficientStock(_))));
        assert!(matches!(remove_stock(5, 0), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_plan_transfer_preserves_total_quantity() {
        let cases = [(10, Some(3), 4), (10, None, 10), (1, Some(0), 1), (7, None, 2)];

        for (source, destination, moved) in cases {
            let plan = plan_transfer(source, destination, moved).unwrap();
            let source_after = match plan.source {
                StockRemoval::Delete => 0,
                StockRemoval::Keep(q) => q,
            };
            let before = source + destination.unwrap_or(0);
            let after = source_after + plan.destination_quantity;
            assert_eq!(before, after);
            assert_eq!(plan.insert_destination, destination.is_none());
        }
    }

    #[test]
    fn test_plan_transfer_rejects_oversized_move() {
        assert!(matches!(
            plan_transfer(3, Some(1), 4),
            Err(AppError::InsufficientStock(_))
        ));
        assert!(matches!(plan_transfer(3, None, 0), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_lock_order_is_independent_of_direction() {
        assert_eq!(lock_order(8, Some(3)), vec![3, 8]);
        assert_eq!(lock_order(3, Some(8)), vec![3, 8]);
        assert_eq!(lock_order(5, None), vec![5]);
        assert_eq!(lock_order(5, Some(5)), vec![5]);
    }

    #[test]
    fn test_render_html_table_escapes_names() {
        let lines = vec![InventoryLine {
            name: "Saw <big>".to_string(),
            site_id: Some(1),
            site_name: "North & South".to_string(),
            is_rental: true,
            total_quantity: 3,
            ids: vec![1],
        }];

        let html = render_html_table("Inventory", &lines);

        assert!(html.contains("<td>Saw &lt;big&gt;</td>"));
        assert!(html.contains("<td>North &amp; South</td>"));
        assert!(html.contains("<td>Yes</td><td>3</td>"));
    }
}
