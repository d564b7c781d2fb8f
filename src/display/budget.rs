//! Budget display formatting

use std::collections::HashMap;

use tabled::Tabled;

use crate::models::{Budget, CategoryId};

use super::render_table;

#[derive(Tabled)]
struct BudgetRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Limit")]
    limit: String,
    #[tabled(rename = "Spent")]
    spent: String,
    #[tabled(rename = "Remaining")]
    remaining: String,
    #[tabled(rename = "Used")]
    used: String,
}

/// Format budgets as a table
pub fn format_budget_list(budgets: &[Budget], category_names: &HashMap<CategoryId, String>) -> String {
    if budgets.is_empty() {
        return "No budgets found.\n".to_string();
    }

    let rows = budgets
        .iter()
        .map(|b| BudgetRow {
            id: b.id().to_string(),
            period: b.period_label(),
            category: category_names
                .get(&b.category_id())
                .cloned()
                .unwrap_or_else(|| "?".to_string()),
            limit: b.limit().to_string(),
            spent: b.spent().to_string(),
            remaining: b.remaining().to_string(),
            used: format!("{}{}", usage(b), status_marker(b)),
        })
        .collect();

    render_table(rows)
}

/// Format a single budget
pub fn format_budget_details(budget: &Budget, category_name: Option<&str>) -> String {
    let mut output = String::new();

    output.push_str(&format!("Budget: {}\n", budget.id()));
    output.push_str(&format!(
        "  Category:  {}\n",
        category_name.unwrap_or("(unknown)")
    ));
    output.push_str(&format!("  Period:    {}\n", budget.period_label()));
    output.push_str(&format!("  Limit:     {}\n", budget.limit()));
    output.push_str(&format!("  Spent:     {}\n", budget.spent()));
    output.push_str(&format!("  Remaining: {}\n", budget.remaining()));
    output.push_str(&format!("  Used:      {}\n", usage(budget)));

    if budget.is_over_budget() {
        output.push_str("\n  Over budget!\n");
    } else if budget.is_near_limit() {
        output.push_str("\n  Close to the limit.\n");
    }

    output
}

fn usage(budget: &Budget) -> String {
    format!("{}%", budget.percentage_used().round_dp(1).normalize())
}

fn status_marker(budget: &Budget) -> &'static str {
    if budget.is_over_budget() {
        " (over)"
    } else if budget.is_near_limit() {
        " (near)"
    } else {
        ""
    }
}
