//! Transaction display formatting

use std::collections::HashMap;

use tabled::Tabled;

use crate::models::{Aggregate, CategoryId, Transaction, TransactionType};

use super::{render_table, truncate};

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

/// Format transactions as a table
///
/// `category_names` maps category ids to names; unknown ids show as "?".
/// Expenses are shown with a leading minus sign.
pub fn format_transaction_list(
    transactions: &[Transaction],
    category_names: &HashMap<CategoryId, String>,
    date_format: &str,
) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let rows = transactions
        .iter()
        .map(|t| TransactionRow {
            id: t.id().to_string(),
            date: t.date().format(date_format).to_string(),
            description: truncate(t.description(), 30),
            category: category_names
                .get(&t.category_id())
                .cloned()
                .unwrap_or_else(|| "?".to_string()),
            amount: signed_amount(t),
        })
        .collect();

    render_table(rows)
}

/// Format a single transaction
pub fn format_transaction_details(
    txn: &Transaction,
    category_name: Option<&str>,
    date_format: &str,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id()));
    output.push_str(&format!("  Description: {}\n", txn.description()));
    output.push_str(&format!("  Type:        {}\n", txn.kind()));
    output.push_str(&format!("  Amount:      {}\n", txn.amount()));
    output.push_str(&format!("  Date:        {}\n", txn.date().format(date_format)));
    output.push_str(&format!(
        "  Category:    {}\n",
        category_name.unwrap_or("(unknown)")
    ));

    if let Some(notes) = txn.notes() {
        output.push_str(&format!("  Notes:       {}\n", notes));
    }

    if let Some(updated) = txn.updated_at() {
        output.push_str(&format!("  Updated:     {}\n", updated.format("%Y-%m-%d %H:%M")));
    }

    output
}

fn signed_amount(txn: &Transaction) -> String {
    match txn.kind() {
        TransactionType::Expense => format!("-{}", txn.amount()),
        TransactionType::Income => format!("+{}", txn.amount()),
    }
}
