//! Category display formatting

use tabled::Tabled;

use crate::models::Category;

use super::render_table;

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Description")]
    description: String,
}

/// Format categories as a table
pub fn format_category_list(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories found.\n\nRun 'finance init' to create default categories.\n"
            .to_string();
    }

    let rows = categories
        .iter()
        .map(|c| CategoryRow {
            name: c.name().to_string(),
            kind: c.kind().to_string(),
            color: c.color().to_string(),
            description: c.description().unwrap_or("-").to_string(),
        })
        .collect();

    render_table(rows)
}

/// Format category details, with how many transactions use it
pub fn format_category_details(category: &Category, transaction_count: usize) -> String {
    let mut output = String::new();

    output.push_str(&format!("Category: {}\n", category.name()));
    output.push_str(&format!("  ID:           {}\n", category.id()));
    output.push_str(&format!("  Type:         {}\n", category.kind()));
    output.push_str(&format!("  Color:        {}\n", category.color()));
    if let Some(description) = category.description() {
        output.push_str(&format!("  Description:  {}\n", description));
    }
    output.push_str(&format!("  Transactions: {}\n", transaction_count));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;

    #[test]
    fn test_empty_list() {
        assert!(format_category_list(&[]).contains("finance init"));
    }

    #[test]
    fn test_list_shows_names_and_types() {
        let categories = vec![
            Category::new("Salary", TransactionType::Income, None, None).unwrap(),
            Category::new("Rent", TransactionType::Expense, Some("Flat"), None).unwrap(),
        ];

        let output = format_category_list(&categories);
        assert!(output.contains("Salary"));
        assert!(output.contains("Income"));
        assert!(output.contains("Flat"));
    }

    #[test]
    fn test_details() {
        let category = Category::new("Rent", TransactionType::Expense, None, None).unwrap();
        let output = format_category_details(&category, 3);
        assert!(output.contains("Category: Rent"));
        assert!(output.contains("Transactions: 3"));
        assert!(!output.contains("Description"));
    }
}
