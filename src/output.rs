//! Table and JSON output formatting for CLI commands.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::{Table, Tabled};

use drive_entity::item::ItemSummary;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Item display row for table output
#[derive(Debug, Serialize, Tabled)]
pub struct ItemRow {
    /// Item ID
    id: String,
    /// Folder or file
    #[tabled(rename = "type")]
    item_type: String,
    /// Name
    name: String,
    /// Size in bytes
    size: String,
    /// Last update
    updated: String,
}

impl From<&ItemSummary> for ItemRow {
    fn from(item: &ItemSummary) -> Self {
        Self {
            id: item.id.to_string(),
            item_type: item.item_type.to_string(),
            name: item.name.clone(),
            size: item.size_bytes.map(|s| s.to_string()).unwrap_or_default(),
            updated: format_time(item.updated_at),
        }
    }
}

fn format_time(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Print item summaries in the selected format
pub fn print_items(items: &[ItemSummary], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let rows: Vec<ItemRow> = items.iter().map(ItemRow::from).collect();
            print_list(&rows, format);
        }
        OutputFormat::Json => print_json(&items),
    }
}

/// Print a list of rows in the selected format
pub fn print_list<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(rows));
            }
        }
        OutputFormat::Json => print_json(&rows),
    }
}

/// Print a single value in the selected format
pub fn print_item<T: Serialize + Tabled>(item: &T, format: OutputFormat) {
    print_list(std::slice::from_ref(item), format);
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    println!("{json}");
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    eprintln!("⚠ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{key}:"), value);
}
