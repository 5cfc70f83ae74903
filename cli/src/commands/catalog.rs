use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use sprout_core::catalog::{CatalogItem, FoodCatalog};

use super::helpers::{parse_meal_category, truncate};

pub(crate) fn cmd_catalog(category: &str, search: Option<&str>, json: bool) -> Result<()> {
    let category = parse_meal_category(category)?;
    let catalog = FoodCatalog::new();
    let items = catalog.search(category, search.unwrap_or(""));

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        eprintln!("No {category} items match '{}'", search.unwrap_or(""));
        process::exit(2);
    }

    print_catalog_table(&items);
    eprintln!("\nLog one with `sprout eat <id>`");
    Ok(())
}

fn print_catalog_table(items: &[&CatalogItem]) {
    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "kcal")]
        calories: u32,
        #[tabled(rename = "P")]
        protein: String,
        #[tabled(rename = "C")]
        carbs: String,
        #[tabled(rename = "F")]
        fat: String,
        #[tabled(rename = "Benefits")]
        benefits: String,
    }

    let rows: Vec<ItemRow> = items
        .iter()
        .map(|i| ItemRow {
            id: i.id.clone(),
            name: truncate(&i.name, 30),
            calories: i.calories,
            protein: format!("{:.0}g", i.protein),
            carbs: format!("{:.0}g", i.carbs),
            fat: format!("{:.0}g", i.fat),
            benefits: truncate(&i.benefits.join(", "), 40),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..6)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}
