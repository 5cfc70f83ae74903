//! Static food catalog with precomputed nutrition estimates.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{MealCategory, MealSource, NewMealEntry};

const CALORIE_STEP: u32 = 35;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub category: MealCategory,
    pub calories: u32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub benefits: Vec<String>,
}

impl CatalogItem {
    /// A meal entry for logging this item, tagged as a recommendation.
    #[must_use]
    pub fn to_new_entry(&self, category: Option<MealCategory>) -> NewMealEntry {
        NewMealEntry {
            name: self.name.clone(),
            calories: f64::from(self.calories),
            protein: Some(self.protein),
            carbs: Some(self.carbs),
            fat: Some(self.fat),
            category: category.unwrap_or(self.category),
            source: MealSource::FoodRecommendation,
        }
    }
}

struct Seed {
    name: &'static str,
    benefits: &'static [&'static str],
}

const BREAKFAST: &[Seed] = &[
    Seed {
        name: "Oatmeal with Berries",
        benefits: &["High fiber", "Antioxidants", "Slow-release energy"],
    },
    Seed {
        name: "Greek Yogurt Parfait",
        benefits: &["Probiotics", "High protein"],
    },
    Seed {
        name: "Vegetable Poha",
        benefits: &["Light on the stomach", "Iron rich"],
    },
    Seed {
        name: "Masala Dosa",
        benefits: &["Fermented batter", "Good carbs"],
    },
    Seed {
        name: "Scrambled Eggs on Toast",
        benefits: &["Complete protein", "Keeps you full"],
    },
    Seed {
        name: "Banana Smoothie",
        benefits: &["Potassium", "Quick energy"],
    },
];

const LUNCH: &[Seed] = &[
    Seed {
        name: "Quinoa Salad",
        benefits: &["Complete protein", "High fiber"],
    },
    Seed {
        name: "Dal with Brown Rice",
        benefits: &["Plant protein", "Complex carbs"],
    },
    Seed {
        name: "Grilled Chicken Wrap",
        benefits: &["Lean protein", "Portable"],
    },
    Seed {
        name: "Rajma Chawal",
        benefits: &["Iron rich", "Comfort food"],
    },
    Seed {
        name: "Paneer Tikka Bowl",
        benefits: &["Calcium", "High protein"],
    },
];

const DINNER: &[Seed] = &[
    Seed {
        name: "Baked Salmon with Greens",
        benefits: &["Omega-3", "Heart healthy"],
    },
    Seed {
        name: "Vegetable Stir Fry",
        benefits: &["Vitamins", "Low fat"],
    },
    Seed {
        name: "Chicken Curry with Roti",
        benefits: &["High protein", "Warming spices"],
    },
    Seed {
        name: "Lentil Soup",
        benefits: &["Plant protein", "Easy to digest"],
    },
    Seed {
        name: "Tofu and Broccoli",
        benefits: &["Calcium", "Low calorie"],
    },
];

const SNACK: &[Seed] = &[
    Seed {
        name: "Mixed Nuts",
        benefits: &["Healthy fats", "Vitamin E"],
    },
    Seed {
        name: "Apple with Peanut Butter",
        benefits: &["Fiber", "Sustained energy"],
    },
    Seed {
        name: "Roasted Chana",
        benefits: &["High protein", "Crunchy"],
    },
    Seed {
        name: "Hummus and Carrots",
        benefits: &["Beta-carotene", "Plant protein"],
    },
    Seed {
        name: "Sprouts Chaat",
        benefits: &["Enzymes", "Low calorie"],
    },
];

fn seeds(category: MealCategory) -> &'static [Seed] {
    match category {
        MealCategory::Breakfast => BREAKFAST,
        MealCategory::Lunch => LUNCH,
        MealCategory::Dinner => DINNER,
        MealCategory::Snack => SNACK,
    }
}

fn base_calories(category: MealCategory) -> u32 {
    match category {
        MealCategory::Breakfast => 250,
        MealCategory::Lunch => 400,
        MealCategory::Dinner => 450,
        MealCategory::Snack => 120,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn build_item(category: MealCategory, index: usize, seed: &Seed) -> CatalogItem {
    let calories = base_calories(category) + index as u32 * CALORIE_STEP;
    let cal = f64::from(calories);
    CatalogItem {
        id: format!("{category}-{index}"),
        name: seed.name.to_string(),
        category,
        calories,
        protein: (cal * 0.18 / 4.0).round(),
        carbs: (cal * 0.50 / 4.0).round(),
        fat: (cal * 0.32 / 9.0).round(),
        benefits: seed.benefits.iter().map(|b| (*b).to_string()).collect(),
    }
}

/// Immutable catalog built once from the seed lists.
pub struct FoodCatalog {
    items: BTreeMap<MealCategory, Vec<CatalogItem>>,
}

impl Default for FoodCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl FoodCatalog {
    #[must_use]
    pub fn new() -> Self {
        let items = MealCategory::ALL
            .iter()
            .map(|&category| {
                let list = seeds(category)
                    .iter()
                    .enumerate()
                    .map(|(i, seed)| build_item(category, i, seed))
                    .collect();
                (category, list)
            })
            .collect();
        Self { items }
    }

    #[must_use]
    pub fn list_by_category(&self, category: MealCategory) -> &[CatalogItem] {
        self.items.get(&category).map_or(&[], Vec::as_slice)
    }

    /// Case-insensitive substring match against the name or any benefit.
    /// An empty query returns the whole category.
    #[must_use]
    pub fn search(&self, category: MealCategory, query: &str) -> Vec<&CatalogItem> {
        let needle = query.trim().to_lowercase();
        self.list_by_category(category)
            .iter()
            .filter(|item| {
                needle.is_empty()
                    || item.name.to_lowercase().contains(&needle)
                    || item
                        .benefits
                        .iter()
                        .any(|b| b.to_lowercase().contains(&needle))
            })
            .collect()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.items.values().flatten().find(|item| item.id == id)
    }
}
