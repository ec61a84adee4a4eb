use std::collections::HashMap;

use crate::error::{PlanError, Result};
use crate::ingest::tables::{CategoryRow, CostRow, NutritionRow, PreferenceRow};
use crate::models::{Candidate, Category, MICRO_COUNT, SLOTS_PER_DAY};

const SCALE_EPS: f64 = 1e-9;

/// Candidate indices grouped by category, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct CategoryPools {
    pub rice: Vec<usize>,
    pub soup: Vec<usize>,
    pub side: Vec<usize>,
    pub snack: Vec<usize>,
}

impl CategoryPools {
    pub fn for_category(&self, category: Category) -> &[usize] {
        match category {
            Category::Rice => &self.rice,
            Category::Soup => &self.soup,
            Category::Side => &self.side,
            Category::Snack => &self.snack,
        }
    }
}

/// Immutable candidate table plus derived indices. Built once per run.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<Candidate>,
    pools: CategoryPools,
    key_to_index: HashMap<String, usize>,
    micro_scales: [f64; MICRO_COUNT],
}

impl Catalog {
    pub fn items(&self) -> &[Candidate] {
        &self.items
    }

    pub fn item(&self, idx: usize) -> &Candidate {
        &self.items[idx]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn pools(&self) -> &CategoryPools {
        &self.pools
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.key_to_index.get(key).copied()
    }

    /// Per-micronutrient normalization scale: catalog-wide maximum times the
    /// number of daily slots.
    pub fn micro_scales(&self) -> &[f64; MICRO_COUNT] {
        &self.micro_scales
    }

    /// Attach student preference weights by normalized key, clamped to [0, 1].
    /// Items absent from the table keep weight 0.
    pub fn attach_preferences(&mut self, rows: &[PreferenceRow]) {
        let mut by_key: HashMap<&str, f64> = HashMap::new();
        for row in rows {
            by_key.insert(row.key.as_str(), row.weight.clamp(0.0, 1.0));
        }
        for item in &mut self.items {
            item.pref_weight = by_key.get(item.key.as_str()).copied().unwrap_or(0.0);
        }
    }
}

/// Running mean that ignores missing samples, mirroring a column-wise
/// average over rows that actually carry a value.
#[derive(Debug, Clone, Copy, Default)]
struct MeanAcc {
    sum: f64,
    n: usize,
}

impl MeanAcc {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.n += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

#[derive(Debug, Clone, Default)]
struct NutritionAgg {
    kcal: MeanAcc,
    carb_g: MeanAcc,
    protein_g: MeanAcc,
    fat_g: MeanAcc,
    micros: [MeanAcc; MICRO_COUNT],
}

/// Merge the three source tables into the candidate catalog.
///
/// Rows are grouped by normalized key with numeric fields averaged across
/// duplicates; cost and nutrition are inner-joined; category is attached
/// from the (optional) category table. Rows lacking price or any of the
/// four macro fields are dropped, as are rows with no usable category.
///
/// Fails when `rice`, `soup`, or both of (`side`, `snack`) end up with zero
/// members, because a feasible day could never be assembled.
pub fn build_catalog(
    cost: &[CostRow],
    nutrition: &[NutritionRow],
    categories: &[CategoryRow],
) -> Result<Catalog> {
    // Cost: first-seen display name, averaged price, stable key order.
    let mut cost_order: Vec<&str> = Vec::new();
    let mut cost_by_key: HashMap<&str, (&str, MeanAcc)> = HashMap::new();
    for row in cost {
        let entry = cost_by_key
            .entry(row.key.as_str())
            .or_insert_with(|| {
                cost_order.push(row.key.as_str());
                (row.name.as_str(), MeanAcc::default())
            });
        entry.1.push(Some(row.price));
    }

    let mut nutrition_by_key: HashMap<&str, NutritionAgg> = HashMap::new();
    for row in nutrition {
        let agg = nutrition_by_key.entry(row.key.as_str()).or_default();
        agg.kcal.push(row.kcal);
        agg.carb_g.push(row.carb_g);
        agg.protein_g.push(row.protein_g);
        agg.fat_g.push(row.fat_g);
        for i in 0..MICRO_COUNT {
            agg.micros[i].push(row.micros[i]);
        }
    }

    // First mapping wins for duplicate category rows.
    let mut category_by_key: HashMap<&str, Category> = HashMap::new();
    for row in categories {
        category_by_key.entry(row.key.as_str()).or_insert(row.category);
    }

    let mut items: Vec<Candidate> = Vec::new();
    let mut joined = 0usize;
    for key in cost_order {
        let Some((name, price_acc)) = cost_by_key.get(key) else {
            continue;
        };
        let Some(price) = price_acc.mean() else {
            continue;
        };
        let Some(agg) = nutrition_by_key.get(key) else {
            continue;
        };
        let (Some(kcal), Some(carb_g), Some(protein_g), Some(fat_g)) = (
            agg.kcal.mean(),
            agg.carb_g.mean(),
            agg.protein_g.mean(),
            agg.fat_g.mean(),
        ) else {
            continue;
        };
        joined += 1;
        let Some(category) = category_by_key.get(key).copied() else {
            continue;
        };

        let mut micros = [0.0; MICRO_COUNT];
        for i in 0..MICRO_COUNT {
            micros[i] = agg.micros[i].mean().unwrap_or(0.0);
        }

        items.push(Candidate {
            key: key.to_string(),
            name: name.to_string(),
            category,
            price,
            kcal,
            carb_g,
            protein_g,
            fat_g,
            micros,
            pref_weight: 0.0,
        });
    }

    // Rows that merged but all fell to the category filter fall through to
    // the coverage check below, which names the missing categories.
    if items.is_empty() && joined == 0 {
        return Err(PlanError::EmptyCatalog);
    }

    let mut pools = CategoryPools::default();
    for (i, item) in items.iter().enumerate() {
        match item.category {
            Category::Rice => pools.rice.push(i),
            Category::Soup => pools.soup.push(i),
            Category::Side => pools.side.push(i),
            Category::Snack => pools.snack.push(i),
        }
    }

    let mut missing = Vec::new();
    if pools.rice.is_empty() {
        missing.push("rice".to_string());
    }
    if pools.soup.is_empty() {
        missing.push("soup".to_string());
    }
    if pools.side.is_empty() && pools.snack.is_empty() {
        missing.push("side or snack".to_string());
    }
    if !missing.is_empty() {
        return Err(PlanError::MissingCategories(missing));
    }

    let mut micro_scales = [0.0; MICRO_COUNT];
    for m in 0..MICRO_COUNT {
        let max = items
            .iter()
            .map(|c| c.micros[m])
            .fold(0.0_f64, f64::max);
        micro_scales[m] = max.max(SCALE_EPS) * SLOTS_PER_DAY as f64;
    }

    let key_to_index = items
        .iter()
        .enumerate()
        .map(|(i, c)| (c.key.clone(), i))
        .collect();

    Ok(Catalog {
        items,
        pools,
        key_to_index,
        micro_scales,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Micro;

    fn cost_row(name: &str, price: f64) -> CostRow {
        CostRow {
            key: crate::models::normalize_key(name),
            name: name.to_string(),
            price,
        }
    }

    fn nutrition_row(name: &str, kcal: f64, carb: f64, protein: f64, fat: f64) -> NutritionRow {
        NutritionRow {
            key: crate::models::normalize_key(name),
            name: name.to_string(),
            kcal: Some(kcal),
            carb_g: Some(carb),
            protein_g: Some(protein),
            fat_g: Some(fat),
            micros: [None; MICRO_COUNT],
        }
    }

    fn category_row(name: &str, category: Category) -> CategoryRow {
        CategoryRow {
            key: crate::models::normalize_key(name),
            category,
        }
    }

    fn minimal_tables() -> (Vec<CostRow>, Vec<NutritionRow>, Vec<CategoryRow>) {
        let names = [
            ("Rice", Category::Rice),
            ("Soup", Category::Soup),
            ("Side", Category::Side),
        ];
        let cost = names.iter().map(|(n, _)| cost_row(n, 1000.0)).collect();
        let nutrition = names
            .iter()
            .map(|(n, _)| nutrition_row(n, 200.0, 30.0, 5.0, 5.0))
            .collect();
        let categories = names.iter().map(|(n, c)| category_row(n, *c)).collect();
        (cost, nutrition, categories)
    }

    #[test]
    fn test_duplicate_rows_are_averaged() {
        let (mut cost, nutrition, categories) = minimal_tables();
        cost.push(cost_row("rice", 2000.0)); // same key, different case
        let catalog = build_catalog(&cost, &nutrition, &categories).unwrap();
        let rice = &catalog.items()[catalog.index_of("rice").unwrap()];
        assert_eq!(rice.price, 1500.0);
    }

    #[test]
    fn test_rows_without_category_are_dropped() {
        let (mut cost, mut nutrition, categories) = minimal_tables();
        cost.push(cost_row("Mystery", 500.0));
        nutrition.push(nutrition_row("Mystery", 100.0, 10.0, 2.0, 2.0));
        let catalog = build_catalog(&cost, &nutrition, &categories).unwrap();
        assert_eq!(catalog.len(), 3);
        assert!(catalog.index_of("mystery").is_none());
    }

    #[test]
    fn test_rows_missing_macros_are_dropped() {
        let (mut cost, mut nutrition, mut categories) = minimal_tables();
        cost.push(cost_row("Thin", 500.0));
        let mut row = nutrition_row("Thin", 100.0, 10.0, 2.0, 2.0);
        row.fat_g = None;
        nutrition.push(row);
        categories.push(category_row("Thin", Category::Side));
        let catalog = build_catalog(&cost, &nutrition, &categories).unwrap();
        assert!(catalog.index_of("thin").is_none());
    }

    #[test]
    fn test_missing_required_category_fails() {
        let (cost, nutrition, mut categories) = minimal_tables();
        categories.retain(|c| c.category != Category::Soup);
        let err = build_catalog(&cost, &nutrition, &categories).unwrap_err();
        match err {
            PlanError::MissingCategories(missing) => {
                assert_eq!(missing, vec!["soup".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_omitted_category_table_names_missing_categories() {
        let (cost, nutrition, _) = minimal_tables();
        let err = build_catalog(&cost, &nutrition, &[]).unwrap_err();
        match err {
            PlanError::MissingCategories(missing) => {
                assert_eq!(
                    missing,
                    vec![
                        "rice".to_string(),
                        "soup".to_string(),
                        "side or snack".to_string()
                    ]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_disjoint_tables_yield_empty_catalog() {
        let (cost, _, categories) = minimal_tables();
        let nutrition = vec![nutrition_row("Unrelated", 100.0, 10.0, 2.0, 2.0)];
        let err = build_catalog(&cost, &nutrition, &categories).unwrap_err();
        assert!(matches!(err, PlanError::EmptyCatalog));
    }

    #[test]
    fn test_micro_scales_use_catalog_max_times_slots() {
        let (cost, mut nutrition, categories) = minimal_tables();
        nutrition[0].micros[Micro::Calcium.index()] = Some(50.0);
        nutrition[1].micros[Micro::Calcium.index()] = Some(120.0);
        let catalog = build_catalog(&cost, &nutrition, &categories).unwrap();
        assert_eq!(catalog.micro_scales()[Micro::Calcium.index()], 120.0 * 6.0);
        // Untracked micro falls back to the epsilon floor.
        assert!(catalog.micro_scales()[Micro::VitD.index()] < 1e-6);
    }

    #[test]
    fn test_attach_preferences_clamps_and_defaults() {
        let (cost, nutrition, categories) = minimal_tables();
        let mut catalog = build_catalog(&cost, &nutrition, &categories).unwrap();
        catalog.attach_preferences(&[PreferenceRow {
            key: "rice".to_string(),
            weight: 1.8,
        }]);
        assert_eq!(catalog.items()[catalog.index_of("rice").unwrap()].pref_weight, 1.0);
        assert_eq!(catalog.items()[catalog.index_of("soup").unwrap()].pref_weight, 0.0);
    }
}
