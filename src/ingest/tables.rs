use std::path::Path;

use csv::ReaderBuilder;

use crate::error::Result;
use crate::ingest::columns::{fold_header, parse_number, require_column};
use crate::models::{normalize_key, Category, Micro, MICRO_COUNT};

const ITEM_COLS: &[&str] = &["menu", "메뉴", "item", "name", "dish", "음식명", "메뉴명"];
const PRICE_COLS: &[&str] = &[
    "price_per_person",
    "1인_가격",
    "price",
    "cost",
    "총원가",
    "total_cost_won",
    "가격",
];
const CATEGORY_COLS: &[&str] = &["category", "카테고리", "분류"];
const PREF_WEIGHT_COLS: &[&str] = &[
    "weighted_intake_ratio",
    "intake_ratio",
    "preference",
    "선호도",
    "weight",
];
const PAIR_A_COLS: &[&str] = &["menu1", "메뉴1", "menu_a", "메뉴a", "a", "first", "left"];
const PAIR_B_COLS: &[&str] = &["menu2", "메뉴2", "menu_b", "메뉴b", "b", "second", "right"];
const PAIR_WEIGHT_COLS: &[&str] = &[
    "preference",
    "선호도",
    "weight",
    "가중치",
    "score",
    "점수",
    "선호도점수",
];

/// One row of the item-cost table.
#[derive(Debug, Clone)]
pub struct CostRow {
    pub key: String,
    pub name: String,
    pub price: f64,
}

/// One row of the item-nutrition table. Missing cells stay `None`; the
/// catalog builder decides which absences are fatal for a candidate.
#[derive(Debug, Clone)]
pub struct NutritionRow {
    pub key: String,
    pub name: String,
    pub kcal: Option<f64>,
    pub carb_g: Option<f64>,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub micros: [Option<f64>; MICRO_COUNT],
}

#[derive(Debug, Clone)]
pub struct CategoryRow {
    pub key: String,
    pub category: Category,
}

#[derive(Debug, Clone)]
pub struct PreferenceRow {
    pub key: String,
    pub weight: f64,
}

/// One raw pairwise-affinity row; keys already normalized, self-pairs kept
/// out by the reader.
#[derive(Debug, Clone)]
pub struct AffinityRow {
    pub a: String,
    pub b: String,
    pub weight: f64,
}

enum NutritionField {
    Kcal,
    Carb,
    Protein,
    Fat,
    Micro(Micro),
}

/// Map a folded nutrition header to the field it feeds, if any.
fn nutrition_field(folded: &str) -> Option<NutritionField> {
    match folded {
        "kcal" | "calories" | "energy" => Some(NutritionField::Kcal),
        "carbo" | "carb" | "carbs" | "carbohydrate" => Some(NutritionField::Carb),
        "protein" => Some(NutritionField::Protein),
        "fat" | "fats" => Some(NutritionField::Fat),
        "vitaa" | "vit_a" | "vitamin_a" => Some(NutritionField::Micro(Micro::VitA)),
        "thiamin" | "thiamine" => Some(NutritionField::Micro(Micro::Thiamin)),
        "ribo" | "riboflavin" => Some(NutritionField::Micro(Micro::Riboflavin)),
        "niacin" => Some(NutritionField::Micro(Micro::Niacin)),
        "vitac" | "vit_c" | "vitamin_c" => Some(NutritionField::Micro(Micro::VitC)),
        "vitad" | "vit_d" | "vitamin_d" => Some(NutritionField::Micro(Micro::VitD)),
        "calcium" | "ca" => Some(NutritionField::Micro(Micro::Calcium)),
        "fe" | "iron" => Some(NutritionField::Micro(Micro::Iron)),
        _ => None,
    }
}

/// Read headers and rows as lossy UTF-8 so vendor files with stray bytes
/// still parse.
fn read_rows<P: AsRef<Path>>(path: P) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|f| String::from_utf8_lossy(f).into_owned())
                .collect(),
        );
    }
    Ok((headers, rows))
}

fn cell<'a>(row: &'a [String], idx: usize) -> &'a str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

pub fn read_cost_table<P: AsRef<Path>>(path: P) -> Result<Vec<CostRow>> {
    let (headers, rows) = read_rows(path)?;
    let item_idx = require_column(&headers, ITEM_COLS)?;
    let price_idx = require_column(&headers, PRICE_COLS)?;

    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        let name = cell(row, item_idx).trim().to_string();
        let key = normalize_key(&name);
        let Some(price) = parse_number(cell(row, price_idx)) else {
            continue;
        };
        if key.is_empty() {
            continue;
        }
        out.push(CostRow { key, name, price });
    }
    Ok(out)
}

pub fn read_nutrition_table<P: AsRef<Path>>(path: P) -> Result<Vec<NutritionRow>> {
    let (headers, rows) = read_rows(path)?;
    let item_idx = require_column(&headers, ITEM_COLS)?;

    // Column -> field mapping discovered once from the headers.
    let fields: Vec<(usize, NutritionField)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| nutrition_field(&fold_header(h)).map(|f| (i, f)))
        .collect();

    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        let name = cell(row, item_idx).trim().to_string();
        let key = normalize_key(&name);
        if key.is_empty() {
            continue;
        }

        let mut nr = NutritionRow {
            key,
            name,
            kcal: None,
            carb_g: None,
            protein_g: None,
            fat_g: None,
            micros: [None; MICRO_COUNT],
        };
        for (idx, field) in &fields {
            let value = parse_number(cell(row, *idx));
            match field {
                NutritionField::Kcal => nr.kcal = value,
                NutritionField::Carb => nr.carb_g = value,
                NutritionField::Protein => nr.protein_g = value,
                NutritionField::Fat => nr.fat_g = value,
                NutritionField::Micro(m) => nr.micros[m.index()] = value,
            }
        }
        out.push(nr);
    }
    Ok(out)
}

pub fn read_category_table<P: AsRef<Path>>(path: P) -> Result<Vec<CategoryRow>> {
    let (headers, rows) = read_rows(path)?;
    let item_idx = require_column(&headers, ITEM_COLS)?;
    let cat_idx = require_column(&headers, CATEGORY_COLS)?;

    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        let key = normalize_key(cell(row, item_idx));
        let Some(category) = Category::from_label(cell(row, cat_idx)) else {
            continue;
        };
        if key.is_empty() {
            continue;
        }
        out.push(CategoryRow { key, category });
    }
    Ok(out)
}

pub fn read_preference_table<P: AsRef<Path>>(path: P) -> Result<Vec<PreferenceRow>> {
    let (headers, rows) = read_rows(path)?;
    let item_idx = require_column(&headers, ITEM_COLS)?;
    let weight_idx = require_column(&headers, PREF_WEIGHT_COLS)?;

    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        let key = normalize_key(cell(row, item_idx));
        if key.is_empty() {
            continue;
        }
        // Unparseable weights count as "never eaten" rather than dropping the row.
        let weight = parse_number(cell(row, weight_idx)).unwrap_or(0.0);
        out.push(PreferenceRow { key, weight });
    }
    Ok(out)
}

pub fn read_affinity_table<P: AsRef<Path>>(path: P) -> Result<Vec<AffinityRow>> {
    let (headers, rows) = read_rows(path)?;
    let a_idx = require_column(&headers, PAIR_A_COLS)?;
    let b_idx = require_column(&headers, PAIR_B_COLS)?;
    let weight_idx = require_column(&headers, PAIR_WEIGHT_COLS)?;

    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        let a = normalize_key(cell(row, a_idx));
        let b = normalize_key(cell(row, b_idx));
        let Some(weight) = parse_number(cell(row, weight_idx)) else {
            continue;
        };
        if a.is_empty() || b.is_empty() || a == b {
            continue;
        }
        out.push(AffinityRow { a, b, weight });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_cost_table_skips_bad_prices() {
        let file = csv_file("Menu,Price\nRice Bowl,1200\nBroken,\nSoup,\"1,050\"\n");
        let rows = read_cost_table(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, "rice bowl");
        assert_eq!(rows[1].price, 1050.0);
    }

    #[test]
    fn test_read_nutrition_table_maps_synonym_headers() {
        let file = csv_file("menu,kcal,carbo,protein,fat,vitaA,fe\nTofu,120,4,10,7,30,1.2\n");
        let rows = read_nutrition_table(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.kcal, Some(120.0));
        assert_eq!(r.carb_g, Some(4.0));
        assert_eq!(r.micros[Micro::VitA.index()], Some(30.0));
        assert_eq!(r.micros[Micro::Iron.index()], Some(1.2));
        assert_eq!(r.micros[Micro::Calcium.index()], None);
    }

    #[test]
    fn test_read_category_table_drops_unknown_labels() {
        let file = csv_file("menu,category\nRice,주식\nCola,drink\nStew,jjigae\n");
        let rows = read_category_table(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, Category::Rice);
        assert_eq!(rows[1].category, Category::Soup);
    }

    #[test]
    fn test_read_affinity_table_drops_self_pairs() {
        let file = csv_file("menu1,menu2,weight\nRice,Rice,0.9\nRice,Soup,0.8\n");
        let rows = read_affinity_table(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].a, "rice");
        assert_eq!(rows[0].b, "soup");
    }

    #[test]
    fn test_missing_required_column_is_an_error() {
        let file = csv_file("foo,bar\n1,2\n");
        assert!(read_cost_table(file.path()).is_err());
    }
}
