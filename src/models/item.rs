use serde::Serialize;

/// Menu category of a candidate item. Every daily slot requires a fixed category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Rice,
    Soup,
    Side,
    Snack,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Rice => "rice",
            Category::Soup => "soup",
            Category::Side => "side",
            Category::Snack => "snack",
        }
    }

    /// Normalize a free-form category label from a vendor CSV.
    ///
    /// Unknown labels map to `None` and the row is dropped.
    pub fn from_label(label: &str) -> Option<Category> {
        match label.trim().to_lowercase().as_str() {
            "rice" | "밥" | "주식" | "라이스" => Some(Category::Rice),
            "soup" | "stew" | "guk" | "jjigae" | "국" | "탕" | "찌개" | "수프" => {
                Some(Category::Soup)
            }
            "side" | "main" | "반찬" | "사이드" | "메인" | "메인반찬" => Some(Category::Side),
            "snack" | "dessert" | "간식" | "디저트" => Some(Category::Snack),
            _ => None,
        }
    }
}

/// Number of tracked micronutrients.
pub const MICRO_COUNT: usize = 8;

/// Tracked micronutrients, used to index fixed `[f64; MICRO_COUNT]` arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Micro {
    VitA,
    Thiamin,
    Riboflavin,
    Niacin,
    VitC,
    VitD,
    Calcium,
    Iron,
}

impl Micro {
    pub const ALL: [Micro; MICRO_COUNT] = [
        Micro::VitA,
        Micro::Thiamin,
        Micro::Riboflavin,
        Micro::Niacin,
        Micro::VitC,
        Micro::VitD,
        Micro::Calcium,
        Micro::Iron,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Micro::VitA => "vit_a",
            Micro::Thiamin => "thiamin",
            Micro::Riboflavin => "riboflavin",
            Micro::Niacin => "niacin",
            Micro::VitC => "vit_c",
            Micro::VitD => "vit_d",
            Micro::Calcium => "calcium",
            Micro::Iron => "iron",
        }
    }
}

/// One purchasable menu item, merged from the cost/nutrition/category tables.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Normalized join key (see [`normalize_key`]).
    pub key: String,
    /// Display name, taken from the first source row seen.
    pub name: String,
    pub category: Category,
    /// Price per person.
    pub price: f64,
    pub kcal: f64,
    pub carb_g: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    /// Micronutrient amounts, indexed by [`Micro`]. Missing values are 0.
    pub micros: [f64; MICRO_COUNT],
    /// Student preference weight in [0, 1]. 0 if unknown.
    pub pref_weight: f64,
}

/// Canonical item key: brackets folded to spaces, whitespace collapsed,
/// lowercased. This is the join key across all input tables.
pub fn normalize_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for ch in raw.chars() {
        let ch = match ch {
            '(' | ')' | '[' | ']' | '{' | '}' => ' ',
            c => c,
        };
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.extend(ch.to_lowercase());
        }
    }
    out
}
