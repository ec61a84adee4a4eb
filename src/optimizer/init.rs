use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::Catalog;
use crate::error::{PlanError, Result};
use crate::models::{Chromosome, DayGenes};
use crate::optimizer::config::{PlannerConfig, EPS, PROTEIN_CAL_CAP};

/// Micro-repair swap budget per day.
const REPAIR_SWAPS: usize = 40;

/// Full rebuild attempts per day before accepting whatever was produced.
const DAY_TRIES: usize = 80;

/// Allowed relative deviation of a day's cost from the per-day budget.
const COST_SLACK: f64 = 0.20;

/// Build a starting population biased toward feasibility.
///
/// Staples, soups, and sides are drawn from the low-protein-density half of
/// their category (sides also get a carb-boosted alternate ordering for
/// repairs); snacks appear only on eligible days. A recency map steers picks
/// away from items used within the repetition window, and each day gets up
/// to [`REPAIR_SWAPS`] local side swaps toward the calorie, protein, and
/// cost bands before being accepted.
pub fn init_population(
    catalog: &Catalog,
    cfg: &PlannerConfig,
    rng: &mut StdRng,
) -> Result<Vec<Chromosome>> {
    let pools = catalog.pools();
    let mut missing = Vec::new();
    if pools.rice.is_empty() {
        missing.push("rice".to_string());
    }
    if pools.soup.is_empty() {
        missing.push("soup".to_string());
    }
    if pools.side.is_empty() {
        missing.push("side".to_string());
    }
    if !missing.is_empty() {
        return Err(PlanError::MissingCategories(missing));
    }

    let kcal: Vec<f64> = catalog.items().iter().map(|c| c.kcal).collect();
    let protein: Vec<f64> = catalog.items().iter().map(|c| c.protein_g).collect();
    let carb: Vec<f64> = catalog.items().iter().map(|c| c.carb_g).collect();
    let price: Vec<f64> = catalog.items().iter().map(|c| c.price).collect();

    // Protein/carb calorie density per candidate.
    let protein_density: Vec<f64> = (0..catalog.len())
        .map(|i| protein[i] * 4.0 / kcal[i].max(EPS))
        .collect();
    let carb_density: Vec<f64> = (0..catalog.len())
        .map(|i| carb[i] * 4.0 / kcal[i].max(EPS))
        .collect();

    let sorted_by = |pool: &[usize], key: &dyn Fn(usize) -> f64| -> Vec<usize> {
        let mut v = pool.to_vec();
        v.sort_by(|&a, &b| {
            key(a)
                .partial_cmp(&key(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        v
    };
    let rice_sorted = sorted_by(&pools.rice, &|i| protein_density[i]);
    let soup_sorted = sorted_by(&pools.soup, &|i| protein_density[i]);
    let side_sorted = sorted_by(&pools.side, &|i| protein_density[i]);
    // Carb-heavy, protein-light ordering used to push low-calorie days up.
    let side_boost = sorted_by(&pools.side, &|i| protein_density[i] - carb_density[i]);

    let kcal_lo = cfg.kcal_lo();
    let kcal_hi = cfg.kcal_hi();
    let target_cost = cfg.budget_per_day;

    let mut last_day_used: HashMap<usize, usize> = HashMap::new();

    let day_sum = |day: &DayGenes, values: &[f64]| -> f64 { day.items().map(|i| values[i]).sum() };

    let day_ok = |day: &DayGenes| -> bool {
        let dk = day_sum(day, &kcal);
        if dk < kcal_lo || dk > kcal_hi || dk <= 0.0 {
            return false;
        }
        if 4.0 * day_sum(day, &protein) / dk >= PROTEIN_CAL_CAP {
            return false;
        }
        (day_sum(day, &price) - target_cost).abs() <= target_cost * COST_SLACK
    };

    let mut population = Vec::with_capacity(cfg.ga.population);
    for _ in 0..cfg.ga.population {
        let mut days: Vec<DayGenes> = Vec::with_capacity(cfg.days);
        for d in 0..cfg.days {
            let mut tries = 0;
            loop {
                tries += 1;
                let half_rice = (rice_sorted.len() / 2).max(1);
                let half_soup = (soup_sorted.len() / 2).max(1);
                let half_side = (side_sorted.len() / 2).max(3).min(side_sorted.len());

                let mut used_today: HashSet<usize> = HashSet::new();
                let staple = pick_from(
                    &rice_sorted[..half_rice],
                    &used_today,
                    d,
                    &last_day_used,
                    cfg.repeat_window,
                    rng,
                );
                used_today.insert(staple);
                let soup = pick_from(
                    &soup_sorted[..half_soup],
                    &used_today,
                    d,
                    &last_day_used,
                    cfg.repeat_window,
                    rng,
                );
                used_today.insert(soup);
                let mut sides = [0usize; 3];
                for slot in &mut sides {
                    let pick = pick_from(
                        &side_sorted[..half_side],
                        &used_today,
                        d,
                        &last_day_used,
                        cfg.repeat_window,
                        rng,
                    );
                    *slot = pick;
                    used_today.insert(pick);
                }
                let snack = if cfg.snack_allowed_day(d) {
                    pools.snack.choose(rng).copied()
                } else {
                    None
                };
                let mut day = DayGenes {
                    staple,
                    soup,
                    sides,
                    snack,
                };

                for _ in 0..REPAIR_SWAPS {
                    let dk = day_sum(&day, &kcal);
                    let dp = day_sum(&day, &protein);
                    let day_cost = day_sum(&day, &price);
                    let used: HashSet<usize> = day.items().collect();

                    if dk > 0.0 && 4.0 * dp / dk >= PROTEIN_CAL_CAP {
                        let si = side_arg_extreme(&day.sides, &protein, true);
                        let cap = side_sorted.len().min(60);
                        day.sides[si] = pick_from(
                            &side_sorted[..cap],
                            &used,
                            d,
                            &last_day_used,
                            cfg.repeat_window,
                            rng,
                        );
                        continue;
                    }
                    if dk < kcal_lo {
                        let si = side_arg_extreme(&day.sides, &kcal, false);
                        let cap = side_boost.len().min(80);
                        day.sides[si] = pick_from(
                            &side_boost[..cap],
                            &used,
                            d,
                            &last_day_used,
                            cfg.repeat_window,
                            rng,
                        );
                        continue;
                    }
                    if dk > kcal_hi {
                        let si = side_arg_extreme(&day.sides, &kcal, true);
                        let cap = side_sorted.len().min(80);
                        day.sides[si] = pick_from(
                            &side_sorted[..cap],
                            &used,
                            d,
                            &last_day_used,
                            cfg.repeat_window,
                            rng,
                        );
                        continue;
                    }
                    if (day_cost - target_cost).abs() > target_cost * COST_SLACK {
                        if day_cost > target_cost {
                            let si = side_arg_extreme(&day.sides, &price, true);
                            let cap = side_sorted.len().min(80);
                            day.sides[si] = pick_from(
                                &side_sorted[..cap],
                                &used,
                                d,
                                &last_day_used,
                                cfg.repeat_window,
                                rng,
                            );
                        } else {
                            let si = side_arg_extreme(&day.sides, &price, false);
                            let cap = side_boost.len().min(80);
                            day.sides[si] = pick_from(
                                &side_boost[..cap],
                                &used,
                                d,
                                &last_day_used,
                                cfg.repeat_window,
                                rng,
                            );
                        }
                        continue;
                    }
                    break;
                }

                if day_ok(&day) || tries > DAY_TRIES {
                    for idx in day.items() {
                        last_day_used.insert(idx, d);
                    }
                    days.push(day);
                    break;
                }
            }
        }
        population.push(Chromosome { days });
    }
    Ok(population)
}

/// Pick from `pool` preferring candidates neither used today nor seen within
/// the repetition window; relax to unused-today, then to anything in the
/// pool. `pool` must be non-empty.
///
/// The recency map outlives each individual, so `last` can exceed `day`
/// while the next individual's early days are built; signed arithmetic keeps
/// those negative gaps inside the window.
fn pick_from(
    pool: &[usize],
    used_today: &HashSet<usize>,
    day: usize,
    last_day_used: &HashMap<usize, usize>,
    window: usize,
    rng: &mut StdRng,
) -> usize {
    let fresh: Vec<usize> = pool
        .iter()
        .copied()
        .filter(|x| {
            !used_today.contains(x)
                && last_day_used
                    .get(x)
                    .map_or(true, |&last| day as i64 - last as i64 >= window as i64)
        })
        .collect();
    if let Some(&x) = fresh.choose(rng) {
        return x;
    }
    let unused: Vec<usize> = pool
        .iter()
        .copied()
        .filter(|x| !used_today.contains(x))
        .collect();
    if let Some(&x) = unused.choose(rng) {
        return x;
    }
    pool[rng.gen_range(0..pool.len())]
}

/// Index (0..3) of the side with the largest or smallest value.
fn side_arg_extreme(sides: &[usize; 3], values: &[f64], largest: bool) -> usize {
    let cmp = |a: &usize, b: &usize| {
        values[sides[*a]]
            .partial_cmp(&values[sides[*b]])
            .unwrap_or(std::cmp::Ordering::Equal)
    };
    let picked = if largest {
        (0..3).max_by(cmp)
    } else {
        (0..3).min_by(cmp)
    };
    picked.unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_catalog;
    use crate::ingest::tables::{CategoryRow, CostRow, NutritionRow};
    use crate::models::{normalize_key, Category, MICRO_COUNT};
    use rand::SeedableRng;

    fn test_catalog() -> Catalog {
        let mut names: Vec<(String, Category)> = Vec::new();
        for i in 0..5 {
            names.push((format!("rice {i}"), Category::Rice));
            names.push((format!("soup {i}"), Category::Soup));
        }
        for i in 0..15 {
            names.push((format!("side {i}"), Category::Side));
        }
        for i in 0..3 {
            names.push((format!("snack {i}"), Category::Snack));
        }

        let cost: Vec<CostRow> = names
            .iter()
            .map(|(n, _)| CostRow {
                key: normalize_key(n),
                name: n.clone(),
                price: 1050.0,
            })
            .collect();
        let nutrition: Vec<NutritionRow> = names
            .iter()
            .map(|(n, c)| {
                let (carb, protein, fat) = if *c == Category::Snack {
                    (10.0, 1.0, 1.0)
                } else {
                    (20.6, 5.0, 8.6)
                };
                NutritionRow {
                    key: normalize_key(n),
                    name: n.clone(),
                    kcal: Some(4.0 * carb + 4.0 * protein + 9.0 * fat),
                    carb_g: Some(carb),
                    protein_g: Some(protein),
                    fat_g: Some(fat),
                    micros: [Some(10.0); MICRO_COUNT],
                }
            })
            .collect();
        let categories: Vec<CategoryRow> = names
            .iter()
            .map(|(n, c)| CategoryRow {
                key: normalize_key(n),
                category: *c,
            })
            .collect();
        build_catalog(&cost, &nutrition, &categories).unwrap()
    }

    fn small_cfg() -> PlannerConfig {
        let mut cfg = PlannerConfig {
            days: 5,
            ..Default::default()
        };
        cfg.ga.population = 10;
        cfg
    }

    #[test]
    fn test_population_shape_and_categories() {
        let catalog = test_catalog();
        let cfg = small_cfg();
        let mut rng = StdRng::seed_from_u64(7);
        let population = init_population(&catalog, &cfg, &mut rng).unwrap();

        assert_eq!(population.len(), 10);
        for ch in &population {
            assert_eq!(ch.days.len(), 5);
            for day in &ch.days {
                assert_eq!(catalog.item(day.staple).category, Category::Rice);
                assert_eq!(catalog.item(day.soup).category, Category::Soup);
                for &s in &day.sides {
                    assert_eq!(catalog.item(s).category, Category::Side);
                }
                if let Some(snack) = day.snack {
                    assert_eq!(catalog.item(snack).category, Category::Snack);
                }
            }
        }
    }

    #[test]
    fn test_snacks_only_on_eligible_days() {
        let catalog = test_catalog();
        let cfg = small_cfg();
        let mut rng = StdRng::seed_from_u64(11);
        let population = init_population(&catalog, &cfg, &mut rng).unwrap();

        for ch in &population {
            for (d, day) in ch.days.iter().enumerate() {
                assert_eq!(day.has_snack(), cfg.snack_allowed_day(d));
            }
        }
    }

    #[test]
    fn test_recency_map_survives_across_individuals() {
        // The shared recency map holds last-use days from the previous
        // individual when the next one starts at day 0; picking must treat
        // those as recent, not wrap around.
        let catalog = test_catalog();
        let mut cfg = PlannerConfig {
            days: 5,
            ..Default::default()
        };
        cfg.ga.population = 3;
        let mut rng = StdRng::seed_from_u64(21);

        let population = init_population(&catalog, &cfg, &mut rng).unwrap();
        assert_eq!(population.len(), 3);
        assert!(population.iter().all(|ch| ch.days.len() == 5));
    }

    #[test]
    fn test_missing_side_category_is_an_error() {
        let names = [("rice", Category::Rice), ("soup", Category::Soup), ("snack", Category::Snack)];
        let cost: Vec<CostRow> = names
            .iter()
            .map(|(n, _)| CostRow {
                key: normalize_key(n),
                name: n.to_string(),
                price: 100.0,
            })
            .collect();
        let nutrition: Vec<NutritionRow> = names
            .iter()
            .map(|(n, _)| NutritionRow {
                key: normalize_key(n),
                name: n.to_string(),
                kcal: Some(200.0),
                carb_g: Some(30.0),
                protein_g: Some(5.0),
                fat_g: Some(5.0),
                micros: [None; MICRO_COUNT],
            })
            .collect();
        let categories: Vec<CategoryRow> = names
            .iter()
            .map(|(n, c)| CategoryRow {
                key: normalize_key(n),
                category: *c,
            })
            .collect();
        let catalog = build_catalog(&cost, &nutrition, &categories).unwrap();

        let cfg = small_cfg();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(init_population(&catalog, &cfg, &mut rng).is_err());
    }
}
