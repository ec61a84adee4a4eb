use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::catalog::{AffinityIndex, Catalog};
use crate::error::Result;
use crate::models::Chromosome;
use crate::optimizer::config::PlannerConfig;
use crate::optimizer::fitness::{fitness, is_feasible_plan};
use crate::optimizer::init::init_population;

/// Fitness floor used during selection for non-finite scores.
const SELECTION_FLOOR: f64 = -1e30;

/// Result of one search run. `feasible == false` means no chromosome passed
/// every hard constraint and `plan` is the best approximation found.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub plan: Chromosome,
    pub fitness: f64,
    pub feasible: bool,
}

/// Run the genetic search: tournament selection, day-aligned crossover,
/// category-respecting mutation, single-slot elitism, dual best-tracking.
///
/// Never fails for infeasibility; errors only surface from a catalog that
/// cannot seed a population.
pub fn run_search(
    catalog: &Catalog,
    affinity: &AffinityIndex,
    cfg: &PlannerConfig,
) -> Result<SearchOutcome> {
    let mut rng = StdRng::seed_from_u64(cfg.ga.seed);

    let mut population = init_population(catalog, cfg, &mut rng)?;
    let mut fits: Vec<f64> = population
        .iter()
        .map(|ch| fitness(ch, catalog, affinity, cfg))
        .collect();

    let best_idx = argmax(&fits);
    let mut best_any = population[best_idx].clone();
    let mut best_any_fit = fits[best_idx];
    let (mut best_feasible, mut best_feasible_fit) =
        if is_feasible_plan(&best_any, catalog, cfg) {
            (Some(best_any.clone()), best_any_fit)
        } else {
            (None, f64::NEG_INFINITY)
        };

    for _generation in 0..cfg.ga.generations {
        let parents = tournament_select(&population, &fits, cfg.ga.tournament, &mut rng);

        let size = population.len();
        let mut next = Vec::with_capacity(size);
        let mut i = 0;
        while next.len() < size {
            let p1 = &parents[i % size];
            let p2 = &parents[(i + 1) % size];
            let (mut c1, mut c2) = crossover_days(p1, p2, cfg.ga.cx_rate, &mut rng);
            mutate(&mut c1, catalog, cfg, &mut rng);
            mutate(&mut c2, catalog, cfg, &mut rng);
            next.push(c1);
            if next.len() < size {
                next.push(c2);
            }
            i += 2;
        }
        population = next;
        fits = population
            .iter()
            .map(|ch| fitness(ch, catalog, affinity, cfg))
            .collect();

        let cur_best = argmax(&fits);
        if fits[cur_best] > best_any_fit {
            best_any_fit = fits[cur_best];
            best_any = population[cur_best].clone();
        }

        for (ch, &fit) in population.iter().zip(&fits) {
            if fit > best_feasible_fit && is_feasible_plan(ch, catalog, cfg) {
                best_feasible = Some(ch.clone());
                best_feasible_fit = fit;
            }
        }

        // Elitism: the worst slot carries the best-so-far into the next
        // generation, deep-copied so later operators cannot alias it.
        let worst = argmin(&fits);
        population[worst] = best_feasible.as_ref().unwrap_or(&best_any).clone();
    }

    let outcome = match best_feasible {
        Some(plan) => SearchOutcome {
            plan,
            fitness: best_feasible_fit,
            feasible: true,
        },
        None => SearchOutcome {
            plan: best_any,
            fitness: best_any_fit,
            feasible: false,
        },
    };
    Ok(outcome)
}

/// Fitness-ranked tournament selection; non-finite fitness is treated as the
/// worst possible value.
fn tournament_select(
    population: &[Chromosome],
    fits: &[f64],
    tournament: usize,
    rng: &mut StdRng,
) -> Vec<Chromosome> {
    let floored: Vec<f64> = fits
        .iter()
        .map(|f| if f.is_finite() { *f } else { SELECTION_FLOOR })
        .collect();
    (0..population.len())
        .map(|_| {
            let mut best = rng.gen_range(0..population.len());
            for _ in 1..tournament {
                let challenger = rng.gen_range(0..population.len());
                if floored[challenger] > floored[best] {
                    best = challenger;
                }
            }
            population[best].clone()
        })
        .collect()
}

/// Day-aligned single-cut crossover: with probability `rate`, swap whole
/// day-segments at a random day boundary (never the first). Offspring never
/// split one day's slots across parents.
pub fn crossover_days(
    p1: &Chromosome,
    p2: &Chromosome,
    rate: f64,
    rng: &mut StdRng,
) -> (Chromosome, Chromosome) {
    let days = p1.days.len();
    if days <= 1 || rng.gen_range(0.0..1.0) > rate {
        return (p1.clone(), p2.clone());
    }
    let cut = rng.gen_range(1..days);

    let mut c1 = p1.days[..cut].to_vec();
    c1.extend_from_slice(&p2.days[cut..]);
    let mut c2 = p2.days[..cut].to_vec();
    c2.extend_from_slice(&p1.days[cut..]);
    (Chromosome { days: c1 }, Chromosome { days: c2 })
}

/// Per-slot mutation: each slot independently resets to a random candidate
/// of its required category. The snack slot follows the day's eligibility:
/// a random real snack on eligible days, absent otherwise.
pub fn mutate(ch: &mut Chromosome, catalog: &Catalog, cfg: &PlannerConfig, rng: &mut StdRng) {
    let pools = catalog.pools();
    let rate = cfg.ga.mut_rate;
    for (d, day) in ch.days.iter_mut().enumerate() {
        if rng.gen_range(0.0..1.0) < rate {
            if let Some(&idx) = pools.rice.choose(rng) {
                day.staple = idx;
            }
        }
        if rng.gen_range(0.0..1.0) < rate {
            if let Some(&idx) = pools.soup.choose(rng) {
                day.soup = idx;
            }
        }
        for side in &mut day.sides {
            if rng.gen_range(0.0..1.0) < rate {
                if let Some(&idx) = pools.side.choose(rng) {
                    *side = idx;
                }
            }
        }
        if rng.gen_range(0.0..1.0) < rate {
            day.snack = if cfg.snack_allowed_day(d) {
                pools.snack.choose(rng).copied()
            } else {
                None
            };
        }
    }
}

/// Index of the largest value; ties keep the earliest index.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

/// Index of the smallest value; ties keep the earliest index.
fn argmin(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v < values[best] {
            best = i;
        }
    }
    best
}
