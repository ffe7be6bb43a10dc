//! Genetic search over food amounts
//!
//! An instance assigns every selected food an amount in 100 g units; most
//! entries are zero. Each generation scores the population, keeps the best
//! few (plus mutated and pruned variants of them), and fills out the rest
//! with fresh random instances, merges of tournament winners, and
//! crossovers of tournament winners. Lower scores are better.

use crate::error::{OptimizeError, OptimizeResult};
use crate::micros::{extract_nutrients, ALL_MICROS};
use nndb_common::config::OptimizerConfig;
use nndb_common::models::{ENERGY_KCAL_ID, SUGARS_ID};
use nndb_common::FoodDocument;
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tracing::debug;

/// Amounts (100 g units) per food
pub type Instance = Vec<f64>;

/// Component weights: RDA coverage, coverage per gram, UL excess,
/// calories per gram, sparsity, sugar
pub const SCORE_WEIGHTS: [f64; 6] = [2.0, 1.0, 1.8, 1.5, 1.2, 1.0];

const RANDOM_AMOUNTS: [f64; 4] = [0.5, 1.0, 1.5, 2.0];
const BIG_JUMPS: [f64; 4] = [1.5, 1.75, 2.0, 2.25];
const REGULAR_JUMPS: [f64; 5] = [0.25, 0.5, 0.75, 1.0, 1.25];

/// Amounts below this count as absent when totalling calories
const AMOUNT_EPSILON: f64 = 0.00001;

/// Tuning for the genetic search
#[derive(Debug, Clone, PartialEq)]
pub struct GaParams {
    /// Random instances in the initial population
    pub init_randoms: usize,
    /// Expected number of non-zero entries in a random instance
    pub expected_entries: usize,
    /// Upper bound for a single entry
    pub max_amount: f64,
    /// Each of the three fill strategies runs this many times per generation
    pub population_size: usize,
    /// Chance that an entry is mutated
    pub mutate_rate: f64,
    /// Fraction of mutations that are big jumps or swaps
    pub big_mutate_share: f64,
    /// Best instances carried into the next generation
    pub immortals: usize,
    /// Winners summed into one merged instance
    pub merge_size: usize,
    pub generations: usize,
    pub seed: Option<u64>,
}

impl Default for GaParams {
    fn default() -> Self {
        Self {
            init_randoms: 10_000,
            expected_entries: 4,
            max_amount: 5.0,
            population_size: 200,
            mutate_rate: 0.20,
            big_mutate_share: 0.20,
            immortals: 5,
            merge_size: 4,
            generations: 5_000,
            seed: None,
        }
    }
}

impl GaParams {
    /// Defaults overridden by whatever the config file sets
    pub fn from_config(config: &OptimizerConfig) -> Self {
        let d = Self::default();
        Self {
            init_randoms: config.init_randoms.unwrap_or(d.init_randoms),
            expected_entries: config.expected_entries.unwrap_or(d.expected_entries),
            max_amount: config.max_amount.unwrap_or(d.max_amount),
            population_size: config.population_size.unwrap_or(d.population_size),
            mutate_rate: config.mutate_rate.unwrap_or(d.mutate_rate),
            big_mutate_share: config.big_mutate_share.unwrap_or(d.big_mutate_share),
            immortals: config.immortals.unwrap_or(d.immortals),
            merge_size: config.merge_size.unwrap_or(d.merge_size),
            generations: config.generations.unwrap_or(d.generations),
            seed: config.seed.or(d.seed),
        }
    }

    /// Chance of a big mutation, as part of the overall mutate rate
    pub fn big_mutate_rate(&self) -> f64 {
        self.mutate_rate * self.big_mutate_share
    }

    /// Instances whose total exceeds this are thinned out after mutation
    pub fn sparsity_max(&self) -> f64 {
        self.expected_entries.saturating_sub(1) as f64 * self.max_amount * 0.75
    }

    pub fn validate(&self) -> OptimizeResult<()> {
        if self.expected_entries == 0 {
            return Err(OptimizeError::InvalidParameter(
                "expected_entries must be at least 1".to_string(),
            ));
        }
        if self.max_amount.is_nan() || self.max_amount <= 0.0 {
            return Err(OptimizeError::InvalidParameter(format!(
                "max_amount must be positive, got {}",
                self.max_amount
            )));
        }
        if !(0.0..=1.0).contains(&self.mutate_rate) {
            return Err(OptimizeError::InvalidParameter(format!(
                "mutate_rate must be within [0, 1], got {}",
                self.mutate_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.big_mutate_share) {
            return Err(OptimizeError::InvalidParameter(format!(
                "big_mutate_share must be within [0, 1], got {}",
                self.big_mutate_share
            )));
        }
        if self.merge_size == 0 {
            return Err(OptimizeError::InvalidParameter(
                "merge_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A scored member of a generation
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSolution {
    pub score: f64,
    /// Weighted score components, in `SCORE_WEIGHTS` order
    pub components: [f64; 6],
    pub instance: Instance,
    /// Amount of each tracked micronutrient
    pub nutrition: Vec<f64>,
}

/// Genetic search engine over a fixed set of foods
pub struct OptEngine {
    foods: Vec<FoodDocument>,
    /// |foods| x |micros|, per 100 g
    matrix: Vec<Vec<f64>>,
    /// kcal per 100 g, absent when the food has no energy value
    energy: Vec<Option<f64>>,
    /// g sugar per 100 g
    sugar: Vec<f64>,
    params: GaParams,
    rng: StdRng,
    population: Vec<Instance>,
    last_generation: Vec<ScoredSolution>,
}

impl OptEngine {
    /// Build the food matrix and the initial population: every single food
    /// on its own, plus `init_randoms` random instances
    pub fn new(foods: Vec<FoodDocument>, params: GaParams) -> OptimizeResult<Self> {
        if foods.is_empty() {
            return Err(OptimizeError::NoFoods);
        }
        params.validate()?;

        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let matrix = foods.iter().map(extract_nutrients).collect();
        let energy = foods.iter().map(|f| f.nutrient_value(ENERGY_KCAL_ID)).collect();
        let sugar = foods
            .iter()
            .map(|f| f.nutrient_value(SUGARS_ID).unwrap_or(0.0))
            .collect();

        let mut engine = Self {
            foods,
            matrix,
            energy,
            sugar,
            params,
            rng,
            population: Vec::new(),
            last_generation: Vec::new(),
        };

        let mut population = engine.one_hot_population();
        for _ in 0..engine.params.init_randoms {
            population.push(engine.random_instance());
        }
        engine.population = population;

        Ok(engine)
    }

    pub fn foods(&self) -> &[FoodDocument] {
        &self.foods
    }

    pub fn food_count(&self) -> usize {
        self.foods.len()
    }

    pub fn params(&self) -> &GaParams {
        &self.params
    }

    /// Current (unscored) population
    pub fn population(&self) -> &[Instance] {
        &self.population
    }

    /// Previous population, best first
    pub fn last_generation(&self) -> &[ScoredSolution] {
        &self.last_generation
    }

    pub fn best(&self) -> Option<&ScoredSolution> {
        self.last_generation.first()
    }

    /// One instance per food, each holding 100 g of that food alone
    pub fn one_hot_population(&self) -> Vec<Instance> {
        (0..self.food_count())
            .map(|i| {
                let mut inst = vec![0.0; self.food_count()];
                inst[i] = 1.0;
                inst
            })
            .collect()
    }

    /// Micronutrient totals for an instance
    pub fn nutrition(&self, inst: &[f64]) -> Vec<f64> {
        let mut totals = vec![0.0; ALL_MICROS.len()];
        for (amt, row) in inst.iter().zip(&self.matrix) {
            if *amt == 0.0 {
                continue;
            }
            for (total, value) in totals.iter_mut().zip(row) {
                *total += amt * value;
            }
        }
        totals
    }

    /// Total kcal and grams of sugar
    pub fn calories(&self, inst: &[f64]) -> (f64, f64) {
        let mut calories = 0.0;
        let mut sugar = 0.0;
        for (idx, amt) in inst.iter().enumerate() {
            if amt.abs() < AMOUNT_EPSILON {
                continue;
            }
            calories += self.energy[idx].unwrap_or(0.0) * amt;
            sugar += self.sugar[idx] * amt;
        }
        (calories, sugar)
    }

    /// kcal for one food entry, when the food reports energy
    pub fn entry_calories(&self, idx: usize, amt: f64) -> Option<f64> {
        self.energy.get(idx).copied().flatten().map(|kcal| kcal * amt)
    }

    /// Fitness of an instance given its nutrition; lower is better
    ///
    /// An instance with no food at all scores `+inf`.
    pub fn score(&self, inst: &[f64], nutr: &[f64]) -> (f64, [f64; 6]) {
        let grams = 100.0 * inst.iter().sum::<f64>();
        if grams <= 0.0 {
            return (f64::INFINITY, [0.0; 6]);
        }

        let (calories, sugar) = self.calories(inst);

        // No credit for going over the RDA
        let coverage: Vec<f64> = nutr
            .iter()
            .zip(ALL_MICROS.iter())
            .map(|(amt, m)| (amt / m.rda).clamp(0.0, 1.01))
            .collect();
        let coverage_sum: f64 = coverage.iter().sum();
        let coverage_mean = coverage_sum / coverage.len() as f64;

        // Only penalize once close to the upper limit
        let excess: f64 = nutr
            .iter()
            .zip(ALL_MICROS.iter())
            .map(|(amt, m)| (amt - m.ul) / m.ul)
            .filter(|over| *over > -0.01)
            .sum();

        let nonzero = inst.iter().filter(|v| **v > 0.0).count() as f64;

        let raw = [
            -coverage_mean,
            -(coverage_sum / grams),
            excess,
            logistic(calories / grams),
            logistic(nonzero / self.params.expected_entries as f64),
            logistic(sugar),
        ];

        let mut components = [0.0; 6];
        for (c, (r, w)) in components.iter_mut().zip(raw.iter().zip(SCORE_WEIGHTS.iter())) {
            *c = r * w;
        }

        let score = components.iter().sum::<f64>() / components.len() as f64;
        (score, components)
    }

    /// Score an instance and package it
    pub fn evaluate(&self, inst: Instance) -> ScoredSolution {
        let nutrition = self.nutrition(&inst);
        let (score, components) = self.score(&inst, &nutrition);
        ScoredSolution {
            score,
            components,
            instance: inst,
            nutrition,
        }
    }

    /// Random instance with a binomially distributed number of entries
    pub fn random_instance(&mut self) -> Instance {
        let n = self.food_count();
        let expected = self.params.expected_entries;
        let p = (expected as f64 / n as f64).min(1.0);

        let mut entries = (0..n).filter(|_| self.rng.gen_bool(p)).count();
        if entries < 1 {
            entries = expected;
        }
        let entries = entries.min(n);

        let mut inst = vec![0.0; n];
        for idx in index::sample(&mut self.rng, n, entries) {
            inst[idx] = pick(&mut self.rng, &RANDOM_AMOUNTS);
        }
        inst
    }

    /// Mutated copy of an instance
    ///
    /// Each entry mutates with probability `mutate_rate`. A big mutation on
    /// a non-zero entry moves it to a random empty slot; other mutations
    /// jump the amount up or down. Afterwards the instance is thinned until
    /// its total is within `sparsity_max`.
    pub fn mutate(&mut self, inst: &[f64]) -> Instance {
        let mut out = inst.to_vec();
        let big = self.params.big_mutate_rate();
        let blanks: Vec<usize> = inst
            .iter()
            .enumerate()
            .filter(|(_, v)| **v <= 0.0)
            .map(|(i, _)| i)
            .collect();

        for (idx, &val) in inst.iter().enumerate() {
            let roll: f64 = self.rng.gen();
            if roll > self.params.mutate_rate {
                continue;
            }

            if roll < big && val > 0.0 {
                if let Some(&blank) = blanks.choose(&mut self.rng) {
                    out.swap(idx, blank);
                }
                continue;
            }

            let jump = if roll < big {
                pick(&mut self.rng, &BIG_JUMPS)
            } else {
                pick(&mut self.rng, &REGULAR_JUMPS)
            };

            out[idx] = if val <= 0.0 {
                jump
            } else {
                let sign = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                (val + sign * jump).clamp(0.0, self.params.max_amount)
            };
        }

        let sparsity_max = self.params.sparsity_max();
        while out.iter().sum::<f64>() > sparsity_max {
            for v in out.iter_mut() {
                if *v <= 0.1 {
                    *v = 0.0;
                } else if self.rng.gen::<f64>() < 0.70 {
                    *v *= 0.5;
                } else {
                    *v = 0.0;
                }
            }
        }

        out
    }

    /// Uniform crossover
    pub fn crossover(&mut self, a: &[f64], b: &[f64]) -> Instance {
        a.iter()
            .zip(b)
            .map(|(x, y)| if self.rng.gen_bool(0.5) { *x } else { *y })
            .collect()
    }

    /// Tournament of two over ranks `0..len`; the better (lower) rank wins
    pub fn winner(&mut self, len: usize) -> usize {
        let a = self.rng.gen_range(0..len);
        let b = self.rng.gen_range(0..len);
        a.min(b)
    }

    /// Score the population, remember it best first, and breed the next one
    pub fn generation(&mut self) {
        let population = std::mem::take(&mut self.population);
        let mut scored: Vec<ScoredSolution> =
            population.into_iter().map(|inst| self.evaluate(inst)).collect();
        scored.sort_by(|a, b| a.score.total_cmp(&b.score));

        let mut next = NextGeneration::default();

        for best in scored.iter().take(self.params.immortals) {
            next.add(best.instance.clone());
            next.add(self.mutate(&best.instance));

            for (idx, val) in best.instance.iter().enumerate() {
                if *val > 0.0 {
                    let mut one_off = best.instance.clone();
                    one_off[idx] = 0.0;
                    let mutated = self.mutate(&one_off);
                    next.add(one_off);
                    next.add(mutated);
                }
            }
        }

        if !scored.is_empty() {
            for _ in 0..self.params.population_size {
                next.add(self.random_instance());

                let mut merged = scored[self.winner(scored.len())].instance.clone();
                for _ in 1..self.params.merge_size {
                    let other = &scored[self.winner(scored.len())].instance;
                    for (m, o) in merged.iter_mut().zip(other) {
                        *m += o;
                    }
                }
                next.add(self.mutate(&merged));

                let a = self.winner(scored.len());
                let b = self.winner(scored.len());
                let child = self.crossover(&scored[a].instance, &scored[b].instance);
                next.add(self.mutate(&child));
            }
        }

        debug!(
            "Generation scored {} instances, bred {}",
            scored.len(),
            next.members.len()
        );

        self.last_generation = scored;
        self.population = next.members;
    }

    /// Score every food on its own, best first
    pub fn food_scores(&mut self) -> &[ScoredSolution] {
        self.population = self.one_hot_population();
        self.generation();
        &self.last_generation
    }
}

/// Next population under construction; duplicates and empty instances are dropped
#[derive(Default)]
struct NextGeneration {
    members: Vec<Instance>,
    seen: HashSet<Vec<u64>>,
}

impl NextGeneration {
    fn add(&mut self, inst: Instance) {
        if inst.iter().all(|v| *v <= 0.0) {
            return;
        }
        let key: Vec<u64> = inst.iter().map(|v| v.to_bits()).collect();
        if self.seen.insert(key) {
            self.members.push(inst);
        }
    }
}

fn pick(rng: &mut StdRng, choices: &[f64]) -> f64 {
    choices[rng.gen_range(0..choices.len())]
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
