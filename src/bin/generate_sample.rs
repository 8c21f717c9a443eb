//! Write a deterministic sample KPI file for local development.
//!
//! Usage: `generate_sample [OUTPUT]` (default `data/world_kpi_anonym.csv`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use csv::WriterBuilder;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }
}

/// (iso_a3, country, continent, climate)
const COUNTRIES: [(&str, &str, &str, &str); 10] = [
    ("DEU", "Germany", "Europe", "normal"),
    ("NOR", "Norway", "Europe", "coldland"),
    ("ESP", "Spain", "Europe", "hotland"),
    ("JPN", "Japan", "Asia", "normal"),
    ("IND", "India", "Asia", "hotland"),
    ("USA", "United States", "North America", "normal"),
    ("CAN", "Canada", "North America", "coldland"),
    ("BRA", "Brazil", "South America", "hotland"),
    ("ZAF", "South Africa", "Africa", "hotland"),
    ("AUS", "Australia", "Oceania", "hotland"),
];

const BATT_ALIASES: [&str; 4] = ["Batt_1", "Batt_2", "Batt_3", "Batt_4"];
const MODEL_SERIES: [&str; 3] = ["Series_A", "Series_B", "Series_C"];

/// (metric, typical value, spread)
const METRICS: [(&str, f64, f64); 4] = [
    ("variable_1", 25.0, 10.0),
    ("variable_2", 0.92, 0.05),
    ("variable_3", 350.0, 80.0),
    ("variable_4", 1.5, 0.5),
];

fn main() -> Result<()> {
    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/world_kpi_anonym.csv"));
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let mut rng = SimpleRng::new(42);
    let mut writer = WriterBuilder::new()
        .delimiter(b';')
        .from_path(&output)
        .with_context(|| format!("creating {}", output.display()))?;

    writer.write_record([
        "iso_a3",
        "country",
        "battAlias",
        "var",
        "val",
        "cnt_vhcl",
        "continent",
        "climate",
        "model_series",
    ])?;

    let mut rows = 0usize;
    for (iso, country, continent, climate) in COUNTRIES {
        for alias in BATT_ALIASES {
            let series = MODEL_SERIES[rng.below(MODEL_SERIES.len() as u64) as usize];
            let vehicles = (5 + rng.below(500)).to_string();

            for (metric, typical, spread) in METRICS {
                let roll = rng.next_f64();
                // A few gaps so the loader's normalization has something to do.
                let iso = if roll < 0.03 { "" } else { iso };
                let val = if roll > 0.98 {
                    "n/a".to_string()
                } else {
                    format!("{:.3}", typical + (rng.next_f64() - 0.5) * 2.0 * spread)
                };

                writer.write_record([
                    iso,
                    country,
                    alias,
                    metric,
                    val.as_str(),
                    vehicles.as_str(),
                    continent,
                    climate,
                    series,
                ])?;
                rows += 1;
            }
        }
    }
    writer.flush()?;

    println!("Wrote {rows} KPI rows to {}", output.display());
    Ok(())
}
