//! Writes `sample_data.csv`: a small mixed-type dataset for trying the viewer.

use anyhow::{Context, Result};

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    // (species, mean body mass in g, mean flipper length in mm)
    let species = [
        ("Adelie", 3700.0, 190.0),
        ("Chinstrap", 3730.0, 196.0),
        ("Gentoo", 5080.0, 217.0),
    ];
    let islands = ["Biscoe", "Dream", "Torgersen"];
    let sexes = ["male", "female"];

    let output_path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(output_path).context("creating output file")?;
    writer.write_record([
        "id",
        "species",
        "island",
        "sex",
        "body_mass_g",
        "flipper_length_mm",
        "year",
    ])?;

    let n_rows = 300;
    for id in 0..n_rows {
        let (name, mass, flipper) = species[id % species.len()];
        // Roughly one in twenty masses is missing.
        let body_mass = if rng.next_f64() < 0.05 {
            String::new()
        } else {
            format!("{:.1}", rng.gauss(mass, 450.0))
        };
        let flipper_length = format!("{:.1}", rng.gauss(flipper, 7.0));
        let year = 2007 + (rng.next_u64() % 3);

        writer.write_record([
            id.to_string(),
            name.to_string(),
            rng.pick(&islands).to_string(),
            rng.pick(&sexes).to_string(),
            body_mass,
            flipper_length,
            year.to_string(),
        ])?;
    }
    writer.flush().context("flushing output file")?;

    println!("Wrote {n_rows} rows to {output_path}");
    Ok(())
}
