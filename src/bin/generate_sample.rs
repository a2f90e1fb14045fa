//! Writes a synthetic `current.parquet` / `previous.csv` pair for trying the
//! dashboard without real analysis outputs.
//!
//! Usage: `generate_sample [OUTPUT_DIR]` (default `data/output`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

const TEAMS: [&str; 20] = [
    "Atalanta", "Bologna", "Cagliari", "Como", "Cremonese", "Fiorentina", "Genoa", "Inter",
    "Juventus", "Lazio", "Lecce", "Milan", "Napoli", "Parma", "Pisa", "Roma", "Sassuolo",
    "Torino", "Udinese", "Verona",
];

const SURNAMES: [&str; 24] = [
    "Rossi", "Bianchi", "Romano", "Colombo", "Ricci", "Marino", "Greco", "Bruno", "Gallo",
    "Conti", "De Luca", "Mancini", "Costa", "Giordano", "Rizzo", "Lombardi", "Moretti",
    "Barbieri", "Fontana", "Santoro", "Mariani", "Rinaldi", "Caruso", "Ferrara",
];

/// Role code with its share of the squad and mean convenience.
const ROLES: [(&str, usize, f64); 4] = [("P", 2, 45.0), ("D", 5, 55.0), ("C", 5, 60.0), ("A", 3, 65.0)];

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Player {
    name: String,
    role: &'static str,
    team: &'static str,
    convenience: f64,
    potential: f64,
    score: f64,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn generate_players(rng: &mut SimpleRng) -> Vec<Player> {
    let mut players = Vec::new();
    for (t, &team) in TEAMS.iter().enumerate() {
        for &(role, count, mean) in &ROLES {
            for k in 0..count {
                let surname = SURNAMES[(t * 7 + k * 3 + players.len()) % SURNAMES.len()];
                let initial = (b'A' + (players.len() % 26) as u8) as char;
                let convenience = rng.gauss(mean, 15.0).clamp(0.0, 100.0);
                let potential = (convenience + rng.gauss(5.0, 20.0)).clamp(0.0, 100.0);
                players.push(Player {
                    name: format!("{surname} {initial}."),
                    role,
                    team,
                    convenience: round2(convenience),
                    potential: round2(potential),
                    score: round2(rng.gauss(6.0, 0.4)),
                });
            }
        }
    }
    players
}

fn write_current(path: &Path, players: &[Player]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Nome", DataType::Utf8, false),
        Field::new("Ruolo", DataType::Utf8, false),
        Field::new("Squadra", DataType::Utf8, false),
        Field::new("Convenienza", DataType::Float64, true),
        Field::new("Convenienza Potenziale", DataType::Float64, true),
        Field::new("Punteggio", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(players.iter().map(|p| p.name.as_str()))),
            Arc::new(StringArray::from_iter_values(players.iter().map(|p| p.role))),
            Arc::new(StringArray::from_iter_values(players.iter().map(|p| p.team))),
            Arc::new(Float64Array::from_iter_values(players.iter().map(|p| p.convenience))),
            Arc::new(Float64Array::from_iter_values(players.iter().map(|p| p.potential))),
            Arc::new(Float64Array::from_iter_values(players.iter().map(|p| p.score))),
        ],
    )
    .context("failed to build record batch")?;
    println!(
        "{}",
        pretty_format_batches(&[batch.slice(0, players.len().min(5))])?
    );

    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Previous season: most current players plus some who left, team stored as
/// a dict literal the way the scraper emits it, a few blank convenience cells.
fn write_previous(path: &Path, players: &[Player], rng: &mut SimpleRng) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(["Nome", "Ruolo", "Squadra", "Convenienza", "goals", "assists", "presences"])?;

    let mut rows = 0;
    for (i, p) in players.iter().enumerate() {
        if rng.below(10) < 3 {
            continue;
        }
        let team = TEAMS[if rng.below(8) == 0 { rng.below(TEAMS.len()) } else { i % TEAMS.len() }];
        let team_id = TEAMS.iter().position(|t| *t == team).unwrap_or(0) + 1;
        let convenience = if rng.below(25) == 0 {
            String::new()
        } else {
            round2((p.convenience + rng.gauss(0.0, 12.0)).clamp(0.0, 100.0)).to_string()
        };
        let scoring = match p.role {
            "A" => 8.0,
            "C" => 3.0,
            "D" => 1.0,
            _ => 0.0,
        };
        writer.write_record([
            p.name.clone(),
            p.role.to_string(),
            format!("{{'id': {team_id}, 'name': '{team}'}}"),
            convenience,
            (rng.gauss(scoring, scoring / 2.0 + 0.1).max(0.0).round() as i64).to_string(),
            (rng.gauss(scoring / 2.0, 1.5).max(0.0).round() as i64).to_string(),
            (rng.gauss(28.0, 6.0).clamp(0.0, 38.0).round() as i64).to_string(),
        ])?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/output"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let players = generate_players(&mut rng);

    let current = out_dir.join("current.parquet");
    write_current(&current, &players)?;
    let previous = out_dir.join("previous.csv");
    let previous_rows = write_previous(&previous, &players, &mut rng)?;

    println!(
        "Wrote {} players to {} and {previous_rows} to {}",
        players.len(),
        current.display(),
        previous.display()
    );
    Ok(())
}
