use std::sync::Arc;

use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;

/// Magnitude written for stars not recovered in a filter.
const NOT_DETECTED: f64 = 99.999;

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

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Photometric error growing towards the faint limit.
fn photometric_error(mag: f64) -> f64 {
    0.005 + 0.02 * ((mag - 24.0) / 1.2).exp()
}

/// One star: true I magnitude and V-I color.
fn main_sequence_star(rng: &mut SimpleRng) -> (f64, f64) {
    // more faint stars than bright ones
    let i_mag = 27.5 - 5.0 * rng.next_f64().powf(1.8);
    let color = 0.35 + 0.22 * (i_mag - 22.5);
    (i_mag, color)
}

fn giant_branch_star(rng: &mut SimpleRng) -> (f64, f64) {
    let i_mag = rng.uniform(21.0, 25.5);
    let color = 0.95 + 0.12 * (25.5 - i_mag).powf(1.3);
    (i_mag, color)
}

fn main() {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_photometry.parquet".to_string());

    let mut rng = SimpleRng::new(42);

    let mut mag1 = Vec::new();
    let mut mag2 = Vec::new();
    let mut mag1_err = Vec::new();
    let mut mag2_err = Vec::new();

    let n_stars = 20_000;
    for k in 0..n_stars {
        let (i_true, color_true) = if k % 4 == 0 {
            giant_branch_star(&mut rng)
        } else {
            main_sequence_star(&mut rng)
        };
        let v_true = i_true + color_true;

        let (mut ve, mut ie) = (photometric_error(v_true), photometric_error(i_true));
        let mut v = rng.gauss(v_true, ve);
        let mut i = rng.gauss(i_true, ie);

        // a few percent are lost in one filter
        let roll = rng.next_f64();
        if roll < 0.03 {
            v = NOT_DETECTED;
            ve = 9.999;
        } else if roll < 0.05 {
            i = NOT_DETECTED;
            ie = 9.999;
        }

        mag1.push(v);
        mag2.push(i);
        mag1_err.push(ve);
        mag2_err.push(ie);
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("MAG1_ACS", DataType::Float64, false),
        Field::new("MAG2_ACS", DataType::Float64, false),
        Field::new("MAG1_ERR", DataType::Float64, false),
        Field::new("MAG2_ERR", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(mag1)),
            Arc::new(Float64Array::from(mag2)),
            Arc::new(Float64Array::from(mag1_err)),
            Arc::new(Float64Array::from(mag2_err)),
        ],
    )
    .expect("Failed to create RecordBatch");

    let props = WriterProperties::builder()
        .set_key_value_metadata(Some(vec![KeyValue::new(
            "CAMERA".to_string(),
            "ACS".to_string(),
        )]))
        .build();

    // Write Parquet
    let file = std::fs::File::create(&output_path).expect("Failed to create output file");
    let mut writer =
        ArrowWriter::try_new(file, schema, Some(props)).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!("Wrote {n_stars} stars (camera ACS) to {output_path}");
}
