#![allow(dead_code)]

use lingam_core::data::simulate_sem;
use lingam_core::{io, AdjacencyMatrix, ObservationTable};
use rand::{rngs::StdRng, SeedableRng};
use std::path::Path;

/// x1 → x2 → x3 with uniform noise
pub fn chain_graph() -> AdjacencyMatrix {
    let mut g = AdjacencyMatrix::zeros(3);
    g.set_weight(0, 1, 1.5);
    g.set_weight(1, 2, -1.2);
    g
}

pub fn chain_table(n_samples: usize, seed: u64) -> ObservationTable {
    let mut rng = StdRng::seed_from_u64(seed);
    simulate_sem(&chain_graph(), n_samples, &mut rng).unwrap()
}

/// Write a table the way the loader expects it: no header, comma separated
pub fn write_table(path: &Path, table: &ObservationTable) {
    io::write_matrix(path, table.as_matrix()).unwrap();
}
