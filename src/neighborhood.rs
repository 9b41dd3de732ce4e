use ndarray::Array2;

use crate::weights::WeightVectorSet;
use crate::MoeadError;

/// For each subproblem, the `T` subproblems whose weight vectors are
/// closest in Euclidean distance, the subproblem itself included.
///
/// Built once after the weight set is fixed and immutable afterwards.
/// Row entries are ordered ascending by distance, ties kept in index
/// order.
pub struct NeighborhoodTable {
    table: Array2<usize>,
}

impl NeighborhoodTable {
    /// `O(N^2 M + N^2 log N)`; fine for the usual `N <= 1000`.
    pub fn build(weights: &WeightVectorSet, neighbor_size: usize) -> Result<Self, MoeadError> {
        let n = weights.len();
        if neighbor_size > n {
            return Err(MoeadError::Config(format!(
                "neighborhood size {} exceeds the {} weight vectors",
                neighbor_size, n
            )));
        }

        let mut table = Array2::zeros((n, neighbor_size));
        let mut order: Vec<usize> = Vec::with_capacity(n);
        for i in 0..n {
            order.clear();
            order.extend(0..n);

            let row_i = weights.row(i);
            order.sort_by(|&a, &b| {
                let da = dist_vector(row_i, weights.row(a));
                let db = dist_vector(row_i, weights.row(b));
                da.partial_cmp(&db).unwrap().then(a.cmp(&b))
            });

            for (j, &idx) in order[..neighbor_size].iter().enumerate() {
                table[[i, j]] = idx;
            }
        }

        Ok(NeighborhoodTable { table })
    }

    pub fn neighbor_size(&self) -> usize {
        self.table.ncols()
    }

    pub fn row(&self, subproblem: usize) -> &[usize] {
        self.table
            .row(subproblem)
            .to_slice()
            .expect("neighborhood table is contiguous")
    }
}

fn dist_vector(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_contains_self_first() {
        let weights = WeightVectorSet::generate(2, 50).unwrap();
        let table = NeighborhoodTable::build(&weights, 7).unwrap();

        for i in 0..50 {
            let row = table.row(i);
            assert_eq!(row.len(), 7);
            assert_eq!(row[0], i);
        }
    }

    #[test]
    fn row_is_sorted_by_distance() {
        let weights = WeightVectorSet::generate(2, 30).unwrap();
        let table = NeighborhoodTable::build(&weights, 10).unwrap();

        for i in 0..30 {
            let row = table.row(i);
            let dists: Vec<f64> = row
                .iter()
                .map(|&j| dist_vector(weights.row(i), weights.row(j)))
                .collect();
            for pair in dists.windows(2) {
                assert!(pair[0] <= pair[1]);
            }
        }
    }

    #[test]
    fn neighbors_of_an_endpoint() {
        // with uniformly spread 2-objective weights the neighbors of
        // subproblem 0 are exactly the lowest indices
        let weights = WeightVectorSet::generate(2, 20).unwrap();
        let table = NeighborhoodTable::build(&weights, 4).unwrap();

        assert_eq!(table.row(0), &[0, 1, 2, 3]);
    }

    #[test]
    fn oversized_neighborhood_is_rejected() {
        let weights = WeightVectorSet::generate(2, 10).unwrap();

        assert!(matches!(
            NeighborhoodTable::build(&weights, 11),
            Err(MoeadError::Config(_))
        ));
    }
}
