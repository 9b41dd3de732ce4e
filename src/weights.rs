use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use ndarray::Array2;

use crate::MoeadError;

/// The `N x M` matrix of weight vectors, one row per subproblem.
///
/// Rows are fixed for the whole run. For two objectives and up to 300
/// subproblems the set is the exact closed form `(a, 1 - a)` with
/// `a = i / (N - 1)`; larger instances are read from a precomputed
/// `W{M}D_{N}.dat` file under the configured data directory.
#[derive(Clone)]
pub struct WeightVectorSet {
    lambda: Array2<f64>,
}

impl WeightVectorSet {
    /// Closed-form generation for `objectives == 2`.
    pub fn generate(objectives: usize, subproblems: usize) -> Result<Self, MoeadError> {
        if objectives != 2 {
            return Err(MoeadError::Config(format!(
                "closed-form weight generation only covers 2 objectives, got {}",
                objectives
            )));
        }
        if subproblems < 2 {
            return Err(MoeadError::Config(
                "at least 2 subproblems are required".to_string(),
            ));
        }

        let mut lambda = Array2::zeros((subproblems, objectives));
        for n in 0..subproblems {
            let a = n as f64 / (subproblems - 1) as f64;
            lambda[[n, 0]] = a;
            lambda[[n, 1]] = 1.0 - a;
        }

        let set = WeightVectorSet { lambda };
        set.check_nonzero_rows()?;
        Ok(set)
    }

    /// Load `W{objectives}D_{subproblems}.dat` from `data_directory`.
    ///
    /// The file holds one whitespace-separated row per line. A missing
    /// file, a row of the wrong width or a row count other than
    /// `subproblems` is fatal.
    pub fn from_file(
        data_directory: &Path,
        objectives: usize,
        subproblems: usize,
    ) -> Result<Self, MoeadError> {
        let path = data_directory.join(format!("W{}D_{}.dat", objectives, subproblems));
        let contents = fs::read_to_string(&path).map_err(|err| MoeadError::WeightFile {
            path: path.clone(),
            reason: err.to_string(),
        })?;

        let mut lambda = Array2::zeros((subproblems, objectives));
        let mut rows = 0;
        for (line_no, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            if rows == subproblems {
                return Err(malformed(&path, format!("more than {} rows", subproblems)));
            }

            let mut cols = 0;
            for token in line.split_whitespace() {
                if cols == objectives {
                    return Err(malformed(
                        &path,
                        format!("line {}: more than {} columns", line_no + 1, objectives),
                    ));
                }
                let value: f64 = token.parse().map_err(|_| {
                    malformed(&path, format!("line {}: bad value '{}'", line_no + 1, token))
                })?;
                lambda[[rows, cols]] = value;
                cols += 1;
            }
            if cols != objectives {
                return Err(malformed(
                    &path,
                    format!("line {}: expected {} columns, got {}", line_no + 1, objectives, cols),
                ));
            }
            rows += 1;
        }
        if rows != subproblems {
            return Err(malformed(
                &path,
                format!("expected {} rows, got {}", subproblems, rows),
            ));
        }

        info!("loaded {} weight vectors from {}", rows, path.display());

        let set = WeightVectorSet { lambda };
        set.check_nonzero_rows()?;
        Ok(set)
    }

    /// Generate analytically when possible, otherwise read the
    /// precomputed file.
    pub fn for_problem(
        data_directory: &Path,
        objectives: usize,
        subproblems: usize,
    ) -> Result<Self, MoeadError> {
        if objectives == 2 && subproblems <= 300 {
            WeightVectorSet::generate(objectives, subproblems)
        } else {
            WeightVectorSet::from_file(data_directory, objectives, subproblems)
        }
    }

    pub fn len(&self) -> usize {
        self.lambda.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.lambda.nrows() == 0
    }

    pub fn objectives(&self) -> usize {
        self.lambda.ncols()
    }

    pub fn row(&self, subproblem: usize) -> &[f64] {
        self.lambda
            .row(subproblem)
            .to_slice()
            .expect("weight matrix is contiguous")
    }

    /// Scale every row to unit Euclidean norm.
    ///
    /// The dominance-decomposition variant projects objective vectors
    /// onto normalized weight lines; scalar fitness keeps the raw rows.
    pub fn normalized(mut self) -> Self {
        for mut row in self.lambda.rows_mut() {
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            row.mapv_inplace(|v| v / norm);
        }
        self
    }

    fn check_nonzero_rows(&self) -> Result<(), MoeadError> {
        for (i, row) in self.lambda.rows().into_iter().enumerate() {
            let norm_sq: f64 = row.iter().map(|v| v * v).sum();
            if norm_sq == 0.0 {
                return Err(MoeadError::Degenerate(format!(
                    "weight vector {} has zero norm",
                    i
                )));
            }
        }
        Ok(())
    }
}

fn malformed(path: &Path, reason: String) -> MoeadError {
    MoeadError::WeightFile {
        path: PathBuf::from(path),
        reason,
    }
}
