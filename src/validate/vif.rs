use std::collections::HashSet;

use anyhow::{Result, bail, ensure};
use ndarray::{Array1, Array2};
use polars::frame::DataFrame;
use polars::prelude::DataType;
use serde::Serialize;

/// Default threshold: covariates with VIF at or above this are candidates
/// for removal.
pub const VIF_THRESHOLD: f64 = 5.0;

// R-squared this close to 1 means exact linear dependence up to rounding.
const SINGULAR_R2: f64 = 1.0 - 1e-12;

/// Named covariate columns from a fitted model's design data. The count
/// model itself is an external collaborator; inflation diagnostics need
/// only its covariate matrix.
#[derive(Debug, Clone)]
pub struct CovariateMatrix {
    names: Vec<String>,
    data: Array2<f64>,
}

impl CovariateMatrix {
    pub fn new(names: Vec<String>, data: Array2<f64>) -> Result<Self> {
        ensure!(names.len() == data.ncols(), "expected one name per column");
        ensure!(data.nrows() > data.ncols(), "need more rows than covariates");
        for (j, name) in names.iter().enumerate() {
            let col = data.column(j);
            let first = col[0];
            ensure!(
                col.iter().any(|&v| v != first),
                "covariate '{name}' is constant; remove it before VIF analysis"
            );
        }
        Ok(Self { names, data })
    }

    /// Pull named numeric columns out of a model-input table. Rows with a
    /// null in any requested column are excluded.
    pub fn from_dataframe(df: &DataFrame, columns: &[&str]) -> Result<Self> {
        let mut series = Vec::with_capacity(columns.len());
        for name in columns {
            let col = df.column(name)?.cast(&DataType::Float64)?;
            series.push(col.f64()?.clone());
        }

        let complete: Vec<usize> = (0..df.height())
            .filter(|&i| series.iter().all(|s| s.get(i).is_some()))
            .collect();

        let mut data = Array2::zeros((complete.len(), columns.len()));
        for (j, s) in series.iter().enumerate() {
            for (row, &i) in complete.iter().enumerate() {
                data[[row, j]] = s.get(i).unwrap();
            }
        }

        Self::new(columns.iter().map(|s| s.to_string()).collect(), data)
    }

    /// Get the covariate names, in column order.
    #[inline] pub fn names(&self) -> &[String] { &self.names }

    /// Get the number of covariates.
    #[inline] pub fn ncols(&self) -> usize { self.data.ncols() }

    /// Get the number of complete observations.
    #[inline] pub fn nrows(&self) -> usize { self.data.nrows() }

    /// Copy of the matrix without the named column.
    fn without(&self, name: &str) -> Self {
        let keep: Vec<usize> = (0..self.ncols())
            .filter(|&j| self.names[j] != name)
            .collect();
        let mut data = Array2::zeros((self.nrows(), keep.len()));
        for (out, &j) in keep.iter().enumerate() {
            data.column_mut(out).assign(&self.data.column(j));
        }
        Self {
            names: keep.iter().map(|&j| self.names[j].clone()).collect(),
            data,
        }
    }
}

/// One covariate's variance inflation factor.
#[derive(Debug, Clone, Serialize)]
pub struct Vif {
    pub covariate: String,
    pub value: f64,
}

/// Variance inflation factor for every covariate, ranked worst first.
///
/// VIF_j = 1 / (1 - R²_j), where R²_j comes from the ordinary least squares
/// regression of covariate j on all the others plus an intercept. Exact
/// linear dependence reports infinity.
pub fn variance_inflation(matrix: &CovariateMatrix) -> Result<Vec<Vif>> {
    ensure!(matrix.ncols() >= 1, "no covariates to analyze");

    let mut out = Vec::with_capacity(matrix.ncols());
    for j in 0..matrix.ncols() {
        let r2 = if matrix.ncols() == 1 { 0.0 } else { auxiliary_r2(&matrix.data, j) };
        let value = if r2 >= SINGULAR_R2 { f64::INFINITY } else { 1.0 / (1.0 - r2) };
        out.push(Vif { covariate: matrix.names[j].clone(), value });
    }
    out.sort_by(|a, b| b.value.total_cmp(&a.value));
    Ok(out)
}

/// R-squared of regressing column `j` on the remaining columns plus intercept.
fn auxiliary_r2(data: &Array2<f64>, j: usize) -> f64 {
    let n = data.nrows();
    let p = data.ncols(); // intercept replaces the response column

    let mut design = Array2::zeros((n, p));
    for row in 0..n {
        design[[row, 0]] = 1.0;
        let mut out = 1;
        for col in 0..p {
            if col == j { continue; }
            design[[row, out]] = data[[row, col]];
            out += 1;
        }
    }
    let y = data.column(j).to_owned();

    let mean = y.sum() / n as f64;
    let sst: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    if sst == 0.0 { return 0.0; }

    // Normal equations; a singular system means exact collinearity.
    let xtx = design.t().dot(&design);
    let xty = design.t().dot(&y);
    let Some(beta) = cholesky_solve(&xtx, &xty) else { return 1.0 };

    let fitted = design.dot(&beta);
    let ssr: f64 = y.iter().zip(fitted.iter()).map(|(y, f)| (y - f).powi(2)).sum();
    (1.0 - ssr / sst).clamp(0.0, 1.0)
}

/// Solve the symmetric positive-definite system `a * x = b` by Cholesky
/// decomposition. Returns None when `a` is singular (or indefinite).
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let scale = (0..n).map(|i| a[[i, i]].abs()).fold(0.0_f64, f64::max);
    let floor = scale.max(1.0) * 1e-12;

    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            if i == j {
                if sum <= floor { return None; }
                l[[i, j]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }

    // Forward substitution: L * z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[[i, k]] * z[k];
        }
        z[i] = sum / l[[i, i]];
    }

    // Back substitution: L' * x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = z[i];
        for k in i + 1..n {
            sum -= l[[k, i]] * x[k];
        }
        x[i] = sum / l[[i, i]];
    }
    Some(x)
}

/// One removal decision in an inflation-resolution session.
#[derive(Debug, Clone, Serialize)]
pub struct VifStep {
    /// Covariate removed this round.
    pub dropped: String,
    /// Its VIF at the moment of removal.
    pub vif: f64,
}

/// Outcome of iterative inflation resolution.
#[derive(Debug, Serialize)]
pub struct VifResolution {
    pub steps: Vec<VifStep>,
    /// Final ranking of the covariates that survived.
    pub retained: Vec<Vif>,
}

/// Iteratively removes the worst-inflated covariate until every remaining
/// VIF falls below the threshold.
///
/// Covariate selection is decision support, not a black box: callers protect
/// ecologically meaningful covariates up front, and the resolver records
/// every removal with the VIF that justified it, so the session is
/// auditable and overridable.
#[derive(Debug, Clone)]
pub struct VifResolver {
    threshold: f64,
    protected: HashSet<String>,
}

impl VifResolver {
    pub fn new(threshold: f64) -> Self {
        Self { threshold, protected: HashSet::new() }
    }

    /// Mark covariates that must never be dropped, whatever their VIF.
    pub fn protect<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protected.extend(names.into_iter().map(Into::into));
        self
    }

    /// Remove one covariate per round (highest unprotected VIF) until the
    /// maximum VIF is below the threshold.
    pub fn resolve(&self, matrix: &CovariateMatrix) -> Result<VifResolution> {
        let mut current = matrix.clone();
        let mut steps = Vec::new();

        loop {
            let vifs = variance_inflation(&current)?;
            if vifs[0].value < self.threshold {
                return Ok(VifResolution { steps, retained: vifs });
            }

            let Some(worst) = vifs.iter().find(|v|
                v.value >= self.threshold && !self.protected.contains(&v.covariate)
            ) else {
                bail!(
                    "all covariates above the VIF threshold are protected: {:?}",
                    vifs.iter()
                        .filter(|v| v.value >= self.threshold)
                        .map(|v| &v.covariate)
                        .collect::<Vec<_>>()
                );
            };

            ensure!(
                current.ncols() > 1,
                "cannot drop the last covariate '{}'", worst.covariate
            );
            steps.push(VifStep { dropped: worst.covariate.clone(), vif: worst.value });
            current = current.without(&worst.covariate.clone());
        }
    }
}
