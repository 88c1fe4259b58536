//! Polymorphism over projection method (§9 Design Notes: "model it as a
//! tagged variant with one operation `project`").

use ndarray::{Array2, ArrayView2};

use crate::error::EdmResult;
use crate::simplex;
use crate::smap::{self, SMapParams};

/// Tagged variant selecting Simplex or S-Map projection.
#[derive(Debug, Clone)]
pub enum Method {
    Simplex,
    SMap(SMapParams),
}

/// Output common to both projection methods; `coefficients`/`jacobians` are
/// only populated for S-Map.
pub struct Projection {
    pub predictions: Vec<f64>,
    pub coefficients: Option<Array2<f64>>,
    pub jacobians: Option<Array2<f64>>,
}

impl Method {
    pub fn project(
        &self,
        lib: ArrayView2<f64>,
        lib_targets: &[f64],
        pred: ArrayView2<f64>,
        indices: ArrayView2<usize>,
        distances: ArrayView2<f64>,
    ) -> EdmResult<Projection> {
        match self {
            Method::Simplex => Ok(Projection {
                predictions: simplex::project(lib_targets, indices, distances),
                coefficients: None,
                jacobians: None,
            }),
            Method::SMap(params) => {
                let out = smap::project(lib, lib_targets, pred, indices, distances, params)?;
                Ok(Projection {
                    predictions: out.predictions,
                    coefficients: Some(out.coefficients),
                    jacobians: Some(out.jacobians),
                })
            }
        }
    }
}
