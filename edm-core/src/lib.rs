//! # edm-core
//!
//! Empirical Dynamic Modeling engine: time-delay embedding, nearest-neighbor
//! search, Simplex and S-Map projection, Convergent Cross Mapping, Multiview
//! ensembles, and parameter sweeps. No I/O — callers hand in a parsed
//! [`dataset::Dataset`] and get back typed results.

pub mod ccm;
pub mod dataset;
pub mod distance;
pub mod embed;
pub mod error;
pub mod method;
pub mod multiview;
pub mod neighbors;
pub mod predict;
pub mod simplex;
pub mod smap;
pub mod stats;
pub mod sweep;

pub use ccm::{ccm, CCMParams};
pub use dataset::Dataset;
pub use embed::{embed, EmbedParams};
pub use error::{EdmError, EdmResult};
pub use method::Method;
pub use multiview::{multiview, MultiviewOutput, MultiviewParams, SubsetResult};
pub use predict::{predict, PredictOutput, PredictParams, Range, SMapTable};
pub use smap::SMapParams;
pub use stats::ErrorStats;
pub use sweep::{e_sweep, theta_sweep, tp_sweep, SweepPoint, THETA_GRID};

/// Convenient glob import for downstream crates.
pub mod prelude {
    pub use crate::{
        ccm, embed, multiview, predict, CCMParams, Dataset, EdmError, EdmResult, EmbedParams,
        Method, MultiviewOutput, MultiviewParams, PredictOutput, PredictParams, Range,
        SMapParams, SweepPoint,
    };
}
