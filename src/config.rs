use crate::compare::{Combine, Metric};
use crate::error::{MotifError, Result};
use crate::io::MotifFormat;
use crate::linkage::LinkageMethod;
use serde::{Deserialize, Serialize};

/// Parameters of a clustering run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Distance at which the merge tree is cut, also the dissimilarity threshold
    pub threshold: f64,
    /// Metric for the initial all-against-all comparison
    pub metric: Metric,
    pub combine: Combine,
    pub linkage: LinkageMethod,
    /// Output format of the consensus motifs
    pub consensus_format: MotifFormat,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        ClusterConfig {
            threshold: 0.5,
            metric: Metric::Pcc,
            combine: Combine::Mean,
            linkage: LinkageMethod::Average,
            consensus_format: MotifFormat::Pfm,
        }
    }
}

impl ClusterConfig {
    /// # Errors
    /// * `MotifError::InvalidParameter` if the threshold is negative or not finite
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(MotifError::invalid_parameter(
                "threshold",
                self.threshold,
                "must be a finite, non-negative distance",
            ));
        }
        Ok(())
    }
}
