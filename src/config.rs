use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Tunable extraction parameters. Missing keys in a config file take the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Process cell columns on the rayon pool. Output order is unchanged.
    pub parallel: bool,
    /// Endpoint match distance for stitching, as a fraction of the larger grid spacing.
    pub stitch_tolerance: f64,

    // Preview
    pub preview_scale: usize,
    pub line_color: [u8; 4],
}

impl Default for Params {
    fn default() -> Self {
        Self {
            parallel: false,
            stitch_tolerance: 1e-6,
            preview_scale: 4,
            line_color: [20, 20, 20, 255],
        }
    }
}

impl Params {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
