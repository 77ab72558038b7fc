//! Boundary node and view configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::Result;
use crate::math::{LocalityRadii, ViewFrustum};

use super::lod::LodTable;
use super::volume::Extents;

/// Construction-time configuration for a boundary node.
///
/// Every field is optional in JSON:
/// ```
/// use rktri_bounds::scene::BoundaryConfig;
///
/// let config = BoundaryConfig::from_json(r#"{ "xmax": 2.0, "levels": [10, 200] }"#).unwrap();
/// assert_eq!(config.xmin, 0.0);
/// assert_eq!(config.levels, Some(vec![10.0, 200.0]));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    pub xmin: f64,
    pub ymin: f64,
    pub zmin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub zmax: f64,
    /// Projected-size thresholds, one per child, strictly ascending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<Vec<f64>>,
}

impl BoundaryConfig {
    pub fn extents(&self) -> Extents {
        Extents {
            xmin: self.xmin,
            ymin: self.ymin,
            zmin: self.zmin,
            xmax: self.xmax,
            ymax: self.ymax,
            zmax: self.zmax,
        }
    }

    pub fn with_extents(mut self, extents: Extents) -> Self {
        self.xmin = extents.xmin;
        self.ymin = extents.ymin;
        self.zmin = extents.zmin;
        self.xmax = extents.xmax;
        self.ymax = extents.ymax;
        self.zmax = extents.zmax;
        self
    }

    pub fn with_levels(mut self, levels: Vec<f64>) -> Self {
        self.levels = Some(levels);
        self
    }

    /// Check the configuration for a node with `children` children.
    pub fn validate(&self, children: usize) -> Result<()> {
        if let Some(field) = self.extents().first_non_finite() {
            return Err(crate::core::Error::NonFiniteExtent { field });
        }
        if let Some(levels) = self.levels.as_ref().filter(|l| !l.is_empty()) {
            LodTable::new(levels.clone())?.validate_children(children)?;
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a JSON file.
    pub fn load_sync(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Save configuration to a JSON file.
    pub fn save_sync(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Camera and locality settings used by the scene graph driver
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Vertical field of view in degrees
    pub fov_y_degrees: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    /// Viewport height in pixels; projected sizes are in the same unit
    pub viewport_height: f64,
    /// Content beyond this distance is culled outright
    pub outer_radius: f64,
    /// Content beyond this distance is staged but not frustum tested
    pub inner_radius: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 60.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 2000.0,
            viewport_height: 1080.0,
            outer_radius: 1500.0,
            inner_radius: 1000.0,
        }
    }
}

impl ViewConfig {
    pub fn frustum(&self) -> ViewFrustum {
        ViewFrustum::perspective(
            self.fov_y_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
            self.viewport_height,
        )
    }

    pub fn locality(&self) -> LocalityRadii {
        LocalityRadii::around_viewer(self.outer_radius, self.inner_radius)
    }
}
