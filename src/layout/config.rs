//! Layout constants.

use serde::{Deserialize, Serialize};

use crate::error::{GenogramError, Result};

/// Configuration for the genogram layout.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Distance between neighbouring persons in a row.
    pub horizontal_spacing: f64,
    /// Distance between generation rows.
    pub vertical_spacing: f64,
    /// Y of the top generation before centring.
    pub start_y: f64,
    /// Every coordinate is a multiple of this.
    pub grid_size: f64,
    /// Horizontal centre of the top generation before centring.
    pub first_generation_center_x: f64,
    /// Point the bounding-box centre of the finished layout is moved onto.
    pub target_center_x: f64,
    pub target_center_y: f64,
    /// Minimum gap between the end of one family group and the next.
    pub min_group_gap: f64,
    /// Two parent groups further apart than this are laid out as the two
    /// independent sides of a family.
    pub split_family_threshold: f64,
    /// Minimum offset of each grandparent couple from the centre.
    pub min_grandparent_gap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: 150.0,
            vertical_spacing: 150.0,
            start_y: 100.0,
            grid_size: 50.0,
            first_generation_center_x: 500.0,
            target_center_x: 500.0,
            target_center_y: 300.0,
            min_group_gap: 50.0,
            split_family_threshold: 250.0,
            min_grandparent_gap: 100.0,
        }
    }
}

impl LayoutConfig {
    /// Reject values that would make the layout degenerate.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("horizontalSpacing", self.horizontal_spacing),
            ("verticalSpacing", self.vertical_spacing),
            ("gridSize", self.grid_size),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(GenogramError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        let finite = [
            ("startY", self.start_y),
            ("firstGenerationCenterX", self.first_generation_center_x),
            ("targetCenterX", self.target_center_x),
            ("targetCenterY", self.target_center_y),
            ("minGroupGap", self.min_group_gap),
            ("splitFamilyThreshold", self.split_family_threshold),
            ("minGrandparentGap", self.min_grandparent_gap),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(GenogramError::InvalidConfig(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}
