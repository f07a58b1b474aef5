use thiserror::Error;

use crate::raster::Axis;

/// Why a chip could not be initialised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChipError {
    #[error("{chip}: memory view {view} is not defined")]
    ViewNotFound { chip: &'static str, view: usize },

    #[error("{axis} raster geometry is invalid: {reason}")]
    InvalidRasterGeometry { axis: Axis, reason: String },
}
