/*!
 * Display surfaces that receive composed layers.
 */

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::compositor::CompositeDocument;
use crate::errors::AppError;
use crate::file_utils::FileManager;

/// Target the controller publishes composites to
pub trait DisplaySurface {
    /// Activate or deactivate the surface
    fn set_enabled(&mut self, enabled: bool) -> Result<(), AppError>;

    fn is_enabled(&self) -> bool;

    /// Show a freshly composed layer
    fn show(&mut self, composite: &CompositeDocument) -> Result<(), AppError>;
}

/// Surface that writes each composite to an SVG file
///
/// While disabled the latest composite is held back and written once the
/// surface is enabled again.
#[derive(Debug)]
pub struct SvgFileSurface {
    output_path: PathBuf,
    enabled: bool,
    pending: Option<CompositeDocument>,
}

impl SvgFileSurface {
    pub fn new<P: AsRef<Path>>(output_path: P, enabled: bool) -> Self {
        Self {
            output_path: output_path.as_ref().to_path_buf(),
            enabled,
            pending: None,
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    fn write(&self, composite: &CompositeDocument) -> Result<(), AppError> {
        FileManager::replace_file(&self.output_path, &composite.to_bytes())?;
        info!("Layer {} written to {}", composite.layer(), self.output_path.display());
        Ok(())
    }
}

impl DisplaySurface for SvgFileSurface {
    fn set_enabled(&mut self, enabled: bool) -> Result<(), AppError> {
        self.enabled = enabled;
        if enabled {
            if let Some(composite) = self.pending.take() {
                self.write(&composite)?;
            }
        }
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn show(&mut self, composite: &CompositeDocument) -> Result<(), AppError> {
        if self.enabled {
            self.pending = None;
            self.write(composite)
        } else {
            debug!("Surface disabled, holding layer {}", composite.layer());
            self.pending = Some(composite.clone());
            Ok(())
        }
    }
}
