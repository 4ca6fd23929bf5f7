/*!
 * Recording display surface for controller tests
 */

use svg_slicer::compositor::CompositeDocument;
use svg_slicer::display::DisplaySurface;
use svg_slicer::errors::AppError;

/// Surface that records everything it is asked to show
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub enabled: bool,
    pub shown: Vec<CompositeDocument>,
    pub enable_calls: Vec<bool>,
}

impl RecordingSurface {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    /// Most recently shown composite
    pub fn last(&self) -> Option<&CompositeDocument> {
        self.shown.last()
    }

    /// Body of the most recently shown composite
    pub fn last_body(&self) -> Option<&str> {
        self.last().map(|composite| composite.body())
    }
}

impl DisplaySurface for RecordingSurface {
    fn set_enabled(&mut self, enabled: bool) -> Result<(), AppError> {
        self.enabled = enabled;
        self.enable_calls.push(enabled);
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn show(&mut self, composite: &CompositeDocument) -> Result<(), AppError> {
        self.shown.push(composite.clone());
        Ok(())
    }
}
