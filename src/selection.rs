/*!
 * Layer selection state.
 *
 * Holds the requested layer index and the layer count of the most recently
 * loaded drawing. Loading resets the index to zero; selecting stores the
 * index verbatim.
 */

use serde::Serialize;

use crate::errors::SelectError;
use crate::svg_document::SvgDocument;

/// Current layer pointer and layer count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SelectionState {
    current_layer: i32,
    layer_count: usize,
}

impl SelectionState {
    /// State before any drawing is loaded: `(0, 0)`
    pub fn new() -> Self {
        Self::default()
    }

    /// A new drawing was loaded
    pub fn on_load(&mut self, document: &SvgDocument) {
        self.layer_count = document.layer_count();
        self.current_layer = 0;
    }

    /// A new layer index was requested. No bounds check.
    pub fn on_select(&mut self, index: i32) {
        self.current_layer = index;
    }

    pub fn current_layer(&self) -> i32 {
        self.current_layer
    }

    pub fn layer_count(&self) -> usize {
        self.layer_count
    }

    /// Whether `index` lies in `[0, layer_count)`
    pub fn contains(&self, index: i32) -> bool {
        usize::try_from(index).is_ok_and(|index| index < self.layer_count)
    }

    /// Whether the current layer lies in `[0, layer_count)`
    pub fn is_in_range(&self) -> bool {
        self.contains(self.current_layer)
    }

    /// Check `index` against the layer count
    pub fn check_range(&self, index: i32) -> Result<(), SelectError> {
        if self.contains(index) {
            Ok(())
        } else {
            Err(SelectError::OutOfRange {
                index,
                layer_count: self.layer_count,
            })
        }
    }
}
