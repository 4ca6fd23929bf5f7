use log::{debug, error, info, warn};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::app_config::{Config, RangePolicy};
use crate::compositor::{self, CompositeDocument};
use crate::display::DisplaySurface;
use crate::errors::{AppError, PinError};
use crate::events::{EventReceiver, SlicerEvent};
use crate::pins::{PinSignal, PinTransport, PinValue};
use crate::selection::SelectionState;
use crate::svg_document::SvgDocument;

// @module: Pin binding controller for the layer slicer

/// Why a render came out blank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankReason {
    /// No drawing has been loaded yet
    NoDocument,
    /// The index is outside `[0, layer_count)`
    OutOfRange,
    /// The index is in range but no group carries that id
    NoMatch,
}

impl fmt::Display for BlankReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDocument => write!(f, "no drawing loaded"),
            Self::OutOfRange => write!(f, "layer index out of range"),
            Self::NoMatch => write!(f, "no layer group with this id"),
        }
    }
}

/// Outcome of the most recent render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderReport {
    /// Layer that was requested
    pub layer: i32,
    /// Set when the composite had an empty body
    pub blank: Option<BlankReason>,
}

// @struct: Document and selection, always replaced together
#[derive(Debug, Default)]
struct SlicerState {
    document: Option<Arc<SvgDocument>>,
    selection: SelectionState,
}

// @struct: Registered pin names
#[derive(Debug)]
struct PinNames {
    enable: String,
    layer_in: String,
    layer_count: String,
}

/// Binds the slicer pins to the loader, selection state and compositor
///
/// All state changes go through [`Controller::handle_event`]; [`Controller::run`]
/// drains the event channel one event at a time.
pub struct Controller<T: PinTransport, D: DisplaySurface> {
    // @field: App configuration
    config: Config,
    transport: T,
    surface: D,
    state: SlicerState,
    pins: Option<PinNames>,
    last_render: Option<RenderReport>,
}

impl<T: PinTransport, D: DisplaySurface> Controller<T, D> {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config, transport: T, surface: D) -> Result<Self, AppError> {
        config.validate()
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self {
            config,
            transport,
            surface,
            state: SlicerState::default(),
            pins: None,
            last_render: None,
        })
    }

    /// Register the three pins. May only be called once.
    pub fn initialize(&mut self) -> Result<(), AppError> {
        let base_name = &self.config.pins.base_name;
        if self.pins.is_some() {
            return Err(PinError::AlreadyRegistered(PinSignal::Enable.full_name(base_name)).into());
        }

        let names = PinNames {
            enable: PinSignal::Enable.full_name(base_name),
            layer_in: PinSignal::LayerIn.full_name(base_name),
            layer_count: PinSignal::LayerCount.full_name(base_name),
        };

        self.transport.add_pin(&names.enable, PinSignal::Enable)?;
        self.transport.set_value(&names.enable, PinValue::Bit(self.surface.is_enabled()))?;

        self.transport.add_pin(&names.layer_in, PinSignal::LayerIn)?;

        self.transport.add_pin(&names.layer_count, PinSignal::LayerCount)?;
        self.transport.set_value(&names.layer_count, PinValue::S32(count_pin_value(self.state.selection.layer_count())))?;

        info!("Registered pins under {}", base_name);
        self.pins = Some(names);
        Ok(())
    }

    /// Check if the pins have been registered
    pub fn is_initialized(&self) -> bool {
        self.pins.is_some()
    }

    /// Handle one event to completion
    pub fn handle_event(&mut self, event: SlicerEvent) -> Result<(), AppError> {
        match event {
            SlicerEvent::EnableChanged(enabled) => self.set_enabled(enabled),
            SlicerEvent::LayerIndexChanged(index) => self.select_layer(index),
            SlicerEvent::DocumentChanged(path) => self.load_document(&path),
            SlicerEvent::Shutdown => Ok(()),
        }
    }

    /// Process events until the channel closes or a shutdown arrives
    ///
    /// A failing event is logged and does not stop the loop; a failed load
    /// leaves the previous drawing in place.
    pub async fn run(&mut self, mut events: EventReceiver) -> Result<(), AppError> {
        while let Some(event) = events.recv().await {
            if event == SlicerEvent::Shutdown {
                debug!("Shutdown requested");
                break;
            }
            debug!("Handling {:?}", event);
            if let Err(e) = self.handle_event(event) {
                error!("{}", e);
            }
        }
        Ok(())
    }

    /// Replace the drawing, reset the selection, publish the count and render layer 0
    ///
    /// `layer.in` is written back to 0 so that requesting the previous index
    /// again counts as a change.
    pub fn load_document<P: AsRef<Path>>(&mut self, path: P) -> Result<(), AppError> {
        let document = SvgDocument::load(path)?;

        let mut selection = SelectionState::new();
        selection.on_load(&document);
        self.state = SlicerState {
            document: Some(Arc::new(document)),
            selection,
        };

        self.publish_selection()?;
        self.render()
    }

    /// Select a layer and render it
    pub fn select_layer(&mut self, index: i32) -> Result<(), AppError> {
        if self.config.selection.out_of_range == RangePolicy::Reject {
            self.state.selection.check_range(index)?;
        }

        self.state.selection.on_select(index);
        self.render()
    }

    /// Activate or deactivate the display surface
    pub fn set_enabled(&mut self, enabled: bool) -> Result<(), AppError> {
        debug!("Display {}", if enabled { "enabled" } else { "disabled" });
        self.surface.set_enabled(enabled)
    }

    /// Compose the current layer without publishing it
    pub fn current_composite(&self) -> CompositeDocument {
        let layer = self.state.selection.current_layer();
        match &self.state.document {
            Some(document) => compositor::compose(document, layer),
            None => CompositeDocument::blank(layer),
        }
    }

    fn render(&mut self) -> Result<(), AppError> {
        let composite = self.current_composite();
        let layer = composite.layer();

        let blank = if self.state.document.is_none() {
            Some(BlankReason::NoDocument)
        } else if composite.is_blank() && !self.state.selection.is_in_range() {
            Some(BlankReason::OutOfRange)
        } else if composite.is_blank() {
            Some(BlankReason::NoMatch)
        } else {
            None
        };

        if let Some(reason) = blank {
            warn!("Layer {} rendered blank: {}", layer, reason);
        }

        self.surface.show(&composite)?;
        self.last_render = Some(RenderReport { layer, blank });
        Ok(())
    }

    // @publishes: Layer count, and the reset index back onto layer.in
    fn publish_selection(&mut self) -> Result<(), AppError> {
        let count = self.state.selection.layer_count();
        let layer = self.state.selection.current_layer();
        match &self.pins {
            Some(names) => {
                self.transport.set_value(&names.layer_count, PinValue::S32(count_pin_value(count)))?;
                self.transport.set_value(&names.layer_in, PinValue::S32(layer))?;
                debug!("Published layer count {}, layer.in {}", count, layer);
            }
            None => debug!("Pins not registered, layer count {} not published", count),
        }
        Ok(())
    }

    pub fn selection(&self) -> SelectionState {
        self.state.selection
    }

    /// Currently loaded drawing
    pub fn document(&self) -> Option<Arc<SvgDocument>> {
        self.state.document.clone()
    }

    pub fn last_render(&self) -> Option<RenderReport> {
        self.last_render
    }

    /// Registered name of a pin
    pub fn pin_name(&self, signal: PinSignal) -> Option<&str> {
        self.pins.as_ref().map(|names| match signal {
            PinSignal::Enable => names.enable.as_str(),
            PinSignal::LayerIn => names.layer_in.as_str(),
            PinSignal::LayerCount => names.layer_count.as_str(),
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }
}

// @returns: Layer count as an s32 pin value, saturating
fn count_pin_value(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}
