/*!
 * Discrete signal (pin) model and the in-memory pin transport.
 *
 * A pin is a named, typed, directional value slot shared with an external
 * control system. The slicer owns exactly three of them, described by
 * [`PinSignal`]; their names are the instance base name followed by the
 * signal's own parts, joined by [`PIN_NAME_SEPARATOR`].
 */

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, trace};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::errors::PinError;
use crate::events::{EventSender, SlicerEvent};

/// Separator between the base name and the signal parts of a pin name
pub const PIN_NAME_SEPARATOR: &str = ".";

/// Value type carried by a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinType {
    /// Single boolean bit
    Bit,
    /// Signed 32-bit integer
    S32,
}

impl fmt::Display for PinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bit => write!(f, "bit"),
            Self::S32 => write!(f, "s32"),
        }
    }
}

/// Direction of a pin, seen from the slicer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinDirection {
    /// Written by the external system, read by the slicer
    In,
    /// Written by the slicer, read by the external system
    Out,
}

impl fmt::Display for PinDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => write!(f, "in"),
            Self::Out => write!(f, "out"),
        }
    }
}

/// A typed pin value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinValue {
    Bit(bool),
    S32(i32),
}

impl PinValue {
    pub fn pin_type(&self) -> PinType {
        match self {
            Self::Bit(_) => PinType::Bit,
            Self::S32(_) => PinType::S32,
        }
    }

    /// Zero value for a pin type
    pub fn default_for(pin_type: PinType) -> Self {
        match pin_type {
            PinType::Bit => Self::Bit(false),
            PinType::S32 => Self::S32(0),
        }
    }
}

impl fmt::Display for PinValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bit(value) => write!(f, "{}", u8::from(*value)),
            Self::S32(value) => write!(f, "{}", value),
        }
    }
}

/// The three signals exposed by a slicer instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinSignal {
    /// `enable`: display surface active flag
    Enable,
    /// `layer.in`: requested layer index
    LayerIn,
    /// `layer.count`: layer count of the loaded drawing
    LayerCount,
}

impl PinSignal {
    /// All signals in registration order
    pub const ALL: [PinSignal; 3] = [Self::Enable, Self::LayerIn, Self::LayerCount];

    /// Name parts appended to the base name
    pub fn suffix(&self) -> &'static [&'static str] {
        match self {
            Self::Enable => &["enable"],
            Self::LayerIn => &["layer", "in"],
            Self::LayerCount => &["layer", "count"],
        }
    }

    pub fn pin_type(&self) -> PinType {
        match self {
            Self::Enable => PinType::Bit,
            Self::LayerIn | Self::LayerCount => PinType::S32,
        }
    }

    pub fn direction(&self) -> PinDirection {
        match self {
            Self::Enable | Self::LayerIn => PinDirection::In,
            Self::LayerCount => PinDirection::Out,
        }
    }

    /// Full pin name for this signal under `base_name`
    pub fn full_name(&self, base_name: &str) -> String {
        pin_name(base_name, self.suffix())
    }
}

/// Join a base name and signal parts into a pin name
pub fn pin_name(base_name: &str, parts: &[&str]) -> String {
    std::iter::once(base_name)
        .chain(parts.iter().copied())
        .collect::<Vec<_>>()
        .join(PIN_NAME_SEPARATOR)
}

/// Transport the controller registers and publishes its pins on
///
/// Implementations adapt the slicer to whatever signal mechanism the host
/// uses. External writes to in-pins must be delivered back to the controller
/// as [`SlicerEvent`]s on its channel.
pub trait PinTransport {
    /// Create a pin. Each name may only be registered once.
    fn add_pin(&mut self, name: &str, signal: PinSignal) -> Result<(), PinError>;

    /// Set a pin value from the slicer side. Never emits an event.
    fn set_value(&mut self, name: &str, value: PinValue) -> Result<(), PinError>;

    /// Current value of a pin
    fn value(&self, name: &str) -> Option<PinValue>;
}

#[derive(Debug, Clone)]
struct PinSlot {
    signal: PinSignal,
    value: PinValue,
}

/// In-memory pin transport
///
/// The external side writes in-pins with [`SignalBus::drive`]; a write that
/// changes the stored value is forwarded to the controller as the matching
/// [`SlicerEvent`].
#[derive(Debug)]
pub struct SignalBus {
    pins: HashMap<String, PinSlot>,
    events: EventSender,
}

impl SignalBus {
    /// Create a bus forwarding in-pin changes to `events`
    pub fn new(events: EventSender) -> Self {
        Self {
            pins: HashMap::new(),
            events,
        }
    }

    /// Write an in-pin from the external side
    ///
    /// Returns `Ok(true)` if the value changed and an event was sent,
    /// `Ok(false)` if the pin already held this value.
    pub fn drive(&mut self, name: &str, value: PinValue) -> Result<bool, PinError> {
        let slot = self.pins.get_mut(name)
            .ok_or_else(|| PinError::Unknown(name.to_string()))?;

        if slot.signal.direction() != PinDirection::In {
            return Err(PinError::WrongDirection {
                name: name.to_string(),
                direction: slot.signal.direction(),
            });
        }
        check_type(name, slot.signal.pin_type(), value)?;

        if slot.value == value {
            trace!("Pin {} unchanged at {}", name, value);
            return Ok(false);
        }
        slot.value = value;

        match SlicerEvent::from_pin(slot.signal, value) {
            Some(event) => {
                debug!("Pin {} -> {}", name, value);
                self.events.send(event)
                    .map_err(|_| PinError::ChannelClosed(name.to_string()))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Names of all registered pins, sorted
    pub fn pin_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pins.keys().cloned().collect();
        names.sort();
        names
    }

    /// Signal bound to a pin name
    pub fn signal(&self, name: &str) -> Option<PinSignal> {
        self.pins.get(name).map(|slot| slot.signal)
    }
}

impl PinTransport for SignalBus {
    fn add_pin(&mut self, name: &str, signal: PinSignal) -> Result<(), PinError> {
        if self.pins.contains_key(name) {
            return Err(PinError::AlreadyRegistered(name.to_string()));
        }
        debug!("Adding pin {} ({}, {})", name, signal.pin_type(), signal.direction());
        self.pins.insert(name.to_string(), PinSlot {
            signal,
            value: PinValue::default_for(signal.pin_type()),
        });
        Ok(())
    }

    fn set_value(&mut self, name: &str, value: PinValue) -> Result<(), PinError> {
        let slot = self.pins.get_mut(name)
            .ok_or_else(|| PinError::Unknown(name.to_string()))?;
        check_type(name, slot.signal.pin_type(), value)?;
        slot.value = value;
        Ok(())
    }

    fn value(&self, name: &str) -> Option<PinValue> {
        self.pins.get(name).map(|slot| slot.value)
    }
}

/// Shared transport, for hosts that drive pins from another task
impl<T: PinTransport> PinTransport for Arc<Mutex<T>> {
    fn add_pin(&mut self, name: &str, signal: PinSignal) -> Result<(), PinError> {
        self.lock().add_pin(name, signal)
    }

    fn set_value(&mut self, name: &str, value: PinValue) -> Result<(), PinError> {
        self.lock().set_value(name, value)
    }

    fn value(&self, name: &str) -> Option<PinValue> {
        self.lock().value(name)
    }
}

fn check_type(name: &str, expected: PinType, value: PinValue) -> Result<(), PinError> {
    if value.pin_type() != expected {
        return Err(PinError::TypeMismatch {
            name: name.to_string(),
            expected,
            actual: value.pin_type(),
        });
    }
    Ok(())
}
