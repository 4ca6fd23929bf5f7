/*!
 * Tests for the signal bus
 */

use svg_slicer::errors::PinError;
use svg_slicer::events::{slicer_channel, SlicerEvent};
use svg_slicer::pins::{PinDirection, PinSignal, PinTransport, PinType, PinValue, SignalBus};

const ENABLE: &str = "slicer.enable";
const LAYER_IN: &str = "slicer.layer.in";
const LAYER_COUNT: &str = "slicer.layer.count";

fn registered_bus() -> (SignalBus, svg_slicer::events::EventReceiver) {
    let (sender, receiver) = slicer_channel();
    let mut bus = SignalBus::new(sender);
    bus.add_pin(ENABLE, PinSignal::Enable).unwrap();
    bus.add_pin(LAYER_IN, PinSignal::LayerIn).unwrap();
    bus.add_pin(LAYER_COUNT, PinSignal::LayerCount).unwrap();
    (bus, receiver)
}

/// Test that new pins start at their zero value
#[test]
fn test_addPin_withNewPins_shouldStartAtZero() {
    let (bus, _receiver) = registered_bus();

    assert_eq!(bus.value(ENABLE), Some(PinValue::Bit(false)));
    assert_eq!(bus.value(LAYER_IN), Some(PinValue::S32(0)));
    assert_eq!(bus.value(LAYER_COUNT), Some(PinValue::S32(0)));
    assert_eq!(bus.pin_names(), vec![ENABLE, LAYER_COUNT, LAYER_IN]);
    assert_eq!(bus.signal(LAYER_IN), Some(PinSignal::LayerIn));
}

/// Test that registering a name twice fails
#[test]
fn test_addPin_withDuplicateName_shouldFail() {
    let (mut bus, _receiver) = registered_bus();
    assert_eq!(
        bus.add_pin(ENABLE, PinSignal::Enable),
        Err(PinError::AlreadyRegistered(ENABLE.to_string()))
    );
}

/// Test that driving an in-pin emits the typed event
#[test]
fn test_drive_withChangedValue_shouldEmitEvent() {
    let (mut bus, mut receiver) = registered_bus();

    assert_eq!(bus.drive(LAYER_IN, PinValue::S32(4)), Ok(true));
    assert_eq!(bus.drive(ENABLE, PinValue::Bit(true)), Ok(true));

    assert_eq!(receiver.try_recv().unwrap(), SlicerEvent::LayerIndexChanged(4));
    assert_eq!(receiver.try_recv().unwrap(), SlicerEvent::EnableChanged(true));
    assert_eq!(bus.value(LAYER_IN), Some(PinValue::S32(4)));
}

/// Test that driving the same value again is not an event
#[test]
fn test_drive_withUnchangedValue_shouldNotEmitEvent() {
    let (mut bus, mut receiver) = registered_bus();

    assert_eq!(bus.drive(LAYER_IN, PinValue::S32(0)), Ok(false));
    assert!(receiver.try_recv().is_err());
}

/// Test that out-pins cannot be driven externally
#[test]
fn test_drive_withOutPin_shouldFail() {
    let (mut bus, _receiver) = registered_bus();

    assert_eq!(
        bus.drive(LAYER_COUNT, PinValue::S32(3)),
        Err(PinError::WrongDirection {
            name: LAYER_COUNT.to_string(),
            direction: PinDirection::Out,
        })
    );
}

/// Test type checking on drive and set
#[test]
fn test_drive_withWrongType_shouldFail() {
    let (mut bus, _receiver) = registered_bus();

    assert_eq!(
        bus.drive(ENABLE, PinValue::S32(1)),
        Err(PinError::TypeMismatch {
            name: ENABLE.to_string(),
            expected: PinType::Bit,
            actual: PinType::S32,
        })
    );
    assert!(bus.set_value(LAYER_COUNT, PinValue::Bit(true)).is_err());
    assert_eq!(bus.drive("slicer.unknown", PinValue::S32(1)), Err(PinError::Unknown("slicer.unknown".to_string())));
}

/// Test that the slicer side can write any pin silently
#[test]
fn test_setValue_shouldNotEmitEvent() {
    let (mut bus, mut receiver) = registered_bus();

    bus.set_value(LAYER_COUNT, PinValue::S32(12)).unwrap();
    bus.set_value(ENABLE, PinValue::Bit(true)).unwrap();

    assert_eq!(bus.value(LAYER_COUNT), Some(PinValue::S32(12)));
    assert!(receiver.try_recv().is_err());
}

/// Test that a closed channel is reported
#[test]
fn test_drive_withClosedChannel_shouldFail() {
    let (mut bus, receiver) = registered_bus();
    drop(receiver);

    assert_eq!(
        bus.drive(LAYER_IN, PinValue::S32(2)),
        Err(PinError::ChannelClosed(LAYER_IN.to_string()))
    );
}
