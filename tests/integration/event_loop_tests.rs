/*!
 * Integration tests for the event channel and dispatch loop
 */

use std::sync::Arc;
use anyhow::Result;
use parking_lot::Mutex;
use svg_slicer::app_config::Config;
use svg_slicer::app_controller::{BlankReason, Controller};
use svg_slicer::events::{slicer_channel, SlicerEvent};
use svg_slicer::pins::{PinTransport, PinValue, SignalBus};
use crate::common;
use crate::common::mock_surface::RecordingSurface;

const ENABLE: &str = "qtpyvcp.svgslicer.enable";
const LAYER_IN: &str = "qtpyvcp.svgslicer.layer.in";
const LAYER_COUNT: &str = "qtpyvcp.svgslicer.layer.count";

/// Test that pin writes and notifications are applied in order
#[tokio::test]
async fn test_run_withPinWritesAndNotifications_shouldApplyInOrder() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let drawing = common::create_test_drawing(temp_dir.path(), "part.svg", &["A", "B", "C"])?;

    let (sender, receiver) = slicer_channel();
    let bus = Arc::new(Mutex::new(SignalBus::new(sender.clone())));
    let mut controller = Controller::with_config(Config::default(), bus.clone(), RecordingSurface::new(true))?;
    controller.initialize()?;

    let notifier = sender.notifier();
    notifier.notify(&drawing)?;
    bus.lock().drive(LAYER_IN, PinValue::S32(2))?;
    bus.lock().drive(ENABLE, PinValue::Bit(false))?;
    notifier.notify(&drawing)?;
    sender.send(SlicerEvent::Shutdown)?;

    controller.run(receiver).await?;

    let shown = &controller.surface().shown;
    let layers: Vec<i32> = shown.iter().map(|composite| composite.layer()).collect();
    assert_eq!(layers, vec![0, 2, 0]);
    assert_eq!(controller.surface().enable_calls, vec![false]);
    assert_eq!(bus.lock().value(LAYER_COUNT), Some(PinValue::S32(3)));
    Ok(())
}

/// Test that a failing event does not stop the loop
#[tokio::test]
async fn test_run_withFailedLoad_shouldKeepProcessing() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let drawing = common::create_test_drawing(temp_dir.path(), "part.svg", &["A", "B"])?;

    let (sender, receiver) = slicer_channel();
    let bus = Arc::new(Mutex::new(SignalBus::new(sender.clone())));
    let mut controller = Controller::with_config(Config::default(), bus.clone(), RecordingSurface::new(true))?;
    controller.initialize()?;

    let notifier = sender.notifier();
    notifier.notify(&drawing)?;
    notifier.notify(temp_dir.path().join("missing.svg"))?;
    bus.lock().drive(LAYER_IN, PinValue::S32(1))?;
    sender.send(SlicerEvent::Shutdown)?;

    controller.run(receiver).await?;

    assert_eq!(controller.selection().current_layer(), 1);
    assert_eq!(controller.surface().last_body(), Some(common::layer_markup(1, "B").as_str()));
    Ok(())
}

/// Test that events after a shutdown are not handled
#[test]
fn test_run_withShutdown_shouldStopBeforeLaterEvents() -> Result<()> {
    common::init_test_logging();
    let (sender, receiver) = slicer_channel();
    let bus = SignalBus::new(sender.clone());
    let mut controller = Controller::with_config(Config::default(), bus, RecordingSurface::new(true))?;
    controller.initialize()?;

    sender.send(SlicerEvent::LayerIndexChanged(4))?;
    sender.send(SlicerEvent::Shutdown)?;
    sender.send(SlicerEvent::LayerIndexChanged(7))?;

    tokio_test::block_on(controller.run(receiver))?;

    assert_eq!(controller.selection().current_layer(), 4);
    assert_eq!(controller.last_render().and_then(|report| report.blank), Some(BlankReason::NoDocument));
    assert_eq!(controller.surface().shown.len(), 1);
    Ok(())
}

/// Test that the loop ends once every sender is gone
#[tokio::test]
async fn test_run_withClosedChannel_shouldReturn() -> Result<()> {
    common::init_test_logging();
    let (sender, receiver) = slicer_channel();
    let mut controller = Controller::with_config(
        Config::default(),
        SignalBus::new(slicer_channel().0),
        RecordingSurface::new(true),
    )?;

    sender.send(SlicerEvent::EnableChanged(false))?;
    drop(sender);

    controller.run(receiver).await?;
    assert_eq!(controller.surface().enable_calls, vec![false]);
    Ok(())
}
