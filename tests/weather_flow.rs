//! Weather flow against scripted location and weather services

mod support;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use disasterwatch::data::WeatherClient;
use disasterwatch::location::{
    Coordinate, LocationProvider, LocationSource, PermissionGate, PositionOptions,
    DEFAULT_COORDINATE,
};
use disasterwatch::risk::RiskLevel;
use disasterwatch::weather::{WeatherController, WeatherEvent, WeatherState};

use support::{snapshot_for, ScriptedLocation, ScriptedWeather, WeatherReply};

const CHENNAI: Coordinate = Coordinate {
    latitude: 13.0827,
    longitude: 80.2707,
};

fn controller(
    location: Arc<dyn LocationProvider>,
    weather: Arc<dyn WeatherClient>,
) -> (WeatherController, mpsc::UnboundedReceiver<WeatherEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        WeatherController::new(PositionOptions::default(), location, weather, tx),
        rx,
    )
}

#[tokio::test]
async fn test_denied_location_falls_back_and_uses_response_name() {
    let gate = PermissionGate::new(
        Arc::new(ScriptedLocation::at(CHENNAI)),
        Arc::new(AtomicBool::new(false)),
    );
    let weather = Arc::new(ScriptedWeather::new(vec![WeatherReply::ok(snapshot_for(
        "Mumbai",
        "Rain",
        22.0,
    ))]));
    let (mut controller, mut rx) = controller(Arc::new(gate), weather.clone());

    controller.start();
    assert!(controller.is_loading());
    controller.handle_event(rx.recv().await.unwrap());

    assert_eq!(weather.requests(), vec![DEFAULT_COORDINATE]);
    assert_eq!(controller.coordinate(), Some(DEFAULT_COORDINATE));
    assert_eq!(controller.location_source(), Some(LocationSource::Fallback));

    let snapshot = controller.snapshot().expect("weather ready");
    assert_eq!(snapshot.current.location_name, "Mumbai");
    assert_eq!(controller.risk().unwrap().level, RiskLevel::Moderate);
}

#[tokio::test]
async fn test_fetch_failure_ends_in_error() {
    let weather = Arc::new(ScriptedWeather::new(vec![WeatherReply::err(
        "Weather API key not configured",
    )]));
    let (mut controller, mut rx) = controller(Arc::new(ScriptedLocation::at(CHENNAI)), weather);

    controller.start();
    controller.handle_event(rx.recv().await.unwrap());

    assert!(!controller.is_loading());
    assert!(controller.snapshot().is_none());
    assert!(controller.risk().is_none());
    match controller.state() {
        WeatherState::Error(message) => {
            assert!(message.contains("502"), "{}", message);
            assert!(message.contains("API key"), "{}", message);
        }
        other => panic!("Expected Error, got {:?}", other),
    }
    assert_eq!(controller.location_source(), Some(LocationSource::Device));
}

#[tokio::test(start_paused = true)]
async fn test_slow_stale_response_does_not_overwrite_newer_one() {
    let weather = Arc::new(ScriptedWeather::new(vec![
        WeatherReply::ok(snapshot_for("Stale", "Clear", 5.0)).after(Duration::from_secs(5)),
        WeatherReply::ok(snapshot_for("Fresh", "Thunderstorm", 40.0)).after(Duration::from_secs(1)),
    ]));
    let (mut controller, mut rx) =
        controller(Arc::new(ScriptedLocation::at(CHENNAI)), weather.clone());

    controller.start();
    // Let the first request take its reply before the second is issued
    tokio::time::sleep(Duration::from_millis(10)).await;
    let latest = controller.refresh();
    assert_eq!(latest, 2);

    controller.handle_event(rx.recv().await.unwrap());
    assert_eq!(controller.snapshot().unwrap().current.location_name, "Fresh");

    controller.handle_event(rx.recv().await.unwrap());
    assert_eq!(controller.snapshot().unwrap().current.location_name, "Fresh");
    assert_eq!(controller.risk().unwrap().level, RiskLevel::High);
    assert_eq!(weather.requests().len(), 2);
}

#[tokio::test]
async fn test_refresh_reuses_resolved_coordinate() {
    let location = Arc::new(ScriptedLocation::at(CHENNAI));
    let weather = Arc::new(ScriptedWeather::new(vec![
        WeatherReply::ok(snapshot_for("Chennai", "Clouds", 12.0)),
        WeatherReply::ok(snapshot_for("Chennai", "Clear", 8.0)),
    ]));
    let (mut controller, mut rx) = controller(location.clone(), weather.clone());

    controller.start();
    controller.handle_event(rx.recv().await.unwrap());
    assert_eq!(controller.risk().unwrap().level, RiskLevel::Low);

    controller.refresh();
    assert!(controller.is_loading(), "refresh re-enters Loading");
    controller.handle_event(rx.recv().await.unwrap());

    assert_eq!(location.calls(), 1);
    assert_eq!(weather.requests(), vec![CHENNAI, CHENNAI]);
    assert_eq!(controller.snapshot().unwrap().current.condition_text, "Clear");
}
