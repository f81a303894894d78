use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::layout::Rect;
use std::time::{Duration, Instant};

use outlet_map::api::OutletApi;
use outlet_map::chat::ChatSession;
use outlet_map::config::AppConfig;
use outlet_map::domain::Outlet;
use outlet_map::geo::GeoPoint;
use outlet_map::location::Geolocator;
use outlet_map::selection::SelectionController;
use outlet_map::store::OutletStore;
use outlet_map::viewport::{CameraCommand, ViewportController};

use crate::app::{handle_input, App};
use crate::terminal::Tui;
use crate::ui;

const HEADLESS_PREVIEW: usize = 5;

/// Run the application in headless mode (no UI)
pub async fn run_headless(config: &AppConfig, query: Option<&str>, json: bool) -> Result<()> {
    let api = OutletApi::from_config(config)?;
    let report = build_headless_report(&api, &config.geolocator, query).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render_headless_report(&report);
    }

    Ok(())
}

fn render_headless_report(report: &HeadlessReport) {
    println!("\nOutlet Map");
    println!("==========");
    println!("Backend: {}", report.api_url);
    println!("Outlets: {}", report.outlet_count);
    println!("On the map: {}", report.placeable_count);

    if !report.outlets.is_empty() {
        println!("\nFirst outlets:");
        for outlet in &report.outlets {
            print_outlet(outlet);
        }
    }

    let Some(query) = &report.query else {
        return;
    };

    println!("\nQuery: {}", query.query);
    if let Some(location) = query.location {
        println!("Location: {location}");
    }
    println!("Answer: {}", query.answer);

    if !query.matched.is_empty() {
        println!("\nMatched outlets:");
        for outlet in &query.matched {
            print_outlet(outlet);
        }
    }

    for command in &query.camera {
        println!("Camera: {command}");
    }
}

fn print_outlet(outlet: &HeadlessOutlet) {
    println!(
        "- #{} | {} | {} | {}",
        outlet.id, outlet.name, outlet.address, outlet.operating_hours
    );
}

async fn build_headless_report(
    api: &OutletApi,
    geolocator: &Geolocator,
    query: Option<&str>,
) -> HeadlessReport {
    let outlets = match api.fetch_outlets().await {
        Ok(outlets) => outlets,
        Err(error) => {
            tracing::error!(%error, "failed to load outlets");
            Vec::new()
        }
    };
    let store = OutletStore::from_outlets(outlets);

    let query = match query {
        Some(text) => Some(run_headless_query(api, geolocator, &store, text).await),
        None => None,
    };

    HeadlessReport {
        api_url: api.base_url().to_string(),
        outlet_count: store.len(),
        placeable_count: store.placeable_count(),
        outlets: store
            .iter()
            .take(HEADLESS_PREVIEW)
            .map(HeadlessOutlet::from)
            .collect(),
        query,
    }
}

async fn run_headless_query(
    api: &OutletApi,
    geolocator: &Geolocator,
    store: &OutletStore,
    text: &str,
) -> HeadlessQuery {
    let mut chat = ChatSession::new();
    let mut selection = SelectionController::new();
    let mut viewport = ViewportController::new();
    let mut camera: Vec<CameraCommand> = Vec::new();

    if geolocator.is_supported() {
        chat.begin_locate();
        chat.complete_locate(geolocator.locate().await, Instant::now());
    }

    chat.send(text, api, &mut selection).await;
    viewport.sync(&mut selection, store, &mut camera);

    HeadlessQuery {
        query: text.trim().to_string(),
        location: chat.user_location(),
        answer: chat
            .messages()
            .last()
            .map(|message| message.content.clone())
            .unwrap_or_default(),
        matched: store
            .resolve(selection.selected().as_slice())
            .into_iter()
            .map(HeadlessOutlet::from)
            .collect(),
        camera: camera.iter().map(ToString::to_string).collect(),
    }
}

#[derive(Debug, serde::Serialize)]
struct HeadlessReport {
    api_url: String,
    outlet_count: usize,
    placeable_count: usize,
    outlets: Vec<HeadlessOutlet>,
    query: Option<HeadlessQuery>,
}

#[derive(Debug, serde::Serialize)]
struct HeadlessQuery {
    query: String,
    location: Option<GeoPoint>,
    answer: String,
    matched: Vec<HeadlessOutlet>,
    camera: Vec<String>,
}

#[derive(Debug, serde::Serialize)]
struct HeadlessOutlet {
    id: i64,
    name: String,
    address: String,
    operating_hours: String,
    position: Option<GeoPoint>,
}

impl From<&Outlet> for HeadlessOutlet {
    fn from(outlet: &Outlet) -> Self {
        Self {
            id: outlet.id,
            name: outlet.display_name().to_string(),
            address: outlet.address.clone(),
            operating_hours: outlet.operating_hours.clone(),
            position: outlet.position(),
        }
    }
}

/// Run the main application event loop
pub async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    // Configure event poll timeout (ms)
    const EVENT_POLL_TIMEOUT: u64 = 50;

    app.start();

    loop {
        app.drain_events();
        app.update();

        if let Ok(size) = terminal.size() {
            let canvas = ui::map_canvas_area(app, Rect::new(0, 0, size.width, size.height));
            app.camera.resize(canvas.width, canvas.height);
        }

        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(color_eyre::eyre::eyre!("Terminal draw error: {e}"));
        }

        if matches!(
            event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT)),
            Ok(true)
        ) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    handle_input(app, key.code);
                    if !app.running {
                        break;
                    }
                }
                Ok(_) | Err(_) => {
                    // Resizes are picked up on the next frame
                }
            }
        }

        // Let spawned requests make progress between frames
        tokio::task::yield_now().await;
    }

    tracing::info!("outlet map closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn backend() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/outlets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "outlets": [
                    { "id": 1, "name": "Subway KLCC", "address": "Suria KLCC", "latitude": 3.158, "longitude": 101.712, "operating_hours": "8am-10pm" },
                    { "id": 2, "name": "Subway Bangsar", "address": "Bangsar Village", "latitude": 3.131, "longitude": 101.671, "operating_hours": "9am-9pm" },
                    { "id": 3, "name": "Subway Online", "address": "", "latitude": null, "longitude": null, "operating_hours": "" }
                ]
            })))
            .mount(&server)
            .await;
        server
    }

    fn api(server: &MockServer) -> OutletApi {
        match OutletApi::new(&server.uri(), Duration::from_secs(2)) {
            Ok(api) => api,
            Err(error) => panic!("client should build: {error}"),
        }
    }

    #[tokio::test]
    async fn headless_report_summarises_outlets() {
        let server = backend().await;
        let report = build_headless_report(&api(&server), &Geolocator::Unsupported, None).await;

        assert_eq!(report.outlet_count, 3);
        assert_eq!(report.placeable_count, 2);
        assert_eq!(report.outlets.len(), 3);
        assert!(report.query.is_none());
    }

    #[tokio::test]
    async fn headless_query_reports_matches_and_camera() {
        let server = backend().await;
        Mock::given(method("POST"))
            .and(path("/chatbot/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "answer": "Two outlets nearby.",
                "related_ids": [1, 2]
            })))
            .mount(&server)
            .await;

        let geolocator = Geolocator::Fixed(GeoPoint::new(3.14, 101.69));
        let report =
            build_headless_report(&api(&server), &geolocator, Some("outlets near me")).await;

        let Some(query) = report.query else {
            panic!("expected a query section");
        };
        assert_eq!(query.answer, "Two outlets nearby.");
        assert_eq!(query.location, Some(GeoPoint::new(3.14, 101.69)));
        assert_eq!(
            query.matched.iter().map(|o| o.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(query.camera.len(), 1);
        assert!(query.camera[0].starts_with("fit "));
    }

    #[tokio::test]
    async fn headless_survives_a_dead_backend() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/outlets"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let report = build_headless_report(&api(&server), &Geolocator::Unsupported, Some("hi")).await;
        assert_eq!(report.outlet_count, 0);
        let Some(query) = report.query else {
            panic!("expected a query section");
        };
        assert_eq!(query.answer, outlet_map::chat::FALLBACK_ANSWER);
        assert!(query.matched.is_empty());
    }
}
