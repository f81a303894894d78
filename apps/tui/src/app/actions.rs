use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;

use outlet_map::api::{ChatResponse, OutletApi};
use outlet_map::chat::PendingQuery;
use outlet_map::config::AppConfig;
use outlet_map::domain::Outlet;
use outlet_map::error::{ApiError, LocationError};
use outlet_map::geo::GeoPoint;
use outlet_map::location::Geolocator;

/// Results coming back from background work.
#[derive(Debug)]
pub enum AppEvent {
    OutletsLoaded(Result<Vec<Outlet>, ApiError>),
    ChatAnswered {
        ticket: PendingQuery,
        result: Result<ChatResponse, ApiError>,
    },
    LocationResolved(Result<GeoPoint, LocationError>),
}

/// Spawns backend and location requests so the draw loop never waits on them.
#[derive(Debug)]
pub struct AppActions {
    api: OutletApi,
    geolocator: Geolocator,
    events: UnboundedSender<AppEvent>,
}

impl AppActions {
    pub fn new(config: &AppConfig, events: UnboundedSender<AppEvent>) -> Result<Self> {
        Ok(Self {
            api: OutletApi::from_config(config)?,
            geolocator: config.geolocator.clone(),
            events,
        })
    }

    pub fn api_url(&self) -> &str {
        self.api.base_url()
    }

    pub fn load_outlets(&self) {
        let api = self.api.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = api.fetch_outlets().await;
            if events.send(AppEvent::OutletsLoaded(result)).is_err() {
                tracing::debug!("app closed before outlets arrived");
            }
        });
    }

    pub fn send_query(&self, ticket: PendingQuery) {
        let api = self.api.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = api.query_chatbot(&ticket.request).await;
            if events.send(AppEvent::ChatAnswered { ticket, result }).is_err() {
                tracing::debug!("app closed before the chat answer arrived");
            }
        });
    }

    pub fn locate(&self) {
        let geolocator = self.geolocator.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = geolocator.locate().await;
            if events.send(AppEvent::LocationResolved(result)).is_err() {
                tracing::debug!("app closed before the location arrived");
            }
        });
    }
}
