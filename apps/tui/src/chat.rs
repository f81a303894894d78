//! Chat log, user location and the glue from answers to the selection.

use std::time::{Duration, Instant};

use crate::api::{ChatQuery, ChatResponse, OutletApi};
use crate::domain::ChatMessage;
use crate::error::{ApiError, LocationError};
use crate::geo::GeoPoint;
use crate::selection::SelectionController;

pub const GREETING: &str = "Hello! Ask me about Subway outlets nearby or specific locations.";
pub const FALLBACK_ANSWER: &str = "Sorry, I couldn't process your request. Please try again.";

pub const STATUS_LOCATING: &str = "Getting your location...";
pub const STATUS_LOCATED: &str = "Location found! You can now ask about nearby outlets.";
pub const STATUS_LOCATE_FAILED: &str =
    "Could not get your location. Please try again or search by area name.";
pub const STATUS_LOCATE_UNSUPPORTED: &str = "Geolocation is not supported on this system.";

/// How long a location result stays on screen.
pub const LOCATION_STATUS_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationStatus {
    pub message: &'static str,
    pub kind: StatusKind,
    expires_at: Option<Instant>,
}

impl LocationStatus {
    const fn pending() -> Self {
        Self {
            message: STATUS_LOCATING,
            kind: StatusKind::Info,
            expires_at: None,
        }
    }

    fn transient(message: &'static str, kind: StatusKind, now: Instant) -> Self {
        Self {
            message,
            kind,
            expires_at: Some(now + LOCATION_STATUS_TTL),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// An outbound query. Hand it back to [`ChatSession::complete`] with the result.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingQuery {
    epoch: u64,
    pub sequence: u64,
    pub request: ChatQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Answered,
    Failed,
    /// The chat was reset while the query was in flight.
    Discarded,
}

#[derive(Debug)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    user_location: Option<GeoPoint>,
    location_status: Option<LocationStatus>,
    locating: bool,
    epoch: u64,
    next_sequence: u64,
    in_flight: usize,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(GREETING)],
            user_location: None,
            location_status: None,
            locating: false,
            epoch: 0,
            next_sequence: 0,
            in_flight: 0,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub const fn user_location(&self) -> Option<GeoPoint> {
        self.user_location
    }

    pub const fn location_status(&self) -> Option<&LocationStatus> {
        self.location_status.as_ref()
    }

    pub const fn is_locating(&self) -> bool {
        self.locating
    }

    pub const fn is_waiting(&self) -> bool {
        self.in_flight > 0
    }

    /// Logs the user message and builds the outbound query.
    ///
    /// Blank input is ignored. A second query while one is pending is
    /// allowed; whichever answer resolves last wins.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingQuery> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.messages.push(ChatMessage::user(text));
        self.in_flight += 1;
        self.next_sequence += 1;

        Some(PendingQuery {
            epoch: self.epoch,
            sequence: self.next_sequence,
            request: ChatQuery::new(text, self.user_location),
        })
    }

    /// Applies a query result. Answers forward their ids to the selection;
    /// failures log the fallback message and leave the selection alone.
    pub fn complete(
        &mut self,
        ticket: PendingQuery,
        result: Result<ChatResponse, ApiError>,
        selection: &mut SelectionController,
    ) -> Completion {
        if ticket.epoch != self.epoch {
            tracing::debug!(sequence = ticket.sequence, "discarding answer issued before reset");
            return Completion::Discarded;
        }

        self.in_flight = self.in_flight.saturating_sub(1);

        match result {
            Ok(response) => {
                self.messages.push(ChatMessage::assistant(response.answer));
                selection.apply_chat_result(&response.related_ids);
                Completion::Answered
            }
            Err(error) => {
                tracing::warn!(%error, sequence = ticket.sequence, "chat query failed");
                self.messages.push(ChatMessage::assistant(FALLBACK_ANSWER));
                Completion::Failed
            }
        }
    }

    /// Sends `text` and waits for the answer in place.
    pub async fn send(
        &mut self,
        text: &str,
        api: &OutletApi,
        selection: &mut SelectionController,
    ) -> Option<Completion> {
        let ticket = self.begin_send(text)?;
        let result = api.query_chatbot(&ticket.request).await;
        Some(self.complete(ticket, result, selection))
    }

    /// Back to the greeting. Location is forgotten and the map selection is
    /// cleared with the log.
    pub fn reset(&mut self, selection: &mut SelectionController) {
        self.messages = vec![ChatMessage::assistant(GREETING)];
        self.user_location = None;
        self.epoch += 1;
        self.in_flight = 0;
        selection.apply_chat_result(&[]);
    }

    pub fn begin_locate(&mut self) {
        self.locating = true;
        self.location_status = Some(LocationStatus::pending());
    }

    pub fn complete_locate(&mut self, result: Result<GeoPoint, LocationError>, now: Instant) {
        self.locating = false;
        self.location_status = Some(match result {
            Ok(point) => {
                tracing::info!(%point, "user location set");
                self.user_location = Some(point);
                LocationStatus::transient(STATUS_LOCATED, StatusKind::Success, now)
            }
            Err(LocationError::Unsupported) => {
                LocationStatus::transient(STATUS_LOCATE_UNSUPPORTED, StatusKind::Error, now)
            }
            Err(error) => {
                tracing::warn!(%error, "location lookup failed");
                LocationStatus::transient(STATUS_LOCATE_FAILED, StatusKind::Error, now)
            }
        });
    }

    /// Drops an expired location status. Returns whether anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self
            .location_status
            .as_ref()
            .is_some_and(|status| status.is_expired(now))
        {
            self.location_status = None;
            return true;
        }
        false
    }
}
