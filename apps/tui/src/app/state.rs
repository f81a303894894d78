use std::time::{Duration, Instant};

use color_eyre::Result;
use throbber_widgets_tui::ThrobberState;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use outlet_map::chat::{ChatSession, Completion};
use outlet_map::config::AppConfig;
use outlet_map::domain::Outlet;
use outlet_map::selection::{MarkerClick, SelectionController};
use outlet_map::store::OutletStore;
use outlet_map::viewport::{ViewportController, CAMERA_ANIMATION};

use crate::app::actions::{AppActions, AppEvent};
use crate::app::camera::MapCamera;
use crate::app::input::helpers::{wrap_decrement, wrap_increment};

/// How long transient status messages stay visible.
const STATUS_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Map,
    Chat,
}

#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub focus: Focus,
    pub store: OutletStore,
    pub selection: SelectionController,
    pub viewport: ViewportController,
    pub chat: ChatSession,
    pub camera: MapCamera,
    pub chat_input: String,
    pub marker_cursor: usize,
    pub show_help: bool,
    pub show_chat: bool,
    pub loading_outlets: bool,
    pub status_message: String,
    status_set_at: Option<Instant>,
    pub animation_counter: f64,
    pub last_frame: Instant,
    pub throbber: ThrobberState,
    actions: AppActions,
    events: UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let (sender, events) = mpsc::unbounded_channel();

        Ok(Self {
            running: true,
            focus: Focus::Map,
            store: OutletStore::new(),
            selection: SelectionController::new(),
            viewport: ViewportController::new(),
            chat: ChatSession::new(),
            camera: MapCamera::default(),
            chat_input: String::new(),
            marker_cursor: 0,
            show_help: false,
            show_chat: true,
            loading_outlets: false,
            status_message: String::new(),
            status_set_at: None,
            animation_counter: 0.0,
            last_frame: Instant::now(),
            throbber: ThrobberState::default(),
            actions: AppActions::new(config, sender)?,
            events,
        })
    }

    pub fn api_url(&self) -> &str {
        self.actions.api_url()
    }

    /// Kicks off the outlet fetch.
    pub fn start(&mut self) {
        self.loading_outlets = true;
        self.actions.load_outlets();
    }

    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame).as_secs_f64();
        self.last_frame = now;
        self.animation_counter += delta;

        if self.loading_outlets || self.chat.is_waiting() || self.chat.is_locating() {
            self.throbber.calc_next();
        }

        self.chat.tick(now);
        self.camera.tick(now);

        if self
            .status_set_at
            .is_some_and(|set_at| now.duration_since(set_at) >= STATUS_TTL)
        {
            self.status_message.clear();
            self.status_set_at = None;
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.status_set_at = Some(Instant::now());
    }

    /// Applies every background result that has arrived since the last frame.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::OutletsLoaded(result) => {
                self.loading_outlets = false;
                let outlets = match result {
                    Ok(outlets) => outlets,
                    Err(error) => {
                        tracing::error!(%error, "failed to load outlets");
                        self.set_status(format!("Error: could not load outlets ({error})"));
                        Vec::new()
                    }
                };
                self.store = OutletStore::from_outlets(outlets);
                self.marker_cursor = 0;
                if self.store.is_empty() {
                    tracing::info!("no outlets to show");
                } else {
                    self.set_status(format!(
                        "Loaded {} outlets ({} on the map)",
                        self.store.len(),
                        self.store.placeable_count()
                    ));
                }
                self.sync_viewport();
            }
            AppEvent::ChatAnswered { ticket, result } => {
                let completion = self.chat.complete(ticket, result, &mut self.selection);
                if completion != Completion::Discarded {
                    self.sync_viewport();
                }
            }
            AppEvent::LocationResolved(result) => {
                self.chat.complete_locate(result, Instant::now());
            }
        }
    }

    /// Runs the viewport controller against the live camera.
    pub fn sync_viewport(&mut self) {
        let outcome = self
            .viewport
            .sync(&mut self.selection, &self.store, &mut self.camera);
        if !outcome.is_noop() {
            tracing::debug!(?outcome, "viewport synced");
        }
    }

    pub fn cursor_outlet(&self) -> Option<&Outlet> {
        self.store
            .placeable()
            .nth(self.marker_cursor)
            .map(|(outlet, _)| outlet)
    }

    pub fn move_cursor(&mut self, forward: bool) {
        let count = self.store.placeable_count();
        self.marker_cursor = if forward {
            wrap_increment(self.marker_cursor, count)
        } else {
            wrap_decrement(self.marker_cursor, count)
        };

        if let Some(point) = self.cursor_outlet().and_then(Outlet::position) {
            self.camera.ensure_visible(point, CAMERA_ANIMATION);
        }
    }

    pub fn click_cursor(&mut self) {
        let Some((id, name)) = self
            .cursor_outlet()
            .map(|outlet| (outlet.id, outlet.display_name().to_string()))
        else {
            return;
        };

        match self.selection.click_marker(id) {
            MarkerClick::Opened => self.set_status(format!("Opened {name}")),
            MarkerClick::Closed => self.set_status(format!("Closed {name}")),
        }
        self.sync_viewport();
    }

    pub fn close_cursor_popup(&mut self) {
        let Some(id) = self.cursor_outlet().map(|outlet| outlet.id) else {
            return;
        };
        if self.selection.close_popup(id) {
            self.sync_viewport();
        }
    }

    pub fn toggle_radius(&mut self) {
        let on = self.selection.toggle_radius();
        self.set_status(if on {
            "5km radius shown"
        } else {
            "5km radius hidden"
        });
    }

    pub fn clear_all(&mut self) {
        self.selection.clear_all();
        self.sync_viewport();
        self.set_status("Selection cleared");
    }

    pub fn toggle_chat_panel(&mut self) {
        self.show_chat = !self.show_chat;
        if !self.show_chat {
            self.focus = Focus::Map;
        }
    }

    pub fn reset_chat(&mut self) {
        self.chat.reset(&mut self.selection);
        self.chat_input.clear();
        self.sync_viewport();
        self.set_status("Chat reset");
    }

    pub fn request_location(&mut self) {
        if self.chat.is_locating() {
            return;
        }
        self.chat.begin_locate();
        self.actions.locate();
    }

    pub fn submit_chat(&mut self) {
        let text = std::mem::take(&mut self.chat_input);
        if let Some(ticket) = self.chat.begin_send(&text) {
            tracing::debug!(sequence = ticket.sequence, "sending chat query");
            self.actions.send_query(ticket);
        }
    }

    pub fn focus_chat(&mut self) {
        self.show_chat = true;
        self.focus = Focus::Chat;
    }

    pub fn quit(&mut self) {
        self.running = false;
    }
}
