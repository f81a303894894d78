//! End-to-end selection, popup and camera behaviour, driven through a
//! recording `MapSurface`.

use outlet_map::api::ChatResponse;
use outlet_map::chat::ChatSession;
use outlet_map::domain::{Outlet, OutletId};
use outlet_map::geo::{haversine_km, is_within_radius, km_to_lat_degrees, GeoPoint};
use outlet_map::selection::{MarkerClick, MarkerIcon, SelectionController};
use outlet_map::store::OutletStore;
use outlet_map::viewport::{
    CameraCommand, ViewportController, CAMERA_ANIMATION, FIT_PADDING_PX, SEARCH_ZOOM,
};

fn outlet(id: OutletId, lat: f64, lon: f64) -> Outlet {
    Outlet {
        id,
        name: format!("Outlet {id}"),
        address: format!("Address {id}"),
        latitude: Some(lat),
        longitude: Some(lon),
        operating_hours: "8am - 10pm".to_string(),
        google_maps_link: None,
        waze_link: None,
    }
}

struct Session {
    store: OutletStore,
    chat: ChatSession,
    selection: SelectionController,
    viewport: ViewportController,
    surface: Vec<CameraCommand>,
}

impl Session {
    fn new(outlets: Vec<Outlet>) -> Self {
        Self {
            store: OutletStore::from_outlets(outlets),
            chat: ChatSession::new(),
            selection: SelectionController::new(),
            viewport: ViewportController::new(),
            surface: Vec::new(),
        }
    }

    fn two_outlets() -> Self {
        Self::new(vec![outlet(1, 3.0, 101.0), outlet(2, 3.01, 101.01)])
    }

    fn sync(&mut self) {
        self.viewport
            .sync(&mut self.selection, &self.store, &mut self.surface);
    }

    fn chat_answer(&mut self, ids: &[OutletId]) {
        let ticket = self.chat.begin_send("where?").expect("query is not blank");
        self.chat.complete(
            ticket,
            Ok(ChatResponse {
                answer: "Here you go.".to_string(),
                related_ids: ids.to_vec(),
                center: None,
            }),
            &mut self.selection,
        );
        self.sync();
    }

    fn click(&mut self, id: OutletId) -> MarkerClick {
        let click = self.selection.click_marker(id);
        self.sync();
        click
    }

    fn outlet(&self, id: OutletId) -> &Outlet {
        self.store.get(id).expect("outlet exists")
    }
}

#[test]
fn single_chat_result_centers_and_opens_popup() {
    let mut session = Session::two_outlets();
    session.chat_answer(&[1]);

    assert_eq!(session.selection.selected().as_slice(), &[1]);
    assert_eq!(
        session.surface,
        vec![CameraCommand::SetView {
            center: GeoPoint::new(3.0, 101.0),
            zoom: SEARCH_ZOOM,
            animation: CAMERA_ANIMATION,
        }]
    );
    assert_eq!(session.selection.open_popups().as_slice(), &[1]);
}

#[test]
fn multiple_chat_results_fit_bounds_and_open_all_popups() {
    let mut session = Session::two_outlets();
    session.chat_answer(&[1, 2]);

    let [CameraCommand::FitBounds {
        bounds,
        padding_px,
        animation,
    }] = session.surface.as_slice()
    else {
        panic!("expected a single fit_bounds, got {:?}", session.surface);
    };
    assert!(bounds.contains(GeoPoint::new(3.0, 101.0)));
    assert!(bounds.contains(GeoPoint::new(3.01, 101.01)));
    assert!((padding_px - FIT_PADDING_PX).abs() < f64::EPSILON);
    assert_eq!(*animation, CAMERA_ANIMATION);

    assert!(session.selection.open_popups().contains(1));
    assert!(session.selection.open_popups().contains(2));
}

#[test]
fn empty_chat_result_clears_selection_and_popups() {
    let mut session = Session::two_outlets();
    session.chat_answer(&[1, 2]);
    session.chat_answer(&[]);

    assert!(session.selection.selected().is_empty());
    assert!(session.selection.open_popups().is_empty());
    assert_eq!(session.surface.len(), 1);
}

#[test]
fn manual_click_selects_without_moving_camera() {
    let mut session = Session::two_outlets();

    assert_eq!(session.click(2), MarkerClick::Opened);
    assert_eq!(session.selection.selected().as_slice(), &[2]);
    assert_eq!(session.selection.open_popups().as_slice(), &[2]);
    assert!(session.surface.is_empty());

    assert_eq!(session.click(2), MarkerClick::Closed);
    assert!(session.selection.selected().is_empty());
    assert!(session.selection.open_popups().is_empty());
}

#[test]
fn answer_overlapping_an_open_popup_leaves_camera_alone() {
    let mut session = Session::two_outlets();
    session.click(1);
    assert!(session.surface.is_empty());

    session.chat_answer(&[1, 2]);

    assert_eq!(session.selection.selected().as_slice(), &[1, 2]);
    assert!(session.surface.is_empty(), "camera moved: {:?}", session.surface);
    assert_eq!(session.selection.open_popups().as_slice(), &[1]);
}

#[test]
fn answer_disjoint_from_open_popups_still_moves_camera() {
    let mut session = Session::new(vec![
        outlet(1, 3.0, 101.0),
        outlet(2, 3.01, 101.01),
        outlet(3, 3.5, 101.5),
    ]);
    session.click(3);
    assert!(session.surface.is_empty());

    session.chat_answer(&[1, 2]);

    assert!(matches!(
        session.surface.as_slice(),
        [CameraCommand::FitBounds { .. }]
    ));
    assert!(session.selection.open_popups().contains(1));
    assert!(session.selection.open_popups().contains(2));
}

#[test]
fn radius_highlights_neighbours_but_circles_only_references() {
    let neighbour_lat = 3.0 + km_to_lat_degrees(4.9);
    let mut session = Session::new(vec![
        outlet(1, 3.0, 101.0),
        outlet(2, 3.5, 101.5),
        outlet(3, neighbour_lat, 101.0),
    ]);
    session.selection.toggle_radius();
    session.chat_answer(&[1]);

    let distance = haversine_km(GeoPoint::new(3.0, 101.0), GeoPoint::new(neighbour_lat, 101.0));
    assert!(distance <= 5.0, "neighbour should sit inside 5km, got {distance}");

    let first = session.selection.marker_style(session.outlet(1), &session.store);
    let far = session.selection.marker_style(session.outlet(2), &session.store);
    let neighbour = session.selection.marker_style(session.outlet(3), &session.store);

    assert_eq!(first.icon, MarkerIcon::Highlighted);
    assert!(first.circle);
    assert_eq!(neighbour.icon, MarkerIcon::Highlighted);
    assert!(!neighbour.circle);
    assert_eq!(far.icon, MarkerIcon::Default);
    assert!(!far.circle);
}

#[test]
fn clear_all_leaves_nothing_highlighted() {
    let mut session = Session::new(vec![
        outlet(1, 3.0, 101.0),
        outlet(2, 3.01, 101.01),
        outlet(3, 3.02, 101.0),
    ]);
    session.selection.toggle_radius();
    session.chat_answer(&[1, 2]);
    session.click(3);

    session.selection.clear_all();
    session.sync();

    assert!(session.selection.open_popups().is_empty());
    for outlet in session.store.iter() {
        let style = session.selection.marker_style(outlet, &session.store);
        assert_eq!(style.icon, MarkerIcon::Default, "outlet {}", outlet.id);
        assert!(!style.circle, "outlet {}", outlet.id);
    }
}

#[test]
fn repeated_identical_answers_move_the_camera_once() {
    let mut session = Session::two_outlets();
    session.chat_answer(&[1]);
    session.chat_answer(&[1]);
    assert_eq!(session.surface.len(), 1);

    session.chat_answer(&[2]);
    assert_eq!(session.surface.len(), 2);
}

#[test]
fn answer_before_outlets_load_applies_once_they_arrive() {
    let mut session = Session::new(Vec::new());
    session.store = OutletStore::new();
    session.chat_answer(&[2]);
    assert!(session.surface.is_empty());

    session.store = OutletStore::from_outlets(vec![outlet(1, 3.0, 101.0), outlet(2, 3.01, 101.01)]);
    session.sync();
    assert_eq!(session.surface.len(), 1);
    assert_eq!(session.selection.open_popups().as_slice(), &[2]);
}

#[test]
fn reset_clears_everything_the_chat_selected() {
    let mut session = Session::two_outlets();
    session.chat_answer(&[1, 2]);

    session.chat.reset(&mut session.selection);
    session.sync();

    assert_eq!(session.chat.messages().len(), 1);
    assert!(session.selection.selected().is_empty());
    assert!(session.selection.open_popups().is_empty());
}

#[test]
fn self_is_never_within_radius_and_distance_is_symmetric() {
    let store = OutletStore::from_outlets(vec![outlet(1, 3.0, 101.0), outlet(2, 3.02, 101.01)]);
    let first = store.get(1).expect("outlet 1");
    let second = store.get(2).expect("outlet 2");

    assert!(!is_within_radius(&store, first, 1));
    assert!(is_within_radius(&store, first, 2));
    assert!(is_within_radius(&store, second, 1));

    let a = GeoPoint::new(3.0, 101.0);
    let b = GeoPoint::new(3.02, 101.01);
    assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-12);
}
