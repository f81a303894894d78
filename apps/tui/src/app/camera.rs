use std::time::{Duration, Instant};

use outlet_map::geo::{BoundingBox, GeoPoint};
use outlet_map::viewport::{MapSurface, DEFAULT_CENTER, DEFAULT_ZOOM};

/// Pixels one terminal cell stands for when sizing zoom levels.
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;
const TILE_SIZE_PX: f64 = 256.0;

pub const MIN_ZOOM: f64 = 3.0;
pub const MAX_ZOOM: f64 = 18.0;

/// Fraction of the visible span one pan step moves.
const PAN_STEP: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Flight {
    from_center: GeoPoint,
    from_zoom: f64,
    to_center: GeoPoint,
    to_zoom: f64,
    started: Instant,
    duration: Duration,
    /// Bounds and padding a `fit_bounds` flight was sized for.
    fit: Option<(BoundingBox, f64)>,
}

impl Flight {
    fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started).as_secs_f64();
        (elapsed / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }
}

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    (to - from).mul_add(t, from)
}

/// The map camera behind the canvas.
///
/// `set_view` and `fit_bounds` start an eased flight that `tick` advances;
/// manual pans and zooms jump and cancel any flight in progress.
#[derive(Debug, Clone)]
pub struct MapCamera {
    center: GeoPoint,
    zoom: f64,
    cols: u16,
    rows: u16,
    flight: Option<Flight>,
}

impl Default for MapCamera {
    fn default() -> Self {
        Self::new(DEFAULT_CENTER, DEFAULT_ZOOM)
    }
}

impl MapCamera {
    pub const fn new(center: GeoPoint, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            cols: 80,
            rows: 24,
            flight: None,
        }
    }

    pub const fn center(&self) -> GeoPoint {
        self.center
    }

    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    pub const fn is_animating(&self) -> bool {
        self.flight.is_some()
    }

    /// Where the camera ends up once any flight finishes.
    pub fn target(&self) -> (GeoPoint, f64) {
        self.flight
            .map_or((self.center, self.zoom), |flight| (flight.to_center, flight.to_zoom))
    }

    /// Canvas size in cells. Zero-sized areas are ignored.
    ///
    /// A `fit_bounds` flight still in progress is re-sized to the new canvas,
    /// so popups opened in the same sync cannot push the fitted area off screen.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        if cols == 0 || rows == 0 || (cols, rows) == (self.cols, self.rows) {
            return;
        }
        self.cols = cols;
        self.rows = rows;

        if let Some((bounds, padding_px)) = self.flight.and_then(|flight| flight.fit) {
            let zoom = self.zoom_to_fit(&bounds, padding_px);
            if let Some(flight) = self.flight.as_mut() {
                flight.to_zoom = zoom;
            }
        }
    }

    fn size_px(&self) -> (f64, f64) {
        (
            f64::from(self.cols) * CELL_WIDTH_PX,
            f64::from(self.rows) * CELL_HEIGHT_PX,
        )
    }

    fn lon_degrees_per_px(zoom: f64) -> f64 {
        360.0 / (TILE_SIZE_PX * zoom.exp2())
    }

    fn lat_degrees_per_px(zoom: f64, lat: f64) -> f64 {
        Self::lon_degrees_per_px(zoom) * lat.to_radians().cos().abs().max(0.01)
    }

    /// Area currently on screen.
    pub fn visible_bounds(&self) -> BoundingBox {
        let (width_px, height_px) = self.size_px();
        let half_lon = width_px / 2.0 * Self::lon_degrees_per_px(self.zoom);
        let half_lat = height_px / 2.0 * Self::lat_degrees_per_px(self.zoom, self.center.lat);

        BoundingBox {
            south: self.center.lat - half_lat,
            west: self.center.lon - half_lon,
            north: self.center.lat + half_lat,
            east: self.center.lon + half_lon,
        }
    }

    /// Largest whole zoom at which `bounds` fits inside the padded canvas.
    pub fn zoom_to_fit(&self, bounds: &BoundingBox, padding_px: f64) -> f64 {
        let (width_px, height_px) = self.size_px();
        let usable_w = (2.0f64.mul_add(-padding_px, width_px)).max(1.0);
        let usable_h = (2.0f64.mul_add(-padding_px, height_px)).max(1.0);
        let lat = bounds.center().lat;

        let fit_lon = if bounds.lon_span() > 0.0 {
            (usable_w * 360.0 / (TILE_SIZE_PX * bounds.lon_span())).log2()
        } else {
            MAX_ZOOM
        };
        let lat_scale = lat.to_radians().cos().abs().max(0.01);
        let fit_lat = if bounds.lat_span() > 0.0 {
            (usable_h * 360.0 * lat_scale / (TILE_SIZE_PX * bounds.lat_span())).log2()
        } else {
            MAX_ZOOM
        };

        fit_lon.min(fit_lat).floor().clamp(MIN_ZOOM, MAX_ZOOM)
    }

    fn fly_to(
        &mut self,
        center: GeoPoint,
        zoom: f64,
        animation: Duration,
        fit: Option<(BoundingBox, f64)>,
    ) {
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if animation.is_zero() {
            self.center = center;
            self.zoom = zoom;
            self.flight = None;
            return;
        }

        self.flight = Some(Flight {
            from_center: self.center,
            from_zoom: self.zoom,
            to_center: center,
            to_zoom: zoom,
            started: Instant::now(),
            duration: animation,
            fit,
        });
    }

    /// Advances a flight. Returns true while the camera is still moving.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(flight) = self.flight else {
            return false;
        };

        let t = flight.progress(now);
        let eased = ease_out_cubic(t);
        self.center = GeoPoint::new(
            lerp(flight.from_center.lat, flight.to_center.lat, eased),
            lerp(flight.from_center.lon, flight.to_center.lon, eased),
        );
        self.zoom = lerp(flight.from_zoom, flight.to_zoom, eased);

        if t >= 1.0 {
            self.center = flight.to_center;
            self.zoom = flight.to_zoom;
            self.flight = None;
            return false;
        }
        true
    }

    /// Pans by whole steps; positive `dx` moves east, positive `dy` north.
    pub fn pan(&mut self, dx: i8, dy: i8) {
        self.flight = None;
        let bounds = self.visible_bounds();
        self.center = GeoPoint::new(
            (f64::from(dy) * bounds.lat_span()).mul_add(PAN_STEP, self.center.lat).clamp(-85.0, 85.0),
            (f64::from(dx) * bounds.lon_span()).mul_add(PAN_STEP, self.center.lon),
        );
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.flight = None;
        self.zoom = (self.zoom + delta).round().clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Glides to `point` at the current zoom if it is off screen.
    pub fn ensure_visible(&mut self, point: GeoPoint, animation: Duration) {
        if self.flight.is_some() || self.visible_bounds().contains(point) {
            return;
        }
        let zoom = self.zoom;
        self.fly_to(point, zoom, animation, None);
    }
}

impl MapSurface for MapCamera {
    fn set_view(&mut self, center: GeoPoint, zoom: f64, animation: Duration) {
        self.fly_to(center, zoom, animation, None);
    }

    fn fit_bounds(&mut self, bounds: BoundingBox, padding_px: f64, animation: Duration) {
        let zoom = self.zoom_to_fit(&bounds, padding_px);
        self.fly_to(bounds.center(), zoom, animation, Some((bounds, padding_px)));
    }
}
