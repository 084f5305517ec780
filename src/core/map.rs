use crate::{
    core::{
        config::MapbridgeConfig,
        geo::{LatLng, LatLngBounds},
        mvc::{MvcObject, PropertyBag},
    },
    prelude::Arc,
    render::RenderMap,
};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

/// Construction and `set_options` configuration. Absent fields leave the
/// render map untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapOptions {
    pub center: Option<LatLng>,
    pub zoom: Option<f64>,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    /// Degrees clockwise from north; the renderer's bearing.
    pub heading: Option<f64>,
    /// Degrees from the nadir; the renderer's pitch.
    pub tilt: Option<f64>,
}

impl MapOptions {
    pub fn centered(center: impl Into<LatLng>, zoom: f64) -> Self {
        Self {
            center: Some(center.into()),
            zoom: Some(zoom),
            ..Default::default()
        }
    }
}

struct MapInner {
    render: Arc<dyn RenderMap>,
    properties: PropertyBag,
    circle_counter: AtomicU64,
    directions_counter: AtomicU64,
    config: MapbridgeConfig,
}

/// The map adapter. Clones are handles onto the same underlying map.
#[derive(Clone)]
pub struct MigrationMap {
    inner: Arc<MapInner>,
}

impl MigrationMap {
    pub fn new(render: Arc<dyn RenderMap>, options: MapOptions) -> Self {
        Self::with_config(render, options, MapbridgeConfig::default())
    }

    pub fn with_config(render: Arc<dyn RenderMap>, options: MapOptions, config: MapbridgeConfig) -> Self {
        let map = Self {
            inner: Arc::new(MapInner {
                render,
                properties: PropertyBag::new(),
                circle_counter: AtomicU64::new(0),
                directions_counter: AtomicU64::new(0),
                config,
            }),
        };
        map.set_options(&options);
        map
    }

    /// The underlying render-library map.
    pub fn render(&self) -> &Arc<dyn RenderMap> {
        &self.inner.render
    }

    pub fn config(&self) -> &MapbridgeConfig {
        &self.inner.config
    }

    /// Next id in this map's circle sequence: 0, 1, 2, ...
    pub fn next_circle_id(&self) -> u64 {
        self.inner.circle_counter.fetch_add(1, Ordering::SeqCst)
    }

    pub fn next_directions_id(&self) -> u64 {
        self.inner.directions_counter.fetch_add(1, Ordering::SeqCst)
    }

    /// True when both handles drive the same underlying map.
    pub fn same_map(&self, other: &MigrationMap) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn set_options(&self, options: &MapOptions) {
        let render = self.render();
        if let Some(min_zoom) = options.min_zoom {
            render.set_min_zoom(Some(min_zoom));
        }
        if let Some(max_zoom) = options.max_zoom {
            render.set_max_zoom(Some(max_zoom));
        }
        if let Some(center) = options.center {
            render.set_center(center.to_lng_lat());
        }
        if let Some(zoom) = options.zoom {
            render.set_zoom(zoom);
        }
        if let Some(heading) = options.heading {
            render.set_bearing(heading);
        }
        if let Some(tilt) = options.tilt {
            render.set_pitch(tilt);
        }
    }

    pub fn get_center(&self) -> LatLng {
        LatLng::from_lng_lat(self.render().get_center())
    }

    pub fn set_center(&self, center: impl Into<LatLng>) {
        self.render().set_center(center.into().to_lng_lat());
    }

    /// Animated recentre.
    pub fn pan_to(&self, center: impl Into<LatLng>) {
        self.render().pan_to(center.into().to_lng_lat());
    }

    /// Pans by a pixel offset.
    pub fn pan_by(&self, x: f64, y: f64) {
        self.render().pan_by([x, y]);
    }

    pub fn get_zoom(&self) -> f64 {
        self.render().get_zoom()
    }

    pub fn set_zoom(&self, zoom: f64) {
        self.render().set_zoom(zoom);
    }

    pub fn get_heading(&self) -> f64 {
        self.render().get_bearing()
    }

    pub fn set_heading(&self, heading: f64) {
        self.render().set_bearing(heading);
    }

    pub fn get_tilt(&self) -> f64 {
        self.render().get_pitch()
    }

    pub fn set_tilt(&self, tilt: f64) {
        self.render().set_pitch(tilt);
    }

    /// Visible area; `None` if the renderer reports an inverted box.
    pub fn get_bounds(&self) -> Option<LatLngBounds> {
        match LatLngBounds::from_bbox(self.render().get_bounds()) {
            Ok(bounds) => Some(bounds),
            Err(e) => {
                log::debug!("Discarding render map bounds: {}", e);
                None
            }
        }
    }

    /// Fits the viewport to `bounds`. Empty bounds leave the view unchanged.
    pub fn fit_bounds(&self, bounds: &LatLngBounds, padding: Option<f64>) {
        if let Some(bbox) = bounds.to_bbox() {
            self.render().fit_bounds(bbox, padding.unwrap_or(0.0));
        }
    }
}

impl MvcObject for MigrationMap {
    fn property_bag(&self) -> &PropertyBag {
        &self.inner.properties
    }

    /// View keys are forwarded to the render map as well as stored.
    fn set(&self, key: &str, value: Value) {
        match key {
            "center" => match LatLng::from_value(&value, false) {
                Ok(center) => self.set_center(center),
                Err(e) => log::error!("Ignoring map center: {}", e),
            },
            "zoom" => {
                if let Some(zoom) = value.as_f64() {
                    self.set_zoom(zoom);
                }
            }
            "heading" => {
                if let Some(heading) = value.as_f64() {
                    self.set_heading(heading);
                }
            }
            "tilt" => {
                if let Some(tilt) = value.as_f64() {
                    self.set_tilt(tilt);
                }
            }
            _ => {}
        }
        self.property_bag().set(key, value);
    }
}

impl std::fmt::Debug for MigrationMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationMap")
            .field("circles", &self.inner.circle_counter.load(Ordering::SeqCst))
            .finish()
    }
}
