use crate::{
    core::{geo::LatLng, map::MigrationMap, mvc::PropertyBag},
    layers::MapAttachment,
    prelude::{Arc, Mutex},
    render::RenderMarker,
};

#[derive(Debug, Clone, Default)]
pub struct MarkerOptions {
    pub position: Option<LatLng>,
    pub map: Option<MigrationMap>,
    pub draggable: Option<bool>,
    pub visible: Option<bool>,
    pub title: Option<String>,
    pub opacity: Option<f64>,
}

struct MarkerState {
    position: Option<LatLng>,
    map: MapAttachment,
    /// Whether the underlying marker is currently on a map. Adding waits
    /// for a position.
    added: bool,
    draggable: bool,
    visible: bool,
    title: Option<String>,
    opacity: f64,
}

impl Default for MarkerState {
    fn default() -> Self {
        Self {
            position: None,
            map: MapAttachment::Unset,
            added: false,
            draggable: false,
            visible: true,
            title: None,
            opacity: 1.0,
        }
    }
}

/// Marker adapter over one underlying render-library marker.
#[derive(Clone)]
pub struct Marker {
    render: Arc<dyn RenderMarker>,
    state: Arc<Mutex<MarkerState>>,
    properties: PropertyBag,
}

crate::impl_mvc_object!(Marker, properties);

impl Marker {
    pub fn new(render: Arc<dyn RenderMarker>, options: MarkerOptions) -> Self {
        let marker = Self {
            render,
            state: Arc::new(Mutex::new(MarkerState::default())),
            properties: PropertyBag::new(),
        };
        marker.set_options(options);
        marker
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut MarkerState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    /// The underlying render-library marker.
    pub fn render_marker(&self) -> &Arc<dyn RenderMarker> {
        &self.render
    }

    pub fn set_options(&self, options: MarkerOptions) {
        if let Some(position) = options.position {
            self.set_position(position);
        }
        if let Some(draggable) = options.draggable {
            self.set_draggable(draggable);
        }
        if let Some(visible) = options.visible {
            self.set_visible(visible);
        }
        if let Some(title) = options.title {
            self.set_title(title);
        }
        if let Some(opacity) = options.opacity {
            self.set_opacity(opacity);
        }
        if let Some(map) = options.map {
            self.set_map(Some(&map));
        }
    }

    pub fn set_map(&self, map: Option<&MigrationMap>) {
        let was_added = self.with_state(|state| {
            state.map = map.into();
            std::mem::replace(&mut state.added, false)
        });
        if was_added {
            self.render.remove();
        }
        self.sync_attachment();
    }

    pub fn get_map(&self) -> MapAttachment {
        self.with_state(|state| state.map.clone())
    }

    /// Adds the underlying marker once it has both a map and a position.
    fn sync_attachment(&self) {
        let target = self.with_state(|state| {
            if state.added || state.position.is_none() {
                return None;
            }
            let render = state.map.map()?.render().clone();
            state.added = true;
            Some(render)
        });
        if let Some(render) = target {
            self.render.add_to(&render);
        }
    }

    pub fn set_position(&self, position: impl Into<LatLng>) {
        let position = position.into();
        self.with_state(|state| state.position = Some(position));
        self.render.set_lng_lat(position.to_lng_lat());
        self.sync_attachment();
    }

    /// Last position set, or where the renderer put the marker (after a drag).
    pub fn get_position(&self) -> Option<LatLng> {
        self.render
            .get_lng_lat()
            .map(LatLng::from_lng_lat)
            .or_else(|| self.with_state(|state| state.position))
    }

    pub fn set_draggable(&self, draggable: bool) {
        self.with_state(|state| state.draggable = draggable);
        self.render.set_draggable(draggable);
    }

    pub fn get_draggable(&self) -> bool {
        self.with_state(|state| state.draggable)
    }

    pub fn set_visible(&self, visible: bool) {
        self.with_state(|state| state.visible = visible);
        self.render
            .element()
            .set_style("display", if visible { "" } else { "none" });
    }

    pub fn get_visible(&self) -> bool {
        self.with_state(|state| state.visible)
    }

    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        self.render.element().set_attribute("title", &title);
        self.with_state(|state| state.title = Some(title));
    }

    pub fn get_title(&self) -> Option<String> {
        self.with_state(|state| state.title.clone())
    }

    pub fn set_opacity(&self, opacity: f64) {
        let opacity = opacity.clamp(0.0, 1.0);
        self.with_state(|state| state.opacity = opacity);
        self.render.set_opacity(opacity);
    }

    pub fn get_opacity(&self) -> f64 {
        self.with_state(|state| state.opacity)
    }
}

impl std::fmt::Debug for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with_state(|state| {
            f.debug_struct("Marker")
                .field("position", &state.position)
                .field("added", &state.added)
                .finish()
        })
    }
}
