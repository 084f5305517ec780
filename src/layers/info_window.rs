use crate::{
    core::{geo::LatLng, map::MigrationMap, mvc::PropertyBag},
    layers::{marker::Marker, MapAttachment},
    prelude::{Arc, Mutex},
    render::RenderPopup,
    MapsError, Result,
};

#[derive(Debug, Clone, Default)]
pub struct InfoWindowOptions {
    /// HTML content.
    pub content: Option<String>,
    pub position: Option<LatLng>,
    /// Pixels.
    pub max_width: Option<f64>,
}

#[derive(Default)]
struct InfoWindowState {
    content: Option<String>,
    position: Option<LatLng>,
    max_width: Option<f64>,
    map: MapAttachment,
}

/// Info window adapter over one underlying popup.
#[derive(Clone)]
pub struct InfoWindow {
    render: Arc<dyn RenderPopup>,
    state: Arc<Mutex<InfoWindowState>>,
    properties: PropertyBag,
}

crate::impl_mvc_object!(InfoWindow, properties);

impl InfoWindow {
    pub fn new(render: Arc<dyn RenderPopup>, options: InfoWindowOptions) -> Self {
        let info_window = Self {
            render,
            state: Arc::new(Mutex::new(InfoWindowState::default())),
            properties: PropertyBag::new(),
        };
        info_window.set_options(options);
        info_window
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut InfoWindowState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    /// The underlying render-library popup.
    pub fn render_popup(&self) -> &Arc<dyn RenderPopup> {
        &self.render
    }

    pub fn set_options(&self, options: InfoWindowOptions) {
        if let Some(content) = options.content {
            self.set_content(content);
        }
        if let Some(position) = options.position {
            self.set_position(position);
        }
        if let Some(max_width) = options.max_width {
            self.with_state(|state| state.max_width = Some(max_width));
            self.render.set_max_width(&format!("{max_width}px"));
        }
    }

    /// Opens on `map`, above `anchor` when given, otherwise at the window's
    /// own position.
    pub fn open(&self, map: &MigrationMap, anchor: Option<&Marker>) -> Result<()> {
        let position = anchor
            .and_then(Marker::get_position)
            .or_else(|| self.with_state(|state| state.position))
            .ok_or_else(|| {
                MapsError::InvalidArgument("info window has neither an anchor nor a position".to_string())
            })?;
        self.with_state(|state| {
            state.position = Some(position);
            state.map = MapAttachment::Attached(map.clone());
        });
        self.render.set_lng_lat(position.to_lng_lat());
        self.render.add_to(map.render());
        Ok(())
    }

    pub fn close(&self) {
        let was_open = self.with_state(|state| {
            let attached = state.map.map().is_some();
            if attached {
                state.map = MapAttachment::Cleared;
            }
            attached
        });
        if was_open {
            self.render.remove();
        }
    }

    pub fn is_open(&self) -> bool {
        self.render.is_open()
    }

    pub fn get_map(&self) -> MapAttachment {
        self.with_state(|state| state.map.clone())
    }

    pub fn set_content(&self, content: impl Into<String>) {
        let content = content.into();
        self.render.set_html(&content);
        self.with_state(|state| state.content = Some(content));
    }

    pub fn get_content(&self) -> Option<String> {
        self.with_state(|state| state.content.clone())
    }

    pub fn set_position(&self, position: impl Into<LatLng>) {
        let position = position.into();
        self.with_state(|state| state.position = Some(position));
        self.render.set_lng_lat(position.to_lng_lat());
    }

    pub fn get_position(&self) -> Option<LatLng> {
        self.with_state(|state| state.position)
    }

    pub fn get_max_width(&self) -> Option<f64> {
        self.with_state(|state| state.max_width)
    }
}
