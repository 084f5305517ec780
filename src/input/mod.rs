pub mod events;
pub mod handler;

// Re-export the essential types
pub use events::{EventTarget, MapsEvent, MouseEvent, Payload};
pub use handler::{
    add_listener, add_listener_once, remove_listener, EventBus, EventHandler, MapsEventListener,
};
