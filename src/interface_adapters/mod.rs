// Interface adapters: wire protocol, WebSocket/HTTP handlers, physics engine and map loading.

pub mod http;
pub mod map;
pub mod net;
pub mod physics;
pub mod protocol;
pub mod state;
