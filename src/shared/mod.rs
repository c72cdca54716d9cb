//! Geteilte Typen für layer-übergreifende Verträge.
//!
//! Enthält die Ausgabeströme der Engine (Render-Direktiven, Benachrichtigungen)
//! und die Konfiguration, damit `app` und Host-UI nicht direkt voneinander abhängen.

mod notification;
pub mod options;
mod render_directive;

pub use notification::{EngineEvent, NotificationEvent, NotificationKind};
pub use options::{EngineOptions, LayerSpec};
pub use options::{FETCH_ERROR_MESSAGE, HEAT_MAP_LAYER_KEY, TIME_SERIES_LAYER_KEY};
pub use render_directive::{DirectiveOp, RenderDirective};
