pub mod commands;
pub mod host;
pub mod theme;
pub mod types;

pub use commands::{GroupKind, RenderCommand};
pub use host::{HostRequest, ListenerKind, TimerKind};
pub use theme::{Theme, ThemeToken};
pub use types::{LayoutSize, Point, Rect, Viewport};
