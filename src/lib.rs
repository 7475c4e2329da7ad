#![forbid(unsafe_code)]

mod animation;
pub mod assets;
pub mod config;
pub mod export;
mod foundation;
mod model;
pub mod persist;
mod render;
pub mod session;
mod store;

pub use animation::clock::{AnimationClock, AnimationGroup};
pub use assets::decode::{DEFAULT_GIF_DELAY_MS, decode_gif, decode_image};
pub use assets::manifest::{AssetClass, ManifestEntry, parse_manifest};
pub use assets::upload::{SUPPORTED_EXTENSIONS, UploadKind};
pub use config::EditorConfig;
pub use export::exporter::{
    default_file_name, encode_png, export_gif, export_gif_file, export_static, export_static_file,
};
pub use export::sink::{FrameSink, GifSink, InMemorySink, PngFileSink, SinkConfig};
pub use foundation::core::{
    Affine, Point, Position, Rect, Rgba8, Scale, Spin, SpinDirection, Vec2, element_transform,
};
pub use foundation::error::{CanvasError, CanvasResult, GENERIC_USER_MESSAGE};
pub use model::element::{
    AnimatedImageElement, BackgroundElement, Element, ElementKind, FontStyle, FontWeight,
    ImageElement, OverlayElement, TextAlign, TextBaseline, TextElement, TextStyle,
};
pub use model::ids::{ElementId, LayerId};
pub use model::layer::{BlendMode, Layer, create_layer, paint_order};
pub use model::raster::{GifAnimation, GifFrame, ImageSource, Raster};
pub use persist::storage::{
    APP_STATE_KEY, DirStorage, MemoryStorage, StateStorage, hydrate, persist_listener,
};
pub use render::blend::composite_in_place;
pub use render::compositor::{Compositor, CompositorOpts, SelectionStyle};
pub use render::hit_test::{
    RESIZE_HANDLE_PX, is_over_resize_handle, is_point_in_text, resize_handle_rect, text_bounds,
};
pub use render::surface::{FrameRgba8, Surface};
pub use render::text::{TextEngine, TextMetrics};
pub use session::editor::{Editor, EditorKey};
pub use store::canvas_store::{CanvasStore, Listener, SubscriptionId};
pub use store::history::History;
pub use store::state::{CanvasState, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
