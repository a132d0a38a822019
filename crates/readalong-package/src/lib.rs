pub mod assemble;
pub mod duration;
pub mod media_overlay;

pub use assemble::{assemble_package, ChapterOutput, MEDIA_OVERLAY_ACTIVE_CLASS, MEDIA_OVERLAY_STYLESHEET};
pub use duration::format_duration;
pub use media_overlay::build_media_overlay;
