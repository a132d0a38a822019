pub mod aligner;
pub mod cache;
pub mod fuzzy;
pub mod interpolate;
pub mod locator;
pub mod range;

pub use aligner::{align_chapter, AlignState};
pub use cache::{ChapterAnchor, SyncCache};
pub use fuzzy::{find_near, Match};
pub use interpolate::{chapter_duration, interpolate_chapter};
pub use locator::ChapterLocator;
pub use range::SentenceRange;
