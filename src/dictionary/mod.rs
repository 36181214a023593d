pub mod entry;
pub mod view;

pub use entry::{Entry, EntryKind, Language};
pub use view::VocabularyView;
