pub mod distractor;
pub mod fuzzy;
pub mod ledger;
pub mod scheduler;
pub mod selector;

pub use ledger::MistakeLedger;
pub use selector::Selection;
