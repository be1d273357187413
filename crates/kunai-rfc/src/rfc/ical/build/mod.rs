//! iCalendar text generation.

mod fold;

pub use fold::fold_line;
