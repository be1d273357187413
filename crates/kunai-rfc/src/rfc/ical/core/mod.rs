//! iCalendar structures shared by calendar and contact data.

mod component;
mod content_line;
mod value;

pub use component::{Component, Node};
pub use content_line::{ContentLine, Parameter};
pub use value::{DateValue, Period, parse_date_time, parse_date_value, parse_duration, parse_period};
