pub mod calendar;
pub mod exam;
pub mod item;
pub mod list;
pub mod merge;
pub mod picker;
pub mod settings;
pub mod state;
pub mod timer;
