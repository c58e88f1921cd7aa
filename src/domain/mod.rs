pub mod clock;
pub mod duration;
pub mod time_window;
