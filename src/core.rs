pub mod baseline;
pub mod calendar;
pub mod calculation;
pub mod half_hour;
pub mod meter;
pub mod progress;
pub mod readings;
pub mod row;
pub mod series;
pub mod session;
pub mod source;
