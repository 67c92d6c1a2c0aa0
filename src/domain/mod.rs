// Domain layer: calendar, geometry, scene models and ports. No I/O here.

pub mod calendar;
pub mod geometry;
pub mod model;
pub mod ports;
