pub mod hysteresis;

pub use hysteresis::evaluate;
