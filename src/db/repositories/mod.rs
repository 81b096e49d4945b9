pub mod reservation;
pub mod service;
pub mod user;
