pub mod gateway;
pub mod seat_service;
pub mod session;
