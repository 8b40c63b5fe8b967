pub mod health_service;
pub mod message_service;
pub mod store;
