pub mod controller;
pub mod dispatcher;
pub mod model;
pub mod reminders;
pub mod router;
pub mod service;
