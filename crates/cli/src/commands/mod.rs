pub mod chat;
pub mod doctor;
pub mod onboard;
pub mod register;
pub mod runtime;
pub mod serve;
pub mod status;
