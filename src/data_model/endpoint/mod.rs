pub mod door_lock_endpoint;
pub mod root_endpoint;
