pub mod artist;
pub mod event;
