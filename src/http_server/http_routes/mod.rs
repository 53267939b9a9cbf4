pub mod artists;
pub mod events;
