pub mod github;
pub mod pulls;
pub mod tags;
