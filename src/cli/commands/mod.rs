pub mod capabilities;
pub mod nav;
pub mod upload;
