pub mod migrate;
pub mod relay;
pub mod tables;
pub mod verify;
