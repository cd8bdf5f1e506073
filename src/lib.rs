pub mod board;
pub mod config;
pub mod game;
pub mod input;
pub mod level;
pub mod loader;
pub mod pickup;
pub mod snake;
