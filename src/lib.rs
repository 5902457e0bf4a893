pub mod app;
pub mod catalog;
pub mod config;
pub mod duration;
pub mod model;
pub mod player;
pub mod playlist;
pub mod scheduler;
pub mod session;
pub mod storage;
