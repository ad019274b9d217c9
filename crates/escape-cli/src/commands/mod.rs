pub mod bootstrap;
pub mod info;
pub mod play;
pub mod player;
pub mod render;
