// Engine modules: assets, physics, input

pub mod assets;
pub mod input;
pub mod physics;
