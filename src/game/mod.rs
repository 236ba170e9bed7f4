// Game-specific logic: characters and their behavior

pub mod characters;
