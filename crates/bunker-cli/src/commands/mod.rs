pub mod games;
pub mod play;
pub mod rules;
