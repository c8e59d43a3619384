//! Боевая часть симуляции: приём ударов, i-frames, смерть.

pub mod hit;

pub use hit::{apply_hurtbox_hits, CharacterDied, Dead, HurtboxHit, Invincible};
