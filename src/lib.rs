#[path = "core/controls.rs"]
pub mod controls;

#[path = "core/info.rs"]
pub mod info;

#[path = "core/pathways.rs"]
pub mod pathways;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/regions.rs"]
pub mod regions;

#[path = "core/scene.rs"]
pub mod scene;

pub mod dashboard;

pub mod protocol;
