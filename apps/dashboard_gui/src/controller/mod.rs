//! Controller layer: UI events, the provision modal driver and command orchestration.

pub mod events;
pub mod orchestration;
pub mod provision_modal;
