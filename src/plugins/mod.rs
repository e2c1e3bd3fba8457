pub mod autopilot;
pub mod layout;
pub mod simulation;
pub mod telemetry;
