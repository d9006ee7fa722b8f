// Domain layer - Pure models and layout rules
pub mod device;
pub mod household;
pub mod layout;
pub mod profile;
pub mod resize;
pub mod water_tank;
