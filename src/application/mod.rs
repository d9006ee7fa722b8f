// Application layer - Use cases and repository seams
pub mod dashboard_service;
pub mod device_registry;
pub mod device_service;
pub mod editing_service;
pub mod household_repository;
pub mod household_service;
pub mod streaming_service;
