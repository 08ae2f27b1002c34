// Application layer - Services and repository contracts
pub mod dashboard_service;
pub mod report_service;
pub mod shaping;
pub mod variable_repository;
