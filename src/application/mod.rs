// Application layer - use-case services and the repository seam
pub mod chart_service;
pub mod sales_repository;
pub mod selection_controller;
