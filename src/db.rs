pub mod directory_repo;
pub use directory_repo::DirectoryRepository;
pub mod requirement_repo;
pub use requirement_repo::RequirementRepository;
pub mod schedule_repo;
pub use schedule_repo::ScheduleRepository;
