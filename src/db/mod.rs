pub mod bet_repo;
pub mod membership_repo;
pub mod models;
pub mod seed;
pub mod show_repo;
pub mod user_repo;
