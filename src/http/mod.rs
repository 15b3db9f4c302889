pub mod auth;
pub mod bets;
pub mod episodes;
pub mod features;
pub mod health;
pub mod routes;
pub mod shows;
pub mod users;
