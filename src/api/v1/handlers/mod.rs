pub mod health;
pub mod licences;
