pub mod count;
pub mod dashboard;
pub mod export;
pub mod health;
pub mod track;
