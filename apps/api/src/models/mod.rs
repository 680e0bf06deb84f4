//! Database row types. One file per aggregate, all backed by sqlx `FromRow`.

pub mod company;
pub mod drive;
pub mod user;

pub use company::CompanyRow;
pub use drive::{ApplicationRow, PlacementDriveRow};
pub use user::{StudentRow, UserRow};
