pub mod blog;
pub mod paginate;
