pub mod page;
pub mod rubric;
pub mod wiki;
