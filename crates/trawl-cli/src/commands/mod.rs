pub mod detail;
pub mod dispatch;
pub mod list;
pub mod search;
pub mod sources;
