pub mod entries;
pub mod projects;
pub mod storage;
