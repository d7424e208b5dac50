pub mod command;
pub mod media;
pub mod planner;
pub mod separator;
pub mod splitter;
pub mod workdir;
