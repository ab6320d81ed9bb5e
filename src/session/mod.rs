pub mod input;
pub mod options;
pub mod practice;
pub mod result;
pub mod screen;
pub mod script;
pub mod trial;
