pub mod edit_distance;
pub mod scoring;
pub mod timing;
