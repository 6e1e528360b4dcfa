pub mod plane;
pub mod point_cloud;
