pub mod median;
pub mod normalize;
