pub mod consts;
pub mod correction;
pub mod detection;
pub mod error;
pub mod filters;
pub mod frame;
pub mod io;
pub mod metadata;
pub mod pipeline;
pub mod projection;
pub mod roi;
