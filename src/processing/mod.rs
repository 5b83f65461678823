pub mod outliers;
pub mod partition;
pub mod peirce;
pub mod primitives;
pub mod regularize;
pub mod statistics;
