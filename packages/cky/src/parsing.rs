pub mod chart;
pub mod cky;
pub mod index;
pub mod trees;
