pub mod foil;
pub mod hull;
pub mod inflow;
pub mod polar;
pub mod propulsor;
pub mod puff;
