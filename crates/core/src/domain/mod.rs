pub mod benchmark;
pub mod evaluation;
pub mod feedback;
pub mod recommendation;
pub mod simulation;
pub mod upload;
