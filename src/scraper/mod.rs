pub mod careerjet;
pub mod job;
