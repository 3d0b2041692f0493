pub mod careerjet;
