pub mod envelope;
pub mod playlist;
