pub mod usurdb;
