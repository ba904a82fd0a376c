pub mod showcase;
