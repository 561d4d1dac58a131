pub mod fsp;
