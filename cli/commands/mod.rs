pub mod completion;
pub mod generate;
