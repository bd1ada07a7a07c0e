pub mod preprocess;
pub mod tensor;
