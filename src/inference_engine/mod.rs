#[allow(dead_code)]
pub mod impl_fake;
pub mod impl_tract_onnx;
pub mod interface;
pub mod single_flight;
