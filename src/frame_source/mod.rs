#[allow(dead_code)]
pub mod impl_fake;
pub mod impl_still_image;
pub mod interface;
