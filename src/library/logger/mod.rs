pub mod impl_console;
#[allow(dead_code)]
pub mod impl_fake;
pub mod interface;
