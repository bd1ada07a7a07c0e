pub mod core;
pub mod error;
pub mod main;
pub mod run_effect;

#[cfg(test)]
mod tests;
