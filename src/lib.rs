pub mod adapter;
pub mod astro;
pub mod events;
pub mod gravity;
pub mod math;
pub mod propagation;

#[cfg(test)]
pub mod consts;
