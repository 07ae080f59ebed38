pub mod entities;
pub mod grid;
pub mod propagation;
pub mod selection;
pub mod session;
