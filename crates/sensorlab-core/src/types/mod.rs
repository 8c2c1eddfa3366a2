//! Type system utilities and aliases.
//!
//! ## Modules
//!
//! - [`aliases`]: Type aliases for `Rc<RefCell<T>>`, listener lists, and locked maps.

pub mod aliases;

pub use aliases::*;
