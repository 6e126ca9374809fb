pub mod catalog;
pub mod controller;
pub mod debounce;
pub mod pager;
pub mod session;
pub mod trending;

pub use controller::{QueryController, Snapshot};
pub use session::{Session, SessionHandle};
