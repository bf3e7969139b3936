//! Account entity: model and role enumeration.

pub mod model;
pub mod role;

pub use model::{Account, CreateAccount, UpdateProfile};
pub use role::AccountRole;
