pub mod db;
pub mod model;
pub mod sessions;
pub mod todos;
pub mod users;

pub use db::Store;
pub use model::{SessionRecord, TodoRecord, UserProfile, UserRecord};
pub use users::CreateUserResult;
