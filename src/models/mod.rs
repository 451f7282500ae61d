pub mod activity;
pub mod course;
pub mod enrollment;
pub mod media;
pub mod user;

pub use activity::*;
pub use course::*;
pub use enrollment::*;
pub use media::*;
pub use user::*;
