#[allow(unused_imports)]
pub mod prelude {
    pub use super::subscription::Entity as Subscription;
    pub use super::user::Entity as User;
    pub use super::video::Entity as Video;
}

pub mod subscription;
pub mod user;
pub mod video;
