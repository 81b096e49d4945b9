pub use super::reservation::Entity as Reservation;
pub use super::service::Entity as Service;
pub use super::user_account::Entity as UserAccount;
pub use super::user_profile::Entity as UserProfile;
