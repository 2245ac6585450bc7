use crate::{
    auth::AdminCredentials,
    models::{Booking, ContactMessage, Feedback},
    notify::Mailer,
    repo::Repository,
    storage::Storage,
};

#[derive(Clone)]
pub struct AppState {
    pub bookings: Repository<Booking>,
    pub feedback: Repository<Feedback>,
    pub messages: Repository<ContactMessage>,
    pub mailer: Mailer,
    pub admin: AdminCredentials,
}

impl AppState {
    pub fn new(storage: Storage, mailer: Mailer, admin: AdminCredentials) -> Self {
        Self {
            bookings: Repository::new(storage.clone()),
            feedback: Repository::new(storage.clone()),
            messages: Repository::new(storage),
            mailer,
            admin,
        }
    }
}

#[cfg(test)]
pub async fn test_state(mailer: Mailer) -> AppState {
    let storage = Storage::new(crate::db::test_pool().await);
    let admin = AdminCredentials::new("admin", "secret-pass").unwrap();
    AppState::new(storage, mailer, admin)
}
