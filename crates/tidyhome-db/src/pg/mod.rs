//! PostgreSQL repository implementations

mod article;
mod booking;
mod subscription;

pub use article::PgArticleRepository;
pub use booking::PgBookingRepository;
pub use subscription::PgSubscriptionRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub bookings: PgBookingRepository,
    pub subscriptions: PgSubscriptionRepository,
    pub articles: PgArticleRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            bookings: PgBookingRepository::new(pool.clone()),
            subscriptions: PgSubscriptionRepository::new(pool.clone()),
            articles: PgArticleRepository::new(pool),
        }
    }
}
