use campusmart::connectors::payment::MockPayments;
use campusmart::models::user::{FullName, User};
use campusmart::store::MemoryStore;
use campusmart::telemetry::{get_subscriber, init_subscriber};
use std::sync::Once;

static TRACING: Once = Once::new();

// Run tests with TEST_LOG=1 to see the bunyan-formatted spans.
pub fn init_tracing() {
    TRACING.call_once(|| {
        if std::env::var("TEST_LOG").is_ok() {
            init_subscriber(get_subscriber("campusmart-test".into(), "debug".into()));
        }
    });
}

#[allow(dead_code)]
pub fn store() -> MemoryStore {
    init_tracing();
    MemoryStore::new()
}

#[allow(dead_code)]
pub fn payments() -> MockPayments {
    MockPayments::new()
}

// Low cost keeps the hashing-heavy tests fast.
pub const TEST_BCRYPT_COST: u32 = 4;

#[allow(dead_code)]
pub fn password_hash(password: &str) -> String {
    bcrypt::hash(password, TEST_BCRYPT_COST).expect("bcrypt hash failed")
}

#[allow(dead_code)]
pub fn draft_user(email: &str) -> User {
    User::new(
        email,
        &password_hash("hunter2boogaloo"),
        FullName {
            first: "John".to_string(),
            last: "Appleseed".to_string(),
        },
        "1231231234",
    )
}

/// A user saved through the full first-save path, payment identity included.
#[allow(dead_code)]
pub async fn persisted_user(store: &MemoryStore, payments: &MockPayments, email: &str) -> User {
    let mut user = draft_user(email);
    user.save(store, payments).await.expect("user save failed");
    user
}
