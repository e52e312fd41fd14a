use crate::configuration::RegistrationSettings;
use crate::connectors::payment::PaymentConnector;
use crate::errors::AppError;
use crate::forms::SignupForm;
use crate::models::record::Record;
use crate::models::user::{FullName, User};
use crate::store::StoreClient;
use serde_valid::Validate;

/// Create an account: uniqueness is checked with a query before the insert
/// (two concurrent signups with the same email can both get through), the
/// email must belong to the allowed domain, the password is hashed, and the
/// save provisions the payment identity.
pub async fn register<S, P>(
    store: &S,
    payments: &P,
    settings: &RegistrationSettings,
    form: SignupForm,
) -> Result<User, AppError>
where
    S: StoreClient,
    P: PaymentConnector,
{
    form.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    match User::find_by_email(store, &form.email).await {
        Ok(_) => {
            return Err(AppError::Validation(
                "This email is already registered.".to_string(),
            ))
        }
        Err(err) if err.is_not_found() => {}
        Err(err) => return Err(err),
    }

    let needle = format!("@{}", settings.allowed_email_domain);
    if !form.email.contains(&needle) {
        return Err(AppError::Validation(format!(
            "must be a {} email",
            settings.allowed_email_domain
        )));
    }

    let hash = bcrypt::hash(&form.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let name = FullName {
        first: form.first_name,
        last: form.last_name,
    };
    let mut user = User::new(&form.email, &hash, name, &form.contact);
    user.save(store, payments).await?;

    tracing::info!(user_id = user.id().unwrap_or_default(), "user registered");
    Ok(user)
}

/// Verify a login attempt against the stored hash.
pub async fn authenticate<S: StoreClient>(
    store: &S,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let user = User::find_by_email(store, email).await?;
    if !bcrypt::verify(password, &user.password).unwrap_or(false) {
        return Err(AppError::Auth);
    }
    Ok(user)
}
