use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub store: StoreSettings,
    pub stripe: StripeSettings,
    #[serde(default)]
    pub registration: RegistrationSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    /// Base URL of the hosted database, e.g. https://<project>.firebaseio.com
    pub base_url: String,
    #[serde(default)]
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeSettings {
    pub secret_key: String,
    #[serde(default = "default_stripe_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationSettings {
    /// Registrations are restricted to addresses in this domain.
    #[serde(default = "default_email_domain")]
    pub allowed_email_domain: String,
}

impl Default for RegistrationSettings {
    fn default() -> Self {
        RegistrationSettings {
            allowed_email_domain: default_email_domain(),
        }
    }
}

fn default_stripe_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_email_domain() -> String {
    "sjsu.edu".to_string()
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from a .env file, if present
    dotenvy::dotenv().ok();

    // Values come from a file named `configuration` (.json, .toml, .yaml, .yml)
    // with environment variables taking precedence, e.g. STORE__BASE_URL
    config::Config::builder()
        .add_source(config::File::with_name("configuration"))
        .add_source(config::Environment::default().separator("__"))
        .build()?
        .try_deserialize()
}
