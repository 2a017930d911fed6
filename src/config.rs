use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub public_base_url: String,
    pub mail_service_url: String,
    pub mail_service_token: String,
    pub session_secret: String,
    pub admin_secret: String,
    pub auth_issuer: String,
    pub default_event_id: String,
    pub token_ttl_days: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            mail_service_url: env::var("MAIL_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/send".to_string()),
            mail_service_token: env::var("MAIL_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            session_secret: env::var("SESSION_SECRET").expect("SESSION_SECRET must be set"),
            admin_secret: env::var("ADMIN_SECRET").expect("ADMIN_SECRET must be set"),
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "https://checkin.local".to_string()),
            default_event_id: env::var("DEFAULT_EVENT_ID").unwrap_or_else(|_| "default".to_string()),
            token_ttl_days: env::var("TOKEN_TTL_DAYS").unwrap_or_else(|_| "30".to_string()).parse().expect("TOKEN_TTL_DAYS must be a number"),
        }
    }

    pub fn redemption_url(&self, token: &str) -> String {
        format!("{}/redeem/{}", self.public_base_url, token)
    }

    pub fn qr_image_url(&self, token: &str) -> String {
        format!("{}/api/v1/qr/image/{}", self.public_base_url, token)
    }
}
