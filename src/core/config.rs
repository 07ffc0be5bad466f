use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: String,
    pub gmail_api_hostname: String,
    pub google_oauth_hostname: String,
    pub gmail_client_id: String,
    pub gmail_client_secret: String,
    pub openai_api_hostname: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub classify_batch_size: usize,
    pub classify_batch_pause_ms: u64,
    pub trash_batch_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("MAILSWEEP_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/db", storage_path);
        let gmail_api_hostname = env::var("MAILSWEEP_GMAIL_API_HOSTNAME")
            .unwrap_or_else(|_| "https://gmail.googleapis.com".to_string());
        let google_oauth_hostname = env::var("MAILSWEEP_GOOGLE_OAUTH_HOSTNAME")
            .unwrap_or_else(|_| "https://oauth2.googleapis.com".to_string());
        let gmail_client_id =
            env::var("MAILSWEEP_GMAIL_CLIENT_ID").expect("Missing MAILSWEEP_GMAIL_CLIENT_ID");
        let gmail_client_secret = env::var("MAILSWEEP_GMAIL_CLIENT_SECRET")
            .expect("Missing MAILSWEEP_GMAIL_CLIENT_SECRET");
        let openai_api_hostname = env::var("MAILSWEEP_OPENAI_API_HOSTNAME")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let openai_api_key = env::var("OPENAI_API_KEY").expect("Missing env var OPENAI_API_KEY");
        let openai_model =
            env::var("MAILSWEEP_OPENAI_MODEL").unwrap_or_else(|_| "gpt-4.1-mini".to_string());
        let classify_batch_size = env::var("MAILSWEEP_CLASSIFY_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2);
        let classify_batch_pause_ms = env::var("MAILSWEEP_CLASSIFY_BATCH_PAUSE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1000);
        let trash_batch_size = env::var("MAILSWEEP_TRASH_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        Self {
            db_path,
            gmail_api_hostname,
            google_oauth_hostname,
            gmail_client_id,
            gmail_client_secret,
            openai_api_hostname,
            openai_api_key,
            openai_model,
            classify_batch_size,
            classify_batch_pause_ms,
            trash_batch_size,
        }
    }
}
