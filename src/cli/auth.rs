use std::io::{self, Write};

use anyhow::{Result, anyhow};

use crate::core::AppConfig;
use crate::core::db::{async_db, initialize_db};
use crate::google::oauth::exchange_code_for_token;

const SCOPE: &str = "https://www.googleapis.com/auth/gmail.modify https://www.googleapis.com/auth/userinfo.email https://www.googleapis.com/auth/userinfo.profile";

pub async fn run() -> Result<()> {
    let config = AppConfig::default();

    // Prompt the user for their email address
    print!("Enter the email address you are authenticating: ");
    io::stdout().flush()?;
    let mut user_email = String::new();
    io::stdin().read_line(&mut user_email)?;
    let user_email = user_email.trim().to_owned();

    let redirect_uri = std::env::var("MAILSWEEP_GMAIL_REDIRECT_URI")
        .unwrap_or_else(|_| "urn:ietf:wg:oauth:2.0:oob".to_string());
    let auth_url = format!(
        "https://accounts.google.com/o/oauth2/v2/auth?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
        urlencoding::encode(&config.gmail_client_id),
        urlencoding::encode(&redirect_uri),
        urlencoding::encode(SCOPE)
    );
    println!(
        "\nPlease open the following URL in your browser and authorize access:\n\n{}\n",
        auth_url
    );
    print!("Paste the authorization code shown by Google here: ");
    io::stdout().flush()?;
    let mut code = String::new();
    io::stdin().read_line(&mut code)?;
    let code = code.trim();

    let token = exchange_code_for_token(
        &config.google_oauth_hostname,
        &config.gmail_client_id,
        &config.gmail_client_secret,
        code,
        &redirect_uri,
    )
    .await?;

    // Store the refresh token in the db and use that to fetch an
    // access token from now on.
    let refresh_token = token
        .refresh_token
        .ok_or(anyhow!("No refresh token in response"))?;

    let db = async_db(&config.db_path).await?;
    db.call(move |conn| {
        initialize_db(conn).expect("Failed to initialize db");
        conn.execute(
            "INSERT INTO auth (id, service, refresh_token) VALUES (?1, 'gmail', ?2)
             ON CONFLICT(id) DO UPDATE SET refresh_token = excluded.refresh_token",
            (&user_email, &refresh_token),
        )
        .expect("Failed to insert/update refresh token in db");
        println!("Refresh token for {} saved.", user_email);
        Ok(())
    })
    .await?;

    Ok(())
}
