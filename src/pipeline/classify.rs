//! Batched marketing/important classification via a chat completion
//! model. Classification is fail-open: a failed call keeps the email
//! with a zero-confidence "not marketing" verdict instead of risking
//! deletion of something important.

use std::time::Duration;

use futures_util::future::join_all;
use serde_json::Value;

use super::{EmailRecord, Verdict};
use crate::core::AppConfig;
use crate::openai::{CompletionOptions, Message, Role, completion};

const SYSTEM_PROMPT: &str = "You are an email analyzer. Determine if an email is \
marketing/promotional/unnecessary or important. Consider factors like sender, \
subject, and content. Respond with a JSON object containing: isMarketing \
(boolean), confidence (0-1), and reason (string).";

/// Only the start of the body goes into the prompt; marketing intent
/// shows up early and long bodies waste tokens.
const BODY_PROMPT_CHARS: usize = 1000;

fn build_prompt(email: &EmailRecord) -> String {
    let from = if email.from.is_empty() {
        "Unknown"
    } else {
        &email.from
    };
    let subject = if email.subject.is_empty() {
        "No Subject"
    } else {
        &email.subject
    };
    let body: String = email.text.chars().take(BODY_PROMPT_CHARS).collect();
    format!("From: {}\nSubject: {}\nBody: {}\n", from, subject, body)
}

fn parse_verdict(response: &Value) -> Option<Verdict> {
    let content = response["choices"][0]["message"]["content"].as_str()?;
    serde_json::from_str(content).ok()
}

/// Classify a single email. Never errors: transport failures and
/// unparseable model output both produce the fail-open default.
async fn classify_email(email: &EmailRecord, config: &AppConfig) -> Verdict {
    let messages = vec![
        Message::new(Role::System, SYSTEM_PROMPT),
        Message::new(Role::User, &build_prompt(email)),
    ];
    let options = CompletionOptions {
        temperature: 0.7,
        max_tokens: 150,
        json: true,
    };

    match completion(
        &messages,
        &config.openai_api_hostname,
        &config.openai_api_key,
        &config.openai_model,
        &options,
    )
    .await
    {
        Ok(response) => parse_verdict(&response).unwrap_or_else(|| {
            tracing::warn!("Unparseable verdict for email {}", email.id);
            Verdict::fail_open("Failed to analyze email")
        }),
        Err(err) => {
            tracing::warn!("Classification failed for email {}: {}", email.id, err);
            Verdict::fail_open("Analysis failed")
        }
    }
}

/// Annotate every email with a verdict.
///
/// Emails run in fixed-size groups; calls within a group are
/// concurrent and a fixed pause separates groups to stay under the
/// completion provider's rate limits. Peak in-flight calls never
/// exceed the group size. Records that already carry a verdict are
/// returned untouched.
pub async fn classify_all(emails: Vec<EmailRecord>, config: &AppConfig) -> Vec<EmailRecord> {
    let batch_size = config.classify_batch_size.max(1);
    let total = emails.len();
    let mut results = Vec::with_capacity(total);

    for (index, group) in emails.chunks(batch_size).enumerate() {
        if index > 0 {
            tokio::time::sleep(Duration::from_millis(config.classify_batch_pause_ms)).await;
        }
        let verdicts = join_all(group.iter().map(|email| async {
            if email.analysis.is_some() {
                None
            } else {
                Some(classify_email(email, config).await)
            }
        }))
        .await;

        for (email, verdict) in group.iter().zip(verdicts) {
            let mut email = email.clone();
            if let Some(verdict) = verdict {
                email.analysis = Some(verdict);
            }
            results.push(email);
        }
    }

    results
}
