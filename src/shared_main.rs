use std::{
    env,
    io::{self, BufRead, Write},
    path::Path,
};

use anyhow::Context;

use crate::{
    api_client::ApiClient,
    data_backend::ApiBackend,
    data_types::Role,
    forms::Confirm,
    session::{AppContext, Session, SessionStore},
};

/// Info everywhere; debug for `module` and this crate when RUST_LOG=debug.
pub fn logger_init(module: &str) {
    let level = if env::var(pretty_env_logger::env_logger::DEFAULT_FILTER_ENV).unwrap_or_default()
        == "debug"
    {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    pretty_env_logger::formatted_timed_builder()
        .filter_level(log::LevelFilter::Info)
        .filter_module(module, level)
        .filter_module("tapeat_dashboard", level)
        .init();
}

pub fn build_context(api_url: &str, session_file: &Path) -> anyhow::Result<AppContext> {
    let api = ApiClient::new(api_url).with_context(|| format!("bad --api-url '{}'", api_url))?;
    log::debug!(
        "api {} / session file {}",
        api.base_url(),
        session_file.display()
    );
    Ok(AppContext::new(api, SessionStore::new(session_file)))
}

/// The stored session, checked against `role`, bound to a live backend.
pub async fn backend_for(ctx: &AppContext, role: Role) -> anyhow::Result<(ApiBackend, Session)> {
    let session = ctx.store.require_role(role).await?;
    Ok((ApiBackend::new(ctx.api.clone(), session.clone()), session))
}

/// Asks on the terminal; anything but y/yes declines.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn context_rejects_bad_urls() {
        assert!(build_context("localhost:8000", Path::new("s.json")).is_err());
        let ctx = build_context("http://localhost:8000/", Path::new("s.json")).unwrap();
        assert_eq!(ctx.api.base_url(), "http://localhost:8000");
    }
}
