use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use clap::Args;
use client::{ApiResponse, SessionStore};
use rpassword::prompt_password;
use shared::models::{TokenResponse, UserProfile};

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email. Prompted for when omitted.
    #[arg(long, short)]
    pub email: Option<String>,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Display name. Prompted for when omitted.
    #[arg(long, short)]
    pub name: Option<String>,

    /// Account email. Prompted for when omitted.
    #[arg(long, short)]
    pub email: Option<String>,
}

pub async fn login(store: &SessionStore, args: LoginArgs) -> Result<()> {
    let email = value_or_prompt(args.email, "Email: ")?;
    let password = read_password()?;

    let response = store
        .login(&email, &password)
        .await
        .context("login failed")?;
    print_server_message(&response);
    print_session(store);
    Ok(())
}

pub async fn register(store: &SessionStore, args: RegisterArgs) -> Result<()> {
    let name = value_or_prompt(args.name, "Name: ")?;
    let email = value_or_prompt(args.email, "Email: ")?;
    let password = read_password()?;

    let response = store
        .register(&name, &email, &password)
        .await
        .context("registration failed")?;
    print_server_message(&response);
    print_session(store);
    Ok(())
}

pub fn logout(store: &SessionStore) {
    store.logout();
    println!("Signed out");
}

pub fn whoami(store: &SessionStore) {
    print_session(store);
}

/// Fail with a uniform message when a command needs a session.
pub fn require_session(store: &SessionStore) -> Result<()> {
    if !store.is_authenticated() {
        bail!("not signed in; run `recipebox login` first");
    }
    Ok(())
}

fn print_session(store: &SessionStore) {
    match store.user() {
        Some(user) if store.is_authenticated() => print_user(&user),
        _ => println!("Not signed in"),
    }
}

fn print_user(user: &UserProfile) {
    println!("Signed in as {} <{}>", user.name, user.email);
    if let Some(created_at) = user.created_at {
        println!("member since: {}", created_at.format("%Y-%m-%d"));
    }
}

fn print_server_message(response: &ApiResponse) {
    if let Ok(TokenResponse {
        message: Some(message),
        ..
    }) = serde_json::from_value::<TokenResponse>(response.body.clone())
    {
        println!("{message}");
    }
}

fn value_or_prompt(value: Option<String>, message: &str) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Some(_) => bail!("input must not be empty"),
        None => prompt(message),
    }
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush().ok();
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let trimmed = input.trim().to_string();
    if trimmed.is_empty() {
        bail!("input must not be empty");
    }
    Ok(trimmed)
}

fn read_password() -> Result<String> {
    let password = prompt_password("Password: ")?;
    if password.trim().is_empty() {
        bail!("password must not be empty");
    }
    Ok(password)
}
