use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use client_core::{ClientEvent, ConfirmationPrompt, MarketClient, SearchForm};
use shared::protocol::Credentials;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, env = "SERVER_URL", default_value = "http://127.0.0.1:5000")]
    server_url: String,
    #[arg(long)]
    login: Option<String>,
    #[arg(long)]
    password: Option<String>,
    /// Name filter for the listing query.
    #[arg(long)]
    name: Option<String>,
}

struct StdinPrompt;

impl ConfirmationPrompt for StdinPrompt {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim(), "y" | "Y" | "да")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let client = MarketClient::new(args.server_url, Arc::new(StdinPrompt))?;
    let mut events = client.subscribe_events();

    client.start().await;

    if let (Some(login), Some(password)) = (args.login, args.password) {
        client.submit_login(&Credentials { login, password }).await;
    }

    match client.session.identity().await {
        Some(identity) => println!("Вошли как {}", identity.login),
        None => println!("Анонимный просмотр"),
    }

    let mut form = SearchForm::default();
    if let Some(name) = args.name {
        form.name = name;
    }
    client.submit_search(form).await;

    if let Some(page) = client.search.current().await {
        println!("Найдено: {}. Страница: {}.", page.total, page.page);
        for profile in &page.items {
            println!(
                "  {} — {} (стаж {} лет, цена {} ₽)",
                profile.name.as_deref().unwrap_or("Без имени"),
                profile.service_type.as_deref().unwrap_or("—"),
                profile.experience_years.unwrap_or(0),
                profile.price.unwrap_or(0),
            );
        }
    }

    while let Ok(event) = events.try_recv() {
        if let ClientEvent::Toast(message) = event {
            println!("* {message}");
        }
    }

    Ok(())
}
