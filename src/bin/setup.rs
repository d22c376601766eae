//! sunbot setup wizard.
//!
//! Asks for the bot token, webhook secret, listen address and public URL on
//! the terminal and writes `config.toml`. Leaving the secret empty generates
//! a random one.

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

// ── Config formatting ──────────────────────────────────────────────────────────

struct ConfigParams<'a> {
    bot_token: &'a str,
    webhook_secret: &'a str,
    listen_addr: &'a str,
    public_url: &'a str,
}

/// Random secret made only of characters Telegram accepts in `secret_token`
fn generate_secret() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Produces a valid config.toml string. Extracted so it can be unit-tested.
fn format_config(p: &ConfigParams<'_>) -> String {
    let public_url_line = if p.public_url.is_empty() {
        "# /registerWebhook is not authenticated: set public_url whenever the\n\
         # server is reachable from outside.\n\
         # public_url = \"https://bot.example.com\""
            .to_owned()
    } else {
        format!("public_url = \"{}\"", p.public_url.trim_end_matches('/'))
    };

    let bot_token = p.bot_token;
    let webhook_secret = p.webhook_secret;
    let listen_addr = p.listen_addr;

    format!(
        r#"[telegram]
bot_token = "{bot_token}"
webhook_secret = "{webhook_secret}"
api_url = "https://api.telegram.org"

[server]
listen_addr = "{listen_addr}"
{public_url_line}
"#
    )
}

// ── Prompts ────────────────────────────────────────────────────────────────────

fn run(project_root: &Path) -> Result<()> {
    println!("=== sunbot setup ===\n");

    let read_line = |prompt: &str| -> Result<String> {
        print!("{prompt}");
        io::stdout().flush()?;
        let mut buf = String::new();
        io::stdin().read_line(&mut buf)?;
        Ok(buf.trim().to_owned())
    };

    let or_default = |s: String, default: &str| {
        if s.is_empty() {
            default.to_owned()
        } else {
            s
        }
    };

    let bot_token = read_line("Telegram bot token: ")?;
    if bot_token.is_empty() {
        anyhow::bail!("A bot token is required (ask @BotFather for one)");
    }
    let webhook_secret = or_default(
        read_line("Webhook secret [generate]: ")?,
        &generate_secret(),
    );
    let listen_addr = or_default(
        read_line("Listen address [0.0.0.0:8787]: ")?,
        "0.0.0.0:8787",
    );
    let public_url = read_line("Public URL (optional, e.g. https://bot.example.com): ")?;

    let config = format_config(&ConfigParams {
        bot_token: &bot_token,
        webhook_secret: &webhook_secret,
        listen_addr: &listen_addr,
        public_url: &public_url,
    });

    let config_path = project_root.join("config.toml");
    std::fs::write(&config_path, &config)
        .with_context(|| format!("Could not write {}", config_path.display()))?;

    println!("\n✓  config.toml saved to {}", config_path.display());
    println!("   Run the bot with:  cargo run");
    println!("   Then register it:  curl -X POST <public url>/registerWebhook");
    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    // Resolve project root: prefer SUNBOT_ROOT env, fall back to cwd.
    let project_root =
        PathBuf::from(std::env::var("SUNBOT_ROOT").unwrap_or_else(|_| ".".to_string()));

    run(&project_root)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(bot_token: &str, webhook_secret: &str, listen_addr: &str, public_url: &str) -> String {
        format_config(&ConfigParams {
            bot_token,
            webhook_secret,
            listen_addr,
            public_url,
        })
    }

    #[test]
    fn test_telegram_section_present() {
        let out = cfg("123:abc", "s3cret", "0.0.0.0:8787", "");
        assert!(out.contains("[telegram]"));
        assert!(out.contains(r#"bot_token = "123:abc""#));
        assert!(out.contains(r#"webhook_secret = "s3cret""#));
        assert!(out.contains(r#"api_url = "https://api.telegram.org""#));
    }

    #[test]
    fn test_server_section_present() {
        let out = cfg("t", "s", "127.0.0.1:9000", "");
        assert!(out.contains("[server]"));
        assert!(out.contains(r#"listen_addr = "127.0.0.1:9000""#));
    }

    #[test]
    fn test_public_url_included_when_set() {
        let out = cfg("t", "s", "0.0.0.0:8787", "https://bot.example.com/");
        assert!(out.contains(r#"public_url = "https://bot.example.com""#));
    }

    #[test]
    fn test_public_url_commented_when_empty() {
        let out = cfg("t", "s", "0.0.0.0:8787", "");
        assert!(out.contains("# public_url ="));
        assert!(out.contains("# /registerWebhook is not authenticated"));
        assert!(!out.contains("\npublic_url = "));
    }

    #[test]
    fn test_generated_secret_is_accepted_by_telegram() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 32);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(secret, generate_secret());
    }

    #[test]
    fn test_output_is_valid_toml() {
        let out = cfg("123:abc", "s3cret", "0.0.0.0:8787", "https://bot.example.com");
        let parsed: toml::Value = toml::from_str(&out).unwrap();
        assert_eq!(parsed["server"]["listen_addr"].as_str(), Some("0.0.0.0:8787"));
    }
}
