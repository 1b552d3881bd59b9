//! Contact-form relay. Configured through `CONTACT_OPERATOR`, `CONTACT_BRAND`,
//! `CONTACT_HOST` and `PORT`. Mail goes out over SMTP when `EMAIL_USERNAME` and
//! `EMAIL_PASSWORD` are set (`SMTP_HOST` and `SMTP_PORT` are optional); otherwise it is
//! only logged.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use alpine_backdrop::relay::{ContactRelay, Mailer, RelayConfig};

    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let config = RelayConfig::from_env();
    let mailer = Mailer::from_env()?;
    let relay = ContactRelay::bind(config, mailer)?;
    log::info!(
        "Contact relay running at http://{}:{}",
        relay.config().host,
        relay.local_port()
    );
    relay.run();
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
