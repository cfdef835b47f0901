use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracker_config::{BrowserConfig, MailConfig, MailSecurity, TrackerConfig};
use tracker_ledger::Ledger;
use tracker_notify::{EnvCredentials, Security, SmtpNotifier, SmtpSettings};
use tracker_pipeline::Orchestrator;
use tracker_web::render::{LaunchProfile, WebDriverRenderer};

/// Assemble the orchestrator and its collaborators from configuration.
pub fn build_from_config(cfg: &TrackerConfig, notify: bool) -> Result<Orchestrator> {
    let targets = cfg.targets()?;
    let ledger = Ledger::new(&cfg.ledger.path);
    let renderer = Arc::new(renderer_from_config(&cfg.browser));

    let orchestrator = Orchestrator::new(targets, ledger, renderer);

    let orchestrator = match (&cfg.mail, notify) {
        (Some(mail), true) => {
            let credentials = Arc::new(EnvCredentials::new(mail.username(), &mail.password_env));
            let notifier = SmtpNotifier::new(smtp_settings(mail), credentials);
            orchestrator.with_notifier(Arc::new(notifier))
        }
        (None, true) => {
            warn!("no `mail` section configured; the ledger will not be mailed");
            orchestrator
        }
        (_, false) => {
            info!("notification disabled for this run");
            orchestrator
        }
    };

    Ok(orchestrator)
}

fn renderer_from_config(browser: &BrowserConfig) -> WebDriverRenderer {
    let endpoint = browser.endpoint();
    info!(
        %endpoint,
        containerized = browser.containerized,
        "using WebDriver endpoint"
    );

    let profile = LaunchProfile {
        headless: browser.headless,
        user_agent: browser.user_agent.clone(),
        window_size: browser.window_size,
        languages: browser.languages.clone(),
    };

    WebDriverRenderer::new(endpoint, profile)
        .with_page_load_timeout(browser.page_load_timeout())
        .with_settle_delay(browser.settle_delay())
}

fn smtp_settings(mail: &MailConfig) -> SmtpSettings {
    SmtpSettings {
        relay: mail.relay.clone(),
        port: mail.port,
        security: match mail.security {
            MailSecurity::Starttls => Security::StartTls,
            MailSecurity::Tls => Security::Tls,
        },
        from: mail.from.clone(),
        to: mail.to.clone(),
        subject: mail.subject.clone(),
        body: mail.body.clone(),
    }
}
