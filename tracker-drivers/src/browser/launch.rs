use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// How a browser session presents itself to the sites it visits.
pub struct LaunchProfile {
    pub headless: bool,
    /// Sent on every request; headless Chrome's own UA string gets challenge
    /// pages from several broker sites.
    pub user_agent: String,
    pub window_size: (u32, u32),
    pub languages: Vec<String>,
}

/// Construct Chrome command-line arguments for a launch profile.
pub fn build_launch_arguments(profile: &LaunchProfile) -> Vec<String> {
    let mut args = Vec::with_capacity(10);
    if profile.headless {
        args.push("--headless=new".to_string());
    }
    args.extend([
        // /dev/shm is tiny in containers; Chrome crashes on large pages without this.
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
        "--disable-gpu".to_string(),
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-infobars".to_string(),
        "--disable-extensions".to_string(),
        format!("--user-agent={}", profile.user_agent),
        format!(
            "--window-size={},{}",
            profile.window_size.0, profile.window_size.1
        ),
    ]);
    if !profile.languages.is_empty() {
        args.push(format!("--lang={}", profile.languages.join(",")));
    }
    args
}
