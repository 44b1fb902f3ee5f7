use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Built-in agents written out when no agent file exists yet.
///
/// Covers desktop (Windows/macOS/Linux), mobile (iOS/Android; phones and
/// tablets) and a console browser.
pub const DEFAULT_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0.5481.77 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/112.0.5615.49 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:96.0) Gecko/20100101 Firefox/96.0",
    "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/109.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_6) AppleWebKit/537.36 (KHTML, like Gecko) Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (iPad; CPU OS 15_2 like Mac OS X) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.5359.215 Safari/537.36",
    "Mozilla/5.0 (Android 12; Mobile; rv:109.0) Gecko/109.0 Firefox/109.0",
    "Mozilla/5.0 (Linux; Android 11; SM-G991B) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/94.0.4606.71 Mobile Safari/537.36",
    "Mozilla/5.0 (PlayStation 5 3.20) AppleWebKit/537.36 (KHTML, like Gecko)",
    "Mozilla/5.0 (Windows NT 6.1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/96.0.4664.110 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 11_2_3) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/89.0.4389.90 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:95.0) Gecko/20100101 Firefox/95.0",
];

/// Pool of User-Agent strings; one is drawn at random for every request.
#[derive(Debug, Clone)]
pub struct AgentPool {
    agents: Vec<String>,
}

impl AgentPool {
    /// Pool backed by the built-in list only
    pub fn builtin() -> Self {
        AgentPool {
            agents: DEFAULT_AGENTS.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Reads one agent per line from `path`.
    ///
    /// When the file does not exist it is created (with its parent directory)
    /// from the built-in list first. An existing file without any usable line
    /// falls back to the built-in list.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "agent file not found, writing built-in agents");

            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create agent directory: {}", parent.display())
                    })?;
                }
            }

            let mut content = DEFAULT_AGENTS.join("\n");
            content.push('\n');
            fs::write(path, content)
                .with_context(|| format!("Failed to write agent file: {}", path.display()))?;

            return Ok(Self::builtin());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read agent file: {}", path.display()))?;

        let agents: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        if agents.is_empty() {
            warn!(path = %path.display(), "agent file is empty, using built-in agents");
            return Ok(Self::builtin());
        }

        Ok(AgentPool { agents })
    }

    /// Returns a randomly chosen agent
    pub fn random(&self) -> &str {
        let mut rng = rand::thread_rng();
        self.agents
            .choose(&mut rng)
            .map(String::as_str)
            .unwrap_or(DEFAULT_AGENTS[0])
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }
}
