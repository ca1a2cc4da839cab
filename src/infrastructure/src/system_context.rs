use std::process::Command;

/// Environment details written at the top of every transcript.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemContext {
    pub platform: String,
    pub current_dir: String,
    pub user: String,
}

impl SystemContext {
    pub fn gather() -> Self {
        Self {
            platform: platform_string(),
            current_dir: current_dir(),
            user: current_user(),
        }
    }
}

fn run_cmd(cmd: &str) -> Option<String> {
    Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `PRETTY_NAME` from an os-release file body.
fn pretty_name(os_release: &str) -> Option<String> {
    os_release.lines().find_map(|line| {
        line.strip_prefix("PRETTY_NAME=")
            .map(|value| value.trim().trim_matches('"').to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Kernel plus distribution, e.g. `Linux 6.5.0-14-generic x86_64 (Ubuntu 22.04.3 LTS)`.
pub fn platform_string() -> String {
    let kernel = run_cmd("uname -sr").unwrap_or_else(|| std::env::consts::OS.to_string());
    let base = format!("{} {}", kernel, std::env::consts::ARCH);
    let distro = std::fs::read_to_string("/etc/os-release")
        .ok()
        .and_then(|content| pretty_name(&content));
    match distro {
        Some(distro) => format!("{} ({})", base, distro),
        None => base,
    }
}

fn current_dir() -> String {
    std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| ".".to_string())
}

pub fn current_user() -> String {
    ["USER", "LOGNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
        .or_else(|| run_cmd("whoami"))
        .unwrap_or_else(|| "unknown".to_string())
}
