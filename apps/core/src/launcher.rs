use std::path::Path;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchTarget {
    /// Path or URL handed to the shell's default association.
    Open(String),
    /// Program started directly with arguments.
    Command { program: String, args: Vec<String> },
}

impl LaunchTarget {
    pub fn open(target: impl Into<String>) -> Self {
        Self::Open(target.into())
    }

    pub fn command(program: impl Into<String>, args: &[&str]) -> Self {
        Self::Command {
            program: program.into(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    fn display_name(&self) -> &str {
        match self {
            Self::Open(target) => target,
            Self::Command { program, .. } => program,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("empty launch target")]
    EmptyTarget,
    #[error("failed to start '{target}': {message}")]
    Spawn { target: String, message: String },
    #[error("shell rejected '{target}' (code={code})")]
    Shell { target: String, code: isize },
}

/// Fires a target and returns once the spawn call itself has succeeded or failed.
pub trait Launcher: Send + Sync {
    fn launch(&self, target: &LaunchTarget) -> Result<(), LaunchError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&self, target: &LaunchTarget) -> Result<(), LaunchError> {
        if target.display_name().trim().is_empty() {
            return Err(LaunchError::EmptyTarget);
        }

        let result = match target {
            LaunchTarget::Open(path) => open_with_shell(path.trim()),
            LaunchTarget::Command { program, args } => spawn_program(program, args),
        };
        match &result {
            Ok(()) => tracing::info!(target = target.display_name(), "launched"),
            Err(error) => tracing::warn!(target = target.display_name(), %error, "launch failed"),
        }
        result
    }
}

pub fn is_url(value: &str) -> bool {
    value.contains("://") || value.starts_with("ms-settings:") || value.starts_with("mailto:")
}

#[cfg(target_os = "windows")]
fn open_with_shell(target: &str) -> Result<(), LaunchError> {
    shell_execute(target, "")
}

#[cfg(target_os = "windows")]
fn spawn_program(program: &str, args: &[String]) -> Result<(), LaunchError> {
    shell_execute(program, &args.join(" "))
}

#[cfg(target_os = "windows")]
fn shell_execute(file: &str, parameters: &str) -> Result<(), LaunchError> {
    use windows_sys::Win32::UI::Shell::ShellExecuteW;
    use windows_sys::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;

    let file_wide = to_wide(file);
    let parameters_wide = to_wide(parameters);
    let parameters_ptr = if parameters.trim().is_empty() {
        std::ptr::null()
    } else {
        parameters_wide.as_ptr()
    };

    let result = unsafe {
        ShellExecuteW(
            std::ptr::null_mut(),
            std::ptr::null(),
            file_wide.as_ptr(),
            parameters_ptr,
            std::ptr::null(),
            SW_SHOWNORMAL,
        )
    } as isize;

    // ShellExecuteW reports failure as a value <= 32.
    if result <= 32 {
        return Err(LaunchError::Shell {
            target: file.to_string(),
            code: result,
        });
    }
    Ok(())
}

#[cfg(target_os = "windows")]
fn to_wide(value: &str) -> Vec<u16> {
    value.encode_utf16().chain(std::iter::once(0)).collect()
}

#[cfg(not(target_os = "windows"))]
fn open_with_shell(target: &str) -> Result<(), LaunchError> {
    if !is_url(target) && !Path::new(target).exists() {
        return Err(LaunchError::Spawn {
            target: target.to_string(),
            message: "path does not exist".to_string(),
        });
    }

    let opener = if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };
    spawn_program(opener, &[target.to_string()])
}

#[cfg(not(target_os = "windows"))]
fn spawn_program(program: &str, args: &[String]) -> Result<(), LaunchError> {
    let child = std::process::Command::new(program)
        .args(args)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|error| LaunchError::Spawn {
            target: program.to_string(),
            message: error.to_string(),
        })?;

    // Reap in the background so the caller never waits on the child.
    std::thread::spawn(move || {
        let mut child = child;
        let _ = child.wait();
    });
    Ok(())
}

/// Whether `path` can be started directly rather than opened by association.
pub fn is_directly_executable(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .map(|meta| meta.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("exe"))
    }
}
