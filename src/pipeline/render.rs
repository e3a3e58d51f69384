//! PDF rendering: print the assembled HTML through a headless browser.
//!
//! The browser is a child process driven with Chromium's `--print-to-pdf`
//! flag. It is the only external dependency of a run, so this stage owns
//! every failure mode around it: the binary cannot be found, cannot be
//! started, hangs, or exits without producing a file.
//!
//! ## Success criterion
//!
//! Chromium-family browsers frequently exit non-zero after printing
//! successfully (GPU or sandbox noise on stderr). The exit code is therefore
//! only logged; the run succeeds iff the PDF exists afterwards. A stale PDF
//! from a previous run is removed first so it cannot be mistaken for output.
//!
//! ## Timeout
//!
//! `tokio::time::timeout` bounds the whole run. The child is spawned with
//! `kill_on_drop(true)`, so abandoning the future on timeout kills it.

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::output::RenderOutcome;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Executable names searched on `PATH`, in order.
const PATH_CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "microsoft-edge",
    "chrome",
];

/// Maximum characters of browser stderr echoed into the log.
const STDERR_LOG_LIMIT: usize = 500;

/// Flags passed before the `--print-to-pdf=` argument.
const LEADING_FLAGS: &[&str] = &[
    "--headless",
    "--disable-gpu",
    "--no-sandbox",
    "--run-all-compositor-stages-before-draw",
];

/// Flags passed after the `--print-to-pdf=` argument. Both spellings are
/// given because the header/footer switch was renamed across Chrome versions.
const TRAILING_FLAGS: &[&str] = &["--print-to-pdf-no-header", "--no-pdf-header-footer"];

/// Print `html_path` to `pdf_path`.
pub async fn print_to_pdf(
    html_path: &Path,
    pdf_path: &Path,
    config: &ReportConfig,
) -> Result<RenderOutcome, ReportError> {
    let browser = resolve_browser(config)?;
    let html_abs = absolute(html_path)?;
    let pdf_abs = absolute(pdf_path)?;

    if let Some(parent) = pdf_abs.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ReportError::OutputWriteFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }
    match tokio::fs::remove_file(&pdf_abs).await {
        Ok(()) => debug!("Removed stale {}", pdf_abs.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(ReportError::OutputWriteFailed {
                path: pdf_abs,
                source: e,
            })
        }
    }

    let args = browser_args(&config.browser_args, &file_url(&html_abs), &pdf_abs);
    info!("Printing with {}", browser.display());
    debug!("Browser args: {:?}", args);

    let mut cmd = Command::new(&browser);
    cmd.args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let secs = config.render_timeout_secs;
    let output = match tokio::time::timeout(Duration::from_secs(secs), cmd.output()).await {
        Err(_) => return Err(ReportError::BrowserTimeout { secs }),
        Ok(Err(e)) => {
            return Err(ReportError::BrowserLaunchFailed {
                binary: browser,
                source: e,
            })
        }
        Ok(Ok(output)) => output,
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(
            "Browser exited with {} (checking for PDF anyway): {}",
            output.status,
            truncate_chars(stderr.trim(), STDERR_LOG_LIMIT)
        );
    }

    match tokio::fs::metadata(&pdf_abs).await {
        Ok(meta) if meta.is_file() => {
            info!("PDF written: {} ({} bytes)", pdf_abs.display(), meta.len());
            Ok(RenderOutcome {
                browser,
                exit_code: output.status.code(),
                pdf_path: pdf_abs,
                pdf_bytes: meta.len(),
            })
        }
        _ => Err(ReportError::PdfNotCreated {
            pdf: pdf_abs,
            html: html_abs,
        }),
    }
}

/// Pick the browser executable: configured path, then well-known install
/// locations, then a `PATH` search.
pub fn resolve_browser(config: &ReportConfig) -> Result<PathBuf, ReportError> {
    if let Some(path) = &config.browser_path {
        return Ok(path.clone());
    }
    if let Some(path) = install_locations().into_iter().find(|p| p.is_file()) {
        debug!("Found browser at {}", path.display());
        return Ok(path);
    }
    if let Some(path) = PATH_CANDIDATES.iter().find_map(|name| find_on_path(name)) {
        debug!("Found browser on PATH: {}", path.display());
        return Ok(path);
    }
    Err(ReportError::BrowserNotFound {
        hint: format!(
            "Install Chrome or Chromium, or pass --browser <path> (env DOCPRESS_BROWSER).\nSearched PATH for: {}",
            PATH_CANDIDATES.join(", ")
        ),
    })
}

fn install_locations() -> Vec<PathBuf> {
    let paths: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
        ]
    } else {
        &[]
    };
    paths.iter().map(PathBuf::from).collect()
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .flat_map(|dir| {
            let plain = dir.join(name);
            let exe = dir.join(format!("{name}.exe"));
            [plain, exe]
        })
        .find(|p| p.is_file())
}

/// Full argument list: caller-supplied args first, then the print flags,
/// then the document URL.
pub fn browser_args(extra: &[String], html_url: &str, pdf_path: &Path) -> Vec<String> {
    let mut args: Vec<String> = extra.to_vec();
    args.extend(LEADING_FLAGS.iter().map(|f| f.to_string()));
    args.push(format!("--print-to-pdf={}", pdf_path.display()));
    args.extend(TRAILING_FLAGS.iter().map(|f| f.to_string()));
    args.push(html_url.to_string());
    args
}

/// `file://` URL for an absolute path. Backslashes become forward slashes
/// and a drive-letter path gets the extra leading slash.
pub fn file_url(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let mut encoded = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        match c {
            '%' => encoded.push_str("%25"),
            ' ' => encoded.push_str("%20"),
            '#' => encoded.push_str("%23"),
            '?' => encoded.push_str("%3F"),
            _ => encoded.push(c),
        }
    }
    if encoded.starts_with('/') {
        format!("file://{encoded}")
    } else {
        format!("file:///{encoded}")
    }
}

fn absolute(path: &Path) -> Result<PathBuf, ReportError> {
    std::path::absolute(path)
        .map_err(|e| ReportError::Internal(format!("Cannot resolve '{}': {}", path.display(), e)))
}

/// At most `limit` characters of `text`.
fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
