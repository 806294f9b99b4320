//! Environment check: is this build and machine able to produce plots?

use plotters::style::{FontDesc, FontFamily, FontStyle};

use crate::render::OutputFormat;

/// Compiler that built this binary, recorded by the build script.
pub const BUILD_RUSTC: &str = env!("PHOTPLOT_RUSTC_VERSION");

/// Minimum supported Rust version from `Cargo.toml`.
pub const MIN_RUST: &str = env!("CARGO_PKG_RUST_VERSION");

const INPUT_FORMATS: &[&str] = &["parquet", "pq", "csv", "json"];

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

/// Pull `major.minor.patch` out of strings like `rustc 1.83.0 (90b35a623 2024-11-26)`.
pub fn parse_version(s: &str) -> Option<(u32, u32, u32)> {
    let token = s
        .split_whitespace()
        .find(|t| t.starts_with(|c: char| c.is_ascii_digit()))?;
    let core = token.split(['-', '+']).next()?;
    let mut parts = core.split('.').map(|p| p.parse::<u32>());
    let major = parts.next()?.ok()?;
    let minor = parts.next().unwrap_or(Ok(0)).ok()?;
    let patch = parts.next().unwrap_or(Ok(0)).ok()?;
    Some((major, minor, patch))
}

/// Does `found` meet `required`?
pub fn check_toolchain(found: &str, required: &str) -> Check {
    let (passed, detail) = match (parse_version(found), parse_version(required)) {
        (Some(f), Some(r)) if f >= r => (true, format!("{found} (requires {required})")),
        (Some(_), Some(_)) => (false, format!("outdated compiler: {found}, requires {required}")),
        _ => (false, format!("cannot determine compiler version from '{found}'")),
    };
    Check {
        name: "Rust toolchain",
        passed,
        detail,
    }
}

/// Can plotters find a font to draw axis labels with?
pub fn check_font(family: &str) -> Check {
    let font = FontDesc::new(FontFamily::from(family), 12.0, FontStyle::Normal);
    match font.box_size("V-I") {
        Ok(_) => Check {
            name: "Plot font",
            passed: true,
            detail: format!("'{family}' available"),
        },
        Err(e) => Check {
            name: "Plot font",
            passed: false,
            detail: format!("'{family}' unavailable: {e}; install a system font or set font_family in --style"),
        },
    }
}

fn formats_check() -> Check {
    let mut outputs: Vec<&str> = OutputFormat::BITMAP_EXTENSIONS.to_vec();
    outputs.push("svg");
    Check {
        name: "Formats",
        passed: true,
        detail: format!("input: {}; output: {}", INPUT_FORMATS.join(", "), outputs.join(", ")),
    }
}

/// Run every check, in display order.
pub fn run_checks(font_family: &str) -> Vec<Check> {
    vec![
        check_toolchain(BUILD_RUSTC, MIN_RUST),
        formats_check(),
        check_font(font_family),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rustc_banner() {
        assert_eq!(parse_version("rustc 1.83.0 (90b35a623 2024-11-26)"), Some((1, 83, 0)));
        assert_eq!(parse_version("1.80"), Some((1, 80, 0)));
        assert_eq!(parse_version("rustc 1.85.0-nightly (abc 2024-12-01)"), Some((1, 85, 0)));
        assert_eq!(parse_version("unknown"), None);
    }

    #[test]
    fn toolchain_comparison() {
        assert!(check_toolchain("rustc 1.83.0 (x)", "1.80").passed);
        assert!(check_toolchain("rustc 1.80.0 (x)", "1.80").passed);
        assert!(!check_toolchain("rustc 1.79.1 (x)", "1.80").passed);
        assert!(!check_toolchain("unknown", "1.80").passed);
    }

    #[test]
    fn formats_always_pass() {
        let c = formats_check();
        assert!(c.passed);
        assert!(c.detail.contains("parquet"));
        assert!(c.detail.contains("svg"));
    }
}
