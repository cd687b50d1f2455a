//! SVG delta badges referenced by the markdown report

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const UP_COLOR: &str = "#34d058";
const DOWN_COLOR: &str = "#c34349";
const ZERO_COLOR: &str = "#444D56";

/// Largest delta a badge exists for, in tenths of a percent
const MAX_TENTHS: u32 = 1000;

/// Render a 60x20 badge showing `label%`
pub fn render_svg(label: &str, color: &str) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="60" height="20">
  <g font-family="&#39;DejaVu Sans&#39;,Verdana,Geneva,sans-serif" font-size="11">
    <path d="M0,0 L60,0 L60,20 L0,20 L0,0 Z" fill="{color}" fill-rule="nonzero"></path>
    <text x="50%" text-anchor="middle" fill="#010101" fill-opacity=".3">
      <tspan y="15">{label}%</tspan>
    </text>
    <text x="50%" text-anchor="middle" fill="#FFFFFF">
      <tspan y="14">{label}%</tspan>
    </text>
  </g>
</svg>
"##
    )
}

/// Path of the badge for a delta of `tenths / 10` percent, relative to the asset root
pub fn badge_path(up: bool, tenths: u32) -> PathBuf {
    if tenths == 0 {
        return PathBuf::from("0.svg");
    }

    let (n, m) = (tenths / 10, tenths % 10);
    let dir = if up { "up" } else { "down" };
    Path::new(dir).join(n.to_string()).join(format!("{}.{}.svg", n, m))
}

/// Write every badge from -100.0% to +100.0% in 0.1 steps under `out_dir`.
///
/// Returns the number of files written.
pub fn generate_badges(out_dir: &Path) -> Result<usize> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    write_badge(&out_dir.join(badge_path(true, 0)), "0", ZERO_COLOR)?;
    let mut written = 1;

    for (up, sign, color) in [(true, '+', UP_COLOR), (false, '-', DOWN_COLOR)] {
        for tenths in 1..=MAX_TENTHS {
            let label = format!("{}{}.{}", sign, tenths / 10, tenths % 10);
            write_badge(&out_dir.join(badge_path(up, tenths)), &label, color)?;
            written += 1;
        }
    }

    tracing::info!(dir = %out_dir.display(), written, "generated badges");

    Ok(written)
}

fn write_badge(path: &Path, label: &str, color: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, render_svg(label, color))
        .with_context(|| format!("Failed to write {}", path.display()))
}
