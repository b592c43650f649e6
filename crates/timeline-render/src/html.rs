//! Self-contained HTML document around the chart.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

use timeline_core::{ChangeSize, TimelineError};
use timeline_history::CommitDataset;

use crate::chart::{escape, render_svg, series, SeriesKey};

const STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 24px; color: #2a3f5f; }
h1 { font-size: 20px; margin: 0 0 4px; }
p.summary { margin: 0 0 16px; color: #506784; }
.layout { display: flex; gap: 24px; align-items: flex-start; }
.chart { flex: 1; min-width: 0; }
.legend { font-size: 13px; min-width: 180px; }
.legend h2 { font-size: 13px; margin: 12px 0 4px; text-transform: uppercase; color: #506784; }
.legend label { display: block; cursor: pointer; padding: 2px 0; }
.legend .swatch { display: inline-block; width: 10px; height: 10px; border-radius: 50%; margin-right: 6px; }
.tick { font-size: 11px; fill: #506784; }
.axis-title { font-size: 13px; fill: #2a3f5f; }
circle.commit:hover { stroke: #2a3f5f; stroke-width: 2; }
.hidden, .out { display: none; }
.zoom { font-size: 13px; color: #506784; margin: 8px 0 0 70px; }
.zoom input { vertical-align: middle; width: 40%; }
"#;

const SCRIPT: &str = r#"
document.querySelectorAll('.legend input').forEach(function (box) {
  box.addEventListener('change', function () {
    document.querySelectorAll('.repo-' + box.dataset.series).forEach(function (dot) {
      dot.classList.toggle('hidden', !box.checked);
    });
  });
});

var svg = document.querySelector('.chart svg');
var from = document.getElementById('zoom-from');
var to = document.getElementById('zoom-to');
function zoom() {
  var lo = Math.min(from.value, to.value) / 1000;
  var hi = Math.max(from.value, to.value) / 1000;
  if (hi - lo < 0.01) { hi = Math.min(1, lo + 0.01); lo = hi - 0.01; }
  var left = parseFloat(svg.dataset.left);
  var width = parseFloat(svg.dataset.width);
  svg.querySelectorAll('[data-x]').forEach(function (el) {
    var f = (parseFloat(el.dataset.x) - lo) / (hi - lo);
    var px = (left + width * f).toFixed(1);
    el.classList.toggle('out', f < 0 || f > 1);
    if (el.tagName === 'circle') {
      el.setAttribute('cx', px);
    } else {
      el.setAttribute('transform', 'translate(' + px + ' 0)');
    }
  });
}
from.addEventListener('input', zoom);
to.addEventListener('input', zoom);
"#;

/// Two sliders selecting the visible part of the date axis.
const ZOOM: &str = r#"<div class="zoom">Date range
<input type="range" id="zoom-from" min="0" max="1000" value="0" aria-label="range start">
<input type="range" id="zoom-to" min="0" max="1000" value="1000" aria-label="range end">
</div>
"#;

/// Render the dataset as a complete HTML page.
///
/// The output depends only on the dataset and `span_days`, so unchanged
/// input produces identical bytes.
///
/// # Errors
///
/// Returns [`TimelineError::Config`] if the display window cannot be represented.
pub fn render_html(dataset: &CommitDataset, span_days: u32) -> Result<String, TimelineError> {
    let window = dataset.display_window(span_days)?;
    let keys = series(dataset);
    let svg = render_svg(dataset, window, &keys);

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>Commit History Timeline</title>\n");
    let _ = writeln!(out, "<style>{STYLE}</style>");
    out.push_str("</head>\n<body>\n<h1>Commit History Timeline</h1>\n");
    let _ = writeln!(
        out,
        r#"<p class="summary">{} commits in {} repositories, {} to {}. {}</p>"#,
        dataset.len(),
        keys.len(),
        window.start.format("%Y-%m-%d"),
        window.end.format("%Y-%m-%d"),
        size_summary(dataset),
    );
    out.push_str("<div class=\"layout\">\n<div class=\"chart\">\n");
    out.push_str(&svg);
    out.push_str(ZOOM);
    out.push_str("</div>\n");
    out.push_str(&legend(&keys));
    out.push_str("</div>\n");
    let _ = writeln!(out, "<script>{SCRIPT}</script>");
    out.push_str("</body>\n</html>\n");
    Ok(out)
}

/// Render the dataset and write it to `path`, replacing any previous file.
///
/// Nothing is written unless rendering completed.
///
/// # Errors
///
/// Returns [`TimelineError::Io`] if the parent directory cannot be created
/// or the file cannot be written, and any error from [`render_html`].
pub fn write_report(
    dataset: &CommitDataset,
    span_days: u32,
    path: &Path,
) -> Result<(), TimelineError> {
    let html = render_html(dataset, span_days)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    tracing::info!(path = %path.display(), commits = dataset.len(), "wrote timeline");
    Ok(())
}

fn size_summary(dataset: &CommitDataset) -> String {
    let mut counts: BTreeMap<ChangeSize, usize> = BTreeMap::new();
    for record in dataset.chronological() {
        *counts.entry(record.change_size).or_default() += 1;
    }
    counts
        .iter()
        .map(|(size, n)| format!("{n} {size}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn legend(keys: &[SeriesKey]) -> String {
    let mut out = String::from("<div class=\"legend\">\n");
    let mut current_group: Option<&str> = None;
    for key in keys {
        if current_group != Some(key.group.as_str()) {
            let _ = writeln!(out, "<h2>{}</h2>", escape(&key.group));
            current_group = Some(key.group.as_str());
        }
        let _ = writeln!(
            out,
            r#"<label><input type="checkbox" checked data-series="{}"><span class="swatch" style="background:{}"></span>{}</label>"#,
            key.index,
            key.color,
            escape(&key.repo),
        );
    }
    out.push_str("</div>\n");
    out
}
