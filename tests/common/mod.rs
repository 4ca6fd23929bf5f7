/*!
 * Common test utilities for the svg-slicer test suite
 */

use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Result;
use tempfile::TempDir;

// Re-export the mock surface module
pub mod mock_surface;

/// Header used by slicer-generated test drawings
pub const DRAWING_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.0//EN" "http://www.w3.org/TR/2001/REC-SVG-20010904/DTD/svg10.dtd">
<svg width="23.838" height="23.838" xmlns="http://www.w3.org/2000/svg" xmlns:svg="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" xmlns:slic3r="http://slic3r.org/namespaces/slic3r">
"#;

/// Routes library log output through the test harness
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Markup of one layer group as it appears in a test drawing
pub fn layer_markup(id: i32, body: &str) -> String {
    format!("<g id=\"layer{}\" slic3r:z=\"{}\">{}</g>", id, (id + 1) * 2, body)
}

/// A drawing whose layer `i` has id `i` and content `bodies[i]`
pub fn layered_svg(bodies: &[&str]) -> String {
    let layers: Vec<(i32, &str)> = bodies.iter()
        .enumerate()
        .map(|(i, body)| (i as i32, *body))
        .collect();
    layered_svg_with_ids(&layers)
}

/// A drawing with explicit layer ids, in the given order
pub fn layered_svg_with_ids(layers: &[(i32, &str)]) -> String {
    let mut svg = String::from(DRAWING_HEADER);
    for (id, body) in layers {
        svg.push_str("  ");
        svg.push_str(&layer_markup(*id, body));
        svg.push('\n');
    }
    svg.push_str("</svg>\n");
    svg
}

/// Writes a drawing with layers `0..bodies.len()` to the directory
pub fn create_test_drawing(dir: &Path, filename: &str, bodies: &[&str]) -> Result<PathBuf> {
    create_test_file(dir, filename, &layered_svg(bodies))
}
