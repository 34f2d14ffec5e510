use std::fmt::Write;

use crate::pipeline::Recognition;

pub fn render_report(recognition: &Recognition) -> String {
    let mut out = String::from("Top detected sounds:\n");
    for ranked in &recognition.top_labels {
        let _ = writeln!(out, "- {} ({:.3})", ranked.label.path(), ranked.score);
    }
    out.push_str("\nMost probable sound detected:\n");
    out.push_str(&recognition.most_specific);
    out.push('\n');
    out
}
