use std::io::{self, Write};

use anyhow::{Result, bail};
use tracing::info;

use crate::cli::WikiArgs;
use crate::config::{resolve_scale_override, resolve_tier_override};
use crate::corpus::{discover_pages, evaluate_files};
use crate::remediation::generate_instructions;
use crate::report::{
    QualityReport, write_instructions, write_json, write_page_result, write_structure_result,
    write_summary,
};
use crate::rubric::MarkdownPatterns;
use crate::structure::validate_corpus;
use crate::util::{now_utc_string, write_json_pretty};

pub fn run(args: WikiArgs) -> Result<bool> {
    let tier = resolve_tier_override(args.importance)?;
    let scale = resolve_scale_override(args.scale)?;
    if !args.dir.is_dir() {
        bail!("wiki directory not found: {}", args.dir.display());
    }

    let paths = discover_pages(&args.dir)?;
    info!(
        dir = %args.dir.display(),
        pages = paths.len(),
        tier = tier.map(|tier| tier.as_str()).unwrap_or("auto"),
        scale = scale.map(|scale| scale.as_str()).unwrap_or("auto"),
        "evaluating wiki"
    );

    let patterns = MarkdownPatterns::compile()?;
    let pages = evaluate_files(&paths, tier, &patterns);
    let structure = validate_corpus(&pages, scale);
    let instructions = generate_instructions(&pages, Some(&structure));

    let report = QualityReport::new(
        now_utc_string(),
        args.dir.display().to_string(),
        &pages,
        Some(&structure),
        &instructions,
    );

    if let Some(path) = &args.report_path {
        write_json_pretty(path, &report)?;
        info!(path = %path.display(), "wrote quality report");
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        write_json(&mut output, &report)?;
    } else {
        for page in &pages {
            write_page_result(&mut output, page)?;
        }
        write_summary(&mut output, &pages)?;
        write_structure_result(&mut output, &structure)?;

        let needs_attention = !structure.issues.is_empty()
            || pages.iter().any(|page| page.grade().needs_attention());
        if needs_attention {
            write_instructions(&mut output, &instructions)?;
        }
    }
    output.flush()?;

    info!(
        scale = %structure.scale,
        pages = pages.len(),
        structure_score = structure.score,
        structure_max_score = structure.max_score,
        instructions = instructions.len(),
        passed = report.passed,
        "wiki evaluated"
    );

    Ok(report.passed)
}
