use std::io::{self, Write};

use anyhow::{Result, bail};
use tracing::info;

use crate::cli::PageArgs;
use crate::config::resolve_tier_override;
use crate::corpus::evaluate_file;
use crate::remediation::generate_instructions;
use crate::report::{QualityReport, write_instructions, write_json, write_page_result};
use crate::rubric::MarkdownPatterns;
use crate::util::{now_utc_string, write_json_pretty};

pub fn run(args: PageArgs) -> Result<bool> {
    let tier = resolve_tier_override(args.importance)?;
    if !args.file.is_file() {
        bail!("page not found: {}", args.file.display());
    }

    info!(
        path = %args.file.display(),
        tier = tier.map(|tier| tier.as_str()).unwrap_or("auto"),
        "evaluating page"
    );

    let patterns = MarkdownPatterns::compile()?;
    let pages = vec![evaluate_file(&args.file, tier, &patterns)];
    let page = &pages[0];
    let grade = page.grade();

    let instructions = if grade.needs_attention() {
        generate_instructions(&pages, None)
    } else {
        Vec::new()
    };

    let report = QualityReport::new(
        now_utc_string(),
        args.file.display().to_string(),
        &pages,
        None,
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
        write_page_result(&mut output, page)?;
        if grade.needs_attention() {
            write_instructions(&mut output, &instructions)?;
        }
    }
    output.flush()?;

    info!(
        tier = %page.tier,
        grade = %grade,
        score = page.score,
        max_score = page.max_score,
        passed = report.passed,
        "page evaluated"
    );

    Ok(report.passed)
}
