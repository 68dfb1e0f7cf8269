use std::io::{self, Write};

use anyhow::Result;
use serde::Serialize;

use crate::cli::RubricArgs;
use crate::model::{
    Criterion, RequirementProfile, SECTIONS, Scale, ScaleGuideline, SectionDefinition, Tier,
};
use crate::report::write_json;

#[derive(Debug, Serialize)]
struct TierProfile {
    tier: Tier,
    #[serde(flatten)]
    requirements: &'static RequirementProfile,
}

#[derive(Debug, Serialize)]
struct ScaleProfile {
    scale: Scale,
    #[serde(flatten)]
    guideline: &'static ScaleGuideline,
}

#[derive(Debug, Serialize)]
struct CriterionWeight {
    criterion: Criterion,
    weight: u32,
}

#[derive(Debug, Serialize)]
struct RubricDocument {
    tiers: Vec<TierProfile>,
    scales: Vec<ScaleProfile>,
    sections: &'static [SectionDefinition],
    criteria: Vec<CriterionWeight>,
}

impl RubricDocument {
    fn collect() -> Self {
        Self {
            tiers: Tier::ALL
                .iter()
                .map(|tier| TierProfile {
                    tier: *tier,
                    requirements: tier.requirements(),
                })
                .collect(),
            scales: Scale::ALL
                .iter()
                .map(|scale| ScaleProfile {
                    scale: *scale,
                    guideline: scale.guideline(),
                })
                .collect(),
            sections: &SECTIONS,
            criteria: Criterion::ALL
                .iter()
                .map(|criterion| CriterionWeight {
                    criterion: *criterion,
                    weight: criterion.weight(),
                })
                .collect(),
        }
    }
}

pub fn run(args: RubricArgs) -> Result<()> {
    let document = RubricDocument::collect();
    let mut output = io::BufWriter::new(io::stdout().lock());

    if args.json {
        write_json(&mut output, &document)?;
    } else {
        write_text(&mut output, &document)?;
    }

    output.flush()?;
    Ok(())
}

fn write_text<W: Write>(output: &mut W, document: &RubricDocument) -> Result<()> {
    writeln!(output, "Requirement profiles:")?;
    writeln!(
        output,
        "  {:<7} {:>6} {:>9} {:>6} {:>9} {:>8} {:>6} {:>9} {:>7}",
        "tier", "words", "diagrams", "types", "snippets", "sources", "L#", "sections", "tables"
    )?;
    for profile in &document.tiers {
        let req = profile.requirements;
        writeln!(
            output,
            "  {:<7} {:>6} {:>9} {:>6} {:>9} {:>8} {:>6} {:>9} {:>7}",
            profile.tier.as_str(),
            req.min_words,
            req.min_diagrams,
            req.min_diagram_types,
            req.min_snippets,
            req.min_sources_lines,
            if req.sources_need_line_numbers { "yes" } else { "no" },
            req.min_sections,
            req.min_tables
        )?;
    }
    writeln!(output)?;

    writeln!(output, "Scale guidelines:")?;
    for profile in &document.scales {
        let guideline = profile.guideline;
        writeln!(
            output,
            "  {:<7} source files {:<7} sections {}-{}  pages {}-{}",
            profile.scale.as_str(),
            guideline.file_count,
            guideline.min_sections,
            guideline.max_sections,
            guideline.min_pages,
            guideline.max_pages
        )?;
    }
    writeln!(output)?;

    writeln!(output, "Sections (★ required):")?;
    for section in document.sections {
        writeln!(
            output,
            "  {} {}. {}: {}",
            if section.required { "★" } else { " " },
            section.number,
            section.name,
            section.description
        )?;
    }
    writeln!(output)?;

    writeln!(output, "Criteria:")?;
    for entry in &document.criteria {
        writeln!(output, "  {:<20} {:>3}", entry.criterion.as_str(), entry.weight)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{RubricDocument, write_text};

    #[test]
    fn criterion_weights_sum_to_ninety_five() {
        let document = RubricDocument::collect();
        let total = document.criteria.iter().map(|entry| entry.weight).sum::<u32>();
        assert_eq!(total, 95);
    }

    #[test]
    fn json_document_flattens_profiles() {
        let document = RubricDocument::collect();
        let value = serde_json::to_value(&document).expect("rubric should serialize");

        assert_eq!(value["tiers"][0]["tier"], serde_json::json!("high"));
        assert_eq!(value["tiers"][0]["min_words"], serde_json::json!(1200));
        assert_eq!(value["scales"][2]["max_pages"], serde_json::json!(50));
        assert_eq!(value["sections"][3]["name"], serde_json::json!("Core Systems"));
    }

    #[test]
    fn text_listing_marks_required_sections() {
        let mut output = Vec::new();
        write_text(&mut output, &RubricDocument::collect()).expect("render should succeed");
        let text = String::from_utf8(output).expect("output should be utf-8");

        assert!(text.contains("★ 1. Overview"), "unexpected output: {text}");
        assert!(text.contains("  5. Advanced Topics"));
    }
}
