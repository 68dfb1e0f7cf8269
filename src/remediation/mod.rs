use std::collections::HashSet;

use crate::model::{
    Criterion, Instruction, InstructionKind, PageResult, Severity, StructureIssueKind,
    StructureResult, section_definition,
};


/// Actions within one page are considered duplicates when they share this
/// many leading characters.
pub const DEDUP_PREFIX_CHARS: usize = 30;

const SNIPPETS_ACTION: &str = "Add code snippets: re-read the target source files and excerpt the main type definitions, interfaces and key method signatures. \
Start every snippet with a `// path/to/file.ts:L<line>` source comment.";
const CITATIONS_ACTION: &str = "Cite every snippet: add a `// path/to/file.ts:L<line>` comment naming the file and line the excerpt came from.";
const DEPTH_ACTION: &str = "Deepen the content: explain the design patterns in use and where they apply, \
describe the data flow from input through processing to output, and cover edge cases and error handling.";
const DIAGRAMS_ACTION: &str = "Add Mermaid diagrams: a flowchart for the processing flow and a sequenceDiagram for module interaction. \
Label nodes with real class and function names.";
const SOURCES_ACTION: &str = "Add a Sources line at the end of each section, e.g. **Sources:** [file.ts:L100-L200](file:///path#L100-L200). \
Cite only ranges actually read, at most 200 lines each.";
const TABLES_ACTION: &str = "Add tables for enum values, constant groups, component responsibilities and configuration parameters.";
const DIAGRAM_VARIETY_ACTION: &str = "Vary the Mermaid diagram types: use sequenceDiagram and stateDiagram-v2 alongside graph TD, \
and replace generic node labels with real class names.";
const PRECISION_ACTION: &str = "Tighten Sources line numbers: ranges such as L1-L1000 are rejected; \
cite the actual line span of the referenced function or class, at most 200 lines.";

const SECTION_WORKFLOW_ACTION: &str = "Analyze the relevant source files first, list at least five snippet candidates, then write the pages.";

/// Structural instructions first, then pages graded C or worse, worst first.
/// An empty list means the wiki is compliant.
pub fn generate_instructions(
    pages: &[PageResult],
    structure: Option<&StructureResult>,
) -> Vec<Instruction> {
    let mut list = InstructionList::default();

    if let Some(structure) = structure {
        add_structural_instructions(&mut list, pages, structure);
    }

    let mut problem_pages = pages
        .iter()
        .filter(|page| !page.is_index() && page.grade().needs_attention())
        .collect::<Vec<&PageResult>>();
    problem_pages.sort_by(|left, right| left.percentage().total_cmp(&right.percentage()));

    for page in problem_pages {
        let actions = page_actions(page);
        if actions.is_empty() {
            continue;
        }
        list.push(
            InstructionKind::ImprovePage,
            page.file_name().to_string(),
            format!("Grade {}, {:.0}%", page.grade(), page.percentage()),
            actions,
        );
    }

    list.items
}

#[derive(Debug, Default)]
struct InstructionList {
    items: Vec<Instruction>,
}

impl InstructionList {
    fn push(&mut self, kind: InstructionKind, target: String, summary: String, actions: Vec<String>) {
        self.items.push(Instruction {
            priority: self.items.len() + 1,
            kind,
            target,
            summary,
            actions,
        });
    }
}

fn add_structural_instructions(
    list: &mut InstructionList,
    pages: &[PageResult],
    structure: &StructureResult,
) {
    for issue in &structure.issues {
        match issue.kind {
            StructureIssueKind::MissingRequiredSection { number } => {
                let Some(section) = section_definition(number) else {
                    continue;
                };
                let slug = section.name.to_lowercase().replace(' ', "-");
                list.push(
                    InstructionKind::AddSection,
                    format!("Section {number} ({})", section.name),
                    format!("Create Section {number} ({}): {}", section.name, section.description),
                    vec![
                        format!("Content: {}", section.description),
                        format!("Example file name: {number}.1-{slug}.md"),
                        SECTION_WORKFLOW_ACTION.to_string(),
                    ],
                );
            }
            StructureIssueKind::PageCountShortfall => {
                list.push(
                    InstructionKind::AddPages,
                    "wiki".to_string(),
                    "The wiki has too few pages".to_string(),
                    vec![
                        "Split Core Systems (Section 4) pages so that each module gets its own page, especially pages covering several modules.".to_string(),
                        "Check whether User Guide (Section 3) can gain one page per user-facing feature.".to_string(),
                    ],
                );
            }
            StructureIssueKind::FailingPages { .. } => {
                for page in pages
                    .iter()
                    .filter(|page| !page.is_index() && page.grade().is_failing())
                {
                    list.push(
                        InstructionKind::FixFailingPage,
                        page.file_name().to_string(),
                        format!(
                            "Grade {} ({:.0}%): fix the following",
                            page.grade(),
                            page.percentage()
                        ),
                        page.critical_issues()
                            .map(|issue| issue.to_string())
                            .collect(),
                    );
                }
            }
            _ => {}
        }
    }
}

fn critical_action(criterion: Criterion) -> Option<&'static str> {
    match criterion {
        Criterion::SnippetCount => Some(SNIPPETS_ACTION),
        Criterion::CitationRatio => Some(CITATIONS_ACTION),
        Criterion::WordCount => Some(DEPTH_ACTION),
        Criterion::DiagramCount | Criterion::DiagramDiversity => Some(DIAGRAMS_ACTION),
        Criterion::SourcesPresence | Criterion::SourcesPrecision => Some(SOURCES_ACTION),
        Criterion::Tables => Some(TABLES_ACTION),
        _ => None,
    }
}

fn warning_action(criterion: Criterion) -> Option<&'static str> {
    match criterion {
        Criterion::DiagramDiversity | Criterion::DiagramSpecificity => Some(DIAGRAM_VARIETY_ACTION),
        Criterion::SourcesPrecision => Some(PRECISION_ACTION),
        _ => None,
    }
}

fn page_actions(page: &PageResult) -> Vec<String> {
    let critical = page
        .issues
        .iter()
        .filter(|issue| issue.severity == Severity::Critical)
        .filter_map(|issue| issue.criterion.and_then(critical_action));
    let warnings = page
        .issues
        .iter()
        .filter(|issue| issue.severity == Severity::Warning)
        .filter_map(|issue| issue.criterion.and_then(warning_action));

    dedup_by_prefix(critical.chain(warnings))
}

fn dedup_by_prefix<'a>(actions: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    actions
        .filter(|action| seen.insert(action.chars().take(DEDUP_PREFIX_CHARS).collect::<String>()))
        .map(ToOwned::to_owned)
        .collect()
}
