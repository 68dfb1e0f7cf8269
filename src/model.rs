use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Error, bail};
use clap::ValueEnum;
use serde::Serialize;

use crate::rubric::PageMetrics;

pub const INDEX_FILE_NAME: &str = "index.md";

/// Importance tier of a page; selects the requirement profile it is graded against.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    High,
    Medium,
    Low,
    Index,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::High, Tier::Medium, Tier::Low, Tier::Index];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Index => "index",
        }
    }

    pub fn requirements(self) -> &'static RequirementProfile {
        &REQUIREMENTS[self as usize]
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            "index" => Ok(Self::Index),
            other => bail!("unknown importance tier '{other}' (expected high, medium, low or index)"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RequirementProfile {
    pub min_words: usize,
    pub min_diagrams: usize,
    pub min_diagram_types: usize,
    pub min_snippets: usize,
    pub min_sources_lines: usize,
    pub sources_need_line_numbers: bool,
    pub min_sections: usize,
    pub min_tables: usize,
}

// Indexed by `Tier as usize`.
const REQUIREMENTS: [RequirementProfile; 4] = [
    RequirementProfile {
        min_words: 1200,
        min_diagrams: 2,
        min_diagram_types: 2,
        min_snippets: 5,
        min_sources_lines: 4,
        sources_need_line_numbers: true,
        min_sections: 4,
        min_tables: 1,
    },
    RequirementProfile {
        min_words: 600,
        min_diagrams: 1,
        min_diagram_types: 1,
        min_snippets: 3,
        min_sources_lines: 3,
        sources_need_line_numbers: true,
        min_sections: 3,
        min_tables: 0,
    },
    RequirementProfile {
        min_words: 300,
        min_diagrams: 1,
        min_diagram_types: 1,
        min_snippets: 1,
        min_sources_lines: 2,
        sources_need_line_numbers: true,
        min_sections: 2,
        min_tables: 0,
    },
    RequirementProfile {
        min_words: 200,
        min_diagrams: 1,
        min_diagram_types: 1,
        min_snippets: 0,
        min_sources_lines: 0,
        sources_need_line_numbers: false,
        min_sections: 2,
        min_tables: 0,
    },
];

/// Corpus size class used by the structural checks.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Small,
    Medium,
    Large,
}

impl Scale {
    pub const ALL: [Scale; 3] = [Scale::Small, Scale::Medium, Scale::Large];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    pub fn guideline(self) -> &'static ScaleGuideline {
        &SCALE_GUIDELINES[self as usize]
    }

    pub fn infer(page_count: usize) -> Self {
        if page_count <= 15 {
            Self::Small
        } else if page_count <= 30 {
            Self::Medium
        } else {
            Self::Large
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scale {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            other => bail!("unknown corpus scale '{other}' (expected small, medium or large)"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScaleGuideline {
    pub file_count: &'static str,
    pub min_sections: usize,
    pub max_sections: usize,
    pub min_pages: usize,
    pub max_pages: usize,
}

// Indexed by `Scale as usize`.
const SCALE_GUIDELINES: [ScaleGuideline; 3] = [
    ScaleGuideline {
        file_count: "<30",
        min_sections: 3,
        max_sections: 4,
        min_pages: 8,
        max_pages: 15,
    },
    ScaleGuideline {
        file_count: "30-200",
        min_sections: 4,
        max_sections: 6,
        min_pages: 15,
        max_pages: 30,
    },
    ScaleGuideline {
        file_count: ">200",
        min_sections: 6,
        max_sections: 8,
        min_pages: 30,
        max_pages: 50,
    },
];

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SectionDefinition {
    pub number: u32,
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

pub const SECTIONS: [SectionDefinition; 6] = [
    SectionDefinition {
        number: 1,
        name: "Overview",
        required: true,
        description: "Architecture overview and project layout",
    },
    SectionDefinition {
        number: 2,
        name: "Getting Started",
        required: true,
        description: "Installation, setup, authentication and configuration",
    },
    SectionDefinition {
        number: 3,
        name: "User Guide",
        required: true,
        description: "User-facing features (CLI, UI, workflows)",
    },
    SectionDefinition {
        number: 4,
        name: "Core Systems",
        required: true,
        description: "Major internal modules and architecture",
    },
    SectionDefinition {
        number: 5,
        name: "Advanced Topics",
        required: false,
        description: "Extensibility, security, plugins and observability",
    },
    SectionDefinition {
        number: 6,
        name: "Development",
        required: false,
        description: "Development environment, build and test",
    },
];

pub fn section_definition(number: u32) -> Option<&'static SectionDefinition> {
    SECTIONS.iter().find(|section| section.number == number)
}

/// Leading integer of a page file name (`4.2-storage.md` -> 4).
pub fn section_number(file_name: &str) -> Option<u32> {
    let digits = file_name
        .chars()
        .take_while(|ch| ch.is_ascii_digit())
        .collect::<String>();
    digits.parse::<u32>().ok()
}

pub fn file_name_of(file: &str) -> &str {
    Path::new(file)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file)
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            Self::A
        } else if percentage >= 75.0 {
            Self::B
        } else if percentage >= 60.0 {
            Self::C
        } else if percentage >= 40.0 {
            Self::D
        } else {
            Self::F
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }

    pub fn is_good(self) -> bool {
        matches!(self, Self::A | Self::B)
    }

    pub fn needs_attention(self) -> bool {
        matches!(self, Self::C | Self::D | Self::F)
    }

    pub fn is_failing(self) -> bool {
        matches!(self, Self::D | Self::F)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn percentage(score: u32, max_score: u32) -> f64 {
    if max_score == 0 {
        0.0
    } else {
        f64::from(score) / f64::from(max_score) * 100.0
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
}

impl Severity {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Critical => "❌",
            Self::Warning => "⚠️ ",
        }
    }
}

pub const PASS_SYMBOL: &str = "✅";

/// One rubric criterion. Weights sum to 95.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    WordCount,
    DiagramCount,
    DiagramDiversity,
    SnippetCount,
    CitationRatio,
    SourcesPresence,
    SourcesPrecision,
    SectionCount,
    OverviewParagraph,
    DiagramSpecificity,
    RelatedLinks,
    Tables,
}

impl Criterion {
    pub const ALL: [Criterion; 12] = [
        Criterion::WordCount,
        Criterion::DiagramCount,
        Criterion::DiagramDiversity,
        Criterion::SnippetCount,
        Criterion::CitationRatio,
        Criterion::SourcesPresence,
        Criterion::SourcesPrecision,
        Criterion::SectionCount,
        Criterion::OverviewParagraph,
        Criterion::DiagramSpecificity,
        Criterion::RelatedLinks,
        Criterion::Tables,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WordCount => "word_count",
            Self::DiagramCount => "diagram_count",
            Self::DiagramDiversity => "diagram_diversity",
            Self::SnippetCount => "snippet_count",
            Self::CitationRatio => "citation_ratio",
            Self::SourcesPresence => "sources_presence",
            Self::SourcesPrecision => "sources_precision",
            Self::SectionCount => "section_count",
            Self::OverviewParagraph => "overview_paragraph",
            Self::DiagramSpecificity => "diagram_specificity",
            Self::RelatedLinks => "related_links",
            Self::Tables => "tables",
        }
    }

    pub fn weight(self) -> u32 {
        match self {
            Self::WordCount | Self::SnippetCount => 15,
            Self::DiagramCount | Self::SourcesPresence | Self::SourcesPrecision => 10,
            Self::DiagramDiversity
            | Self::CitationRatio
            | Self::SectionCount
            | Self::OverviewParagraph
            | Self::DiagramSpecificity
            | Self::RelatedLinks
            | Self::Tables => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageIssue {
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criterion: Option<Criterion>,
    pub message: String,
}

impl fmt::Display for PageIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.severity.symbol(), self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageResult {
    pub file: String,
    pub tier: Tier,
    pub score: u32,
    pub max_score: u32,
    pub issues: Vec<PageIssue>,
    pub passes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_sha256: Option<String>,
    pub metrics: PageMetrics,
}

impl PageResult {
    pub fn percentage(&self) -> f64 {
        percentage(self.score, self.max_score)
    }

    pub fn grade(&self) -> Grade {
        Grade::from_percentage(self.percentage())
    }

    pub fn file_name(&self) -> &str {
        file_name_of(&self.file)
    }

    pub fn is_index(&self) -> bool {
        self.file_name() == INDEX_FILE_NAME
    }

    pub fn critical_issues(&self) -> impl Iterator<Item = &PageIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Critical)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructureIssueKind {
    PageCountHigh,
    PageCountLow,
    PageCountShortfall,
    MissingRequiredSection { number: u32 },
    MissingOptionalSection { number: u32 },
    EmptyCorpus,
    CoreRatio,
    SectionCount,
    GradeDistribution,
    FailingPages { count: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureIssue {
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: StructureIssueKind,
    pub message: String,
}

impl fmt::Display for StructureIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.severity.symbol(), self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureResult {
    pub scale: Scale,
    pub page_count: usize,
    pub score: u32,
    pub max_score: u32,
    pub issues: Vec<StructureIssue>,
    pub passes: Vec<String>,
    pub sections: BTreeMap<u32, Vec<String>>,
    pub unclassified: Vec<String>,
}

impl StructureResult {
    pub fn percentage(&self) -> f64 {
        percentage(self.score, self.max_score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionKind {
    AddSection,
    AddPages,
    FixFailingPage,
    ImprovePage,
}

impl InstructionKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::AddSection => "structure: add section",
            Self::AddPages => "structure: add pages",
            Self::FixFailingPage => "page fix",
            Self::ImprovePage => "page improvement",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub priority: usize,
    pub kind: InstructionKind,
    pub target: String,
    pub summary: String,
    pub actions: Vec<String>,
}
