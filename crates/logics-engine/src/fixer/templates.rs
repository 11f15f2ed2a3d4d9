//! Declarative section templates
//!
//! Every kind has an ordered list of required sections. Each section names the
//! anchors it is inserted before when it is missing; the first anchor present
//! wins, otherwise the section goes to the end of the document. Optional
//! [`SectionPack`]s use the same representation.

use logics_model::DocKind;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Where a missing section is inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Append at the end of the document
    End,
    /// Before the first of these headers that exists, else at the end
    Before(&'static [&'static str]),
}

/// A section the fixer can insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionTemplate {
    /// Header line, e.g. `# Plan`
    pub header: &'static str,
    /// Default body lines
    pub body: &'static [&'static str],
    /// Insertion point
    pub placement: Placement,
}

/// Required skeleton of one kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindTemplate {
    /// Kind this template applies to
    pub kind: DocKind,
    /// Required sections in template order
    pub sections: &'static [SectionTemplate],
    /// Section receiving connector-provided body text on creation
    pub primary: &'static str,
}

impl KindTemplate {
    /// Required section headers in order
    pub fn headers(&self) -> impl Iterator<Item = &'static str> {
        self.sections.iter().map(|s| s.header)
    }
}

const fn section(
    header: &'static str,
    body: &'static [&'static str],
    placement: Placement,
) -> SectionTemplate {
    SectionTemplate {
        header,
        body,
        placement,
    }
}

static REQUEST: KindTemplate = KindTemplate {
    kind: DocKind::Request,
    primary: "# Context",
    sections: &[
        section(
            "# Needs",
            &["- Describe the need"],
            Placement::Before(&["# Context", "# Backlog"]),
        ),
        section(
            "# Context",
            &["Add context and constraints."],
            Placement::Before(&["# Backlog"]),
        ),
        section("# Backlog", &["- (none yet)"], Placement::End),
    ],
};

static BACKLOG: KindTemplate = KindTemplate {
    kind: DocKind::Backlog,
    primary: "# Problem",
    sections: &[
        section(
            "# Problem",
            &["Describe the problem and user impact."],
            Placement::Before(&["# Scope", "# Acceptance criteria", "# Priority", "# Notes"]),
        ),
        section(
            "# Scope",
            &["- In:", "- Out:"],
            Placement::Before(&["# Acceptance criteria", "# Priority", "# Notes"]),
        ),
        section(
            "# Acceptance criteria",
            &["- Define acceptance criteria"],
            Placement::Before(&["# Priority", "# Notes"]),
        ),
        section(
            "# Priority",
            &["- Impact:", "- Urgency:"],
            Placement::Before(&["# Notes"]),
        ),
        section("# Notes", &[], Placement::End),
    ],
};

static TASK: KindTemplate = KindTemplate {
    kind: DocKind::Task,
    primary: "# Context",
    sections: &[
        section(
            "# Context",
            &["Derived from: <backlog item>"],
            Placement::Before(&["# Plan", "# Validation", "# Report", "# Notes"]),
        ),
        section(
            "# Plan",
            &["- [ ] First implementation step", "- [ ] Second implementation step"],
            Placement::Before(&["# Validation", "# Report", "# Notes"]),
        ),
        section(
            "# Validation",
            &["- npm run tests", "- npm run lint"],
            Placement::Before(&["# Report", "# Notes"]),
        ),
        section("# Report", &["- "], Placement::Before(&["# Notes"])),
        section("# Notes", &[], Placement::End),
    ],
};

static SPEC: KindTemplate = KindTemplate {
    kind: DocKind::Spec,
    primary: "# Overview",
    sections: &[
        section(
            "# Overview",
            &["Describe the user-facing behavior and context."],
            Placement::Before(&[
                "# Goals",
                "# Non-goals",
                "# Use cases",
                "# Requirements",
                "# Acceptance criteria",
                "# Validation",
                "# Open questions",
            ]),
        ),
        section(
            "# Goals",
            &["- Primary goal"],
            Placement::Before(&[
                "# Non-goals",
                "# Use cases",
                "# Requirements",
                "# Acceptance criteria",
                "# Validation",
                "# Open questions",
            ]),
        ),
        section(
            "# Non-goals",
            &["- Explicitly out of scope"],
            Placement::Before(&[
                "# Use cases",
                "# Requirements",
                "# Acceptance criteria",
                "# Validation",
                "# Open questions",
            ]),
        ),
        section(
            "# Use cases",
            &["- Key use case"],
            Placement::Before(&[
                "# Requirements",
                "# Acceptance criteria",
                "# Validation",
                "# Open questions",
            ]),
        ),
        section(
            "# Requirements",
            &["- Requirement"],
            Placement::Before(&["# Acceptance criteria", "# Validation", "# Open questions"]),
        ),
        section(
            "# Acceptance criteria",
            &["- Acceptance criterion"],
            Placement::Before(&["# Validation", "# Open questions"]),
        ),
        section(
            "# Validation",
            &["- How to validate it"],
            Placement::Before(&["# Open questions"]),
        ),
        section("# Open questions", &["- Open question"], Placement::End),
    ],
};

/// Required skeleton for `kind`
#[must_use]
pub fn template_for(kind: DocKind) -> &'static KindTemplate {
    match kind {
        DocKind::Request => &REQUEST,
        DocKind::Backlog => &BACKLOG,
        DocKind::Task => &TASK,
        DocKind::Spec => &SPEC,
    }
}

/// Optional sections added on request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionPack {
    /// Risks (backlog) or Risks & rollback (task)
    Risks,
    /// Size and estimation drivers
    Estimate,
    /// Owner and success metrics
    Ownership,
}

static BACKLOG_RISKS: SectionTemplate = section(
    "# Risks",
    &["- Risk:", "  - Mitigation:", "  - Dependencies:"],
    Placement::Before(&["# Notes"]),
);

static TASK_RISKS: SectionTemplate = section(
    "# Risks & rollback",
    &[
        "- What can break:",
        "- How to detect regressions:",
        "- Rollback plan:",
    ],
    Placement::Before(&["# Report"]),
);

static ESTIMATE: SectionTemplate = section(
    "# Estimate",
    &[
        "- Size: S/M/L",
        "- Drivers:",
        "  - Unknowns:",
        "  - Integration points:",
        "  - Migration/rollback risk:",
    ],
    Placement::Before(&["# Priority", "# Notes"]),
);

static OWNERSHIP: SectionTemplate = section(
    "# Ownership & metrics",
    &[
        "- Owner:",
        "- KPI / success signal:",
        "- Instrumentation (events/logging):",
        "- Review date (optional):",
    ],
    Placement::Before(&["# Notes", "# Open questions"]),
);

impl SectionPack {
    /// All packs
    pub const ALL: [SectionPack; 3] = [Self::Risks, Self::Estimate, Self::Ownership];

    /// Pack name as accepted by [`FromStr`]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Risks => "risks",
            Self::Estimate => "estimate",
            Self::Ownership => "ownership",
        }
    }

    /// Template for `kind`, or `None` when the pack does not apply
    #[must_use]
    pub fn template(self, kind: DocKind) -> Option<&'static SectionTemplate> {
        match (self, kind) {
            (Self::Risks, DocKind::Backlog) => Some(&BACKLOG_RISKS),
            (Self::Risks, DocKind::Task) => Some(&TASK_RISKS),
            (Self::Risks, _) => None,
            (Self::Estimate, _) => Some(&ESTIMATE),
            (Self::Ownership, _) => Some(&OWNERSHIP),
        }
    }
}

impl Display for SectionPack {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SectionPack {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| format!("unknown section pack: '{s}'"))
    }
}
