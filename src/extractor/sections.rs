//! Section markers and the rules that bound each section.
//!
//! A generation response is a loose sequence of `LABEL:` sections. Markers are
//! located independently of each other; each section starts right after its own
//! marker and is cut at the next repetition of that marker and then at the first
//! terminator (in rule order) that is present in the remaining text.

/// Fixed uppercase labels recognised in a generation response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Title,
    Description,
    PrepTime,
    CookTime,
    TotalTime,
    Ingredients,
    Instructions,
    NutritionInfo,
    Tags,
    Notes,
}

impl Marker {
    pub const ALL: [Marker; 10] = [
        Marker::Title,
        Marker::Description,
        Marker::PrepTime,
        Marker::CookTime,
        Marker::TotalTime,
        Marker::Ingredients,
        Marker::Instructions,
        Marker::NutritionInfo,
        Marker::Tags,
        Marker::Notes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Marker::Title => "TITLE:",
            Marker::Description => "DESCRIPTION:",
            Marker::PrepTime => "PREP_TIME:",
            Marker::CookTime => "COOK_TIME:",
            Marker::TotalTime => "TOTAL_TIME:",
            Marker::Ingredients => "INGREDIENTS:",
            Marker::Instructions => "INSTRUCTIONS:",
            Marker::NutritionInfo => "NUTRITION_INFO:",
            Marker::Tags => "TAGS:",
            Marker::Notes => "NOTES:",
        }
    }
}

/// Terminator set for one marker. The first terminator found wins, in
/// declaration order, not by position in the text.
#[derive(Debug, Clone, Copy)]
pub struct SectionRule {
    pub marker: Marker,
    pub terminators: &'static [Marker],
}

pub const RULES: [SectionRule; 10] = [
    SectionRule {
        marker: Marker::Title,
        terminators: &[],
    },
    SectionRule {
        marker: Marker::Description,
        terminators: &[Marker::PrepTime],
    },
    SectionRule {
        marker: Marker::PrepTime,
        terminators: &[],
    },
    SectionRule {
        marker: Marker::CookTime,
        terminators: &[],
    },
    SectionRule {
        marker: Marker::TotalTime,
        terminators: &[],
    },
    SectionRule {
        marker: Marker::Ingredients,
        terminators: &[Marker::Instructions],
    },
    SectionRule {
        marker: Marker::Instructions,
        terminators: &[Marker::NutritionInfo, Marker::Tags, Marker::Notes],
    },
    SectionRule {
        marker: Marker::NutritionInfo,
        terminators: &[Marker::Tags, Marker::Notes],
    },
    SectionRule {
        marker: Marker::Tags,
        terminators: &[Marker::Notes],
    },
    SectionRule {
        marker: Marker::Notes,
        terminators: &[],
    },
];

pub fn rule_for(marker: Marker) -> &'static SectionRule {
    // RULES holds one entry per Marker, in declaration order
    &RULES[marker as usize]
}

/// Raw, untrimmed body of `marker`'s section, or `None` when the marker is absent.
pub fn section(text: &str, marker: Marker) -> Option<&str> {
    let label = marker.label();
    let start = text.find(label)? + label.len();
    let mut body = &text[start..];

    if let Some(end) = body.find(label) {
        body = &body[..end];
    }

    for terminator in rule_for(marker).terminators {
        if let Some(end) = body.find(terminator.label()) {
            body = &body[..end];
            break;
        }
    }

    Some(body)
}
