//! Prompt builders for the assistant's pages
//!
//! Every page funnels into a single user turn that is streamed through the
//! same [`ChatSession`](crate::ChatSession); only the prompt text and the
//! failure text differ.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A page that sends prompts to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Chat,
    Documents,
    Osint,
    InmateSearch,
}

impl Page {
    /// Text shown when the reply fails before anything arrived
    pub fn failure_text(self) -> &'static str {
        match self {
            Page::Chat => crate::chat::DEFAULT_FAILURE_TEXT,
            Page::Documents => "Error generating document. Please try again.",
            Page::Osint | Page::InmateSearch => "Error performing search. Please try again.",
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct UnknownKind {
    kind: &'static str,
    value: String,
    expected: String,
}

macro_rules! kind_enum {
    ($(#[$meta:meta])* $name:ident, $label:literal, { $($variant:ident => $id:literal, $title:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn id(self) -> &'static str {
                match self {
                    $($name::$variant => $id),+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $title),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.id())
            }
        }

        impl FromStr for $name {
            type Err = UnknownKind;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let wanted = value.trim().to_ascii_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|kind| kind.id() == wanted)
                    .ok_or_else(|| UnknownKind {
                        kind: $label,
                        value: value.to_string(),
                        expected: $name::ALL
                            .iter()
                            .map(|kind| kind.id())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }
    };
}

kind_enum!(
    /// Legal document templates
    DocumentKind, "document type", {
        Contract => "contract", "Contract / Agreement",
        Affidavit => "affidavit", "Affidavit",
        DemandLetter => "demand-letter", "Demand Letter",
        Motion => "motion", "Court Motion",
        Pleading => "pleading", "Pleading",
        Brief => "brief", "Legal Brief",
        Nda => "nda", "Non-Disclosure Agreement",
        PowerOfAttorney => "power-of-attorney", "Power of Attorney",
    }
);

kind_enum!(
    /// Public-records search categories
    OsintKind, "search type", {
        People => "people", "People Search",
        Property => "property", "Property Records",
        Business => "business", "Business Entities",
        Court => "court", "Court Records",
    }
);

kind_enum!(
    /// Self-representation guides
    GuideKind, "guide", {
        SmallClaims => "small-claims", "Small Claims Court Guide",
        Family => "family", "Family Court Procedures",
        Criminal => "criminal", "Criminal Court Representation",
        Civil => "civil", "Civil Litigation Guide",
        Eviction => "eviction", "Eviction Defense",
        Traffic => "traffic", "Traffic Court Defense",
    }
);

/// Prompt for drafting a legal document.
pub fn draft_document(kind: DocumentKind, title: &str, details: &str) -> String {
    let label = kind.label();
    format!(
        "Draft a professional {label} with the following details:\n\n\
         Title: {title}\n\n\
         Details: {details}\n\n\
         Please provide a complete, legally-formatted {label} that is ready to use. \
         Include all standard clauses, proper legal language, signature blocks, and formatting. \
         Make it comprehensive and professional."
    )
}

/// Prompt for an open-source intelligence search.
pub fn osint_search(kind: OsintKind, query: &str) -> String {
    format!(
        "Perform an OSINT (Open Source Intelligence) search for {}.\n\n\
         Search Query: {query}\n\n\
         Please provide:\n\
         1. Where to search for this information (specific websites, databases, public records)\n\
         2. Step-by-step instructions on how to find this information\n\
         3. What types of public records are available\n\
         4. Legal ways to access this information\n\
         5. Important considerations and privacy laws\n\
         6. Specific search operators or techniques to use\n\n\
         Be thorough and provide actionable guidance on conducting legal OSINT research.",
        kind.label()
    )
}

/// Prompt for locating an inmate.
pub fn inmate_search(state: &str, county: Option<&str>, inmate_name: Option<&str>) -> String {
    let county = county.map(str::trim).filter(|county| !county.is_empty());
    let inmate_name = inmate_name.map(str::trim).filter(|name| !name.is_empty());

    let mut location = state.to_string();
    if let Some(county) = county {
        location.push_str(&format!(", {county} County"));
    }
    let subject = inmate_name
        .map(|name| format!(" for inmate: {name}"))
        .unwrap_or_default();
    let county_roster = match county {
        Some(county) => format!(
            "If {county} County was specified, provide the county jail website/roster"
        ),
        None => "If a county was specified, provide the county jail website/roster".to_string(),
    };

    format!(
        "I need to search for inmate information in {location}{subject}.\n\n\
         Please provide:\n\n\
         1. **Official State DOC Website**: Direct link to {state} Department of Corrections inmate search\n\
         2. **County Jail Roster**: {county_roster}\n\
         3. **Federal Bureau of Prisons**: Link to federal inmate locator if applicable\n\
         4. **Search Instructions**: Step-by-step guide on how to search for inmates\n\
         5. **Alternative Resources**: Other public databases or resources for finding inmate information\n\
         6. **What Information You Can Find**: Booking date, charges, bond amount, release date, mugshots, etc.\n\
         7. **Visitation and Contact Info**: How to contact or visit inmates\n\n\
         Format the response with clear sections and include actual clickable URLs where possible. \
         Be comprehensive and practical."
    )
}

/// Opening prompt of a self-representation guide.
pub fn guide(kind: GuideKind) -> &'static str {
    match kind {
        GuideKind::SmallClaims => {
            "I need a complete guide for representing myself in small claims court. Please provide step-by-step instructions on: 1) Filing the claim, 2) Serving the defendant, 3) Preparing evidence, 4) Court appearance tips, 5) Presenting my case, 6) What to expect, 7) Common mistakes to avoid, 8) Collecting the judgment if I win."
        }
        GuideKind::Family => {
            "I need comprehensive guidance for representing myself in family court for divorce/custody matters. Please cover: 1) Filing initial petitions, 2) Temporary orders process, 3) Discovery and financial disclosures, 4) Mediation process, 5) Trial preparation, 6) Custody evaluations, 7) Child support calculations, 8) Property division, 9) Court appearances, 10) Final judgment."
        }
        GuideKind::Criminal => {
            "I'm representing myself in a criminal case. Please provide detailed guidance on: 1) My constitutional rights, 2) Arraignment procedures, 3) Bail and pretrial release, 4) Discovery process, 5) Plea negotiations, 6) Motion filing, 7) Trial preparation, 8) Jury selection, 9) Cross-examination techniques, 10) Closing arguments, 11) Sentencing considerations. Include warnings about when I should definitely hire a lawyer."
        }
        GuideKind::Civil => {
            "Guide me through representing myself in a civil lawsuit. Cover: 1) Filing a complaint or answer, 2) Service of process, 3) Discovery (interrogatories, depositions, document requests), 4) Motion practice, 5) Settlement negotiations, 6) Trial preparation, 7) Evidence rules, 8) Witness examination, 9) Trial procedures."
        }
        GuideKind::Eviction => {
            "I'm facing eviction and need to represent myself. Please provide: 1) My rights as a tenant, 2) Common defenses to eviction, 3) How to respond to eviction notice, 4) Court procedures for eviction hearings, 5) Evidence to gather, 6) How to negotiate with landlord, 7) Emergency stays and appeals."
        }
        GuideKind::Traffic => {
            "Help me fight a traffic ticket in court. Cover: 1) Plea options, 2) Trial by declaration vs in-person, 3) Evidence to gather (photos, diagrams, witness statements), 4) Cross-examining the officer, 5) Common defenses, 6) Court procedures, 7) Reducing fines or points."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("nda".parse::<DocumentKind>().unwrap(), DocumentKind::Nda);
        assert_eq!(
            " Demand-Letter ".parse::<DocumentKind>().unwrap(),
            DocumentKind::DemandLetter
        );
        assert_eq!("court".parse::<OsintKind>().unwrap(), OsintKind::Court);
        assert_eq!("eviction".parse::<GuideKind>().unwrap(), GuideKind::Eviction);

        let err = "will".parse::<DocumentKind>().unwrap_err();
        assert!(err.to_string().contains("document type"));
        assert!(err.to_string().contains("power-of-attorney"));
    }

    #[test]
    fn test_draft_document_uses_label() {
        let prompt = draft_document(DocumentKind::Nda, "Mutual NDA", "Two startups");
        assert!(prompt.starts_with("Draft a professional Non-Disclosure Agreement"));
        assert!(prompt.contains("Title: Mutual NDA"));
        assert!(prompt.contains("Details: Two startups"));
    }

    #[test]
    fn test_osint_search_includes_query() {
        let prompt = osint_search(OsintKind::Property, "12 Elm St");
        assert!(prompt.contains("search for Property Records."));
        assert!(prompt.contains("Search Query: 12 Elm St"));
    }

    #[test]
    fn test_inmate_search_optional_parts() {
        let full = inmate_search("Texas", Some("Harris"), Some("John Doe"));
        assert!(full.starts_with(
            "I need to search for inmate information in Texas, Harris County for inmate: John Doe."
        ));

        let bare = inmate_search("Ohio", Some("  "), None);
        assert!(bare.starts_with("I need to search for inmate information in Ohio.\n"));
        assert!(bare.contains("Ohio Department of Corrections"));
    }

    #[test]
    fn test_every_guide_has_prompt() {
        for kind in GuideKind::ALL {
            assert!(!guide(*kind).is_empty(), "{kind}");
        }
    }

    #[test]
    fn test_page_failure_text() {
        assert_eq!(
            Page::Documents.failure_text(),
            "Error generating document. Please try again."
        );
        assert_eq!(Page::Osint.failure_text(), Page::InmateSearch.failure_text());
    }
}
