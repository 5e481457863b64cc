//! Course catalog used by the teacher editor's course-code autocomplete.

use crate::model::CatalogCourse;

pub const MAX_SUGGESTIONS: usize = 8;

const COURSES: &[(&str, &str, u32)] = &[
    ("ENG001", "Grammar and Composition 1", 3),
    ("SOCSCI111", "Pag-unawa sa Sarili", 3),
    ("LIT111", "Philippine Literature", 3),
    ("FIL111", "Kontekstwal... Komunikasyon sa Filipino", 3),
    ("ITC111", "Intro to Computing", 3),
    ("ITC112", "Computer Programming 1", 3),
    ("SOCSCI112", "Gender and Society", 3),
    ("FIL112", "Filipino sa Iba't Ibang Disiplina", 3),
    ("ENG111", "Purposive Communication", 3),
    ("ITC121", "Computer Programming 2", 3),
    ("ITP121", "Discrete Mathematics", 3),
    ("ITP122", "Intro to Human Computer Interaction 1", 3),
    ("ITE121", "Electronics with Technical Drawing", 3),
    ("NSTP2", "National Service Training Program 2", 3),
    ("ENG002", "Business Communication", 3),
    ("ITC211", "Data Structures with Algorithm", 3),
    ("ITC212", "Information Management", 3),
    ("ITE211", "Human Computer Interaction 2", 3),
    ("ITE212", "Object Oriented Programming", 3),
    ("ITE213", "Platform Technologies", 3),
    ("PE221", "Individual/Dual Sports 2", 2),
    ("ITP221", "Advanced Database Systems", 3),
    ("ITP222", "Quantitative Methods", 3),
    ("ITP223", "Networking 1", 3),
    ("ITP224", "Integrative Programming and Technologies 1", 3),
    ("ITE221", "Web Systems and Technologies", 3),
    ("ITE222", "Embedded System", 3),
    ("PE222", "Team Games and Sports 2", 2),
    ("ITC311", "Application Development and Emerging Technologies", 3),
    ("ITP311", "Networking 2", 3),
    ("ITP312", "IT Research Methods", 3),
    ("ITP313", "Event Driven Programming", 3),
    ("ITP314", "Systems Integration & Architecture 1", 3),
    ("ITE311", "Web Systems and Technologies 2", 3),
];

/// Section labels a teacher can be assigned to.
pub const SECTION_LABELS: [&str; 6] = ["F1", "F2", "F3", "F4", "F5", "F6"];

fn normalize_code(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

pub fn lookup(code: &str) -> Option<CatalogCourse> {
    let code = normalize_code(code);
    COURSES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(c, t, u)| CatalogCourse {
            code: c.to_string(),
            title: t.to_string(),
            units: *u,
        })
}

/// Code match ignores whitespace; title match is a plain substring, both
/// upper-cased. An empty query suggests nothing.
pub fn suggest(query: &str) -> Vec<CatalogCourse> {
    let code_q = normalize_code(query);
    if code_q.is_empty() {
        return Vec::new();
    }
    let title_q = query.trim().to_uppercase();
    COURSES
        .iter()
        .filter(|(code, title, _)| {
            code.contains(&code_q) || title.to_uppercase().contains(&title_q)
        })
        .take(MAX_SUGGESTIONS)
        .map(|(c, t, u)| CatalogCourse {
            code: c.to_string(),
            title: t.to_string(),
            units: *u,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_suggests_nothing() {
        assert!(suggest("").is_empty());
        assert!(suggest("   ").is_empty());
    }

    #[test]
    fn code_match_ignores_spaces_and_case() {
        let s = suggest("itc 11");
        let codes: Vec<&str> = s.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["ITC111", "ITC112"]);
    }

    #[test]
    fn title_match_and_cap() {
        let s = suggest("networking");
        assert_eq!(s.len(), 2);
        assert!(suggest("IT").len() <= MAX_SUGGESTIONS);
        assert_eq!(suggest("IT").len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn lookup_by_code() {
        let c = lookup("pe 221").expect("PE221");
        assert_eq!(c.units, 2);
        assert!(lookup("NOPE999").is_none());
    }
}
