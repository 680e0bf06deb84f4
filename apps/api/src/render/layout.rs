//! Pure layout engine for the personalized resume PDF.
//!
//! Turns a `PersonalizedPackage` into pages of positioned text operations
//! with no I/O and no PDF library types, so layout behavior (wrapping, page
//! breaks, section order) is testable by comparing op lists. The `pdf`
//! module serializes the result.

use crate::pipeline::personalize::PersonalizedPackage;

/// US Letter, in PostScript points.
pub const PAGE_WIDTH_PT: f32 = 612.0;
pub const PAGE_HEIGHT_PT: f32 = 792.0;
pub const MARGIN_PT: f32 = 50.0;
/// A line placed at or below this baseline triggers a page break.
pub const BOTTOM_MARGIN_PT: f32 = 72.0;
pub const LEADING: f32 = 14.0;

const NAME_SIZE: f32 = 22.0;
const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;
const BULLET_INDENT: f32 = 12.0;

pub const COLOR_BODY: (u8, u8, u8) = (0, 0, 0);
pub const COLOR_NAME: (u8, u8, u8) = (0x0f, 0x17, 0x2a);
pub const COLOR_HEADING: (u8, u8, u8) = (0x1d, 0x4e, 0xd8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Oblique,
}

/// One positioned run of text. Coordinates are PDF points with the origin at
/// the bottom-left of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOp {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub style: FontStyle,
    pub color: (u8, u8, u8),
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LaidOutPage {
    pub ops: Vec<TextOp>,
}

/// How many characters fit on a line of the given width at the given size.
/// Approximation tuned for Helvetica; floored at 50 so degenerate inputs
/// never produce one-word lines.
pub fn width_chars(width_pt: f32, font_size: f32) -> usize {
    ((width_pt / (font_size * 0.55)) as usize).max(50)
}

/// Greedy word wrap. Words longer than the limit get a line of their own.
pub fn wrap_line(text: &str, limit: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= limit {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

struct LayoutCursor {
    pages: Vec<LaidOutPage>,
    y: f32,
}

impl LayoutCursor {
    fn new() -> Self {
        Self {
            pages: vec![LaidOutPage::default()],
            y: PAGE_HEIGHT_PT - MARGIN_PT,
        }
    }

    fn break_page(&mut self) {
        self.pages.push(LaidOutPage::default());
        self.y = PAGE_HEIGHT_PT - MARGIN_PT;
    }

    fn put(&mut self, x: f32, size: f32, style: FontStyle, color: (u8, u8, u8), text: &str) {
        if self.y <= BOTTOM_MARGIN_PT {
            self.break_page();
        }
        self.pages.last_mut().unwrap().ops.push(TextOp {
            x,
            y: self.y,
            size,
            style,
            color,
            text: text.to_string(),
        });
    }

    fn body_line(&mut self, x: f32, text: &str) {
        self.put(x, BODY_SIZE, FontStyle::Regular, COLOR_BODY, text);
        self.y -= LEADING;
    }

    /// Section heading. Refuses to start a section at the very bottom of a
    /// page; a heading needs at least a couple of lines under it.
    fn heading(&mut self, text: &str) {
        if self.y <= MARGIN_PT + 40.0 {
            self.break_page();
        }
        self.y -= 6.0;
        self.put(
            MARGIN_PT,
            HEADING_SIZE,
            FontStyle::Bold,
            COLOR_HEADING,
            text,
        );
        self.y -= LEADING + 4.0;
    }

    /// Wrapped paragraph text. Blank lines in the source become vertical gaps
    /// instead of being collapsed away.
    fn paragraph(&mut self, text: &str) {
        let limit = width_chars(PAGE_WIDTH_PT - 2.0 * MARGIN_PT, BODY_SIZE);
        for source_line in text.lines() {
            if source_line.trim().is_empty() {
                self.y -= LEADING;
                continue;
            }
            for line in wrap_line(source_line, limit) {
                self.body_line(MARGIN_PT, &line);
            }
        }
    }

    /// Bullet item: glyph at the margin, wrapped text indented, continuation
    /// lines aligned with the first text line.
    fn bullet(&mut self, text: &str) {
        let limit = width_chars(PAGE_WIDTH_PT - 2.0 * MARGIN_PT - BULLET_INDENT, BODY_SIZE);
        for (i, line) in wrap_line(text, limit).into_iter().enumerate() {
            if i == 0 {
                self.put(MARGIN_PT, BODY_SIZE, FontStyle::Regular, COLOR_BODY, "\u{2022}");
            }
            self.body_line(MARGIN_PT + BULLET_INDENT, &line);
        }
    }

    fn subheading(&mut self, text: &str) {
        self.put(MARGIN_PT, BODY_SIZE, FontStyle::Bold, COLOR_BODY, text);
        self.y -= LEADING;
    }

    fn gap(&mut self, pts: f32) {
        self.y -= pts;
    }
}

/// Lays out the full resume. Deterministic: the same package always yields
/// the same op lists. Empty sections are skipped entirely.
pub fn layout_package(pkg: &PersonalizedPackage) -> Vec<LaidOutPage> {
    let mut cur = LayoutCursor::new();

    // Header: name, optional headline, then a single contact line.
    if !pkg.header.name.is_empty() {
        cur.put(MARGIN_PT, NAME_SIZE, FontStyle::Bold, COLOR_NAME, &pkg.header.name);
        cur.y -= NAME_SIZE + 4.0;
    }
    if !pkg.branding_headline.is_empty() {
        cur.put(
            MARGIN_PT,
            HEADING_SIZE,
            FontStyle::Oblique,
            COLOR_BODY,
            &pkg.branding_headline,
        );
        cur.y -= LEADING;
    }
    let mut contact: Vec<&str> = [
        pkg.header.email.as_str(),
        pkg.header.phone.as_str(),
        pkg.header.location.as_str(),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect();
    contact.extend(pkg.header.links.iter().map(String::as_str));
    if !contact.is_empty() {
        cur.put(
            MARGIN_PT,
            BODY_SIZE,
            FontStyle::Regular,
            COLOR_BODY,
            &contact.join(" | "),
        );
        cur.y -= LEADING;
    }
    cur.gap(8.0);

    if !pkg.professional_summary.is_empty() {
        cur.heading("Professional Summary");
        cur.paragraph(&pkg.professional_summary);
        cur.gap(4.0);
    }

    if !pkg.career_highlights.is_empty() {
        cur.heading("Career Highlights");
        for item in &pkg.career_highlights {
            cur.bullet(item);
        }
        cur.gap(4.0);
    }

    let skill_rows: Vec<(&str, &Vec<String>)> = [
        ("Primary", &pkg.skills.primary_skills),
        ("Secondary", &pkg.skills.secondary_skills),
        ("Tooling", &pkg.skills.tooling),
    ]
    .into_iter()
    .filter(|(_, list)| !list.is_empty())
    .collect();
    if !skill_rows.is_empty() {
        cur.heading("Skills");
        for (label, list) in skill_rows {
            cur.paragraph(&format!("{label}: {}", list.join(", ")));
        }
        cur.gap(4.0);
    }

    if !pkg.experience.is_empty() {
        cur.heading("Experience");
        for item in &pkg.experience {
            let mut line = item.title.clone();
            if !item.company.is_empty() {
                line.push_str(&format!(" — {}", item.company));
            }
            if !item.duration.is_empty() {
                line.push_str(&format!(" ({})", item.duration));
            }
            cur.subheading(&line);
            for bullet in &item.impact_bullets {
                cur.bullet(bullet);
            }
            cur.gap(4.0);
        }
    }

    if !pkg.projects.is_empty() {
        cur.heading("Projects");
        for item in &pkg.projects {
            let mut line = item.name.clone();
            if !item.tech_stack.is_empty() {
                line.push_str(&format!(" [{}]", item.tech_stack.join(", ")));
            }
            cur.subheading(&line);
            for bullet in &item.impact_bullets {
                cur.bullet(bullet);
            }
            cur.gap(4.0);
        }
    }

    if !pkg.education.is_empty() {
        cur.heading("Education");
        for item in &pkg.education {
            let mut line = item.degree.clone();
            if !item.institution.is_empty() {
                line.push_str(&format!(", {}", item.institution));
            }
            if !item.year.is_empty() {
                line.push_str(&format!(" ({})", item.year));
            }
            if !item.cgpa.is_empty() {
                line.push_str(&format!(" — CGPA {}", item.cgpa));
            }
            cur.paragraph(&line);
        }
        cur.gap(4.0);
    }

    if !pkg.certifications.is_empty() {
        cur.heading("Certifications");
        for cert in &pkg.certifications {
            cur.bullet(cert);
        }
        cur.gap(4.0);
    }

    let notes = &pkg.tailoring_notes;
    if !notes.culture_fit.is_empty()
        || !notes.interview_talking_points.is_empty()
        || !notes.ats_keywords.is_empty()
    {
        cur.heading("Tailoring Notes");
        if !notes.culture_fit.is_empty() {
            cur.paragraph(&notes.culture_fit);
        }
        for point in &notes.interview_talking_points {
            cur.bullet(point);
        }
        if !notes.ats_keywords.is_empty() {
            cur.paragraph(&format!("ATS Keywords: {}", notes.ats_keywords.join(", ")));
        }
    }

    cur.pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::personalize::{ExperienceItem, ResumeHeader, SkillsSection};

    fn make_package() -> PersonalizedPackage {
        PersonalizedPackage {
            header: ResumeHeader {
                name: "Asha Rao".to_string(),
                email: "asha@example.com".to_string(),
                phone: "+91-9000000000".to_string(),
                location: String::new(),
                links: vec!["github.com/asharao".to_string()],
            },
            professional_summary: "Backend-leaning engineer with strong Rust fundamentals."
                .to_string(),
            career_highlights: vec!["Shipped a payments service used by 40k students".to_string()],
            skills: SkillsSection {
                primary_skills: vec!["Rust".to_string(), "SQL".to_string()],
                secondary_skills: Vec::new(),
                tooling: vec!["Docker".to_string()],
            },
            experience: vec![ExperienceItem {
                title: "Intern".to_string(),
                company: "Acme".to_string(),
                duration: "Summer 2024".to_string(),
                impact_bullets: vec!["Cut p99 latency by 40% on the order API".to_string()],
            }],
            ..PersonalizedPackage::default()
        }
    }

    #[test]
    fn test_layout_is_deterministic() {
        let pkg = make_package();
        assert_eq!(layout_package(&pkg), layout_package(&pkg));
    }

    #[test]
    fn test_name_is_first_op_with_title_styling() {
        let pages = layout_package(&make_package());
        let first = &pages[0].ops[0];
        assert_eq!(first.text, "Asha Rao");
        assert_eq!(first.size, 22.0);
        assert_eq!(first.style, FontStyle::Bold);
        assert_eq!(first.color, COLOR_NAME);
        assert_eq!(first.y, PAGE_HEIGHT_PT - MARGIN_PT);
    }

    #[test]
    fn test_empty_sections_are_skipped() {
        let pages = layout_package(&make_package());
        let texts: Vec<&str> = pages[0].ops.iter().map(|op| op.text.as_str()).collect();
        assert!(texts.contains(&"Skills"));
        assert!(!texts.contains(&"Projects"));
        assert!(!texts.contains(&"Certifications"));
    }

    #[test]
    fn test_bullet_glyph_at_margin_text_indented() {
        let pages = layout_package(&make_package());
        let ops = &pages[0].ops;
        let glyph_idx = ops.iter().position(|op| op.text == "\u{2022}").unwrap();
        let glyph = &ops[glyph_idx];
        let text = &ops[glyph_idx + 1];
        assert_eq!(glyph.x, MARGIN_PT);
        assert_eq!(text.x, MARGIN_PT + 12.0);
        assert_eq!(glyph.y, text.y);
    }

    #[test]
    fn test_long_bullet_wraps_with_aligned_continuation() {
        let mut pkg = make_package();
        pkg.career_highlights = vec!["word ".repeat(60).trim().to_string()];
        let pages = layout_package(&pkg);
        let ops = &pages[0].ops;
        let glyph_idx = ops.iter().position(|op| op.text == "\u{2022}").unwrap();
        let first = &ops[glyph_idx + 1];
        let continuation = &ops[glyph_idx + 2];
        assert_eq!(continuation.x, first.x);
        assert!((first.y - continuation.y - LEADING).abs() < f32::EPSILON);
    }

    #[test]
    fn test_overflow_creates_second_page() {
        let mut pkg = make_package();
        pkg.career_highlights = (0..80)
            .map(|i| format!("Highlight number {i} with some extra words"))
            .collect();
        let pages = layout_package(&pkg);
        assert!(pages.len() >= 2);
        // First op of the overflow page starts at the top margin.
        assert_eq!(pages[1].ops[0].y, PAGE_HEIGHT_PT - MARGIN_PT);
        // No op was ever placed at or below the break threshold.
        for page in &pages {
            for op in &page.ops {
                assert!(op.y > BOTTOM_MARGIN_PT);
            }
        }
    }

    #[test]
    fn test_ats_keywords_alone_render_tailoring_notes() {
        let mut pkg = make_package();
        pkg.tailoring_notes.ats_keywords = vec!["Rust".to_string(), "REST".to_string()];
        let pages = layout_package(&pkg);
        let texts: Vec<&str> = pages[0].ops.iter().map(|op| op.text.as_str()).collect();
        assert!(texts.contains(&"Tailoring Notes"));
        assert!(texts.contains(&"ATS Keywords: Rust, REST"));
    }

    #[test]
    fn test_blank_lines_in_summary_become_gaps() {
        let mut pkg = make_package();
        pkg.professional_summary = "First paragraph.\n\nSecond paragraph.".to_string();
        let pages = layout_package(&pkg);
        let ops = &pages[0].ops;
        let first = ops.iter().find(|op| op.text == "First paragraph.").unwrap();
        let second = ops.iter().find(|op| op.text == "Second paragraph.").unwrap();
        // One blank source line adds one extra leading of space.
        assert!((first.y - second.y - 2.0 * LEADING).abs() < f32::EPSILON);
    }

    #[test]
    fn test_branding_headline_renders_under_name() {
        let mut pkg = make_package();
        pkg.branding_headline = "Backend engineer for data-heavy products".to_string();
        let pages = layout_package(&pkg);
        let ops = &pages[0].ops;
        assert_eq!(ops[1].text, "Backend engineer for data-heavy products");
        assert_eq!(ops[1].style, FontStyle::Oblique);
        assert!(ops[1].y < ops[0].y);
    }

    #[test]
    fn test_width_chars_floor() {
        assert_eq!(width_chars(10.0, 10.0), 50);
        let wide = width_chars(PAGE_WIDTH_PT - 2.0 * MARGIN_PT, 10.0);
        assert!(wide > 50);
    }

    #[test]
    fn test_wrap_line_respects_limit() {
        let lines = wrap_line("alpha beta gamma delta", 11);
        assert_eq!(lines, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn test_wrap_line_oversized_word_gets_own_line() {
        let lines = wrap_line("a reallyreallyreallylongword b", 10);
        assert_eq!(lines, vec!["a", "reallyreallyreallylongword", "b"]);
    }
}
