/// A view section the presentation layer renders independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Title line and status summary: timestamp, active error, command and
    /// sequence id.
    Title,
    Progress,
    Temperatures,
    Speed,
    Lamp,
    Filaments,
    Thumbnail,
    Error,
    Mode,
}

impl Section {
    /// Every section, in declaration order.
    pub const ALL: [Section; SECTION_COUNT] = [
        Section::Title,
        Section::Progress,
        Section::Temperatures,
        Section::Speed,
        Section::Lamp,
        Section::Filaments,
        Section::Thumbnail,
        Section::Error,
        Section::Mode,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

const SECTION_COUNT: usize = 9;

/// Tracks which view sections changed since the last clean point.
///
/// The dashboard marks a section when a merge changes one of its values;
/// the presentation layer reads the flags, redraws, and calls
/// [`mark_clean`](DirtySections::mark_clean).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtySections {
    sections: [bool; SECTION_COUNT],
}

impl DirtySections {
    /// Create a tracker with every section clean.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag one section as changed.
    pub fn mark(&mut self, section: Section) {
        self.sections[section.index()] = true;
    }

    /// Merge another tracker's flags into this one.
    pub fn absorb(&mut self, other: &DirtySections) {
        for (mine, theirs) in self.sections.iter_mut().zip(other.sections) {
            *mine |= theirs;
        }
    }

    /// Whether any section changed.
    pub fn is_dirty(&self) -> bool {
        self.sections.iter().any(|&d| d)
    }

    pub fn is_section_dirty(&self, section: Section) -> bool {
        self.sections[section.index()]
    }

    /// Dirty sections in declaration order.
    pub fn dirty_sections(&self) -> impl Iterator<Item = Section> + '_ {
        Section::ALL
            .into_iter()
            .filter(|s| self.is_section_dirty(*s))
    }

    /// Clear every flag.
    pub fn mark_clean(&mut self) {
        self.sections = [false; SECTION_COUNT];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_initially_clean() {
        let tracker = DirtySections::new();
        assert!(!tracker.is_dirty());
        assert_eq!(tracker.dirty_sections().count(), 0);
    }

    #[test]
    fn mark_section_makes_dirty() {
        let mut tracker = DirtySections::new();
        tracker.mark(Section::Lamp);
        assert!(tracker.is_dirty());
        assert!(tracker.is_section_dirty(Section::Lamp));
        assert!(!tracker.is_section_dirty(Section::Speed));
    }

    #[test]
    fn absorb_unions_flags() {
        let mut a = DirtySections::new();
        a.mark(Section::Progress);
        let mut b = DirtySections::new();
        b.mark(Section::Thumbnail);
        a.absorb(&b);
        let sections: Vec<_> = a.dirty_sections().collect();
        assert_eq!(sections, [Section::Progress, Section::Thumbnail]);
    }

    #[test]
    fn mark_clean_resets_everything() {
        let mut tracker = DirtySections::new();
        for section in Section::ALL {
            tracker.mark(section);
        }
        tracker.mark_clean();
        assert!(!tracker.is_dirty());
    }
}
