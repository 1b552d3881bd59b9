//! Scroll-driven selection of the visible backdrop.
//!
//! The page is divided into sections. While the hero section (the first one) is in view the
//! terrain backdrop is shown, every other section shows the globe. A section counts as in
//! view from half a viewport before its top until half a viewport before its bottom.

use crate::config::PageConfig;

/// Which backdrop should be visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Hero,
    Other,
}

impl Background {
    pub fn for_section(index: usize) -> Self {
        if index == 0 {
            Background::Hero
        } else {
            Background::Other
        }
    }

    pub fn shows_terrain(&self) -> bool {
        matches!(self, Background::Hero)
    }

    pub fn shows_globe(&self) -> bool {
        matches!(self, Background::Other)
    }
}

/// Vertical extent of one page section in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Section {
    pub top: f32,
    pub height: f32,
}

impl Section {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    /// Sections stacked top to bottom starting at document offset 0.
    pub fn stack(heights: &[f32]) -> Vec<Section> {
        let mut top = 0.0;
        heights
            .iter()
            .map(|height| {
                let section = Section::new(top, *height);
                top += height;
                section
            })
            .collect()
    }

    fn contains(&self, offset: f32, viewport_height: f32) -> bool {
        let half = viewport_height * 0.5;
        offset >= self.top - half && offset < self.top + self.height - half
    }
}

/// Index of the first section in view at `offset`, or 0 if none is.
pub fn active_section(offset: f32, viewport_height: f32, sections: &[Section]) -> usize {
    sections
        .iter()
        .position(|section| section.contains(offset, viewport_height))
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundManager {
    current_section: usize,
    transitions: usize,
}

impl Default for BackgroundManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundManager {
    /// Starts on the hero section.
    pub fn new() -> Self {
        Self {
            current_section: 0,
            transitions: 0,
        }
    }

    pub fn current_section(&self) -> usize {
        self.current_section
    }

    pub fn background(&self) -> Background {
        Background::for_section(self.current_section)
    }

    /// Number of section changes observed so far.
    pub fn transitions(&self) -> usize {
        self.transitions
    }

    /// Recomputes the active section. Returns the background to show if the section
    /// changed, `None` if the visibility must stay as it is.
    pub fn handle_scroll(
        &mut self,
        offset: f32,
        viewport_height: f32,
        sections: &[Section],
    ) -> Option<Background> {
        let section = active_section(offset, viewport_height, sections);
        if section == self.current_section {
            return None;
        }
        log::debug!(
            "Active section {} -> {} at offset {}",
            self.current_section,
            section,
            offset
        );
        self.current_section = section;
        self.transitions += 1;
        Some(self.background())
    }
}

/// A page that exists only as section heights, scrolled with the mouse wheel in native
/// builds where there is no document around the backdrop.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualPage {
    offset: f32,
    sections: Vec<Section>,
    line_height: f32,
}

impl VirtualPage {
    pub fn new(config: &PageConfig) -> Self {
        Self {
            offset: 0.0,
            sections: Section::stack(&config.section_heights),
            line_height: config.line_height,
        }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn document_height(&self) -> f32 {
        self.sections
            .last()
            .map(|section| section.top + section.height)
            .unwrap_or(0.0)
    }

    /// Moves the offset by `delta` pixels, kept within the scrollable range.
    pub fn scroll_by(&mut self, delta: f32, viewport_height: f32) -> f32 {
        let max_scroll = (self.document_height() - viewport_height).max(0.0);
        self.offset = (self.offset + delta).clamp(0.0, max_scroll);
        self.offset
    }
}
