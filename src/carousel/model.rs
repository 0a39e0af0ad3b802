//! Slide records and carousel index state.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CarouselError;

/// A single banner slide. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: u32,
    pub image_url: String,
    pub title: String,
}

impl Slide {
    pub fn new(id: u32, image_url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            image_url: image_url.into(),
            title: title.into(),
        }
    }
}

/// The banner shown on the landing page.
pub fn default_slides() -> Vec<Slide> {
    vec![
        Slide::new(1, "/images/banner/sports.jpg", "Expert sports tips"),
        Slide::new(2, "/images/banner/trading.jpg", "Trading signals you can trust"),
        Slide::new(3, "/images/banner/punter.jpg", "Become a punter and get paid"),
    ]
}

/// One dot control under the carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Indicator {
    pub index: usize,
    pub active: bool,
}

/// Everything a renderer needs for one frame.
///
/// Slide and indicators come from the same index read, so they never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarouselSnapshot {
    pub active_index: usize,
    pub slide: Slide,
    pub indicators: Vec<Indicator>,
}

/// Ordered, non-empty slide list plus the active index.
///
/// Invariant: `active < slides.len()`.
#[derive(Debug, Clone)]
pub struct Carousel {
    slides: Vec<Slide>,
    active: usize,
}

impl Carousel {
    pub fn new(slides: Vec<Slide>) -> Result<Self, CarouselError> {
        if slides.is_empty() {
            return Err(CarouselError::Empty);
        }
        let mut seen = HashSet::with_capacity(slides.len());
        for slide in &slides {
            if !seen.insert(slide.id) {
                return Err(CarouselError::DuplicateSlideId(slide.id));
            }
        }
        Ok(Self { slides, active: 0 })
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Never true: construction rejects empty lists.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_slide(&self) -> &Slide {
        &self.slides[self.active]
    }

    /// Step to the next slide, wrapping at the end. Returns the new index.
    pub fn advance(&mut self) -> usize {
        self.active = (self.active + 1) % self.slides.len();
        self.active
    }

    /// Jump straight to `index`.
    pub fn go_to_slide(&mut self, index: usize) -> Result<(), CarouselError> {
        if index >= self.slides.len() {
            return Err(CarouselError::IndexOutOfRange {
                index,
                len: self.slides.len(),
            });
        }
        self.active = index;
        Ok(())
    }

    pub fn indicators(&self) -> Vec<Indicator> {
        (0..self.slides.len())
            .map(|index| Indicator {
                index,
                active: index == self.active,
            })
            .collect()
    }

    pub fn snapshot(&self) -> CarouselSnapshot {
        CarouselSnapshot {
            active_index: self.active,
            slide: self.active_slide().clone(),
            indicators: self.indicators(),
        }
    }
}
