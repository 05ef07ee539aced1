use std::collections::HashMap;

use tracing::info;

use crate::error::{AppError, AppResult, RoutingError};
use crate::venues::{VenueDescriptor, VenueTag};

/// Fixed venue-tag -> descriptor mapping.
///
/// SECURITY: populated once during bootstrap and read-only thereafter, so
/// approval and swap events always reference a stable spender address.
pub struct VenueRegistry {
    venues: HashMap<VenueTag, VenueDescriptor>,
}

impl VenueRegistry {
    /// Build the registry from exactly one descriptor per venue tag.
    /// Duplicate or missing tags are a configuration error.
    pub fn new(descriptors: Vec<VenueDescriptor>) -> AppResult<Self> {
        let mut venues = HashMap::new();
        for descriptor in descriptors {
            let tag = descriptor.tag;
            if venues.insert(tag, descriptor).is_some() {
                return Err(AppError::Config(format!("duplicate venue descriptor for {tag}")));
            }
        }
        for tag in VenueTag::all() {
            if !venues.contains_key(&tag) {
                return Err(AppError::Config(format!("no venue descriptor supplied for {tag}")));
            }
        }
        info!("Venue registry initialized with {} venues", venues.len());
        Ok(VenueRegistry { venues })
    }

    /// Look up the descriptor for a tag. No side effects.
    ///
    /// `UnknownVenue` is retained defensively; the constructor guarantees a
    /// descriptor per tag, so enum-typed callers cannot hit it.
    pub fn resolve(&self, tag: VenueTag) -> AppResult<&VenueDescriptor> {
        self.venues
            .get(&tag)
            .ok_or_else(|| RoutingError::UnknownVenue { tag: tag.as_u8() }.into())
    }

    /// All descriptors in tag order.
    pub fn descriptors(&self) -> Vec<&VenueDescriptor> {
        let mut all: Vec<&VenueDescriptor> = self.venues.values().collect();
        all.sort_by_key(|d| d.tag.as_u8());
        all
    }
}
